use core::fmt;

use prost_types::Any;
use uuid::Uuid;

/// Identifies the operation that produced a batch of messages, so that the
/// transactions a chain adapter submits can be correlated in the logs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrackingId {
    Uuid(Uuid),
    Static(&'static str),
}

impl TrackingId {
    pub fn new_uuid() -> Self {
        Self::Uuid(Uuid::new_v4())
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingId::Uuid(u) => u.fmt(f),
            TrackingId::Static(s) => s.fmt(f),
        }
    }
}

/// A wrapper over a vector of proto-encoded messages
/// (`Vec<Any>`), which has an associated tracking
/// number.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedMsgs {
    pub msgs: Vec<Any>,
    pub tracking_id: TrackingId,
}

impl TrackedMsgs {
    pub fn new_static(msgs: Vec<Any>, tracking_id: &'static str) -> Self {
        Self {
            msgs,
            tracking_id: TrackingId::Static(tracking_id),
        }
    }

    pub fn new_uuid(msgs: Vec<Any>) -> Self {
        Self {
            msgs,
            tracking_id: TrackingId::new_uuid(),
        }
    }

    pub fn messages(&self) -> &Vec<Any> {
        &self.msgs
    }

    pub fn tracking_id(&self) -> TrackingId {
        self.tracking_id
    }
}
