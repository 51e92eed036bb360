//! Events observed on a chain, as delivered to a relaying strategy.

use alloc::collections::BTreeMap;
use core::fmt::{Display, Error as FmtError, Formatter};

use ibc_relay_types::core::ics24_host::identifier::ChainId;
use ibc_relay_types::Height;

/// An IBC event emitted by a chain, flattened into its type and attributes.
///
/// The relaying core does not interpret events itself; it forwards them to
/// the strategy, which knows which event kinds and attributes it cares
/// about (e.g. `send_packet` with its `packet_sequence`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IbcEvent {
    pub kind: String,
    pub attributes: BTreeMap<String, String>,
}

impl IbcEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

impl Display for IbcEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.kind)
    }
}

/// A batch of events from a chain at a specific height
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventBatch {
    pub chain_id: ChainId,
    pub height: Height,
    pub events: Vec<IbcEvent>,
}
