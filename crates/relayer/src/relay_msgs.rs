//! The per-step batch of messages to submit to both chains of a path.

use core::fmt::{Display, Error as FmtError, Formatter};

use itertools::Itertools;
use prost::Message;
use prost_types::Any;
use tracing::{debug, error, info, warn};

use crate::chain::handle::ChainHandle;
use crate::chain::tracking::TrackedMsgs;
use crate::config::TxConfig;

/// Outcome of submitting one side of a [`RelayMsgs`] batch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SendOutcome {
    #[default]
    NotSent,
    Accepted,
    Rejected,
}

impl Display for SendOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            SendOutcome::NotSent => write!(f, "not sent"),
            SendOutcome::Accepted => write!(f, "accepted"),
            SendOutcome::Rejected => write!(f, "rejected"),
        }
    }
}

/// Messages to submit to the source and destination chains, in submission
/// order.
///
/// An empty batch is not ready and must not be submitted: it means there is
/// nothing to act on yet.
#[derive(Clone, Debug, PartialEq)]
pub struct RelayMsgs {
    pub src: Vec<Any>,
    pub dst: Vec<Any>,

    /// Whether submitting this batch completes the handshake.
    pub last: bool,

    tracking_id: &'static str,
    src_outcome: SendOutcome,
    dst_outcome: SendOutcome,
}

impl Default for RelayMsgs {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayMsgs {
    pub fn new() -> Self {
        Self {
            src: Vec::new(),
            dst: Vec::new(),
            last: false,
            tracking_id: "relay_msgs",
            src_outcome: SendOutcome::NotSent,
            dst_outcome: SendOutcome::NotSent,
        }
    }

    /// Tag the transactions of this batch with the given tracking id.
    pub fn with_tracking_id(self, tracking_id: &'static str) -> Self {
        Self {
            tracking_id,
            ..self
        }
    }

    pub fn tracking_id(&self) -> &'static str {
        self.tracking_id
    }

    pub fn is_ready(&self) -> bool {
        !self.src.is_empty() || !self.dst.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.last
    }

    pub fn src_outcome(&self) -> SendOutcome {
        self.src_outcome
    }

    pub fn dst_outcome(&self) -> SendOutcome {
        self.dst_outcome
    }

    /// Whether the last call to [`RelayMsgs::send`] got every submitted
    /// message accepted.
    pub fn success(&self) -> bool {
        let outcomes = [self.src_outcome, self.dst_outcome];

        outcomes.contains(&SendOutcome::Accepted) && !outcomes.contains(&SendOutcome::Rejected)
    }

    /// Submit the source messages to `src` and the destination messages to
    /// `dst`.
    ///
    /// Each side is split into transactions bounded by the given
    /// configuration and submitted in order; a side stops at its first
    /// rejected transaction. Rejections are recorded in the batch outcome,
    /// see [`RelayMsgs::success`].
    pub fn send<ChainA: ChainHandle, ChainB: ChainHandle>(
        &mut self,
        src: &ChainA,
        dst: &ChainB,
        config: &TxConfig,
    ) {
        self.src_outcome = send_side(src, &self.src, self.tracking_id, config);
        self.dst_outcome = send_side(dst, &self.dst, self.tracking_id, config);
    }
}

fn send_side<Chain: ChainHandle>(
    chain: &Chain,
    msgs: &[Any],
    tracking_id: &'static str,
    config: &TxConfig,
) -> SendOutcome {
    if msgs.is_empty() {
        return SendOutcome::NotSent;
    }

    for batch in batch_messages(msgs, config.max_msg_num, config.max_tx_size) {
        let msg_types = batch.iter().map(|msg| msg.type_url.as_str()).join(", ");
        let tracked_msgs = TrackedMsgs::new_static(batch, tracking_id);

        match chain.send_messages_and_wait_commit(tracked_msgs) {
            Ok(()) => {
                debug!(chain = %chain.id(), tracking_id, "submitted [{}]", msg_types);
            }
            Err(e) if e.is_send_error() => {
                warn!(
                    chain = %chain.id(),
                    tracking_id,
                    "transaction [{}] rejected: {}",
                    msg_types,
                    e
                );
                return SendOutcome::Rejected;
            }
            Err(e) => {
                error!(
                    chain = %chain.id(),
                    tracking_id,
                    "failed to submit [{}]: {}",
                    msg_types,
                    e
                );
                return SendOutcome::Rejected;
            }
        }
    }

    info!(chain = %chain.id(), tracking_id, count = msgs.len(), "all messages accepted");

    SendOutcome::Accepted
}

/// Split messages into consecutive transactions holding at most
/// `max_msg_num` messages each. A transaction is closed as soon as the
/// encoded size of its messages reaches `max_tx_size`.
pub fn batch_messages(msgs: &[Any], max_msg_num: usize, max_tx_size: usize) -> Vec<Vec<Any>> {
    let mut batches = vec![];

    let mut current_size = 0;
    let mut current_batch = vec![];

    for msg in msgs.iter() {
        current_size += msg.encoded_len();
        current_batch.push(msg.clone());

        if current_batch.len() >= max_msg_num || current_size >= max_tx_size {
            batches.push(core::mem::take(&mut current_batch));
            current_size = 0;
        }
    }

    if !current_batch.is_empty() {
        batches.push(current_batch);
    }

    batches
}
