//! The channel open handshake as a lookup table from the pair of observed
//! channel states to the next message to submit.

use ibc_relay_types::core::ics04_channel::channel::State;
use ibc_relay_types::core::ics04_channel::msgs::ChannelMsgType;

use ChannelMsgType::{OpenAck, OpenConfirm, OpenInit, OpenTry};
use State::{Init, Open, TryOpen, Uninitialized};

/// The chain a handshake message is submitted to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Src,
    Dst,
}

/// The next step of the handshake.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StepAction {
    pub side: Side,
    pub msg_type: ChannelMsgType,

    /// Submit the pending counterparty headers before the handshake
    /// message, so that the counterparty client can verify its proof.
    pub update_client: bool,

    /// Whether this step completes the handshake.
    pub last: bool,
}

impl StepAction {
    const fn new(side: Side, msg_type: ChannelMsgType, update_client: bool, last: bool) -> Self {
        Self {
            side,
            msg_type,
            update_client,
            last,
        }
    }
}

/// The only (src, dst) state pairs a channel open handshake goes through
/// before completion.
pub const HANDSHAKE_STEPS: [((State, State), StepAction); 7] = [
    (
        (Uninitialized, Uninitialized),
        StepAction::new(Side::Src, OpenInit, false, false),
    ),
    (
        (Uninitialized, Init),
        StepAction::new(Side::Src, OpenTry, true, false),
    ),
    (
        (Init, Uninitialized),
        StepAction::new(Side::Dst, OpenTry, true, false),
    ),
    (
        (TryOpen, Init),
        StepAction::new(Side::Dst, OpenAck, true, false),
    ),
    (
        (Init, TryOpen),
        StepAction::new(Side::Src, OpenAck, true, false),
    ),
    (
        (TryOpen, Open),
        StepAction::new(Side::Src, OpenConfirm, true, true),
    ),
    (
        (Open, TryOpen),
        StepAction::new(Side::Dst, OpenConfirm, true, true),
    ),
];

/// Look up the next handshake step for the given pair of channel states.
///
/// Returns `None` for any pair outside the table, including `(Open, Open)`
/// once the handshake is complete.
pub fn next_step(src_state: State, dst_state: State) -> Option<StepAction> {
    HANDSHAKE_STEPS
        .iter()
        .find(|((src, dst), _)| *src == src_state && *dst == dst_state)
        .map(|(_, action)| *action)
}
