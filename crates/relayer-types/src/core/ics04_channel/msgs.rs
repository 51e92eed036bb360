//! Message types of the channel open handshake.

use core::fmt::{Display, Error as FmtError, Formatter};

pub const CHAN_OPEN_INIT_TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelOpenInit";
pub const CHAN_OPEN_TRY_TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelOpenTry";
pub const CHAN_OPEN_ACK_TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelOpenAck";
pub const CHAN_OPEN_CONFIRM_TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelOpenConfirm";

/// The four messages of the channel open handshake.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChannelMsgType {
    OpenInit,
    OpenTry,
    OpenAck,
    OpenConfirm,
}

impl ChannelMsgType {
    pub fn type_url(&self) -> &'static str {
        match self {
            Self::OpenInit => CHAN_OPEN_INIT_TYPE_URL,
            Self::OpenTry => CHAN_OPEN_TRY_TYPE_URL,
            Self::OpenAck => CHAN_OPEN_ACK_TYPE_URL,
            Self::OpenConfirm => CHAN_OPEN_CONFIRM_TYPE_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenInit => "ChannelOpenInit",
            Self::OpenTry => "ChannelOpenTry",
            Self::OpenAck => "ChannelOpenAck",
            Self::OpenConfirm => "ChannelOpenConfirm",
        }
    }
}

impl Display for ChannelMsgType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.as_str())
    }
}
