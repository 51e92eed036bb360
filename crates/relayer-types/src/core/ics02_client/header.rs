use core::fmt::{Display, Error as FmtError, Formatter};

use prost_types::Any;

use crate::Height;

/// A light-client header produced by a chain, opaque to the relaying core.
///
/// The core only needs to know the height a header attests to, so it can
/// order headers and decide whether a counterparty client is already caught
/// up. The proto-encoded payload is handed back to the chain adapter that
/// builds the update-client messages.
#[derive(Clone, Debug, PartialEq)]
pub struct AnyHeader {
    height: Height,
    raw: Any,
}

impl AnyHeader {
    pub fn new(height: Height, raw: Any) -> Self {
        Self { height, raw }
    }

    /// The height of the consensus state this header attests to.
    pub fn height(&self) -> Height {
        self.height
    }

    pub fn raw(&self) -> &Any {
        &self.raw
    }
}

impl Display for AnyHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}@{}", self.raw.type_url, self.height)
    }
}
