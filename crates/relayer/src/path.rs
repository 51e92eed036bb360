use core::fmt::{Display, Error as FmtError, Formatter};

use serde::{Deserialize, Serialize};

use ibc_relay_types::core::ics04_channel::channel::Version;
use ibc_relay_types::core::ics24_host::identifier::{
    ChainId, ChannelId, ClientId, ConnectionId, PortId,
};

use crate::chain::handle::ChainHandle;
use crate::error::Error;

/// The identifiers that make up one end of a relayer path: the chain, the
/// light client tracking the counterparty, the connection over that client,
/// and the channel and port the handshake opens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEnd {
    pub chain_id: ChainId,
    pub client_id: ClientId,
    pub connection_id: ConnectionId,
    pub channel_id: ChannelId,
    pub port_id: PortId,
    /// Version proposed in `ChanOpenInit`. When absent the chain adapter
    /// picks the version of the application bound to the port.
    #[serde(default)]
    pub version: Option<Version>,
}

impl PathEnd {
    pub fn new(
        chain_id: ChainId,
        client_id: ClientId,
        connection_id: ConnectionId,
        channel_id: ChannelId,
        port_id: PortId,
    ) -> Self {
        Self {
            chain_id,
            client_id,
            connection_id,
            channel_id,
            port_id,
            version: None,
        }
    }

    pub fn with_version(self, version: Version) -> Self {
        Self {
            version: Some(version),
            ..self
        }
    }

    /// Checks that this path end belongs to the given chain.
    pub fn validate_for(&self, chain_id: &ChainId) -> Result<(), Error> {
        if &self.chain_id != chain_id {
            return Err(Error::path_chain_mismatch(
                chain_id.clone(),
                self.chain_id.clone(),
            ));
        }

        Ok(())
    }
}

impl Display for PathEnd {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "{}:{}/{}",
            self.chain_id, self.port_id, self.channel_id
        )
    }
}

/// Both configured ends of the path between two chains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathEnds {
    pub src: PathEnd,
    pub dst: PathEnd,
}

/// Fetches and validates the path ends of both chains.
///
/// Both chains must report a path, each path must name the chain it is
/// attached to, and the two chains must be distinct.
pub fn validate_paths<ChainA: ChainHandle, ChainB: ChainHandle>(
    src: &ChainA,
    dst: &ChainB,
) -> Result<PathEnds, Error> {
    let src_id = src.id();
    let dst_id = dst.id();

    let src_path = src.path().ok_or_else(|| Error::missing_path(src_id.clone()))?;
    let dst_path = dst.path().ok_or_else(|| Error::missing_path(dst_id.clone()))?;

    src_path.validate_for(&src_id)?;
    dst_path.validate_for(&dst_id)?;

    if src_id == dst_id {
        return Err(Error::identical_chains(src_id));
    }

    Ok(PathEnds {
        src: src_path,
        dst: dst_path,
    })
}
