use alloc::sync::Arc;
use core::fmt::Debug;

use prost_types::Any;

use ibc_relay_types::core::ics02_client::header::AnyHeader;
use ibc_relay_types::core::ics04_channel::channel::Ordering;
use ibc_relay_types::core::ics24_host::identifier::ChainId;
use ibc_relay_types::signer::Signer;
use ibc_relay_types::Height;

use crate::chain::requests::ChannelWithProof;
use crate::chain::tracking::TrackedMsgs;
use crate::error::Error;
use crate::event::EventBatch;
use crate::path::PathEnd;

pub type Subscription = crossbeam_channel::Receiver<Arc<EventBatch>>;

/// The interface the relaying core uses to talk to a chain.
///
/// Implementations own everything chain specific: RPC clients, keys, light
/// client verification and the encoding of the handshake messages. All
/// queries and message constructors are fallible; a query failure is
/// reported as an [`Error`] and retried or surfaced by the caller.
pub trait ChainHandle: Clone + Send + Sync + Debug + 'static {
    /// Get the [`ChainId`] of this chain.
    fn id(&self) -> ChainId;

    /// The path end configured on this chain, if any.
    fn path(&self) -> Option<PathEnd>;

    /// Subscribe to the events emitted by the chain.
    fn subscribe(&self) -> Result<Subscription, Error>;

    /// Submit the given messages as a single transaction and wait for it to
    /// be committed.
    ///
    /// A transaction the chain rejects or fails to include is reported as an
    /// [`Error::send_failed`], which the caller records as a failed
    /// submission rather than as a fault of the relayer.
    fn send_messages_and_wait_commit(&self, tracked_msgs: TrackedMsgs) -> Result<(), Error>;

    /// The address this chain signs transactions with.
    fn get_signer(&self) -> Result<Signer, Error>;

    fn query_latest_height(&self) -> Result<Height, Error>;

    /// The latest light-client header of this chain.
    fn query_latest_header(&self) -> Result<AnyHeader, Error>;

    /// The latest height of the counterparty chain trusted by the client on
    /// this chain, queried at the given height.
    fn query_client_latest_height(&self, height: Height) -> Result<Height, Error>;

    /// Build the headers that advance a client of this chain from
    /// `trusted_height` up to `target`, in increasing height order.
    fn build_headers_for_update(
        &self,
        trusted_height: Height,
        target: &AnyHeader,
    ) -> Result<Vec<AnyHeader>, Error>;

    /// Query the channel end of this chain's path at the given height.
    ///
    /// A channel that does not exist is returned with the
    /// `Uninitialized` state.
    fn query_channel(&self, height: Height) -> Result<ChannelWithProof, Error>;

    fn build_chan_open_init(
        &self,
        ordering: Ordering,
        counterparty: &PathEnd,
        signer: &Signer,
    ) -> Result<Any, Error>;

    fn build_chan_open_try(
        &self,
        ordering: Ordering,
        counterparty: &PathEnd,
        counterparty_channel: &ChannelWithProof,
        signer: &Signer,
    ) -> Result<Any, Error>;

    fn build_chan_open_ack(
        &self,
        counterparty: &PathEnd,
        counterparty_channel: &ChannelWithProof,
        signer: &Signer,
    ) -> Result<Any, Error>;

    fn build_chan_open_confirm(
        &self,
        counterparty_channel: &ChannelWithProof,
        signer: &Signer,
    ) -> Result<Any, Error>;

    /// Build one update-client message per header, for the client of the
    /// counterparty hosted on this chain.
    fn build_update_client(&self, headers: &[AnyHeader], signer: &Signer)
        -> Result<Vec<Any>, Error>;
}
