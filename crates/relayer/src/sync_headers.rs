//! Keeps track of the latest light-client header of both chains of a path
//! and computes the headers each chain's counterparty client needs to catch
//! up with it.

use alloc::sync::Arc;
use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, trace};

use ibc_relay_types::core::ics02_client::header::AnyHeader;
use ibc_relay_types::core::ics24_host::identifier::ChainId;

use crate::chain::handle::ChainHandle;
use crate::chain::requests::QueryContext;
use crate::error::Error;

/// A header synchronizer shared between the strategy runner and the event
/// listener tasks.
pub type SharedSyncHeaders = Arc<RwLock<SyncHeaders>>;

#[derive(Clone, Debug, Default)]
pub struct SyncHeaders {
    latest_headers: HashMap<ChainId, AnyHeader>,
}

impl SyncHeaders {
    /// Create a synchronizer and fetch the latest header of both chains.
    pub fn new<ChainA: ChainHandle, ChainB: ChainHandle>(
        src: &ChainA,
        dst: &ChainB,
    ) -> Result<Self, Error> {
        let mut sync_headers = Self::default();
        sync_headers.updates(src, dst)?;
        Ok(sync_headers)
    }

    /// Refresh the latest header of both chains.
    pub fn updates<ChainA: ChainHandle, ChainB: ChainHandle>(
        &mut self,
        src: &ChainA,
        dst: &ChainB,
    ) -> Result<(), Error> {
        self.update(src)?;
        self.update(dst)
    }

    fn update<Chain: ChainHandle>(&mut self, chain: &Chain) -> Result<(), Error> {
        let header = chain.query_latest_header()?;

        trace!(chain = %chain.id(), header = %header, "fetched latest header");

        self.latest_headers.insert(chain.id(), header);
        Ok(())
    }

    /// The latest known header of the given chain.
    pub fn latest_header(&self, chain_id: &ChainId) -> Result<&AnyHeader, Error> {
        self.latest_headers
            .get(chain_id)
            .ok_or_else(|| Error::missing_header(chain_id.clone()))
    }

    /// A query context pinned at the height of the latest known header of
    /// the given chain.
    pub fn query_context(&self, chain_id: &ChainId) -> Result<QueryContext, Error> {
        let header = self.latest_header(chain_id)?;
        Ok(QueryContext::new(chain_id.clone(), header.height()))
    }

    /// The headers `counterparty` needs to submit to bring its client of
    /// `chain` up to the latest known header of `chain`.
    ///
    /// Returns no headers when the client already trusts that height.
    pub fn setup_headers_for_update<Chain: ChainHandle, Counterparty: ChainHandle>(
        &self,
        chain: &Chain,
        counterparty: &Counterparty,
    ) -> Result<Vec<AnyHeader>, Error> {
        let chain_id = chain.id();
        let target = self.latest_header(&chain_id)?;
        let counterparty_ctx = self.query_context(&counterparty.id())?;

        let trusted_height = counterparty.query_client_latest_height(counterparty_ctx.height)?;

        if trusted_height >= target.height() {
            trace!(
                chain = %chain_id,
                counterparty = %counterparty.id(),
                %trusted_height,
                "client is up to date"
            );
            return Ok(Vec::new());
        }

        let headers = chain.build_headers_for_update(trusted_height, target)?;

        for pair in headers.windows(2) {
            if pair[0].height() >= pair[1].height() {
                return Err(Error::non_monotonic_headers(
                    chain_id,
                    pair[0].height(),
                    pair[1].height(),
                ));
            }
        }

        debug!(
            chain = %chain_id,
            counterparty = %counterparty.id(),
            %trusted_height,
            target_height = %target.height(),
            count = headers.len(),
            "built headers for update"
        );

        Ok(headers)
    }

    /// The update headers for both directions: `src` headers for the client
    /// on `dst`, and `dst` headers for the client on `src`.
    pub fn setup_both_headers_for_update<ChainA: ChainHandle, ChainB: ChainHandle>(
        &self,
        src: &ChainA,
        dst: &ChainB,
    ) -> Result<(Vec<AnyHeader>, Vec<AnyHeader>), Error> {
        let src_headers = self.setup_headers_for_update(src, dst)?;
        let dst_headers = self.setup_headers_for_update(dst, src)?;
        Ok((src_headers, dst_headers))
    }
}
