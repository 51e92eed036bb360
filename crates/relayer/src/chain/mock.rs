use alloc::collections::VecDeque;
use alloc::sync::Arc;
use std::sync::RwLock;

use crossbeam_channel as channel;
use prost_types::Any;

use ibc_relay_types::core::ics02_client::header::AnyHeader;
use ibc_relay_types::core::ics02_client::msgs::UPDATE_CLIENT_TYPE_URL;
use ibc_relay_types::core::ics04_channel::channel::{
    ChannelEnd, Counterparty, Ordering, State, Version,
};
use ibc_relay_types::core::ics04_channel::msgs::ChannelMsgType;
use ibc_relay_types::core::ics24_host::identifier::{
    ChainId, ChannelId, ClientId, ConnectionId, PortId,
};
use ibc_relay_types::signer::Signer;
use ibc_relay_types::Height;

use crate::chain::handle::{ChainHandle, Subscription};
use crate::chain::requests::ChannelWithProof;
use crate::chain::tracking::TrackedMsgs;
use crate::error::Error;
use crate::event::EventBatch;
use crate::path::PathEnd;
use crate::util::lock::LockExt;

pub const MOCK_HEADER_TYPE_URL: &str = "/ibc.lightclients.mock.v1.Header";

/// A scriptable in-memory chain.
///
/// The chain has a latest header at `header_height` and has since moved on
/// to `latest_height`. Channel queries below the latest height observe
/// `channel_state`, while queries at the latest height observe
/// `latest_channel_state` when it is set, which lets tests simulate a
/// channel end that is still in transition.
///
/// Clones share the same state, so a test keeps a clone around to script
/// the chain and inspect what the code under test submitted.
#[derive(Clone, Debug)]
pub struct MockChain {
    state: Arc<RwLock<MockState>>,
}

#[derive(Debug)]
pub struct MockState {
    pub chain_id: ChainId,
    pub path: Option<PathEnd>,
    pub header_height: Height,
    pub latest_height: Height,
    pub channel_state: State,
    pub latest_channel_state: Option<State>,
    pub client_latest_height: Height,
    pub update_headers: Option<Vec<AnyHeader>>,
    pub header_failures: usize,
    pub refresh_failures: usize,
    pub fail_channel_queries: bool,
    pub send_results: VecDeque<bool>,
    pub submitted: Vec<TrackedMsgs>,
    pub header_queries: usize,
    pub event_sender: channel::Sender<Arc<EventBatch>>,
    pub event_receiver: channel::Receiver<Arc<EventBatch>>,
}

impl MockChain {
    pub fn new(chain_id: &str) -> Self {
        let chain_id = ChainId::from_string(chain_id);
        let (event_sender, event_receiver) = channel::unbounded();

        let state = MockState {
            chain_id,
            path: None,
            header_height: height(10),
            latest_height: height(11),
            channel_state: State::Uninitialized,
            latest_channel_state: None,
            client_latest_height: height(10),
            update_headers: None,
            header_failures: 0,
            refresh_failures: 0,
            fail_channel_queries: false,
            send_results: VecDeque::new(),
            submitted: Vec::new(),
            header_queries: 0,
            event_sender,
            event_receiver,
        };

        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Two chains with mirrored path ends, both at height 10 and each with a
    /// client that already trusts the other chain's latest header.
    pub fn pair(src_id: &str, dst_id: &str) -> (Self, Self) {
        let src = Self::new(src_id);
        let dst = Self::new(dst_id);

        src.set_path(Some(PathEnd::new(
            src.id(),
            ClientId::new("07-tendermint", 0).unwrap(),
            ConnectionId::new(0),
            ChannelId::new(0),
            PortId::transfer(),
        )));

        dst.set_path(Some(
            PathEnd::new(
                dst.id(),
                ClientId::new("07-tendermint", 1).unwrap(),
                ConnectionId::new(1),
                ChannelId::new(1),
                PortId::transfer(),
            )
            .with_version(Version::ics20()),
        ));

        (src, dst)
    }

    pub fn header(revision_height: u64) -> AnyHeader {
        AnyHeader::new(
            height(revision_height),
            Any {
                type_url: MOCK_HEADER_TYPE_URL.to_string(),
                value: revision_height.to_be_bytes().to_vec(),
            },
        )
    }

    pub fn set_path(&self, path: Option<PathEnd>) {
        self.state.acquire_write().path = path;
    }

    pub fn set_channel_state(&self, state: State) {
        self.state.acquire_write().channel_state = state;
    }

    pub fn set_latest_channel_state(&self, state: Option<State>) {
        self.state.acquire_write().latest_channel_state = state;
    }

    pub fn set_client_latest_height(&self, revision_height: u64) {
        self.state.acquire_write().client_latest_height = height(revision_height);
    }

    pub fn set_update_headers(&self, headers: Vec<AnyHeader>) {
        self.state.acquire_write().update_headers = Some(headers);
    }

    pub fn set_header_failures(&self, failures: usize) {
        self.state.acquire_write().header_failures = failures;
    }

    pub fn set_refresh_failures(&self, failures: usize) {
        self.state.acquire_write().refresh_failures = failures;
    }

    pub fn set_fail_channel_queries(&self, fail: bool) {
        self.state.acquire_write().fail_channel_queries = fail;
    }

    /// Queue the outcomes of the next transactions; once the queue is
    /// drained every transaction is accepted.
    pub fn push_send_results(&self, results: impl IntoIterator<Item = bool>) {
        self.state.acquire_write().send_results.extend(results);
    }

    pub fn submitted(&self) -> Vec<TrackedMsgs> {
        self.state.acquire_read().submitted.clone()
    }

    /// The type URLs of all submitted messages, in submission order.
    pub fn submitted_type_urls(&self) -> Vec<String> {
        self.state
            .acquire_read()
            .submitted
            .iter()
            .flat_map(|tx| tx.msgs.iter().map(|msg| msg.type_url.clone()))
            .collect()
    }

    pub fn header_queries(&self) -> usize {
        self.state.acquire_read().header_queries
    }

    pub fn emit(&self, batch: EventBatch) {
        let sender = self.state.acquire_read().event_sender.clone();
        let _ = sender.send(Arc::new(batch));
    }

    fn handshake_msg(&self, msg_type: ChannelMsgType, payload: String) -> Any {
        Any {
            type_url: msg_type.type_url().to_string(),
            value: payload.into_bytes(),
        }
    }
}

fn height(revision_height: u64) -> Height {
    Height::new(0, revision_height).unwrap()
}

impl ChainHandle for MockChain {
    fn id(&self) -> ChainId {
        self.state.acquire_read().chain_id.clone()
    }

    fn path(&self) -> Option<PathEnd> {
        self.state.acquire_read().path.clone()
    }

    fn subscribe(&self) -> Result<Subscription, Error> {
        Ok(self.state.acquire_read().event_receiver.clone())
    }

    fn send_messages_and_wait_commit(&self, tracked_msgs: TrackedMsgs) -> Result<(), Error> {
        let mut state = self.state.acquire_write();
        state.submitted.push(tracked_msgs);

        if state.send_results.pop_front().unwrap_or(true) {
            Ok(())
        } else {
            Err(Error::send_failed(
                state.chain_id.clone(),
                "out of gas".to_string(),
            ))
        }
    }

    fn get_signer(&self) -> Result<Signer, Error> {
        let chain_id = self.id();
        Ok(format!("{}-relayer", chain_id).parse().unwrap())
    }

    fn query_latest_height(&self) -> Result<Height, Error> {
        Ok(self.state.acquire_read().latest_height)
    }

    fn query_latest_header(&self) -> Result<AnyHeader, Error> {
        let mut state = self.state.acquire_write();
        state.header_queries += 1;

        if state.refresh_failures > 0 {
            state.refresh_failures -= 1;
            return Err(Error::query(
                state.chain_id.clone(),
                "latest header".to_string(),
                "connection refused".to_string(),
            ));
        }

        Ok(Self::header(state.header_height.revision_height()))
    }

    fn query_client_latest_height(&self, _height: Height) -> Result<Height, Error> {
        Ok(self.state.acquire_read().client_latest_height)
    }

    fn build_headers_for_update(
        &self,
        trusted_height: Height,
        target: &AnyHeader,
    ) -> Result<Vec<AnyHeader>, Error> {
        let mut state = self.state.acquire_write();

        if state.header_failures > 0 {
            state.header_failures -= 1;
            return Err(Error::header_construction(
                state.chain_id.clone(),
                format!("light block at {} not yet available", trusted_height),
            ));
        }

        Ok(state
            .update_headers
            .clone()
            .unwrap_or_else(|| vec![target.clone()]))
    }

    fn query_channel(&self, query_height: Height) -> Result<ChannelWithProof, Error> {
        let state = self.state.acquire_read();

        if state.fail_channel_queries {
            return Err(Error::query(
                state.chain_id.clone(),
                "channel".to_string(),
                "connection refused".to_string(),
            ));
        }

        let channel_state = match state.latest_channel_state {
            Some(latest) if query_height >= state.latest_height => latest,
            _ => state.channel_state,
        };

        let channel = ChannelEnd {
            state: channel_state,
            ordering: Ordering::Unordered,
            remote: Counterparty::default(),
            connection_hops: Vec::new(),
            version: Version::ics20(),
        };

        Ok(ChannelWithProof::new(channel, Vec::new(), query_height))
    }

    fn build_chan_open_init(
        &self,
        ordering: Ordering,
        counterparty: &PathEnd,
        signer: &Signer,
    ) -> Result<Any, Error> {
        Ok(self.handshake_msg(
            ChannelMsgType::OpenInit,
            format!("{}|{}|{}", ordering, counterparty, signer),
        ))
    }

    fn build_chan_open_try(
        &self,
        ordering: Ordering,
        counterparty: &PathEnd,
        counterparty_channel: &ChannelWithProof,
        signer: &Signer,
    ) -> Result<Any, Error> {
        Ok(self.handshake_msg(
            ChannelMsgType::OpenTry,
            format!(
                "{}|{}|{}|{}",
                ordering,
                counterparty,
                counterparty_channel.state(),
                signer
            ),
        ))
    }

    fn build_chan_open_ack(
        &self,
        counterparty: &PathEnd,
        counterparty_channel: &ChannelWithProof,
        signer: &Signer,
    ) -> Result<Any, Error> {
        Ok(self.handshake_msg(
            ChannelMsgType::OpenAck,
            format!("{}|{}|{}", counterparty, counterparty_channel.state(), signer),
        ))
    }

    fn build_chan_open_confirm(
        &self,
        counterparty_channel: &ChannelWithProof,
        signer: &Signer,
    ) -> Result<Any, Error> {
        Ok(self.handshake_msg(
            ChannelMsgType::OpenConfirm,
            format!("{}|{}", counterparty_channel.state(), signer),
        ))
    }

    fn build_update_client(
        &self,
        headers: &[AnyHeader],
        _signer: &Signer,
    ) -> Result<Vec<Any>, Error> {
        Ok(headers
            .iter()
            .map(|header| Any {
                type_url: UPDATE_CLIENT_TYPE_URL.to_string(),
                value: header.raw().value.clone(),
            })
            .collect())
    }
}
