//! Packet and acknowledgement relaying between the two chains of a path,
//! delegated to a pluggable [`Strategy`].

use alloc::sync::Arc;
use core::mem;
use core::time::Duration;
use std::sync::RwLock;

use crossbeam_channel::RecvTimeoutError;
use flex_error::define_error;
use tracing::{debug, error_span, info};

use ibc_relay_types::core::ics04_channel::packet::Sequence;

use crate::chain::handle::ChainHandle;
use crate::config::Config;
use crate::error::Error as RelayerError;
use crate::event::EventBatch;
use crate::sync_headers::{SharedSyncHeaders, SyncHeaders};
use crate::util::task::{spawn_background_task, Next, TaskError, TaskHandle};

define_error! {
    StrategyError {
        Relayer
            [ RelayerError ]
            |_| { "relayer error" },
    }
}

/// Packet sequences still to be relayed in each direction: `src` holds the
/// sequences sent on the source chain, `dst` those sent on the destination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelaySequences {
    pub src: Vec<Sequence>,
    pub dst: Vec<Sequence>,
}

/// A packet relaying policy.
///
/// The relaying core only decides when a strategy runs: once for the
/// packets and acknowledgements pending at startup, then whenever one of
/// the chains emits events. `handle_events` is called concurrently from one
/// listener task per chain, so implementations must synchronize their own
/// state.
pub trait Strategy: Send + Sync + 'static {
    /// A short name of the strategy, used in logs.
    fn strategy_type(&self) -> &'static str;

    fn unrelayed_sequences<ChainA: ChainHandle, ChainB: ChainHandle>(
        &self,
        src: &ChainA,
        dst: &ChainB,
        sync_headers: &SharedSyncHeaders,
    ) -> Result<RelaySequences, StrategyError>;

    fn unrelayed_acknowledgements<ChainA: ChainHandle, ChainB: ChainHandle>(
        &self,
        src: &ChainA,
        dst: &ChainB,
        sync_headers: &SharedSyncHeaders,
    ) -> Result<RelaySequences, StrategyError>;

    fn relay_packets<ChainA: ChainHandle, ChainB: ChainHandle>(
        &self,
        src: &ChainA,
        dst: &ChainB,
        sequences: &RelaySequences,
        sync_headers: &SharedSyncHeaders,
    ) -> Result<(), StrategyError>;

    fn relay_acknowledgements<ChainA: ChainHandle, ChainB: ChainHandle>(
        &self,
        src: &ChainA,
        dst: &ChainB,
        sequences: &RelaySequences,
        sync_headers: &SharedSyncHeaders,
    ) -> Result<(), StrategyError>;

    /// React to events emitted by `chain`, whose counterparty on the path is
    /// `counterparty`.
    fn handle_events<ChainA: ChainHandle, ChainB: ChainHandle>(
        &self,
        chain: &ChainA,
        counterparty: &ChainB,
        sync_headers: &SharedSyncHeaders,
        events: &EventBatch,
    ) -> Result<(), StrategyError>;
}

/// Handle to the event listener tasks started by [`run_strategy`].
///
/// Dropping the handle stops the listeners.
pub struct RelayHandle {
    task_handles: Vec<TaskHandle>,
}

impl RelayHandle {
    /// Signal both event listeners to stop, without waiting for them.
    pub fn shutdown(&self) {
        for task in self.task_handles.iter() {
            task.shutdown()
        }
    }

    /// Signal both event listeners to stop and wait for them to terminate.
    pub fn shutdown_and_wait(mut self) {
        for task in mem::take(&mut self.task_handles) {
            task.shutdown_and_wait();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.task_handles.iter().all(|task| task.is_stopped())
    }
}

impl Drop for RelayHandle {
    fn drop(&mut self) {
        self.shutdown()
    }
}

/// Start relaying between `src` and `dst` with the given strategy.
///
/// Spawns one event listener per chain, then relays the packets and
/// acknowledgements that are already pending. Further relaying is driven by
/// the listeners until the returned handle is shut down.
pub fn run_strategy<ChainA: ChainHandle, ChainB: ChainHandle, S: Strategy>(
    src: &ChainA,
    dst: &ChainB,
    strategy: S,
    config: &Config,
) -> Result<RelayHandle, StrategyError> {
    let strategy = Arc::new(strategy);

    let sync_headers = SyncHeaders::new(src, dst).map_err(StrategyError::relayer)?;
    let sync_headers: SharedSyncHeaders = Arc::new(RwLock::new(sync_headers));

    let poll_interval = config.event_listener.poll_interval;

    let src_listener = spawn_event_listener(
        src.clone(),
        dst.clone(),
        strategy.clone(),
        sync_headers.clone(),
        poll_interval,
    )?;

    let dst_listener = spawn_event_listener(
        dst.clone(),
        src.clone(),
        strategy.clone(),
        sync_headers.clone(),
        poll_interval,
    )?;

    let handle = RelayHandle {
        task_handles: vec![src_listener, dst_listener],
    };

    info!(
        strategy = strategy.strategy_type(),
        src_chain = %src.id(),
        dst_chain = %dst.id(),
        "running initial relay pass"
    );

    let sequences = strategy.unrelayed_sequences(src, dst, &sync_headers)?;
    debug!(src = sequences.src.len(), dst = sequences.dst.len(), "unrelayed packets");
    strategy.relay_packets(src, dst, &sequences, &sync_headers)?;

    let acks = strategy.unrelayed_acknowledgements(src, dst, &sync_headers)?;
    debug!(src = acks.src.len(), dst = acks.dst.len(), "unrelayed acknowledgements");
    strategy.relay_acknowledgements(src, dst, &acks, &sync_headers)?;

    Ok(handle)
}

fn spawn_event_listener<ChainA: ChainHandle, ChainB: ChainHandle, S: Strategy>(
    chain: ChainA,
    counterparty: ChainB,
    strategy: Arc<S>,
    sync_headers: SharedSyncHeaders,
    poll_interval: Duration,
) -> Result<TaskHandle, StrategyError> {
    let subscription = chain.subscribe().map_err(StrategyError::relayer)?;

    let span = error_span!(
        "event_listener",
        chain = %chain.id(),
        counterparty = %counterparty.id(),
    );

    Ok(spawn_background_task(span, None, move || {
        match subscription.recv_timeout(poll_interval) {
            Ok(batch) => {
                debug!(height = %batch.height, count = batch.events.len(), "received events");

                strategy
                    .handle_events(&chain, &counterparty, &sync_headers, &batch)
                    .map_err(TaskError::Ignore)?;

                Ok(Next::Continue)
            }
            Err(RecvTimeoutError::Timeout) => Ok(Next::Continue),
            Err(RecvTimeoutError::Disconnected) => Err(TaskError::Fatal(
                StrategyError::relayer(RelayerError::subscription(chain.id())),
            )),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crossbeam_channel::{unbounded, Receiver, Sender};
    use prost_types::Any;
    use test_log::test;

    use ibc_relay_types::core::ics24_host::identifier::ChainId;
    use ibc_relay_types::Height;

    use crate::chain::mock::MockChain;
    use crate::chain::tracking::{TrackedMsgs, TrackingId};
    use crate::event::IbcEvent;
    use crate::util::lock::LockExt;

    type Calls = Arc<RwLock<Vec<&'static str>>>;

    /// Relays every pending packet as one message on the counterparty and
    /// reports the events it is handed.
    struct RecordingStrategy {
        calls: Calls,
        events: Sender<(ChainId, ChainId, Vec<String>)>,
        pending: Vec<Sequence>,
    }

    impl Strategy for RecordingStrategy {
        fn strategy_type(&self) -> &'static str {
            "recording"
        }

        fn unrelayed_sequences<ChainA: ChainHandle, ChainB: ChainHandle>(
            &self,
            _src: &ChainA,
            _dst: &ChainB,
            _sync_headers: &SharedSyncHeaders,
        ) -> Result<RelaySequences, StrategyError> {
            self.calls.acquire_write().push("unrelayed_sequences");
            Ok(RelaySequences {
                src: self.pending.clone(),
                dst: Vec::new(),
            })
        }

        fn unrelayed_acknowledgements<ChainA: ChainHandle, ChainB: ChainHandle>(
            &self,
            _src: &ChainA,
            _dst: &ChainB,
            _sync_headers: &SharedSyncHeaders,
        ) -> Result<RelaySequences, StrategyError> {
            self.calls.acquire_write().push("unrelayed_acknowledgements");
            Ok(RelaySequences::default())
        }

        fn relay_packets<ChainA: ChainHandle, ChainB: ChainHandle>(
            &self,
            _src: &ChainA,
            dst: &ChainB,
            sequences: &RelaySequences,
            _sync_headers: &SharedSyncHeaders,
        ) -> Result<(), StrategyError> {
            self.calls.acquire_write().push("relay_packets");

            if sequences.src.is_empty() {
                return Ok(());
            }

            let msgs = sequences
                .src
                .iter()
                .map(|seq| Any {
                    type_url: "/ibc.core.channel.v1.MsgRecvPacket".to_string(),
                    value: u64::from(*seq).to_be_bytes().to_vec(),
                })
                .collect();

            dst.send_messages_and_wait_commit(TrackedMsgs::new_uuid(msgs))
                .map_err(StrategyError::relayer)
        }

        fn relay_acknowledgements<ChainA: ChainHandle, ChainB: ChainHandle>(
            &self,
            _src: &ChainA,
            _dst: &ChainB,
            _sequences: &RelaySequences,
            _sync_headers: &SharedSyncHeaders,
        ) -> Result<(), StrategyError> {
            self.calls.acquire_write().push("relay_acknowledgements");
            Ok(())
        }

        fn handle_events<ChainA: ChainHandle, ChainB: ChainHandle>(
            &self,
            chain: &ChainA,
            counterparty: &ChainB,
            sync_headers: &SharedSyncHeaders,
            events: &EventBatch,
        ) -> Result<(), StrategyError> {
            sync_headers
                .acquire_read()
                .latest_header(&chain.id())
                .map_err(StrategyError::relayer)?;

            let sequences = events
                .events
                .iter()
                .filter_map(|event| event.attribute("packet_sequence"))
                .map(str::to_string)
                .collect();

            let _ = self.events.send((chain.id(), counterparty.id(), sequences));

            Ok(())
        }
    }

    fn recording_strategy(
        pending: Vec<Sequence>,
    ) -> (RecordingStrategy, Calls, Receiver<(ChainId, ChainId, Vec<String>)>) {
        let calls = Calls::default();
        let (events, receiver) = unbounded();

        let strategy = RecordingStrategy {
            calls: calls.clone(),
            events,
            pending,
        };

        (strategy, calls, receiver)
    }

    fn send_packet_batch(chain: &MockChain) -> EventBatch {
        EventBatch {
            chain_id: chain.id(),
            height: Height::new(0, 12).unwrap(),
            events: vec![IbcEvent::new("send_packet").with_attribute("packet_sequence", "3")],
        }
    }

    #[test]
    fn initial_pass_relays_packets_then_acks() {
        let (src, dst) = MockChain::pair("ibc-0", "ibc-1");
        let (strategy, calls, _events) =
            recording_strategy(vec![Sequence::from(1), Sequence::from(2)]);

        let handle = run_strategy(&src, &dst, strategy, &Config::default()).unwrap();

        assert_eq!(
            *calls.acquire_read(),
            vec![
                "unrelayed_sequences",
                "relay_packets",
                "unrelayed_acknowledgements",
                "relay_acknowledgements"
            ]
        );

        let submitted = dst.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].messages().len(), 2);
        assert!(matches!(submitted[0].tracking_id(), TrackingId::Uuid(_)));
        assert!(src.submitted().is_empty());

        handle.shutdown_and_wait();
    }

    #[test]
    fn listeners_forward_events_with_counterparty() {
        let (src, dst) = MockChain::pair("ibc-0", "ibc-1");
        let (strategy, _calls, events) = recording_strategy(Vec::new());

        let handle = run_strategy(&src, &dst, strategy, &Config::default()).unwrap();

        src.emit(send_packet_batch(&src));
        let (chain, counterparty, sequences) =
            events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(
            (chain, counterparty, sequences),
            (src.id(), dst.id(), vec!["3".to_string()])
        );

        dst.emit(send_packet_batch(&dst));
        let (chain, counterparty, _) = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!((chain, counterparty), (dst.id(), src.id()));

        handle.shutdown_and_wait();
    }

    #[test]
    fn shutdown_stops_listeners() {
        let (src, dst) = MockChain::pair("ibc-0", "ibc-1");
        let (strategy, _calls, events) = recording_strategy(Vec::new());

        let handle = run_strategy(&src, &dst, strategy, &Config::default()).unwrap();
        handle.shutdown();

        for _ in 0..100 {
            if handle.is_stopped() {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(handle.is_stopped());

        src.emit(send_packet_batch(&src));
        assert!(events.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn failed_initial_pass_is_reported() {
        let (src, dst) = MockChain::pair("ibc-0", "ibc-1");
        dst.push_send_results([false]);
        let (strategy, _calls, _events) = recording_strategy(vec![Sequence::from(1)]);

        let res = run_strategy(&src, &dst, strategy, &Config::default());
        assert!(res.is_err());
    }
}
