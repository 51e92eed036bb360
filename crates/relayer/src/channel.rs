//! The channel open handshake between the two chains of a path.

pub mod error;
pub mod step;

use core::time::Duration;
use std::thread;

use prost_types::Any;
use tracing::{debug, error, error_span, info, warn};

use ibc_relay_types::core::ics02_client::header::AnyHeader;
use ibc_relay_types::core::ics04_channel::channel::Ordering;
use ibc_relay_types::core::ics04_channel::msgs::ChannelMsgType;

use crate::chain::counterparty::query_channel_pair;
use crate::chain::handle::ChainHandle;
use crate::chain::requests::{ChannelWithProof, QueryContext};
use crate::config::{Config, HeaderSyncConfig};
use crate::error::Error as RelayerError;
use crate::path::{validate_paths, PathEnd, PathEnds};
use crate::relay_msgs::RelayMsgs;
use crate::sync_headers::SyncHeaders;
use crate::util::retry::{retry_with_index, RetryError, RetryResult};

pub use error::{ChannelError, ChannelErrorDetail};
pub use step::{next_step, Side, StepAction};

mod retry_strategy {
    use core::time::Duration;

    use crate::config::HeaderSyncConfig;
    use crate::util::retry::ConstantGrowth;

    /// Constant delays between the attempts of a header sync, one delay
    /// less than the number of attempts.
    pub fn header_sync(config: &HeaderSyncConfig) -> impl Iterator<Item = Duration> {
        let retries = config.max_attempts.saturating_sub(1) as usize;

        ConstantGrowth::from(config.retry_delay)
            .clamp(config.max_retry_delay, retries)
            .iter()
    }
}

/// Tracing span for records about both ends of a channel.
pub fn channel_pair_span(paths: &PathEnds) -> tracing::Span {
    error_span!(
        "channel",
        src_chain = %paths.src.chain_id,
        src_channel = %paths.src.channel_id,
        src_port = %paths.src.port_id,
        dst_chain = %paths.dst.chain_id,
        dst_channel = %paths.dst.channel_id,
        dst_port = %paths.dst.port_id,
    )
}

/// Tracing span for records about a single channel end.
pub fn channel_span(path: &PathEnd) -> tracing::Span {
    error_span!(
        "channel",
        chain = %path.chain_id,
        channel = %path.channel_id,
        port = %path.port_id,
    )
}

fn log_channel_states(src_channel: &ChannelWithProof, dst_channel: &ChannelWithProof) {
    info!(
        src.state = %src_channel.state(),
        src.proof_height = ?src_channel.proof_height,
        dst.state = %dst_channel.state(),
        dst.proof_height = ?dst_channel.proof_height,
        "channel states"
    );
}

enum HeaderSyncFailure {
    Setup(RelayerError),
    Refresh(RelayerError),
}

/// Compute the update headers for both directions, retrying with fresh
/// latest headers when they cannot be built.
///
/// A failure to refresh the latest headers is not retried.
pub fn setup_update_headers<ChainA: ChainHandle, ChainB: ChainHandle>(
    sync_headers: &mut SyncHeaders,
    src: &ChainA,
    dst: &ChainB,
    config: &HeaderSyncConfig,
) -> Result<(Vec<AnyHeader>, Vec<AnyHeader>), ChannelError> {
    retry_with_index(retry_strategy::header_sync(config), |index| {
        if index > 1 {
            if let Err(e) = sync_headers.updates(src, dst) {
                return RetryResult::Err(HeaderSyncFailure::Refresh(e));
            }
        }

        match sync_headers.setup_both_headers_for_update(src, dst) {
            Ok(headers) => RetryResult::Ok(headers),
            Err(e) => {
                warn!(attempt = index, "failed to build update headers: {}", e);
                RetryResult::Retry(HeaderSyncFailure::Setup(e))
            }
        }
    })
    .map_err(|e: RetryError<HeaderSyncFailure>| match e.error {
        HeaderSyncFailure::Refresh(err) => ChannelError::header_refresh(err),
        HeaderSyncFailure::Setup(err) => ChannelError::max_retry(
            "failed to build update headers".to_string(),
            e.tries,
            e.total_delay,
            err,
        ),
    })
}

/// Check that the given channel ends are final, by querying them again at
/// the latest height of each chain.
///
/// Returns `false` when either end moved on in between, in which case the
/// observed states must not be acted upon yet.
pub fn check_channel_finality<ChainA: ChainHandle, ChainB: ChainHandle>(
    src: &ChainA,
    dst: &ChainB,
    src_channel: &ChannelWithProof,
    dst_channel: &ChannelWithProof,
) -> Result<bool, ChannelError> {
    let src_height = src.query_latest_height().map_err(ChannelError::query)?;
    let dst_height = dst.query_latest_height().map_err(ChannelError::query)?;

    let (src_latest, dst_latest) = query_channel_pair(
        &QueryContext::new(src.id(), src_height),
        &QueryContext::new(dst.id(), dst_height),
        src,
        dst,
    )
    .map_err(ChannelError::query)?;

    Ok(is_final("src", src_channel, &src_latest) && is_final("dst", dst_channel, &dst_latest))
}

fn is_final(side: &str, observed: &ChannelWithProof, latest: &ChannelWithProof) -> bool {
    let (from_state, to_state) = (observed.state(), latest.state());

    if from_state == to_state {
        return true;
    }

    if from_state.less_or_equal_progress(to_state) {
        debug!(side, %from_state, %to_state, "channel state in transition");
    } else {
        warn!(side, %from_state, %to_state, "channel state moved backwards");
    }

    false
}

/// Evaluate the next step of the channel open handshake.
///
/// Returns a batch with the messages to submit to either chain, or an empty
/// batch when the observed channel states are not final yet. A pair of
/// channel states the handshake never goes through yields a fatal error,
/// see [`ChannelError::is_fatal`].
pub fn create_channel_step<ChainA: ChainHandle, ChainB: ChainHandle>(
    src: &ChainA,
    dst: &ChainB,
    ordering: Ordering,
    config: &HeaderSyncConfig,
) -> Result<RelayMsgs, ChannelError> {
    let paths = validate_paths(src, dst).map_err(ChannelError::invalid_path)?;

    let span = channel_pair_span(&paths);
    let _span = span.enter();

    let mut sync_headers = SyncHeaders::new(src, dst).map_err(ChannelError::header_refresh)?;
    let (src_update_headers, dst_update_headers) =
        setup_update_headers(&mut sync_headers, src, dst, config)?;

    let src_ctx = sync_headers
        .query_context(&src.id())
        .map_err(ChannelError::relayer)?;
    let dst_ctx = sync_headers
        .query_context(&dst.id())
        .map_err(ChannelError::relayer)?;

    let (src_channel, dst_channel) =
        query_channel_pair(&src_ctx, &dst_ctx, src, dst).map_err(ChannelError::query)?;

    if !check_channel_finality(src, dst, &src_channel, &dst_channel)? {
        return Ok(RelayMsgs::new());
    }

    let action = next_step(src_channel.state(), dst_channel.state()).ok_or_else(|| {
        ChannelError::unexpected_channel_states(src_channel.state(), dst_channel.state())
    })?;

    log_channel_states(&src_channel, &dst_channel);

    let mut out = RelayMsgs::new().with_tracking_id(action.msg_type.as_str());
    out.last = action.last;

    match action.side {
        Side::Src => {
            let _span = channel_span(&paths.src).entered();
            out.src = build_step_msgs(
                src,
                &paths.dst,
                &dst_channel,
                &dst_update_headers,
                ordering,
                action,
            )?;
        }
        Side::Dst => {
            let _span = channel_span(&paths.dst).entered();
            out.dst = build_step_msgs(
                dst,
                &paths.src,
                &src_channel,
                &src_update_headers,
                ordering,
                action,
            )?;
        }
    }

    debug!(
        side = ?action.side,
        msg = %action.msg_type,
        count = out.src.len() + out.dst.len(),
        "built handshake step"
    );

    Ok(out)
}

/// The messages of one handshake step on `chain`: the update-client
/// messages for the pending counterparty headers, followed by the handshake
/// message.
fn build_step_msgs<Chain: ChainHandle>(
    chain: &Chain,
    counterparty: &PathEnd,
    counterparty_channel: &ChannelWithProof,
    update_headers: &[AnyHeader],
    ordering: Ordering,
    action: StepAction,
) -> Result<Vec<Any>, ChannelError> {
    let signer = chain.get_signer().map_err(ChannelError::relayer)?;

    let mut msgs = Vec::new();

    if action.update_client && !update_headers.is_empty() {
        let updates = chain
            .build_update_client(update_headers, &signer)
            .map_err(ChannelError::relayer)?;
        msgs.extend(updates);
    }

    let msg = match action.msg_type {
        ChannelMsgType::OpenInit => chain.build_chan_open_init(ordering, counterparty, &signer),
        ChannelMsgType::OpenTry => {
            chain.build_chan_open_try(ordering, counterparty, counterparty_channel, &signer)
        }
        ChannelMsgType::OpenAck => {
            chain.build_chan_open_ack(counterparty, counterparty_channel, &signer)
        }
        ChannelMsgType::OpenConfirm => chain.build_chan_open_confirm(counterparty_channel, &signer),
    }
    .map_err(ChannelError::relayer)?;

    msgs.push(msg);

    Ok(msgs)
}

/// Drive the channel open handshake between `src` and `dst` to completion.
///
/// Every `interval`, the next step is evaluated and submitted. The driver
/// returns once the final step was accepted, or with an error when a step
/// cannot be evaluated or when `max_failures` consecutive submissions
/// failed. A handshake whose states never become final keeps waiting.
pub fn create_channel<ChainA: ChainHandle, ChainB: ChainHandle>(
    src: &ChainA,
    dst: &ChainB,
    ordered: bool,
    interval: Duration,
    config: &Config,
) -> Result<(), ChannelError> {
    config.validate().map_err(ChannelError::invalid_config)?;

    let ordering = Ordering::from(ordered);
    let paths = validate_paths(src, dst).map_err(ChannelError::invalid_path)?;

    let span = channel_pair_span(&paths);
    let _span = span.enter();

    info!(%ordering, "starting channel handshake");

    let ticker = crossbeam_channel::tick(interval);
    let mut failures = 0;

    loop {
        let mut msgs = create_channel_step(src, dst, ordering, &config.header_sync)
            .map_err(|e| {
                error!("failed to create channel step: {}", e);
                e
            })?;

        if !msgs.is_ready() {
            debug!("waiting for next channel step");
        } else {
            msgs.send(src, dst, &config.tx);

            if msgs.success() {
                if msgs.is_last() {
                    info!("channel created");
                    return Ok(());
                }

                failures = 0;
            } else {
                failures += 1;

                if failures >= config.handshake.max_failures {
                    error!(failures, "channel handshake failed");

                    return Err(ChannelError::handshake_failed(
                        paths.src.chain_id.clone(),
                        paths.src.channel_id.clone(),
                        paths.src.port_id.clone(),
                        paths.dst.chain_id.clone(),
                        paths.dst.channel_id.clone(),
                        paths.dst.port_id.clone(),
                        failures,
                    ));
                }

                warn!(
                    failures,
                    src = %msgs.src_outcome(),
                    dst = %msgs.dst_outcome(),
                    "retrying transaction"
                );
                thread::sleep(config.handshake.failure_cooldown);
            }
        }

        let _ = ticker.recv();
    }
}
