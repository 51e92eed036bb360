use tracing::trace;

use crate::chain::handle::ChainHandle;
use crate::chain::requests::{ChannelWithProof, QueryContext};
use crate::error::Error;

/// Query the channel ends of both chains, each at its own query context.
pub fn query_channel_pair<ChainA: ChainHandle, ChainB: ChainHandle>(
    src_ctx: &QueryContext,
    dst_ctx: &QueryContext,
    src: &ChainA,
    dst: &ChainB,
) -> Result<(ChannelWithProof, ChannelWithProof), Error> {
    trace!(
        src_chain = %src_ctx.chain_id,
        src_height = %src_ctx.height,
        dst_chain = %dst_ctx.chain_id,
        dst_height = %dst_ctx.height,
        "querying channel pair"
    );

    let src_channel = src.query_channel(src_ctx.height)?;
    let dst_channel = dst.query_channel(dst_ctx.height)?;

    Ok((src_channel, dst_channel))
}
