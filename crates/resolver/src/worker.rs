use alloy_primitives::Address;
use eyre::Result;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::batch_reader::BatchReader;
use crate::resolver::{PositionResolver, ResolvedPositions};

/// Owner-keyed resolution loop. Re-resolves whenever the watched owner
/// changes and publishes snapshots on the positions channel.
///
/// In-flight rounds are never cancelled; a pass that completes after the
/// owner changed is discarded here instead of being merged into the new
/// owner's results.
pub async fn resolver_worker<R>(
    mut resolver: PositionResolver<R>,
    mut owner_rx: watch::Receiver<Option<Address>>,
    positions_tx: watch::Sender<ResolvedPositions>,
) -> Result<()>
where
    R: BatchReader,
{
    loop {
        let owner = *owner_rx.borrow_and_update();
        if owner.is_some() {
            let _ = positions_tx.send(ResolvedPositions::loading(owner));
        }

        match resolver.resolve(owner).await {
            Ok(resolved) => {
                if *owner_rx.borrow() == owner {
                    let _ = positions_tx.send(resolved);
                } else {
                    debug!(?owner, "owner changed during resolution, discarding stale result");
                }
            }
            Err(error) => {
                error!(%error, ?owner, "position resolution failed");
            }
        }

        if owner_rx.changed().await.is_err() {
            info!("owner channel closed, resolver worker exiting");
            return Ok(());
        }
    }
}
