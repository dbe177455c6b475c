//! One watch run: acquire, filter, notify, remember.

use crate::error::WatchError;
use wgwatch_notify::Notifier;
use wgwatch_scanner::Acquirer;
use wgwatch_store::SentStore;

/// Notify every listing not seen before and return how many were sent.
///
/// Listings are notified in extraction order. An id is recorded only after
/// its notification succeeded. When a notification fails, the ids recorded
/// so far are saved before the error is returned, so the next run resends
/// only what was not delivered.
pub async fn run(
    acquirer: &Acquirer,
    notifier: &dyn Notifier,
    store: &SentStore,
    query: &str,
) -> Result<usize, WatchError> {
    let mut sent = store.load()?;
    let listings = acquirer.acquire(query).await?;
    tracing::info!("{} listing(s) found, {} already notified", listings.len(), sent.len());

    let mut notified = 0;
    for listing in &listings {
        if sent.contains(&listing.id) {
            tracing::debug!("Skipping already notified listing {}", listing.id);
            continue;
        }

        if let Err(e) = notifier.notify(listing).await {
            tracing::error!("Notification for listing {} failed: {}", listing.id, e);
            store.save(&sent)?;
            return Err(e.into());
        }
        sent.insert(listing.id.clone());
        notified += 1;
    }

    store.save(&sent)?;
    Ok(notified)
}
