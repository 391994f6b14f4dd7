// src/fetch/loader.rs

use reqwest::Client;
use std::{
    sync::{Arc, RwLock},
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle, time::sleep};
use tracing::{debug, info, instrument};

use super::catalog::acquire_snapshot;
use crate::catalog::CatalogSource;
use crate::table::TableSnapshot;

/// The page's only piece of dynamic state. Readers get a shared handle to
/// the current snapshot; the writer swaps the whole thing.
#[derive(Clone, Debug, Default)]
pub struct SnapshotSlot {
    inner: Arc<RwLock<SlotInner>>,
}

#[derive(Debug, Default)]
struct SlotInner {
    snapshot: Option<Arc<TableSnapshot>>,
    /// Set once the first fetch has finished, whatever its outcome.
    settled: bool,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<TableSnapshot>> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .snapshot
            .clone()
    }

    /// True until the first fetch has resolved.
    pub fn is_pending(&self) -> bool {
        !self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .settled
    }

    pub fn replace(&self, snapshot: TableSnapshot) {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.snapshot = Some(Arc::new(snapshot));
        inner.settled = true;
    }

    /// Record a finished fetch that produced nothing.
    pub fn mark_settled(&self) {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .settled = true;
    }
}

/// Ties an acquisition task to the lifetime of its page. Dropping the
/// guard cancels the task; a fetch that resolves afterwards is discarded.
pub struct MountGuard {
    cancel: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl MountGuard {
    /// Wait for the acquisition task to finish. With a refresh interval the
    /// task only ends when cancelled, so this is mostly useful for one-shot
    /// mounts.
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        let _ = self.cancel.send(true);
    }
}

/// Mount a page: fetch its snapshot once into `slot`, then again every
/// `refresh` if given. A failed refresh keeps the previous snapshot.
pub fn mount(
    client: Client,
    source: CatalogSource,
    slot: SnapshotSlot,
    refresh: Option<Duration>,
) -> MountGuard {
    let (cancel, cancelled) = watch::channel(false);
    let handle = tokio::spawn(run(client, source, slot, refresh, cancelled));
    MountGuard {
        cancel,
        handle: Some(handle),
    }
}

#[instrument(level = "debug", skip_all, fields(catalog = %source.catalog))]
async fn run(
    client: Client,
    source: CatalogSource,
    slot: SnapshotSlot,
    refresh: Option<Duration>,
    mut cancelled: watch::Receiver<bool>,
) {
    loop {
        let fetched = tokio::select! {
            snap = acquire_snapshot(&client, &source) => snap,
            _ = cancelled.changed() => {
                debug!("unmounted before fetch resolved; discarding");
                return;
            }
        };
        if *cancelled.borrow() {
            debug!("unmounted; discarding fetched snapshot");
            return;
        }
        match fetched {
            Some(snapshot) => {
                slot.replace(snapshot);
                info!("snapshot stored");
            }
            None => slot.mark_settled(),
        }

        let Some(every) = refresh else {
            return;
        };
        tokio::select! {
            _ = sleep(every) => {}
            _ = cancelled.changed() => {
                debug!("unmounted; refresh stopped");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogQuery};
    use crate::test_support::{eventually, fake_erddap, sample_body, FakeReply};
    use serde_json::json;
    use url::Url;

    fn source_for(base: &Url) -> CatalogSource {
        CatalogSource::new(Catalog::Griddap, base, &CatalogQuery::default()).unwrap()
    }

    #[tokio::test]
    async fn test_mount_fetches_once() {
        let server = fake_erddap(FakeReply::Json(sample_body())).await;
        let slot = SnapshotSlot::new();
        assert!(slot.get().is_none());
        assert!(slot.is_pending());

        let guard = mount(Client::new(), source_for(&server.base), slot.clone(), None);
        guard.join().await;

        let snap = slot.get().expect("snapshot should be stored");
        assert!(!slot.is_pending());
        assert_eq!(snap.columns()[5], "dataset_id");
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_slot_unset() {
        let server = fake_erddap(FakeReply::Status(500)).await;
        let slot = SnapshotSlot::new();
        mount(Client::new(), source_for(&server.base), slot.clone(), None)
            .join()
            .await;
        assert!(slot.get().is_none());
        assert!(!slot.is_pending(), "a failed fetch still settles the slot");
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_unmount_discards_late_result() {
        let server = fake_erddap(FakeReply::Delayed(
            Duration::from_millis(200),
            json!({"table": {"columnNames": ["Title"], "rows": [["late"]]}}),
        ))
        .await;
        let slot = SnapshotSlot::new();
        let guard = mount(Client::new(), source_for(&server.base), slot.clone(), None);

        assert!(eventually(Duration::from_secs(2), || server.hits() == 1).await);
        drop(guard);

        sleep(Duration::from_millis(400)).await;
        assert!(slot.get().is_none());
        assert!(slot.is_pending());
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let server = fake_erddap(FakeReply::Numbered).await;
        let slot = SnapshotSlot::new();
        let guard = mount(
            Client::new(),
            source_for(&server.base),
            slot.clone(),
            Some(Duration::from_millis(20)),
        );

        let replaced = eventually(Duration::from_secs(3), || {
            slot.get()
                .map(|s| s.rows()[0][0] != "1")
                .unwrap_or(false)
        })
        .await;
        assert!(replaced, "refresh should swap in a newer snapshot");

        drop(guard);
        sleep(Duration::from_millis(60)).await;
        let hits = server.hits();
        sleep(Duration::from_millis(100)).await;
        assert_eq!(server.hits(), hits, "no fetches after unmount");
    }
}
