//! One pass over the daemon's torrents.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use super::evaluator::{
    check_completion, check_grace, check_seeding, check_upload, KeepReason, Policy,
};
use super::result::{Outcome, SweepResult};
use super::shutdown::Shutdown;
use crate::error::{ReaperError, Result};
use crate::rpc::{TorrentRpc, DEFAULT_VIEW};
use crate::torrent::Torrent;

/// Drives a sweep: list, evaluate each torrent, delete the eligible ones.
///
/// Attributes are fetched one call at a time and only when the earlier rules
/// did not already keep the torrent. Torrents are processed sequentially in
/// the order the daemon returned them.
pub struct Sweeper<C: ?Sized> {
    /// Daemon client
    client: Arc<C>,
    /// Deletion policy
    policy: Policy,
    /// View to list
    view: String,
    /// Cancellation signal
    shutdown: Shutdown,
}

impl<C: TorrentRpc + ?Sized> Sweeper<C> {
    /// Create a sweeper over the default view that is never cancelled.
    pub fn new(client: Arc<C>, policy: Policy) -> Self {
        Self {
            client,
            policy,
            view: DEFAULT_VIEW.to_string(),
            shutdown: Shutdown::never(),
        }
    }

    /// List a different view.
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = view.into();
        self
    }

    /// Stop early, returning a partial result, once `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Run one sweep, evaluating the grace period against `now`.
    ///
    /// Only a failed list call is returned as an error. Per-torrent failures
    /// are counted, and cancellation yields the partial result with
    /// `cancelled` set.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepResult> {
        let torrents = match self.guarded(self.client.list_torrents(&self.view)).await {
            Ok(torrents) => torrents,
            Err(ReaperError::Cancelled) => {
                warn!(view = %self.view, "Sweep cancelled before the torrent list arrived");
                let mut result = SweepResult::new(0, self.policy.dry_run);
                result.cancelled = true;
                return Ok(result);
            }
            Err(err) => {
                error!(view = %self.view, error = %err, "Failed to list torrents");
                return Err(err);
            }
        };

        info!(
            view = %self.view,
            count = torrents.len(),
            "There are {} torrents in the daemon",
            torrents.len()
        );

        let mut result = SweepResult::new(torrents.len(), self.policy.dry_run);
        for (position, row) in torrents.iter().enumerate() {
            if self.shutdown.is_triggered() {
                result.cancelled = true;
                break;
            }

            let index = position + 1;
            let torrent = match row {
                Ok(torrent) => torrent,
                Err(err) => {
                    warn!(
                        index,
                        error = %err,
                        "Unreadable torrent row, skipping until next run"
                    );
                    result.record(Outcome::FetchFailed);
                    continue;
                }
            };

            match self.process(index, torrent, now).await {
                Ok(outcome) => result.record(outcome),
                Err(_) => {
                    result.cancelled = true;
                    break;
                }
            }
        }

        if result.cancelled {
            warn!(
                processed = result.processed(),
                total = result.total,
                "Sweep cancelled, returning partial result"
            );
        }

        info!(
            total = result.total,
            skipped_incomplete = result.skipped_incomplete,
            skipped_still_seeding = result.skipped_still_seeding,
            skipped_recently_changed = result.skipped_recently_changed,
            skipped_active_upload = result.skipped_active_upload,
            deleted = result.deleted,
            delete_failed = result.delete_failed,
            fetch_failed = result.fetch_failed,
            dry_run = result.dry_run,
            cancelled = result.cancelled,
            "Sweep finished"
        );

        Ok(result)
    }

    /// Walk the rules for one torrent. Errors only on cancellation.
    async fn process(
        &self,
        index: usize,
        torrent: &Torrent,
        now: DateTime<Utc>,
    ) -> Result<Outcome> {
        debug!(index, name = %torrent.name, "Checking torrent");

        if let Some(reason) = check_completion(torrent.completed) {
            return Ok(self.keep(index, torrent, reason));
        }

        let Some(state) = self
            .fetch(index, torrent, "state", self.client.state(torrent))
            .await?
        else {
            return Ok(Outcome::FetchFailed);
        };
        if let Some(reason) = check_seeding(state) {
            return Ok(self.keep(index, torrent, reason));
        }

        let Some(state_changed) = self
            .fetch(index, torrent, "state_changed", self.client.state_changed(torrent))
            .await?
        else {
            return Ok(Outcome::FetchFailed);
        };
        if let Some(reason) = check_grace(state_changed, &self.policy, now) {
            return Ok(self.keep(index, torrent, reason));
        }

        if self.policy.upload_threshold_kbps.is_some() {
            let Some(status) = self
                .fetch(index, torrent, "status", self.client.status(torrent))
                .await?
            else {
                return Ok(Outcome::FetchFailed);
            };
            if let Some(reason) = check_upload(status.up_rate, &self.policy) {
                return Ok(self.keep(index, torrent, reason));
            }
        }

        self.delete(index, torrent).await
    }

    fn keep(&self, index: usize, torrent: &Torrent, reason: KeepReason) -> Outcome {
        info!(
            index,
            name = %torrent.name,
            hash = %torrent.hash,
            reason = %reason,
            "KEEP     #{:02} {}",
            index,
            torrent.name
        );
        Outcome::Kept(reason)
    }

    async fn delete(&self, index: usize, torrent: &Torrent) -> Result<Outcome> {
        if self.policy.dry_run {
            info!(
                index,
                name = %torrent.name,
                hash = %torrent.hash,
                "DELETE   #{:02} {} (dry run)",
                index,
                torrent.name
            );
            return Ok(Outcome::Deleted);
        }

        match self.guarded(self.client.delete(torrent)).await {
            Ok(()) => {
                info!(
                    index,
                    name = %torrent.name,
                    hash = %torrent.hash,
                    "DELETE   #{:02} {}",
                    index,
                    torrent.name
                );
                Ok(Outcome::Deleted)
            }
            Err(ReaperError::Cancelled) => {
                warn!(
                    index,
                    name = %torrent.name,
                    hash = %torrent.hash,
                    "Cancelled while deleting torrent, outcome unknown"
                );
                Err(ReaperError::Cancelled)
            }
            Err(err) => {
                error!(
                    index,
                    name = %torrent.name,
                    hash = %torrent.hash,
                    error = %err,
                    "Failed to delete torrent"
                );
                Ok(Outcome::DeleteFailed)
            }
        }
    }

    /// Await an attribute fetch. `Ok(None)` means it failed and was logged.
    async fn fetch<T>(
        &self,
        index: usize,
        torrent: &Torrent,
        attribute: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<Option<T>> {
        match self.guarded(call).await {
            Ok(value) => Ok(Some(value)),
            Err(ReaperError::Cancelled) => Err(ReaperError::Cancelled),
            Err(err) => {
                warn!(
                    index,
                    name = %torrent.name,
                    hash = %torrent.hash,
                    attribute,
                    error = %err,
                    "Failed to fetch torrent attribute, skipping until next run"
                );
                Ok(None)
            }
        }
    }

    /// Race a daemon call against the shutdown signal.
    async fn guarded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.shutdown.triggered() => Err(ReaperError::Cancelled),
            result = call => result,
        }
    }
}

/// Run a single sweep over the default view with no cancellation.
pub async fn sweep<C: TorrentRpc + ?Sized>(
    client: Arc<C>,
    policy: Policy,
    now: DateTime<Utc>,
) -> Result<SweepResult> {
    Sweeper::new(client, policy).sweep(now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::shutdown;
    use crate::torrent::{TorrentState, TorrentStatus};
    use async_trait::async_trait;
    use chrono::TimeDelta;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Daemon-side attributes of a fake torrent; `None` makes the fetch fail.
    #[derive(Clone)]
    struct FakeTorrent {
        state: Option<TorrentState>,
        state_changed: Option<DateTime<Utc>>,
        up_rate: Option<u64>,
        delete_ok: bool,
        hang_on_state: bool,
        hang_on_delete: bool,
    }

    impl FakeTorrent {
        fn idle_for(idle: TimeDelta) -> Self {
            Self {
                state: Some(TorrentState::Stopped),
                state_changed: Some(now() - idle),
                up_rate: Some(0),
                delete_ok: true,
                hang_on_state: false,
                hang_on_delete: false,
            }
        }
    }

    #[derive(Default)]
    struct FakeRpc {
        torrents: Vec<Torrent>,
        details: HashMap<String, FakeTorrent>,
        fail_list: bool,
        bad_rows: usize,
        calls: Mutex<Vec<(&'static str, String)>>,
    }

    impl FakeRpc {
        fn with(mut self, torrent: Torrent, detail: FakeTorrent) -> Self {
            self.details.insert(torrent.hash.clone(), detail);
            self.torrents.push(torrent);
            self
        }

        fn detail(&self, method: &'static str, torrent: &Torrent) -> FakeTorrent {
            self.calls.lock().push((method, torrent.hash.clone()));
            self.details[&torrent.hash].clone()
        }

        fn calls(&self) -> Vec<(&'static str, String)> {
            self.calls.lock().clone()
        }

        fn calls_for(&self, hash: &str) -> Vec<&'static str> {
            self.calls()
                .into_iter()
                .filter(|(_, h)| h == hash)
                .map(|(method, _)| method)
                .collect()
        }
    }

    fn failure(what: &str) -> ReaperError {
        ReaperError::Fault {
            code: -501,
            message: format!("{what} failed"),
        }
    }

    #[async_trait]
    impl TorrentRpc for FakeRpc {
        async fn list_torrents(&self, view: &str) -> Result<Vec<Result<Torrent>>> {
            self.calls.lock().push(("list", view.to_string()));
            if self.fail_list {
                return Err(failure("list"));
            }
            let mut rows: Vec<Result<Torrent>> = self.torrents.iter().cloned().map(Ok).collect();
            for _ in 0..self.bad_rows {
                rows.push(Err(ReaperError::UnexpectedResponse("d.hash is not a string".into())));
            }
            Ok(rows)
        }

        async fn state(&self, torrent: &Torrent) -> Result<TorrentState> {
            let detail = self.detail("state", torrent);
            if detail.hang_on_state {
                std::future::pending::<()>().await;
            }
            detail.state.ok_or_else(|| failure("state"))
        }

        async fn state_changed(&self, torrent: &Torrent) -> Result<DateTime<Utc>> {
            self.detail("state_changed", torrent)
                .state_changed
                .ok_or_else(|| failure("state_changed"))
        }

        async fn status(&self, torrent: &Torrent) -> Result<TorrentStatus> {
            let up_rate = self
                .detail("status", torrent)
                .up_rate
                .ok_or_else(|| failure("status"))?;
            Ok(TorrentStatus {
                completed: true,
                up_rate,
                ..TorrentStatus::default()
            })
        }

        async fn delete(&self, torrent: &Torrent) -> Result<()> {
            let detail = self.detail("delete", torrent);
            if detail.hang_on_delete {
                std::future::pending::<()>().await;
            }
            if detail.delete_ok {
                Ok(())
            } else {
                Err(failure("delete"))
            }
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn policy() -> Policy {
        Policy {
            min_idle: Duration::from_secs(3600),
            dry_run: false,
            upload_threshold_kbps: Some(1024),
        }
    }

    fn three_torrents() -> FakeRpc {
        FakeRpc::default()
            .with(
                Torrent::new("A", "downloading", false),
                FakeTorrent::idle_for(TimeDelta::hours(2)),
            )
            .with(
                Torrent::new("B", "seeding", true),
                FakeTorrent {
                    state: Some(TorrentState::Started),
                    ..FakeTorrent::idle_for(TimeDelta::hours(2))
                },
            )
            .with(
                Torrent::new("C", "finished", true),
                FakeTorrent::idle_for(TimeDelta::hours(2)),
            )
    }

    #[tokio::test]
    async fn test_three_torrent_scenario() {
        let rpc = Arc::new(three_torrents());

        let result = sweep(rpc.clone(), policy(), now()).await.unwrap();

        assert_eq!(
            result,
            SweepResult {
                total: 3,
                skipped_incomplete: 1,
                skipped_still_seeding: 1,
                deleted: 1,
                ..SweepResult::default()
            }
        );
        assert!(rpc.calls_for("A").is_empty());
        assert_eq!(rpc.calls_for("B"), vec!["state"]);
        assert_eq!(
            rpc.calls_for("C"),
            vec!["state", "state_changed", "status", "delete"]
        );
    }

    #[tokio::test]
    async fn test_torrents_processed_in_daemon_order() {
        let rpc = Arc::new(three_torrents());

        sweep(rpc.clone(), policy(), now()).await.unwrap();

        let hashes: Vec<String> = rpc
            .calls()
            .into_iter()
            .filter(|(method, _)| *method == "state")
            .map(|(_, hash)| hash)
            .collect();
        assert_eq!(hashes, vec!["B", "C"]);
        assert_eq!(rpc.calls()[0], ("list", "main".to_string()));
    }

    #[tokio::test]
    async fn test_dry_run_never_deletes() {
        let rpc = Arc::new(three_torrents());
        let policy = Policy {
            dry_run: true,
            ..policy()
        };

        let result = sweep(rpc.clone(), policy, now()).await.unwrap();

        assert_eq!(result.deleted, 1);
        assert!(result.dry_run);
        assert!(rpc.calls().iter().all(|(method, _)| *method != "delete"));
    }

    #[tokio::test]
    async fn test_list_failure_aborts() {
        let rpc = Arc::new(FakeRpc {
            fail_list: true,
            ..three_torrents()
        });

        let result = sweep(rpc.clone(), policy(), now()).await;

        tokio_test::assert_err!(result);
        assert_eq!(rpc.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_state_failure_skips_torrent_only() {
        let rpc = Arc::new(
            FakeRpc::default()
                .with(
                    Torrent::new("X", "broken", true),
                    FakeTorrent {
                        state: None,
                        ..FakeTorrent::idle_for(TimeDelta::hours(2))
                    },
                )
                .with(
                    Torrent::new("Y", "fine", true),
                    FakeTorrent::idle_for(TimeDelta::hours(2)),
                ),
        );

        let result = sweep(rpc.clone(), policy(), now()).await.unwrap();

        assert_eq!(result.fetch_failed, 1);
        assert_eq!(result.deleted, 1);
        assert_eq!(rpc.calls_for("X"), vec!["state"]);
    }

    #[tokio::test]
    async fn test_state_changed_failure_never_deletes() {
        let rpc = Arc::new(FakeRpc::default().with(
            Torrent::new("X", "no timestamp", true),
            FakeTorrent {
                state_changed: None,
                ..FakeTorrent::idle_for(TimeDelta::hours(2))
            },
        ));

        let result = sweep(rpc.clone(), policy(), now()).await.unwrap();

        assert_eq!(result.fetch_failed, 1);
        assert_eq!(result.deleted, 0);
        assert_eq!(rpc.calls_for("X"), vec!["state", "state_changed"]);
    }

    #[tokio::test]
    async fn test_status_failure_is_fetch_failure() {
        let rpc = Arc::new(FakeRpc::default().with(
            Torrent::new("X", "no status", true),
            FakeTorrent {
                up_rate: None,
                ..FakeTorrent::idle_for(TimeDelta::hours(2))
            },
        ));

        let result = sweep(rpc.clone(), policy(), now()).await.unwrap();

        assert_eq!(result.fetch_failed, 1);
        assert_eq!(result.deleted, 0);
        assert!(!rpc.calls_for("X").contains(&"delete"));
    }

    #[tokio::test]
    async fn test_delete_failure_is_counted_and_sweep_continues() {
        let rpc = Arc::new(
            FakeRpc::default()
                .with(
                    Torrent::new("X", "stuck", true),
                    FakeTorrent {
                        delete_ok: false,
                        ..FakeTorrent::idle_for(TimeDelta::hours(2))
                    },
                )
                .with(
                    Torrent::new("Y", "fine", true),
                    FakeTorrent::idle_for(TimeDelta::hours(2)),
                ),
        );

        let result = sweep(rpc.clone(), policy(), now()).await.unwrap();

        assert_eq!(result.delete_failed, 1);
        assert_eq!(result.deleted, 1);
    }

    #[tokio::test]
    async fn test_recent_change_skips_status() {
        let rpc = Arc::new(FakeRpc::default().with(
            Torrent::new("X", "fresh", true),
            FakeTorrent::idle_for(TimeDelta::minutes(30)),
        ));

        let result = sweep(rpc.clone(), policy(), now()).await.unwrap();

        assert_eq!(result.skipped_recently_changed, 1);
        assert_eq!(rpc.calls_for("X"), vec!["state", "state_changed"]);
    }

    #[tokio::test]
    async fn test_active_upload_is_kept() {
        let rpc = Arc::new(FakeRpc::default().with(
            Torrent::new("X", "popular", true),
            FakeTorrent {
                up_rate: Some(2 * 1024 * 1024),
                ..FakeTorrent::idle_for(TimeDelta::hours(2))
            },
        ));

        let result = sweep(rpc.clone(), policy(), now()).await.unwrap();

        assert_eq!(result.skipped_active_upload, 1);
        assert!(!rpc.calls_for("X").contains(&"delete"));
    }

    #[tokio::test]
    async fn test_without_threshold_status_is_not_fetched() {
        let rpc = Arc::new(FakeRpc::default().with(
            Torrent::new("X", "popular", true),
            FakeTorrent {
                up_rate: Some(u64::MAX),
                ..FakeTorrent::idle_for(TimeDelta::hours(2))
            },
        ));
        let policy = Policy {
            upload_threshold_kbps: None,
            ..policy()
        };

        let result = sweep(rpc.clone(), policy, now()).await.unwrap();

        assert_eq!(result.deleted, 1);
        assert_eq!(rpc.calls_for("X"), vec!["state", "state_changed", "delete"]);
    }

    #[tokio::test]
    async fn test_custom_view_is_listed() {
        let rpc = Arc::new(FakeRpc::default());

        let result = Sweeper::new(rpc.clone(), policy())
            .with_view("seeding")
            .sweep(now())
            .await
            .unwrap();

        assert_eq!(result.total, 0);
        assert_eq!(rpc.calls(), vec![("list", "seeding".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_returns_partial_result() {
        let rpc = Arc::new(
            FakeRpc::default()
                .with(
                    Torrent::new("A", "done", true),
                    FakeTorrent::idle_for(TimeDelta::hours(2)),
                )
                .with(
                    Torrent::new("B", "hangs", true),
                    FakeTorrent {
                        hang_on_state: true,
                        ..FakeTorrent::idle_for(TimeDelta::hours(2))
                    },
                )
                .with(
                    Torrent::new("C", "never reached", true),
                    FakeTorrent::idle_for(TimeDelta::hours(2)),
                ),
        );
        let (trigger, shutdown) = shutdown::channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.trigger();
        });

        let result = Sweeper::new(rpc.clone(), policy())
            .with_shutdown(shutdown)
            .sweep(now())
            .await
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.total, 3);
        assert_eq!(result.deleted, 1);
        assert_eq!(result.processed(), 1);
        assert!(rpc.calls_for("C").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_cancelled_mid_flight_is_not_counted() {
        let rpc = Arc::new(
            FakeRpc::default()
                .with(
                    Torrent::new("A", "hangs on erase", true),
                    FakeTorrent {
                        hang_on_delete: true,
                        ..FakeTorrent::idle_for(TimeDelta::hours(2))
                    },
                )
                .with(
                    Torrent::new("B", "never reached", true),
                    FakeTorrent::idle_for(TimeDelta::hours(2)),
                ),
        );
        let (trigger, shutdown) = shutdown::channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.trigger();
        });

        let result = Sweeper::new(rpc.clone(), policy())
            .with_shutdown(shutdown)
            .sweep(now())
            .await
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.deleted, 0);
        assert_eq!(result.delete_failed, 0);
        assert_eq!(result.processed(), 0);
        assert!(rpc.calls_for("A").contains(&"delete"));
        assert!(rpc.calls_for("B").is_empty());
    }

    #[tokio::test]
    async fn test_bad_row_is_fetch_failure_and_sweep_continues() {
        let rpc = Arc::new(FakeRpc {
            bad_rows: 1,
            ..three_torrents()
        });

        let result = sweep(rpc.clone(), policy(), now()).await.unwrap();

        assert_eq!(result.total, 4);
        assert_eq!(result.fetch_failed, 1);
        assert_eq!(result.skipped_incomplete, 1);
        assert_eq!(result.skipped_still_seeding, 1);
        assert_eq!(result.deleted, 1);
        assert_eq!(result.processed(), result.total);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let rpc = Arc::new(three_torrents());
        let (trigger, shutdown) = shutdown::channel();
        trigger.trigger();

        let result = Sweeper::new(rpc.clone(), policy())
            .with_shutdown(shutdown)
            .sweep(now())
            .await
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.processed(), 0);
        assert!(rpc.calls_for("C").is_empty());
    }

    #[tokio::test]
    async fn test_sweep_against_mock_daemon() {
        use crate::ratelimit::{HttpTransport, Throttled, DEFAULT_TIMEOUT};
        use crate::rpc::RtorrentClient;
        use httpmock::prelude::*;

        fn xml(value: &str) -> String {
            format!(
                "<?xml version=\"1.0\"?><methodResponse><params><param>{value}</param></params></methodResponse>"
            )
        }
        fn row(hash: &str, complete: i64, size: i64) -> String {
            format!(
                "<value><array><data><value><string>{hash}</string></value>\
                 <value><string>{hash}.iso</string></value><value><i8>{complete}</i8></value>\
                 <value><i8>{size}</i8></value><value><i8>0</i8></value>\
                 <value><string></string></value><value><string>/data</string></value></data></array></value>"
            )
        }

        let server = MockServer::start_async().await;
        let list = xml(&format!(
            "<value><array><data>{}{}{}</data></array></value>",
            row("AAA", 0, 100),
            row("BBB", 1, 100),
            row("CCC", 1, -1)
        ));
        server
            .mock_async(|when, then| {
                when.method(POST).body_includes("<methodName>d.multicall2</methodName>");
                then.status(200).body(list);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).body_includes("<methodName>d.state</methodName>");
                then.status(200).body(xml("<value><i8>0</i8></value>"));
            })
            .await;
        let changed = (now() - TimeDelta::hours(3)).timestamp();
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .body_includes("<methodName>d.state_changed</methodName>");
                then.status(200)
                    .body(xml(&format!("<value><i8>{changed}</i8></value>")));
            })
            .await;
        let erase = server
            .mock_async(|when, then| {
                when.method(POST).body_includes("<methodName>d.erase</methodName>");
                then.status(200).body(xml("<value><i8>0</i8></value>"));
            })
            .await;

        let url = server.url("/RPC2").parse().unwrap();
        let transport = Throttled::new(
            HttpTransport::new(DEFAULT_TIMEOUT).unwrap(),
            10,
            Duration::from_secs(1),
        );
        let client = Arc::new(RtorrentClient::new(url, transport));
        let policy = Policy {
            upload_threshold_kbps: None,
            ..policy()
        };

        let result = sweep(client, policy, now()).await.unwrap();

        // The odd size column on CCC does not stop it or BBB being evaluated
        erase.assert_calls_async(2).await;
        assert_eq!(result.total, 3);
        assert_eq!(result.skipped_incomplete, 1);
        assert_eq!(result.deleted, 2);
        assert_eq!(result.fetch_failed, 0);
    }
}
