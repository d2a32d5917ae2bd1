//! Periodic spec refresh.
//!
//! Each tick re-runs the full load pass. When the tool set changes, connected peers receive a
//! tools-list-changed notification. A failed refresh logs a warning and keeps the previous tools.

use crate::server::PeerSet;
use openapi_mcp_tools::OpenApiToolSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Refresh `source` every `period` until `cancel` fires.
pub async fn run_spec_refresh(
    source: OpenApiToolSource,
    peers: Arc<PeerSet>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(period_secs = period.as_secs(), "spec refresh enabled");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                refresh_once(&source, &peers).await;
            }
            () = cancel.cancelled() => {
                tracing::debug!("spec refresh cancelled");
                return;
            }
        }
    }
}

/// One refresh pass. Returns whether peers were told the tool list changed.
pub async fn refresh_once(source: &OpenApiToolSource, peers: &PeerSet) -> bool {
    match source.refresh().await {
        Ok(true) => {
            tracing::info!(peers = peers.len(), "tool list changed, notifying peers");
            peers.notify_tool_list_changed().await;
            true
        }
        Ok(false) => {
            tracing::debug!("spec refreshed, tools unchanged");
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, "spec refresh failed, keeping previous tools");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openapi_mcp_tools::ApiSourceConfig;

    const V1: &str = r#"
openapi: 3.0.0
info: { title: Users, version: "1" }
servers: [{ url: "http://127.0.0.1:9" }]
paths:
  /users:
    get:
      responses: { "200": { description: ok } }
"#;

    const V2: &str = r#"
openapi: 3.0.0
info: { title: Users, version: "2" }
servers: [{ url: "http://127.0.0.1:9" }]
paths:
  /users:
    get:
      responses: { "200": { description: ok } }
    post:
      responses: { "201": { description: created } }
"#;

    async fn source_for(
        dir: &tempfile::TempDir,
        body: &str,
    ) -> (OpenApiToolSource, std::path::PathBuf) {
        let path = dir.path().join("openapi.yaml");
        std::fs::write(&path, body).unwrap();
        let source = OpenApiToolSource::new(ApiSourceConfig::new(path.to_str().unwrap()));
        source.start().await.unwrap();
        (source, path)
    }

    #[tokio::test]
    async fn unchanged_spec_does_not_notify() {
        let dir = tempfile::tempdir().unwrap();
        let (source, _path) = source_for(&dir, V1).await;
        let peers = PeerSet::default();

        assert!(!refresh_once(&source, &peers).await);
        assert_eq!(source.tool_names(), vec!["list_users"]);
    }

    #[tokio::test]
    async fn changed_spec_replaces_tools() {
        let dir = tempfile::tempdir().unwrap();
        let (source, path) = source_for(&dir, V1).await;
        let peers = PeerSet::default();

        std::fs::write(&path, V2).unwrap();
        assert!(refresh_once(&source, &peers).await);
        assert_eq!(source.tool_names(), vec!["list_users", "create_user"]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_tools() {
        let dir = tempfile::tempdir().unwrap();
        let (source, path) = source_for(&dir, V2).await;
        let peers = PeerSet::default();

        std::fs::write(&path, "openapi: [not, a, document").unwrap();
        assert!(!refresh_once(&source, &peers).await);
        assert_eq!(source.tool_names(), vec!["list_users", "create_user"]);
    }

    #[tokio::test]
    async fn refresh_task_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let (source, _path) = source_for(&dir, V1).await;
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_spec_refresh(
            source,
            Arc::new(PeerSet::default()),
            Duration::from_secs(3600),
            cancel.clone(),
        ));
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("refresh task should exit after cancel")
            .unwrap();
    }

    #[tokio::test]
    async fn refresh_task_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let (source, path) = source_for(&dir, V1).await;
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_spec_refresh(
            source.clone(),
            Arc::new(PeerSet::default()),
            Duration::from_millis(50),
            cancel.clone(),
        ));

        std::fs::write(&path, V2).unwrap();
        for _ in 0..100 {
            if source.tool_names().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(source.tool_names(), vec!["list_users", "create_user"]);

        cancel.cancel();
        task.await.unwrap();
    }
}
