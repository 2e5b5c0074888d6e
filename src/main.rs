use std::path::PathBuf;
use std::sync::Arc;

use trello_sync::config::{SyncConfig, repository_url};
use trello_sync::events::EventPayload;
use trello_sync::git::{CommitSource, GitLog};
use trello_sync::sync::EventProcessor;
use trello_sync::trello::{DEFAULT_API_BASE_URL, TrelloApi, TrelloClient};

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    tracing::info!("trello-sync v{}", env!("CARGO_PKG_VERSION"));

    let config = SyncConfig::from_env()?;

    let base_url = env("TRELLO_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let trello: Arc<dyn TrelloApi> =
        Arc::new(TrelloClient::from_config(&config).with_base_url(base_url));

    // ── Event payload ───────────────────────────────────────────────
    let payload = match env("GITHUB_EVENT_PATH") {
        Some(path) => EventPayload::from_event_file(&PathBuf::from(path)).await?,
        None => {
            tracing::warn!("GITHUB_EVENT_PATH not set; syncing commits only");
            EventPayload::default()
        }
    };

    // ── Commits ─────────────────────────────────────────────────────
    let commits = match repository_url(env) {
        Some(url_prefix) => GitLog::new(".")
            .recent_commits(config.max_commit_depth, &url_prefix)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to read commits; skipping them");
                Vec::new()
            }),
        None => {
            tracing::warn!("GITHUB_REPOSITORY not set; cannot build commit URLs, skipping commits");
            Vec::new()
        }
    };

    let processor = EventProcessor::new(trello, &config)?;
    processor.process(payload.with_commits(commits)).await?;

    Ok(())
}
