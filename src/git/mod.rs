//! Recent commits from local git history.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::GitError;
use crate::events::CommitEvent;

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/// Supplies commits to sync.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Up to `max_count` most recent commits, oldest first. Commit URLs are
    /// `{url_prefix}/commit/{sha}`.
    async fn recent_commits(
        &self,
        max_count: usize,
        url_prefix: &str,
    ) -> Result<Vec<CommitEvent>, GitError>;
}

/// Reads commits with `git log` in a working directory.
pub struct GitLog {
    workdir: PathBuf,
}

impl GitLog {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

#[async_trait]
impl CommitSource for GitLog {
    async fn recent_commits(
        &self,
        max_count: usize,
        url_prefix: &str,
    ) -> Result<Vec<CommitEvent>, GitError> {
        let output = Command::new("git")
            .current_dir(&self.workdir)
            .args([
                "log",
                "-n",
                &max_count.to_string(),
                "--reverse",
                "--format=%H%x1f%an%x1f%B%x1e",
            ])
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(GitError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let commits = parse_log(&String::from_utf8_lossy(&output.stdout), url_prefix)?;
        tracing::debug!(count = commits.len(), "Read commits from git log");
        Ok(commits)
    }
}

/// Parse `git log` output in the `%H %an %B` record format.
pub fn parse_log(output: &str, url_prefix: &str) -> Result<Vec<CommitEvent>, GitError> {
    let url_prefix = url_prefix.trim_end_matches('/');
    output
        .split(RECORD_SEP)
        .map(|record| record.trim_start_matches(['\n', '\r']))
        .filter(|record| !record.trim().is_empty())
        .map(|record| {
            let mut fields = record.splitn(3, FIELD_SEP);
            match (fields.next(), fields.next(), fields.next()) {
                (Some(sha), Some(author), Some(message)) if !sha.is_empty() => Ok(CommitEvent {
                    url: format!("{url_prefix}/commit/{sha}"),
                    message: message.trim_end().to_string(),
                    author: author.to_string(),
                }),
                _ => Err(GitError::Parse(record.chars().take(80).collect())),
            }
        })
        .collect()
}
