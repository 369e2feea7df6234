pub mod clock;

use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::submission::Submission;

pub use clock::{Clock, RandomSuffix, SuffixSource, SystemClock};

/// How many suffixes are tried before giving up on a name collision.
pub const MAX_NAME_ATTEMPTS: usize = 16;

/// A report that has been written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReport {
    pub filename: String,
    pub path: PathBuf,
    pub timestamp: i64,
}

/// Writes each submission's stack trace to its own file in `dir`.
pub struct ReportStore {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
    suffixes: Arc<dyn SuffixSource>,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_sources(dir, Arc::new(SystemClock), Arc::new(RandomSuffix))
    }

    pub fn with_sources(
        dir: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
        suffixes: Arc<dyn SuffixSource>,
    ) -> Self {
        Self {
            dir: dir.into(),
            clock,
            suffixes,
        }
    }

    /// Creates a new file holding the raw stack trace. Existing files are
    /// never overwritten: a taken name is retried with a fresh suffix.
    pub async fn store(&self, submission: &Submission) -> std::io::Result<StoredReport> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let timestamp = self.clock.unix_seconds();
            let filename = report_filename(
                &submission.package_name,
                &submission.package_version,
                timestamp,
                self.suffixes.next_suffix(),
            );
            let path = self.dir.join(&filename);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::warn!("Report name {filename} already taken, drawing a new suffix");
                    continue;
                }
                Err(e) => return Err(e),
            };

            write_or_remove(&mut file, &path, &submission.stacktrace).await?;

            return Ok(StoredReport {
                filename,
                path,
                timestamp,
            });
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free report name after {MAX_NAME_ATTEMPTS} attempts"),
        ))
    }
}

/// Writes `contents` in full. On failure the file at `path` is removed so a
/// truncated report is never left behind.
async fn write_or_remove<W>(writer: &mut W, path: &Path, contents: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(contents).await?;
        writer.flush().await
    }
    .await;

    if let Err(e) = written {
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            tracing::error!("Failed to remove partial report {}: {remove_err}", path.display());
        }
        return Err(e);
    }
    Ok(())
}

/// `<package_name>-trace-<package_version>-<timestamp>-<suffix>`
pub fn report_filename(package_name: &str, package_version: &str, timestamp: i64, suffix: u16) -> String {
    format!(
        "{}-trace-{}-{timestamp}-{suffix}",
        path_safe(package_name),
        path_safe(package_version),
    )
}

// Keeps the name a single path component inside the traces directory.
fn path_safe(component: &str) -> Cow<'_, str> {
    if component.contains(['/', '\\', '\0']) {
        Cow::Owned(component.replace(['/', '\\', '\0'], "_"))
    } else {
        Cow::Borrowed(component)
    }
}
