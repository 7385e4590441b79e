//! File transfer: `getFile` resolution and streamed downloads.

use super::types::TgFile;
use super::Bot;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::Ordering;
use telegrab_core::{error::TelegrabError, message::FileReference};
use tracing::{error, info};

/// Prefix of sequentially named direct-URL downloads.
const SEQUENCE_PREFIX: &str = "file_";

impl Bot {
    /// Download a file id or direct URL. Failures are logged and yield `None`.
    pub async fn download(&self, reference: &str) -> Option<PathBuf> {
        info!("trying to download {reference}");
        match self.try_download(reference).await {
            Ok(path) => {
                info!("downloaded {reference} to {}", path.display());
                Some(path)
            }
            Err(e) => {
                error!("can't download {reference}: {e}");
                None
            }
        }
    }

    /// Download a reference, classifying it with the dot heuristic.
    pub async fn try_download(&self, reference: &str) -> Result<PathBuf, TelegrabError> {
        if reference.is_empty() {
            return Err(TelegrabError::EmptyReference);
        }
        self.download_reference(FileReference::infer(reference)).await
    }

    /// Download a reference whose kind the caller already knows.
    ///
    /// A partially written file is left in place when the transfer fails.
    pub async fn download_reference(
        &self,
        reference: FileReference,
    ) -> Result<PathBuf, TelegrabError> {
        if reference.as_str().is_empty() {
            return Err(TelegrabError::EmptyReference);
        }
        let transport = self.transport()?;

        match reference {
            FileReference::DirectUrl(url) => {
                let dest = self.next_file_path()?;
                transport.download_to(&url, &dest).await?;
                Ok(dest)
            }
            FileReference::FileId(file_id) => {
                let file: TgFile = transport
                    .post_form("getFile", &[("file_id", file_id)], None)
                    .await?;
                let remote_path = file.file_path.ok_or_else(|| {
                    TelegrabError::Protocol("telegram getFile returned no file_path".into())
                })?;

                let dest = local_path_for(&self.download_dir, &remote_path)?;
                if let Some(parent) = dest.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                transport
                    .download_to(&transport.file_url(&remote_path), &dest)
                    .await?;
                Ok(dest)
            }
        }
    }

    /// Reserve the next `file_<n>` name. Only the counter bump is exclusive.
    fn next_file_path(&self) -> Result<PathBuf, TelegrabError> {
        let n = self
            .next_file_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .map_err(|_| {
                TelegrabError::Io(std::io::Error::other("file sequence numbers exhausted"))
            })?;
        Ok(self.download_dir.join(format!("{SEQUENCE_PREFIX}{n}")))
    }
}

/// One past the highest `file_<n>` entry in `dir`, or 1 when there is none.
pub(crate) fn scan_next_file_id(dir: &Path) -> Result<u64, TelegrabError> {
    let unreadable =
        |e: std::io::Error| TelegrabError::Config(format!("unable to read {}: {e}", dir.display()));

    let mut highest = 0u64;
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let name = entry.map_err(unreadable)?.file_name();
        let n = name
            .to_str()
            .and_then(|s| s.strip_prefix(SEQUENCE_PREFIX))
            .and_then(|s| s.parse::<u64>().ok());
        if let Some(n) = n {
            highest = highest.max(n);
        }
    }
    highest.checked_add(1).ok_or_else(|| {
        TelegrabError::Config(format!(
            "{} holds {SEQUENCE_PREFIX}{highest}, no sequence numbers left",
            dir.display()
        ))
    })
}

/// Mirror a `getFile` path (e.g. `photos/file_3.jpg`) under the download dir.
///
/// Paths that would escape the download dir are rejected.
pub(crate) fn local_path_for(download_dir: &Path, remote_path: &str) -> Result<PathBuf, TelegrabError> {
    let relative = Path::new(remote_path);
    let safe = !remote_path.is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !safe {
        return Err(TelegrabError::Protocol(format!(
            "refusing unsafe remote file path '{remote_path}'"
        )));
    }
    Ok(download_dir.join(relative))
}
