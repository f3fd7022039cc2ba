//! Save-to-disk helpers: the platform save primitive, temporary object URLs and the two
//! download triggers used by export.

use crate::data_url::{Blob, DataUrl, DataUrlError};
use rustc_hash::FxHashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// How long an object URL stays resolvable after a blob download.
pub const OBJECT_URL_RELEASE_DELAY: Duration = Duration::from_secs(4);

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    DataUrl(#[from] DataUrlError),
    #[error("object URL already released: {0}")]
    ReleasedObjectUrl(String),
    #[error("failed to save {filename}: {source}")]
    Save {
        filename: String,
        #[source]
        source: io::Error,
    },
}

/// Hands bytes to the user agent under a suggested filename.
pub trait SaveTarget {
    fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Saves into a fixed directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySaveTarget {
    dir: PathBuf,
}

impl DirectorySaveTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveTarget for DirectorySaveTarget {
    fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        // Only the final component of the suggested name is honored.
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty filename"))?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMode {
    #[default]
    Save,
    /// Build the handle but never touch the save target.
    PreviewOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadHandle {
    pub href: String,
    pub filename: String,
    /// Where the bytes landed; `None` in preview mode.
    pub saved_to: Option<PathBuf>,
}

impl DownloadHandle {
    pub fn is_empty(&self) -> bool {
        self.href.is_empty() || self.filename.is_empty()
    }
}

struct ObjectUrlEntry {
    blob: Blob,
    expires_at: Instant,
}

/// Temporary `blob:` URLs. Each URL is released a fixed delay after creation; expired entries
/// are swept lazily on the next access.
pub struct ObjectUrlStore {
    release_after: Duration,
    entries: Mutex<FxHashMap<String, ObjectUrlEntry>>,
}

impl Default for ObjectUrlStore {
    fn default() -> Self {
        Self::new(OBJECT_URL_RELEASE_DELAY)
    }
}

impl ObjectUrlStore {
    pub fn new(release_after: Duration) -> Self {
        Self {
            release_after,
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, FxHashMap<String, ObjectUrlEntry>> {
        let mut guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        guard.retain(|url, e| {
            let live = e.expires_at > now;
            if !live {
                tracing::debug!(%url, "released object URL");
            }
            live
        });
        guard
    }

    pub fn create(&self, blob: Blob) -> String {
        let url = format!("blob:irflow/{}", uuid::Uuid::new_v4());
        let expires_at = Instant::now() + self.release_after;
        self.entries()
            .insert(url.clone(), ObjectUrlEntry { blob, expires_at });
        tracing::debug!(%url, release_after = ?self.release_after, "created object URL");
        url
    }

    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.entries().get(url).map(|e| e.blob.clone())
    }

    pub fn revoke(&self, url: &str) -> bool {
        self.entries().remove(url).is_some()
    }

    /// Number of URLs still resolvable.
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }
}

/// The two download triggers, bound to one save target and one object URL store.
#[derive(Clone)]
pub struct Downloads {
    target: Arc<dyn SaveTarget + Send + Sync>,
    object_urls: Arc<ObjectUrlStore>,
}

impl Downloads {
    pub fn new(
        target: Arc<dyn SaveTarget + Send + Sync>,
        object_urls: Arc<ObjectUrlStore>,
    ) -> Self {
        Self {
            target,
            object_urls,
        }
    }

    pub fn object_urls(&self) -> &ObjectUrlStore {
        &self.object_urls
    }

    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
        let path = self
            .target
            .save(filename, bytes)
            .map_err(|source| DownloadError::Save {
                filename: filename.to_string(),
                source,
            })?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved download");
        Ok(path)
    }

    pub fn download_data_url(
        &self,
        data_url: &str,
        filename: &str,
        mode: DownloadMode,
    ) -> Result<DownloadHandle, DownloadError> {
        let saved_to = match mode {
            DownloadMode::PreviewOnly => None,
            DownloadMode::Save => {
                let url = DataUrl::parse(data_url)?;
                Some(self.save(filename, url.data())?)
            }
        };
        Ok(DownloadHandle {
            href: data_url.to_string(),
            filename: filename.to_string(),
            saved_to,
        })
    }

    /// Saves through a temporary object URL. The URL outlives the call by the store's release
    /// delay, in both modes.
    pub fn download_blob(
        &self,
        blob: Blob,
        filename: &str,
        mode: DownloadMode,
    ) -> Result<DownloadHandle, DownloadError> {
        let url = self.object_urls.create(blob);
        let saved_to = match mode {
            DownloadMode::PreviewOnly => None,
            DownloadMode::Save => {
                let blob = self
                    .object_urls
                    .resolve(&url)
                    .ok_or_else(|| DownloadError::ReleasedObjectUrl(url.clone()))?;
                Some(self.save(filename, &blob.bytes)?)
            }
        };
        Ok(DownloadHandle {
            href: url,
            filename: filename.to_string(),
            saved_to,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every save instead of touching the filesystem.
    #[derive(Default)]
    pub struct RecordingSaveTarget {
        pub saved: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl RecordingSaveTarget {
        pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
            self.saved.lock().unwrap().clone()
        }
    }

    impl SaveTarget for RecordingSaveTarget {
        fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
            self.saved
                .lock()
                .unwrap()
                .push((filename.to_string(), bytes.to_vec()));
            Ok(PathBuf::from(filename))
        }
    }
}
