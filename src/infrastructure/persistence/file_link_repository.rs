//! JSON-file implementation of the link and draft repositories.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::link_table::LinkTable;
use crate::domain::entities::{ClickEvent, LinkRecord, ShortenRequest};
use crate::domain::repositories::{DraftRepository, LinkRepository};
use crate::error::AppError;

const LINKS_FILE: &str = "links.json";
const DRAFTS_FILE: &str = "drafts.json";
const LOCK_FILE: &str = ".lock";

/// Durable local store keeping two JSON documents in one directory.
///
/// - `links.json` - every committed [`LinkRecord`], superseded ones included
/// - `drafts.json` - the pending form rows
/// - `.lock` - exclusive advisory lock held for the handle's lifetime
///
/// Only one handle per directory may be open at a time, across processes:
/// a second [`FileLinkRepository::open`] fails until the first is dropped.
///
/// Each mutation is applied to a copy of the table, written to a temp file
/// and renamed over the old document while the write lock is held. The
/// in-memory table is only swapped after the rename succeeds, so a failed
/// write leaves both disk and memory unchanged.
///
/// Missing or malformed documents load as empty collections.
pub struct FileLinkRepository {
    dir: PathBuf,
    links: RwLock<LinkTable>,
    drafts: RwLock<Vec<ShortenRequest>>,
    _lock: StoreLock,
}

impl FileLinkRepository {
    /// Opens (or initializes) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the directory cannot be
    /// created or another handle already holds it.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::StoreUnavailable(format!("cannot create {}: {e}", dir.display()))
        })?;

        let lock = StoreLock::acquire(&dir).await?;

        let records: Vec<LinkRecord> = load_collection(&dir.join(LINKS_FILE)).await;
        let drafts: Vec<ShortenRequest> = load_collection(&dir.join(DRAFTS_FILE)).await;

        info!(
            path = %dir.display(),
            records = records.len(),
            drafts = drafts.len(),
            "File link store opened"
        );

        Ok(Self {
            dir,
            links: RwLock::new(LinkTable::from_records(records)),
            drafts: RwLock::new(drafts),
            _lock: lock,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl fmt::Debug for FileLinkRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLinkRepository")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

/// Advisory `flock` on the store's lock file, released on drop.
struct StoreLock {
    #[cfg(unix)]
    _flock: nix::fcntl::Flock<std::fs::File>,
    #[cfg(not(unix))]
    _file: std::fs::File,
}

impl StoreLock {
    async fn acquire(dir: &Path) -> Result<Self, AppError> {
        let path = dir.join(LOCK_FILE);
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .await
            .map_err(|e| {
                AppError::StoreUnavailable(format!("cannot open {}: {e}", path.display()))
            })?
            .into_std()
            .await;

        Self::lock(file, dir)
    }

    #[cfg(unix)]
    fn lock(file: std::fs::File, dir: &Path) -> Result<Self, AppError> {
        use nix::fcntl::{Flock, FlockArg};

        let flock = Flock::lock(file, FlockArg::LockExclusiveNonblock).map_err(|(_, errno)| {
            AppError::StoreUnavailable(format!(
                "{} is in use by another process ({errno})",
                dir.display()
            ))
        })?;
        debug!(path = %dir.display(), "Store lock acquired");
        Ok(Self { _flock: flock })
    }

    #[cfg(not(unix))]
    fn lock(file: std::fs::File, dir: &Path) -> Result<Self, AppError> {
        warn!(path = %dir.display(), "Advisory locking unsupported here, store is unguarded");
        Ok(Self { _file: file })
    }
}

async fn load_collection<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No stored data yet");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read stored data, starting empty");
            return Vec::new();
        }
    };

    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Malformed stored data, starting empty");
        Vec::new()
    })
}

async fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> Result<(), AppError> {
    let body = serde_json::to_vec_pretty(items)
        .map_err(|e| AppError::internal(format!("failed to serialize store: {e}")))?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await.map_err(|e| {
        AppError::StoreUnavailable(format!("cannot write {}: {e}", tmp.display()))
    })?;
    tokio::fs::rename(&tmp, path).await.map_err(|e| {
        AppError::StoreUnavailable(format!("cannot replace {}: {e}", path.display()))
    })?;

    Ok(())
}

#[async_trait]
impl LinkRepository for FileLinkRepository {
    async fn create(&self, record: LinkRecord) -> Result<(), AppError> {
        let mut table = self.links.write().await;

        let mut next = table.clone();
        next.insert(record)?;
        write_collection(&self.dir.join(LINKS_FILE), next.records()).await?;

        *table = next;
        Ok(())
    }

    async fn find(&self, shortcode: &str) -> Result<Option<LinkRecord>, AppError> {
        Ok(self.links.read().await.find(shortcode).cloned())
    }

    async fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<LinkRecord>, AppError> {
        Ok(self.links.read().await.list_live(now))
    }

    async fn record_click(&self, shortcode: &str, event: ClickEvent) -> Result<(), AppError> {
        let mut table = self.links.write().await;

        let mut next = table.clone();
        next.record_click(shortcode, event)?;
        write_collection(&self.dir.join(LINKS_FILE), next.records()).await?;

        *table = next;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[async_trait]
impl DraftRepository for FileLinkRepository {
    async fn load_drafts(&self) -> Result<Vec<ShortenRequest>, AppError> {
        Ok(self.drafts.read().await.clone())
    }

    async fn save_drafts(&self, drafts: Vec<ShortenRequest>) -> Result<(), AppError> {
        let mut current = self.drafts.write().await;
        write_collection(&self.dir.join(DRAFTS_FILE), &drafts).await?;
        *current = drafts;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn record(code: &str, created_at: DateTime<Utc>) -> LinkRecord {
        LinkRecord::new(
            code.to_string(),
            format!("https://example.com/{code}"),
            created_at,
            Some(created_at + Duration::minutes(30)),
        )
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let now = Utc::now();

        {
            let repo = FileLinkRepository::open(tmp.path()).await.unwrap();
            repo.create(record("abcd", now)).await.unwrap();
            repo.record_click("abcd", ClickEvent::new(now, Some("direct".into()), None))
                .await
                .unwrap();
        }

        let reopened = FileLinkRepository::open(tmp.path()).await.unwrap();
        let found = reopened.find("abcd").await.unwrap().unwrap();

        assert_eq!(found.original_url, "https://example.com/abcd");
        assert_eq!(found.click_count, 1);
        assert_eq!(found.click_log[0].source.as_deref(), Some("direct"));
    }

    #[tokio::test]
    async fn test_malformed_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(LINKS_FILE), b"{not json").unwrap();
        std::fs::write(tmp.path().join(DRAFTS_FILE), b"[1, 2").unwrap();

        let repo = FileLinkRepository::open(tmp.path()).await.unwrap();

        assert!(repo.list_live(Utc::now()).await.unwrap().is_empty());
        assert!(repo.load_drafts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_create_leaves_file_unchanged() {
        let tmp = TempDir::new().unwrap();
        let now = Utc::now();
        let repo = FileLinkRepository::open(tmp.path()).await.unwrap();

        repo.create(record("abcd", now)).await.unwrap();
        let before = std::fs::read(tmp.path().join(LINKS_FILE)).unwrap();

        let err = repo.create(record("abcd", now)).await.unwrap_err();
        let after = std::fs::read(tmp.path().join(LINKS_FILE)).unwrap();

        assert!(matches!(err, AppError::DuplicateCode { .. }));
        assert_eq!(before, after);
        assert!(!tmp.path().join("links.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_drafts_persist_across_reopen() {
        let tmp = TempDir::new().unwrap();

        {
            let repo = FileLinkRepository::open(tmp.path()).await.unwrap();
            repo.save_drafts(vec![
                ShortenRequest::new("https://a.com").with_validity(10),
                ShortenRequest::default(),
            ])
            .await
            .unwrap();
        }

        let reopened = FileLinkRepository::open(tmp.path()).await.unwrap();
        let drafts = reopened.load_drafts().await.unwrap();

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].requested_validity_minutes, Some(10));
        assert!(drafts[1].url().is_none());
    }

    #[tokio::test]
    async fn test_open_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("nested").join("store");

        let repo = FileLinkRepository::open(&nested).await.unwrap();

        assert!(nested.is_dir());
        assert_eq!(repo.dir(), nested.as_path());
    }

    #[tokio::test]
    async fn test_second_handle_is_refused_while_first_is_open() {
        let tmp = TempDir::new().unwrap();
        let now = Utc::now();

        let server = FileLinkRepository::open(tmp.path()).await.unwrap();
        server.create(record("abcd", now)).await.unwrap();

        let err = FileLinkRepository::open(tmp.path()).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(ref msg) if msg.contains("in use")));

        drop(server);

        let admin = FileLinkRepository::open(tmp.path()).await.unwrap();
        let err = admin.create(record("abcd", now)).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateCode { .. }));
        assert_eq!(
            admin.find("abcd").await.unwrap().unwrap().original_url,
            "https://example.com/abcd"
        );
    }
}
