use crate::{AbilityError, Result};
use async_trait::async_trait;
use fs2::FileExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

const LOCK_FILE_NAME: &str = ".snapshot.lock";

/// Key-value persistence for list snapshots and small settings.
///
/// Values are opaque bytes; callers own the encoding.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: SnapshotStore + ?Sized> SnapshotStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    File,
    Memory,
}

impl CacheBackend {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(AbilityError::invalid_config(format!(
                "unsupported cache backend: {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub backend: CacheBackend,
}

impl CacheConfig {
    pub fn with_defaults() -> Self {
        Self {
            dir: PathBuf::from(".pokedex/cache"),
            backend: CacheBackend::File,
        }
    }

    pub fn open(&self) -> Arc<dyn SnapshotStore> {
        match self.backend {
            CacheBackend::File => Arc::new(FileSnapshotStore::new(&self.dir)),
            CacheBackend::Memory => Arc::new(MemorySnapshotStore::new()),
        }
    }
}

/// One file per key under a directory, named `<key>.json` and holding the
/// value's bytes as given.
///
/// Writes go through a temp file and a rename while holding an exclusive
/// advisory lock on the directory's lock file.
#[derive(Clone, Debug)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", safe_component(key)))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let path = self.path_for(key);
        let bytes = value.to_vec();
        tokio::task::spawn_blocking(move || -> Result<()> {
            use std::fs::OpenOptions;

            let lock = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(dir.join(LOCK_FILE_NAME))?;
            lock.lock_exclusive()?;

            let tmp = path.with_extension("json.tmp");
            let written = std::fs::write(&tmp, &bytes).and_then(|()| std::fs::rename(&tmp, &path));
            if written.is_err() {
                let _ = std::fs::remove_file(&tmp);
            }
            let _ = lock.unlock();
            Ok(written?)
        })
        .await
        .map_err(|err| AbilityError::Other(format!("join snapshot write task: {err}")))?
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    map: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

fn safe_component(raw: &str) -> String {
    let out: String = raw
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        "_".to_string()
    } else {
        out
    }
}
