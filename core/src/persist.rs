use crate::error::{Result, RetrievalError};
use crate::index::PersistedIndex;
use parking_lot::RwLock;
use std::fs::{self, create_dir_all, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_INDEX_PATH: &str = "./uploads/index.bin";

const SLED_INDEX_KEY: &[u8] = b"index";

/// Durable home of the one current index. `put` replaces it wholesale.
pub trait IndexStore: Send + Sync {
    fn put(&self, index: &PersistedIndex) -> Result<()>;
    fn get(&self) -> Result<PersistedIndex>;
    /// Human-readable location used in logs and errors.
    fn location(&self) -> String;
}

pub fn encode_index(index: &PersistedIndex) -> Result<Vec<u8>> {
    bincode::serialize(index).map_err(|e| RetrievalError::Encode(e.to_string()))
}

pub fn decode_index(bytes: &[u8], location: &str) -> Result<PersistedIndex> {
    let index: PersistedIndex = bincode::deserialize(bytes).map_err(|e| RetrievalError::IndexCorrupt {
        location: location.to_string(),
        reason: e.to_string(),
    })?;
    index
        .validate()
        .map_err(|reason| RetrievalError::IndexCorrupt { location: location.to_string(), reason })?;
    Ok(index)
}

/// Single bincode blob on the local filesystem.
///
/// New indexes are written to a sibling temp file and renamed over the target,
/// so a reader in another process sees either the old or the new index. The
/// lock serializes writers and readers sharing this store in one process.
pub struct FileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf(), lock: RwLock::new(()) }
    }

    pub fn path(&self) -> &Path { &self.path }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "index".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl IndexStore for FileStore {
    fn put(&self, index: &PersistedIndex) -> Result<()> {
        let bytes = encode_index(index)?;
        let _guard = self.lock.write();
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_dir_all(dir)?;
        }
        let staging = self.staging_path();
        {
            let mut f = File::create(&staging)?;
            f.write_all(&bytes)?;
            f.sync_all()?;
        }
        fs::rename(&staging, &self.path)?;
        tracing::info!(path = %self.path.display(), bytes = bytes.len(), "index persisted");
        Ok(())
    }

    fn get(&self) -> Result<PersistedIndex> {
        let _guard = self.lock.read();
        let mut f = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RetrievalError::IndexNotFound { location: self.location() })
            }
            Err(e) => return Err(e.into()),
        };
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)?;
        decode_index(&buf, &self.location())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// The index blob stored under a single key of an embedded sled database.
pub struct SledStore {
    db: sled::Db,
    path: PathBuf,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())?;
        Ok(Self { db, path: path.as_ref().to_path_buf() })
    }
}

impl IndexStore for SledStore {
    fn put(&self, index: &PersistedIndex) -> Result<()> {
        let bytes = encode_index(index)?;
        self.db.insert(SLED_INDEX_KEY, bytes.as_slice())?;
        self.db.flush()?;
        tracing::info!(path = %self.path.display(), bytes = bytes.len(), "index persisted");
        Ok(())
    }

    fn get(&self) -> Result<PersistedIndex> {
        match self.db.get(SLED_INDEX_KEY)? {
            Some(bytes) => decode_index(&bytes, &self.location()),
            None => Err(RetrievalError::IndexNotFound { location: self.location() }),
        }
    }

    fn location(&self) -> String {
        format!("sled:{}", self.path.display())
    }
}

/// Keeps the index in memory. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    slot: RwLock<Option<PersistedIndex>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl IndexStore for MemoryStore {
    fn put(&self, index: &PersistedIndex) -> Result<()> {
        *self.slot.write() = Some(index.clone());
        Ok(())
    }

    fn get(&self) -> Result<PersistedIndex> {
        self.slot
            .read()
            .clone()
            .ok_or_else(|| RetrievalError::IndexNotFound { location: self.location() })
    }

    fn location(&self) -> String {
        "memory".into()
    }
}
