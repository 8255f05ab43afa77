use domain::models::{IndexedPassage, Passage};
use rusqlite::{params, Connection};
use shared::types::{RagError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// SQLite-file vector index. Insert-only: passages are never edited or
/// deleted once stored; re-ingesting recreates the whole file
/// (last-writer-wins). Single-writer discipline is the caller's
/// contract; concurrent reads without a writer are safe.
pub struct VectorStore {
    // The web session shares the store across worker threads; rusqlite
    // connections are Send but not Sync, hence the mutex.
    conn: Mutex<Connection>,
    location: PathBuf,
}

fn store_err(e: rusqlite::Error) -> RagError {
    RagError::Other(e.into())
}

fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl VectorStore {
    /// Create a fresh store, truncating any previously persisted index
    /// at the same location.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        remove_if_present(path)?;
        // Stale WAL sidecars from a crashed run must not be replayed
        // into the fresh file.
        for suffix in ["-wal", "-shm"] {
            let mut sidecar = path.as_os_str().to_os_string();
            sidecar.push(suffix);
            remove_if_present(Path::new(&sidecar))?;
        }
        Self::open(path)
    }

    /// Rehydrate a previously persisted index.
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RagError::NotFound(path.display().to_string()));
        }
        Self::open(path)
    }

    fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(store_err)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA cache_size=-64000;
            PRAGMA temp_store=MEMORY;
            CREATE TABLE IF NOT EXISTS passages (
                id TEXT PRIMARY KEY,
                vector BLOB NOT NULL,
                text TEXT NOT NULL,
                page INTEGER NOT NULL,
                source TEXT NOT NULL
            );
        ",
        )
        .map_err(store_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
            location: path.to_path_buf(),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RagError::Other(anyhow::anyhow!("vector store lock poisoned")))
    }

    pub fn insert(&self, passages: &[IndexedPassage]) -> Result<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction().map_err(store_err)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO passages (id, vector, text, page, source)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .map_err(store_err)?;
            for indexed in passages {
                let vector_bytes = serde_json::to_vec(&indexed.vector)?;
                stmt.execute(params![
                    indexed.id,
                    vector_bytes,
                    indexed.passage.text,
                    indexed.passage.page,
                    indexed.passage.source_id,
                ])
                .map_err(store_err)?;
            }
        }
        tx.commit().map_err(store_err)?;
        Ok(())
    }

    pub fn load_all(&self) -> Result<Vec<IndexedPassage>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, vector, text, page, source FROM passages ORDER BY rowid")
            .map_err(store_err)?;
        let mut rows = stmt.query([]).map_err(store_err)?;
        let mut passages = Vec::new();
        while let Some(row) = rows.next().map_err(store_err)? {
            let id: String = row.get(0).map_err(store_err)?;
            let vector_bytes: Vec<u8> = row.get(1).map_err(store_err)?;
            let text: String = row.get(2).map_err(store_err)?;
            let page: u32 = row.get(3).map_err(store_err)?;
            let source_id: String = row.get(4).map_err(store_err)?;
            let vector: Vec<f32> = serde_json::from_slice(&vector_bytes)?;
            passages.push(IndexedPassage {
                id,
                vector,
                passage: Passage {
                    text,
                    page,
                    source_id,
                },
            });
        }
        Ok(passages)
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM passages", [], |row| row.get(0))
            .map_err(store_err)?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn location(&self) -> &Path {
        &self.location
    }
}
