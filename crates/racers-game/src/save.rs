//! High score persistence — a single integer in a JSON file
//!
//! The file is read once at startup and rewritten whenever a finished run
//! beats the stored value. Nothing here is allowed to disturb gameplay:
//!   - unreadable or corrupt file → high score 0
//!   - failed write → logged and dropped, the in-memory value still rises
//!   - writes run on `HighScoreWriter`'s thread, never the frame loop's

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SAVE_FILE_NAME: &str = "racers_high_score.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("High score file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("High score file is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// Persistence collaborator for the high score
pub trait HighScoreStore {
    fn read_high_score(&self) -> u32;

    /// Store `candidate` if it beats the current value.
    /// Returns whether the stored value changed. Never lowers it.
    fn raise_high_score_if_greater(&mut self, candidate: u32) -> bool;
}

// ---------------------------------------------------------------------------
// On-disk record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct HighScoreRecord {
    high_score: u32,
}

// ---------------------------------------------------------------------------
// HighScoreFile — persistent I/O
// ---------------------------------------------------------------------------

/// High score stored as `{ "high_score": N }` in the save directory
#[derive(Debug)]
pub struct HighScoreFile {
    path: PathBuf,
    /// Current value; authoritative even when the last write failed
    cached: u32,
}

impl HighScoreFile {
    /// Open the save file in `save_dir`, reading the stored value if present
    pub fn open(save_dir: &Path) -> Self {
        let path = save_dir.join(SAVE_FILE_NAME);

        let cached = if path.exists() {
            match Self::load(&path) {
                Ok(score) => {
                    tracing::info!("Loaded high score {} from {}", score, path.display());
                    score
                }
                Err(e) => {
                    tracing::warn!("Ignoring high score file {}: {}", path.display(), e);
                    0
                }
            }
        } else {
            tracing::info!("No high score file found, starting from 0");
            0
        };

        Self { path, cached }
    }

    fn load(path: &Path) -> Result<u32, StoreError> {
        let json = std::fs::read_to_string(path)?;
        let record: HighScoreRecord = serde_json::from_str(&json)?;
        Ok(record.high_score)
    }

    fn write(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&HighScoreRecord {
            high_score: self.cached,
        })?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl HighScoreStore for HighScoreFile {
    fn read_high_score(&self) -> u32 {
        self.cached
    }

    fn raise_high_score_if_greater(&mut self, candidate: u32) -> bool {
        if candidate <= self.cached {
            return false;
        }
        self.cached = candidate;
        match self.write() {
            Ok(()) => tracing::info!("New high score {} saved to {}", candidate, self.path.display()),
            Err(e) => tracing::warn!("Failed to save high score {}: {}", candidate, e),
        }
        true
    }
}

// ---------------------------------------------------------------------------
// HighScoreWriter — moves store writes off the caller's thread
// ---------------------------------------------------------------------------

/// Owns a store on a worker thread and forwards new high scores to it.
///
/// `submit` only queues the value. `finish` (or drop) waits for every queued
/// write to land.
pub struct HighScoreWriter {
    tx: Option<mpsc::Sender<u32>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl HighScoreWriter {
    pub fn spawn(mut store: Box<dyn HighScoreStore + Send>) -> Self {
        let (tx, rx) = mpsc::channel::<u32>();
        let worker = thread::Builder::new()
            .name("high-score-writer".to_string())
            .spawn(move || {
                while let Ok(candidate) = rx.recv() {
                    store.raise_high_score_if_greater(candidate);
                }
            });

        match worker {
            Ok(handle) => Self {
                tx: Some(tx),
                worker: Some(handle),
            },
            Err(e) => {
                tracing::warn!("Failed to start high score writer, scores will not be saved: {}", e);
                Self {
                    tx: None,
                    worker: None,
                }
            }
        }
    }

    /// Queue `score` for the store. Returns immediately.
    pub fn submit(&self, score: u32) {
        let Some(tx) = &self.tx else {
            tracing::warn!("High score {} dropped, writer not running", score);
            return;
        };
        if tx.send(score).is_err() {
            tracing::warn!("High score {} dropped, writer stopped", score);
        }
    }

    /// Stop accepting scores and wait for pending writes
    pub fn finish(&mut self) {
        self.tx = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("High score writer panicked");
            }
        }
    }
}

impl Drop for HighScoreWriter {
    fn drop(&mut self) {
        self.finish();
    }
}

// ---------------------------------------------------------------------------
// MemoryHighScore
// ---------------------------------------------------------------------------

/// Non-persistent store (tests, `--no-save` style runs)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoryHighScore {
    value: u32,
}

impl MemoryHighScore {
    pub fn new(value: u32) -> Self {
        Self { value }
    }
}

impl HighScoreStore for MemoryHighScore {
    fn read_high_score(&self) -> u32 {
        self.value
    }

    fn raise_high_score_if_greater(&mut self, candidate: u32) -> bool {
        if candidate > self.value {
            self.value = candidate;
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    fn temp_save_dir(name: &str) -> PathBuf {
        env::temp_dir().join("racers_test_save").join(name)
    }

    fn cleanup(dir: &Path) {
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_file_reads_zero() {
        let dir = temp_save_dir("missing");
        cleanup(&dir);
        let store = HighScoreFile::open(&dir);
        assert_eq!(store.read_high_score(), 0);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = temp_save_dir("roundtrip");
        cleanup(&dir);

        {
            let mut store = HighScoreFile::open(&dir);
            assert!(store.raise_high_score_if_greater(1234));
        }
        {
            let store = HighScoreFile::open(&dir);
            assert_eq!(store.read_high_score(), 1234);
        }

        cleanup(&dir);
    }

    #[test]
    fn lower_scores_never_overwrite() {
        let dir = temp_save_dir("monotonic");
        cleanup(&dir);

        let mut store = HighScoreFile::open(&dir);
        let committed = [300, 120, 950, 949, 0, 951, 10];
        let mut best = 0;
        for score in committed {
            let raised = store.raise_high_score_if_greater(score);
            assert_eq!(raised, score > best, "score {}", score);
            best = best.max(score);
            assert_eq!(store.read_high_score(), best);
        }

        let reopened = HighScoreFile::open(&dir);
        assert_eq!(reopened.read_high_score(), 951);

        cleanup(&dir);
    }

    #[test]
    fn corrupt_file_reads_zero() {
        let dir = temp_save_dir("corrupt");
        cleanup(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SAVE_FILE_NAME), "{ not json").unwrap();

        let mut store = HighScoreFile::open(&dir);
        assert_eq!(store.read_high_score(), 0);
        // The next real score repairs the file
        assert!(store.raise_high_score_if_greater(5));
        assert_eq!(HighScoreFile::open(&dir).read_high_score(), 5);

        cleanup(&dir);
    }

    #[test]
    fn failed_write_still_raises_in_memory() {
        let dir = temp_save_dir("unwritable");
        cleanup(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        // A directory where the file should be makes the write fail
        std::fs::create_dir_all(dir.join(SAVE_FILE_NAME)).unwrap();

        let mut store = HighScoreFile::open(&dir);
        assert!(store.raise_high_score_if_greater(77));
        assert_eq!(store.read_high_score(), 77);

        cleanup(&dir);
    }

    /// Store that takes its time and records what reached it
    struct SlowStore {
        delay: Duration,
        inner: Arc<Mutex<MemoryHighScore>>,
    }

    impl HighScoreStore for SlowStore {
        fn read_high_score(&self) -> u32 {
            self.inner.lock().unwrap().read_high_score()
        }

        fn raise_high_score_if_greater(&mut self, candidate: u32) -> bool {
            thread::sleep(self.delay);
            self.inner.lock().unwrap().raise_high_score_if_greater(candidate)
        }
    }

    #[test]
    fn writer_submit_does_not_wait_for_store() {
        let inner = Arc::new(Mutex::new(MemoryHighScore::default()));
        let mut writer = HighScoreWriter::spawn(Box::new(SlowStore {
            delay: Duration::from_millis(300),
            inner: Arc::clone(&inner),
        }));

        let start = Instant::now();
        writer.submit(40);
        writer.submit(90);
        assert!(
            start.elapsed() < Duration::from_millis(100),
            "submit blocked for {:?}",
            start.elapsed()
        );

        writer.finish();
        assert_eq!(inner.lock().unwrap().read_high_score(), 90, "finish drains the queue");
    }

    #[test]
    fn writer_persists_to_file() {
        let dir = temp_save_dir("writer");
        cleanup(&dir);

        let mut writer = HighScoreWriter::spawn(Box::new(HighScoreFile::open(&dir)));
        writer.submit(321);
        writer.finish();
        assert_eq!(HighScoreFile::open(&dir).read_high_score(), 321);

        // Late submissions after finish are dropped, not panics
        writer.submit(999);
        assert_eq!(HighScoreFile::open(&dir).read_high_score(), 321);

        cleanup(&dir);
    }

    #[test]
    fn memory_store_is_monotonic() {
        let mut store = MemoryHighScore::new(50);
        assert!(!store.raise_high_score_if_greater(20));
        assert!(!store.raise_high_score_if_greater(50));
        assert!(store.raise_high_score_if_greater(51));
        assert_eq!(store.read_high_score(), 51);
    }
}
