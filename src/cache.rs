//! Locality-keyed distance cache with a best-effort publish port.
//!
//! Records are created lazily, overwritten wholesale on recompute, and
//! never expire on their own; staleness is an accepted tradeoff. Last
//! write wins under concurrent resolution of the same locality.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geo::Coordinate;

/// Where a resolved distance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSource {
    Table,
    Cache,
    Live,
    Fallback,
    InBoundary,
}

impl DistanceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Cache => "cache",
            Self::Live => "live",
            Self::Fallback => "fallback",
            Self::InBoundary => "in-boundary",
        }
    }
}

impl std::fmt::Display for DistanceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved round-trip road distance for one locality.
///
/// The stored exit point is the one the distance was computed against;
/// it stays authoritative for the locality for as long as the record
/// lives, even if the exit catalog would pick differently today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub locality: String,
    pub round_trip_km: f64,
    pub exit_point: Coordinate,
    pub source: DistanceSource,
}

/// Key→record store keyed by normalized locality.
///
/// `&self` methods with interior mutability: the store is shared across
/// concurrent quote computations, and last write wins.
pub trait DistanceCache {
    fn get(&self, locality: &str) -> Option<DistanceRecord>;
    fn put(&self, locality: &str, record: DistanceRecord);
}

/// In-memory store, mainly for tests and single-shot runs.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, DistanceRecord>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DistanceCache for MemoryCache {
    fn get(&self, locality: &str) -> Option<DistanceRecord> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(locality).cloned())
    }

    fn put(&self, locality: &str, record: DistanceRecord) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(locality.to_string(), record);
        }
    }
}

/// JSON-document store: one object keyed by locality, rewritten in full
/// after every update via a temp-file rename.
///
/// An unreadable or malformed file is treated as an empty cache; the
/// resolution chain just recomputes and overwrites it on the next write.
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, DistanceRecord>>,
}

impl JsonFileCache {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, DistanceRecord>) {
        let text = match serde_json::to_string_pretty(entries) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "distance cache not serializable");
                return;
            }
        };
        let tmp = self.path.with_extension("tmp");
        let written = std::fs::write(&tmp, text).and_then(|_| std::fs::rename(&tmp, &self.path));
        if let Err(err) = written {
            warn!(error = %err, path = %self.path.display(), "distance cache write failed");
        }
    }
}

impl DistanceCache for JsonFileCache {
    fn get(&self, locality: &str) -> Option<DistanceRecord> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(locality).cloned())
    }

    fn put(&self, locality: &str, record: DistanceRecord) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(locality.to_string(), record);
            self.flush(&entries);
        }
    }
}

/// Best-effort publication of cache updates to an external channel.
///
/// Pricing never blocks on or fails because of publication; failures are
/// the implementation's to log and swallow.
pub trait CachePublisher {
    fn publish(&self, locality: &str);
}

/// Publisher that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl CachePublisher for NoopPublisher {
    fn publish(&self, _locality: &str) {}
}

/// Runs a configured external command after each cache write, e.g. a
/// sync script that commits and pushes the cache file.
#[derive(Debug, Clone)]
pub struct CommandPublisher {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandPublisher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl CachePublisher for CommandPublisher {
    fn publish(&self, locality: &str) {
        match Command::new(&self.program).args(&self.args).status() {
            Ok(status) if status.success() => {
                debug!(locality, "cache update published");
            }
            Ok(status) => {
                warn!(locality, %status, "cache publish command failed");
            }
            Err(err) => {
                warn!(locality, error = %err, "cache publish command did not start");
            }
        }
    }
}

/// Couples a cache with a publisher so every write is followed by a
/// best-effort publish.
#[derive(Debug)]
pub struct PublishingCache<C, P> {
    cache: C,
    publisher: P,
}

impl<C: DistanceCache, P: CachePublisher> PublishingCache<C, P> {
    pub fn new(cache: C, publisher: P) -> Self {
        Self { cache, publisher }
    }
}

impl<C: DistanceCache, P: CachePublisher> DistanceCache for PublishingCache<C, P> {
    fn get(&self, locality: &str) -> Option<DistanceRecord> {
        self.cache.get(locality)
    }

    fn put(&self, locality: &str, record: DistanceRecord) {
        self.cache.put(locality, record);
        self.publisher.publish(locality);
    }
}
