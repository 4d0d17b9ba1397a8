//! File-backed session store.
//!
//! One file per session identifier under the store directory, contents
//! `base64(JSON(mapping))`, rewritten in full on every mutation. There is no
//! atomic rename: a crash mid-write can corrupt that session's file, which is
//! an accepted limitation of the format. All index mutations and file writes
//! serialize behind one store-wide mutex.
//!
//! The store is an explicitly constructed value. Create it once at startup,
//! share it with [`Arc`](std::sync::Arc), and hand clones to whatever views
//! and guards need it.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use tracing::{error, warn};

/// Issues a fresh session identifier.
///
/// The current clock reading formatted `secs.micros`, base64-encoded with the
/// `=` padding stripped, then character-reversed. Opaque and collision-poor,
/// but not a credential — treat it as a correlation token only.
pub fn create_session_id() -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    let stamp = format!("{}.{:06}", now.as_secs(), now.subsec_micros());
    let encoded = STANDARD.encode(stamp.as_bytes());
    encoded.trim_end_matches('=').chars().rev().collect()
}

/// The session index: identifier → named JSON values, mirrored to disk.
pub struct SessionStore {
    dir: PathBuf,
    map: Mutex<HashMap<String, Map<String, Value>>>,
}

impl SessionStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, map: Mutex::new(HashMap::new()) })
    }

    /// Loads every persisted session into the index. Call once at startup,
    /// before serving. Files that fail to decode are skipped with a warning.
    pub fn load_all(&self) -> io::Result<()> {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let Ok(session_id) = entry.file_name().into_string() else {
                continue;
            };
            let raw = fs::read(entry.path())?;
            match decode_mapping(&raw) {
                Some(values) => {
                    map.insert(session_id, values);
                }
                None => warn!(%session_id, "skipping undecodable session file"),
            }
        }
        Ok(())
    }

    /// Upserts `value` under `key` for `session_id` and persists the full
    /// mapping for that identifier.
    pub fn push(&self, session_id: &str, key: &str, value: Value) {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(session_id.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
        self.persist(session_id, &map);
    }

    /// Removes `key` from the mapping for `session_id`; persists only when a
    /// removal actually occurred. The session record itself is never deleted.
    pub fn pop(&self, session_id: &str, key: &str) {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        let removed = map
            .get_mut(session_id)
            .map(|values| values.remove(key).is_some())
            .unwrap_or(false);
        if removed {
            self.persist(session_id, &map);
        }
    }

    /// The full mapping for `session_id`, or an empty mapping if unknown.
    pub fn get(&self, session_id: &str) -> Map<String, Value> {
        let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        map.get(session_id).cloned().unwrap_or_default()
    }

    /// One value from the mapping for `session_id`.
    pub fn get_item(&self, session_id: &str, key: &str) -> Option<Value> {
        let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        map.get(session_id).and_then(|values| values.get(key).cloned())
    }

    /// Writes `session_id`'s mapping to its file: base64 over the JSON
    /// encoding, full overwrite. Write failures are logged, not surfaced —
    /// the in-memory index stays authoritative for the running process.
    fn persist(&self, session_id: &str, map: &HashMap<String, Map<String, Value>>) {
        // The identifier becomes a file name. Identifiers minted by
        // `create_session_id` are path-safe; anything else came from a client
        // cookie and must not escape the store directory.
        if session_id.is_empty()
            || session_id.contains(['/', '\\'])
            || session_id.contains("..")
        {
            warn!(%session_id, "refusing to persist path-unsafe session identifier");
            return;
        }
        let values = map.get(session_id).cloned().unwrap_or_default();
        let json = match serde_json::to_string(&Value::Object(values)) {
            Ok(json) => json,
            Err(e) => {
                error!(%session_id, "session encode failed: {e}");
                return;
            }
        };
        let encoded = STANDARD.encode(json.as_bytes());
        if let Err(e) = fs::write(self.dir.join(session_id), encoded.as_bytes()) {
            error!(%session_id, "session write failed: {e}");
        }
    }
}

fn decode_mapping(raw: &[u8]) -> Option<Map<String, Value>> {
    let text = std::str::from_utf8(raw).ok()?;
    let decoded = STANDARD.decode(text.trim().as_bytes()).ok()?;
    match serde_json::from_slice(&decoded).ok()? {
        Value::Object(values) => Some(values),
        _ => None,
    }
}
