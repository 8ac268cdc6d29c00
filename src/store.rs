//! Local persistence of the player's stats record and backup code.
//!
//! `Store` owns the record format and is generic over a tiny key/value
//! `Storage` backend: `localStorage` in the browser, a `RefCell` map in
//! tests and on native targets.
//!
//! ## Keys
//!
//! ```text
//! spacemath_stats      → {"totalXP": 0, "weakAreas": {}, "campaignProgress": {...}}
//! spacemath_player_id  → "space_math_k3x9q2a"
//! ```

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::StoreError;
use crate::game::stats::PlayerStats;

pub const STATS_KEY: &str = "spacemath_stats";
pub const PLAYER_ID_KEY: &str = "spacemath_player_id";

pub const PLAYER_ID_PREFIX: &str = "space_math_";
const PLAYER_ID_LEN: usize = 7;
const PLAYER_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Durable string key/value storage.
pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory storage for tests and native callers.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `window.localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

#[cfg(target_arch = "wasm32")]
impl BrowserStorage {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for BrowserStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }
}

/// The player's stats record on top of a `Storage` backend.
#[derive(Debug, Default)]
pub struct Store<S> {
    storage: S,
}

impl<S: Storage> Store<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load the stats record. A missing record is a new player; an unreadable
    /// one is logged and replaced by a fresh record.
    pub fn load(&self) -> PlayerStats {
        match self.storage.read(STATS_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("[store] discarding unreadable stats record: {}", e);
                PlayerStats::default()
            }),
            Ok(None) => PlayerStats::default(),
            Err(e) => {
                log::warn!("[store] could not read stats: {}", e);
                PlayerStats::default()
            }
        }
    }

    pub fn save(&self, stats: &PlayerStats) -> Result<(), StoreError> {
        let json = serde_json::to_string(stats)?;
        self.storage.write(STATS_KEY, &json)
    }

    /// The player's backup code, generated and stored on first use.
    pub fn player_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, StoreError> {
        if let Some(id) = self.storage.read(PLAYER_ID_KEY)?.filter(|id| !id.is_empty()) {
            return Ok(id);
        }
        let id = generate_player_id(rng);
        self.storage.write(PLAYER_ID_KEY, &id)?;
        log::info!("[store] new player id {}", id);
        Ok(id)
    }

    /// Adopt an existing backup code (after a restore).
    pub fn set_player_id(&self, id: &str) -> Result<(), StoreError> {
        self.storage.write(PLAYER_ID_KEY, id)
    }

    /// The stats record as URL-safe base64 JSON, for a downloadable backup.
    pub fn export_backup(&self) -> Result<String, StoreError> {
        let json = serde_json::to_string(&self.load())?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Replace the stats record with a previously exported backup.
    pub fn import_backup(&self, text: &str) -> Result<PlayerStats, StoreError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(text.trim())
            .map_err(|e| StoreError::Backup(format!("base64 decode error: {}", e)))?;
        let stats: PlayerStats = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Backup(format!("not a stats record: {}", e)))?;
        if let Some(progress) = &stats.campaign_progress {
            progress
                .check()
                .map_err(|e| StoreError::Backup(format!("inconsistent campaign: {}", e)))?;
        }
        self.save(&stats)?;
        Ok(stats)
    }
}

/// `space_math_` followed by seven lowercase alphanumerics.
pub fn generate_player_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..PLAYER_ID_LEN)
        .map(|_| PLAYER_ID_CHARSET[rng.gen_range(0..PLAYER_ID_CHARSET.len())] as char)
        .collect();
    format!("{}{}", PLAYER_ID_PREFIX, suffix)
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn browser_storage_persists_stats() {
        let s = Store::new(BrowserStorage);
        let mut stats = PlayerStats::default();
        stats.total_xp = 77;
        s.save(&stats).unwrap();
        assert_eq!(s.load().total_xp, 77);
    }
}
