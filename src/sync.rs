//! Cloud backup: best-effort push, pull and restore of the stats record.
//!
//! The remote store is a cache of the local record, never the authority.
//! A background push can fail for any reason; it is logged and dropped and
//! the game carries on. Restoring merges the remote record into the local
//! one with "max wins" rules and writes the result back to both sides.
//!
//! ## Remote table
//!
//! ```text
//! player_progress
//! ├── player_id          text primary key  ("space_math_k3x9q2a")
//! ├── total_xp           integer
//! ├── weak_areas         jsonb             ({"7x8": 2})
//! ├── campaign_progress  jsonb, nullable
//! └── last_synced        timestamptz
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SyncError;
use crate::game::campaign::CampaignProgress;
use crate::game::stats::PlayerStats;
use crate::store::{Storage, Store};

/// One row of the remote table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub player_id: String,
    pub total_xp: u32,
    #[serde(default)]
    pub weak_areas: BTreeMap<String, u32>,
    #[serde(default)]
    pub campaign_progress: Option<CampaignProgress>,
    pub last_synced: DateTime<Utc>,
}

impl PlayerRow {
    pub fn new(player_id: &str, stats: &PlayerStats, now: DateTime<Utc>) -> Self {
        Self {
            player_id: player_id.to_string(),
            total_xp: stats.total_xp,
            weak_areas: stats.weak_areas.clone(),
            campaign_progress: stats.campaign_progress.clone(),
            last_synced: now,
        }
    }

    pub fn into_stats(self) -> PlayerStats {
        PlayerStats {
            total_xp: self.total_xp,
            weak_areas: self.weak_areas,
            campaign_progress: self.campaign_progress,
        }
    }
}

/// A keyed table of player rows: upsert by key, select by key.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    async fn upsert(&self, row: &PlayerRow) -> Result<(), SyncError>;
    async fn select(&self, player_id: &str) -> Result<Option<PlayerRow>, SyncError>;
}

/// Combine two records: the larger XP total and, per fact, the larger miss
/// count. Campaign progress is taken from `local` unchanged.
///
/// Commutative and idempotent over `total_xp` and `weak_areas` only; when
/// the two campaigns differ, swapping the arguments swaps which one survives.
pub fn merge(local: &PlayerStats, remote: &PlayerStats) -> PlayerStats {
    let mut weak_areas = local.weak_areas.clone();
    for (key, &count) in &remote.weak_areas {
        let entry = weak_areas.entry(key.clone()).or_insert(0);
        *entry = (*entry).max(count);
    }
    PlayerStats {
        total_xp: local.total_xp.max(remote.total_xp),
        weak_areas,
        campaign_progress: local.campaign_progress.clone(),
    }
}

/// Upsert `stats` under `player_id`. Never fails: errors are logged.
pub async fn push<R: RemoteStore>(
    remote: &R,
    player_id: &str,
    stats: &PlayerStats,
    now: DateTime<Utc>,
) {
    let row = PlayerRow::new(player_id, stats, now);
    match remote.upsert(&row).await {
        Ok(()) => log::info!("[sync] backed up {} ({} XP)", player_id, stats.total_xp),
        Err(e) => log::warn!("[sync] backup failed for {}: {}", player_id, e),
    }
}

/// Fire-and-forget push on the browser's event loop. The caller never
/// waits for, or hears about, the result.
#[cfg(target_arch = "wasm32")]
pub fn spawn_push<R: RemoteStore + 'static>(remote: R, player_id: String, stats: PlayerStats) {
    wasm_bindgen_futures::spawn_local(async move {
        push(&remote, &player_id, &stats, Utc::now()).await;
    });
}

/// Fetch the remote record. `Ok(None)` means there is no record for the key.
pub async fn pull<R: RemoteStore>(
    remote: &R,
    player_id: &str,
) -> Result<Option<PlayerStats>, SyncError> {
    Ok(remote.select(player_id).await?.map(PlayerRow::into_stats))
}

#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PlayerStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RestoreOutcome {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            stats: None,
            error: Some(error.into()),
        }
    }
}

/// Restore progress saved under `code`.
///
/// On success the merged record is saved locally, `code` becomes this
/// device's backup code, and the merged record is pushed back. On failure
/// nothing local changes.
pub async fn restore<S: Storage, R: RemoteStore>(
    store: &Store<S>,
    remote: &R,
    code: &str,
    now: DateTime<Utc>,
) -> RestoreOutcome {
    let code = code.trim();
    if code.is_empty() {
        return RestoreOutcome::failed("Please enter a backup code to restore");
    }

    let remote_stats = match pull(remote, code).await {
        Ok(Some(stats)) => stats,
        Ok(None) => return RestoreOutcome::failed("No saved progress found for this code"),
        Err(e) => {
            log::warn!("[sync] restore of {} failed: {}", code, e);
            return RestoreOutcome::failed(format!("Could not restore progress: {}", e));
        }
    };

    let merged = merge(&store.load(), &remote_stats);
    if let Err(e) = store.save(&merged) {
        return RestoreOutcome::failed(format!("Could not save restored progress: {}", e));
    }
    if let Err(e) = store.set_player_id(code) {
        log::warn!("[sync] could not adopt backup code {}: {}", code, e);
    }
    log::info!("[sync] restored {} ({} XP)", code, merged.total_xp);

    push(remote, code, &merged, now).await;

    RestoreOutcome {
        success: true,
        stats: Some(merged),
        error: None,
    }
}

// ── Supabase (PostgREST) ───────────────────────────────────────────

#[cfg(target_arch = "wasm32")]
pub use supabase::SupabaseRemote;

#[cfg(target_arch = "wasm32")]
mod supabase {
    use gloo_net::http::{Request, Response};

    use super::{PlayerRow, RemoteStore};
    use crate::config::SyncConfig;
    use crate::error::SyncError;

    #[derive(Debug, Clone)]
    pub struct SupabaseRemote {
        config: SyncConfig,
    }

    impl SupabaseRemote {
        pub fn new(config: SyncConfig) -> Self {
            Self { config }
        }

        fn check_enabled(&self) -> Result<(), SyncError> {
            if self.config.is_enabled() {
                Ok(())
            } else {
                Err(SyncError::NotConfigured)
            }
        }

        fn bearer(&self) -> String {
            format!("Bearer {}", self.config.supabase_anon_key)
        }
    }

    async fn check_status(resp: Response) -> Result<Response, SyncError> {
        if resp.ok() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(SyncError::Backend { status, body })
    }

    impl RemoteStore for SupabaseRemote {
        async fn upsert(&self, row: &PlayerRow) -> Result<(), SyncError> {
            self.check_enabled()?;
            let resp = Request::post(&self.config.table_url())
                .query([("on_conflict", "player_id")])
                .header("apikey", &self.config.supabase_anon_key)
                .header("Authorization", &self.bearer())
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(row)
                .map_err(|e| SyncError::Network(e.to_string()))?
                .send()
                .await
                .map_err(|e| SyncError::Network(e.to_string()))?;
            check_status(resp).await?;
            Ok(())
        }

        async fn select(&self, player_id: &str) -> Result<Option<PlayerRow>, SyncError> {
            self.check_enabled()?;
            let resp = Request::get(&self.config.table_url())
                .query([
                    ("player_id", format!("eq.{}", player_id)),
                    ("select", "*".to_string()),
                ])
                .header("apikey", &self.config.supabase_anon_key)
                .header("Authorization", &self.bearer())
                .send()
                .await
                .map_err(|e| SyncError::Network(e.to_string()))?;
            let rows: Vec<PlayerRow> = check_status(resp)
                .await?
                .json()
                .await
                .map_err(|e| SyncError::Decode(e.to_string()))?;
            Ok(rows.into_iter().next())
        }
    }
}
