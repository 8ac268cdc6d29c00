//! Space Math Command in-browser WASM server.
//!
//! Exports `handle_request(method, path, query, body)` for the page to call.
//! Uses `matchit` for URL routing, the same router engine that powers Axum.
//! Game rules run here; the browser provides `localStorage` for the stats
//! record and `fetch` for the optional cloud backup.
//!
//! ```text
//! page ──handle_request──▶ dispatch ──▶ routes::* ──▶ Store<BrowserStorage>
//!                              │
//!                              └── Outcome.push ──spawn_push──▶ SupabaseRemote
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod routes;
pub mod store;
pub mod sync;

use rand::Rng;

use crate::routes::{Env, Outcome};
use crate::store::Storage;

/// Route an HTTP-like request to its handler.
///
/// # Arguments
/// * `env`    — store, random source and clock for this request
/// * `method` — HTTP method (e.g., "GET", "POST")
/// * `path`   — URL path (e.g., "/api/round/new")
/// * `query`  — Query string (e.g., "?tables=2,3")
/// * `body`   — Request body. Empty string for GET requests.
pub fn dispatch<S: Storage, G: Rng>(
    env: &mut Env<'_, S, G>,
    method: &str,
    path: &str,
    query: &str,
    body: &str,
) -> Outcome {
    // Build the router. matchit compiles route patterns into a radix tree.
    let mut router = matchit::Router::new();

    router.insert("/api/stats", "stats").ok();
    router.insert("/api/rank", "rank").ok();

    router.insert("/api/round/new", "round_new").ok();
    router.insert("/api/round/complete", "round_complete").ok();

    router.insert("/api/campaign", "campaign").ok();
    router.insert("/api/campaign/progress", "campaign_progress").ok();
    router.insert("/api/campaign/mission", "campaign_mission").ok();
    router.insert("/api/body", "body").ok();

    router.insert("/api/weak-areas", "weak_areas").ok();
    router.insert("/api/weak-areas/practice", "weak_practice").ok();

    router.insert("/api/player/id", "player_id").ok();
    router.insert("/api/player/export", "player_export").ok();
    router.insert("/api/player/import", "player_import").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            ("stats", "GET") => routes::player::handle_stats_get(env).into(),
            ("rank", "GET") => routes::player::handle_rank_get(env).into(),

            ("round_new", "GET") => routes::round::handle_new_get(env, query).into(),
            ("round_complete", "POST") => routes::round::handle_complete_post(env, body),

            ("campaign", "GET") => routes::campaign::handle_map_get(env).into(),
            ("campaign_progress", "GET") => routes::campaign::handle_progress_get(env).into(),
            ("campaign_mission", "GET") => routes::campaign::handle_mission_get(env, query).into(),
            ("body", "GET") => routes::campaign::handle_body_get(query).into(),

            ("weak_areas", "GET") => routes::player::handle_weak_areas_get(env).into(),
            ("weak_practice", "GET") => routes::player::handle_weak_practice_get(env).into(),

            ("player_id", "GET") => routes::player::handle_id_get(env).into(),
            ("player_export", "GET") => routes::player::handle_export_get(env).into(),
            ("player_import", "POST") => routes::player::handle_import_post(env, body),

            _ => method_not_allowed().into(),
        },
        Err(_) => not_found().into(),
    }
}

fn not_found() -> String {
    r#"<span class="text-red-400">404 — route not found</span>"#.to_string()
}

fn method_not_allowed() -> String {
    r#"<span class="text-red-400">405 — method not allowed</span>"#.to_string()
}

// ── Browser entry points ───────────────────────────────────────────

#[cfg(target_arch = "wasm32")]
pub mod browser {
    use std::cell::RefCell;
    use std::sync::LazyLock;

    use chrono::Utc;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use wasm_bindgen::prelude::*;

    use crate::config::SyncConfig;
    use crate::routes::Env;
    use crate::store::{BrowserStorage, Store};
    use crate::sync::{self, SupabaseRemote};

    // Initialised on first deref, so repeated `init` calls install the
    // logger once.
    static LOGGER: LazyLock<()> = LazyLock::new(|| {
        wasm_logger::init(wasm_logger::Config::default());
    });

    thread_local! {
        static CONFIG: RefCell<SyncConfig> = RefCell::new(SyncConfig::default());
        static RNG: RefCell<ChaCha8Rng> = RefCell::new(ChaCha8Rng::from_entropy());
    }

    fn remote() -> SupabaseRemote {
        SupabaseRemote::new(CONFIG.with(|c| c.borrow().clone()))
    }

    /// Install logging and the cloud backup config. `config_json` may be
    /// empty to run without cloud backup.
    ///
    /// Returns "ok" or an error message.
    #[wasm_bindgen]
    pub fn init(config_json: &str) -> String {
        *LOGGER;
        match SyncConfig::from_json(config_json) {
            Ok(config) => {
                if !config.is_enabled() {
                    log::info!("[init] cloud backup disabled");
                }
                CONFIG.with(|c| *c.borrow_mut() = config);
                "ok".to_string()
            }
            Err(e) => {
                log::error!("[init] {}", e);
                format!("error: {}", e)
            }
        }
    }

    /// Process an HTTP-like request and return a JSON or HTML body.
    ///
    /// When the request changed the stats record, a cloud backup is started
    /// in the background; the response does not wait for it.
    #[wasm_bindgen]
    pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
        let store = Store::new(BrowserStorage);
        RNG.with(|rng| {
            let mut rng = rng.borrow_mut();
            let mut env = Env {
                store: &store,
                rng: &mut *rng,
                now_ms: Utc::now().timestamp_millis(),
            };
            let outcome = crate::dispatch(&mut env, method, path, query, body);

            if let Some(stats) = outcome.push {
                match store.player_id(&mut *rng) {
                    Ok(player_id) => sync::spawn_push(remote(), player_id, stats),
                    Err(e) => log::warn!("[sync] no backup code, skipping push: {}", e),
                }
            }
            outcome.body
        })
    }

    /// Restore progress saved under a backup code. Resolves to
    /// `{"success": bool, "stats"?: {...}, "error"?: "..."}`.
    #[wasm_bindgen]
    pub async fn restore_progress(code: String) -> String {
        let store = Store::new(BrowserStorage);
        let outcome = sync::restore(&store, &remote(), &code, Utc::now()).await;
        crate::routes::util::json(&outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::stats::PlayerStats;
    use crate::store::{MemoryStorage, Store};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::Value;

    const NOW: i64 = 1_700_000_000_000;

    fn request(
        store: &Store<MemoryStorage>,
        method: &str,
        path: &str,
        query: &str,
        body: &str,
    ) -> Outcome {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut env = Env {
            store,
            rng: &mut rng,
            now_ms: NOW,
        };
        dispatch(&mut env, method, path, query, body)
    }

    #[test]
    fn returns_404_for_unknown_route() {
        let store = Store::new(MemoryStorage::default());
        let outcome = request(&store, "GET", "/api/nonexistent", "", "");
        assert!(outcome.body.contains("404"));
        assert!(outcome.push.is_none());
    }

    #[test]
    fn returns_405_for_wrong_method() {
        let store = Store::new(MemoryStorage::default());
        assert!(request(&store, "POST", "/api/stats", "", "").body.contains("405"));
        assert!(request(&store, "GET", "/api/round/complete", "", "").body.contains("405"));
    }

    #[test]
    fn routes_stats_for_new_player() {
        let store = Store::new(MemoryStorage::default());
        let body = request(&store, "GET", "/api/stats", "", "").body;
        let v: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["totalXP"], 0);
        assert_eq!(v["weakAreas"], serde_json::json!({}));
    }

    #[test]
    fn routes_campaign_pages() {
        let store = Store::new(MemoryStorage::default());
        assert!(request(&store, "GET", "/api/campaign", "", "").body.contains("Inner System"));
        assert!(request(&store, "GET", "/api/body", "?id=europa", "").body.contains("Europa"));
        assert!(request(&store, "GET", "/api/rank", "", "").body.contains("Space Cadet"));
        assert!(request(&store, "GET", "/api/weak-areas", "", "").body.contains("No weak areas"));
    }

    #[test]
    fn full_mission_round_trip() {
        let store = Store::new(MemoryStorage::default());

        let plan: Value = serde_json::from_str(
            &request(&store, "GET", "/api/campaign/mission", "?leg=leg-1&waypoint=0", "").body,
        )
        .unwrap();
        let questions: Vec<Value> = plan["questions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| {
                let mut q = q.clone();
                q["userAnswer"] = q["answer"].clone();
                q
            })
            .collect();
        let submission = serde_json::json!({
            "questions": questions,
            "mission": { "legId": plan["legId"], "waypointIndex": plan["waypointIndex"] },
        });

        let outcome = request(&store, "POST", "/api/round/complete", "", &submission.to_string());
        let summary: Value = serde_json::from_str(&outcome.body).unwrap();
        assert_eq!(summary["score"], 20);
        assert_eq!(summary["stars"], 3);
        assert_eq!(summary["xpEarned"], 150);
        assert_eq!(summary["isReplay"], false);

        let saved: PlayerStats = store.load();
        assert_eq!(saved.total_xp, 150);
        let progress = saved.campaign();
        assert_eq!(progress.current_waypoint_index, 1);
        assert_eq!(progress.total_missions_completed, 1);
        assert_eq!(outcome.push, Some(saved));

        let v: Value = serde_json::from_str(
            &request(&store, "GET", "/api/campaign/progress", "", "").body,
        )
        .unwrap();
        assert_eq!(v["completedCount"], 1);
        assert_eq!(v["totalStars"], 3);
    }
}
