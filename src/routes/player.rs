//! Player record routes: stats, rank badge, weak areas, backup code and
//! the downloadable backup file.

use rand::Rng;

use crate::game::scoring;
use crate::game::stats::{self, PlayerStats};
use crate::routes::round::plan_round;
use crate::routes::util::{escape_html, get_param, json, json_error, parse_form_body};
use crate::routes::{Env, Outcome};
use crate::store::Storage;

// ── GET /api/stats ─────────────────────────────────────────────────

/// Handle GET /api/stats
pub fn handle_stats_get<S: Storage, G: Rng>(env: &mut Env<'_, S, G>) -> String {
    json(&env.store.load())
}

// ── GET /api/rank ──────────────────────────────────────────────────

/// Handle GET /api/rank
/// Badge with the rank name, total XP and a progress bar to the next rank.
pub fn handle_rank_get<S: Storage, G: Rng>(env: &mut Env<'_, S, G>) -> String {
    render_rank_badge(&env.store.load())
}

fn render_rank_badge(stats: &PlayerStats) -> String {
    let rank = stats.rank();
    let progress = scoring::rank_progress(stats.total_xp);

    let mut html = String::with_capacity(1024);
    html.push_str(r#"<div class="rounded-lg bg-slate-800 p-3 text-slate-100">"#);
    html.push_str(&format!(
        r#"<p class="text-lg font-bold text-center">{}</p>"#,
        rank.name()
    ));
    html.push_str(&format!(
        r#"<p class="text-xs text-slate-400 text-center">{} XP</p>"#,
        stats.total_xp
    ));
    html.push_str(r#"<div class="w-full bg-slate-700 rounded h-2 mt-2">"#);
    html.push_str(&format!(
        r#"<div class="bg-indigo-400 h-2 rounded" style="width: {}%"></div>"#,
        progress
    ));
    html.push_str(r#"</div>"#);
    match rank.next_threshold() {
        Some(next) => html.push_str(&format!(
            r#"<p class="text-xs text-slate-400 text-center mt-1">{} XP to next rank</p>"#,
            next - stats.total_xp
        )),
        None => html.push_str(
            r#"<p class="text-xs text-amber-300 text-center mt-1">Top rank reached</p>"#,
        ),
    }
    html.push_str(r#"</div>"#);
    html
}

// ── GET /api/weak-areas ────────────────────────────────────────────

/// Handle GET /api/weak-areas
/// The most-missed facts first, each with a difficulty label.
pub fn handle_weak_areas_get<S: Storage, G: Rng>(env: &mut Env<'_, S, G>) -> String {
    let stats = env.store.load();
    let list = stats::weak_area_list(&stats);

    if list.is_empty() {
        return r#"<p class="text-sm text-slate-400 text-center p-4">No weak areas yet. Keep flying!</p>"#
            .to_string();
    }

    let mut html = String::with_capacity(2048);
    html.push_str(r#"<div class="p-4 text-slate-100">"#);
    html.push_str(r#"<p class="text-lg font-bold text-center mb-2">Training Targets</p>"#);
    html.push_str(r#"<div class="grid grid-cols-1 gap-1">"#);
    for area in &list {
        let (a, b) = area.pair.split_once('x').unwrap_or((area.pair.as_str(), "?"));
        html.push_str(
            r#"<div class="flex items-center justify-between border border-slate-600 rounded px-2 py-1">"#,
        );
        html.push_str(&format!(
            r#"<span class="text-sm font-medium">{} × {}</span>"#,
            escape_html(a),
            escape_html(b)
        ));
        html.push_str(&format!(
            r#"<span class="text-xs text-slate-400">{} · missed {}×</span>"#,
            area.label(),
            area.count
        ));
        html.push_str(r#"</div>"#);
    }
    html.push_str(r#"</div>"#);
    html.push_str(
        r#"<button class="mt-3 w-full text-sm bg-indigo-500 rounded py-1" hx-get="/api/weak-areas/practice">Practice these</button>"#,
    );
    html.push_str(r#"</div>"#);
    html
}

// ── GET /api/weak-areas/practice ───────────────────────────────────

/// Handle GET /api/weak-areas/practice
/// A practice round over every number that shows up in a weak pair.
pub fn handle_weak_practice_get<S: Storage, G: Rng>(env: &mut Env<'_, S, G>) -> String {
    let stats = env.store.load();
    let Some(settings) = stats::weak_area_practice_settings(&stats) else {
        return json_error("No weak areas to practice");
    };
    match plan_round(env, settings) {
        Ok(plan) => json(&plan),
        Err(e) => json_error(&e.to_string()),
    }
}

// ── GET /api/player/id ─────────────────────────────────────────────

/// Handle GET /api/player/id
/// The backup code, generated on first request.
pub fn handle_id_get<S: Storage, G: Rng>(env: &mut Env<'_, S, G>) -> String {
    match env.store.player_id(&mut *env.rng) {
        Ok(id) => id,
        Err(e) => format!("error: {}", e),
    }
}

// ── GET /api/player/export ─────────────────────────────────────────

/// Handle GET /api/player/export
/// Returns a <script> tag that downloads the stats record as a base64 text
/// file.
pub fn handle_export_get<S: Storage, G: Rng>(env: &mut Env<'_, S, G>) -> String {
    let state = match env.store.export_backup() {
        Ok(state) => state,
        Err(e) => {
            return format!(
                r#"<span class="text-red-400">Export failed: {}</span>"#,
                escape_html(&e.to_string())
            );
        }
    };
    format!(
        r#"<script>
(function() {{
  var b = new Blob(['{state}'], {{type: 'text/plain'}});
  var a = document.createElement('a');
  a.href = URL.createObjectURL(b);
  a.download = 'space-math-progress.txt';
  a.click();
  URL.revokeObjectURL(a.href);
  console.log('[space-math] Progress exported');
}})();
</script>"#,
        state = state
    )
}

// ── POST /api/player/import ────────────────────────────────────────

/// Handle POST /api/player/import
/// Accepts `state={base64}` or the raw base64 text of an exported file and
/// replaces the local record with it.
pub fn handle_import_post<S: Storage, G: Rng>(env: &mut Env<'_, S, G>, body: &str) -> Outcome {
    let params = parse_form_body(body);
    let state = get_param(&params, "state").unwrap_or(body.trim());
    match env.store.import_backup(state) {
        Ok(stats) => {
            log::info!("[player] imported backup ({} XP)", stats.total_xp);
            Outcome::with_push(
                r#"<span class="text-emerald-400">Progress imported successfully</span>"#
                    .to_string(),
                stats,
            )
        }
        Err(e) => Outcome::body(format!(
            r#"<span class="text-red-400">Import failed: {}</span>"#,
            escape_html(&e.to_string())
        )),
    }
}
