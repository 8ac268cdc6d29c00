//! `/api/campaign/*` and `/api/body` routes: the route map, progress
//! totals, and building a waypoint mission.
//!
//! ```text
//! GET /api/campaign                  → map HTML (chapters → legs → 5 waypoints)
//! GET /api/campaign/progress         → progress JSON + totals
//! GET /api/campaign/mission?leg=&waypoint=
//!                                    → RoundPlan JSON with legId/waypointIndex/isReplay
//! GET /api/body?id=mars              → fact card HTML
//! ```

use rand::Rng;
use serde::Serialize;

use crate::error::GameError;
use crate::game::campaign::{self, CampaignProgress, LegStatus};
use crate::game::route::{self, CelestialBody, Chapter, LEGS, WAYPOINTS_PER_LEG};
use crate::routes::Env;
use crate::routes::round::{RoundPlan, plan_round};
use crate::routes::util::{escape_html, get_param, json, json_error, parse_query};
use crate::store::Storage;

// ── GET /api/campaign ──────────────────────────────────────────────

/// Handle GET /api/campaign
/// Renders every leg grouped by chapter, with its status and waypoint stars.
pub fn handle_map_get<S: Storage, G: Rng>(env: &mut Env<'_, S, G>) -> String {
    let progress = env.store.load().campaign();
    render_map(&progress)
}

fn render_map(progress: &CampaignProgress) -> String {
    let mut html = String::with_capacity(8192);
    html.push_str(r#"<div class="p-4 text-slate-100">"#);
    html.push_str(&format!(
        r#"<p class="text-xs text-slate-400 text-center mb-3">{} / {} waypoints · {} ★</p>"#,
        progress.completed_waypoint_count(),
        route::total_waypoints(),
        progress.total_stars()
    ));

    let mut chapter: Option<Chapter> = None;
    for leg in LEGS.iter() {
        if chapter != Some(leg.chapter) {
            if chapter.is_some() {
                html.push_str(r#"</div>"#); // close chapter
            }
            chapter = Some(leg.chapter);
            html.push_str(r#"<div class="mb-4">"#);
            html.push_str(&format!(
                r#"<p class="text-sm font-bold uppercase tracking-wide text-indigo-300 mb-1">{}</p>"#,
                leg.chapter.name()
            ));
        }
        html.push_str(&render_leg_row(progress, leg.id, leg.from_body_id, leg.to_body_id));
    }
    if chapter.is_some() {
        html.push_str(r#"</div>"#);
    }

    html.push_str(r#"</div>"#);
    html
}

fn render_leg_row(progress: &CampaignProgress, leg_id: &str, from: &str, to: &str) -> String {
    let status = progress.leg_status(leg_id);
    let is_current = progress.current_leg_id == leg_id;

    let bg = match status {
        LegStatus::Perfected => "bg-amber-900/40 border-amber-400",
        LegStatus::Unlocked if is_current => "bg-indigo-900/60 border-indigo-300",
        LegStatus::Unlocked => "bg-slate-800 border-slate-600",
        LegStatus::Locked => "bg-slate-900 border-slate-800 opacity-50",
    };

    let mut html = String::with_capacity(1024);
    html.push_str(&format!(
        r#"<div class="border rounded px-2 py-1 mb-1 {}" data-leg="{}">"#,
        bg,
        escape_html(leg_id)
    ));

    html.push_str(r#"<div class="flex items-center justify-between">"#);
    html.push_str(&format!(
        r#"<span class="text-sm">{} → {}</span>"#,
        body_label(route::body(from)),
        body_label(route::body(to))
    ));
    let (badge_class, badge) = match status {
        LegStatus::Perfected => ("text-amber-300 font-bold", "★ Perfected"),
        LegStatus::Unlocked if is_current => ("text-indigo-200 font-bold", "▶ Current"),
        LegStatus::Unlocked => ("text-slate-300", "Unlocked"),
        LegStatus::Locked => ("text-slate-500", "🔒 Locked"),
    };
    html.push_str(&format!(
        r#"<span class="text-xs {}">{}</span>"#,
        badge_class,
        badge
    ));
    html.push_str(r#"</div>"#);

    if status != LegStatus::Locked {
        html.push_str(r#"<div class="flex gap-1 mt-1">"#);
        for i in 0..WAYPOINTS_PER_LEG {
            let stars = progress.waypoint(leg_id, i).map(|wp| wp.stars).unwrap_or(0);
            let here = is_current && progress.current_waypoint_index == i;
            let ring = if here { " ring-2 ring-indigo-300" } else { "" };
            html.push_str(&format!(
                r#"<button class="text-xs bg-slate-700 rounded px-1{}" hx-get="/api/campaign/mission?leg={}&waypoint={}">{}</button>"#,
                ring,
                escape_html(leg_id),
                i,
                render_stars(stars)
            ));
        }
        html.push_str(r#"</div>"#);
    }

    html.push_str(r#"</div>"#); // close row
    html
}

fn body_label(body: Option<&CelestialBody>) -> String {
    match body {
        Some(b) => format!("{} {}", b.emoji, escape_html(b.name)),
        None => "?".to_string(),
    }
}

fn render_stars(stars: u8) -> String {
    (0..3).map(|i| if i < stars { '★' } else { '☆' }).collect()
}

// ── GET /api/campaign/progress ─────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressView {
    #[serde(flatten)]
    progress: CampaignProgress,
    completed_count: usize,
    total_waypoints: usize,
    total_stars: u32,
    max_stars: usize,
    can_unlock_next_leg: bool,
}

/// Handle GET /api/campaign/progress
pub fn handle_progress_get<S: Storage, G: Rng>(env: &mut Env<'_, S, G>) -> String {
    let progress = env.store.load().campaign();
    let view = ProgressView {
        completed_count: progress.completed_waypoint_count(),
        total_waypoints: route::total_waypoints(),
        total_stars: progress.total_stars(),
        max_stars: route::total_waypoints() * 3,
        can_unlock_next_leg: progress.can_unlock_next_leg(),
        progress,
    };
    json(&view)
}

// ── GET /api/campaign/mission ──────────────────────────────────────

/// Handle GET /api/campaign/mission?leg={id}&waypoint={0-4}
/// Both parameters default to the player's current position.
pub fn handle_mission_get<S: Storage, G: Rng>(env: &mut Env<'_, S, G>, query: &str) -> String {
    let params = parse_query(query);
    let progress = env.store.load().campaign();

    let leg_id = get_param(&params, "leg")
        .unwrap_or(progress.current_leg_id.as_str())
        .to_string();
    let waypoint = match get_param(&params, "waypoint") {
        Some(s) => match s.parse::<u8>() {
            Ok(i) => i,
            Err(_) => return json_error(&format!("Invalid waypoint: {}", s)),
        },
        None if leg_id == progress.current_leg_id => progress.current_waypoint_index,
        None => 0,
    };

    match plan_mission(env, &progress, &leg_id, waypoint) {
        Ok(plan) => json(&plan),
        Err(e) => json_error(&e.to_string()),
    }
}

/// Build a mission round for a waypoint the player can reach.
pub fn plan_mission<S: Storage, G: Rng>(
    env: &mut Env<'_, S, G>,
    progress: &CampaignProgress,
    leg_id: &str,
    waypoint_index: u8,
) -> Result<RoundPlan, GameError> {
    if route::leg(leg_id).is_none() {
        return Err(GameError::InvalidLeg(leg_id.to_string()));
    }
    if waypoint_index >= WAYPOINTS_PER_LEG {
        return Err(GameError::InvalidWaypoint(waypoint_index));
    }
    if !progress.is_unlocked(leg_id) {
        return Err(GameError::LockedLeg(leg_id.to_string()));
    }

    let settings = campaign::generate_campaign_mission(leg_id)?;
    let mut plan = plan_round(env, settings)?;
    plan.leg_id = Some(leg_id.to_string());
    plan.waypoint_index = Some(waypoint_index);
    plan.is_replay = campaign::is_replay_attempt(progress, leg_id, waypoint_index);
    Ok(plan)
}

// ── GET /api/body ──────────────────────────────────────────────────

/// Handle GET /api/body?id={body}
/// Returns the fact card shown when a body is tapped on the map.
pub fn handle_body_get(query: &str) -> String {
    let params = parse_query(query);
    let id = get_param(&params, "id").unwrap_or("");

    let Some(body) = route::body(id) else {
        return format!(
            r#"<span class="text-red-400">Unknown body: {}</span>"#,
            escape_html(id)
        );
    };

    let tables = body
        .focus_tables
        .iter()
        .map(|t| format!("×{}", t))
        .collect::<Vec<_>>()
        .join(" ");

    let mut html = String::with_capacity(1024);
    html.push_str(&format!(
        r#"<div class="p-4 rounded-lg text-slate-100" style="border: 2px solid {}">"#,
        escape_html(body.color)
    ));
    html.push_str(&format!(
        r#"<p class="text-3xl text-center">{}</p>"#,
        body.emoji
    ));
    html.push_str(&format!(
        r#"<p class="text-lg font-bold text-center">{}</p>"#,
        escape_html(body.name)
    ));
    html.push_str(&format!(
        r#"<p class="text-sm mt-2">{}</p>"#,
        escape_html(body.fact)
    ));
    html.push_str(&format!(
        r#"<p class="text-xs text-slate-400 mt-2 text-center">Training tables: {}</p>"#,
        tables
    ));
    html.push_str(r#"</div>"#);
    html
}
