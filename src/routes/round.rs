//! `/api/round/*` routes: building a round and scoring a finished one.

use rand::Rng;
use serde::Serialize;

use crate::error::GameError;
use crate::game::question::{
    self, GameSettings, PRACTICE_MAX_MULTIPLIER, PRACTICE_QUESTIONS_PER_ROUND, Question,
};
use crate::game::stats::{self, RoundSubmission};
use crate::routes::util::{get_param, json, json_error, parse_number_list, parse_query};
use crate::routes::{Env, Outcome};
use crate::store::Storage;

/// A round ready to play, with the campaign markers the play screen hands
/// back on completion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundPlan {
    pub settings: GameSettings,
    pub questions: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leg_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waypoint_index: Option<u8>,
    pub is_replay: bool,
}

/// Generate questions for `settings`, weighted by the player's weak areas.
pub fn plan_round<S: Storage, G: Rng>(
    env: &mut Env<'_, S, G>,
    settings: GameSettings,
) -> Result<RoundPlan, GameError> {
    let stats = env.store.load();
    let questions = question::generate_questions(&settings, Some(&stats), &mut *env.rng)?;
    Ok(RoundPlan {
        settings,
        questions,
        leg_id: None,
        waypoint_index: None,
        is_replay: false,
    })
}

// ── GET /api/round/new ─────────────────────────────────────────────

/// Handle GET /api/round/new?tables=2,3&max=12&count=10
/// `max` and `count` default to the practice settings.
pub fn handle_new_get<S: Storage, G: Rng>(env: &mut Env<'_, S, G>, query: &str) -> String {
    let params = parse_query(query);
    let settings = GameSettings {
        selected_tables: get_param(&params, "tables")
            .map(parse_number_list)
            .unwrap_or_default(),
        max_multiplier: get_param(&params, "max")
            .and_then(|s| s.parse().ok())
            .unwrap_or(PRACTICE_MAX_MULTIPLIER),
        questions_per_round: get_param(&params, "count")
            .and_then(|s| s.parse().ok())
            .unwrap_or(PRACTICE_QUESTIONS_PER_ROUND),
    };

    match plan_round(env, settings) {
        Ok(plan) => json(&plan),
        Err(e) => json_error(&e.to_string()),
    }
}

// ── POST /api/round/complete ───────────────────────────────────────

/// Handle POST /api/round/complete
/// Body: `{"questions": [...], "mission": {"legId": "leg-1", "waypointIndex": 0}}`
/// (`mission` omitted for practice rounds).
///
/// Saves the updated record and asks for a background backup.
pub fn handle_complete_post<S: Storage, G: Rng>(env: &mut Env<'_, S, G>, body: &str) -> Outcome {
    let submission: RoundSubmission = match serde_json::from_str(body) {
        Ok(s) => s,
        Err(e) => return Outcome::body(json_error(&format!("Invalid round JSON: {}", e))),
    };

    let mut stats = env.store.load();
    let summary = match stats::apply_round(&mut stats, submission, env.now_ms) {
        Ok(summary) => summary,
        Err(e) => return Outcome::body(json_error(&e.to_string())),
    };

    if let Err(e) = env.store.save(&stats) {
        log::error!("[round] could not save stats: {}", e);
        return Outcome::body(json_error(&e.to_string()));
    }

    Outcome::with_push(json(&summary), stats)
}
