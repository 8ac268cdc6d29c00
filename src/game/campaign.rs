//! Campaign progression: where the player is along the route, and the
//! stars earned per waypoint.
//!
//! Progress is a plain value: every operation takes the current progress
//! and returns the next one. Stars on a waypoint only ever go up, and the
//! unlock list only ever grows.

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::question::GameSettings;
use crate::game::route::{self, FIRST_LEG_ID, WAYPOINTS_PER_LEG};
use crate::game::scoring::{accuracy, calculate_stars};

pub const MISSION_MAX_MULTIPLIER: u32 = 12;
pub const MISSION_QUESTIONS: usize = 20;

const LAST_WAYPOINT: u8 = WAYPOINTS_PER_LEG - 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointProgress {
    pub leg_id: String,
    /// 0-4
    pub waypoint_index: u8,
    /// 0-3
    pub stars: u8,
    pub completed: bool,
    /// Percent correct, 0-100.
    pub accuracy: f64,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignProgress {
    pub current_leg_id: String,
    pub current_waypoint_index: u8,
    pub completed_waypoints: Vec<WaypointProgress>,
    pub unlocked_leg_ids: Vec<String>,
    pub total_missions_completed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegStatus {
    Locked,
    Unlocked,
    Perfected,
}

impl Default for CampaignProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignProgress {
    /// A fresh campaign: first waypoint of the first leg, nothing else unlocked.
    pub fn new() -> Self {
        Self {
            current_leg_id: FIRST_LEG_ID.to_string(),
            current_waypoint_index: 0,
            completed_waypoints: Vec::new(),
            unlocked_leg_ids: vec![FIRST_LEG_ID.to_string()],
            total_missions_completed: 0,
        }
    }

    pub fn waypoint(&self, leg_id: &str, waypoint_index: u8) -> Option<&WaypointProgress> {
        self.completed_waypoints
            .iter()
            .find(|wp| wp.leg_id == leg_id && wp.waypoint_index == waypoint_index)
    }

    pub fn is_unlocked(&self, leg_id: &str) -> bool {
        self.unlocked_leg_ids.iter().any(|id| id == leg_id)
    }

    /// All five waypoints of the leg completed with three stars.
    pub fn is_leg_perfected(&self, leg_id: &str) -> bool {
        (0..WAYPOINTS_PER_LEG).all(|i| self.waypoint(leg_id, i).is_some_and(|wp| wp.stars >= 3))
    }

    pub fn leg_status(&self, leg_id: &str) -> LegStatus {
        if self.is_leg_perfected(leg_id) {
            LegStatus::Perfected
        } else if self.is_unlocked(leg_id) {
            LegStatus::Unlocked
        } else {
            LegStatus::Locked
        }
    }

    pub fn can_unlock_next_leg(&self) -> bool {
        self.is_leg_perfected(&self.current_leg_id)
    }

    pub fn completed_waypoint_count(&self) -> usize {
        self.completed_waypoints.iter().filter(|wp| wp.completed).count()
    }

    pub fn total_stars(&self) -> u32 {
        self.completed_waypoints.iter().map(|wp| u32::from(wp.stars)).sum()
    }

    /// Check a progress record that came from outside the game rules (an
    /// imported backup). Returns the first broken rule.
    pub fn check(&self) -> Result<(), String> {
        if !self.is_unlocked(&self.current_leg_id) {
            return Err(format!("current leg {} is not unlocked", self.current_leg_id));
        }
        if self.current_waypoint_index > LAST_WAYPOINT {
            return Err(format!(
                "current waypoint {} is out of range",
                self.current_waypoint_index
            ));
        }
        if let Some(id) = self.unlocked_leg_ids.iter().find(|id| route::leg(id).is_none()) {
            return Err(format!("unknown leg {}", id));
        }

        let mut seen = Vec::with_capacity(self.completed_waypoints.len());
        for wp in &self.completed_waypoints {
            if route::leg(&wp.leg_id).is_none() || wp.waypoint_index > LAST_WAYPOINT {
                return Err(format!("unknown waypoint {}#{}", wp.leg_id, wp.waypoint_index));
            }
            if wp.stars > 3 || !(0.0..=100.0).contains(&wp.accuracy) {
                return Err(format!("bad result on {}#{}", wp.leg_id, wp.waypoint_index));
            }
            let key = (wp.leg_id.as_str(), wp.waypoint_index);
            if seen.contains(&key) {
                return Err(format!("duplicate waypoint {}#{}", wp.leg_id, wp.waypoint_index));
            }
            seen.push(key);
        }
        Ok(())
    }
}

/// Record a finished waypoint round and return the updated progress.
///
/// Re-completing a waypoint only replaces the stored entry when it earns
/// strictly more stars. Perfecting the last waypoint of a leg unlocks the
/// next leg and moves the player there; finishing an earlier waypoint of the
/// current leg advances to the following waypoint. Anything else leaves the
/// player's position alone.
pub fn complete_waypoint(
    progress: &CampaignProgress,
    leg_id: &str,
    waypoint_index: u8,
    score: u32,
    total: u32,
    now_ms: i64,
) -> Result<CampaignProgress, GameError> {
    if route::leg(leg_id).is_none() {
        return Err(GameError::InvalidLeg(leg_id.to_string()));
    }
    if waypoint_index > LAST_WAYPOINT {
        return Err(GameError::InvalidWaypoint(waypoint_index));
    }

    let entry = WaypointProgress {
        leg_id: leg_id.to_string(),
        waypoint_index,
        stars: calculate_stars(score, total),
        completed: true,
        accuracy: accuracy(score, total),
        timestamp: Some(now_ms),
    };

    let mut next = progress.clone();
    let existing = next
        .completed_waypoints
        .iter()
        .position(|wp| wp.leg_id == leg_id && wp.waypoint_index == waypoint_index);

    match existing {
        Some(idx) => {
            if entry.stars > next.completed_waypoints[idx].stars {
                next.completed_waypoints[idx] = entry;
            }
        }
        None => {
            next.completed_waypoints.push(entry);
            next.total_missions_completed += 1;
        }
    }

    if waypoint_index == LAST_WAYPOINT && next.is_leg_perfected(leg_id) {
        if let Some(next_leg) = route::next_leg_id(leg_id) {
            if !next.is_unlocked(next_leg) {
                next.unlocked_leg_ids.push(next_leg.to_string());
                next.current_leg_id = next_leg.to_string();
                next.current_waypoint_index = 0;
                log::info!("[campaign] {} perfected, unlocked {}", leg_id, next_leg);
            }
        }
    } else if waypoint_index < LAST_WAYPOINT && leg_id == progress.current_leg_id {
        next.current_waypoint_index = waypoint_index + 1;
    }

    Ok(next)
}

/// A waypoint that already has a completed entry is a replay (half XP).
pub fn is_replay_attempt(progress: &CampaignProgress, leg_id: &str, waypoint_index: u8) -> bool {
    progress
        .waypoint(leg_id, waypoint_index)
        .is_some_and(|wp| wp.completed)
}

/// Round settings for a mission on `leg_id`: the destination body's tables.
pub fn generate_campaign_mission(leg_id: &str) -> Result<GameSettings, GameError> {
    let leg = route::leg(leg_id).ok_or_else(|| GameError::InvalidLeg(leg_id.to_string()))?;
    let body = route::body(leg.to_body_id)
        .ok_or_else(|| GameError::InvalidLeg(leg_id.to_string()))?;

    Ok(GameSettings {
        selected_tables: body.focus_tables.to_vec(),
        max_multiplier: MISSION_MAX_MULTIPLIER,
        questions_per_round: MISSION_QUESTIONS,
    })
}
