//! Player stats, the one record kept per player, and the rules for
//! folding a finished round into it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::GameError;
use crate::game::campaign::{self, CampaignProgress};
use crate::game::question::{self, GameSettings, Question};
use crate::game::scoring::{self, Rank};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(rename = "totalXP", default)]
    pub total_xp: u32,
    /// `"7x8"` → times missed.
    #[serde(rename = "weakAreas", default)]
    pub weak_areas: BTreeMap<String, u32>,
    #[serde(
        rename = "campaignProgress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub campaign_progress: Option<CampaignProgress>,
}

impl PlayerStats {
    pub fn rank(&self) -> Rank {
        scoring::rank_for_xp(self.total_xp)
    }

    /// The campaign, starting a fresh one if the player has none yet.
    pub fn campaign(&self) -> CampaignProgress {
        self.campaign_progress.clone().unwrap_or_default()
    }
}

/// Campaign markers riding along with a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionMarker {
    pub leg_id: String,
    pub waypoint_index: u8,
}

/// A finished round handed over by the play screen.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSubmission {
    pub questions: Vec<Question>,
    #[serde(default)]
    pub mission: Option<MissionMarker>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub score: u32,
    pub total: u32,
    /// Rounded percent correct.
    pub percentage: u32,
    pub xp_earned: u32,
    pub total_xp: u32,
    pub rank: Rank,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<u8>,
    pub is_replay: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_leg_id: Option<String>,
    pub questions: Vec<Question>,
}

/// Fold a finished round into `stats`.
///
/// Each question is re-marked against its own answer from the submitted
/// `user_answer`; unanswered questions count as wrong. On error `stats` is
/// left untouched.
pub fn apply_round(
    stats: &mut PlayerStats,
    submission: RoundSubmission,
    now_ms: i64,
) -> Result<RoundSummary, GameError> {
    let RoundSubmission { mut questions, mission } = submission;
    if questions.is_empty() {
        return Err(GameError::InvalidSubmission("round has no questions".to_string()));
    }
    for q in &mut questions {
        if q.num1.checked_mul(q.num2) != Some(q.answer) {
            return Err(GameError::InvalidSubmission(format!(
                "{} x {} is not {}",
                q.num1, q.num2, q.answer
            )));
        }
        match q.user_answer {
            Some(value) => {
                q.record_answer(value);
            }
            None => q.correct = Some(false),
        }
    }

    let score = question::score(&questions);
    let total = questions.len() as u32;

    let mut stars = None;
    let mut is_replay = false;
    let mut unlocked_leg_id = None;
    let mut next_campaign = None;

    let xp_earned = match &mission {
        Some(marker) => {
            let before = stats.campaign();
            is_replay = campaign::is_replay_attempt(&before, &marker.leg_id, marker.waypoint_index);
            let after = campaign::complete_waypoint(
                &before,
                &marker.leg_id,
                marker.waypoint_index,
                score,
                total,
                now_ms,
            )?;
            stars = Some(scoring::calculate_stars(score, total));
            unlocked_leg_id = after
                .unlocked_leg_ids
                .iter()
                .find(|id| !before.is_unlocked(id))
                .cloned();
            next_campaign = Some(after);
            scoring::calculate_campaign_xp(score, total, is_replay)
        }
        None => scoring::calculate_xp(score, total),
    };

    stats.total_xp = stats.total_xp.saturating_add(xp_earned);
    question::update_weak_areas(&questions, &mut stats.weak_areas);
    if next_campaign.is_some() {
        stats.campaign_progress = next_campaign;
    }

    Ok(RoundSummary {
        score,
        total,
        percentage: scoring::accuracy(score, total).round() as u32,
        xp_earned,
        total_xp: stats.total_xp,
        rank: stats.rank(),
        stars,
        is_replay,
        unlocked_leg_id,
        questions,
    })
}

// ── Weak areas ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeakArea {
    pub pair: String,
    pub count: u32,
}

impl WeakArea {
    pub fn label(&self) -> &'static str {
        match self.count {
            5.. => "Needs lots of practice",
            3..=4 => "Getting better",
            _ => "Almost there",
        }
    }
}

/// Weak areas, most-missed first.
pub fn weak_area_list(stats: &PlayerStats) -> Vec<WeakArea> {
    let mut list: Vec<WeakArea> = stats
        .weak_areas
        .iter()
        .map(|(pair, &count)| WeakArea {
            pair: pair.clone(),
            count,
        })
        .collect();
    list.sort_by(|a, b| b.count.cmp(&a.count));
    list
}

/// Practice settings covering every number that appears in a weak pair.
pub fn weak_area_practice_settings(stats: &PlayerStats) -> Option<GameSettings> {
    let tables: BTreeSet<u32> = stats
        .weak_areas
        .keys()
        .filter_map(|pair| pair.split_once('x'))
        .flat_map(|(a, b)| [a.parse::<u32>().ok(), b.parse::<u32>().ok()])
        .flatten()
        .filter(|&n| n > 0)
        .collect();

    if tables.is_empty() {
        return None;
    }
    Some(GameSettings::practice(tables.into_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn answered(num1: u32, num2: u32, value: i64) -> Question {
        let mut q = Question::new(num1, num2);
        q.user_answer = Some(value);
        q
    }

    fn practice(questions: Vec<Question>) -> RoundSubmission {
        RoundSubmission {
            questions,
            mission: None,
        }
    }

    fn mission(questions: Vec<Question>, leg: &str, index: u8) -> RoundSubmission {
        RoundSubmission {
            questions,
            mission: Some(MissionMarker {
                leg_id: leg.to_string(),
                waypoint_index: index,
            }),
        }
    }

    fn perfect_round() -> Vec<Question> {
        (1..=20)
            .map(|m| answered(3, m % 12 + 1, i64::from(3 * (m % 12 + 1))))
            .collect()
    }

    #[test]
    fn stats_json_matches_local_storage_format() {
        let stats: PlayerStats =
            serde_json::from_str(r#"{"totalXP":120,"weakAreas":{"7x8":2}}"#).unwrap();
        assert_eq!(stats.total_xp, 120);
        assert_eq!(stats.weak_areas["7x8"], 2);
        assert!(stats.campaign_progress.is_none());

        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, r#"{"totalXP":120,"weakAreas":{"7x8":2}}"#);
    }

    #[test]
    fn total_xp_saturates_instead_of_wrapping() {
        let mut stats = PlayerStats {
            total_xp: u32::MAX - 10,
            ..PlayerStats::default()
        };
        let summary = apply_round(&mut stats, practice(vec![answered(7, 8, 56)]), NOW).unwrap();
        assert_eq!(summary.xp_earned, 150);
        assert_eq!(stats.total_xp, u32::MAX);
        assert_eq!(summary.total_xp, u32::MAX);
        assert_eq!(summary.rank, Rank::Commander);
    }

    #[test]
    fn practice_round_adds_xp_and_weak_areas() {
        let mut stats = PlayerStats::default();
        let summary = apply_round(
            &mut stats,
            practice(vec![answered(7, 8, 56), answered(6, 7, 40), Question::new(2, 9)]),
            NOW,
        )
        .unwrap();

        assert_eq!(summary.score, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.percentage, 33);
        assert_eq!(summary.xp_earned, 83);
        assert_eq!(stats.total_xp, 83);
        assert_eq!(stats.weak_areas.get("6x7"), Some(&1));
        assert_eq!(stats.weak_areas.get("2x9"), Some(&1));
        assert!(!stats.weak_areas.contains_key("7x8"));
        assert!(stats.campaign_progress.is_none());
        assert_eq!(summary.stars, None);
    }

    #[test]
    fn campaign_round_updates_progress_and_halves_replays() {
        let mut stats = PlayerStats::default();
        let first = apply_round(&mut stats, mission(perfect_round(), "leg-1", 0), NOW).unwrap();
        assert_eq!(first.xp_earned, 150);
        assert_eq!(first.stars, Some(3));
        assert!(!first.is_replay);

        let replay = apply_round(&mut stats, mission(perfect_round(), "leg-1", 0), NOW).unwrap();
        assert!(replay.is_replay);
        assert_eq!(replay.xp_earned, 75);
        assert_eq!(stats.total_xp, 225);

        let progress = stats.campaign_progress.as_ref().unwrap();
        assert_eq!(progress.total_missions_completed, 1);
        assert_eq!(progress.current_waypoint_index, 1);
    }

    #[test]
    fn campaign_round_reports_unlocked_leg() {
        let mut stats = PlayerStats::default();
        let mut last = None;
        for i in 0..5 {
            let round = mission(perfect_round(), "leg-1", i);
            last = Some(apply_round(&mut stats, round, NOW).unwrap());
        }
        assert_eq!(last.unwrap().unlocked_leg_id.as_deref(), Some("leg-2"));
        assert_eq!(stats.campaign().current_leg_id, "leg-2");
    }

    #[test]
    fn invalid_mission_leaves_stats_untouched() {
        let mut stats = PlayerStats::default();
        let err = apply_round(&mut stats, mission(perfect_round(), "leg-404", 0), NOW);
        assert!(matches!(err, Err(GameError::InvalidLeg(_))));
        assert_eq!(stats, PlayerStats::default());
    }

    #[test]
    fn tampered_answer_is_rejected() {
        let mut stats = PlayerStats::default();
        let mut q = Question::new(3, 3);
        q.answer = 10;
        assert!(matches!(
            apply_round(&mut stats, practice(vec![q]), NOW),
            Err(GameError::InvalidSubmission(_))
        ));
        assert!(matches!(
            apply_round(&mut stats, practice(vec![]), NOW),
            Err(GameError::InvalidSubmission(_))
        ));
    }

    #[test]
    fn weak_area_list_is_sorted_and_labelled() {
        let mut stats = PlayerStats::default();
        stats.weak_areas.insert("2x3".to_string(), 1);
        stats.weak_areas.insert("7x8".to_string(), 6);
        stats.weak_areas.insert("6x9".to_string(), 3);

        let list = weak_area_list(&stats);
        let pairs: Vec<&str> = list.iter().map(|w| w.pair.as_str()).collect();
        assert_eq!(pairs, vec!["7x8", "6x9", "2x3"]);
        assert_eq!(list[0].label(), "Needs lots of practice");
        assert_eq!(list[1].label(), "Getting better");
        assert_eq!(list[2].label(), "Almost there");
    }

    #[test]
    fn weak_area_practice_covers_both_factors() {
        let mut stats = PlayerStats::default();
        assert!(weak_area_practice_settings(&stats).is_none());

        stats.weak_areas.insert("7x8".to_string(), 2);
        stats.weak_areas.insert("3x12".to_string(), 1);
        let settings = weak_area_practice_settings(&stats).unwrap();
        assert_eq!(settings.selected_tables, vec![3, 7, 8, 12]);
        assert_eq!(settings.max_multiplier, 12);
        assert_eq!(settings.questions_per_round, 10);
    }
}
