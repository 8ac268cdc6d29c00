//! XP, star and rank rules. Pure functions of a round's score.

use serde::Serialize;

const BASE_XP: u32 = 50;

/// Accuracy as a percentage in `0..=100`. An empty round counts as 0%.
pub fn accuracy(score: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(score) / f64::from(total) * 100.0
}

/// XP for a practice round: 50 plus one point per percent correct (floored).
pub fn calculate_xp(score: u32, total: u32) -> u32 {
    if total == 0 {
        return BASE_XP;
    }
    let percent = u64::from(score) * 100 / u64::from(total);
    u32::try_from(percent)
        .map_or(u32::MAX, |p| p.saturating_add(BASE_XP))
}

/// Stars for a completed round: 90%+ is three, 70%+ is two, anything else one.
pub fn calculate_stars(score: u32, total: u32) -> u8 {
    let (score, total) = (u64::from(score), u64::from(total));
    if score * 100 >= total * 90 && total > 0 {
        3
    } else if score * 100 >= total * 70 && total > 0 {
        2
    } else {
        1
    }
}

/// Campaign XP is halved (floored) when replaying a completed waypoint.
pub fn calculate_campaign_xp(score: u32, total: u32, is_replay: bool) -> u32 {
    let xp = calculate_xp(score, total);
    if is_replay { xp / 2 } else { xp }
}

// ── Ranks ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Cadet,
    Captain,
    Commander,
}

const CAPTAIN_XP: u32 = 500;
const COMMANDER_XP: u32 = 2000;

impl Rank {
    pub fn name(self) -> &'static str {
        match self {
            Rank::Cadet => "Space Cadet",
            Rank::Captain => "Space Captain",
            Rank::Commander => "Space Commander",
        }
    }

    pub fn xp_required(self) -> u32 {
        match self {
            Rank::Cadet => 0,
            Rank::Captain => CAPTAIN_XP,
            Rank::Commander => COMMANDER_XP,
        }
    }

    /// XP needed for the next rank, `None` at the top.
    pub fn next_threshold(self) -> Option<u32> {
        match self {
            Rank::Cadet => Some(CAPTAIN_XP),
            Rank::Captain => Some(COMMANDER_XP),
            Rank::Commander => None,
        }
    }
}

pub fn rank_for_xp(xp: u32) -> Rank {
    if xp >= COMMANDER_XP {
        Rank::Commander
    } else if xp >= CAPTAIN_XP {
        Rank::Captain
    } else {
        Rank::Cadet
    }
}

/// Percent of the way from the current rank to the next (100 at the top).
pub fn rank_progress(xp: u32) -> u32 {
    let rank = rank_for_xp(xp);
    match rank.next_threshold() {
        Some(next) => {
            let floor = rank.xp_required();
            ((xp - floor) as f64 / (next - floor) as f64 * 100.0).round() as u32
        }
        None => 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_is_base_plus_percent() {
        assert_eq!(calculate_xp(20, 20), 150);
        assert_eq!(calculate_xp(0, 20), 50);
        assert_eq!(calculate_xp(7, 10), 120);
        // 2/3 = 66.6..% floors to 66
        assert_eq!(calculate_xp(2, 3), 116);
    }

    #[test]
    fn star_boundaries() {
        assert_eq!(calculate_stars(20, 20), 3);
        assert_eq!(calculate_stars(18, 20), 3);
        assert_eq!(calculate_stars(17, 20), 2);
        assert_eq!(calculate_stars(14, 20), 2);
        assert_eq!(calculate_stars(13, 20), 1);
        assert_eq!(calculate_stars(0, 20), 1);
    }

    #[test]
    fn stars_never_decrease_as_score_rises() {
        for total in 1..=30 {
            let mut last = 0;
            for score in 0..=total {
                let stars = calculate_stars(score, total);
                assert!(stars >= last, "{score}/{total}");
                last = stars;
            }
        }
    }

    #[test]
    fn campaign_replay_halves_xp() {
        assert_eq!(calculate_campaign_xp(20, 20, false), 150);
        assert_eq!(calculate_campaign_xp(20, 20, true), 75);
        // 50 + 85 = 135, halved and floored
        assert_eq!(calculate_campaign_xp(17, 20, true), 67);
    }

    #[test]
    fn empty_round_is_safe() {
        assert_eq!(calculate_xp(0, 0), 50);
        assert_eq!(calculate_stars(0, 0), 1);
        assert_eq!(accuracy(0, 0), 0.0);
    }

    #[test]
    fn xp_for_huge_scores_does_not_overflow() {
        assert_eq!(calculate_xp(u32::MAX, u32::MAX), 150);
        assert_eq!(calculate_xp(u32::MAX, 1), u32::MAX);
    }

    #[test]
    fn ranks_by_xp() {
        assert_eq!(rank_for_xp(0), Rank::Cadet);
        assert_eq!(rank_for_xp(499), Rank::Cadet);
        assert_eq!(rank_for_xp(500), Rank::Captain);
        assert_eq!(rank_for_xp(2000), Rank::Commander);
        assert_eq!(Rank::Captain.name(), "Space Captain");
    }

    #[test]
    fn rank_progress_percent() {
        assert_eq!(rank_progress(250), 50);
        assert_eq!(rank_progress(500), 0);
        assert_eq!(rank_progress(1250), 50);
        assert_eq!(rank_progress(5000), 100);
    }
}
