//! Question generation: builds a round of multiplication facts biased
//! toward the pairs a player has missed before.
//!
//! The random source is always passed in, so a seeded generator reproduces
//! a round exactly.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::GameError;
use crate::game::stats::PlayerStats;

/// Share of a round drawn from the most-missed facts.
const WEAK_SHARE: f64 = 0.6;

/// Chance that a ×1 or ×10 fact enters the candidate pool at all.
const TRIVIAL_FACT_CHANCE: f64 = 0.3;

pub const PRACTICE_MAX_MULTIPLIER: u32 = 12;
pub const PRACTICE_QUESTIONS_PER_ROUND: usize = 10;

/// Largest times table, multiplier and round size a round may ask for.
pub const MAX_TABLE: u32 = 100;
pub const MAX_MULTIPLIER: u32 = 100;
pub const MAX_QUESTIONS_PER_ROUND: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub num1: u32,
    pub num2: u32,
    pub answer: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}

impl Question {
    pub fn new(num1: u32, num2: u32) -> Self {
        Self {
            num1,
            num2,
            answer: num1.saturating_mul(num2),
            user_answer: None,
            correct: None,
        }
    }

    /// Record the player's answer and whether it was right.
    pub fn record_answer(&mut self, value: i64) -> bool {
        let correct = value == i64::from(self.answer);
        self.user_answer = Some(value);
        self.correct = Some(correct);
        correct
    }

    pub fn key(&self) -> String {
        fact_key(self.num1, self.num2)
    }
}

/// Configuration for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub selected_tables: Vec<u32>,
    pub max_multiplier: u32,
    pub questions_per_round: usize,
}

impl GameSettings {
    /// Free-practice round over the given tables.
    pub fn practice(selected_tables: Vec<u32>) -> Self {
        Self {
            selected_tables,
            max_multiplier: PRACTICE_MAX_MULTIPLIER,
            questions_per_round: PRACTICE_QUESTIONS_PER_ROUND,
        }
    }

    /// Every table within `1..=MAX_TABLE`, the multiplier within
    /// `1..=MAX_MULTIPLIER`, and the round size within
    /// `1..=MAX_QUESTIONS_PER_ROUND`. Within these bounds every product
    /// fits in a `u32`.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.selected_tables.is_empty() {
            return Err(GameError::NoTablesSelected);
        }
        if let Some(&table) = self
            .selected_tables
            .iter()
            .find(|&&t| t == 0 || t > MAX_TABLE)
        {
            return Err(GameError::InvalidTable(table));
        }
        if self.max_multiplier == 0 || self.max_multiplier > MAX_MULTIPLIER {
            return Err(GameError::InvalidMultiplier);
        }
        if self.questions_per_round == 0 || self.questions_per_round > MAX_QUESTIONS_PER_ROUND {
            return Err(GameError::InvalidRoundSize);
        }
        Ok(())
    }
}

/// Weak-area key for a fact pair, e.g. `"7x8"`.
pub fn fact_key(num1: u32, num2: u32) -> String {
    format!("{}x{}", num1, num2)
}

/// Generate `questions_per_round` questions for `settings`.
///
/// Roughly 60% of the round comes from the front of the pool sorted by miss
/// count; the rest is drawn with replacement from what is left, so repeats
/// are possible in that part.
pub fn generate_questions<R: Rng + ?Sized>(
    settings: &GameSettings,
    stats: Option<&PlayerStats>,
    rng: &mut R,
) -> Result<Vec<Question>, GameError> {
    settings.validate()?;

    let mut pool: Vec<(u32, u32)> = Vec::new();
    for &table in &settings.selected_tables {
        for m in 1..=settings.max_multiplier {
            if (m == 1 || m == 10) && !rng.gen_bool(TRIVIAL_FACT_CHANCE) {
                continue;
            }
            pool.push((table, m));
        }
    }

    if let Some(stats) = stats.filter(|s| !s.weak_areas.is_empty()) {
        // Vec::sort_by is stable, so equal miss counts keep pool order.
        pool.sort_by(|a, b| miss_count(stats, *b).cmp(&miss_count(stats, *a)));
    }

    let total = settings.questions_per_round;
    let weak_count = (total as f64 * WEAK_SHARE).floor() as usize;
    let random_count = total - weak_count;

    let mut picks: Vec<(u32, u32)> = pool.iter().take(weak_count).copied().collect();

    let remaining = pool.get(weak_count..).unwrap_or(&[]);
    if random_count > 0 && remaining.is_empty() {
        return Err(GameError::EmptyPool(random_count));
    }
    for _ in 0..random_count {
        picks.push(remaining[rng.gen_range(0..remaining.len())]);
    }

    picks.shuffle(rng);

    Ok(picks.into_iter().map(|(a, b)| Question::new(a, b)).collect())
}

fn miss_count(stats: &PlayerStats, (a, b): (u32, u32)) -> u32 {
    stats.weak_areas.get(&fact_key(a, b)).copied().unwrap_or(0)
}

/// Bump the miss count of every question answered incorrectly.
pub fn update_weak_areas(questions: &[Question], weak_areas: &mut BTreeMap<String, u32>) {
    for q in questions.iter().filter(|q| q.correct == Some(false)) {
        *weak_areas.entry(q.key()).or_insert(0) += 1;
    }
}

pub fn score(questions: &[Question]) -> u32 {
    questions.iter().filter(|q| q.correct == Some(true)).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn settings(tables: &[u32], max: u32, count: usize) -> GameSettings {
        GameSettings {
            selected_tables: tables.to_vec(),
            max_multiplier: max,
            questions_per_round: count,
        }
    }

    #[test]
    fn round_has_requested_length_and_valid_facts() {
        let s = settings(&[3, 7], 12, 20);
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let qs = generate_questions(&s, None, &mut rng).unwrap();
            assert_eq!(qs.len(), 20);
            for q in &qs {
                assert!(s.selected_tables.contains(&q.num1));
                assert!((1..=12).contains(&q.num2));
                assert_eq!(q.answer, q.num1 * q.num2);
                assert!(q.user_answer.is_none());
                assert!(q.correct.is_none());
            }
        }
    }

    #[test]
    fn same_seed_gives_same_round() {
        let s = settings(&[2, 5, 9], 12, 15);
        let a = generate_questions(&s, None, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        let b = generate_questions(&s, None, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn most_missed_facts_are_always_included() {
        let mut stats = PlayerStats::default();
        stats.weak_areas.insert("6x7".to_string(), 9);
        stats.weak_areas.insert("6x8".to_string(), 4);
        stats.weak_areas.insert("6x3".to_string(), 2);
        let s = settings(&[6], 12, 10);

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let qs = generate_questions(&s, Some(&stats), &mut rng).unwrap();
            for key in ["6x7", "6x8", "6x3"] {
                assert!(qs.iter().any(|q| q.key() == key), "seed {seed} missing {key}");
            }
        }
    }

    #[test]
    fn trivial_multipliers_are_down_weighted() {
        let s = settings(&[4], 12, 10);
        let mut trivial = 0usize;
        let mut total = 0usize;
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let qs = generate_questions(&s, None, &mut rng).unwrap();
            trivial += qs.iter().filter(|q| q.num2 == 1 || q.num2 == 10).count();
            total += qs.len();
        }
        // Unweighted, ×1 and ×10 would be 2/12 of all questions.
        assert!((trivial as f64) / (total as f64) < 2.0 / 12.0);
    }

    #[test]
    fn tiny_pool_reports_empty_pool() {
        // One table, max multiplier 1: the pool holds at most one fact, and
        // the single weak pick consumes it.
        let s = settings(&[5], 1, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = generate_questions(&s, None, &mut rng).unwrap_err();
        assert!(matches!(err, GameError::EmptyPool(2)));
    }

    #[test]
    fn empty_table_selection_is_rejected() {
        let s = settings(&[], 12, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            generate_questions(&s, None, &mut rng),
            Err(GameError::NoTablesSelected)
        ));
    }

    #[test]
    fn out_of_range_settings_are_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let huge = settings(&[100_000], 100_000, 10);
        assert!(matches!(
            generate_questions(&huge, None, &mut rng),
            Err(GameError::InvalidTable(100_000))
        ));
        assert!(matches!(
            settings(&[0, 3], 12, 10).validate(),
            Err(GameError::InvalidTable(0))
        ));
        assert!(matches!(
            settings(&[7], 100_000, 10).validate(),
            Err(GameError::InvalidMultiplier)
        ));
        assert!(matches!(
            settings(&[7], 12, 4_000_000_000).validate(),
            Err(GameError::InvalidRoundSize)
        ));
    }

    #[test]
    fn largest_allowed_round_can_be_scored() {
        let s = settings(&[MAX_TABLE], MAX_MULTIPLIER, MAX_QUESTIONS_PER_ROUND);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let qs = generate_questions(&s, None, &mut rng).unwrap();
        assert_eq!(qs.len(), MAX_QUESTIONS_PER_ROUND);
        for q in &qs {
            assert_eq!(Some(q.answer), q.num1.checked_mul(q.num2));
        }
    }

    #[test]
    fn record_answer_marks_correctness() {
        let mut q = Question::new(7, 8);
        assert!(q.record_answer(56));
        assert_eq!(q.correct, Some(true));
        assert!(!q.record_answer(54));
        assert_eq!(q.user_answer, Some(54));
        assert_eq!(q.correct, Some(false));
    }

    #[test]
    fn weak_areas_count_only_misses() {
        let mut right = Question::new(3, 4);
        right.record_answer(12);
        let mut wrong = Question::new(7, 8);
        wrong.record_answer(54);
        let unanswered = Question::new(2, 2);

        let mut weak = BTreeMap::from([("7x8".to_string(), 2)]);
        update_weak_areas(&[right, wrong, unanswered], &mut weak);
        assert_eq!(weak.get("7x8"), Some(&3));
        assert!(!weak.contains_key("3x4"));
        assert!(!weak.contains_key("2x2"));
    }

    #[test]
    fn question_json_uses_camel_case() {
        let mut q = Question::new(6, 9);
        q.record_answer(54);
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains("\"userAnswer\":54"));
        assert!(json.contains("\"correct\":true"));
    }
}
