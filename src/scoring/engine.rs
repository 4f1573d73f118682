use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::points::{
    PodiumTier, StreakTier, FASTEST_LAP_POINTS, HAT_TRICK_POINTS, QUALI_POINTS, RACE_POINTS,
};
use crate::prediction::{Prediction, RaceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Qualifying,
    Race,
    Bonus,
}

/// One scoring hit, e.g. "Race P1" worth 10.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub category: Category,
    pub label: String,
    pub points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub qualifying: u32,
    pub race: u32,
    pub bonuses: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Qualifying + race + bonuses, before the multiplier
    pub base_points: u32,
    pub multiplier: f64,
    pub total_points: u32,
    pub streak_continues: bool,
    pub breakdown: ScoreBreakdown,
    pub manual_points: u32,
    #[serde(default)]
    pub awards: Vec<Award>,
}

impl Score {
    /// floor(base_points x multiplier), the part of the total the streak scaled.
    pub fn multiplied_points(&self) -> u32 {
        self.total_points.saturating_sub(self.manual_points)
    }

    /// Same score with a different manual grade. The automatic part is kept.
    pub fn with_manual_points(&self, manual_points: u32) -> Score {
        Score {
            total_points: self.multiplied_points().saturating_add(manual_points),
            manual_points,
            ..self.clone()
        }
    }
}

fn hit(predicted: Option<&str>, actual: Option<&str>) -> bool {
    matches!((predicted, actual), (Some(p), Some(a)) if p == a)
}

/// Unordered podium comparison. A missing pick can never complete a trio.
fn same_podium(predicted: &[Option<&str>; 3], actual: &[Option<&str>; 3]) -> bool {
    let predicted: Option<BTreeSet<&str>> = predicted.iter().copied().collect();
    let actual: Option<BTreeSet<&str>> = actual.iter().copied().collect();
    match (predicted, actual) {
        (Some(p), Some(a)) => p == a,
        _ => false,
    }
}

struct Tally {
    breakdown: ScoreBreakdown,
    awards: Vec<Award>,
}

impl Tally {
    fn award(&mut self, category: Category, label: impl Into<String>, points: u32) {
        match category {
            Category::Qualifying => self.breakdown.qualifying += points,
            Category::Race => self.breakdown.race += points,
            Category::Bonus => self.breakdown.bonuses += points,
        }
        self.awards.push(Award {
            category,
            label: label.into(),
            points,
        });
    }
}

/// Score a prediction against the race result.
///
/// Pure and deterministic. `current_streak` is the user's stored streak
/// before this race; the returned `streak_continues` tells the caller
/// whether to extend it.
pub fn calculate_score(prediction: &Prediction, result: &RaceResult, current_streak: u32) -> Score {
    let predicted = &prediction.picks;
    let actual = &result.picks;
    let mut tally = Tally {
        breakdown: ScoreBreakdown::default(),
        awards: Vec::new(),
    };

    let pred_quali = predicted.quali();
    let real_quali = actual.quali();
    for (slot, points) in QUALI_POINTS.iter().enumerate() {
        if hit(pred_quali[slot], real_quali[slot]) {
            tally.award(Category::Qualifying, format!("Qualifying P{}", slot + 1), *points);
        }
    }

    let pred_race = predicted.race();
    let real_race = actual.race();
    let mut race_hits = 0;
    for (slot, points) in RACE_POINTS.iter().enumerate() {
        if hit(pred_race[slot], real_race[slot]) {
            race_hits += 1;
            tally.award(Category::Race, format!("Race P{}", slot + 1), *points);
        }
    }

    let pole_correct = hit(pred_quali[0], real_quali[0]);
    let win_correct = hit(pred_race[0], real_race[0]);
    if pole_correct && win_correct && hit(pred_quali[0], pred_race[0]) {
        tally.award(Category::Bonus, "Hat trick", HAT_TRICK_POINTS);
    }

    let podium = if race_hits == RACE_POINTS.len() {
        PodiumTier::ExactOrder
    } else if same_podium(&pred_race, &real_race) {
        PodiumTier::AnyOrder
    } else {
        PodiumTier::Miss
    };
    match podium {
        PodiumTier::ExactOrder => {
            tally.award(Category::Bonus, "Podium trio (exact order)", podium.points())
        }
        PodiumTier::AnyOrder => {
            tally.award(Category::Bonus, "Podium trio (any order)", podium.points())
        }
        PodiumTier::Miss => {}
    }

    if hit(predicted.fastest_lap(), actual.fastest_lap()) {
        tally.award(Category::Bonus, "Fastest lap", FASTEST_LAP_POINTS);
    }

    let breakdown = tally.breakdown;
    let base_points = breakdown.qualifying + breakdown.race + breakdown.bonuses;
    let tier = StreakTier::from_streak(current_streak);
    let manual_points = prediction.manual_score.unwrap_or(0);

    Score {
        base_points,
        multiplier: tier.multiplier(),
        total_points: tier.apply(base_points).saturating_add(manual_points),
        streak_continues: win_correct,
        breakdown,
        manual_points,
        awards: tally.awards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::Picks;
    use chrono::Utc;

    const VER: &str = "Max Verstappen (Red Bull)";
    const NOR: &str = "Lando Norris (McLaren)";
    const PIA: &str = "Oscar Piastri (McLaren)";
    const LEC: &str = "Charles Leclerc (Ferrari)";
    const HAM: &str = "Lewis Hamilton (Ferrari)";
    const RUS: &str = "George Russell (Mercedes)";

    fn sample_prediction(picks: Picks, manual_score: Option<u32>) -> Prediction {
        Prediction {
            id: 1,
            user_id: "user-1".to_string(),
            race_id: 1,
            picks,
            wild_prediction: String::new(),
            biggest_flop: String::new(),
            biggest_surprise: String::new(),
            manual_score,
            submitted_at: Utc::now(),
            score: None,
            points_total: None,
        }
    }

    fn sample_result(picks: Picks) -> RaceResult {
        RaceResult {
            race_id: 1,
            picks,
            settled_at: Utc::now(),
        }
    }

    fn reference_result() -> RaceResult {
        sample_result(Picks::new([VER, NOR, PIA], [VER, NOR, PIA], Some(LEC)))
    }

    #[test]
    fn test_perfect_prediction() {
        let prediction =
            sample_prediction(Picks::new([VER, NOR, PIA], [VER, NOR, PIA], Some(LEC)), None);
        let score = calculate_score(&prediction, &reference_result(), 0);

        assert_eq!(score.breakdown.qualifying, 9);
        assert_eq!(score.breakdown.race, 24);
        assert_eq!(score.breakdown.bonuses, 10); // hat trick 2 + exact trio 5 + fastest lap 3
        assert_eq!(score.base_points, 43);
        assert_eq!(score.multiplier, 1.0);
        assert_eq!(score.total_points, 43);
        assert_eq!(score.manual_points, 0);
        assert!(score.streak_continues);
    }

    #[test]
    fn test_perfect_prediction_with_manual_points() {
        let prediction =
            sample_prediction(Picks::new([VER, NOR, PIA], [VER, NOR, PIA], Some(LEC)), Some(7));
        let score = calculate_score(&prediction, &reference_result(), 0);
        assert_eq!(score.total_points, 50);
        assert_eq!(score.manual_points, 7);
    }

    #[test]
    fn test_shuffled_podium_scores_any_order_only() {
        let prediction = sample_prediction(Picks::new([VER, NOR, PIA], [NOR, PIA, VER], None), None);
        let score = calculate_score(&prediction, &reference_result(), 0);

        assert_eq!(score.breakdown.race, 0);
        assert_eq!(score.breakdown.qualifying, 9);
        // No hat trick (race P1 wrong), no exact trio
        assert_eq!(score.breakdown.bonuses, 2);
        assert!(!score.streak_continues);
        assert!(score
            .awards
            .iter()
            .any(|a| a.label == "Podium trio (any order)" && a.points == 2));
    }

    #[test]
    fn test_only_winner_correct_on_long_streak() {
        let prediction = sample_prediction(Picks::new([LEC, HAM, RUS], [VER, LEC, HAM], None), None);
        let score = calculate_score(&prediction, &reference_result(), 6);

        assert_eq!(score.breakdown.race, 10);
        assert_eq!(score.breakdown.qualifying, 0);
        assert_eq!(score.breakdown.bonuses, 0);
        assert_eq!(score.base_points, 10);
        assert_eq!(score.multiplier, 2.0);
        assert_eq!(score.total_points, 20);
        assert!(score.streak_continues);
    }

    #[test]
    fn test_missing_fastest_lap_pick() {
        let prediction = sample_prediction(Picks::new([LEC, HAM, RUS], [LEC, HAM, RUS], None), None);
        let score = calculate_score(&prediction, &reference_result(), 0);
        assert_eq!(score.base_points, 0);
        assert_eq!(score.total_points, 0);
        assert!(score.awards.is_empty());
    }

    #[test]
    fn test_absent_fastest_lap_on_both_sides_never_matches() {
        let prediction = sample_prediction(Picks::new([LEC, HAM, RUS], [LEC, HAM, RUS], None), None);
        let result = sample_result(Picks::new([VER, NOR, PIA], [VER, NOR, PIA], None));
        let score = calculate_score(&prediction, &result, 0);
        assert_eq!(score.breakdown.bonuses, 0);
    }

    #[test]
    fn test_streak_four_uses_middle_tier() {
        let prediction = sample_prediction(Picks::new([LEC, HAM, RUS], [VER, LEC, HAM], None), None);
        let score = calculate_score(&prediction, &reference_result(), 4);
        assert_eq!(score.multiplier, 1.5);
        assert_eq!(score.total_points, 15);
    }

    #[test]
    fn test_manual_points_added_after_multiplier() {
        // Base 20: race P2 (8) + race P3 (6) + quali P2 (3) + fastest lap (3)
        let prediction = sample_prediction(Picks::new([LEC, NOR, RUS], [HAM, NOR, PIA], Some(LEC)), Some(10));
        let score = calculate_score(&prediction, &reference_result(), 0);
        assert_eq!(score.base_points, 20);
        assert_eq!(score.total_points, 30);
        assert_eq!(score.manual_points, 10);
    }

    #[test]
    fn test_hat_trick_requires_same_driver() {
        // Pole and win both correct, but the actual pole sitter differs from the winner
        let result = sample_result(Picks::new([NOR, VER, PIA], [VER, NOR, PIA], None));
        let prediction = sample_prediction(Picks::new([NOR, HAM, RUS], [VER, LEC, HAM], None), None);
        let score = calculate_score(&prediction, &result, 0);
        assert_eq!(score.breakdown.qualifying, 5);
        assert_eq!(score.breakdown.race, 10);
        assert_eq!(score.breakdown.bonuses, 0);
    }

    #[test]
    fn test_hat_trick_awarded() {
        let prediction = sample_prediction(Picks::new([VER, HAM, RUS], [VER, LEC, HAM], None), None);
        let score = calculate_score(&prediction, &reference_result(), 0);
        assert_eq!(score.breakdown.bonuses, 2);
        assert!(score.awards.iter().any(|a| a.label == "Hat trick"));
    }

    #[test]
    fn test_podium_tiers_are_exclusive() {
        let drivers = [VER, NOR, PIA, LEC];
        let result = reference_result();
        for a in drivers {
            for b in drivers {
                for c in drivers {
                    let prediction =
                        sample_prediction(Picks::new([LEC, HAM, RUS], [a, b, c], None), None);
                    let score = calculate_score(&prediction, &result, 0);
                    let podium: Vec<_> = score
                        .awards
                        .iter()
                        .filter(|a| a.label.starts_with("Podium trio"))
                        .collect();
                    assert!(podium.len() <= 1);
                    let hat_trick = score.awards.iter().any(|a| a.label == "Hat trick");
                    let podium_points = score.breakdown.bonuses - if hat_trick { 2 } else { 0 };
                    assert!([0, 2, 5].contains(&podium_points));
                }
            }
        }
    }

    #[test]
    fn test_missing_race_picks_never_complete_trio() {
        let mut picks = Picks::new([LEC, HAM, RUS], [VER, NOR, PIA], None);
        picks.race_p3_driver = None;
        let result = sample_result(Picks {
            race_p3_driver: None,
            ..Picks::new([VER, NOR, PIA], [VER, NOR, PIA], None)
        });
        let score = calculate_score(&sample_prediction(picks, None), &result, 0);
        // P1 + P2 only, no trio bonus of either kind
        assert_eq!(score.breakdown.race, 18);
        assert_eq!(score.breakdown.bonuses, 0);
    }

    #[test]
    fn test_placeholder_never_matches_placeholder() {
        let placeholder = crate::prediction::PLACEHOLDER_DRIVER;
        let picks = Picks::new([placeholder; 3], [placeholder; 3], Some(placeholder));
        let score = calculate_score(
            &sample_prediction(picks.clone(), None),
            &sample_result(picks),
            0,
        );
        assert_eq!(score.base_points, 0);
        assert!(!score.streak_continues);
    }

    #[test]
    fn test_deterministic() {
        let prediction =
            sample_prediction(Picks::new([VER, PIA, NOR], [NOR, VER, PIA], Some(LEC)), Some(4));
        let result = reference_result();
        let first = calculate_score(&prediction, &result, 3);
        for _ in 0..10 {
            assert_eq!(calculate_score(&prediction, &result, 3), first);
        }
    }

    #[test]
    fn test_multiplier_monotonic_in_streak() {
        let prediction = sample_prediction(Picks::new([VER, HAM, RUS], [VER, LEC, PIA], None), None);
        let result = reference_result();
        let mut previous = 0;
        for streak in 0..8 {
            let total = calculate_score(&prediction, &result, streak).total_points;
            assert!(total >= previous, "streak {} dropped total", streak);
            previous = total;
        }
    }

    #[test]
    fn test_manual_points_unscaled_for_every_tier() {
        let picks = Picks::new([VER, HAM, RUS], [VER, LEC, PIA], None);
        let result = reference_result();
        for streak in [0, 3, 5] {
            let without = calculate_score(&sample_prediction(picks.clone(), None), &result, streak);
            let with = calculate_score(&sample_prediction(picks.clone(), Some(13)), &result, streak);
            assert_eq!(with.total_points, without.total_points + 13);
            assert_eq!(with.base_points, without.base_points);
        }
    }

    #[test]
    fn test_streak_flag_depends_only_on_winner() {
        let result = reference_result();
        let variants = [
            Picks::new([VER, NOR, PIA], [VER, LEC, HAM], Some(LEC)),
            Picks::new([LEC, HAM, RUS], [VER, RUS, LEC], None),
            Picks::new([HAM, VER, NOR], [VER, NOR, PIA], Some(HAM)),
        ];
        for picks in variants {
            let score = calculate_score(&sample_prediction(picks, None), &result, 2);
            assert!(score.streak_continues);
        }
        let wrong = Picks::new([VER, NOR, PIA], [NOR, VER, PIA], Some(LEC));
        assert!(!calculate_score(&sample_prediction(wrong, None), &result, 2).streak_continues);
    }

    #[test]
    fn test_with_manual_points_keeps_multiplied_part() {
        let prediction = sample_prediction(Picks::new([LEC, HAM, RUS], [VER, LEC, HAM], None), Some(5));
        let score = calculate_score(&prediction, &reference_result(), 3);
        assert_eq!(score.total_points, 20); // 10 x 1.5 + 5
        let regraded = score.with_manual_points(12);
        assert_eq!(regraded.total_points, 27);
        assert_eq!(regraded.manual_points, 12);
        assert_eq!(regraded.base_points, 10);
        assert_eq!(regraded.multiplier, 1.5);
    }

    #[test]
    fn test_oversized_manual_points_saturate() {
        let prediction =
            sample_prediction(Picks::new([VER, NOR, PIA], [VER, NOR, PIA], Some(LEC)), Some(u32::MAX));
        let score = calculate_score(&prediction, &reference_result(), 0);
        assert_eq!(score.base_points, 43);
        assert_eq!(score.total_points, u32::MAX);
    }

    #[test]
    fn test_multiplied_points_with_inconsistent_record() {
        let prediction = sample_prediction(Picks::new([VER, NOR, PIA], [RUS, HAM, LEC], None), None);
        let mut score = calculate_score(&prediction, &reference_result(), 0);
        // Hand-edited ledger: manual part larger than the total
        score.total_points = 3;
        score.manual_points = 10;
        assert_eq!(score.multiplied_points(), 0);
        assert_eq!(score.with_manual_points(4).total_points, 4);
    }

    #[test]
    fn test_score_serializes_record_fields() {
        let prediction = sample_prediction(Picks::new([LEC, HAM, RUS], [VER, LEC, HAM], None), None);
        let score = calculate_score(&prediction, &reference_result(), 0);
        let value = serde_json::to_value(&score).unwrap();
        for key in [
            "base_points",
            "multiplier",
            "total_points",
            "streak_continues",
            "breakdown",
            "manual_points",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["breakdown"]["race"], 10);
        assert_eq!(value["breakdown"]["bonuses"], 0);
    }
}
