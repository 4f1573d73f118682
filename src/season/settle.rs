use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::SeasonError;
use crate::ledger::Ledger;
use crate::prediction::{validate_result, Picks, RaceResult};
use crate::roster::Roster;
use crate::scoring::calculate_score;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementEntry {
    pub prediction_id: u64,
    pub user_id: String,
    pub streak_before: u32,
    pub streak_after: u32,
    pub total_points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementReport {
    pub race_id: u32,
    pub entries: Vec<SettlementEntry>,
}

/// Record the authoritative result for a race and score every prediction.
///
/// Each prediction is scored with its author's stored streak, then the
/// streak is extended (correct winner) or reset. Users without a
/// prediction for this race keep their streak. A race settles once.
pub fn settle_race(
    ledger: &mut Ledger,
    race_id: u32,
    picks: Picks,
    roster: &Roster,
    now: DateTime<Utc>,
) -> Result<SettlementReport, SeasonError> {
    if !ledger.races.contains_key(&race_id) {
        return Err(SeasonError::RaceNotFound(race_id));
    }
    if ledger.results.contains_key(&race_id) {
        return Err(SeasonError::AlreadySettled(race_id));
    }
    validate_result(&picks, roster).map_err(SeasonError::Invalid)?;

    let result = RaceResult {
        race_id,
        picks,
        settled_at: now,
    };

    let ids: Vec<u64> = ledger
        .predictions_for_race(race_id)
        .iter()
        .map(|p| p.id)
        .collect();
    info!(race_id, predictions = ids.len(), "settling race");

    let mut entries = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(prediction) = ledger.predictions.get_mut(&id) else {
            continue;
        };
        let streak = ledger.streaks.entry(prediction.user_id.clone()).or_default();
        let streak_before = streak.current;

        let score = calculate_score(prediction, &result, streak_before);
        streak.record(score.streak_continues);

        debug!(
            prediction_id = id,
            user_id = %prediction.user_id,
            base = score.base_points,
            multiplier = score.multiplier,
            manual = score.manual_points,
            total = score.total_points,
            "prediction scored"
        );

        entries.push(SettlementEntry {
            prediction_id: id,
            user_id: prediction.user_id.clone(),
            streak_before,
            streak_after: streak.current,
            total_points: score.total_points,
        });
        prediction.points_total = Some(score.total_points);
        prediction.score = Some(score);
    }

    ledger.results.insert(race_id, result);
    info!(race_id, settled = entries.len(), "race settled");

    Ok(SettlementReport { race_id, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Streak;
    use crate::prediction::{Prediction, Race};
    use chrono::Duration;

    const VER: &str = "Max Verstappen (Red Bull)";
    const NOR: &str = "Lando Norris (McLaren)";
    const PIA: &str = "Oscar Piastri (McLaren)";
    const LEC: &str = "Charles Leclerc (Ferrari)";
    const HAM: &str = "Lewis Hamilton (Ferrari)";
    const RUS: &str = "George Russell (Mercedes)";

    fn add_race(ledger: &mut Ledger, id: u32) {
        let quali = Utc::now() - Duration::days(1);
        ledger.races.insert(
            id,
            Race {
                id,
                name: format!("Race {}", id),
                quali_time: quali,
                race_time: quali + Duration::days(1),
            },
        );
    }

    fn add_prediction(ledger: &mut Ledger, user: &str, race_id: u32, picks: Picks, manual: Option<u32>) -> u64 {
        let id = ledger.allocate_prediction_id();
        ledger.predictions.insert(
            id,
            Prediction {
                id,
                user_id: user.to_string(),
                race_id,
                picks,
                wild_prediction: String::new(),
                biggest_flop: String::new(),
                biggest_surprise: String::new(),
                manual_score: manual,
                submitted_at: Utc::now() - Duration::days(2),
                score: None,
                points_total: None,
            },
        );
        id
    }

    fn result_picks() -> Picks {
        Picks::new([VER, NOR, PIA], [VER, NOR, PIA], Some(LEC))
    }

    #[test]
    fn test_settle_scores_all_predictions() {
        let mut ledger = Ledger::new();
        add_race(&mut ledger, 1);
        let perfect = add_prediction(&mut ledger, "u1", 1, result_picks(), Some(5));
        let wrong = add_prediction(&mut ledger, "u2", 1, Picks::new([LEC, HAM, RUS], [LEC, HAM, RUS], None), None);

        let report = settle_race(&mut ledger, 1, result_picks(), &Roster::default(), Utc::now()).unwrap();

        assert_eq!(report.entries.len(), 2);
        assert_eq!(ledger.predictions[&perfect].points_total, Some(48)); // 43 + 5 manual, once
        assert_eq!(ledger.predictions[&wrong].points_total, Some(0));
        assert!(ledger.results.contains_key(&1));
    }

    #[test]
    fn test_settle_updates_streaks() {
        let mut ledger = Ledger::new();
        add_race(&mut ledger, 1);
        ledger.streaks.insert("u1".to_string(), Streak { current: 4, best: 4 });
        ledger.streaks.insert("u2".to_string(), Streak { current: 2, best: 3 });
        ledger.streaks.insert("u3".to_string(), Streak { current: 7, best: 7 });

        // u1 gets the winner, u2 misses, u3 does not play
        let hit = add_prediction(&mut ledger, "u1", 1, Picks::new([LEC, HAM, RUS], [VER, LEC, HAM], None), None);
        add_prediction(&mut ledger, "u2", 1, Picks::new([LEC, HAM, RUS], [NOR, LEC, HAM], None), None);

        let report = settle_race(&mut ledger, 1, result_picks(), &Roster::default(), Utc::now()).unwrap();

        // 10 base x 1.5 (streak 4)
        assert_eq!(ledger.predictions[&hit].points_total, Some(15));
        assert_eq!(ledger.streaks["u1"], Streak { current: 5, best: 5 });
        assert_eq!(ledger.streaks["u2"], Streak { current: 0, best: 3 });
        assert_eq!(ledger.streaks["u3"], Streak { current: 7, best: 7 });

        let u1 = report.entries.iter().find(|e| e.user_id == "u1").unwrap();
        assert_eq!((u1.streak_before, u1.streak_after), (4, 5));
    }

    #[test]
    fn test_new_user_starts_at_zero() {
        let mut ledger = Ledger::new();
        add_race(&mut ledger, 1);
        add_prediction(&mut ledger, "rookie", 1, Picks::new([LEC, HAM, RUS], [VER, LEC, HAM], None), None);

        let report = settle_race(&mut ledger, 1, result_picks(), &Roster::default(), Utc::now()).unwrap();
        assert_eq!(report.entries[0].streak_before, 0);
        assert_eq!(report.entries[0].total_points, 10);
        assert_eq!(ledger.current_streak("rookie"), 1);
    }

    #[test]
    fn test_settle_twice_rejected() {
        let mut ledger = Ledger::new();
        add_race(&mut ledger, 1);
        add_prediction(&mut ledger, "u1", 1, result_picks(), None);

        settle_race(&mut ledger, 1, result_picks(), &Roster::default(), Utc::now()).unwrap();
        let err = settle_race(&mut ledger, 1, result_picks(), &Roster::default(), Utc::now()).unwrap_err();
        assert_eq!(err, SeasonError::AlreadySettled(1));
        assert_eq!(ledger.current_streak("u1"), 1);
    }

    #[test]
    fn test_settle_unknown_race() {
        let mut ledger = Ledger::new();
        let err = settle_race(&mut ledger, 9, result_picks(), &Roster::default(), Utc::now()).unwrap_err();
        assert_eq!(err, SeasonError::RaceNotFound(9));
    }

    #[test]
    fn test_settle_invalid_result_changes_nothing() {
        let mut ledger = Ledger::new();
        add_race(&mut ledger, 1);
        let id = add_prediction(&mut ledger, "u1", 1, result_picks(), None);

        let bad = Picks::new([VER, NOR, PIA], [VER, NOR, "Nobody"], None);
        let err = settle_race(&mut ledger, 1, bad, &Roster::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, SeasonError::Invalid(_)));
        assert!(ledger.results.is_empty());
        assert!(!ledger.predictions[&id].is_settled());
    }

    #[test]
    fn test_only_this_race_is_scored() {
        let mut ledger = Ledger::new();
        add_race(&mut ledger, 1);
        add_race(&mut ledger, 2);
        let other = add_prediction(&mut ledger, "u1", 2, result_picks(), None);
        add_prediction(&mut ledger, "u1", 1, result_picks(), None);

        let report = settle_race(&mut ledger, 1, result_picks(), &Roster::default(), Utc::now()).unwrap();
        assert_eq!(report.entries.len(), 1);
        assert!(!ledger.predictions[&other].is_settled());
    }

    #[test]
    fn test_streak_carries_across_races() {
        let mut ledger = Ledger::new();
        let winner_only = Picks::new([LEC, HAM, RUS], [VER, LEC, HAM], None);
        for race_id in 1..=6 {
            add_race(&mut ledger, race_id);
            add_prediction(&mut ledger, "u1", race_id, winner_only.clone(), None);
        }

        let mut totals = Vec::new();
        for race_id in 1..=6 {
            let report = settle_race(&mut ledger, race_id, result_picks(), &Roster::default(), Utc::now()).unwrap();
            totals.push(report.entries[0].total_points);
        }
        // Streak before each race: 0, 1, 2, 3, 4, 5
        assert_eq!(totals, vec![10, 10, 10, 15, 15, 20]);
        assert_eq!(ledger.streaks["u1"], Streak { current: 6, best: 6 });
    }
}
