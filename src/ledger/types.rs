use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::league::{League, LeagueGrade};
use crate::prediction::{Prediction, Race, RaceResult};

pub const LEDGER_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
}

/// Consecutive races with a correct winner pick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    #[serde(default)]
    pub best: u32,
}

impl Streak {
    /// Extend on a correct winner pick, reset otherwise.
    pub fn record(&mut self, continues: bool) {
        if continues {
            self.current += 1;
            self.best = self.best.max(self.current);
        } else {
            self.current = 0;
        }
    }
}

/// Everything the season keeps: races, users, predictions, results, streaks, leagues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub version: u32,
    #[serde(default)]
    pub races: BTreeMap<u32, Race>,
    #[serde(default)]
    pub users: BTreeMap<String, Profile>,
    #[serde(default)]
    pub predictions: BTreeMap<u64, Prediction>,
    #[serde(default)]
    pub results: BTreeMap<u32, RaceResult>,
    #[serde(default)]
    pub streaks: BTreeMap<String, Streak>,
    #[serde(default)]
    pub leagues: BTreeMap<u32, League>,
    #[serde(default)]
    pub league_grades: Vec<LeagueGrade>,
    #[serde(default)]
    pub next_prediction_id: u64,
    #[serde(default)]
    pub next_league_id: u32,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create a new empty ledger with the current version
    pub fn new() -> Self {
        Self {
            version: LEDGER_VERSION,
            races: BTreeMap::new(),
            users: BTreeMap::new(),
            predictions: BTreeMap::new(),
            results: BTreeMap::new(),
            streaks: BTreeMap::new(),
            leagues: BTreeMap::new(),
            league_grades: Vec::new(),
            next_prediction_id: 1,
            next_league_id: 1,
        }
    }

    /// Predictions for a race in id (submission) order
    pub fn predictions_for_race(&self, race_id: u32) -> Vec<&Prediction> {
        self.predictions
            .values()
            .filter(|p| p.race_id == race_id)
            .collect()
    }

    pub fn find_prediction(&self, user_id: &str, race_id: u32) -> Option<&Prediction> {
        self.predictions
            .values()
            .find(|p| p.user_id == user_id && p.race_id == race_id)
    }

    /// Stored streak for a user, 0 for a user with no record
    pub fn current_streak(&self, user_id: &str) -> u32 {
        self.streaks.get(user_id).map(|s| s.current).unwrap_or(0)
    }

    /// Display name, falling back to the id for unregistered users
    pub fn username<'a>(&'a self, user_id: &'a str) -> &'a str {
        self.users
            .get(user_id)
            .map(|p| p.username.as_str())
            .unwrap_or(user_id)
    }

    pub fn allocate_prediction_id(&mut self) -> u64 {
        let id = self.next_prediction_id.max(1);
        self.next_prediction_id = id + 1;
        id
    }

    pub fn allocate_league_id(&mut self) -> u32 {
        let id = self.next_league_id.max(1);
        self.next_league_id = id + 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ledger_empty() {
        let ledger = Ledger::new();
        assert_eq!(ledger.version, 1);
        assert!(ledger.races.is_empty());
        assert!(ledger.predictions.is_empty());
        assert_eq!(ledger.current_streak("nobody"), 0);
    }

    #[test]
    fn test_streak_record() {
        let mut streak = Streak::default();
        streak.record(true);
        streak.record(true);
        streak.record(true);
        assert_eq!(streak.current, 3);
        assert_eq!(streak.best, 3);

        streak.record(false);
        assert_eq!(streak.current, 0);
        assert_eq!(streak.best, 3);

        streak.record(true);
        assert_eq!(streak.current, 1);
        assert_eq!(streak.best, 3);
    }

    #[test]
    fn test_id_allocation() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.allocate_prediction_id(), 1);
        assert_eq!(ledger.allocate_prediction_id(), 2);
        assert_eq!(ledger.allocate_league_id(), 1);
    }

    #[test]
    fn test_username_fallback() {
        let mut ledger = Ledger::new();
        ledger.users.insert(
            "u1".to_string(),
            Profile {
                id: "u1".to_string(),
                username: "boxbox".to_string(),
            },
        );
        assert_eq!(ledger.username("u1"), "boxbox");
        assert_eq!(ledger.username("u2"), "u2");
    }
}
