use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::Score;

/// Value the prediction form sends for an untouched driver dropdown.
pub const PLACEHOLDER_DRIVER: &str = "Select Driver...";

/// Driver picks shared by predictions and results.
///
/// Field names match the stored records (`quali_p1_driver`, ...). A missing
/// value, an empty string and the form placeholder all mean "no pick".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picks {
    #[serde(default)]
    pub quali_p1_driver: Option<String>,
    #[serde(default)]
    pub quali_p2_driver: Option<String>,
    #[serde(default)]
    pub quali_p3_driver: Option<String>,
    #[serde(default)]
    pub race_p1_driver: Option<String>,
    #[serde(default)]
    pub race_p2_driver: Option<String>,
    #[serde(default)]
    pub race_p3_driver: Option<String>,
    #[serde(default)]
    pub fastest_lap_driver: Option<String>,
}

fn pick(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty() && *v != PLACEHOLDER_DRIVER)
}

impl Picks {
    /// Build picks from ordered qualifying and race podiums.
    pub fn new(
        quali: [&str; 3],
        race: [&str; 3],
        fastest_lap: Option<&str>,
    ) -> Self {
        Self {
            quali_p1_driver: Some(quali[0].to_string()),
            quali_p2_driver: Some(quali[1].to_string()),
            quali_p3_driver: Some(quali[2].to_string()),
            race_p1_driver: Some(race[0].to_string()),
            race_p2_driver: Some(race[1].to_string()),
            race_p3_driver: Some(race[2].to_string()),
            fastest_lap_driver: fastest_lap.map(str::to_string),
        }
    }

    /// Qualifying P1..P3, placeholders normalized to `None`.
    pub fn quali(&self) -> [Option<&str>; 3] {
        [
            pick(&self.quali_p1_driver),
            pick(&self.quali_p2_driver),
            pick(&self.quali_p3_driver),
        ]
    }

    /// Race P1..P3, placeholders normalized to `None`.
    pub fn race(&self) -> [Option<&str>; 3] {
        [
            pick(&self.race_p1_driver),
            pick(&self.race_p2_driver),
            pick(&self.race_p3_driver),
        ]
    }

    pub fn fastest_lap(&self) -> Option<&str> {
        pick(&self.fastest_lap_driver)
    }
}

/// One user's pre-deadline picks for one race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: u64,
    pub user_id: String,
    pub race_id: u32,
    #[serde(flatten)]
    pub picks: Picks,
    #[serde(default)]
    pub wild_prediction: String,
    #[serde(default)]
    pub biggest_flop: String,
    #[serde(default)]
    pub biggest_surprise: String,
    /// Admin-assigned points (0-50), added after the streak multiplier
    #[serde(default)]
    pub manual_score: Option<u32>,
    pub submitted_at: DateTime<Utc>,
    /// Written at settlement
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default)]
    pub points_total: Option<u32>,
}

impl Prediction {
    pub fn is_settled(&self) -> bool {
        self.points_total.is_some()
    }
}

/// Authoritative outcome for one race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResult {
    pub race_id: u32,
    #[serde(flatten)]
    pub picks: Picks,
    pub settled_at: DateTime<Utc>,
}

/// A race weekend on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub id: u32,
    pub name: String,
    /// Predictions close when qualifying starts
    pub quali_time: DateTime<Utc>,
    pub race_time: DateTime<Utc>,
}

impl Race {
    pub fn predictions_open(&self, now: DateTime<Utc>) -> bool {
        now <= self.quali_time
    }
}

/// Submission payload before validation and sanitization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub user_id: String,
    pub race_id: u32,
    #[serde(flatten)]
    pub picks: Picks,
    #[serde(default)]
    pub wild_prediction: String,
    #[serde(default)]
    pub biggest_flop: String,
    #[serde(default)]
    pub biggest_surprise: String,
}
