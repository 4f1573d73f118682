mod race_code;

pub use race_code::race_code;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::LeagueError;
use crate::ledger::Ledger;
use crate::league::Role;

/// Races shown in a player's recent form.
pub const RECENT_FORM_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentRace {
    pub code: &'static str,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub position: usize,
    pub user_id: String,
    pub username: String,
    pub total_points: u32,
    /// League grade share of `total_points` (0 on the global board)
    pub grade_points: u32,
    pub last_races: Vec<RecentRace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Sum of settled totals for a user. Manual points are already inside each total.
fn automatic_points(ledger: &Ledger, user_id: &str) -> u32 {
    ledger
        .predictions
        .values()
        .filter(|p| p.user_id == user_id)
        .filter_map(|p| p.points_total)
        .sum()
}

/// Latest settled races first, by race time.
fn recent_form(ledger: &Ledger, user_id: &str) -> Vec<RecentRace> {
    let mut settled: Vec<_> = ledger
        .predictions
        .values()
        .filter(|p| p.user_id == user_id)
        .filter_map(|p| {
            let points = p.points_total?;
            let race = ledger.races.get(&p.race_id)?;
            Some((race, points))
        })
        .collect();
    settled.sort_by(|a, b| b.0.race_time.cmp(&a.0.race_time).then(b.0.id.cmp(&a.0.id)));

    settled
        .into_iter()
        .take(RECENT_FORM_LEN)
        .map(|(race, points)| RecentRace {
            code: race_code(&race.name),
            points,
        })
        .collect()
}

/// Total descending, then username, then id. Assigns 1-based positions.
fn rank(mut rows: Vec<Standing>) -> Vec<Standing> {
    rows.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.username.to_lowercase().cmp(&b.username.to_lowercase()))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = i + 1;
    }
    rows
}

/// Season leaderboard over every registered user and every user with a prediction.
pub fn global_standings(ledger: &Ledger) -> Vec<Standing> {
    let users: BTreeSet<&str> = ledger
        .users
        .keys()
        .map(String::as_str)
        .chain(ledger.predictions.values().map(|p| p.user_id.as_str()))
        .collect();

    let rows = users
        .into_iter()
        .map(|user_id| {
            let total = automatic_points(ledger, user_id);
            Standing {
                position: 0,
                user_id: user_id.to_string(),
                username: ledger.username(user_id).to_string(),
                total_points: total,
                grade_points: 0,
                last_races: recent_form(ledger, user_id),
                role: None,
            }
        })
        .collect();
    rank(rows)
}

/// League leaderboard: automatic points plus this league's grades.
pub fn league_standings(ledger: &Ledger, league_id: u32) -> Result<Vec<Standing>, LeagueError> {
    let league = ledger
        .leagues
        .get(&league_id)
        .ok_or(LeagueError::NotFound(league_id))?;

    let mut grades: BTreeMap<&str, u32> = BTreeMap::new();
    for grade in ledger.league_grades.iter().filter(|g| g.league_id == league_id) {
        if let Some(prediction) = ledger.predictions.get(&grade.prediction_id) {
            *grades.entry(prediction.user_id.as_str()).or_default() += grade.total();
        }
    }

    let rows = league
        .members
        .iter()
        .map(|member| {
            let user_id = member.user_id.as_str();
            let grade_points = grades.get(user_id).copied().unwrap_or(0);
            Standing {
                position: 0,
                user_id: user_id.to_string(),
                username: ledger.username(user_id).to_string(),
                total_points: automatic_points(ledger, user_id) + grade_points,
                grade_points,
                last_races: recent_form(ledger, user_id),
                role: Some(member.role),
            }
        })
        .collect();
    Ok(rank(rows))
}
