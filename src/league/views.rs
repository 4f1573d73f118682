use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::types::{League, LeagueGrade, Role};
use crate::error::LeagueError;
use crate::ledger::Ledger;
use crate::prediction::Prediction;
use crate::standings::league_standings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEntry {
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
    /// Automatic points plus this league's grades
    pub season_points: u32,
}

/// A member's prediction with this league's grade, if any.
#[derive(Debug)]
pub struct GradedPrediction<'a> {
    pub prediction: &'a Prediction,
    pub grade: Option<&'a LeagueGrade>,
}

fn find_league(ledger: &Ledger, league_id: u32) -> Result<&League, LeagueError> {
    ledger
        .leagues
        .get(&league_id)
        .ok_or(LeagueError::NotFound(league_id))
}

/// Members by season points, then join date. Public leagues are visible to
/// anyone, private ones only to their members.
pub fn league_members(
    ledger: &Ledger,
    league_id: u32,
    viewer_id: &str,
) -> Result<Vec<MemberEntry>, LeagueError> {
    let league = find_league(ledger, league_id)?;
    if !league.is_public && !league.is_member(viewer_id) {
        return Err(LeagueError::AccessDenied(viewer_id.to_string()));
    }

    let points: HashMap<String, u32> = league_standings(ledger, league_id)?
        .into_iter()
        .map(|s| (s.user_id, s.total_points))
        .collect();

    let mut members: Vec<MemberEntry> = league
        .members
        .iter()
        .map(|m| MemberEntry {
            user_id: m.user_id.clone(),
            username: ledger.username(&m.user_id).to_string(),
            role: m.role,
            joined_at: m.joined_at,
            season_points: points.get(&m.user_id).copied().unwrap_or(0),
        })
        .collect();
    members.sort_by(|a, b| {
        b.season_points
            .cmp(&a.season_points)
            .then(a.joined_at.cmp(&b.joined_at))
    });
    Ok(members)
}

/// Every member's prediction for one race, in submission order, with the
/// league grade attached. Members only.
pub fn league_race_predictions<'a>(
    ledger: &'a Ledger,
    league_id: u32,
    viewer_id: &str,
    race_id: u32,
) -> Result<Vec<GradedPrediction<'a>>, LeagueError> {
    let league = find_league(ledger, league_id)?;
    if !league.is_member(viewer_id) {
        return Err(LeagueError::NotMember(viewer_id.to_string()));
    }

    Ok(ledger
        .predictions_for_race(race_id)
        .into_iter()
        .filter(|p| league.is_member(&p.user_id))
        .map(|prediction| GradedPrediction {
            prediction,
            grade: ledger
                .league_grades
                .iter()
                .find(|g| g.league_id == league_id && g.prediction_id == prediction.id),
        })
        .collect())
}
