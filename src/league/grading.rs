use chrono::{DateTime, Utc};
use tracing::info;

use super::types::LeagueGrade;
use crate::error::LeagueError;
use crate::ledger::Ledger;
use crate::prediction::{sanitize_text, validate_grade_points, Prediction};

/// Most predictions returned by one grading queue request.
pub const QUEUE_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradeInput {
    pub wild_points: u32,
    pub flop_points: u32,
    pub surprise_points: u32,
}

#[derive(Debug)]
pub struct GradingQueue<'a> {
    pub ungraded_count: usize,
    pub predictions: Vec<&'a Prediction>,
}

fn ensure_grader(ledger: &Ledger, league_id: u32, user_id: &str) -> Result<(), LeagueError> {
    let league = ledger
        .leagues
        .get(&league_id)
        .ok_or(LeagueError::NotFound(league_id))?;
    if league.role_of(user_id).is_some_and(|r| r.can_grade()) {
        Ok(())
    } else {
        Err(LeagueError::NotGrader(user_id.to_string()))
    }
}

/// Award league points for a member's wild prediction, biggest flop and
/// biggest surprise. One grade per (league, prediction); grading again
/// replaces the earlier grade. Returns the grade total.
pub fn grade_league_prediction(
    ledger: &mut Ledger,
    league_id: u32,
    grader_id: &str,
    prediction_id: u64,
    input: GradeInput,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> Result<u32, LeagueError> {
    ensure_grader(ledger, league_id, grader_id)?;

    let author = ledger
        .predictions
        .get(&prediction_id)
        .map(|p| p.user_id.clone())
        .ok_or(LeagueError::PredictionNotFound(prediction_id))?;
    if !ledger.leagues[&league_id].is_member(&author) {
        return Err(LeagueError::NotMember(author));
    }

    let errors: Vec<String> = [
        ("wild_points", input.wild_points),
        ("flop_points", input.flop_points),
        ("surprise_points", input.surprise_points),
    ]
    .iter()
    .filter_map(|(field, points)| validate_grade_points(field, *points).err())
    .collect();
    if !errors.is_empty() {
        return Err(LeagueError::Invalid(errors));
    }

    let grade = LeagueGrade {
        league_id,
        prediction_id,
        grader_id: grader_id.to_string(),
        wild_points: input.wild_points,
        flop_points: input.flop_points,
        surprise_points: input.surprise_points,
        notes: notes.map(|n| sanitize_text(&n, 500)),
        graded_at: now,
    };
    let total = grade.total();

    match ledger
        .league_grades
        .iter_mut()
        .find(|g| g.league_id == league_id && g.prediction_id == prediction_id)
    {
        Some(existing) => *existing = grade,
        None => ledger.league_grades.push(grade),
    }

    info!(league_id, prediction_id, grader_id, total, "league grade saved");
    Ok(total)
}

/// Member predictions this league has not graded yet, oldest first.
pub fn grading_queue<'a>(
    ledger: &'a Ledger,
    league_id: u32,
    grader_id: &str,
) -> Result<GradingQueue<'a>, LeagueError> {
    ensure_grader(ledger, league_id, grader_id)?;
    let league = &ledger.leagues[&league_id];

    let mut ungraded: Vec<&Prediction> = ledger
        .predictions
        .values()
        .filter(|p| league.is_member(&p.user_id))
        .filter(|p| {
            !ledger
                .league_grades
                .iter()
                .any(|g| g.league_id == league_id && g.prediction_id == p.id)
        })
        .collect();
    ungraded.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));

    let ungraded_count = ungraded.len();
    ungraded.truncate(QUEUE_LIMIT);
    Ok(GradingQueue {
        ungraded_count,
        predictions: ungraded,
    })
}
