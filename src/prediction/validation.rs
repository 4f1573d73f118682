use super::types::{Picks, PredictionInput};
use crate::roster::Roster;

/// Maximum manual (admin) or league grade points per category.
pub const MAX_GRADE_POINTS: u32 = 50;

/// Default cap for the free-text fields.
pub const DEFAULT_TEXT_LIMIT: usize = 500;

/// Strip characters that could open an HTML tag or attribute, then cap the length.
pub fn sanitize_text(text: &str, limit: usize) -> String {
    text.chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\''))
        .take(limit)
        .collect()
}

const SLOTS: [&str; 3] = ["p1", "p2", "p3"];

fn check_podium(
    session: &str,
    raw: [&Option<String>; 3],
    normalized: [Option<&str>; 3],
    roster: &Roster,
    errors: &mut Vec<String>,
) {
    for (slot, (raw, pick)) in raw.iter().zip(normalized.iter()).enumerate() {
        let field = format!("{}_{}_driver", session, SLOTS[slot]);
        match pick {
            None => errors.push(format!(
                "{}: invalid driver selection '{}'",
                field,
                raw.as_deref().unwrap_or("")
            )),
            Some(driver) if !roster.contains(driver) => {
                errors.push(format!("{}: invalid driver selection '{}'", field, driver))
            }
            Some(_) => {}
        }
    }

    let picked: Vec<&str> = normalized.iter().flatten().copied().collect();
    for (i, driver) in picked.iter().enumerate() {
        if picked[..i].contains(driver) {
            errors.push(format!("{}: '{}' picked more than once", session, driver));
        }
    }
}

fn check_picks(picks: &Picks, roster: &Roster, errors: &mut Vec<String>) {
    check_podium(
        "quali",
        [&picks.quali_p1_driver, &picks.quali_p2_driver, &picks.quali_p3_driver],
        picks.quali(),
        roster,
        errors,
    );
    check_podium(
        "race",
        [&picks.race_p1_driver, &picks.race_p2_driver, &picks.race_p3_driver],
        picks.race(),
        roster,
        errors,
    );

    if let Some(driver) = picks.fastest_lap() {
        if !roster.contains(driver) {
            errors.push(format!("fastest_lap_driver: invalid driver '{}'", driver));
        }
    }
}

/// Validate a submission against the roster.
/// Returns all validation errors at once (not just the first).
pub fn validate_prediction(input: &PredictionInput, roster: &Roster) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if input.user_id.trim().is_empty() {
        errors.push("user_id: must not be empty".to_string());
    }
    check_picks(&input.picks, roster, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate an authoritative result. Same driver rules as a prediction.
pub fn validate_result(picks: &Picks, roster: &Roster) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    check_picks(picks, roster, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_grade_points(field: &str, points: u32) -> Result<(), String> {
    if points > MAX_GRADE_POINTS {
        Err(format!(
            "{}: must be between 0 and {} (got {})",
            field, MAX_GRADE_POINTS, points
        ))
    } else {
        Ok(())
    }
}
