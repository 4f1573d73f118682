use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::SeasonError;
use crate::ledger::Ledger;
use crate::prediction::{sanitize_text, validate_prediction, Prediction, PredictionInput};
use crate::roster::Roster;

/// Store a user's picks for a race.
///
/// Predictions close when qualifying starts or once the race is settled,
/// whichever comes first. A resubmission before the deadline replaces the
/// user's earlier picks and keeps the prediction id. Returns the prediction id.
pub fn submit_prediction(
    ledger: &mut Ledger,
    input: PredictionInput,
    roster: &Roster,
    text_limit: usize,
    now: DateTime<Utc>,
) -> Result<u64, SeasonError> {
    let race = ledger
        .races
        .get(&input.race_id)
        .ok_or(SeasonError::RaceNotFound(input.race_id))?;

    if ledger.results.contains_key(&race.id) {
        warn!(race_id = race.id, user_id = %input.user_id, "prediction for settled race rejected");
        return Err(SeasonError::AlreadySettled(race.id));
    }
    if !race.predictions_open(now) {
        warn!(race_id = race.id, user_id = %input.user_id, "late prediction rejected");
        return Err(SeasonError::PredictionsClosed(race.id));
    }

    validate_prediction(&input, roster).map_err(SeasonError::Invalid)?;

    let existing = ledger
        .find_prediction(&input.user_id, input.race_id)
        .map(|p| (p.id, p.manual_score));
    let (id, manual_score) = match existing {
        Some(found) => found,
        None => (ledger.allocate_prediction_id(), None),
    };

    let prediction = Prediction {
        id,
        user_id: input.user_id,
        race_id: input.race_id,
        picks: input.picks,
        wild_prediction: sanitize_text(&input.wild_prediction, text_limit),
        biggest_flop: sanitize_text(&input.biggest_flop, text_limit),
        biggest_surprise: sanitize_text(&input.biggest_surprise, text_limit),
        manual_score,
        submitted_at: now,
        score: None,
        points_total: None,
    };

    debug!(
        prediction_id = id,
        user_id = %prediction.user_id,
        race_id = prediction.race_id,
        replaced = existing.is_some(),
        "prediction stored"
    );
    ledger.predictions.insert(id, prediction);
    Ok(id)
}
