use tracing::info;

use crate::error::SeasonError;
use crate::ledger::Ledger;
use crate::prediction::validate_grade_points;

/// Set the admin-assigned manual score for a prediction.
///
/// A settled prediction has its total recomputed from the stored score, so
/// manual points stay outside the streak multiplier and are counted once.
/// Returns the new total for settled predictions.
pub fn grade_prediction(
    ledger: &mut Ledger,
    prediction_id: u64,
    manual_score: u32,
) -> Result<Option<u32>, SeasonError> {
    validate_grade_points("manual_score", manual_score)
        .map_err(|e| SeasonError::Invalid(vec![e]))?;

    let prediction = ledger
        .predictions
        .get_mut(&prediction_id)
        .ok_or(SeasonError::PredictionNotFound(prediction_id))?;

    prediction.manual_score = Some(manual_score);
    if let Some(ref score) = prediction.score {
        let regraded = score.with_manual_points(manual_score);
        prediction.points_total = Some(regraded.total_points);
        prediction.score = Some(regraded);
    }

    info!(prediction_id, manual_score, "prediction graded");
    Ok(prediction.points_total)
}
