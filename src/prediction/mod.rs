pub mod types;
pub mod validation;

pub use types::{Picks, Prediction, PredictionInput, Race, RaceResult, PLACEHOLDER_DRIVER};
pub use validation::{
    sanitize_text, validate_grade_points, validate_prediction, validate_result,
    DEFAULT_TEXT_LIMIT, MAX_GRADE_POINTS,
};
