pub mod engine;
pub mod points;

pub use engine::{calculate_score, Award, Category, Score, ScoreBreakdown};
pub use points::{PodiumTier, StreakTier};
