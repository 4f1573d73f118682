pub mod grading;
pub mod membership;
pub mod types;
pub mod views;

pub use grading::{grade_league_prediction, grading_queue, GradeInput, GradingQueue, QUEUE_LIMIT};
pub use membership::{
    create_league, delete_league, generate_invite_code, join_league, leave_league, set_role,
    update_league, LeagueInput, LeagueUpdate,
};
pub use types::{League, LeagueGrade, Member, Role};
pub use views::{league_members, league_race_predictions, GradedPrediction, MemberEntry};
