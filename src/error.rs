use thiserror::Error;

/// Rejected season operations (submission, grading, settlement).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeasonError {
    #[error("Race {0} not found")]
    RaceNotFound(u32),

    #[error("Race {0} already exists")]
    RaceExists(u32),

    #[error("Prediction {0} not found")]
    PredictionNotFound(u64),

    #[error("Predictions are closed for race {0} - qualifying has started")]
    PredictionsClosed(u32),

    #[error("Race {0} is already settled")]
    AlreadySettled(u32),

    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("Invalid input: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Rejected league operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeagueError {
    #[error("League {0} not found")]
    NotFound(u32),

    #[error("No league with invite code '{0}'")]
    UnknownInviteCode(String),

    #[error("League is full ({0} members)")]
    Full(u32),

    #[error("User '{0}' is already a member")]
    AlreadyMember(String),

    #[error("User '{0}' is not a member of this league")]
    NotMember(String),

    #[error("The league owner cannot leave the league")]
    OwnerCannotLeave,

    #[error("User '{0}' does not have permission to grade in this league")]
    NotGrader(String),

    #[error("User '{0}' does not have permission to manage this league")]
    NotManager(String),

    #[error("Only the league owner can do this (user '{0}' is not the owner)")]
    NotOwner(String),

    #[error("User '{0}' cannot view this private league")]
    AccessDenied(String),

    #[error("Prediction {0} not found")]
    PredictionNotFound(u64),

    #[error("Invalid input: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
