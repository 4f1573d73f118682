pub mod grade;
pub mod registry;
pub mod settle;
pub mod submit;

pub use grade::grade_prediction;
pub use registry::{add_race, register_user};
pub use settle::{settle_race, SettlementEntry, SettlementReport};
pub use submit::submit_prediction;
