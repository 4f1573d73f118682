pub mod storage;
pub mod types;

pub use storage::{load_ledger, save_ledger};
pub use types::{Ledger, Profile, Streak, LEDGER_VERSION};
