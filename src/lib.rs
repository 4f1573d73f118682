pub mod config;
pub mod error;
pub mod league;
pub mod ledger;
pub mod output;
pub mod prediction;
pub mod roster;
pub mod scoring;
pub mod season;
pub mod standings;
