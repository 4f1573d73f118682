pub mod formatter;

pub use formatter::{
    format_multiplier, format_prediction, format_score_card, format_settlement,
    format_standings_table, format_standings_tsv, should_use_colors,
};
