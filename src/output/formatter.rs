use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::prediction::Prediction;
use crate::scoring::{Category, Score};
use crate::season::SettlementReport;
use crate::standings::Standing;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// "x1", "x1.5", "x2"
pub fn format_multiplier(multiplier: f64) -> String {
    if multiplier.fract() == 0.0 {
        format!("x{:.0}", multiplier)
    } else {
        format!("x{}", multiplier)
    }
}

fn category_name(category: Category) -> &'static str {
    match category {
        Category::Qualifying => "qualifying",
        Category::Race => "race",
        Category::Bonus => "bonus",
    }
}

/// Multi-line breakdown of how a total was reached
pub fn format_score_card(title: &str, score: &Score, use_colors: bool) -> String {
    let mut lines = Vec::new();
    if use_colors {
        lines.push(title.bold().to_string());
    } else {
        lines.push(title.to_string());
    }

    for award in &score.awards {
        let line = format!(
            "  {:<28} {:>3}  ({})",
            award.label,
            format!("+{}", award.points),
            category_name(award.category)
        );
        if use_colors {
            lines.push(line.green().to_string());
        } else {
            lines.push(line);
        }
    }
    if score.awards.is_empty() {
        lines.push("  No scoring picks".to_string());
    }

    lines.push(format!(
        "  Qualifying {} | Race {} | Bonuses {}",
        score.breakdown.qualifying, score.breakdown.race, score.breakdown.bonuses
    ));
    lines.push(format!(
        "  Base {} {} = {}",
        score.base_points,
        format_multiplier(score.multiplier),
        score.multiplied_points()
    ));
    if score.manual_points > 0 {
        lines.push(format!("  Manual +{}", score.manual_points));
    }

    let total = format!("  Total: {}", score.total_points);
    if use_colors {
        lines.push(total.bold().to_string());
    } else {
        lines.push(total);
    }

    let streak = if score.streak_continues {
        "  Winner called: streak continues"
    } else {
        "  Winner missed: streak resets"
    };
    if use_colors {
        lines.push(streak.dimmed().to_string());
    } else {
        lines.push(streak.to_string());
    }

    lines.join("\n")
}

/// One prediction's picks, for `show`
pub fn format_prediction(prediction: &Prediction, use_colors: bool) -> String {
    let slot = |pick: Option<&str>| pick.unwrap_or("-").to_string();
    let quali = prediction.picks.quali();
    let race = prediction.picks.race();
    let header = format!(
        "Prediction #{} by {} for race {}",
        prediction.id, prediction.user_id, prediction.race_id
    );

    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];
    lines.push(format!(
        "  Qualifying: {} / {} / {}",
        slot(quali[0]),
        slot(quali[1]),
        slot(quali[2])
    ));
    lines.push(format!(
        "  Race:       {} / {} / {}",
        slot(race[0]),
        slot(race[1]),
        slot(race[2])
    ));
    lines.push(format!("  Fastest lap: {}", slot(prediction.picks.fastest_lap())));
    for (label, text) in [
        ("Wild", &prediction.wild_prediction),
        ("Flop", &prediction.biggest_flop),
        ("Surprise", &prediction.biggest_surprise),
    ] {
        if !text.is_empty() {
            lines.push(format!("  {}: {}", label, text));
        }
    }
    if let Some(manual) = prediction.manual_score {
        lines.push(format!("  Manual score: {}", manual));
    }
    lines.join("\n")
}

fn format_form(standing: &Standing) -> String {
    standing
        .last_races
        .iter()
        .map(|r| format!("{} {}", r.code, r.points))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Leaderboard table: Position, Points, Player, Recent form
/// Position column: 3 chars right-aligned ("99."), points 5 chars right-aligned
pub fn format_standings_table(rows: &[Standing], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No players yet.".to_string();
    }

    let term_width = get_terminal_width();
    let points_width = 5;
    let separator = "  ";

    rows.iter()
        .map(|row| {
            let position = format!("{:>2}.", row.position);
            let points = format!("{:>width$}", row.total_points, width = points_width);
            let form = format_form(row);

            let fixed_width = 3 + 1 + points_width + separator.len() * 2 + form.chars().count();
            let name = match term_width {
                Some(width) if width > fixed_width + 10 => truncate(&row.username, width - fixed_width),
                Some(_) => truncate(&row.username, 20),
                None => row.username.clone(),
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    position.dimmed(),
                    points.bold(),
                    separator,
                    name,
                    separator,
                    form.dimmed()
                )
            } else {
                format!("{} {}{}{}{}{}", position, points, separator, name, separator, form)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Leaderboard as tab-separated values for scripting
/// Columns: position, points, user_id, username, recent form (no headers, no colors)
pub fn format_standings_tsv(rows: &[Standing]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                row.position,
                row.total_points,
                row.user_id,
                row.username.replace('\t', " "),
                format_form(row)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Settlement summary, one line per scored prediction
pub fn format_settlement(report: &SettlementReport, use_colors: bool) -> String {
    let header = format!(
        "Race {} settled: {} predictions scored",
        report.race_id,
        report.entries.len()
    );
    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];
    for entry in &report.entries {
        lines.push(format!(
            "  #{:<5} {:<20} {:>4} pts  streak {} -> {}",
            entry.prediction_id,
            truncate(&entry.user_id, 20),
            entry.total_points,
            entry.streak_before,
            entry.streak_after
        ));
    }
    lines.join("\n")
}
