use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use apex_predict::error::{LeagueError, SeasonError};
use apex_predict::league::{self, GradeInput, LeagueInput, LeagueUpdate, Role};
use apex_predict::ledger::{self, Ledger};
use apex_predict::output;
use apex_predict::prediction::{
    validate_grade_points, Picks, Prediction, PredictionInput, Race, RaceResult,
};
use apex_predict::roster::Roster;
use apex_predict::scoring::calculate_score;
use apex_predict::{config, season, standings};

const EXIT_SUCCESS: i32 = 0;
const EXIT_REJECTED: i32 = 1;
const EXIT_STORAGE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the drivers predictions may name
    Roster,
    /// Manage the race calendar
    Race {
        #[command(subcommand)]
        action: RaceCommand,
    },
    /// Register a player
    Register { user_id: String, username: String },
    /// Submit or replace a prediction before qualifying starts
    Predict {
        user_id: String,
        race_id: u32,
        /// Qualifying P1,P2,P3
        #[arg(long, value_delimiter = ',')]
        quali: Vec<String>,
        /// Race P1,P2,P3
        #[arg(long, value_delimiter = ',')]
        podium: Vec<String>,
        #[arg(long)]
        fastest_lap: Option<String>,
        #[arg(long, default_value = "")]
        wild: String,
        #[arg(long, default_value = "")]
        flop: String,
        #[arg(long, default_value = "")]
        surprise: String,
    },
    /// Set a prediction's manual score (0-50)
    Grade { prediction_id: u64, points: u32 },
    /// Record the official result and score every prediction for the race
    Settle {
        race_id: u32,
        #[arg(long, value_delimiter = ',')]
        quali: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        podium: Vec<String>,
        #[arg(long)]
        fastest_lap: Option<String>,
    },
    /// Score a JSON prediction against a JSON result without saving anything
    Score {
        prediction: PathBuf,
        result: PathBuf,
        /// Consecutive correct race winners before this race
        #[arg(long, default_value_t = 0)]
        streak: u32,
        #[arg(long, default_value_t = 0)]
        manual: u32,
    },
    /// Season leaderboard
    Standings {
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Show a prediction and its score card
    Show { prediction_id: u64 },
    /// Private leagues
    League {
        #[command(subcommand)]
        action: LeagueCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RaceCommand {
    /// Add a race (times in RFC 3339, e.g. 2026-03-07T05:00:00Z)
    Add {
        id: u32,
        name: String,
        #[arg(long)]
        quali: DateTime<Utc>,
        #[arg(long)]
        race: DateTime<Utc>,
    },
    /// List the calendar
    List,
}

#[derive(Subcommand, Debug)]
enum LeagueCommand {
    /// Create a league owned by USER_ID
    Create {
        owner_id: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        public: bool,
        #[arg(long)]
        max_members: Option<u32>,
    },
    /// Change league settings (owner only)
    Update {
        league_id: u32,
        actor_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        public: Option<bool>,
        #[arg(long)]
        max_members: Option<u32>,
    },
    /// Delete a league and its grades (owner only)
    Delete { league_id: u32, actor_id: String },
    /// List members with their season points
    Members { league_id: u32, viewer_id: String },
    /// Members' predictions for a race, with league grades
    Predictions {
        league_id: u32,
        viewer_id: String,
        race_id: u32,
    },
    /// Join a league by invite code
    Join { user_id: String, invite_code: String },
    /// Leave a league
    Leave { league_id: u32, user_id: String },
    /// Change a member's role
    Role {
        league_id: u32,
        actor_id: String,
        target_id: String,
        role: RoleArg,
    },
    /// Grade a member's wild prediction, biggest flop and biggest surprise
    Grade {
        league_id: u32,
        grader_id: String,
        prediction_id: u64,
        #[arg(long, default_value_t = 0)]
        wild: u32,
        #[arg(long, default_value_t = 0)]
        flop: u32,
        #[arg(long, default_value_t = 0)]
        surprise: u32,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Predictions waiting for a grade
    Queue { league_id: u32, grader_id: String },
    /// League leaderboard
    Standings {
        league_id: u32,
        #[arg(long)]
        tsv: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RoleArg {
    Admin,
    Grader,
    Member,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::Grader => Role::Grader,
            RoleArg::Member => Role::Member,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "apex")]
#[command(about = "F1 prediction game scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/apex-predict/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Everything a command needs besides the ledger itself.
struct AppContext {
    roster: Roster,
    text_limit: usize,
    ledger_path: PathBuf,
    use_colors: bool,
}

fn init_tracing(verbose: bool, config_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { config_level }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Build picks from comma-separated podium arguments. Missing slots stay
/// empty so validation reports them; extra slots are rejected here.
fn picks_from_args(
    quali: &[String],
    podium: &[String],
    fastest_lap: Option<String>,
) -> Result<Picks, SeasonError> {
    let errors: Vec<String> = [("quali", quali), ("podium", podium)]
        .iter()
        .filter(|(_, picks)| picks.len() > 3)
        .map(|(name, picks)| format!("--{} takes 3 drivers, got {}", name, picks.len()))
        .collect();
    if !errors.is_empty() {
        return Err(SeasonError::Invalid(errors));
    }

    let slot = |picks: &[String], i: usize| picks.get(i).map(|d| d.trim().to_string());
    Ok(Picks {
        quali_p1_driver: slot(quali, 0),
        quali_p2_driver: slot(quali, 1),
        quali_p3_driver: slot(quali, 2),
        race_p1_driver: slot(podium, 0),
        race_p2_driver: slot(podium, 1),
        race_p3_driver: slot(podium, 2),
        fastest_lap_driver: fastest_lap.map(|d| d.trim().to_string()),
    })
}

/// Manual points for an ad-hoc score, held to the same bounds as `grade`.
fn manual_points_arg(manual: u32) -> Result<u32, SeasonError> {
    validate_grade_points("manual", manual).map_err(|e| SeasonError::Invalid(vec![e]))?;
    Ok(manual)
}

fn read_picks(path: &Path) -> Result<Picks> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse picks in {}", path.display()))
}

fn persist(ctx: &AppContext, ledger: &Ledger) -> Result<()> {
    ledger::save_ledger(&ctx.ledger_path, ledger)?;
    debug!(path = %ctx.ledger_path.display(), "ledger saved");
    Ok(())
}

fn print_standings(rows: &[standings::Standing], tsv: bool, use_colors: bool) {
    if tsv {
        let out = output::format_standings_tsv(rows);
        if !out.is_empty() {
            println!("{}", out);
        }
    } else {
        println!("{}", output::format_standings_table(rows, use_colors));
    }
}

fn run_race(action: RaceCommand, ledger: &mut Ledger, ctx: &AppContext) -> Result<()> {
    match action {
        RaceCommand::Add { id, name, quali, race } => {
            season::add_race(
                ledger,
                Race {
                    id,
                    name,
                    quali_time: quali,
                    race_time: race,
                },
            )?;
            persist(ctx, ledger)?;
            println!("Added race {}", id);
        }
        RaceCommand::List => {
            if ledger.races.is_empty() {
                println!("No races scheduled.");
            }
            for race in ledger.races.values() {
                let state = if ledger.results.contains_key(&race.id) {
                    "settled"
                } else if race.predictions_open(Utc::now()) {
                    "open"
                } else {
                    "closed"
                };
                println!(
                    "{:>3}  {:<3}  {:<32}  quali {}  race {}  {}",
                    race.id,
                    standings::race_code(&race.name),
                    race.name,
                    race.quali_time.format("%Y-%m-%d %H:%M"),
                    race.race_time.format("%Y-%m-%d %H:%M"),
                    state
                );
            }
        }
    }
    Ok(())
}

fn run_league(action: LeagueCommand, ledger: &mut Ledger, ctx: &AppContext) -> Result<()> {
    let now = Utc::now();
    match action {
        LeagueCommand::Create {
            owner_id,
            name,
            description,
            public,
            max_members,
        } => {
            let input = LeagueInput {
                name,
                description,
                is_public: public,
                max_members,
            };
            let id = league::create_league(ledger, &owner_id, input, now)?;
            persist(ctx, ledger)?;
            let code = ledger
                .leagues
                .get(&id)
                .map(|l| l.invite_code.as_str())
                .unwrap_or_default();
            println!("Created league {} (invite code {})", id, code);
        }
        LeagueCommand::Update {
            league_id,
            actor_id,
            name,
            description,
            public,
            max_members,
        } => {
            let update = LeagueUpdate {
                name,
                description,
                is_public: public,
                max_members,
            };
            league::update_league(ledger, league_id, &actor_id, update)?;
            persist(ctx, ledger)?;
            println!("Updated league {}", league_id);
        }
        LeagueCommand::Delete { league_id, actor_id } => {
            league::delete_league(ledger, league_id, &actor_id)?;
            persist(ctx, ledger)?;
            println!("Deleted league {}", league_id);
        }
        LeagueCommand::Members { league_id, viewer_id } => {
            for member in league::league_members(ledger, league_id, &viewer_id)? {
                println!(
                    "{:>5}  {:<20}  {:<6}  joined {}",
                    member.season_points,
                    member.username,
                    member.role.as_str(),
                    member.joined_at.format("%Y-%m-%d")
                );
            }
        }
        LeagueCommand::Predictions {
            league_id,
            viewer_id,
            race_id,
        } => {
            let view = league::league_race_predictions(ledger, league_id, &viewer_id, race_id)?;
            if view.is_empty() {
                println!("No predictions for race {} yet.", race_id);
            }
            for entry in &view {
                println!("{}", output::format_prediction(entry.prediction, ctx.use_colors));
                match entry.grade {
                    Some(grade) => println!(
                        "  League grade: {} (wild {}, flop {}, surprise {})",
                        grade.total(),
                        grade.wild_points,
                        grade.flop_points,
                        grade.surprise_points
                    ),
                    None => println!("  League grade: pending"),
                }
            }
        }
        LeagueCommand::Join { user_id, invite_code } => {
            let id = league::join_league(ledger, &user_id, &invite_code, now)?;
            persist(ctx, ledger)?;
            println!("{} joined league {}", ledger.username(&user_id), id);
        }
        LeagueCommand::Leave { league_id, user_id } => {
            league::leave_league(ledger, league_id, &user_id)?;
            persist(ctx, ledger)?;
            println!("{} left league {}", ledger.username(&user_id), league_id);
        }
        LeagueCommand::Role {
            league_id,
            actor_id,
            target_id,
            role,
        } => {
            let role = Role::from(role);
            league::set_role(ledger, league_id, &actor_id, &target_id, role)?;
            persist(ctx, ledger)?;
            println!("{} is now {}", ledger.username(&target_id), role.as_str());
        }
        LeagueCommand::Grade {
            league_id,
            grader_id,
            prediction_id,
            wild,
            flop,
            surprise,
            notes,
        } => {
            let input = GradeInput {
                wild_points: wild,
                flop_points: flop,
                surprise_points: surprise,
            };
            let total = league::grade_league_prediction(
                ledger,
                league_id,
                &grader_id,
                prediction_id,
                input,
                notes,
                now,
            )?;
            persist(ctx, ledger)?;
            println!("Graded prediction #{}: {} league points", prediction_id, total);
        }
        LeagueCommand::Queue { league_id, grader_id } => {
            let queue = league::grading_queue(ledger, league_id, &grader_id)?;
            println!("{} predictions waiting for a grade", queue.ungraded_count);
            for p in &queue.predictions {
                println!(
                    "  #{:<5} {:<20} race {:>2}  wild: {} | flop: {} | surprise: {}",
                    p.id,
                    ledger.username(&p.user_id),
                    p.race_id,
                    p.wild_prediction,
                    p.biggest_flop,
                    p.biggest_surprise
                );
            }
        }
        LeagueCommand::Standings { league_id, tsv } => {
            let rows = standings::league_standings(ledger, league_id)?;
            print_standings(&rows, tsv, ctx.use_colors);
        }
    }
    Ok(())
}

fn run(command: Commands, ledger: &mut Ledger, ctx: &AppContext) -> Result<()> {
    let now = Utc::now();
    match command {
        Commands::Roster => {
            for driver in ctx.roster.drivers() {
                println!("{}", driver);
            }
        }
        Commands::Race { action } => run_race(action, ledger, ctx)?,
        Commands::Register { user_id, username } => {
            season::register_user(ledger, &user_id, &username)?;
            persist(ctx, ledger)?;
            println!("Registered {}", ledger.username(&user_id));
        }
        Commands::Predict {
            user_id,
            race_id,
            quali,
            podium,
            fastest_lap,
            wild,
            flop,
            surprise,
        } => {
            let input = PredictionInput {
                user_id,
                race_id,
                picks: picks_from_args(&quali, &podium, fastest_lap)?,
                wild_prediction: wild,
                biggest_flop: flop,
                biggest_surprise: surprise,
            };
            let id = season::submit_prediction(ledger, input, &ctx.roster, ctx.text_limit, now)?;
            persist(ctx, ledger)?;
            println!("Saved prediction #{}", id);
        }
        Commands::Grade {
            prediction_id,
            points,
        } => {
            let total = season::grade_prediction(ledger, prediction_id, points)?;
            persist(ctx, ledger)?;
            match total {
                Some(total) => println!("Prediction #{} now totals {} points", prediction_id, total),
                None => println!(
                    "Manual score saved for #{}; it counts when the race settles",
                    prediction_id
                ),
            }
        }
        Commands::Settle {
            race_id,
            quali,
            podium,
            fastest_lap,
        } => {
            let picks = picks_from_args(&quali, &podium, fastest_lap)?;
            let report = season::settle_race(ledger, race_id, picks, &ctx.roster, now)?;
            persist(ctx, ledger)?;
            println!("{}", output::format_settlement(&report, ctx.use_colors));
        }
        Commands::Score {
            prediction,
            result,
            streak,
            manual,
        } => {
            let manual = manual_points_arg(manual)?;
            let picks = read_picks(&prediction)?;
            let result_picks = read_picks(&result)?;
            let prediction = Prediction {
                id: 0,
                user_id: String::new(),
                race_id: 0,
                picks,
                wild_prediction: String::new(),
                biggest_flop: String::new(),
                biggest_surprise: String::new(),
                manual_score: Some(manual),
                submitted_at: now,
                score: None,
                points_total: None,
            };
            let result = RaceResult {
                race_id: 0,
                picks: result_picks,
                settled_at: now,
            };
            let score = calculate_score(&prediction, &result, streak);
            println!(
                "{}",
                output::format_score_card(&format!("Streak {}", streak), &score, ctx.use_colors)
            );
        }
        Commands::Standings { tsv } => {
            let rows = standings::global_standings(ledger);
            print_standings(&rows, tsv, ctx.use_colors);
        }
        Commands::Show { prediction_id } => {
            let prediction = ledger
                .predictions
                .get(&prediction_id)
                .ok_or(SeasonError::PredictionNotFound(prediction_id))?;
            println!("{}", output::format_prediction(prediction, ctx.use_colors));
            if let Some(score) = &prediction.score {
                let title = ledger
                    .races
                    .get(&prediction.race_id)
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| format!("Race {}", prediction.race_id));
                println!();
                println!("{}", output::format_score_card(&title, score, ctx.use_colors));
            }
        }
        Commands::League { action } => run_league(action, ledger, ctx)?,
    }
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if err.is::<SeasonError>() || err.is::<LeagueError>() {
        EXIT_REJECTED
    } else {
        EXIT_STORAGE
    }
}

fn main() {
    let cli = Cli::parse();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    init_tracing(cli.verbose, config.log_level());

    let ledger_path = match config::ledger_path(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let mut ledger = match ledger::load_ledger(&ledger_path) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Ledger error: {:#}", e);
            std::process::exit(EXIT_STORAGE);
        }
    };
    debug!(
        path = %ledger_path.display(),
        races = ledger.races.len(),
        predictions = ledger.predictions.len(),
        "ledger loaded"
    );

    let ctx = AppContext {
        roster: Roster::from_config(config.roster.as_deref()),
        text_limit: config.text_limit(),
        ledger_path,
        use_colors: output::should_use_colors(),
    };

    if let Err(e) = run(cli.command, &mut ledger, &ctx) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }

    std::process::exit(EXIT_SUCCESS);
}
