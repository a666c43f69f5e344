use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use bunkwise::config::{Config, LeaderboardConfig};
use bunkwise::engine::{aggregate, analyze_subject};
use bunkwise::fetch::fetch_rows;
use bunkwise::leaderboard::{cache, AuthError, LeaderboardRow, LeaderboardStore, SheetStore};
use bunkwise::nickname::{self, NicknameRng};
use bunkwise::report::ReportFormat;
use bunkwise::snapshot::{get_snapshot_path, load_snapshot, save_snapshot, Snapshot};

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive attendance form (default if no subcommand)
    Form,
    /// Print the analysis for the saved counts
    Analyze {
        /// Per-subject detail blocks instead of the table
        #[arg(long)]
        detail: bool,
        /// Recovery projection: attend everything for N more weeks
        #[arg(long)]
        weeks_left: Option<u32>,
    },
    /// Record counts for one subject
    #[command(group(
        ArgGroup::new("value")
            .args(["present", "percent"])
            .required(true)
            .multiple(false)
    ))]
    Set {
        /// Subject to update: 1-based catalog index or exact "Name (TH)" key
        subject: String,
        /// Sessions attended
        #[arg(long)]
        present: Option<u32>,
        /// Current percentage; the present count is derived from it
        #[arg(long)]
        percent: Option<f64>,
        /// Sessions held so far
        #[arg(long)]
        total: u32,
    },
    /// Submit your overall result to the class leaderboard
    Submit {
        /// Your real name, shown in your own history
        #[arg(long)]
        name: String,
        /// Section/division; defaults to leaderboard.section from config
        #[arg(long)]
        section: Option<String>,
    },
    /// Show the class leaderboard
    Leaderboard {
        /// Only rows from this section
        #[arg(long)]
        section: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Bypass the read cache
        #[arg(long)]
        refresh: bool,
        /// Open the shared sheet in the browser instead
        #[arg(long)]
        open: bool,
    },
    /// Show your own submission history
    History {
        /// The name you submitted under
        name: String,
    },
    /// Export the class report (admin)
    Report {
        #[arg(long, default_value = "class_report.md")]
        out: PathBuf,
        /// markdown or csv
        #[arg(long, default_value = "markdown")]
        format: String,
        #[arg(long)]
        refresh: bool,
    },
    /// Reset the leaderboard for the week (admin)
    Clear,
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "bunkwise")]
#[command(about = "Attendance tracking and safe-bunk budgeting CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/bunkwise/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Form);
    let config_path = cli.config.map(PathBuf::from);

    // Init runs before any config is required
    if let Commands::Init = command {
        if let Err(e) = bunkwise::config::run_init_wizard(config_path) {
            eprintln!("Init failed: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match bunkwise::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = bunkwise::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if cli.verbose {
        eprintln!(
            "Loaded {} subjects, minimum {}%",
            config.subjects.len(),
            config.min_percent
        );
    }

    // Load local snapshot (missing or corrupted files degrade to empty)
    let snapshot_path = get_snapshot_path();
    let snapshot = match load_snapshot(&snapshot_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Snapshot error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    match command {
        Commands::Init => unreachable!("handled above"),

        Commands::Form => {
            let app = bunkwise::tui::App::new(config, snapshot, snapshot_path, cli.verbose);
            if let Err(e) = bunkwise::tui::run_tui(app).await {
                eprintln!("TUI error: {}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }

        Commands::Analyze { detail, weeks_left } => {
            let records = snapshot.records(&config.subjects);
            let sim = &config.simulation;
            let analyses: Vec<_> = records
                .iter()
                .map(|r| analyze_subject(r, config.min_percent, sim.bunk_weeks, sim.attend_weeks))
                .collect();
            let summary = aggregate(&records, config.min_percent);

            let use_colors = bunkwise::output::should_use_colors();
            if detail {
                for analysis in &analyses {
                    println!("{}", bunkwise::output::format_subject_detail(analysis, use_colors));
                    println!();
                }
                println!(
                    "Overall: {}  |  Total safe bunks: {}",
                    bunkwise::output::format_pct(summary.overall_pct),
                    summary.total_safe_bunks
                );
            } else {
                println!(
                    "{}",
                    bunkwise::output::format_analysis_table(
                        &analyses,
                        &summary,
                        sim.bunk_weeks,
                        sim.attend_weeks,
                        use_colors
                    )
                );
            }

            if let Some(weeks) = weeks_left {
                println!();
                println!("Attending everything for the next {} weeks:", weeks);
                for record in &records {
                    let projected = bunkwise::engine::end_of_term_projection(
                        record.present,
                        record.total,
                        record.per_week,
                        weeks,
                    );
                    println!(
                        "  {:<48}  {} -> {}",
                        record.key(),
                        bunkwise::output::format_pct(record.current_pct()),
                        bunkwise::output::format_pct(projected)
                    );
                }
            }
        }

        Commands::Set {
            subject,
            present,
            percent,
            total,
        } => {
            let mut snapshot = snapshot;
            run_set(&config, &mut snapshot, &snapshot_path, &subject, present, percent, total);
        }

        Commands::Submit { name, section } => {
            let student_name = name.trim().to_string();
            if student_name.is_empty() {
                eprintln!("Please enter your name before submitting.");
                std::process::exit(EXIT_CONFIG);
            }

            let lb = require_leaderboard(&config);
            let mut snapshot = snapshot;

            // Keep the same alias across submissions
            if snapshot.nickname.is_none() {
                let mut rng = NicknameRng::from_entropy();
                snapshot.nickname = Some(nickname::generate(&mut rng));
                if let Err(e) = save_snapshot(&snapshot_path, &snapshot) {
                    eprintln!("Warning: could not persist nickname: {}", e);
                }
            }
            let nick = snapshot.nickname.clone().unwrap_or_default();

            let records = snapshot.records(&config.subjects);
            let summary = aggregate(&records, config.min_percent);
            if cli.verbose {
                eprintln!(
                    "Submitting overall {:.2}% with {} safe bunks",
                    summary.overall_pct, summary.total_safe_bunks
                );
            }

            let section = section
                .or_else(|| lb.section.clone())
                .unwrap_or_else(|| "Other".to_string());
            let row = LeaderboardRow::from_summary(&nick, &student_name, &section, &summary);

            let store = make_store(lb, optional_token().await);
            match store.append(row).await {
                Ok(()) => println!("Submitted for {} as {}!", student_name, nick),
                Err(e) => {
                    eprintln!("Could not submit to leaderboard: {}", e);
                    std::process::exit(exit_code_for(&e));
                }
            }
        }

        Commands::Leaderboard {
            section,
            limit,
            refresh,
            open,
        } => {
            let lb = require_leaderboard(&config);

            if open {
                let url = lb.browse_url.as_deref().unwrap_or(&lb.url);
                if let Err(e) = bunkwise::browser::open_url(url) {
                    eprintln!("Failed to open browser: {}", e);
                    std::process::exit(EXIT_NETWORK);
                }
                println!("Opening leaderboard: {}", url);
                std::process::exit(EXIT_SUCCESS);
            }

            let store = make_store(lb, optional_token().await);
            let rows = fetch_or_exit(&store, lb, refresh, cli.verbose).await;

            let mut rows = bunkwise::leaderboard::filter_section(&rows, section.as_deref());
            bunkwise::leaderboard::sort_ranked(&mut rows);
            rows.truncate(limit);

            let use_colors = bunkwise::output::should_use_colors();
            println!("{}", bunkwise::output::format_leaderboard_table(&rows, use_colors));
        }

        Commands::History { name } => {
            let lb = require_leaderboard(&config);
            let store = make_store(lb, optional_token().await);
            let rows = fetch_or_exit(&store, lb, false, cli.verbose).await;

            let history = bunkwise::leaderboard::history_for(&rows, &name);
            println!("{}", bunkwise::output::format_history(&history, &name));
        }

        Commands::Report {
            out,
            format,
            refresh,
        } => {
            let report_format: ReportFormat = match format.parse() {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Report error: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };

            let lb = require_leaderboard(&config);
            let store = make_store(lb, optional_token().await);
            let rows = fetch_or_exit(&store, lb, refresh, cli.verbose).await;

            let result = match report_format {
                ReportFormat::Markdown => {
                    let report = bunkwise::report::build_markdown_report(&rows, config.min_percent);
                    std::fs::write(&out, report).map_err(anyhow::Error::from)
                }
                ReportFormat::Csv => bunkwise::report::write_csv_report(&rows, &out),
            };

            match result {
                Ok(()) => println!("Report written to {}.", out.display()),
                Err(e) => {
                    eprintln!("Report error: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            }
        }

        Commands::Clear => {
            let lb = require_leaderboard(&config);

            // Local admin gate first, then the bridge checks the token
            if let Some(ref expected) = lb.admin_code {
                match bunkwise::credentials::prompt_admin_code(expected) {
                    Ok(true) => {}
                    Ok(false) => {
                        eprintln!("Wrong admin code.");
                        std::process::exit(EXIT_AUTH);
                    }
                    Err(e) => {
                        eprintln!("Credential error: {}", e);
                        std::process::exit(EXIT_AUTH);
                    }
                }
            }

            let token = match bunkwise::credentials::setup_token_if_missing().await {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("Credential error: {}", e);
                    std::process::exit(EXIT_AUTH);
                }
            };

            let store = make_store(lb, Some(token));
            match store.clear().await {
                Ok(()) => {
                    // Cached rows now lie; drop them
                    if let Err(e) = cache::clear_cache(&cache::get_cache_path()) {
                        eprintln!("Warning: could not clear leaderboard cache: {}", e);
                    }
                    println!("Leaderboard reset!");
                }
                Err(e) => {
                    eprintln!("Could not clear leaderboard: {}", e);
                    std::process::exit(exit_code_for(&e));
                }
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Update one subject's counts from the command line.
fn run_set(
    config: &Config,
    snapshot: &mut Snapshot,
    snapshot_path: &std::path::Path,
    subject: &str,
    present: Option<u32>,
    percent: Option<f64>,
    total: u32,
) {
    let spec = match resolve_subject(config, subject) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let present = match (present, percent) {
        (Some(p), None) => p,
        (None, Some(pct)) => bunkwise::engine::present_from_percent(pct, total),
        _ => unreachable!("clap arg group enforces exactly one"),
    };

    snapshot.record(spec.key(), present, total);
    if let Err(e) = save_snapshot(snapshot_path, snapshot) {
        eprintln!("Failed to save snapshot: {}", e);
        std::process::exit(EXIT_CONFIG);
    }

    let pct = bunkwise::engine::percentage(present, total);
    if present > total {
        eprintln!("Note: present exceeds total; surfacing it as entered.");
    }
    println!(
        "{} = {}/{} ({})",
        spec.key(),
        present,
        total,
        bunkwise::output::format_pct(pct)
    );
}

/// Resolve a subject argument as a 1-based index or an exact key/name.
fn resolve_subject<'a>(
    config: &'a Config,
    subject: &str,
) -> Result<&'a bunkwise::config::SubjectSpec, String> {
    if let Ok(index) = subject.parse::<usize>() {
        return config
            .subjects
            .get(index.wrapping_sub(1))
            .ok_or_else(|| {
                format!(
                    "Subject index {} out of range (1..={})",
                    index,
                    config.subjects.len()
                )
            });
    }

    let by_key: Vec<_> = config
        .subjects
        .iter()
        .filter(|s| s.key().eq_ignore_ascii_case(subject))
        .collect();
    if by_key.len() == 1 {
        return Ok(by_key[0]);
    }

    let by_name: Vec<_> = config
        .subjects
        .iter()
        .filter(|s| s.name.eq_ignore_ascii_case(subject))
        .collect();
    match by_name.len() {
        1 => Ok(by_name[0]),
        0 => Err(format!(
            "Unknown subject '{}'. Use the index from `bunkwise analyze` or the full key, e.g. \"{}\"",
            subject,
            config
                .subjects
                .first()
                .map(|s| s.key())
                .unwrap_or_default()
        )),
        _ => Err(format!(
            "Subject '{}' is ambiguous; use the full key: {}",
            subject,
            by_name
                .iter()
                .map(|s| format!("\"{}\"", s.key()))
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

fn require_leaderboard(config: &Config) -> &LeaderboardConfig {
    match config.leaderboard {
        Some(ref lb) => lb,
        None => {
            eprintln!("No leaderboard configured. Add a `leaderboard:` section with `bunkwise init`.");
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn make_store(lb: &LeaderboardConfig, token: Option<String>) -> SheetStore {
    match SheetStore::new(&lb.url, token) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to create leaderboard client: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    }
}

/// Token from env or keyring if one exists; reads never prompt.
async fn optional_token() -> Option<String> {
    match bunkwise::credentials::get_token_from_env() {
        Some(t) => Some(t),
        None => bunkwise::credentials::get_token().await.ok(),
    }
}

async fn fetch_or_exit(
    store: &SheetStore,
    lb: &LeaderboardConfig,
    refresh: bool,
    verbose: bool,
) -> Vec<LeaderboardRow> {
    let ttl = lb
        .cache_ttl
        .as_deref()
        .and_then(|s| humantime::parse_duration(s).ok())
        .unwrap_or(cache::DEFAULT_TTL);

    match fetch_rows(store, &cache::get_cache_path(), ttl, refresh, verbose).await {
        Ok((rows, _source)) => rows,
        Err(e) => {
            eprintln!("Could not read leaderboard: {}", e);
            std::process::exit(exit_code_for(&e));
        }
    }
}

fn exit_code_for(e: &anyhow::Error) -> i32 {
    if e.chain().any(|c| c.downcast_ref::<AuthError>().is_some()) {
        EXIT_AUTH
    } else {
        EXIT_NETWORK
    }
}
