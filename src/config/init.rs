use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, Config, LeaderboardConfig, SimulationConfig, SubjectSpec};
use crate::engine::SessionType;

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Print text with a typewriter effect, one character at a time.
fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(18));
    }
    println!();
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    typewriter("Bunkwise Configuration Wizard");
    println!("=============================");
    println!();

    // 1. Minimum percentage
    typewriter("The minimum required percentage is your institution's attendance threshold.");
    typewriter("Everything bunkwise computes -- budgets, advisories, projections -- keys off it.");
    let min_percent: f64 = loop {
        let input = prompt_with_default("Minimum required %", "80")?;
        match input.parse::<f64>() {
            Ok(v) if (50.0..=100.0).contains(&v) => break v,
            Ok(_) => println!("  Invalid: must be between 50 and 100. Try again."),
            Err(_) => println!("  Invalid: must be a number. Try again."),
        }
    };

    // 2. Subject catalog
    println!();
    typewriter("Subjects are a fixed catalog: name, session type (TH theory, PR practical,");
    typewriter("PJ project) and how many sessions run per week.");
    let use_stock = prompt_yes_no(
        "Use the stock first-year catalog? (n to enter your own timetable)",
        true,
    )?;

    let subjects = if use_stock {
        Config::default_catalog()
    } else {
        let mut entries: Vec<SubjectSpec> = Vec::new();
        loop {
            let name = loop {
                let n = prompt("  Subject name: ")?;
                if !n.trim().is_empty() {
                    break n;
                }
                println!("  Subject name is required.");
            };
            let kind = loop {
                let k = prompt_with_default("  Session type (TH/PR/PJ)", "TH")?;
                match k.parse::<SessionType>() {
                    Ok(kind) => break kind,
                    Err(e) => println!("  Invalid: {}. Try again.", e),
                }
            };
            let per_week = loop {
                let w = prompt_with_default("  Sessions per week", "3")?;
                match w.parse::<u32>() {
                    Ok(v) if v >= 1 => break v,
                    _ => println!("  Invalid: must be a whole number of at least 1. Try again."),
                }
            };
            entries.push(SubjectSpec { name, kind, per_week });

            let add_more = prompt_yes_no("  Add another subject?", true)?;
            if !add_more {
                break;
            }
        }
        entries
    };

    // 3. Leaderboard (optional)
    println!();
    typewriter("The class leaderboard is optional. It needs a sheet-bridge URL your class rep");
    typewriter("set up; skip it to keep everything on this machine.");
    let leaderboard = if prompt_yes_no("Configure the class leaderboard?", false)? {
        let url = loop {
            let u = prompt("  Sheet bridge URL: ")?;
            if !u.trim().is_empty() {
                break u;
            }
            println!("  URL is required.");
        };
        let section = prompt_with_default("  Your section/division", "Div 1")?;
        let admin_code = prompt("  Class-rep admin code (empty to skip): ")?;
        Some(LeaderboardConfig {
            url,
            section: Some(section),
            browse_url: None,
            cache_ttl: None,
            admin_code: if admin_code.is_empty() { None } else { Some(admin_code) },
        })
    } else {
        None
    };

    // 4. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config
    let config = Config {
        min_percent,
        simulation: SimulationConfig::default(),
        subjects,
        leaderboard,
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    typewriter("Fill in your counts with `bunkwise form` (interactive) or `bunkwise set`,");
    typewriter("then `bunkwise analyze` whenever you're tempted to skip a class.");

    Ok(())
}
