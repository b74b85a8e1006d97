use anyhow::Result;
use std::path::PathBuf;

use lumina::config::Config;
use lumina::db::{migrate, Store};
use lumina::{maintenance, portfolio, slideshow};

struct Args {
    config_path: Option<PathBuf>,
    scrub: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        config_path: None,
        scrub: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("lumina {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    parsed.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--scrub" => {
                parsed.scrub = true;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn print_help() {
    println!(
        r#"lumina - photography portfolio data services

USAGE:
    lumina [OPTIONS]

Boots the portfolio database (creating tables, applying migrations and
seeding defaults as needed) and prints a summary. The HTTP frontend runs
against the same database.

OPTIONS:
    --config, -c PATH   Path to config file
    --scrub             Clean up legacy title/description artifacts
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    LUMINA_LOG          Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/lumina/config.toml"#
    );
}

fn main() -> Result<()> {
    let args = parse_args();

    // Initialize logging (file backend in the config directory)
    let _ = lumina::logging::init(Some(Config::config_dir().join("logs")));

    // Load configuration
    let config = match &args.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Open the database and run the boot migration
    let store = Store::open(&config.db_path)?;
    let report = migrate::run(&store, &config);
    report.log_summary();

    let failed = report.failed_steps().count();
    if failed > 0 {
        eprintln!("warning: {failed} boot migration step(s) failed, continuing");
    }

    if args.scrub {
        let updated = maintenance::scrub_titles(&store)?;
        println!("scrubbed {updated} image(s)");
        let missing = maintenance::find_missing_files(&store, &config)?;
        for image in &missing {
            println!("missing file: {} (image {})", image.filename, image.id);
        }
        let orphans = maintenance::find_orphan_files(&store, &config)?;
        for filename in &orphans {
            println!("orphaned file: {filename}");
        }
    }

    // Boot summary
    let gallery = portfolio::gallery(&store, &config)?;
    let categories = portfolio::categories_with_counts(&store)?;
    let entries = slideshow::active(&store)?;
    println!("database: {}", config.db_path.display());
    println!("images: {}", gallery.len());
    println!("categories: {}", categories.len());
    println!(
        "slideshow: {}/{} active",
        entries.len(),
        slideshow::SLIDESHOW_CAPACITY
    );

    Ok(())
}
