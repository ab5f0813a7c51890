//! Console front end for school records.
//!
//! # Responsibility
//! - Parse arguments, start logging, open the database.
//! - Optionally replace the store content with demo data.
//! - Hand stdin/stdout to the numbered menu.

mod app;
mod menu;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use school_core::{default_log_level, init_logging, open_db, open_db_in_memory, SeedPlan};
use std::io;
use std::path::PathBuf;

use crate::{app::School, menu::Menu};

/// School records console: groups, courses, students and enrollments.
#[derive(Parser, Debug)]
#[command(name = "school")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database file; an in-memory database is used when omitted
    #[arg(long, env = "SCHOOL_DB_PATH")]
    db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, env = "SCHOOL_LOG_LEVEL", default_value_t = default_log_level().to_string())]
    log_level: String,

    /// Directory for rotating log files; logging is off when omitted
    #[arg(long, env = "SCHOOL_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Seed for demo data generation; random when omitted
    #[arg(long, env = "SCHOOL_SEED")]
    seed: Option<u64>,

    /// Keep existing data and skip demo data generation
    #[arg(long)]
    no_seed: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        init_logging(&cli.log_level, log_dir)
            .map_err(|err| anyhow!("failed to start logging: {err}"))?;
    }

    let conn = match &cli.db {
        Some(path) => open_db(path)
            .with_context(|| format!("failed to open database `{}`", path.display()))?,
        None => open_db_in_memory().context("failed to open in-memory database")?,
    };
    let school = School::try_new(&conn).context("database schema is not ready")?;

    if !cli.no_seed {
        let plan = SeedPlan {
            seed: cli.seed.unwrap_or_else(rand::random),
            ..SeedPlan::default()
        };
        school.seeder.reset_all().context("failed to reset demo data")?;
        let report = school
            .seeder
            .generate(&plan)
            .context("failed to generate demo data")?;
        println!(
            "Demo data ready: {} groups, {} courses, {} students, {} enrollments (seed {}).",
            report.groups, report.courses, report.students, report.enrollments, plan.seed
        );
    }

    info!("event=cli_start module=cli status=ok");
    Menu::new(&school, io::stdin().lock(), io::stdout().lock())
        .run()
        .context("console I/O failed")?;
    info!("event=cli_exit module=cli status=ok");
    Ok(())
}
