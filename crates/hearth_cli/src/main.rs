//! Command-line entry point for Hearth core.
//!
//! # Responsibility
//! - Verify `hearth_core` linkage without the Flutter/FFI runtime.
//! - Run reminder jobs against a database file, once or on their schedule,
//!   printing notifications to stdout.

use clap::{Parser, Subcommand};
use hearth_core::reminder::SinkError;
use hearth_core::service::WaterDefaults;
use hearth_core::{
    cipher, init_logging_from_config, system_clock, CoreConfig, Notification, NotificationSink,
    ReminderJob, ReminderWorker, Scheduler,
};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Hearth household core tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file (overrides HEARTH_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print ping and core version
    Ping,
    /// Run one reminder pass (water, task_daily, task_due, savings, transaction)
    Remind { job: String },
    /// Run every reminder job on its cadence for `seconds`
    Watch {
        #[arg(long, default_value = "60")]
        seconds: u64,
    },
    /// Caesar-shift `text` forward by `key`
    Encrypt { key: i32, text: String },
    /// Undo `encrypt` for the same key
    Decrypt { key: i32, text: String },
}

/// Prints notifications instead of posting them to a platform.
struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        println!(
            "[{}#{}] {}: {}",
            notification.category.as_str(),
            notification.id.0,
            notification.title,
            notification.body
        );
        Ok(())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    match cli.command {
        Commands::Ping => {
            println!("hearth_core ping={}", hearth_core::ping());
            println!("hearth_core version={}", hearth_core::core_version());
            ExitCode::SUCCESS
        }
        Commands::Remind { job } => remind(&config, &job),
        Commands::Watch { seconds } => {
            watch(&config, Duration::from_secs(seconds));
            ExitCode::SUCCESS
        }
        Commands::Encrypt { key, text } => {
            println!("{}", cipher::encrypt(&text, key));
            ExitCode::SUCCESS
        }
        Commands::Decrypt { key, text } => {
            println!("{}", cipher::decrypt(&text, key));
            ExitCode::SUCCESS
        }
    }
}

fn worker(config: &CoreConfig) -> ReminderWorker {
    ReminderWorker::new(Arc::new(StdoutSink), system_clock(), config.local_offset())
        .with_water_defaults(WaterDefaults::from_config(config))
}

fn remind(config: &CoreConfig, raw_job: &str) -> ExitCode {
    let Some(job) = ReminderJob::parse(raw_job) else {
        eprintln!("unknown reminder job `{raw_job}`");
        return ExitCode::FAILURE;
    };
    let conn = match hearth_core::open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=cli_remind module=cli status=error error={err}");
            eprintln!("cannot open {}: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };
    match worker(config).run(&conn, job) {
        Ok(report) => {
            println!(
                "{}: evaluated={} fired={} failed={}",
                job.name(),
                report.evaluated,
                report.fired.len(),
                report.failures.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} failed: {err}", job.name());
            ExitCode::FAILURE
        }
    }
}

fn watch(config: &CoreConfig, duration: Duration) {
    let mut scheduler = Scheduler::new();
    for job in ReminderJob::ALL {
        let worker = worker(config);
        let db_path = config.db_path.clone();
        let schedule = ReminderWorker::schedule_for(job, config.job_retry_delay()).immediately();
        scheduler.schedule(job.name(), schedule, move || worker.run_job(&db_path, job));
    }
    info!(
        "event=cli_watch module=cli status=ok jobs={} seconds={}",
        scheduler.len(),
        duration.as_secs()
    );
    std::thread::sleep(duration);
    scheduler.cancel_all();
}
