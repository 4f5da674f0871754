mod commands;
mod logging;
mod progress;

use std::io::{self, BufRead, Write};
use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, ListArgs, ScanArgs};
use dotenv::dotenv;
use dupindex_core::storage::{group_by_fingerprint, Database, FileRecord};
use dupindex_core::{ScanConfig, ScanEngine, ScanResult};
use progress::CliReporter;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let mut config = match dupindex_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();
    if let Some(db) = args.db {
        config.db_path = db;
    }

    let outcome = match args.command {
        Some(Commands::Scan(scan_args)) => run_scan(config, scan_args),
        Some(Commands::Show) => run_show(&config),
        Some(Commands::Count) => run_count(&config),
        Some(Commands::Find { fingerprint }) => run_find(&config, &fingerprint),
        Some(Commands::List(list_args)) => run_list(&config, &list_args),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        Some(Commands::TruncateDb) => run_truncate(&config),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {}", err);
        process::exit(1);
    }

    Ok(())
}

fn run_scan(mut config: ScanConfig, args: ScanArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }

    let engine = ScanEngine::new(config);
    let db = engine.open_store()?;
    let reporter = CliReporter::new();

    let results = match args.dir {
        Some(dir) => {
            info!("Directory to scan: {:?}", dir);
            vec![engine.scan(&db, &dir, &reporter)?]
        }
        None => engine.scan_configured(&db, &reporter)?,
    };

    println!();
    for result in &results {
        print_summary(result);
    }

    Ok(())
}

fn print_summary(result: &ScanResult) {
    info!(
        "{}: {} files counted, {} indexed, {} new, {} empty skipped",
        result.root.display(),
        format!("{}", result.total_files).cyan(),
        format!("{}", result.records_sent).cyan(),
        format!("{}", result.records_inserted).green(),
        format!("{}", result.skipped_empty).dimmed(),
    );
    info!(
        "{} batches committed, {} failed, {} errors, completed in {}",
        format!("{}", result.batches_committed).green(),
        format!("{}", result.batches_failed).red(),
        format!("{}", result.errors).red(),
        format!("{:.2?}", result.elapsed).green(),
    );
}

fn print_record(prefix: &str, record: &FileRecord) {
    println!(
        "{} {:?} -HASH {} -PATH {}",
        prefix.yellow(),
        record.name,
        record.fingerprint,
        record.directory
    );
}

fn print_records(records: &[FileRecord]) {
    for (i, record) in records.iter().enumerate() {
        print_record(&format!("{:02}", i + 1), record);
    }
}

fn run_show(config: &ScanConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(&config.db_path)?;
    let groups = group_by_fingerprint(db.find_duplicate_groups()?);

    let mut i = 0;
    for group in &groups {
        println!(
            "{} {} copies, {} bytes reclaimable",
            group.fingerprint.bold(),
            group.len(),
            group.wasted_bytes()
        );
        for record in &group.records {
            i += 1;
            print_record(&format!("{:02}", i), record);
        }
    }
    info!("{} duplicate groups", format!("{}", groups.len()).red());

    Ok(())
}

fn run_count(config: &ScanConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(&config.db_path)?;
    let qty = db.count_duplicate_groups()?;
    println!("{} {:02}", "Duplicate files in total:".yellow(), qty);
    Ok(())
}

fn run_find(config: &ScanConfig, fingerprint: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(&config.db_path)?;
    let records = db.find_by_fingerprint(&fingerprint.to_lowercase())?;
    if records.is_empty() {
        info!("No files with fingerprint {}", fingerprint);
    }
    print_records(&records);
    Ok(())
}

fn run_list(config: &ScanConfig, args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(&config.db_path)?;
    let records = db.find_all_paginated(args.per_page, args.page)?;
    if records.is_empty() {
        info!("No files on page {}", args.page);
    }
    print_records(&records);
    Ok(())
}

fn run_truncate(config: &ScanConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !confirm("Are you SURE you want to COMPLETELY DELETE the index?")? {
        info!("Index left untouched");
        return Ok(());
    }

    let db = Database::open(&config.db_path)?;
    db.truncate_all()?;
    println!("All tables truncated");
    Ok(())
}

/// Ask a yes/no question on stdin. Anything but an explicit yes is a no.
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} {} ", prompt, "[y/N]".bold());
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
