use std::{fs::File, io, path::PathBuf, sync::Arc};

use bakehouse_app::{
    backup::{FileStorage, OrderBackupStore},
    config::AppConfig,
};
use clap::{Args, Subcommand};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

#[derive(Debug, Args)]
pub(crate) struct BackupsCommand {
    #[command(subcommand)]
    command: BackupsSubcommand,
}

#[derive(Debug, Subcommand)]
enum BackupsSubcommand {
    /// Show backed-up orders, oldest first
    List,

    /// Write backed-up orders as JSON
    Export(ExportArgs),

    /// Delete every backed-up order
    Clear,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Output file; stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
}

pub(crate) fn run(config: &AppConfig, command: BackupsCommand) -> Result<(), String> {
    let store = OrderBackupStore::new(
        Arc::new(FileStorage::new(&config.backup.backup_dir)),
        config.backup.backup_max_entries,
    );

    match command.command {
        BackupsSubcommand::List => list(&store),
        BackupsSubcommand::Export(args) => export(&store, args),
        BackupsSubcommand::Clear => clear(&store),
    }
}

fn list(store: &OrderBackupStore) -> Result<(), String> {
    let records = store
        .list()
        .map_err(|error| format!("failed to read backups: {error}"))?;

    if records.is_empty() {
        println!("no backed-up orders");
        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record([
        "Reference".to_string(),
        "Customer".to_string(),
        "Phone".to_string(),
        "Option".to_string(),
        "Total".to_string(),
        "Saved".to_string(),
    ]);

    for record in &records {
        let submission = &record.submission;

        builder.push_record([
            submission.reference_number.clone(),
            submission.customer_name.clone(),
            submission.customer_phone.clone(),
            submission.delivery_option.to_string(),
            format!("£{:.2}", submission.total_amount),
            record.timestamp.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(4..5), Alignment::right());

    println!("{table}");

    match store.max_entries() {
        0 => println!("{} orders (no cap)", records.len()),
        cap => println!("{} of at most {cap} orders", records.len()),
    }

    Ok(())
}

fn export(store: &OrderBackupStore, args: ExportArgs) -> Result<(), String> {
    let count = match args.output {
        Some(path) => {
            let mut file = File::create(&path)
                .map_err(|error| format!("failed to create {}: {error}", path.display()))?;

            store.export(&mut file)
        }
        None => store.export(&mut io::stdout().lock()),
    }
    .map_err(|error| format!("failed to export backups: {error}"))?;

    eprintln!("exported {count} orders");

    Ok(())
}

fn clear(store: &OrderBackupStore) -> Result<(), String> {
    let count = store
        .list()
        .map_or(0, |records| records.len());

    store
        .clear()
        .map_err(|error| format!("failed to clear backups: {error}"))?;

    println!("cleared {count} backed-up orders");

    Ok(())
}
