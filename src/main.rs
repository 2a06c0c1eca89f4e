//! Zentinel Workday client binary.
//!
//! Run with: `zentinel-workday-client --config client.yaml <command>`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use zentinel_workday_client::operations::{
    AccountCreate, AccountUpdate, ContactInfoUpdate, PhoneNumber, PhotoUpdate,
};
use zentinel_workday_client::{CallRecord, ClientConfig, WorkdayClient};

/// Workday HR operations over WS-Security authenticated SOAP.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long, default_value = "client.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print the full call record as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Update work email and/or landline phone
    Contact {
        /// Employee or contingent worker ID
        worker_id: String,
        #[arg(long)]
        email: Option<String>,
        /// Phone number; enables the phone block
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, requires = "phone")]
        country_code: Option<String>,
        #[arg(long, requires = "phone")]
        area_code: Option<String>,
        #[arg(long, requires = "phone")]
        extension: Option<String>,
    },
    /// Upload a worker photo
    Photo {
        worker_id: String,
        /// Image file to upload
        file: PathBuf,
        /// File name reported to the service
        #[arg(long)]
        filename: Option<String>,
    },
    /// Create an account with a generated password
    CreateAccount { worker_id: String, username: String },
    /// Change the username of an existing account
    UpdateAccount { worker_id: String, username: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Config file: {}", args.config.display());

    let content = tokio::fs::read_to_string(&args.config)
        .await
        .context("Failed to read config file")?;
    let config = ClientConfig::from_yaml_str(&content).context("Failed to parse config file")?;
    let mut client = WorkdayClient::new(config).context("Failed to initialize client")?;

    let record = match args.command {
        Command::Contact {
            worker_id,
            email,
            phone,
            country_code,
            area_code,
            extension,
        } => {
            let phone = phone.map(|number| PhoneNumber {
                country_code,
                area_code,
                number,
                extension,
            });
            client
                .update_contact_info(&ContactInfoUpdate {
                    worker_id,
                    email,
                    phone,
                    effective_date: None,
                })
                .await
        }
        Command::Photo {
            worker_id,
            file,
            filename,
        } => {
            client
                .update_photo(&PhotoUpdate {
                    worker_id,
                    source: file,
                    filename,
                })
                .await
        }
        Command::CreateAccount {
            worker_id,
            username,
        } => {
            client
                .create_account(&AccountCreate {
                    worker_id,
                    username,
                })
                .await
        }
        Command::UpdateAccount {
            worker_id,
            username,
        } => {
            client
                .update_account(&AccountUpdate {
                    worker_id,
                    username,
                })
                .await
        }
    };

    report(&record, args.json)?;

    if let Some(err) = record.error {
        anyhow::bail!("{} failed: {}", record.operation, err);
    }
    Ok(())
}

fn report(record: &CallRecord, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(record).context("Failed to encode call record")?;
        println!("{}", out);
        return Ok(());
    }

    match record.error {
        None => println!(
            "{} succeeded (HTTP {}, {} ms)",
            record.operation,
            record.status.unwrap_or_default(),
            record.duration_ms
        ),
        Some(ref err) => println!("{} failed [{}]: {}", record.operation, err.kind(), err),
    }
    Ok(())
}
