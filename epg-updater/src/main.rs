//! epg-updater: imports grabbed EPG listings into the schedule database.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, warn};

use epg_protocol::{BroadcastChannel, IncomingListing};
use epg_updater::config_file::ConfigFile;
use epg_updater::database::NewChannel;
use epg_updater::updater::config::keys;
use epg_updater::{logging, BroadcastEvents, Database, EpgUpdater, UpdateOutcome};

const DEFAULT_DATABASE: &str = "epg-updater.db";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_RETENTION_DAYS: u64 = 7;
const DEFAULT_GRABBER_NAME: &str = "epg";

/// epg-updater - Reconcile grabbed EPG listings with the stored schedule
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'f', long)]
    config: Option<PathBuf>,

    /// Directory where log files are stored
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Number of days to keep log files
    #[arg(long)]
    log_retention_days: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a listing from a JSON file
    Import {
        /// Listing file
        listing: PathBuf,

        /// Name used as log prefix
        #[arg(long)]
        grabber: Option<String>,

        /// Import even if the channel was grabbed recently
        #[arg(long)]
        ignore_last_update: bool,

        /// Reference time (RFC 3339), defaults to the current time
        #[arg(long, value_parser = parse_time)]
        now: Option<DateTime<Utc>>,

        /// Print the imported listing as JSON
        #[arg(long)]
        emit: bool,
    },

    /// Manage channels
    #[command(subcommand)]
    Channel(ChannelCommand),

    /// List the stored programs of a channel
    Programs {
        channel_id: i64,
    },

    /// Read or change reconciliation settings
    #[command(subcommand)]
    Setting(SettingCommand),
}

#[derive(Subcommand, Debug)]
enum ChannelCommand {
    /// Register a channel with one tuning detail
    Add {
        name: String,

        #[arg(long, value_enum, default_value = "isdb")]
        standard: Standard,

        /// Network ID (decimal or 0x-prefixed hex)
        #[arg(long, value_parser = parse_id, default_value = "0")]
        nid: u16,

        /// Transport stream ID
        #[arg(long, value_parser = parse_id)]
        tsid: u16,

        /// Service ID (program number for ATSC)
        #[arg(long, value_parser = parse_id)]
        sid: u16,

        /// Register as a radio channel
        #[arg(long)]
        radio: bool,

        /// Do not mark the channel for EPG grabbing
        #[arg(long)]
        no_grab: bool,
    },

    /// List channels
    List,

    /// Enable or disable EPG grabbing for a channel
    Grab {
        channel_id: i64,
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Subcommand, Debug)]
enum SettingCommand {
    /// Print one setting, or all of them
    Get { name: Option<String> },
    /// Store a setting
    Set { name: String, value: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Standard {
    Isdb,
    DvbC,
    DvbS,
    DvbT,
    Atsc,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Toggle {
    On,
    Off,
}

fn parse_id(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid id {:?}: {}", s, e))
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid time {:?}: {}", s, e))
}

fn broadcast_channel(standard: Standard, nid: u16, tsid: u16, sid: u16) -> BroadcastChannel {
    match standard {
        Standard::Isdb => BroadcastChannel::isdb(nid, tsid, sid),
        Standard::DvbC => BroadcastChannel::DvbC {
            network_id: nid,
            transport_id: tsid,
            service_id: sid,
            frequency_khz: None,
            symbol_rate: None,
        },
        Standard::DvbS => BroadcastChannel::DvbS {
            network_id: nid,
            transport_id: tsid,
            service_id: sid,
            frequency_khz: None,
            symbol_rate: None,
        },
        Standard::DvbT => BroadcastChannel::dvb_t(nid, tsid, sid),
        Standard::Atsc => BroadcastChannel::Atsc {
            transport_id: tsid,
            program_number: sid,
            major_channel: None,
            minor_channel: None,
        },
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (file_config, config_path) = ConfigFile::discover(args.config.as_deref())?;
    if let Some(path) = &config_path {
        eprintln!("Loaded config from: {}", path.display());
    }

    // Command line takes precedence over the config file.
    let log_dir = args
        .log_dir
        .clone()
        .or_else(|| file_config.logging.log_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));
    let retention_days = args
        .log_retention_days
        .or(file_config.logging.retention_days)
        .unwrap_or(DEFAULT_RETENTION_DAYS);
    logging::init_logging(
        &log_dir,
        retention_days,
        args.verbose,
        file_config.logging.level.as_deref(),
    )?;

    let db_path = args
        .database
        .clone()
        .or_else(|| file_config.database.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));
    info!("Opening database: {:?}", db_path);
    let db = match Database::open(&db_path) {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    match args.command {
        Command::Import {
            listing,
            grabber,
            ignore_last_update,
            now,
            emit,
        } => {
            let grabber_name = grabber
                .or_else(|| file_config.grabber.name.clone())
                .unwrap_or_else(|| DEFAULT_GRABBER_NAME.to_string());
            let check_for_last_update =
                !ignore_last_update && file_config.grabber.check_for_last_update.unwrap_or(true);
            import(
                &db,
                &listing,
                &grabber_name,
                check_for_last_update,
                now.unwrap_or_else(Utc::now),
                emit,
            )?;
        }
        Command::Channel(command) => channel_command(&db, command)?,
        Command::Programs { channel_id } => {
            for program in db.get_programs_by_channel(channel_id)? {
                println!(
                    "{:>6}  {}  {}  {}{}",
                    program.id,
                    program.start_time.format("%Y-%m-%d %H:%M"),
                    program.end_time.format("%H:%M"),
                    program.title,
                    if program.state.is_empty() {
                        String::new()
                    } else {
                        format!("  [{}]", program.state)
                    }
                );
            }
        }
        Command::Setting(SettingCommand::Get { name: Some(name) }) => {
            match db.get_setting_value(&name)? {
                Some(value) => println!("{} = {}", name, value),
                None => println!("{} is not set", name),
            }
        }
        Command::Setting(SettingCommand::Get { name: None }) => {
            for (name, value) in db.get_settings()? {
                println!("{} = {}", name, value);
            }
        }
        Command::Setting(SettingCommand::Set { name, value }) => {
            if !keys::ALL.contains(&name.as_str()) {
                eprintln!("warning: {} is not used by the updater", name);
            }
            db.set_setting(&name, &value)?;
            info!("Setting {} = {}", name, value);
        }
    }

    Ok(())
}

fn import(
    db: &Database,
    path: &Path,
    grabber_name: &str,
    check_for_last_update: bool,
    now: DateTime<Utc>,
    emit: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    let listing = IncomingListing::from_json(&json)?;
    for issue in listing.star_rating_issues() {
        warn!("{}: {}: {}", grabber_name, path.display(), issue);
    }

    let updater = EpgUpdater::from_settings(grabber_name, db, check_for_last_update)?;
    let events = BroadcastEvents::new(1);
    let mut received = events.subscribe();

    match updater.update_epg_for_channel(db, &events, &listing, now)? {
        UpdateOutcome::Rejected(reason) => {
            println!("{}: not imported ({})", listing.channel.tuning_key(), reason);
        }
        UpdateOutcome::Imported(summary) => {
            println!(
                "{}: inserted {}, updated {}, discarded {}, duplicates {}{}",
                listing.channel.tuning_key(),
                summary.inserted,
                summary.updated,
                summary.discarded,
                summary.duplicates,
                if summary.has_gaps { ", has gaps" } else { "" }
            );
        }
    }

    if emit {
        if let Ok(imported) = received.try_recv() {
            println!("{}", imported.to_json()?);
        }
    }

    Ok(())
}

fn channel_command(db: &Database, command: ChannelCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ChannelCommand::Add {
            name,
            standard,
            nid,
            tsid,
            sid,
            radio,
            no_grab,
        } => {
            let mut channel = NewChannel::new(name).with_grab_epg(!no_grab);
            if radio {
                channel = channel.radio();
            }
            let tuning = broadcast_channel(standard, nid, tsid, sid);
            let id = db.insert_channel(&channel)?;
            db.add_tuning_detail(id, &tuning)?;
            info!("Added channel {} ({})", id, tuning.tuning_key());
            println!("{}", id);
        }
        ChannelCommand::List => {
            for channel in db.get_channels()? {
                let keys: Vec<String> = db
                    .get_tuning_details(channel.id)?
                    .into_iter()
                    .map(|detail| format!("{} {}", detail.standard, detail.key))
                    .collect();
                println!(
                    "{:>4}  {:<24} {:<5} grab={} gaps={} last={}  {}",
                    channel.id,
                    channel.display_name,
                    channel.media_type.name_en(),
                    channel.grab_epg,
                    channel.epg_has_gaps,
                    channel
                        .last_grab_time
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "-".to_string()),
                    keys.join(", ")
                );
            }
        }
        ChannelCommand::Grab { channel_id, state } => {
            db.set_grab_epg(channel_id, matches!(state, Toggle::On))?;
        }
    }
    Ok(())
}
