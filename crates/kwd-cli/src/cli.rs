//! CLI definition and command dispatch for kwd.
//!
//! This module defines the command-line interface using `clap` and provides
//! the `run()` function that dispatches commands to the keyword facade.
//!
//! ## Configuration Precedence
//!
//! The keyword database path is resolved with the following precedence
//! (highest to lowest):
//! 1. `--db` flag
//! 2. `KWD_KEYWORD_DB_PATH` environment variable
//! 3. `keywordDbPath` in the config file (`~/.kwd/config.yaml` or `--config`)
//! 4. `keywords.db` next to the `kwd` executable

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::json;

use crate::ui::{table, ColorMode, MessageType, Style};

use kwd_core::db_adapter::IntoKeywordResult;
use kwd_core::{
    hash_of, Dataset, DatasourceHash, DbPathSource, KeywordConfig, KeywordError, KeywordIo,
    KeywordLocation, Keywords,
};

// ============================================================================
// CLI Definition
// ============================================================================

/// Version string including git commit hash
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Keyword metadata for geospatial layers
#[derive(Parser, Debug)]
#[command(name = "kwd")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "KWD_VERBOSE")]
    pub verbose: bool,

    /// Path to configuration file (default: ~/.kwd/config.yaml)
    #[arg(long, global = true, env = "KWD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the keyword database used for remote datasources
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Color output mode: always, never, or auto (default: auto)
    #[arg(long, global = true, env = "KWD_COLOR", default_value = "auto")]
    pub color: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Dataset selection shared by keyword commands.
#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// File path or connection string of the dataset
    pub source: String,

    /// Provider type (ogr, gdal, delimitedtext, postgres, wms, spatialite, gpx, ...)
    #[arg(short, long, default_value = "ogr")]
    pub provider: String,
}

impl DatasetArgs {
    fn dataset(&self) -> Dataset {
        Dataset::new(self.source.clone(), self.provider.clone())
    }
}

/// Keywords given on the command line.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct KeywordInput {
    /// Keyword assignment, repeatable
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Keywords as a JSON object
    #[arg(long = "json", value_name = "OBJECT")]
    pub json: Option<String>,
}

impl KeywordInput {
    fn keywords(&self) -> Result<Keywords, KeywordError> {
        match &self.json {
            Some(text) => Keywords::from_json_str(text),
            None => parse_assignments(&self.set),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the keywords of a dataset
    #[command(after_help = r#"EXAMPLES:
    # Show all keywords of a shapefile
    kwd read /data/roads.shp

    # Read a single keyword from a PostGIS layer
    kwd read "dbname='osm' host=localhost table=roads" -p postgres --key category

    # Output as JSON
    kwd read /data/flood.tif -p gdal --json
"#)]
    Read {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Only print this keyword
        #[arg(short, long)]
        key: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Replace all keywords of a dataset
    #[command(after_help = r#"EXAMPLES:
    # Set keywords one by one
    kwd write /data/flood.tif -p gdal --set category=hazard --set subcategory=flood --set unit=m

    # Set keywords from a JSON object
    kwd write /data/roads.shp --json '{"category": "exposure", "subcategory": "road"}'
"#)]
    Write {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        input: KeywordInput,
    },

    /// Merge keywords into a dataset's existing keywords
    #[command(after_help = r#"EXAMPLES:
    # Add a title, keeping every other keyword
    kwd update /data/roads.shp --set title="Roads of Jakarta"
"#)]
    Update {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        input: KeywordInput,
    },

    /// Remove all keywords of a dataset, keeping an empty record
    Clear {
        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// Remove one keyword from a dataset
    Delete {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Keyword to remove
        #[arg(short, long)]
        key: String,
    },

    /// Copy a dataset's keywords to a sidecar next to another file
    #[command(after_help = r#"EXAMPLES:
    # Give an analysis output the keywords of its input
    kwd copy "dbname='osm' table=buildings" /tmp/impact.shp -p postgres

    # Add or override keywords on the copy
    kwd copy /data/flood.tif /tmp/out.shp -p gdal --extra '{"title": "Flood impact"}'
"#)]
    Copy {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Destination dataset path; the sidecar is written next to it
        destination: PathBuf,

        /// Extra keywords as a JSON object, overriding copied ones
        #[arg(long, value_name = "OBJECT")]
        extra: Option<String>,
    },

    /// Show the aggregation statistics settings of a dataset
    Stats {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Delete the whole keyword record of a dataset
    Purge {
        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// Show where a dataset's keywords are stored
    Locate {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the cache hash of a connection string
    Hash {
        /// Connection string
        source: String,
    },

    /// Inspect the keyword database
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Keyword database actions
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List all records
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show the keywords stored under a hash
    Show {
        /// Datasource hash (32 hex characters)
        hash: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Remove the record stored under a hash
    Rm {
        /// Datasource hash (32 hex characters)
        hash: String,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved configuration
    Show {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Entry point
// ============================================================================

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Warnings always, debug output only with --verbose
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = format!(
        "kwd_core={},kwd_db={},kwd_cli={}",
        log_level, log_level, log_level
    );

    tracing_subscriber::fmt()
        .with_env_filter(&filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let color_mode = ColorMode::parse(&cli.color).unwrap_or_default();
    let style = Style::new(color_mode);

    let config = match &cli.config {
        Some(path) => KeywordConfig::from_path(path),
        None => KeywordConfig::load_default(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            let hint = match &cli.config {
                Some(path) => format!("Check your config at {}", path.display()),
                None => "Check your config at ~/.kwd/config.yaml".to_string(),
            };
            eprintln!(
                "{}",
                style.error_with_context("Failed to load configuration", Some(&e.to_string()), Some(&hint))
            );
            return ExitCode::FAILURE;
        }
    };

    let io = match KeywordIo::from_config(&config, cli.db.as_deref()) {
        Ok(io) => io,
        Err(e) => {
            eprintln!(
                "{}",
                style.error_with_context(
                    "Invalid keyword database path",
                    Some(&e.to_string()),
                    Some("Use --db, KWD_KEYWORD_DB_PATH or keywordDbPath to choose a file"),
                )
            );
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!("Keyword database: {}", io.keyword_db_path().display());

    let result = match cli.command {
        Command::Read { dataset, key, json } => handle_read(&style, &io, &dataset, key, json),
        Command::Write { dataset, input } => handle_write(&style, &io, &dataset, &input),
        Command::Update { dataset, input } => handle_update(&style, &io, &dataset, &input),
        Command::Clear { dataset } => handle_clear(&style, &io, &dataset),
        Command::Delete { dataset, key } => handle_delete(&style, &io, &dataset, &key),
        Command::Copy {
            dataset,
            destination,
            extra,
        } => handle_copy(&style, &io, &dataset, &destination, extra),
        Command::Stats { dataset, json } => handle_stats(&style, &io, &dataset, json),
        Command::Purge { dataset } => handle_purge(&style, &io, &dataset),
        Command::Locate { dataset, json } => handle_locate(&style, &io, &dataset, json),
        Command::Hash { source } => handle_hash(&source),
        Command::Cache { action } => handle_cache(&style, &io, action),
        Command::Config { action } => {
            handle_config(&style, &io, &config, cli.config.as_deref(), cli.db.is_some(), action)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style.message(MessageType::Err, &e.to_string()));
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Command handlers
// ============================================================================

fn handle_read(
    style: &Style,
    io: &KeywordIo,
    args: &DatasetArgs,
    key: Option<String>,
    json: bool,
) -> Result<(), KeywordError> {
    let dataset = args.dataset();

    if let Some(key) = key {
        let value = io.read_keyword(&dataset, &key)?;
        if json {
            println!("{}", serde_json::to_string(&value)?);
        } else {
            println!("{}", value);
        }
        return Ok(());
    }

    let keywords = io.read_keywords(&dataset)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&keywords)?);
    } else if keywords.is_empty() {
        println!(
            "{}",
            style.message(
                MessageType::Info,
                &format!("No keywords set for {}", style.file_path(&args.source))
            )
        );
    } else {
        println!("{}", table::render_keywords_table(&keywords));
    }
    Ok(())
}

fn handle_write(
    style: &Style,
    io: &KeywordIo,
    args: &DatasetArgs,
    input: &KeywordInput,
) -> Result<(), KeywordError> {
    let dataset = args.dataset();
    let keywords = input.keywords()?;
    io.write_keywords(&dataset, &keywords)?;

    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!("Wrote {} keyword(s) to {}", keywords.len(), io.location_for(&dataset))
        )
    );
    Ok(())
}

fn handle_update(
    style: &Style,
    io: &KeywordIo,
    args: &DatasetArgs,
    input: &KeywordInput,
) -> Result<(), KeywordError> {
    let dataset = args.dataset();
    let keywords = input.keywords()?;
    let merged = io.update_keywords(&dataset, &keywords)?;

    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!(
                "Updated {} keyword(s) on {}",
                keywords.len(),
                io.location_for(&dataset)
            )
        )
    );
    println!("{}", style.message_detail("Total", &merged.len().to_string()));
    Ok(())
}

fn handle_clear(style: &Style, io: &KeywordIo, args: &DatasetArgs) -> Result<(), KeywordError> {
    let dataset = args.dataset();
    io.clear_keywords(&dataset)?;

    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!("Cleared keywords of {}", style.file_path(&args.source))
        )
    );
    Ok(())
}

fn handle_delete(
    style: &Style,
    io: &KeywordIo,
    args: &DatasetArgs,
    key: &str,
) -> Result<(), KeywordError> {
    let dataset = args.dataset();
    if io.delete_keyword(&dataset, key)? {
        println!(
            "{}",
            style.message(
                MessageType::Ok,
                &format!("Deleted keyword `{}`", style.keyword(key))
            )
        );
    } else {
        println!(
            "{}",
            style.message(
                MessageType::Info,
                &format!("Keyword `{}` is not set, nothing to delete", style.keyword(key))
            )
        );
    }
    Ok(())
}

fn handle_copy(
    style: &Style,
    io: &KeywordIo,
    args: &DatasetArgs,
    destination: &Path,
    extra: Option<String>,
) -> Result<(), KeywordError> {
    let dataset = args.dataset();
    let extra = extra.as_deref().map(Keywords::from_json_str).transpose()?;
    let written = io.copy_keywords(&dataset, destination, extra.as_ref())?;

    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!(
                "Copied keywords to {}",
                style.file_path(&written.display().to_string())
            )
        )
    );
    Ok(())
}

fn handle_stats(
    style: &Style,
    io: &KeywordIo,
    args: &DatasetArgs,
    json: bool,
) -> Result<(), KeywordError> {
    let stats = io.get_statistics(&args.dataset())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", style.key_value("Type", &stats.kind));
    if stats.classes.is_empty() {
        println!("{}", style.key_value("Classes", "(none)"));
    } else {
        println!("{}", style.key_value("Classes", &stats.classes.len().to_string()));
        for (name, value) in &stats.classes {
            println!("{}", style.list_item("-", &format!("{}: {}", name, value)));
        }
    }
    Ok(())
}

fn handle_purge(style: &Style, io: &KeywordIo, args: &DatasetArgs) -> Result<(), KeywordError> {
    let dataset = args.dataset();
    let location = io.location_for(&dataset);

    if io.purge_keywords(&dataset)? {
        println!(
            "{}",
            style.message(MessageType::Ok, &format!("Removed {}", location))
        );
    } else {
        println!(
            "{}",
            style.message(MessageType::Info, &format!("No {} to remove", location))
        );
    }
    Ok(())
}

fn handle_locate(
    style: &Style,
    io: &KeywordIo,
    args: &DatasetArgs,
    json: bool,
) -> Result<(), KeywordError> {
    let location = io.location_for(&args.dataset());

    if json {
        let value = json!({
            "storage": location.storage_kind(),
            "location": location,
            "keywordDbPath": io.keyword_db_path(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", style.key_value("Storage", location.storage_kind().as_str()));
    match &location {
        KeywordLocation::Sidecar(path) => {
            println!(
                "{}",
                style.key_value("Sidecar", &style.file_path(&path.display().to_string()))
            );
        }
        KeywordLocation::Cache(hash) => {
            println!("{}", style.key_value("Hash", hash.as_str()));
            println!(
                "{}",
                style.key_value(
                    "Database",
                    &style.file_path(&io.keyword_db_path().display().to_string())
                )
            );
        }
    }
    Ok(())
}

fn handle_hash(source: &str) -> Result<(), KeywordError> {
    println!("{}", hash_of(source));
    Ok(())
}

fn handle_cache(style: &Style, io: &KeywordIo, action: CacheAction) -> Result<(), KeywordError> {
    match action {
        CacheAction::List { json } => handle_cache_list(style, io, json),
        CacheAction::Show { hash, json } => handle_cache_show(style, io, &hash, json),
        CacheAction::Rm { hash } => handle_cache_rm(style, io, &hash),
    }
}

fn handle_cache_list(style: &Style, io: &KeywordIo, json: bool) -> Result<(), KeywordError> {
    let records = io.cache().list().into_keyword_result()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!(
            "{}",
            style.message(
                MessageType::Info,
                &format!(
                    "No records in {}",
                    style.file_path(&io.keyword_db_path().display().to_string())
                )
            )
        );
        return Ok(());
    }

    println!("{}", table::render_cache_table(&records));
    let corrupt = records.iter().filter(|r| r.keyword_count.is_none()).count();
    if corrupt > 0 {
        println!();
        println!(
            "{}",
            style.message(
                MessageType::Warn,
                &format!("{} record(s) could not be decoded", corrupt)
            )
        );
        println!(
            "{}",
            style.message(MessageType::Hint, "Remove them with `kwd cache rm <HASH>`")
        );
    }
    Ok(())
}

fn handle_cache_show(
    style: &Style,
    io: &KeywordIo,
    hash: &str,
    json: bool,
) -> Result<(), KeywordError> {
    let hash = parse_hash(hash)?;
    let keywords = Keywords::from(io.cache().get(&hash).into_keyword_result()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&keywords)?);
    } else if keywords.is_empty() {
        println!(
            "{}",
            style.message(
                MessageType::Info,
                &format!("Record {} is empty", style.hash(hash.as_str()))
            )
        );
    } else {
        println!("{}", table::render_keywords_table(&keywords));
    }
    Ok(())
}

fn handle_cache_rm(style: &Style, io: &KeywordIo, hash: &str) -> Result<(), KeywordError> {
    let hash = parse_hash(hash)?;

    if io.cache().delete(&hash).into_keyword_result()? {
        println!(
            "{}",
            style.message(
                MessageType::Ok,
                &format!("Removed record {}", style.hash(hash.as_str()))
            )
        );
    } else {
        println!(
            "{}",
            style.message(
                MessageType::Info,
                &format!("No record {} to remove", style.hash(hash.as_str()))
            )
        );
    }
    Ok(())
}

fn handle_config(
    style: &Style,
    io: &KeywordIo,
    config: &KeywordConfig,
    config_path: Option<&Path>,
    db_override: bool,
    action: ConfigAction,
) -> Result<(), KeywordError> {
    match action {
        ConfigAction::Show { json } => {
            handle_config_show(style, io, config, config_path, db_override, json)
        }
    }
}

/// Show the resolved configuration and where each value came from.
fn handle_config_show(
    style: &Style,
    io: &KeywordIo,
    config: &KeywordConfig,
    config_path: Option<&Path>,
    db_override: bool,
    json: bool,
) -> Result<(), KeywordError> {
    let config_file = config_path
        .map(Path::to_path_buf)
        .or_else(KeywordConfig::default_path);
    let config_exists = config_file.as_deref().is_some_and(Path::exists);
    let db_source = if db_override {
        DbPathSource::Override
    } else {
        config.resolve_db_path(None).1
    };

    if json {
        let value = json!({
            "configFile": config_file,
            "configFileExists": config_exists,
            "keywordDbPath": io.keyword_db_path(),
            "keywordDbPathSource": db_source,
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{}",
        style.message(MessageType::Info, "Resolved configuration:")
    );
    let file_label = match &config_file {
        Some(path) if config_exists => path.display().to_string(),
        Some(path) => format!("{} (not found, using defaults)", path.display()),
        None => "(home directory unknown, using defaults)".to_string(),
    };
    println!("{}", style.message_detail("Config file", &file_label));
    println!(
        "{}",
        style.message_detail(
            "Keyword database",
            &format!("{} ({})", io.keyword_db_path().display(), db_source)
        )
    );
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_hash(s: &str) -> Result<DatasourceHash, KeywordError> {
    DatasourceHash::parse(s).ok_or_else(|| {
        KeywordError::InvalidParameter(format!(
            "`{}` is not a datasource hash (expected 32 hex characters)",
            s
        ))
    })
}

/// Parse `KEY=VALUE` assignments. Later assignments win.
fn parse_assignments(assignments: &[String]) -> Result<Keywords, KeywordError> {
    let mut keywords = Keywords::new();
    for assignment in assignments {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            KeywordError::InvalidParameter(format!("expected KEY=VALUE, got `{}`", assignment))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(KeywordError::InvalidParameter(format!(
                "empty keyword name in `{}`",
                assignment
            )));
        }
        keywords.insert(key, value);
    }
    Ok(keywords)
}
