//! Command-line interface for typeahead
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and command-line overrides
//! - Resolving a lookup from the config file and/or flags
//! - Running the subcommands (build, reconcile, search, config)

pub mod completion;

use clap::{Args, CommandFactory, Parser, Subcommand};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Config, LogLevel, LookupConfig, OutputFormat};
use crate::engine::Phase;
use crate::error::{ConfigError, LookupError, Result};
use crate::formatter::{Colorizer, Formatter, ResultData};
use crate::lookup::LookupController;
use crate::model::{FieldRole, FieldSpec, Record};
use crate::reconcile;
use crate::source::{MemorySource, PageSource};

/// Key of the match-all entry in a capture file
pub const MATCH_ALL_KEY: &str = "*";

/// Typeahead - incremental lookup engine for paginated remote queries
#[derive(Parser, Debug)]
#[command(
    name = "typeahead",
    version,
    about = "Incremental search and pagination engine for lookup controls",
    long_about = "Builds search predicates from typed text, replays lookups against captured
server answers, and reconciles free text with a window of records."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Output format (json, json-pretty, table)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Lookup selection shared by the subcommands
///
/// Flags override the named lookup field by field.
#[derive(Args, Debug, Default, Clone)]
pub struct LookupArgs {
    /// Named lookup from the config file
    #[arg(short = 'l', long, value_name = "NAME")]
    pub lookup: Option<String>,

    /// Table the fields belong to
    #[arg(short = 't', long, value_name = "TABLE")]
    pub table: Option<String>,

    /// Field as NAME[:primary|:display|:aux][:hidden]; repeatable
    #[arg(short = 'f', long = "field", value_name = "FIELD")]
    pub fields: Vec<String>,

    /// Static predicate fragment, may contain $value; repeatable
    #[arg(long = "fragment", value_name = "SQL")]
    pub fragments: Vec<String>,

    /// Extra predicate OR-ed with the derived one
    #[arg(long = "where", value_name = "SQL")]
    pub additional_where: Option<String>,

    /// Sort expression passed through to the source
    #[arg(long, value_name = "SQL")]
    pub order_by: Option<String>,

    /// Records per page
    #[arg(long, value_name = "N")]
    pub page_size: Option<u32>,
}

/// Subcommands for typeahead
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the first-page request for some search text
    Build {
        /// Search text as typed
        #[arg(value_name = "TEXT")]
        text: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Resolve free text against a saved window of records
    Reconcile {
        /// Text as typed
        #[arg(value_name = "TEXT")]
        text: String,

        /// JSON file holding an array of records or a page response
        #[arg(short = 'w', long, value_name = "FILE")]
        window: PathBuf,

        /// Named lookup providing the display and key fields
        #[arg(short = 'l', long, value_name = "NAME")]
        lookup: Option<String>,

        /// Field compared with the text
        #[arg(long, value_name = "FIELD")]
        field: Option<String>,

        /// Field used as selection key
        #[arg(long, value_name = "FIELD")]
        key: Option<String>,
    },

    /// Type text into a lookup answered from captured responses
    Search {
        /// Search text as typed
        #[arg(value_name = "TEXT")]
        text: String,

        /// JSON object mapping filters ("*" for none) to record arrays
        #[arg(long, value_name = "FILE")]
        capture: PathBuf,

        /// Number of pages to load
        #[arg(long, value_name = "N", default_value_t = 1)]
        pages: u32,

        /// Commit the text after loading and print the selection
        #[arg(long)]
        commit: bool,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,

        /// Write a default configuration file if none exists
        #[arg(long)]
        init: bool,

        /// List configured lookup names
        #[arg(long)]
        list_lookups: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;

        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args);

        Ok(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply CLI arguments to configuration
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        if let Some(format_str) = &args.format {
            config.display.format = Self::parse_output_format(format_str);
        }

        if args.no_color {
            config.display.color_output = false;
        }

        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Parse output format string
    fn parse_output_format(format_str: &str) -> OutputFormat {
        match format_str.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "json-pretty" | "jsonpretty" | "pretty" => OutputFormat::JsonPretty,
            "table" => OutputFormat::Table,
            _ => {
                eprintln!("Warning: Unknown format '{}', using default", format_str);
                OutputFormat::JsonPretty
            }
        }
    }

    /// Run the requested subcommand
    pub async fn run_command(&self) -> Result<()> {
        let Some(command) = &self.args.command else {
            CliArgs::command().print_help()?;
            return Ok(());
        };

        match command {
            Commands::Build { text, lookup } => {
                let lookup = self.resolve_lookup(lookup)?;
                let data = self.build(text, &lookup);
                self.print(&data, &lookup)
            }
            Commands::Reconcile {
                text,
                window,
                lookup,
                field,
                key,
            } => {
                let data = self.reconcile(
                    text,
                    window,
                    lookup.as_deref(),
                    field.as_deref(),
                    key.as_deref(),
                )?;
                self.print(&data, &LookupConfig::default())
            }
            Commands::Search {
                text,
                capture,
                pages,
                commit,
                lookup,
            } => {
                let lookup = self.resolve_lookup(lookup)?;
                let source = read_capture(capture)?;
                let data = self.search(source, &lookup, text, *pages, *commit).await;
                self.print(&data, &lookup)
            }
            Commands::Version => {
                self.show_version();
                Ok(())
            }
            Commands::Completion { shell } => completion::generate_completion(shell),
            Commands::Config {
                show,
                validate,
                init,
                list_lookups,
            } => self.handle_config_command(*show, *validate, *init, *list_lookups),
        }
    }

    /// Merge a named lookup with command-line overrides
    ///
    /// # Arguments
    /// * `args` - Lookup flags
    ///
    /// # Returns
    /// * `Result<LookupConfig>` - Effective lookup or error
    pub fn resolve_lookup(&self, args: &LookupArgs) -> Result<LookupConfig> {
        let mut lookup = match &args.lookup {
            Some(name) => self.config.lookup(name)?.clone(),
            None if args.table.is_none() => {
                return Err(ConfigError::MissingField("--lookup or --table".to_string()).into());
            }
            None => LookupConfig::default(),
        };

        if let Some(table) = &args.table {
            lookup.table = table.clone();
        }
        if !args.fields.is_empty() {
            lookup.fields = args
                .fields
                .iter()
                .map(|field| parse_field_spec(field))
                .collect::<Result<Vec<_>>>()?;
        }
        if !args.fragments.is_empty() {
            lookup.static_fragments = args.fragments.clone();
        }
        if args.additional_where.is_some() {
            lookup.additional_where = args.additional_where.clone();
        }
        if args.order_by.is_some() {
            lookup.order_by = args.order_by.clone();
        }
        if let Some(page_size) = args.page_size {
            if page_size == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "--page-size".to_string(),
                    value: "0".to_string(),
                }
                .into());
            }
            lookup.page_size = Some(page_size);
        }

        if let Some(reason) = lookup.diagnose() {
            warn!("Lookup on '{}' is degenerate: {}", lookup.table, reason);
        }
        Ok(lookup)
    }

    /// Build the first-page descriptor for `text`
    fn build(&self, text: &str, lookup: &LookupConfig) -> ResultData {
        ResultData::Descriptor(lookup.descriptor(text, &self.config.engine))
    }

    /// Reconcile `text` against the records saved in `window`
    fn reconcile(
        &self,
        text: &str,
        window: &Path,
        lookup: Option<&str>,
        field: Option<&str>,
        key: Option<&str>,
    ) -> Result<ResultData> {
        let named = lookup.map(|name| self.config.lookup(name)).transpose()?;

        let display = field
            .or_else(|| named.and_then(LookupConfig::display_field))
            .ok_or_else(|| ConfigError::MissingField("--field".to_string()))?;
        let key = key
            .or_else(|| named.and_then(LookupConfig::primary_field))
            .unwrap_or(display);

        let records = read_window(window)?;
        Ok(ResultData::Selection(reconcile::reconcile_with(
            text, &records, display, key,
        )))
    }

    /// Drive a lookup controller the way an input control would
    ///
    /// Focus, type `text`, wait for the first page, then request up to
    /// `pages - 1` more.
    async fn search<S: PageSource + 'static>(
        &self,
        source: S,
        lookup: &LookupConfig,
        text: &str,
        pages: u32,
        commit: bool,
    ) -> ResultData {
        let mut controller =
            LookupController::new(Arc::new(source), lookup.clone(), &self.config.engine);
        controller.on_focus();
        controller.on_text_change(text);

        if !text.trim().is_empty() {
            settle(&mut controller).await;
            for _ in 1..pages {
                if !controller.on_request_more() {
                    break;
                }
                settle(&mut controller).await;
            }
        }

        let state = controller.state();
        if let Some(error) = &state.error {
            warn!("Lookup request failed: {}", error);
        }
        info!(
            "Loaded {} of {} record(s)",
            state.fetched_count, state.total_count
        );

        let data = if commit {
            ResultData::Selection(controller.on_commit(text))
        } else {
            ResultData::Records(state.window().to_vec())
        };
        controller.dispose();
        data
    }

    /// Print result data in the configured format
    fn print(&self, data: &ResultData, lookup: &LookupConfig) -> Result<()> {
        let leading = lookup.fields.iter().map(|field| field.name.clone()).collect();
        let formatter = Formatter::from_config(&self.config.display).with_leading_columns(leading);
        println!("{}", formatter.format(data)?);
        Ok(())
    }

    /// Show version information
    fn show_version(&self) {
        println!("typeahead version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    fn handle_config_command(
        &self,
        show: bool,
        validate: bool,
        init: bool,
        list_lookups: bool,
    ) -> Result<()> {
        if init {
            self.init_config_file()?;
        }

        if validate {
            self.validate_config_file();
        }

        if show {
            self.show_config()?;
        }

        if list_lookups {
            for name in self.config.lookups.keys() {
                println!("{}", name);
            }
        }

        Ok(())
    }

    /// Write the default configuration unless a file is already there
    fn init_config_file(&self) -> Result<()> {
        let colors = self.colorizer();
        let path = self.get_config_path();
        if path.exists() {
            println!(
                "{}",
                colors.warning(&format!("Configuration file already exists: {}", path.display()))
            );
            return Ok(());
        }

        Config::default().save(&path)?;
        println!(
            "{}",
            colors.success(&format!("Wrote default configuration to {}", path.display()))
        );
        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) {
        let colors = self.colorizer();
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("{}", colors.error("Configuration file does not exist"));
            return;
        }

        match Config::from_file(&path) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("{}", colors.success("Configuration is valid")),
                Err(e) => println!(
                    "{}",
                    colors.error(&format!("Configuration validation failed: {}", e))
                ),
            },
            Err(e) => println!(
                "{}",
                colors.error(&format!("Failed to load configuration: {}", e))
            ),
        }
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let colors = self.colorizer();
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("{}", colors.heading("=== Effective Configuration ==="));
        println!();
        println!("{}", toml::to_string_pretty(&self.config)?);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }

    fn colorizer(&self) -> Colorizer {
        Colorizer::new(self.config.display.color_output)
    }
}

/// Wait until the current request settles or the engine goes away
async fn settle<S: PageSource + 'static>(controller: &mut LookupController<S>) {
    while controller.changed().await {
        if controller.state().phase == Phase::Ready {
            break;
        }
    }
}

/// Parse `NAME[:role][:hidden]`
///
/// # Arguments
/// * `spec` - Field flag value
///
/// # Returns
/// * `Result<FieldSpec>` - Parsed field or error
pub fn parse_field_spec(spec: &str) -> Result<FieldSpec> {
    let mut parts = spec.split(':');
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "--field".to_string(),
            value: spec.to_string(),
        }
        .into());
    }

    let mut field = FieldSpec::new(name);
    for modifier in parts {
        match modifier.trim().to_lowercase().as_str() {
            "primary" => field.role = FieldRole::Primary,
            "display" => field.role = FieldRole::Display,
            "aux" => field.role = FieldRole::Aux,
            "hidden" => field.visible = false,
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: "--field".to_string(),
                    value: spec.to_string(),
                }
                .into());
            }
        }
    }
    Ok(field)
}

/// Read a window file: an array of records, or an object with `items`
pub fn read_window(path: &Path) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Array(items) => items.into_iter().map(into_record).collect(),
        Value::Object(mut object) => match object.remove("items") {
            Some(Value::Array(items)) => items.into_iter().map(into_record).collect(),
            _ => Err(LookupError::Generic(format!(
                "{}: expected an 'items' array",
                path.display()
            ))),
        },
        _ => Err(LookupError::Generic(format!(
            "{}: expected an array of records",
            path.display()
        ))),
    }
}

/// Read a capture file into a memory source
///
/// The file maps each filter string to the records it answers with;
/// [`MATCH_ALL_KEY`] stands for requests without a filter.
pub fn read_capture(path: &Path) -> Result<MemorySource> {
    let content = fs::read_to_string(path)?;
    let capture: HashMap<String, Vec<Value>> = serde_json::from_str(&content)?;

    let source = MemorySource::new();
    for (filter, items) in capture {
        let records = items
            .into_iter()
            .map(into_record)
            .collect::<Result<Vec<_>>>()?;
        let filter = (filter != MATCH_ALL_KEY).then_some(filter);
        source.insert(filter.as_deref(), records);
    }
    Ok(source)
}

fn into_record(value: Value) -> Result<Record> {
    match value {
        Value::Object(record) => Ok(record),
        other => Err(LookupError::Generic(format!(
            "Records must be JSON objects, got: {}",
            other
        ))),
    }
}
