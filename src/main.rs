#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use lexdoc::app_config::{self, Config, InterfaceLanguage};
use lexdoc::app_controller::Controller;
use lexdoc::language_utils::Language;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract, summarize and annotate a PDF
    Analyze {
        /// PDF document to analyze
        #[arg(value_name = "PDF")]
        input_path: PathBuf,
    },

    /// Translate a PDF into another supported language
    Translate {
        /// PDF document to translate
        #[arg(value_name = "PDF")]
        input_path: PathBuf,

        /// Target language name or code (e.g. 'en', 'arabic', 'zh')
        #[arg(short, long)]
        target: String,
    },

    /// Detect the language of a PDF
    Detect {
        /// PDF document to inspect
        #[arg(value_name = "PDF")]
        input_path: PathBuf,
    },

    /// List supported languages
    Languages,

    /// Generate shell completions for lexdoc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// lexdoc - PDF document intelligence for Arabic and multilingual legal text
#[derive(Parser, Debug)]
#[command(name = "lexdoc")]
#[command(version)]
#[command(about = "Extract, summarize and translate Arabic and multilingual PDF documents")]
#[command(long_about = "lexdoc extracts text from searchable or scanned PDFs, summarizes it and
translates it between Arabic, English, Chinese, Hindi and Urdu using a local Ollama server.

EXAMPLES:
    lexdoc analyze contract.pdf                     # Summary and legal annotations as JSON
    lexdoc analyze contract.pdf -o result.json      # Write the result to a file
    lexdoc translate contract.pdf --target en       # Translate into English
    lexdoc detect scan.pdf                          # Print the document language
    lexdoc --log-level debug analyze contract.pdf   # Verbose logging
    lexdoc completions bash > lexdoc.bash           # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

REQUIREMENTS:
    A running Ollama server, plus pdftoppm (poppler) and tesseract with the
    Arabic language pack for scanned documents.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Model used by every stage
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Ollama endpoint (e.g. http://localhost:11434)
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Language of progress messages ('ar' or 'en')
    #[arg(long, global = true)]
    interface_language: Option<InterfaceLanguage>,

    /// Write JSON output to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Save JSON next to the input (e.g. contract.analysis.json) when no --output is given
    #[arg(short, long, global = true)]
    save: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "lexdoc", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    let output = cli.output.as_deref();

    match &cli.command {
        Commands::Analyze { input_path } => {
            let output = Controller::output_path_for(input_path, "analysis", output, cli.save);
            controller.run_analyze(input_path, output.as_deref()).await?;
        }
        Commands::Translate { input_path, target } => {
            let target = Language::parse(target)?;
            let output = Controller::output_path_for(input_path, target.code(), output, cli.save);
            controller.run_translate(input_path, target, output.as_deref()).await?;
        }
        Commands::Detect { input_path } => {
            controller.run_detect(input_path).await?;
        }
        Commands::Languages => {
            println!("{}", controller.run_languages());
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load or create the configuration, then apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let config_path = Path::new(&cli.config);
    let mut config = if config_path.exists() {
        Config::from_file(config_path).context(format!("Failed to load config file: {}", cli.config))?
    } else {
        warn!("Config file not found at '{}', creating default config.", cli.config);
        let config = Config::default();
        config
            .save(config_path)
            .context(format!("Failed to write default config to file: {}", cli.config))?;
        config
    };

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    if let Some(model) = &cli.model {
        config.summarization.model = model.clone();
        config.translation.default_model = model.clone();
        config.agent.model = model.clone();
    }

    if let Some(endpoint) = &cli.endpoint {
        config.provider.endpoint = endpoint.clone();
    }

    if let Some(language) = cli.interface_language {
        config.interface_language = language;
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}
