mod commands;

use clap::{Parser, Subcommand};
use radio_project::config::Config;
use radio_project::platform;
use std::path::PathBuf;
use tracing::info;

/// Edit TuneInCrew radio projects and build them.
#[derive(Parser, Debug)]
#[command(name = "radio-builder", version)]
struct Cli {
    /// Project XML file to work on
    #[arg(short, long, global = true, value_name = "FILE")]
    project: Option<PathBuf>,

    /// Use this config file instead of the one in the config directory
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log to stderr instead of the log file
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a project file from the configured defaults
    New {
        file: PathBuf,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the project
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Change project-level fields
    Set {
        #[arg(long)]
        fmod: Option<String>,
        /// Radio id, cut to 4 characters
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Logo image (.dds)
        #[arg(long)]
        logo: Option<String>,
    },
    AddJingle {
        path: String,
    },
    RemoveJingle {
        index: usize,
    },
    /// Add a song; fields not given are read from the file's tags
    AddSong {
        path: String,
        #[command(flatten)]
        fields: commands::SongFields,
    },
    /// Edit a song; a new --file refills empty fields from its tags
    EditSong {
        index: usize,
        #[arg(long)]
        file: Option<String>,
        #[command(flatten)]
        fields: commands::SongFields,
    },
    RemoveSong {
        index: usize,
    },
    /// List songs whose "name artist" contains QUERY
    Search {
        query: String,
        #[arg(short = 'c', long)]
        case_sensitive: bool,
        /// Save afterwards. Songs hidden by the search are left out of the file.
        #[arg(long)]
        save: bool,
    },
    /// Save the project under a new name
    Export {
        file: PathBuf,
    },
    /// Print the metadata read from an audio file
    Meta {
        file: PathBuf,
    },
    /// Build the project with TuneInCrew
    Run {
        /// TuneInCrew executable. Remembered for later runs.
        #[arg(long, value_name = "EXE")]
        tool: Option<PathBuf>,
    },
    /// Show or change the configuration
    Config {
        /// Remember a TuneInCrew executable
        #[arg(long, value_name = "EXE")]
        tool: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) -> anyhow::Result<Option<PathBuf>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,radio_project=info"));

    if verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
        return Ok(None);
    }

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("radio-builder.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    Ok(Some(log_path))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_path) = init_logging(cli.verbose)? {
        info!("Log file: {:?}", log_path);
    }

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)?;
    info!("Config loaded from: {:?}", config_path);

    let mut app = commands::App {
        project: cli.project,
        config,
        config_path,
    };

    commands::dispatch(&mut app, cli.command).await
}
