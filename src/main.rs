use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use simdash::api::{ServerConfig, run_http_server};
use simdash::core::ValidationMode;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliValidationMode {
    Strict,
    Relaxed,
}

impl From<CliValidationMode> for ValidationMode {
    fn from(value: CliValidationMode) -> Self {
        match value {
            CliValidationMode::Strict => ValidationMode::Strict,
            CliValidationMode::Relaxed => ValidationMode::Relaxed,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "simdash",
    about = "Dashboard API for financial simulation models (series classification + run configuration)"
)]
struct Cli {
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(
        long,
        default_value = "static",
        help = "Directory holding all-models.json, all-results.json and run-commands.json"
    )]
    data_dir: PathBuf,
    #[arg(
        long,
        value_enum,
        default_value_t = CliValidationMode::Relaxed,
        help = "Whether submitted model/input ids must exist in the catalog"
    )]
    validation: CliValidationMode,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = ServerConfig {
        data_dir: cli.data_dir,
        validation: cli.validation.into(),
    };

    if let Err(e) = run_http_server(cli.port, config).await {
        eprintln!("Server error: {e}");
        process::exit(1);
    }
}
