use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use search_auth::{
    domain::{
        connection::{TlsVerification, DEFAULT_TIMEOUT},
        token::SystemClock,
    },
    drivers::{
        logging::{self, LogFormat},
        verify::VerifyConfig,
    },
};
use serde::Deserialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[arg(short, long, help = "Cli config path file", env = "CLI_CONFIG")]
    config: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Cli, env = "LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Clone)]
pub struct VerifyArgs {
    /// json file with `access_token` and `expires_at`, anonymous check when omitted
    #[arg(long)]
    pub token_file: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct TokensArgs {
    /// directory holding token json files
    pub directory: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the search backend is reachable and accepts the token
    Verify(VerifyArgs),

    /// Show the expiry state of every token file in a directory
    Tokens(TokensArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.log_format);

    match cli.command {
        Commands::Verify(args) => {
            let config = Config::new(cli.config.as_deref())?;
            let result = search_auth::drivers::verify::verify(
                config.into(),
                &SystemClock,
                args.token_file.as_deref(),
            )
            .await?;

            search_auth::drivers::verify::log_outcome(&result);

            if !result.is_authenticated() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Tokens(args) => {
            let statuses =
                search_auth::drivers::verify::inspect_tokens(&args.directory, &SystemClock)?;
            for status in statuses {
                let expires_at = status
                    .expires_at
                    .map(|value| value.to_rfc3339())
                    .unwrap_or_else(|| "never".into());
                let state = if status.expired { "expired" } else { "valid" };
                println!("{}\t{state}\t{expires_at}", status.name);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, Deserialize)]
struct Config {
    host_url: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default)]
    accept_invalid_certs: bool,
    #[serde(default)]
    collect_mode: bool,
    collector_url: Option<String>,
}
impl Config {
    pub fn new(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        let config: Self = builder
            .add_source(config::Environment::with_prefix("SEARCH_AUTH").try_parsing(true))
            .build()?
            .try_deserialize()?;

        if config.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }

        Ok(config)
    }
}

impl From<Config> for VerifyConfig {
    fn from(value: Config) -> Self {
        Self {
            host_url: value.host_url,
            timeout: Duration::from_secs(value.timeout_secs),
            tls: if value.accept_invalid_certs {
                TlsVerification::DangerAcceptInvalidCerts
            } else {
                TlsVerification::Verify
            },
            collect_mode: value.collect_mode,
            collector_url: value.collector_url,
        }
    }
}
