use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};

use crate::inject::ApiKey;

pub const DOCUMENT_NAME: &str = "index.html";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Parser)]
#[command(
    name = "mapkey",
    version,
    about = "Inject the Google Maps API key into a static site before deployment."
)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Google Maps API key. Falls back to GOOGLE_MAPS_API_KEY env var.
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory holding the site's index.html.
    #[arg(long, env = "MAPKEY_SITE_DIR", default_value = ".")]
    pub site_dir: PathBuf,

    /// Fail instead of writing the placeholder key back when no key is set.
    #[arg(long, env = "MAPKEY_STRICT", value_parser = FalseyValueParser::new())]
    pub strict: bool,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, env = "MAPKEY_LOG", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the site directory over HTTP with permissive CORS headers for local preview.
    Serve(ServeArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Address to bind the preview server to.
    #[arg(long, env = "MAPKEY_BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Port to bind the preview server to.
    #[arg(long, env = "MAPKEY_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Open the index page in the default browser once listening.
    #[arg(long)]
    pub open: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: ApiKey,
    pub site_dir: PathBuf,
    pub strict: bool,
    pub log_level: String,
    pub mode: Mode,
}

#[derive(Debug, Clone)]
pub enum Mode {
    Inject,
    Serve(ServeOptions),
}

#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub bind: IpAddr,
    pub port: u16,
    pub open_browser: bool,
}

impl Config {
    pub fn from_cli() -> Result<Self> {
        let cli = Cli::parse();
        Config::from_parts(cli.common, cli.command)
    }

    pub fn from_parts(common: CommonArgs, command: Option<Command>) -> Result<Self> {
        if common.log_level.trim().is_empty() {
            return Err(anyhow!("log level must not be empty"));
        }

        let mode = match command {
            Some(Command::Serve(args)) => {
                if !common.site_dir.is_dir() {
                    return Err(anyhow!(
                        "site directory {} does not exist",
                        common.site_dir.display()
                    ));
                }
                Mode::Serve(ServeOptions {
                    bind: args.bind,
                    port: args.port,
                    open_browser: args.open,
                })
            }
            None => Mode::Inject,
        };

        Ok(Self {
            api_key: ApiKey::resolve(common.api_key),
            site_dir: common.site_dir,
            strict: common.strict,
            log_level: common.log_level,
            mode,
        })
    }

    /// The one file the injector rewrites.
    pub fn document_path(&self) -> PathBuf {
        self.site_dir.join(DOCUMENT_NAME)
    }

    pub fn serve_options(&self) -> Option<&ServeOptions> {
        if let Mode::Serve(opts) = &self.mode {
            Some(opts)
        } else {
            None
        }
    }
}
