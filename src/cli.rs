use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum FormatArg {
    Css,
    Hex,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "lightswatch",
    version,
    about = "Lighting device list with color temperature swatches"
)]
pub struct Opts {
    /// Increase log verbosity (repeat for more). RUST_LOG overrides.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert color temperatures (K) to display colors
    Convert {
        /// Temperatures in Kelvin
        #[arg(required = true, allow_negative_numbers = true)]
        kelvin: Vec<f64>,

        #[arg(short = 'f', long = "format", value_enum, default_value_t = FormatArg::Css)]
        format: FormatArg,
    },

    /// Fetch the device list and print it as a table
    List(ListOpts),

    /// Answer JSON commands on stdin, one per line
    Serve,
}

#[derive(Args, Debug, Clone)]
pub struct ListOpts {
    /// Gateway host[:port] or full details URL
    #[arg(short = 'u', long = "url", env = "LIGHTSWATCH_URL")]
    pub url: Option<String>,

    /// Read the device details document from a file instead (wins over --url)
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Print rows as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Do not paint color cells
    #[arg(long = "no-swatch")]
    pub no_swatch: bool,

    /// Refresh every N seconds until interrupted
    #[arg(short = 'w', long = "watch", value_parser = clap::value_parser!(u64).range(1..))]
    pub watch: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(short = 't', long = "timeout", default_value_t = 10)]
    pub timeout: u64,
}
