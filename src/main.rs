mod cli;
mod color;
mod device;
mod error;
mod fetch;
mod ipc;
mod render;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use serde::Serialize;
use std::io::{IsTerminal, Write};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Command, FormatArg, ListOpts, Opts};
use color::{Rgb, convert};
use device::{Capability, Device};
use fetch::{Loader, Source, details_url};

#[derive(Serialize)]
struct Conversion {
    kelvin: f64,
    #[serde(flatten)]
    rgb: Rgb,
    css: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();
    init_logging(opts.verbose);

    match opts.command {
        Command::Convert { kelvin, format } => print_conversions(&kelvin, format),
        Command::List(list) => run_list(&list).await,
        Command::Serve => ipc::handle_stdin_commands().await,
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_conversions(kelvin: &[f64], format: FormatArg) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    for &k in kelvin {
        let rgb = convert(k);
        match format {
            FormatArg::Css => writeln!(stdout, "{k}\t{}", rgb.css())?,
            FormatArg::Hex => writeln!(stdout, "{k}\t{}", rgb.hex())?,
            FormatArg::Json => {
                let line = serde_json::to_string(&Conversion {
                    kelvin: k,
                    rgb,
                    css: rgb.css(),
                })?;
                writeln!(stdout, "{line}")?;
            }
        }
    }
    Ok(())
}

/// `--file` wins over `--url` so an exported LIGHTSWATCH_URL never shadows
/// a local document.
fn source(list: &ListOpts) -> Result<Source> {
    match (&list.file, &list.url) {
        (Some(path), _) => Ok(Source::File(path.clone())),
        (None, Some(url)) => Ok(Source::Http(details_url(url)?)),
        (None, None) => Err(anyhow!("Provide --url (or LIGHTSWATCH_URL) or --file")),
    }
}

#[derive(Debug)]
enum Refresh {
    Updated,
    Failed(error::Error),
}

/// Reload the device list into `last`. On failure `last` is left as it was
/// so the previous table stays on screen.
async fn refresh(loader: &Loader, source: &Source, last: &mut Option<Vec<Device>>) -> Refresh {
    match loader.load(source).await {
        Ok(devices) => {
            let tunable = devices
                .iter()
                .filter(|d| d.supports(Capability::Temperature))
                .count();
            info!(devices = devices.len(), tunable, "refreshed device list");
            *last = Some(devices);
            Refresh::Updated
        }
        Err(e) => Refresh::Failed(e),
    }
}

/// Run `work` to completion unless `interrupt` fires first, in which case
/// `work` is dropped and `None` returned.
async fn unless_interrupted<I, F>(interrupt: I, work: F) -> Result<Option<F::Output>>
where
    I: Future<Output = std::io::Result<()>>,
    F: Future,
{
    tokio::select! {
        res = interrupt => {
            res.context("listen for Ctrl-C")?;
            Ok(None)
        }
        out = work => Ok(Some(out)),
    }
}

async fn run_list(list: &ListOpts) -> Result<()> {
    let source = source(list)?;
    let loader = Loader::new(Duration::from_secs(list.timeout)).context("create HTTP client")?;

    let Some(every) = list.watch else {
        let devices = loader
            .load(&source)
            .await
            .with_context(|| format!("load devices from {}", source.describe()))?;
        return print_devices(&devices, list, false);
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(every));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut last = None;

    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                res.context("listen for Ctrl-C")?;
                info!("interrupted, stopping refresh");
                break;
            }
            _ = ticker.tick() => {
                let work = refresh(&loader, &source, &mut last);
                let Some(outcome) = unless_interrupted(&mut ctrl_c, work).await? else {
                    info!("interrupted during refresh, stopping");
                    break;
                };
                match (outcome, &last) {
                    (Refresh::Updated, Some(devices)) => print_devices(devices, list, true)?,
                    (Refresh::Failed(e), _) => {
                        warn!("Refreshing {} failed, keeping last table: {e}", source.describe());
                    }
                    (Refresh::Updated, None) => {}
                }
            }
        }
    }
    Ok(())
}

fn print_devices(devices: &[Device], list: &ListOpts, redraw: bool) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    let terminal = stdout.is_terminal();
    write_frame(&mut stdout, devices, list, redraw, terminal)
}

/// Write one rendering of the list. A redraw on a terminal clears the screen
/// first so the new table replaces the old one.
fn write_frame<W: Write>(
    out: &mut W,
    devices: &[Device],
    list: &ListOpts,
    redraw: bool,
    terminal: bool,
) -> Result<()> {
    if list.json {
        writeln!(out, "{}", render::render_json(devices)?)?;
        return Ok(());
    }

    let swatches = !list.no_swatch && terminal;
    let table = render::render_table(&render::rows(devices), swatches);
    if redraw && terminal {
        execute!(out, Clear(ClearType::All), MoveTo(0, 0)).context("clear terminal")?;
    }
    write!(out, "{table}")?;
    out.flush()?;
    Ok(())
}
