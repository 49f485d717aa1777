//! canvas-pacer - live view of a clock simulation with paced repaints.

use anyhow::{Context, Result};
use canvas_pacer::render::ui::{CanvasRenderer, ColorTheme, HeadlessRenderer, TerminalCanvas};
use canvas_pacer::{Application, PacerConfig};
use clap::{value_parser, Arg, ArgMatches, Command};
use std::time::Duration;

fn cli() -> Command {
    Command::new("canvas-pacer")
        .version(canvas_pacer::VERSION)
        .about("Live clock-simulation canvas with coalesced, rate-limited repaints")
        .arg(
            Arg::new("tick-hz")
                .long("tick-hz")
                .help("Initial simulation tick rate in Hz")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .help("Use one fixed repaint interval instead of the default rotation")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Load settings from a TOML file (requires the `config` feature)"),
        )
        .arg(
            Arg::new("headless")
                .long("headless")
                .value_name("SECS")
                .help("Run without a terminal for the given number of seconds and print statistics")
                .value_parser(value_parser!(u64)),
        )
}

fn load_config(matches: &ArgMatches) -> Result<PacerConfig> {
    let mut config = match matches.get_one::<String>("config") {
        #[cfg(feature = "config")]
        Some(path) => PacerConfig::load(std::path::Path::new(path))?,
        #[cfg(not(feature = "config"))]
        Some(_) => anyhow::bail!("--config requires building with the `config` feature"),
        #[cfg(feature = "config")]
        None => PacerConfig::load_default()?,
        #[cfg(not(feature = "config"))]
        None => PacerConfig::default(),
    };

    if let Some(&tick_hz) = matches.get_one::<u32>("tick-hz") {
        config = config.with_tick_hz(tick_hz);
    }
    if let Some(&interval_ms) = matches.get_one::<u64>("interval-ms") {
        config = config.with_fixed_interval(interval_ms);
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=canvas_pacer=trace for coordinator decisions)
    env_logger::init();

    let matches = cli().get_matches();
    let config = load_config(&matches).context("invalid configuration")?;

    if let Some(&secs) = matches.get_one::<u64>("headless") {
        let renderer: Box<dyn CanvasRenderer> = Box::new(HeadlessRenderer::default());
        let mut app = Application::new(config, renderer)?;
        let summary = app.run_for(Duration::from_secs(secs)).await?;
        println!("{summary}");
        return Ok(());
    }

    let renderer: Box<dyn CanvasRenderer> =
        Box::new(TerminalCanvas::with_theme(ColorTheme::from_name(config.theme))?);
    let mut app = Application::new(config, renderer)?;
    let summary = app.run().await?;
    println!("{summary}");

    Ok(())
}
