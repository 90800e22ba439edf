use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use swarmhive_lib::app::{App, ConfigSource, RunOptions};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Legacy scene JSON (requires --queens-json)
    #[arg(long, requires = "queens_json")]
    scene_json: Option<PathBuf>,

    /// Legacy queen JSON (requires --scene-json)
    #[arg(long, requires = "scene_json")]
    queens_json: Option<PathBuf>,

    /// Stop after this many ticks
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Stop after this many seconds
    #[arg(short, long)]
    seconds: Option<u64>,

    /// Override the configured frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Write a JSON run summary here on exit
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    swarmhive_core::init_logging();
    let args = Args::parse();

    let source = match (args.scene_json, args.queens_json) {
        (Some(scene), Some(queens)) => ConfigSource::LegacyJson { scene, queens },
        _ => ConfigSource::Toml(args.config),
    };
    let options = RunOptions {
        ticks: args.ticks,
        seconds: args.seconds,
        fps: args.fps,
        summary_path: args.summary,
    };

    let app = App::new(&source, options)?;
    let summary = app.run().await?;
    println!(
        "Finished after {} ticks: {} queens, {} workers, {} food",
        summary.ticks, summary.counts.queens, summary.counts.workers, summary.counts.food
    );
    Ok(())
}
