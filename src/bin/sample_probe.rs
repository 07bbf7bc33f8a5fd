//! 顔トラッキングの生の推定値を JSON Lines で標準出力に書き出す。
//! ゲインや既定距離の調整用。

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tracing::info;

use fishtank::camera::CaptureWorker;
use fishtank::config::Config;
use fishtank::viewer::RawSample;

#[derive(Parser, Debug)]
#[command(name = "sample_probe", about = "Print raw viewer samples as JSON lines")]
struct Cli {
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[arg(long)]
    camera: Option<i32>,

    /// Stop after this many seconds
    #[arg(long, default_value = "10")]
    seconds: u64,
}

#[derive(Serialize)]
struct Line {
    t_ms: u128,
    sequence: u64,
    sample: Option<RawSample>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fishtank=info,sample_probe=info".into()),
        )
        .init();

    let mut config = Config::load_or_default(&cli.config);
    if let Some(index) = cli.camera {
        config.camera.index = index;
    }
    config.validate().context("Invalid config")?;

    let worker = CaptureWorker::start(&config)?;
    let (w, h) = worker.resolution();
    info!("sample_probe ({}) camera {}x{}", env!("GIT_VERSION"), w, h);

    let started = Instant::now();
    let deadline = Duration::from_secs(cli.seconds);
    let mut last_sequence = 0;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    while started.elapsed() < deadline {
        let sequence = worker.sequence();
        if sequence == last_sequence {
            std::thread::sleep(Duration::from_millis(2));
            continue;
        }
        last_sequence = sequence;

        let line = Line {
            t_ms: started.elapsed().as_millis(),
            sequence,
            sample: worker.latest(),
        };
        serde_json::to_writer(&mut out, &line).context("Failed to write sample")?;
        writeln!(out)?;
    }

    Ok(())
}
