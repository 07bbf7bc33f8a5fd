use anyhow::{Context, Result};
use clap::Parser;
use std::time::{Duration, Instant};
use tracing::info;

use fishtank::camera::CaptureWorker;
use fishtank::config::Config;
use fishtank::frame_loop::FrameLoop;
use fishtank::projection::OffAxisProjector;
use fishtank::render::{Key, MinifbRenderer, Scene};
use fishtank::tracker::TrackingSession;

#[derive(Parser, Debug)]
#[command(name = "fishtank", about = "Head-coupled off-axis projection demo")]
struct Cli {
    /// Config file (TOML)
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Camera device index (overrides config)
    #[arg(long)]
    camera: Option<i32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fishtank=info".into()),
        )
        .init();

    let mut config = Config::load_or_default(&cli.config);
    if let Some(index) = cli.camera {
        config.camera.index = index;
    }
    config.validate().context("Invalid config")?;

    info!("fishtank ({})", env!("GIT_VERSION"));
    let (hw, hh) = config.screen_half_extents();
    info!(
        "Screen: {:.1}x{:.1} cm, viewer distance {} cm, alpha {}, gain {}",
        hw * 2.0,
        hh * 2.0,
        config.viewer.default_distance_cm,
        config.smooth.alpha,
        config.tracker.movement_gain
    );

    // カメラとレンダラーは起動時に一度だけ確保し、終了時に drop で解放する
    let worker = CaptureWorker::start(&config)?;
    let renderer = MinifbRenderer::new(&config.window, Scene::new(&config.scene))?;

    let mut frame_loop = FrameLoop::new(
        TrackingSession::from_config(&config),
        OffAxisProjector::from_config(&config),
        worker,
        renderer,
    );
    let trigger = frame_loop.trigger();

    info!("Press 'C' to calibrate, Esc to quit.");

    let frame_duration = Duration::from_secs_f64(1.0 / config.app.target_fps as f64);
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();

    while frame_loop.renderer().is_open() {
        let loop_start = Instant::now();

        if frame_loop.renderer().is_key_pressed(Key::C) {
            trigger.request();
        }

        let out = frame_loop.tick()?;

        // ログ（1秒に1回）
        frame_count += 1;
        let elapsed = fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            info!(
                "FPS: {:.1} | eye [{:.1}, {:.1}, {:.1}] cm | {:?}{}",
                frame_count as f32 / elapsed,
                out.pose.x_cm,
                out.pose.y_cm,
                out.pose.z_cm,
                out.update,
                if frame_loop.session().is_calibrated() { " [CAL]" } else { "" }
            );
            frame_count = 0;
            fps_timer = Instant::now();
        }

        if let Some(rest) = frame_duration.checked_sub(loop_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    info!("Shutting down...");
    Ok(())
}
