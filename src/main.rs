//! Flick launcher - runs the launcher core through a scripted home-screen session
//!
//! Shelf state is written to `$XDG_RUNTIME_DIR/flick/shelf.json` from a
//! background thread, the way the system UI would pick it up on a device.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flick_launcher::config::NavigationModeSetting;
use flick_launcher::device::DeviceProfile;
use flick_launcher::dispatch::{spawn_background, ShelfStateFile};
use flick_launcher::input::{FixedNavigationMode, NavigationModeProvider, Point};
use flick_launcher::model::{Container, FolderInfo, ItemInfo};
use flick_launcher::overview::TaskCard;
use flick_launcher::prediction::{HotseatPredictor, LoggingPredictor};
use flick_launcher::state::{ActivityFlags, VisualState};
use flick_launcher::{Launcher, LauncherConfig};

#[derive(Parser, Debug)]
#[command(name = "flick-launcher")]
#[command(about = "Flick launcher core session", long_about = None)]
struct Args {
    /// Config file (default: ~/.config/flick/launcher.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(short, long)]
    debug: bool,

    /// Override the system navigation mode
    #[arg(long, value_enum)]
    nav_mode: Option<NavigationModeSetting>,

    /// Start in landscape
    #[arg(long)]
    landscape: bool,

    /// Start in multi-window mode
    #[arg(long)]
    multi_window: bool,
}

/// `$XDG_STATE_HOME/flick`, `~/.local/state/flick`, or `/tmp/flick`
fn state_dir() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".local/state")))
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
        .join("flick")
}

/// Append panics to `crash.log` next to the regular logs
fn install_crash_log(dir: &Path) {
    let crash_log = dir.join("crash.log");
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let written = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&crash_log)
            .and_then(|mut f| {
                writeln!(f, "[{}] launcher panic: {}", chrono::Local::now().to_rfc3339(), panic_info)
            });
        if written.is_err() {
            eprintln!("crash.log not writable: {:?}", crash_log);
        }
        previous(panic_info);
    }));
}

/// stderr plus a daily launcher.log; the guard must outlive the session
fn init_logging(dir: &Path, debug: bool) -> WorkerGuard {
    let (file_writer, guard) = tracing_appender::non_blocking(rolling::daily(dir, "launcher.log"));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "debug" } else { "warn,flick_launcher=info" })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();
    guard
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_dir = state_dir();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Cannot create {:?}: {}", log_dir, e);
    }
    install_crash_log(&log_dir);
    let _log_guard = init_logging(&log_dir, args.debug);

    info!(log_dir = %log_dir.display(), "Flick launcher starting");

    let config_path = args.config.clone().unwrap_or_else(LauncherConfig::default_path);
    let config = LauncherConfig::load_or_default(&config_path);

    let navigation: Box<dyn NavigationModeProvider> = match args.nav_mode {
        Some(mode) => Box::new(FixedNavigationMode(mode.into())),
        None => config.navigation.provider(),
    };

    let mut profile = DeviceProfile::default().with_multi_window(args.multi_window);
    if args.landscape {
        profile = profile.rotated();
    }

    let (shelf, applier) = spawn_background(ShelfStateFile::new(ShelfStateFile::default_path()))?;
    let predictor: Option<Box<dyn HotseatPredictor>> = Some(Box::new(LoggingPredictor));

    let mut launcher = Launcher::new(config, navigation, profile, shelf, predictor);
    run_session(&mut launcher);
    launcher.on_destroy();

    applier.shutdown();
    info!("Flick launcher stopped");
    Ok(())
}

/// Bind, resume, gesture around, leave for an app and come back
fn run_session(launcher: &mut Launcher) {
    info!("Touch controllers: {:?}", launcher.touch_controllers());
    info!("Supported shortcuts: {:?}", launcher.supported_shortcuts());

    let apps = [
        ItemInfo::new(1, "Terminal", "xterm", Container::Hotseat),
        ItemInfo::new(2, "Calculator", "xcalc", Container::Hotseat),
    ];
    launcher.on_item_binding_finished();
    launcher.on_folder_created_from_item(
        &FolderInfo {
            id: 10,
            title: "Tools".to_string(),
            container: Container::Hotseat,
            contents: apps.to_vec(),
        },
        &apps[0],
    );

    launcher.set_activity_flags(ActivityFlags {
        started: true,
        resumed: true,
        window_focused: true,
        user_active: true,
        ..Default::default()
    });

    launcher.recents_mut().tasks.push(TaskCard::new(1, "Terminal", "xterm"));
    launcher.recents_mut().tasks.push(TaskCard::new(2, "Clock", "xclock"));

    let (width, height) = {
        let profile = launcher.device_profile();
        (profile.width_px as f64, profile.height_px as f64)
    };

    // Up from the middle of the workspace, then back down
    swipe(launcher, Point::new(width / 2.0, height * 0.6), 0.0, -height * 0.3, 400);
    swipe(launcher, Point::new(width / 2.0, height * 0.3), 0.0, height * 0.3, 400);
    launcher.go_to_state(VisualState::Normal);

    // Slow swipe up from the gesture bar, then dismiss a card in overview
    swipe(launcher, Point::new(width / 2.0, height - 10.0), 0.0, -height * 0.2, 1000);
    if launcher.state() == VisualState::Overview {
        swipe(launcher, Point::new(width / 2.0, 300.0), 0.0, -400.0, 300);
    }
    launcher.go_to_state(VisualState::Normal);

    // Status bar pull-down runs the configured handler
    swipe(launcher, Point::new(width / 2.0, 10.0), 0.0, 400.0, 300);

    launcher.start_activity_safely(&apps[1]);
    launcher.set_activity_flags(ActivityFlags::default());
    launcher.set_activity_flags(ActivityFlags {
        started: true,
        resumed: true,
        window_focused: true,
        user_active: true,
        ..Default::default()
    });

    info!(
        state = %launcher.state(),
        tasks = launcher.recents().tasks.len(),
        predictions = ?launcher.prediction_state(),
        "Session finished"
    );
}

fn swipe(launcher: &mut Launcher, from: Point, dx: f64, dy: f64, duration_ms: u64) {
    const STEPS: u64 = 10;
    let t0 = Instant::now();
    launcher.on_touch_down(from, t0);
    for step in 1..=STEPS {
        let f = step as f64 / STEPS as f64;
        launcher.on_touch_motion(
            Point::new(from.x + dx * f, from.y + dy * f),
            t0 + Duration::from_millis(duration_ms * step / STEPS),
        );
    }
    let action = launcher.on_touch_up();
    info!(?action, state = %launcher.state(), "Swipe finished");
}
