/// Hand3D Terminal - Interactive jointed hand
///
/// Renders the hand model as ASCII art with one slider per joint.
/// Controls:
///   - Up/Down: Select a slider
///   - Left/Right, PgUp/PgDn: Move the selected slider
///   - WASD, +/-: Orbit and zoom the camera, P: Toggle perspective
///   - R: Reset pose, C: Reset camera, Q/ESC: Quit
use anyhow::Context;
use clap::Parser;
use hand3d_core::{ChannelBank, Hand, PoseController, PoseScript, Tuning};
use hand3d_terminal::TerminalApp;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hand3d-terminal", about = "Jointed 3D hand driven by sliders", version)]
struct Cli {
    /// JSON file overriding the pose tuning constants
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Pose script replayed before the first frame
    #[arg(long)]
    pose: Option<PathBuf>,

    /// Print a single frame to stdout and exit
    #[arg(long)]
    snapshot: bool,

    /// Snapshot width in columns
    #[arg(long, default_value_t = 100)]
    width: u16,

    /// Snapshot height in rows
    #[arg(long, default_value_t = 40)]
    height: u16,

    /// Write logs here instead of stderr (stderr is hidden while rendering)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref(), !cli.snapshot)?;

    info!("hand3d-terminal v{} starting", env!("CARGO_PKG_VERSION"));

    let tuning = match &cli.tuning {
        Some(path) => Tuning::load(path).with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };

    let mut hand = Hand::build();
    let mut bank = ChannelBank::new(&hand, PoseController::new(tuning));

    if let Some(path) = &cli.pose {
        let script = PoseScript::load(path).with_context(|| format!("loading pose from {}", path.display()))?;
        script.apply(&mut bank, &mut hand);
    }

    if cli.snapshot {
        for line in hand3d_terminal::snapshot(&hand, cli.width, cli.height) {
            println!("{}", line.trim_end());
        }
        if let Some(status) = bank.last_status() {
            println!("{status}");
        }
        return Ok(());
    }

    let mut app = TerminalApp::new(hand, bank)?;
    app.run()?;

    info!("hand3d-terminal exiting");
    Ok(())
}

/// Logs go to `log_file` when given. Without one, the interactive UI stays
/// quiet unless RUST_LOG asks for output, since stderr shares the screen.
fn init_tracing(log_file: Option<&PathBuf>, interactive: bool) -> anyhow::Result<()> {
    let default_filter = if log_file.is_none() && interactive {
        "off"
    } else {
        "hand3d_core=info,hand3d_terminal=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
