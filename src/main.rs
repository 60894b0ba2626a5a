//! cursorwrap - Cursor edge wrapping for asymmetric multi-monitor X11 setups
//!
//! Wraps the cursor around the outer edges of the monitor topology and warps
//! it across inner hard edges, window manager agnostic, driven by XInput2 raw
//! motion events.

mod backend;
mod config;
mod daemon;
mod screen;

use std::os::raw::c_int;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use backend::X11Backend;
use config::Config;
use daemon::Daemon;

/// Wrap the X cursor around the edges of asymmetric multi-monitor setups
#[derive(Parser)]
#[command(name = "cursorwrap")]
#[command(version)]
#[command(about = "Wrap the cursor around screen edges on multi-monitor X11 setups", long_about = None)]
struct Cli {
    /// Enable cursor wrapping on the x-axis
    #[arg(short = 'x', long)]
    wrap_x: bool,

    /// Enable cursor wrapping on the y-axis
    #[arg(short = 'y', long)]
    wrap_y: bool,

    /// Enable snapping across inner hard edges on both axes
    #[arg(short = 's', long)]
    snap: bool,

    /// Enable snapping on the x-axis only
    #[arg(long)]
    snap_x: bool,

    /// Enable snapping on the y-axis only
    #[arg(long)]
    snap_y: bool,

    /// Pixels to shift the cursor inward when snapping
    #[arg(long)]
    snap_offset: Option<i32>,

    /// Fork the process (run in the background)
    #[arg(short = 'f', long)]
    fork: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    sample_config: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

extern "C" fn handle_signal(_signum: c_int) {
    daemon::request_shutdown();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if cli.sample_config {
        println!("{}", config::generate_sample_config());
        return Ok(());
    }

    // Load configuration and overlay the CLI switches
    let mut config = if let Some(config_path) = &cli.config {
        Config::load(config_path)
            .with_context(|| format!("cannot load config {}", config_path.display()))?
    } else {
        Config::load_default().unwrap_or_default()
    };

    if cli.wrap_x {
        config.wrap.x = Some(true);
    }
    if cli.wrap_y {
        config.wrap.y = Some(true);
    }
    if cli.snap || cli.snap_x {
        config.snap.x = Some(true);
    }
    if cli.snap || cli.snap_y {
        config.snap.y = Some(true);
    }
    if let Some(offset) = cli.snap_offset {
        config.snap.offset = offset;
    }

    let settings = config.settings();
    tracing::debug!(
        "wrap x/y: {}/{}, snap x/y: {}/{}, snap offset: {}",
        settings.wrap_x,
        settings.wrap_y,
        settings.snap_x,
        settings.snap_y,
        settings.snap_offset
    );

    if cli.fork {
        // SAFETY: still single-threaded at this point.
        let pid = unsafe { libc::fork() };
        if pid < 0 {
            anyhow::bail!("fork failed: {}", std::io::Error::last_os_error());
        }
        if pid != 0 {
            return Ok(());
        }
    }

    unsafe {
        libc::signal(libc::SIGINT, handle_signal as libc::sighandler_t);
        libc::signal(libc::SIGTERM, handle_signal as libc::sighandler_t);
    }

    let backend = X11Backend::open().context("failed to connect to the display server")?;
    let mut daemon = Daemon::new(backend, &settings);

    tracing::info!("cursorwrap running");
    daemon.run()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["cursorwrap", "-x", "-y", "--snap-offset", "5"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert!(cli.wrap_x && cli.wrap_y);
        assert_eq!(cli.snap_offset, Some(5));
    }

    #[test]
    fn test_cli_rejects_unknown_argument() {
        assert!(Cli::try_parse_from(["cursorwrap", "--bogus"]).is_err());
    }
}
