use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use xmas_tree::{ChristmasTree, Color, Config, Position, SerialTransport, Transport};

#[derive(Parser)]
#[command(name = "xmas-tree")]
#[command(about = "Drive a 25 LED RGB Christmas tree\n\nWrites one frame to the tree over a serial bridge.", long_about = None)]
struct Cli {
    /// Path to configuration file (JSON)
    config: String,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// Enable detailed debug (hex dumps every frame)
    #[arg(long)]
    ddebug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Switch every LED off
    Off,
    /// Light every LED
    Fill(PaintArgs),
    /// Light one LED by flat index
    Set {
        index: usize,
        #[command(flatten)]
        paint: PaintArgs,
    },
    /// Light the star
    Star(PaintArgs),
    /// Light one height layer (3 is the star)
    Layer {
        row: usize,
        #[command(flatten)]
        paint: PaintArgs,
    },
    /// Light one branch
    Column {
        column: usize,
        #[command(flatten)]
        paint: PaintArgs,
    },
    /// Print the startup frame as hex (sent after reset and off, so every
    /// LED is black at the configured brightness)
    Dump,
}

#[derive(Args)]
struct PaintArgs {
    red: u32,
    green: u32,
    blue: u32,

    /// Brightness level 0-31 for the addressed LEDs
    #[arg(long)]
    brightness: Option<u32>,

    /// Keep the LEDs lit until Ctrl-C, then switch them off
    #[arg(long)]
    hold: bool,
}

impl PaintArgs {
    fn color(&self) -> Color {
        match self.brightness {
            Some(level) => Color::with_brightness(level, self.red, self.green, self.blue),
            None => Color::rgb(self.red, self.green, self.blue),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ddebug implies debug
    let level = if cli.ddebug {
        log::LevelFilter::Trace
    } else if cli.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    // Load configuration
    let config_data = fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read {}", cli.config))?;
    let config: Config = serde_json::from_str(&config_data)
        .with_context(|| format!("Invalid configuration in {}", cli.config))?;

    let transport = SerialTransport::open(&config.transport)?;
    let mut tree = ChristmasTree::new(transport, &config.tree)?;

    let hold = run(&mut tree, &cli.command)?;
    if hold {
        wait_for_ctrl_c()?;
        log::info!("Turning off LEDs...");
        tree.off()?;
    }

    tree.close()?;
    Ok(())
}

/// Apply one command and commit. Returns whether the caller should hold.
fn run<T: Transport>(tree: &mut ChristmasTree<T>, command: &Command) -> Result<bool> {
    let (position, paint) = match command {
        Command::Off => {
            tree.off()?;
            return Ok(false);
        }
        Command::Dump => {
            let hex: String = tree
                .frame()
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{}", hex);
            return Ok(false);
        }
        Command::Fill(paint) => (Position::all(), paint),
        Command::Set { index, paint } => (Position::Single(*index), paint),
        Command::Star(paint) => (Position::Star, paint),
        Command::Layer { row, paint } => (Position::layer(*row), paint),
        Command::Column { column, paint } => (Position::column(*column), paint),
    };

    tree.set(position, paint.color())?;
    if !tree.autocommit() {
        tree.commit()?;
    }
    log::info!("Wrote {:?}", position);
    Ok(paint.hold)
}

fn wait_for_ctrl_c() -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::Relaxed);
    })
    .context("Could not set Ctrl-C handler")?;

    log::info!("(Press Ctrl-C to stop)");
    while running.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_millis(100));
    }
    Ok(())
}
