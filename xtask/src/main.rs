// Host tooling: unwrap/expect/panic are acceptable here.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod descriptor;
mod doc;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "SoulAudio USB audio development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the no_std crates for the STM32H7 target, then clippy and fmt
    Check,
    /// Run all tests (unit, integration and doc)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Build and optionally open documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
    },
    /// Print the USB audio configuration fragment as annotated hex
    Descriptor {
        /// Sample rate in Hz
        #[arg(long, default_value_t = 48_000)]
        rate: u32,
        /// Channel count
        #[arg(long, default_value_t = 2)]
        channels: u8,
        /// Bits per sample (16, 24 or 32)
        #[arg(long, default_value_t = 16)]
        bits: u8,
        /// Interface number of the audio control interface
        #[arg(long, default_value_t = 0)]
        first_interface: u8,
        /// First string descriptor index owned by the function
        #[arg(long, default_value_t = 4)]
        first_string: u8,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
        Commands::Doc { open } => doc::run(open),
        Commands::Descriptor {
            rate,
            channels,
            bits,
            first_interface,
            first_string,
        } => descriptor::run(&descriptor::DumpArgs {
            rate,
            channels,
            bits,
            first_interface,
            first_string,
        }),
    }
}
