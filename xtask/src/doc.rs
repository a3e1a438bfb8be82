use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

/// Library crates with API docs and the features each is documented with.
/// `std` exposes `platform::mocks`; `tracing` documents the host logging path.
/// xtask is a binary and has none worth reading.
const DOCUMENTED: &[(&str, &[&str])] = &[
    ("platform", &["std"]),
    ("usb-audio", &["std", "tracing"]),
    ("playback", &["std"]),
];

/// The driver is the entry point a reader wants first.
const LANDING_PAGE: &str = "target/doc/usb_audio/index.html";

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Documenting USB audio crates...".cyan().bold());
    println!();

    let start = Instant::now();
    cargo_doc(&doc_args(DOCUMENTED, false))?;
    let names: Vec<_> = DOCUMENTED.iter().map(|(name, _)| *name).collect();
    println!(
        "{}",
        format!(
            "  ✓ {} documented in {:.2}s",
            names.join(", "),
            start.elapsed().as_secs_f64()
        )
        .green()
    );

    if open {
        // Everything is already built; this only hands the usb_audio page to the browser.
        let driver: Vec<_> = DOCUMENTED
            .iter()
            .filter(|(name, _)| *name == "usb-audio")
            .copied()
            .collect();
        cargo_doc(&doc_args(&driver, true))?;
    } else if Path::new(LANDING_PAGE).exists() {
        println!("   {}", format!("Start at {LANDING_PAGE}").dimmed());
        println!("   {}", "Or run 'cargo xtask doc --open'".dimmed());
    }

    println!();
    Ok(())
}

/// Cargo refuses `crate/feature` entries for crates that are not selected, so
/// the feature list is built from the same selection.
fn doc_args(packages: &[(&str, &[&str])], open: bool) -> Vec<String> {
    let mut args = vec!["doc".to_string(), "--no-deps".to_string()];
    let mut features = Vec::new();
    for (package, enabled) in packages {
        args.push("-p".to_string());
        args.push((*package).to_string());
        features.extend(enabled.iter().map(|f| format!("{package}/{f}")));
    }
    if !features.is_empty() {
        args.push("--features".to_string());
        args.push(features.join(","));
    }
    if open {
        args.push("--open".to_string());
    }
    args
}

fn cargo_doc(args: &[String]) -> Result<()> {
    let output = Command::new("cargo")
        .args(args)
        .output()
        .context("Failed to run cargo doc")?;

    if !output.status.success() {
        eprintln!("{}", "  ✗ cargo doc failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("Documentation build failed");
    }
    Ok(())
}
