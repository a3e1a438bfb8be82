use anyhow::{anyhow, Result};
use colored::Colorize;
use platform::mocks::{MockCodecControl, MockPlaybackSink, MockUsbCore};
use tracing_subscriber::EnvFilter;
use usb_audio::{AudioFormat, UacDriver};

pub struct DumpArgs {
    pub rate: u32,
    pub channels: u8,
    pub bits: u8,
    pub first_interface: u8,
    pub first_string: u8,
}

/// Register the function against the recording USB core the way firmware
/// does at boot, then print what the host would receive.
pub fn run(args: &DumpArgs) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("usb_audio=debug")))
        .with_target(false)
        .init();

    let format = AudioFormat::new(args.rate, args.channels, args.bits)
        .map_err(|e| anyhow!("unsupported format: {e}"))?;
    let mut driver: UacDriver<_, _, _> = UacDriver::new(
        MockUsbCore::new(),
        MockPlaybackSink::new(),
        MockCodecControl::new(),
        format,
    );
    driver.init();
    let ep = driver
        .request_endpoints()
        .map_err(|e| anyhow!("endpoint allocation failed: {e}"))?;
    driver.set_first_interface(args.first_interface);
    driver.set_first_string_index(args.first_string);

    let mps = format.max_packet_size();
    let mut buf = [0u8; 256];
    let len = driver
        .get_config_descriptor(&mut buf, mps)
        .map_err(|e| anyhow!("descriptor build failed: {e}"))?;
    let bytes = buf.get(..len).ok_or_else(|| anyhow!("descriptor length {len} out of range"))?;

    println!();
    println!(
        "{}",
        format!(
            "USB audio function: {} Hz, {} ch, {} bit, EP 0x{:02x}, max packet {} B, {} descriptor bytes",
            args.rate,
            args.channels,
            args.bits,
            ep.raw(),
            mps,
            len
        )
        .cyan()
        .bold()
    );
    println!();

    for (offset, desc) in walk(bytes)? {
        let hex: Vec<String> = desc.iter().map(|b| format!("{b:02x}")).collect();
        println!(
            "  {:>4}  {:<28} {}",
            offset,
            describe(desc).green(),
            hex.join(" ").dimmed()
        );
    }
    println!();

    for index in [args.first_string, args.first_string.saturating_add(1)] {
        if let Some(desc) = driver.get_string_descriptor(index) {
            let hex: Vec<String> = desc.iter().map(|b| format!("{b:02x}")).collect();
            println!("  string {:>3}  {}", index, hex.join(" ").dimmed());
        }
    }
    println!();
    Ok(())
}

/// Split a configuration fragment into `(offset, descriptor)` pairs by `bLength`.
fn walk(bytes: &[u8]) -> Result<Vec<(usize, &[u8])>> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(&b_length) = bytes.get(pos) {
        let len = usize::from(b_length);
        let desc = pos
            .checked_add(len)
            .and_then(|end| bytes.get(pos..end))
            .filter(|_| len >= 2)
            .ok_or_else(|| anyhow!("malformed descriptor at offset {pos} (bLength {len})"))?;
        out.push((pos, desc));
        pos = pos.saturating_add(len);
    }
    Ok(out)
}

/// Human-readable name for a single audio function descriptor.
fn describe(desc: &[u8]) -> &'static str {
    let ty = desc.get(1).copied().unwrap_or(0);
    let subtype = desc.get(2).copied().unwrap_or(0);
    match (ty, subtype) {
        (0x0B, _) => "interface association",
        (0x04, _) => match (desc.get(6).copied(), desc.get(3).copied()) {
            (Some(0x01), _) => "AudioControl interface",
            (Some(0x02), Some(0)) => "AudioStreaming alt 0 (idle)",
            (Some(0x02), _) => "AudioStreaming alt 1",
            _ => "interface",
        },
        // Class-specific interface subtypes overlap between AC and AS, so
        // tell them apart by length.
        (0x24, 0x01) if desc.len() == 9 => "AC header",
        (0x24, 0x01) => "AS general",
        (0x24, 0x02) if desc.len() == 12 => "input terminal (USB stream)",
        (0x24, 0x02) => "format type I",
        (0x24, 0x03) => "output terminal (speaker)",
        (0x24, 0x06) => "feature unit",
        (0x05, _) => "isochronous OUT endpoint",
        (0x25, _) => "CS endpoint (EP_GENERAL)",
        _ => "unknown",
    }
}
