//! Capacity command - report how much an image can hold.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pixhide::capacity_report;

use super::{CommandExecutor, TechniqueArgs};

/// Show the capacity of a carrier image under a technique.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    /// Carrier image
    pub image: PathBuf,

    /// Filename length (bytes) to account for in the payload estimate
    #[arg(long, default_value = "0")]
    pub filename_len: usize,

    #[command(flatten)]
    pub technique: TechniqueArgs,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self) -> Result<()> {
        let config = self.technique.resolve()?;

        let report = capacity_report(&self.image, &config, self.filename_len)
            .with_context(|| format!("Failed to read {}", self.image.display()))?;

        println!(
            "Carrier:     {}x{}, {} channels",
            report.width, report.height, report.channels
        );
        println!("Technique:   {}", config.technique);
        println!("Capacity:    {} bits", report.capacity_bits);
        println!(
            "Max payload: {} bytes (filename of {} bytes)",
            report.max_payload_bytes, self.filename_len
        );
        Ok(())
    }
}
