//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.
//! Technique flags are shared through [`TechniqueArgs`].

mod capacity;
mod decode;
mod encode;

pub use capacity::CapacityCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pixhide::{StegoConfig, TechniqueKind};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self) -> Result<()>;
}

/// Technique and runtime flags shared by every command.
///
/// Flags override values from `--config`, which override built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct TechniqueArgs {
    /// Embedding technique: lsb or dct (default: dct)
    #[arg(short, long)]
    pub technique: Option<TechniqueKind>,

    /// LSB: bit planes used per channel sample (1-8)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=8))]
    pub depth: Option<u8>,

    /// DCT: margin pushed between each coefficient pair
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub persistence: Option<u32>,

    /// DCT: coefficient pairs used per 8x8 block (1-4)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub swap_count: Option<u8>,

    /// DCT: channel holding the data (0 = red, 1 = green, 2 = blue)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub channel: Option<u8>,

    /// DCT: order pairs in JPEG-quantized units
    #[arg(long)]
    pub quantize: bool,

    /// JPEG quality for DCT output (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Worker threads for chunk encode/decode (default: available cores)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose output (capacity, partitions, paths)
    #[arg(short, long)]
    pub verbose: bool,
}

impl TechniqueArgs {
    /// Builds the effective configuration.
    pub fn resolve(&self) -> Result<StegoConfig> {
        let mut config = match &self.config {
            Some(path) => StegoConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => StegoConfig::default(),
        };

        if let Some(technique) = self.technique {
            config.technique = technique;
        }
        if let Some(depth) = self.depth {
            config.lsb.depth = depth;
        }
        if let Some(persistence) = self.persistence {
            config.dct.persistence = persistence;
        }
        if let Some(swap_count) = self.swap_count {
            config.dct.swap_count = swap_count as usize;
        }
        if let Some(channel) = self.channel {
            config.dct.channel = channel as usize;
        }
        if self.quantize {
            config.dct.quantize = true;
        }
        if let Some(quality) = self.quality {
            config.output.jpeg_quality = quality;
        }
        if let Some(workers) = self.workers {
            config.parallelism.workers = workers;
        }
        if self.verbose {
            config.verbose = true;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: TechniqueArgs,
    }

    fn parse(args: &[&str]) -> TechniqueArgs {
        TestCli::try_parse_from(std::iter::once("pixhide").chain(args.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).resolve().unwrap();
        assert_eq!(config.technique, TechniqueKind::Dct);
        assert_eq!(config.dct.persistence, 10);
        assert_eq!(config.dct.swap_count, 1);
        assert!(!config.verbose);
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&["--technique", "lsb", "-d", "3", "-w", "2", "-v"])
            .resolve()
            .unwrap();
        assert_eq!(config.technique, TechniqueKind::Lsb);
        assert_eq!(config.lsb.depth, 3);
        assert_eq!(config.parallelism.workers, 2);
        assert!(config.verbose);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pixhide.toml");
        fs::write(
            &path,
            "technique = \"dct\"\n[dct]\nswap_count = 3\npersistence = 25\n",
        )
        .unwrap();

        let path = path.to_string_lossy().into_owned();
        let config = parse(&["--config", &path, "--persistence", "40"])
            .resolve()
            .unwrap();
        assert_eq!(config.dct.swap_count, 3);
        assert_eq!(config.dct.persistence, 40);
    }

    #[test]
    fn test_rejects_out_of_range_flags() {
        let parse_err = |args: &[&str]| {
            TestCli::try_parse_from(std::iter::once("pixhide").chain(args.iter().copied())).is_err()
        };
        assert!(parse_err(&["--depth", "9"]));
        assert!(parse_err(&["--swap-count", "5"]));
        assert!(parse_err(&["--persistence", "0"]));
        assert!(parse_err(&["--technique", "fft"]));
        assert!(parse_err(&["--channel", "3"]));
    }

    #[test]
    fn test_zero_workers_is_invalid() {
        assert!(parse(&["--workers", "0"]).resolve().is_err());
    }
}
