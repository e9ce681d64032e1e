// SPDX-License-Identifier: MIT

mod utils;

use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use gptio::prelude::*;
use gptpart::{BackupStatus, DEFAULT_BLOCK_SIZE, DiskInfo, PartitionInfo, ScanOptions, scan_disk};

use crate::utils::{LogLevel, set_log_level};

#[derive(Parser)]
#[command(name = "gpt", version, about = "GUID Partition Table verifier", long_about = None)]
struct Cli {
    /// Disk image or block device
    disk: PathBuf,

    /// Logical block size in bytes
    #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: u64,

    /// Skip the backup header check
    #[arg(long)]
    no_backup: bool,

    /// Show decode steps
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the partition table
    Verify,
    /// Validate, then list the partitions in use
    Show {
        /// Boxed report with GUIDs and sizes
        #[arg(long)]
        table: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    set_log_level(LogLevel::from_flags(cli.verbose, cli.quiet));

    let mut file = File::open(&cli.disk)
        .with_context(|| format!("cannot open {}", cli.disk.display()))?;
    let mut io = StdBlockIO::new(&mut file)?;

    let mut opts = ScanOptions::new().with_block_size(cli.block_size);
    if cli.no_backup {
        opts = opts.no_backup();
    }
    log::debug!("scanning {} (block size {})", cli.disk.display(), cli.block_size);
    let info = scan_disk(&mut io, opts)?;

    match cli.command {
        Commands::Verify => {
            println!("{}", "GPT appears to be valid.".green());
            if let BackupStatus::Degraded(e) = &info.backup {
                println!("{} {e}", "Backup GPT is degraded:".yellow());
            }
        }
        Commands::Show { table: true } => print!("{info}"),
        Commands::Show { table: false } => {
            for line in show_lines(&info) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn show_lines(info: &DiskInfo) -> Vec<String> {
    let mut lines = Vec::with_capacity(info.partitions.len() + 1);
    lines.push(format!("{:>11} {:>11} {:>5} {}", "Start", "Size", "Index", "Contents"));
    lines.extend(info.partitions.iter().map(show_row));
    lines
}

fn show_row(p: &PartitionInfo) -> String {
    let mut row = format!(
        "{:>11} {:>11} {:>5} {}",
        p.start_lba, p.size_blocks, p.index, p.kind
    );
    if !p.name.is_empty() {
        row.push_str(&format!(" (Part name: {})", p.name));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use gptpart::attrs::GptAttributes;
    use gptpart::guids::GptPartitionKind;
    use gptpart::Guid;

    fn part(index: usize, kind: GptPartitionKind, name: &str) -> PartitionInfo {
        PartitionInfo {
            index,
            kind,
            unique_guid: Guid::ZERO,
            start_lba: 2048,
            end_lba: 4095,
            size_blocks: 2047,
            attributes: GptAttributes::empty(),
            name: name.to_string(),
        }
    }

    #[test]
    fn show_row_layout() {
        assert_eq!(
            show_row(&part(0, GptPartitionKind::Esp, "")),
            "       2048        2047     0 EFI System Partition"
        );
        assert_eq!(
            show_row(&part(3, GptPartitionKind::LinuxSwap, "swap")),
            "       2048        2047     3 Linux Swap (Part name: swap)"
        );
    }

    #[test]
    fn unknown_type_shows_guid() {
        let g: Guid = "01234567-89AB-CDEF-0123-456789ABCDEF".parse().unwrap();
        let row = show_row(&part(1, GptPartitionKind::Unknown(g), ""));
        assert!(row.ends_with(" 01234567-89AB-CDEF-0123-456789ABCDEF"));
    }

    #[test]
    fn cli_parses_disk_then_command() {
        let cli = Cli::try_parse_from(["gpt", "-b", "4096", "disk.img", "show", "--table"]).unwrap();
        assert_eq!(cli.block_size, 4096);
        assert_eq!(cli.disk, PathBuf::from("disk.img"));
        assert!(matches!(cli.command, Commands::Show { table: true }));

        let cli = Cli::try_parse_from(["gpt", "disk.img", "verify"]).unwrap();
        assert_eq!(cli.block_size, DEFAULT_BLOCK_SIZE);
        assert!(matches!(cli.command, Commands::Verify));

        assert!(Cli::try_parse_from(["gpt", "-v", "-q", "disk.img", "verify"]).is_err());
    }
}
