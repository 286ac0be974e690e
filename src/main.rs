use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ibc::{
    boiler::Boiler,
    fault,
    loads::{join_loads, LoadGroup, ServicingWord},
    logger::{self, CsvLogger},
    monitor::{LogNotifier, Monitor, MonitorConfig},
    report::{Console, StatusReport},
};
use strum::IntoEnumIterator;

#[derive(Parser, Debug)]
#[command(about = "Query and watch an IBC boiler")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current boiler and load status
    Status {
        /// URL of the boiler, ex: http://192.168.10.2/
        #[arg(short, long, env = "IBC_URL")]
        url: String,
    },

    /// Append boiler telemetry to a CSV file at a fixed interval
    Log {
        #[arg(short, long, env = "IBC_URL")]
        url: String,

        /// Output CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Minutes between two rows
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },

    /// Watch the boiler, alert on errors and keep daily cycle counts
    Monitor {
        #[arg(short, long, env = "IBC_URL")]
        url: String,

        /// CSV file of daily cycle counts
        #[arg(short = 'o', long)]
        csv_output_file: PathBuf,

        /// Don't alert on warnings
        #[arg(short = 'w', long)]
        ignore_warnings: bool,

        /// Minutes to wait between two alerts
        #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u32))]
        mute_minutes: u32,

        /// Send a status notification on startup
        #[arg(long)]
        notify_on_start: bool,
    },

    /// Decode raw error and servicing words without contacting a boiler
    Decode {
        #[arg(long, default_value = "0", value_parser = parse_word)]
        minor: u32,

        #[arg(long, default_value = "0", value_parser = parse_word)]
        major: u32,

        #[arg(long, default_value = "0", value_parser = parse_word)]
        system: u32,

        #[arg(long, value_parser = parse_word)]
        servicing: Option<u32>,
    },
}

/// Accepts decimal or 0x-prefixed hex.
fn parse_word(s: &str) -> Result<u32, std::num::ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = Args::parse();

    match args.command {
        Command::Status { url } => {
            let boiler = Boiler::new(url)?;
            let report = StatusReport {
                boiler: boiler.get_boiler_data().await?,
                detail: boiler.get_boiler_ext_detail_data().await?,
                loads: boiler.get_load_status_data().await?,
            };
            print!("{}", Console(&report));
        }
        Command::Log {
            url,
            file,
            interval,
        } => {
            let boiler = Boiler::new(url)?;
            let mut csv = CsvLogger::open(&file)
                .with_context(|| format!("failed to open {}", file.display()))?;
            info!(file = %file.display(), interval, "logging boiler data");
            logger::run(&boiler, &mut csv, Duration::from_secs(interval * 60)).await?;
        }
        Command::Monitor {
            url,
            csv_output_file,
            ignore_warnings,
            mute_minutes,
            notify_on_start,
        } => {
            let config = MonitorConfig {
                daily_log_file: csv_output_file,
                ignore_warnings,
                mute: chrono::Duration::minutes(i64::from(mute_minutes)),
                notify_on_start,
            };
            let mut monitor = Monitor::new(Boiler::new(url)?, config, LogNotifier);
            monitor.run().await?;
        }
        Command::Decode {
            minor,
            major,
            system,
            servicing,
        } => {
            let classification = fault::classify_detailed(minor, major, system);
            println!(
                "{} ({})",
                classification.label, classification.category
            );

            if let Some(servicing) = servicing {
                let word = ServicingWord(servicing);
                for group in LoadGroup::iter() {
                    println!("{}: {}", group, join_loads(&word.loads(group)));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word() {
        assert_eq!(parse_word("512").unwrap(), 512);
        assert_eq!(parse_word("0x1000").unwrap(), 4096);
        assert_eq!(parse_word("0X20").unwrap(), 32);
        assert!(parse_word("0xZZ").is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from(["ibc", "decode", "--minor", "0x0200"]).unwrap();
        match args.command {
            Command::Decode { minor, major, .. } => {
                assert_eq!(minor, 0x0200);
                assert_eq!(major, 0);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let args = Args::try_parse_from([
            "ibc", "log", "-u", "http://boiler/", "-f", "out.csv", "-i", "5",
        ])
        .unwrap();
        assert!(matches!(args.command, Command::Log { interval: 5, .. }));

        assert!(Args::try_parse_from(["ibc", "log", "-u", "x", "-f", "o", "-i", "0"]).is_err());

        let args = Args::try_parse_from(["ibc", "monitor", "-u", "x", "-o", "d.csv"]).unwrap();
        assert!(matches!(args.command, Command::Monitor { mute_minutes: 60, .. }));

        let args =
            Args::try_parse_from(["ibc", "monitor", "-u", "x", "-o", "d.csv", "-m", "0"]).unwrap();
        assert!(matches!(args.command, Command::Monitor { mute_minutes: 0, .. }));

        // Negative and oversized mute windows are rejected at parse time
        assert!(
            Args::try_parse_from(["ibc", "monitor", "-u", "x", "-o", "d.csv", "-m", "-5"]).is_err()
        );
        assert!(Args::try_parse_from([
            "ibc",
            "monitor",
            "-u",
            "x",
            "-o",
            "d.csv",
            "-m",
            "9223372036854775807",
        ])
        .is_err());
    }
}
