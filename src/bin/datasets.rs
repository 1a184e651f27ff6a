//! Exploratory loader for the bundled datasets.
//!
//! Loads a NOAA station file or an ARC-AGI task file and prints a summary,
//! plus a text rendering of the first training grid for ARC tasks.

use clap::Parser;
use std::path::PathBuf;

use reefmon_service::ingest::{arc_agi, noaa};

#[derive(Parser)]
#[command(
    name = "datasets",
    about = "Load and inspect NOAA station files and ARC-AGI task files"
)]
struct Args {
    /// NOAA Coral Reef Watch station file to load.
    #[arg(long, value_name = "FILE")]
    noaa: Option<PathBuf>,

    /// ARC-AGI task JSON file to load.
    #[arg(long, value_name = "FILE")]
    arc: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.noaa.is_none() && args.arc.is_none() {
        eprintln!("nothing to do: pass --noaa <FILE> and/or --arc <FILE>");
        std::process::exit(2);
    }

    if let Some(path) = &args.noaa {
        let series = noaa::load_station_file(path)?;
        println!(
            "{} ({}) at {:.4}, {:.4}",
            series.station_name, series.region, series.latitude, series.longitude
        );
        println!("{} daily records", series.records.len());
        if let (Some(first), Some(last)) = (series.records.first(), series.records.last()) {
            println!(
                "range {:04}-{:02}-{:02} .. {:04}-{:02}-{:02}",
                first.year, first.month, first.day, last.year, last.month, last.day
            );
            let max_dhw = series
                .records
                .iter()
                .map(|r| r.dhw_90th)
                .fold(f64::NEG_INFINITY, f64::max);
            println!("peak DHW (90th): {max_dhw:.2}");
        }
    }

    if let Some(path) = &args.arc {
        let task = arc_agi::load_task_file(path)?;
        println!(
            "ARC task: {} train pairs, {} test pairs",
            task.train.len(),
            task.test.len()
        );
        if let Some(pair) = task.train.first() {
            println!("first training input:");
            print!("{}", arc_agi::render_grid(&pair.input));
        }
    }

    Ok(())
}
