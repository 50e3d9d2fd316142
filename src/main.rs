//! Gao-Rexford BGP propagation simulator.
//!
//! Reads a CAIDA-style AS relationship file and a set of origin
//! announcements, propagates the announcements through the provider
//! hierarchy under the Gao-Rexford export policy (with optional Route Origin
//! Validation), and writes the resulting per-AS routing tables to
//! `ribs.csv`.

#![deny(missing_docs)]
#![allow(dead_code)]

mod bgp;
mod graph;
mod io;
mod rank;
mod simulator;
mod types;

pub use types::*;

#[cfg(test)]
mod test;

use clap::error::ErrorKind;
use clap::Parser;
use log::info;
use simulator::Simulator;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ribsim")]
struct Args {
    /// Path to the AS relationships file (CAIDA format)
    #[arg(long, value_name = "FILE")]
    relationships: PathBuf,
    /// Path to the announcements CSV file
    #[arg(long, value_name = "FILE")]
    announcements: PathBuf,
    /// Path to the ROV-enabled ASNs file
    #[arg(long, value_name = "FILE")]
    rov_asns: Option<PathBuf>,
}

/// main function
fn main() -> ExitCode {
    pretty_env_logger::init();

    // any argument error exits with code 1; only --help exits with 0
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load the inputs, run the propagation, and export the RIBs.
fn run(args: &Args) -> Result<(), SimError> {
    info!(
        "Loading AS relationships from {}...",
        args.relationships.display()
    );
    let graph = io::relationships_from_path(&args.relationships)?;
    graph.log_stats();

    let mut sim = Simulator::new(graph);

    if let Some(path) = &args.rov_asns {
        info!("Loading ROV ASNs from {}...", path.display());
        let rov_asns = io::rov_asns_from_path(path)?;
        info!("Loaded {} ROV-enabled ASes", rov_asns.len());
        sim.set_rov_asns(rov_asns);
    }

    info!(
        "Loading announcements from {}...",
        args.announcements.display()
    );
    for ann in io::announcements_from_path(&args.announcements)? {
        sim.seed_announcement(ann.origin, ann.prefix, ann.rov_invalid);
    }

    sim.propagate()?;

    let out = Path::new("ribs.csv");
    info!("Exporting RIBs to {}...", out.display());
    io::write_ribs_to_path(&sim, out)?;
    info!("Total RIB entries: {}", sim.rib_count());
    Ok(())
}
