//! Module loading the relationship, announcement, and ROV inputs, and
//! exporting the resulting RIBs as CSV.

use crate::bgp::Relation;
use crate::graph::AsGraph;
use crate::simulator::Simulator;
use crate::{Asn, Prefix, SimError};
use log::{info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// A single origin announcement from the input CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// AS at which the prefix is seeded
    pub origin: Asn,
    /// the announced prefix
    pub prefix: Prefix,
    /// whether the announcement fails Route Origin Validation
    pub rov_invalid: bool,
}

fn open(path: &Path) -> Result<File, SimError> {
    File::open(path).map_err(|e| SimError::FileError(path.display().to_string(), e))
}

/// Parse a CAIDA-style relationship file. Lines are `asn1|asn2|code` with an
/// optional trailing label field; code `-1` makes asn1 the provider of asn2,
/// code `0` makes them peers. Comments, blank lines, unknown codes, and
/// malformed lines are skipped.
pub fn read_relationships<R: BufRead>(reader: R) -> io::Result<AsGraph> {
    let mut graph = AsGraph::new();
    let mut loaded = 0usize;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split('|');
        let (Some(a), Some(b), Some(code)) = (fields.next(), fields.next(), fields.next()) else {
            continue;
        };
        let (Ok(a), Ok(b)) = (a.trim().parse::<u32>(), b.trim().parse::<u32>()) else {
            continue;
        };
        let rel = match code.trim() {
            "-1" => Relation::ProviderToCustomer,
            "0" => Relation::PeerToPeer,
            _ => continue,
        };
        graph.add_relationship(Asn(a), Asn(b), rel);
        loaded += 1;
    }
    info!("Loaded {} relationships for {} ASNs", loaded, graph.num_asns());
    Ok(graph)
}

/// Load the AS relationship graph from a file
pub fn relationships_from_path(path: &Path) -> Result<AsGraph, SimError> {
    let file = open(path)?;
    read_relationships(BufReader::new(file))
        .map_err(|e| SimError::FileError(path.display().to_string(), e))
}

/// Parse the announcements CSV. The header row is discarded; every other row
/// is `origin_asn, prefix, rov_invalid`, where the flag is truthy iff it
/// contains `True`, `true`, or `1`. Malformed rows are silently skipped.
pub fn read_announcements<R: Read>(reader: R) -> Vec<Announcement> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut announcements = Vec::new();
    for record in rdr.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => break,
            Err(_) => continue,
        };
        let (Some(origin), Some(prefix), Some(flag)) =
            (record.get(0), record.get(1), record.get(2))
        else {
            continue;
        };
        let Ok(origin) = origin.parse::<u32>() else {
            continue;
        };
        let rov_invalid = flag.contains("True") || flag.contains("true") || flag.contains('1');
        announcements.push(Announcement {
            origin: Asn(origin),
            prefix: Prefix(prefix.to_string()),
            rov_invalid,
        });
    }
    info!("Loaded {} announcements", announcements.len());
    announcements
}

/// Load the origin announcements from a file
pub fn announcements_from_path(path: &Path) -> Result<Vec<Announcement>, SimError> {
    Ok(read_announcements(open(path)?))
}

/// Parse the ROV-enabled ASN list: one ASN per line, with `#` comments and
/// blank lines skipped. Unparseable lines are logged and skipped.
pub fn read_rov_asns<R: BufRead>(reader: R) -> io::Result<HashSet<Asn>> {
    let mut asns = HashSet::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.parse::<u32>() {
            Ok(asn) => {
                asns.insert(Asn(asn));
            }
            Err(_) => warn!("Skipping invalid ASN: {}", line),
        }
    }
    Ok(asns)
}

/// Load the ROV-enabled ASN set from a file
pub fn rov_asns_from_path(path: &Path) -> Result<HashSet<Asn>, SimError> {
    let file = open(path)?;
    read_rov_asns(BufReader::new(file))
        .map_err(|e| SimError::FileError(path.display().to_string(), e))
}

/// Render an AS path as the tuple literal used in the output CSV, most
/// recent hop first. A single-element path keeps a trailing comma:
/// `(65001,)`.
pub fn render_as_path(as_path: &[Asn]) -> String {
    let mut out = String::from("(");
    for (i, asn) in as_path.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&asn.0.to_string());
    }
    if as_path.len() == 1 {
        out.push(',');
    }
    out.push(')');
    out
}

/// Write every RIB entry as a `asn,prefix,as_path` row, sorted by AS number,
/// then prefix, then rendered path. The path field contains commas, so the
/// CSV writer wraps it in double quotes.
pub fn write_ribs<W: Write>(sim: &Simulator, writer: W) -> Result<(), SimError> {
    let mut entries: Vec<(u32, &str, String)> = sim
        .rib_entries()
        .map(|(asn, route)| (asn.0, route.prefix.0.as_str(), render_as_path(&route.as_path)))
        .collect();
    entries.sort();

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["asn", "prefix", "as_path"])?;
    for (asn, prefix, as_path) in entries {
        wtr.write_record([asn.to_string().as_str(), prefix, as_path.as_str()])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Export the RIBs to a file. Only called after successful convergence, so a
/// failed run leaves no partial output behind.
pub fn write_ribs_to_path(sim: &Simulator, path: &Path) -> Result<(), SimError> {
    let file =
        File::create(path).map_err(|e| SimError::FileError(path.display().to_string(), e))?;
    write_ribs(sim, BufWriter::new(file))
}
