//! Parser for nmap-services style port registries.
//!
//! Each record is `name<TAB>port/proto<TAB>frequency`, optionally followed by
//! more columns. Comment lines start with `#`; anything else that does not
//! fit the record shape is skipped.

use super::{Protocol, RankedPort};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Read the registry at `path` and return the ranked ports for `protocol`.
pub fn load(path: &Path, protocol: Protocol) -> io::Result<Vec<RankedPort>> {
    let file = File::open(path)?;
    parse(BufReader::new(file), protocol)
}

/// Parse registry records for `protocol`, sorted by descending weight.
///
/// The sort is stable, so ports with equal weight keep their file order.
pub fn parse<R: BufRead>(reader: R, protocol: Protocol) -> io::Result<Vec<RankedPort>> {
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if let Some(record) = parse_record(&line, protocol) {
            records.push(record);
        }
    }

    records.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    Ok(records)
}

fn parse_record(line: &str, protocol: Protocol) -> Option<RankedPort> {
    if line.starts_with('#') {
        return None;
    }

    let mut columns = line.split('\t');
    let service = columns.next().filter(|s| !s.is_empty())?;
    let (port, proto) = columns.next()?.split_once('/')?;
    let weight = columns.next()?.trim();

    if proto.parse::<Protocol>().ok()? != protocol {
        return None;
    }
    let port: u16 = port.parse().ok()?;
    let weight: f64 = weight.parse().ok().filter(|w: &f64| w.is_finite())?;

    Some(RankedPort::new(port, service, weight))
}
