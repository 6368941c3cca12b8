//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of discovery and
//! scan results.

mod csv_format;
mod json_format;
mod plain;

pub use plain::{print_error, print_warning, write_discovery_event, write_discovery_summary};

use crate::cli::OutputFormat;
use crate::scanner::{HostDiscoveryResult, HostScanResult};
use std::io::{self, Write};

/// Write discovery results in the given format.
pub fn write_discovery<W: Write>(
    out: &mut W,
    results: &[HostDiscoveryResult],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_discovery(out, results),
        OutputFormat::Json => json_format::write_discovery(out, results),
        OutputFormat::Csv => csv_format::write_discovery(out, results),
    }
}

/// Writes scan results as they arrive from the engine.
pub struct ScanWriter<W: Write> {
    sink: Sink<W>,
}

enum Sink<W: Write> {
    Plain(W),
    Json(W),
    Csv(csv::Writer<W>),
}

impl<W: Write> ScanWriter<W> {
    /// Create a writer; CSV output gets its header row immediately.
    pub fn new(out: W, format: OutputFormat) -> io::Result<Self> {
        let sink = match format {
            OutputFormat::Plain => Sink::Plain(out),
            OutputFormat::Json => Sink::Json(out),
            OutputFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(out);
                wtr.write_record(csv_format::SCAN_HEADER)?;
                Sink::Csv(wtr)
            }
        };
        Ok(Self { sink })
    }

    /// Write one host and flush so results show up as hosts finish.
    pub fn write(&mut self, result: &HostScanResult) -> io::Result<()> {
        match &mut self.sink {
            Sink::Plain(out) => {
                plain::write_scan(out, result)?;
                out.flush()
            }
            Sink::Json(out) => {
                json_format::write_scan(out, result)?;
                out.flush()
            }
            Sink::Csv(wtr) => {
                csv_format::write_scan(wtr, result)?;
                wtr.flush()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::PortProbeOutcome;

    #[test]
    fn test_scan_writer_csv_header_once() {
        let result = HostScanResult {
            host: "h".into(),
            ports: vec![PortProbeOutcome::from_result(80, Ok(()))],
            error: None,
        };

        let mut buf = Vec::new();
        {
            let mut writer = ScanWriter::new(&mut buf, OutputFormat::Csv).unwrap();
            writer.write(&result).unwrap();
            writer.write(&result).unwrap();
        }

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches("host,port").count(), 1);
        assert_eq!(text.lines().count(), 3);
    }
}
