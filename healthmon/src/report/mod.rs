//! Line-oriented report output.
//!
//! Reporters are stateless formatters. Any write error is returned to the
//! caller and treated as fatal by the scheduler.

use crate::stats::AvailabilitySnapshot;
use crate::types::ProbeResult;
use std::io::{self, Write};

/// Width of the divider printed after each cycle.
const DIVIDER_WIDTH: usize = 50;

/// Sink for probe results and availability summaries.
pub trait Reporter {
    /// Called once before the first cycle.
    fn report_start(&mut self) -> io::Result<()>;

    /// Called once per probe, in config order.
    fn report_probe(&mut self, result: &ProbeResult) -> io::Result<()>;

    /// Called after every completed cycle.
    fn report_snapshot(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()>;

    /// Called once after the scheduler stops.
    fn report_final(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()>;
}

/// Formats the per-probe line, e.g. `index (fetch.com): UP (Latency: 12.34 ms)`.
pub fn format_probe_line(result: &ProbeResult) -> String {
    let latency = match result.latency_ms {
        Some(ms) => format!("{:.2} ms", ms),
        None => "N/A".to_string(),
    };
    format!(
        "{} ({}): {} (Latency: {})",
        result.endpoint_name,
        result.domain,
        result.status_label(),
        latency
    )
}

/// Human-readable reporter writing to any [`Write`] sink.
#[derive(Debug)]
pub struct TextReporter<W: Write> {
    out: W,
}

impl TextReporter<io::Stdout> {
    /// Reporter writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextReporter<W> {
    /// Wrap a sink.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the reporter and return the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_domains(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()> {
        for entry in snapshot.iter() {
            writeln!(self.out, "{} has {}% availability", entry.domain, entry.percent)?;
        }
        Ok(())
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report_start(&mut self) -> io::Result<()> {
        writeln!(self.out, "Starting health checks. Press CTRL+C to exit.")?;
        self.out.flush()
    }

    fn report_probe(&mut self, result: &ProbeResult) -> io::Result<()> {
        writeln!(self.out, "{}", format_probe_line(result))?;
        self.out.flush()
    }

    fn report_snapshot(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Availability Statistics:")?;
        self.write_domains(snapshot)?;
        writeln!(self.out, "{}", "-".repeat(DIVIDER_WIDTH))?;
        self.out.flush()
    }

    fn report_final(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Exiting program. Final statistics:")?;
        self.write_domains(snapshot)?;
        writeln!(self.out, "Goodbye!")?;
        self.out.flush()
    }
}
