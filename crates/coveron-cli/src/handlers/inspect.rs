//! Inspect command handler

use crate::commands::{InspectArgs, OutputFormat};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use coveron_runtime::{
    CriReader, CriRecord, EventKind, FormatVersion, InstrumentationRandom, SourceHash,
    MAGIC_NUMBER,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything `cri inspect` reports about one file
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// File that was decoded
    pub file: PathBuf,
    /// File size in bytes
    pub size: usize,
    /// Magic number as text
    pub magic: String,
    /// Format version found in the header
    pub version: FormatVersion,
    /// Whether this runtime writes the same version
    pub current_version: bool,
    /// Source hash from the header
    pub source_hash: SourceHash,
    /// Instrumentation random from the header
    pub instrumentation_random: InstrumentationRandom,
    /// Number of execution markers
    pub executions: usize,
    /// Number of event records
    pub events: usize,
    /// Every record after the header, in file order
    pub records: Vec<CriRecord>,
}

/// Execute the inspect command
pub fn execute_inspect(config: &CliConfig, args: &InspectArgs) -> CliResult<()> {
    debug!(file = %args.file.display(), "Inspecting CRI file");
    let bytes = std::fs::read(&args.file)?;
    let report = build_report(&args.file, &bytes)?;
    let reporter = Reporter::from_config(config);

    match args.format {
        OutputFormat::Json => reporter.raw(&render_json(&report)?),
        OutputFormat::Text => render_text(&report, &reporter, config.verbosity.is_verbose()),
    }
    Ok(())
}

/// Decode `bytes` into a report
pub fn build_report(file: &Path, bytes: &[u8]) -> CliResult<InspectReport> {
    let log = CriReader::new(bytes).decode()?;
    Ok(InspectReport {
        file: file.to_path_buf(),
        size: bytes.len(),
        magic: String::from_utf8_lossy(&MAGIC_NUMBER).into_owned(),
        version: log.header.version,
        current_version: log.header.version == FormatVersion::CURRENT,
        source_hash: log.header.identity.source_hash,
        instrumentation_random: log.header.identity.instrumentation_random,
        executions: log.execution_count(),
        events: log.event_count(),
        records: log.records,
    })
}

/// Pretty-printed JSON
pub fn render_json(report: &InspectReport) -> CliResult<String> {
    serde_json::to_string_pretty(report).map_err(|e| CliError::report_generation(e.to_string()))
}

/// One record as a single text line
#[must_use]
pub fn format_record(record: &CriRecord) -> String {
    match record {
        CriRecord::Execution { offset, comment } => {
            format!("@{offset:<8} execution  {comment:?}")
        }
        CriRecord::Event {
            offset,
            marker_id,
            kind,
        } => {
            let meaning = match kind {
                EventKind::Statement => "statement",
                EventKind::Evaluation(true) => "true",
                EventKind::Evaluation(false) => "false",
            };
            format!(
                "@{offset:<8} event      {marker_id}  {:02X}  {meaning}",
                kind.tag()
            )
        }
    }
}

fn render_text(report: &InspectReport, reporter: &Reporter, verbose: bool) {
    reporter.heading(&report.file.display().to_string());
    reporter.field("size", &format!("{} bytes", report.size));
    reporter.field("magic", &report.magic);
    let version = if report.current_version {
        report.version.to_string()
    } else {
        format!("{} (this runtime writes {})", report.version, FormatVersion::CURRENT)
    };
    reporter.field("version", &version);
    reporter.field("hash", &report.source_hash.to_string());
    reporter.field("random", &report.instrumentation_random.to_string());
    reporter.field("executions", &report.executions.to_string());
    reporter.field("events", &report.events.to_string());

    if report.records.is_empty() {
        return;
    }
    reporter.line("");
    for line in record_lines(&report.records, verbose) {
        reporter.line(&line);
    }
    if !verbose && report.events > 0 {
        reporter.line("  (-v lists every event)");
    }
}

/// Execution markers only, or every record when verbose
fn record_lines(records: &[CriRecord], verbose: bool) -> Vec<String> {
    records
        .iter()
        .filter(|record| verbose || record.is_execution())
        .map(|record| format!("  {}", format_record(record)))
        .collect()
}
