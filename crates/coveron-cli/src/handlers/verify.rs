//! Verify command handler

use crate::commands::VerifyArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use coveron_runtime::{
    CriError, CriHeader, CriIdentity, CriReader, FormatVersion, InstrumentationRandom, SourceHash,
    HEADER_LEN,
};
use std::io::Read;
use tracing::debug;

/// Execute the verify command
pub fn execute_verify(config: &CliConfig, args: &VerifyArgs) -> CliResult<()> {
    let identity = parse_identity(&args.hash, &args.random)?;
    let reporter = Reporter::from_config(config);

    // Only the header matters; skip the record trail
    let mut head = Vec::with_capacity(HEADER_LEN);
    std::fs::File::open(&args.file)?
        .take(HEADER_LEN as u64)
        .read_to_end(&mut head)?;
    debug!(file = %args.file.display(), read = head.len(), "Read CRI header");

    match verify_header(&head, &identity) {
        Ok(()) => {
            reporter.success(&format!(
                "{} matches {}/{}",
                args.file.display(),
                identity.source_hash,
                identity.instrumentation_random
            ));
            Ok(())
        }
        Err(e) => {
            reporter.failure(&format!("{} does not match", args.file.display()));
            Err(e)
        }
    }
}

/// Parse the expected identity from hex arguments
pub fn parse_identity(hash: &str, random: &str) -> CliResult<CriIdentity> {
    let source_hash: SourceHash = hash
        .parse()
        .map_err(|e: CriError| CliError::invalid_argument(format!("--hash: {e}")))?;
    let instrumentation_random: InstrumentationRandom = random
        .parse()
        .map_err(|e: CriError| CliError::invalid_argument(format!("--random: {e}")))?;
    Ok(CriIdentity::new(source_hash, instrumentation_random))
}

/// Apply the lifecycle's validation rule, explaining any mismatch
pub fn verify_header(head: &[u8], identity: &CriIdentity) -> CliResult<()> {
    match CriReader::new(head).verify(identity) {
        Ok(_) => Ok(()),
        Err(CriError::HeaderMismatch) => {
            // verify only reports a mismatch once the header decodes
            let found = CriReader::new(head).header()?;
            Err(CliError::mismatch(describe_mismatch(&found, identity)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Name the header fields that differ from `expected`
#[must_use]
pub fn describe_mismatch(found: &CriHeader, expected: &CriIdentity) -> String {
    let mut parts = Vec::new();
    if found.version != FormatVersion::CURRENT {
        parts.push(format!(
            "version {} (expected {})",
            found.version,
            FormatVersion::CURRENT
        ));
    }
    if found.identity.source_hash != expected.source_hash {
        parts.push(format!("source hash {}", found.identity.source_hash));
    }
    if found.identity.instrumentation_random != expected.instrumentation_random {
        parts.push(format!(
            "instrumentation random {}",
            found.identity.instrumentation_random
        ));
    }
    if parts.is_empty() {
        "header differs".to_string()
    } else {
        format!("file has {}", parts.join(", "))
    }
}
