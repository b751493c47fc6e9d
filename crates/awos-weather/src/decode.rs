//! METAR decoding, delegated to the external `metar` parser.

use std::sync::Arc;

use crate::error::DecodeError;

/// A successfully decoded METAR report.
#[derive(Debug, Clone)]
pub struct DecodedReport {
    /// Reporting station identifier from the decoded report
    pub station: String,
    /// The full parsed report
    pub report: Arc<metar::Metar>,
}

/// Decode raw METAR text into structured fields.
///
/// Failure is expected for malformed or partial reports and must never
/// crash the caller; the session controller logs it and keeps the raw
/// text.
pub fn decode_report(raw: &str) -> Result<DecodedReport, DecodeError> {
    let report = metar::Metar::parse(raw).map_err(|e| DecodeError(format!("{e:?}")))?;
    Ok(DecodedReport {
        station: report.station.clone(),
        report: Arc::new(report),
    })
}
