//! Extraction of the JSON object from a model reply.

use crate::ledger::CandidateEntry;

/// Locates the JSON object in `reply`.
///
/// Prefers a fenced code block; otherwise takes the span from the first
/// `{` to the last `}`.
#[must_use]
pub fn extract_json(reply: &str) -> Option<&str> {
    let body = fenced(reply).unwrap_or(reply);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}

fn fenced(reply: &str) -> Option<&str> {
    let open = reply.find("```")?;
    let rest = &reply[open + 3..];
    // Skip the info string, e.g. "json".
    let rest = &rest[rest.find('\n').map_or(0, |i| i + 1)..];
    let close = rest.find("```")?;
    Some(&rest[..close])
}

/// Parses a reply into a candidate entry.
///
/// # Errors
///
/// Returns a description of the problem, suitable for a repair prompt.
pub fn parse_candidate(reply: &str) -> Result<CandidateEntry, String> {
    let json = extract_json(reply).ok_or_else(|| "no JSON object found".to_string())?;
    serde_json::from_str(json).map_err(|e| e.to_string())
}
