/// Prompt construction and reply parsing

use super::{Analysis, AnalysisError};

/// Builds the UK consumer-rights prompt for a complaint
pub fn build_prompt(complaint: &str) -> String {
    format!(
        r#"You are an assistant helping UK consumers understand their rights and draft complaint/refund letters.

User complaint:
"""
{complaint}
"""

1) Briefly identify the type of issue (e.g. "Lost parcel", "Faulty goods", "Landlord repairs", "Subscription cancellation", "Data rights/DSAR", etc).
2) In 3-5 sentences, explain what their likely rights are under UK consumer / tenancy / data law, in plain English.
3) Draft a clear, firm but polite complaint/refund letter they can send. Use generic placeholders like [Retailer], [Landlord], [Order Number], [Date], etc where needed.

Respond ONLY in valid JSON in this exact structure:

{{
  "issueType": "short label here",
  "summary": "3-5 sentence summary here",
  "letter": "full letter here"
}}
"#
    )
}

/// Slices from the first `{` to the last `}` if both exist and are ordered
///
/// Models sometimes wrap the JSON in prose or code fences.
pub fn extract_json_block(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw,
    }
}

/// Parses a model reply into an [`Analysis`]
pub fn parse_analysis(raw: &str) -> Result<Analysis, AnalysisError> {
    if raw.trim().is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    serde_json::from_str(extract_json_block(raw)).map_err(|e| AnalysisError::InvalidJson(e.to_string()))
}
