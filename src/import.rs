use anyhow::{Result, anyhow, bail};
use csv::{ReaderBuilder, Trim};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

use crate::api::{ApiClient, ApiError};
use crate::models::{is_valid_email, map_offer_to_joining};

// --- Parse ---

#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Delimiter is sniffed from the header line: `;`, then tab, else comma.
pub fn detect_delimiter(header_line: &str) -> u8 {
    if header_line.contains(';') {
        b';'
    } else if header_line.contains('\t') {
        b'\t'
    } else {
        b','
    }
}

/// Parse a delimited upload. Blank lines are dropped before parsing; the
/// first remaining line is the header row.
pub fn parse_delimited(input: &str) -> Result<ParsedCsv> {
    let lines: Vec<&str> = input.lines().filter(|l| !l.trim().is_empty()).collect();
    let Some(header_line) = lines.first() else {
        bail!("File is empty");
    };
    let delimiter = detect_delimiter(header_line);
    let text = lines.join("\n");

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = records
        .next()
        .ok_or_else(|| anyhow!("File has no header row"))??
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    if rows.is_empty() {
        bail!("File has a header row but no data rows");
    }

    debug!(columns = headers.len(), rows = rows.len(), "parsed upload");
    Ok(ParsedCsv { headers, rows })
}

// --- Auto-map ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetField {
    FullName,
    Email,
    Phone,
    Uan,
    JobRole,
    OfferDate,
    OfferStatus,
    JoiningDate,
    Reason,
    Notes,
}

impl TargetField {
    pub const ALL: [TargetField; 10] = [
        TargetField::FullName,
        TargetField::Email,
        TargetField::Phone,
        TargetField::Uan,
        TargetField::JobRole,
        TargetField::OfferDate,
        TargetField::OfferStatus,
        TargetField::JoiningDate,
        TargetField::Reason,
        TargetField::Notes,
    ];

    pub const REQUIRED: [TargetField; 2] = [TargetField::FullName, TargetField::Email];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetField::FullName => "fullName",
            TargetField::Email => "email",
            TargetField::Phone => "phone",
            TargetField::Uan => "uan",
            TargetField::JobRole => "jobRole",
            TargetField::OfferDate => "offerDate",
            TargetField::OfferStatus => "offerStatus",
            TargetField::JoiningDate => "joiningDate",
            TargetField::Reason => "reason",
            TargetField::Notes => "notes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        TargetField::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(&normalized))
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proposed column assignment: target field -> source header. Always shown
/// to the user for confirmation or correction before anything is submitted.
pub type FieldMapping = BTreeMap<TargetField, String>;

/// Ordered keyword rules over a lowercased header; the first matching rule
/// decides. Returns `None` for headers nothing claims.
fn match_header(header: &str) -> Option<TargetField> {
    let h = header.to_lowercase();
    if h.contains("name") && !h.contains("company") {
        Some(TargetField::FullName)
    } else if h.contains("uan") || h.contains("employee id") {
        Some(TargetField::Uan)
    } else if h.contains("email") || h.contains("mail") {
        Some(TargetField::Email)
    } else if h.contains("phone") || h.contains("mobile") || h.contains("contact") {
        Some(TargetField::Phone)
    } else if h.contains("role")
        || h.contains("position")
        || h.contains("job")
        || h.contains("designation")
    {
        Some(TargetField::JobRole)
    } else if h.contains("offer") && h.contains("date") {
        Some(TargetField::OfferDate)
    } else if h.contains("join") && h.contains("date") {
        Some(TargetField::JoiningDate)
    } else if h.contains("status") {
        Some(TargetField::OfferStatus)
    } else if h.contains("reason") {
        Some(TargetField::Reason)
    } else if h.contains("note") || h.contains("comment") || h.contains("remark") {
        Some(TargetField::Notes)
    } else {
        None
    }
}

/// Propose a mapping. Each header is assigned to the first rule it matches;
/// the first header claiming a target keeps it. Unmatched headers stay
/// unmapped.
pub fn auto_map(headers: &[String]) -> FieldMapping {
    let mut mapping = FieldMapping::new();
    for header in headers {
        if let Some(target) = match_header(header) {
            mapping.entry(target).or_insert_with(|| header.clone());
        }
    }
    mapping
}

// --- Apply mapping ---

pub type MappedRecord = BTreeMap<TargetField, String>;

/// Project the rows through the confirmed mapping. Fails up front when a
/// required target has no source column or a mapped column does not exist
/// in the file; empty values are omitted from the output records.
pub fn apply_mapping(parsed: &ParsedCsv, mapping: &FieldMapping) -> Result<Vec<MappedRecord>> {
    let missing: Vec<&str> = TargetField::REQUIRED
        .iter()
        .filter(|t| !mapping.contains_key(t))
        .map(|t| t.as_str())
        .collect();
    if !missing.is_empty() {
        bail!("Required fields are not mapped: {}", missing.join(", "));
    }

    let mut columns: Vec<(TargetField, usize)> = Vec::with_capacity(mapping.len());
    for (target, header) in mapping {
        let idx = parsed
            .headers
            .iter()
            .position(|h| h == header)
            .ok_or_else(|| anyhow!("Mapped column '{}' is not present in the file", header))?;
        columns.push((*target, idx));
    }

    let mut records = Vec::with_capacity(parsed.rows.len());
    for row in &parsed.rows {
        let mut record = MappedRecord::new();
        for (target, idx) in &columns {
            if let Some(value) = row.get(*idx) {
                let value = value.trim();
                if !value.is_empty() {
                    record.insert(*target, value.to_string());
                }
            }
        }
        records.push(record);
    }
    Ok(records)
}

/// Build the create-candidate payload for one mapped record. The joining
/// status is always derived from the offer status, never taken from input.
pub fn candidate_payload(record: &MappedRecord) -> Value {
    let mut payload = json!({});
    for (target, value) in record {
        payload[target.as_str()] = json!(value);
    }
    if let Some(offer_status) = record.get(&TargetField::OfferStatus) {
        payload["joiningStatus"] = json!(map_offer_to_joining(offer_status).as_str());
    }
    payload
}

// --- Submit ---

#[derive(Debug, Clone)]
pub struct RowFailure {
    /// 1-based data-row number (header excluded).
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub added: usize,
    pub notified: usize,
    pub failures: Vec<RowFailure>,
}

/// Submit the mapped records sequentially, one create call per row. Each
/// row runs in its own error boundary: a failed row lands in the manifest
/// and the loop continues. Only an authentication failure aborts the rest
/// of the batch, since every remaining row would fail the same way.
pub fn submit_rows(
    api: &ApiClient,
    records: &[MappedRecord],
    notify: bool,
) -> Result<ImportOutcome, ApiError> {
    let mut outcome = ImportOutcome::default();
    for (i, record) in records.iter().enumerate() {
        let payload = candidate_payload(record);
        match api.create_candidate(&payload) {
            Ok(()) => {
                outcome.added += 1;
                if notify {
                    if let Some(email) = record.get(&TargetField::Email) {
                        if send_offer_notification(email) {
                            outcome.notified += 1;
                        }
                    }
                }
            }
            Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
            Err(e) => {
                debug!(row = i + 1, error = %e, "row submission failed");
                outcome.failures.push(RowFailure {
                    row: i + 1,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(outcome)
}

/// Notification delivery is not implemented client-side; the send is a
/// logged stub counted separately from record creation, and a failure here
/// never aborts the import.
fn send_offer_notification(email: &str) -> bool {
    if !is_valid_email(email) {
        info!(%email, "skipping notification, address not valid");
        return false;
    }
    info!(%email, "queued candidate notification");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(parsed: &ParsedCsv) -> Vec<&str> {
        parsed.headers.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("a,b,c"), b',');
        // Semicolon wins over comma when both appear
        assert_eq!(detect_delimiter("a;b,c"), b';');
    }

    #[test]
    fn test_parse_comma_with_blank_lines() {
        let input = "Name,Email\n\nAsha,asha@co.com\n\n\nRavi,ravi@co.com\n";
        let parsed = parse_delimited(input).unwrap();
        assert_eq!(headers(&parsed), vec!["Name", "Email"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0], vec!["Asha", "asha@co.com"]);
    }

    #[test]
    fn test_parse_semicolon_and_tab() {
        let parsed = parse_delimited("Name;Email\nAsha;asha@co.com\n").unwrap();
        assert_eq!(parsed.rows[0], vec!["Asha", "asha@co.com"]);

        let parsed = parse_delimited("Name\tEmail\nAsha\tasha@co.com\n").unwrap();
        assert_eq!(parsed.rows[0], vec!["Asha", "asha@co.com"]);
    }

    #[test]
    fn test_parse_trims_and_unquotes() {
        let parsed = parse_delimited("Name, Email\n\"Rao, Asha\", asha@co.com\n").unwrap();
        assert_eq!(headers(&parsed), vec!["Name", "Email"]);
        assert_eq!(parsed.rows[0], vec!["Rao, Asha", "asha@co.com"]);
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(parse_delimited("").is_err());
        assert!(parse_delimited("\n\n").is_err());
        assert!(parse_delimited("Name,Email\n").is_err());
    }

    #[test]
    fn test_auto_map_scenario() {
        let headers: Vec<String> = ["Full Name", "Work Email", "UAN", "Role"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mapping = auto_map(&headers);
        assert_eq!(mapping.get(&TargetField::FullName).unwrap(), "Full Name");
        assert_eq!(mapping.get(&TargetField::Email).unwrap(), "Work Email");
        assert_eq!(mapping.get(&TargetField::Uan).unwrap(), "UAN");
        assert_eq!(mapping.get(&TargetField::JobRole).unwrap(), "Role");
        assert_eq!(mapping.len(), 4);
    }

    #[test]
    fn test_auto_map_rules() {
        let headers: Vec<String> = [
            "Company Name",
            "Candidate Name",
            "Mobile",
            "Employee ID",
            "Offer Date",
            "Offer Status",
            "Joining Date",
            "Reason",
            "Remarks",
            "Unrelated",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let mapping = auto_map(&headers);

        // "Company Name" must not claim fullName; "Candidate Name" does.
        assert_eq!(mapping.get(&TargetField::FullName).unwrap(), "Candidate Name");
        assert_eq!(mapping.get(&TargetField::Phone).unwrap(), "Mobile");
        assert_eq!(mapping.get(&TargetField::Uan).unwrap(), "Employee ID");
        assert_eq!(mapping.get(&TargetField::OfferDate).unwrap(), "Offer Date");
        assert_eq!(mapping.get(&TargetField::OfferStatus).unwrap(), "Offer Status");
        assert_eq!(mapping.get(&TargetField::JoiningDate).unwrap(), "Joining Date");
        assert_eq!(mapping.get(&TargetField::Reason).unwrap(), "Reason");
        assert_eq!(mapping.get(&TargetField::Notes).unwrap(), "Remarks");
        assert!(!mapping.values().any(|h| h == "Unrelated"));
    }

    #[test]
    fn test_auto_map_first_header_keeps_target() {
        let headers: Vec<String> = ["Name", "Full Name"].iter().map(|s| s.to_string()).collect();
        let mapping = auto_map(&headers);
        assert_eq!(mapping.get(&TargetField::FullName).unwrap(), "Name");
    }

    #[test]
    fn test_apply_mapping_scenario() {
        let parsed =
            parse_delimited("Full Name, Work Email, UAN, Role\nAsha Rao, asha@co.com, 123456, Engineer\n")
                .unwrap();
        let mapping = auto_map(&parsed.headers);
        let records = apply_mapping(&parsed, &mapping).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.get(&TargetField::FullName).unwrap(), "Asha Rao");
        assert_eq!(r.get(&TargetField::Email).unwrap(), "asha@co.com");
        assert_eq!(r.get(&TargetField::Uan).unwrap(), "123456");
        assert_eq!(r.get(&TargetField::JobRole).unwrap(), "Engineer");
    }

    #[test]
    fn test_apply_mapping_requires_name_and_email() {
        let parsed = parse_delimited("UAN,Phone\n1,2\n").unwrap();
        let mapping = auto_map(&parsed.headers);
        let err = apply_mapping(&parsed, &mapping).unwrap_err().to_string();
        assert!(err.contains("fullName"));
        assert!(err.contains("email"));
    }

    #[test]
    fn test_apply_mapping_rejects_unknown_column() {
        let parsed = parse_delimited("Name,Email\nAsha,a@b.co\n").unwrap();
        let mut mapping = auto_map(&parsed.headers);
        mapping.insert(TargetField::Phone, "No Such Column".to_string());
        assert!(apply_mapping(&parsed, &mapping).is_err());
    }

    #[test]
    fn test_apply_mapping_omits_empty_values() {
        let parsed = parse_delimited("Name,Email,Phone\nAsha,a@b.co,\n").unwrap();
        let mapping = auto_map(&parsed.headers);
        let records = apply_mapping(&parsed, &mapping).unwrap();
        assert!(!records[0].contains_key(&TargetField::Phone));
    }

    #[test]
    fn test_candidate_payload_derives_joining_status() {
        let mut record = MappedRecord::new();
        record.insert(TargetField::FullName, "Asha".to_string());
        record.insert(TargetField::OfferStatus, "Not Joined After Acceptance".to_string());
        let payload = candidate_payload(&record);
        assert_eq!(payload["fullName"], "Asha");
        assert_eq!(payload["joiningStatus"], "not_joined");

        let mut plain = MappedRecord::new();
        plain.insert(TargetField::FullName, "Asha".to_string());
        assert!(candidate_payload(&plain).get("joiningStatus").is_none());
    }

    #[test]
    fn test_target_field_parse() {
        assert_eq!(TargetField::parse("fullName"), Some(TargetField::FullName));
        assert_eq!(TargetField::parse("full-name"), Some(TargetField::FullName));
        assert_eq!(TargetField::parse("jobrole"), Some(TargetField::JobRole));
        assert_eq!(TargetField::parse("bogus"), None);
    }
}
