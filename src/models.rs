use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

// --- Roles and statuses ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employer,
}

impl Role {
    pub fn key(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employer => "employer",
        }
    }

    pub fn path_prefix(&self) -> &'static str {
        match self {
            Role::Admin => "/api/admin",
            Role::Employer => "/api/employer",
        }
    }

    pub fn login_hint(&self) -> String {
        format!("redflag auth set-token <token> --role {}", self.key())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Account status shared by employer accounts and candidate-user accounts.
/// The server is the final authority on transitions; the client only uses
/// this to decide which actions to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

impl AccountStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(AccountStatus::Pending),
            "approved" | "active" => Some(AccountStatus::Approved),
            "rejected" => Some(AccountStatus::Rejected),
            "suspended" => Some(AccountStatus::Suspended),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Approved => "approved",
            AccountStatus::Rejected => "rejected",
            AccountStatus::Suspended => "suspended",
        }
    }

    /// Allowed transitions: pending -> {approved, rejected}, approved <-> suspended.
    pub fn can_transition(&self, action: WorkflowAction) -> bool {
        matches!(
            (self, action),
            (AccountStatus::Pending, WorkflowAction::Approve)
                | (AccountStatus::Pending, WorkflowAction::Reject)
                | (AccountStatus::Approved, WorkflowAction::Suspend)
                | (AccountStatus::Suspended, WorkflowAction::Unsuspend)
        )
    }

    pub fn allowed_actions(&self) -> Vec<WorkflowAction> {
        WorkflowAction::ALL
            .iter()
            .copied()
            .filter(|a| self.can_transition(*a))
            .collect()
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Approve,
    Reject,
    Suspend,
    Unsuspend,
}

impl WorkflowAction {
    pub const ALL: [WorkflowAction; 4] = [
        WorkflowAction::Approve,
        WorkflowAction::Reject,
        WorkflowAction::Suspend,
        WorkflowAction::Unsuspend,
    ];

    /// Path segment of the transition endpoint, e.g. `/approve`.
    pub fn segment(&self) -> &'static str {
        match self {
            WorkflowAction::Approve => "approve",
            WorkflowAction::Reject => "reject",
            WorkflowAction::Suspend => "suspend",
            WorkflowAction::Unsuspend => "unsuspend",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// 3-way simplification of the free-form offer status, used for
/// filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoiningStatus {
    #[serde(rename = "joined")]
    Joined,
    #[serde(rename = "not_joined")]
    NotJoined,
    #[serde(rename = "pending")]
    Pending,
}

impl JoiningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoiningStatus::Joined => "joined",
            JoiningStatus::NotJoined => "not_joined",
            JoiningStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for JoiningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the joining status from a free-form offer status. "Joined ..."
/// counts as joined, "Not Joined ..." (e.g. "Not Joined After Acceptance")
/// as not joined, everything else stays pending. The joining status is
/// never set independently of this mapping.
pub fn map_offer_to_joining(offer_status: &str) -> JoiningStatus {
    let s = offer_status.trim().to_lowercase();
    if s.starts_with("not joined") {
        JoiningStatus::NotJoined
    } else if s.starts_with("joined") {
        JoiningStatus::Joined
    } else {
        JoiningStatus::Pending
    }
}

// --- Entities ---
//
// Canonical shapes. The backend is inconsistent about field names
// (`_id` vs `id`, `company` vs `companyName`); the adapters below are the
// only place that knows that, nothing past this module sees raw server
// field names.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employer {
    pub id: String,
    pub company_name: String,
    pub email: String,
    pub status: AccountStatus,
    pub candidate_count: u64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub uan: Option<String>,
    pub job_role: Option<String>,
    pub offer_date: Option<String>,
    pub offer_status: String,
    pub joining_status: JoiningStatus,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub employer_id: Option<String>,
    pub employer_name: Option<String>, // denormalized for convenience
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateUser {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub pan: Option<String>,
    pub uan: Option<String>,
    pub qualification: Option<String>,
    pub skills: Vec<String>,
    pub current_ctc: Option<String>,
    pub notice_period: Option<String>,
    pub status: AccountStatus,
    pub update_history: Vec<UpdateHistoryEntry>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateHistoryEntry {
    /// Server-assigned identity. Locally appended entries carry `None`
    /// until the next full reload.
    pub id: Option<String>,
    pub points: u32,
    pub date: String,
    pub updated_by_role: Role,
    pub updated_by_name: String,
    pub company_name: Option<String>,
    pub notes: String,
    /// Server-authored, read-only on this side.
    pub comments: Vec<HistoryComment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryComment {
    pub author: Option<String>,
    pub text: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerProfile {
    pub company_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub pan: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_employers: u64,
    pub pending_approvals: u64,
    pub total_candidates: u64,
    pub red_flagged: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub kind: String,
    pub message: String,
    pub time: String,
    pub timestamp: i64,
}

// --- Normalization adapters ---

/// Collections arrive either as a bare array or wrapped in an object under
/// one of several keys (`data`, `employers`, `candidates`, ...).
pub fn unwrap_collection(value: Value, keys: &[&str]) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => {
            for key in keys {
                if let Some(Value::Array(items)) = obj.remove(*key) {
                    return items;
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn str_field(v: &Value, names: &[&str]) -> Option<String> {
    for name in names {
        match v.get(*name) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn u64_field(v: &Value, names: &[&str]) -> u64 {
    for name in names {
        if let Some(n) = v.get(*name).and_then(Value::as_u64) {
            return n;
        }
    }
    0
}

pub fn employer_from_value(v: &Value) -> Option<Employer> {
    Some(Employer {
        id: str_field(v, &["_id", "id"])?,
        company_name: str_field(v, &["companyName", "company", "name"]).unwrap_or_default(),
        email: str_field(v, &["email"]).unwrap_or_default(),
        status: str_field(v, &["status"])
            .and_then(|s| AccountStatus::parse(&s))
            .unwrap_or(AccountStatus::Pending),
        candidate_count: u64_field(v, &["candidateCount", "candidatesCount"]),
        created_at: str_field(v, &["createdAt", "created_at"]).unwrap_or_default(),
    })
}

pub fn candidate_from_value(v: &Value) -> Option<Candidate> {
    let offer_status = str_field(v, &["offerStatus", "offer_status"]).unwrap_or_default();
    Some(Candidate {
        id: str_field(v, &["_id", "id"])?,
        full_name: str_field(v, &["fullName", "name", "candidateName"]).unwrap_or_default(),
        email: str_field(v, &["email"]).unwrap_or_default(),
        phone: str_field(v, &["phone", "mobile"]),
        uan: str_field(v, &["uan"]),
        job_role: str_field(v, &["jobRole", "position", "role"]),
        offer_date: str_field(v, &["offerDate", "offer_date"]),
        joining_status: map_offer_to_joining(&offer_status),
        offer_status,
        reason: str_field(v, &["reason"]),
        notes: str_field(v, &["notes"]),
        employer_id: str_field(v, &["employerId", "employer_id"]),
        employer_name: str_field(v, &["employerName", "companyName", "company"]),
        created_at: str_field(v, &["createdAt", "created_at"]).unwrap_or_default(),
    })
}

pub fn candidate_user_from_value(v: &Value) -> Option<CandidateUser> {
    let skills = match v.get("skills") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|s| s.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    let update_history = match v.get("updateHistory").or_else(|| v.get("update_history")) {
        Some(Value::Array(items)) => items.iter().filter_map(history_entry_from_value).collect(),
        _ => Vec::new(),
    };

    Some(CandidateUser {
        id: str_field(v, &["_id", "id"])?,
        full_name: str_field(v, &["fullName", "name"]).unwrap_or_default(),
        email: str_field(v, &["email"]).unwrap_or_default(),
        phone: str_field(v, &["phone", "mobile"]),
        pan: str_field(v, &["pan", "panNumber"]),
        uan: str_field(v, &["uan", "uanNumber"]),
        qualification: str_field(v, &["qualification", "highestQualification"]),
        skills,
        current_ctc: str_field(v, &["currentCtc", "ctc"]),
        notice_period: str_field(v, &["noticePeriod"]),
        status: str_field(v, &["status"])
            .and_then(|s| AccountStatus::parse(&s))
            .unwrap_or(AccountStatus::Pending),
        update_history,
        created_at: str_field(v, &["createdAt", "created_at"]).unwrap_or_default(),
    })
}

pub fn history_entry_from_value(v: &Value) -> Option<UpdateHistoryEntry> {
    let comments = match v.get("comments") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|c| {
                Some(HistoryComment {
                    author: str_field(c, &["author", "by"]),
                    text: str_field(c, &["text", "comment"])?,
                    date: str_field(c, &["date", "createdAt"]),
                })
            })
            .collect(),
        _ => Vec::new(),
    };

    Some(UpdateHistoryEntry {
        id: str_field(v, &["_id", "id"]),
        points: u64_field(v, &["points"]) as u32,
        date: str_field(v, &["date", "createdAt"]).unwrap_or_default(),
        updated_by_role: match str_field(v, &["updatedByRole", "role"]).as_deref() {
            Some("admin") => Role::Admin,
            _ => Role::Employer,
        },
        updated_by_name: str_field(v, &["updatedByName", "updatedBy"]).unwrap_or_default(),
        company_name: str_field(v, &["companyName", "company"]),
        notes: str_field(v, &["notes", "note"]).unwrap_or_default(),
        comments,
    })
}

pub fn profile_from_value(v: &Value) -> EmployerProfile {
    EmployerProfile {
        company_name: str_field(v, &["companyName", "company", "name"]).unwrap_or_default(),
        email: str_field(v, &["email"]).unwrap_or_default(),
        phone: str_field(v, &["phone", "mobile"]),
        pan: str_field(v, &["pan", "panNumber"]),
        address: str_field(v, &["address"]),
    }
}

pub fn metrics_from_value(v: &Value) -> DashboardMetrics {
    DashboardMetrics {
        total_employers: u64_field(v, &["totalEmployers", "employers"]),
        pending_approvals: u64_field(v, &["pendingApprovals", "pending"]),
        total_candidates: u64_field(v, &["totalCandidates", "candidates"]),
        red_flagged: u64_field(v, &["redFlagged", "flagged"]),
    }
}

// --- Client-side validation ---
//
// A validation failure never sends a request; the caller shows the message
// inline and stops.

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern"));
static PAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("pan pattern"));

pub fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s.trim())
}

pub fn is_valid_pan(s: &str) -> bool {
    PAN_RE.is_match(s.trim())
}

// --- Offline demo data ---
//
// Substituted for the list flows when the server is unreachable so the
// tool stays demonstrable without a backend.

pub fn demo_employers() -> Vec<Employer> {
    vec![
        Employer {
            id: "demo-emp-1".to_string(),
            company_name: "Brightpath Software".to_string(),
            email: "hr@brightpath.example".to_string(),
            status: AccountStatus::Pending,
            candidate_count: 12,
            created_at: "2025-11-02".to_string(),
        },
        Employer {
            id: "demo-emp-2".to_string(),
            company_name: "Nimbus Analytics".to_string(),
            email: "talent@nimbus.example".to_string(),
            status: AccountStatus::Approved,
            candidate_count: 48,
            created_at: "2025-08-19".to_string(),
        },
    ]
}

pub fn demo_candidate_users() -> Vec<CandidateUser> {
    vec![CandidateUser {
        id: "demo-cu-1".to_string(),
        full_name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: Some("9876543210".to_string()),
        pan: None,
        uan: Some("100200300400".to_string()),
        qualification: Some("B.Tech".to_string()),
        skills: vec!["rust".to_string(), "sql".to_string()],
        current_ctc: None,
        notice_period: Some("30 days".to_string()),
        status: AccountStatus::Approved,
        update_history: vec![UpdateHistoryEntry {
            id: Some("demo-h-1".to_string()),
            points: 1,
            date: "2025-12-01".to_string(),
            updated_by_role: Role::Employer,
            updated_by_name: "Nimbus Analytics".to_string(),
            company_name: Some("Nimbus Analytics".to_string()),
            notes: "Offer letter issued for backend engineer role".to_string(),
            comments: Vec::new(),
        }],
        created_at: "2025-10-12".to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_offer_to_joining() {
        assert_eq!(map_offer_to_joining("Joined"), JoiningStatus::Joined);
        assert_eq!(map_offer_to_joining("Not Joined"), JoiningStatus::NotJoined);
        assert_eq!(
            map_offer_to_joining("Not Joined After Acceptance"),
            JoiningStatus::NotJoined
        );
        assert_eq!(map_offer_to_joining("Offer Letter Given"), JoiningStatus::Pending);
        assert_eq!(map_offer_to_joining("Ghosted After Offer"), JoiningStatus::Pending);
        assert_eq!(map_offer_to_joining(""), JoiningStatus::Pending);
    }

    #[test]
    fn test_status_transitions() {
        assert!(AccountStatus::Pending.can_transition(WorkflowAction::Approve));
        assert!(AccountStatus::Pending.can_transition(WorkflowAction::Reject));
        assert!(AccountStatus::Approved.can_transition(WorkflowAction::Suspend));
        assert!(AccountStatus::Suspended.can_transition(WorkflowAction::Unsuspend));

        assert!(!AccountStatus::Approved.can_transition(WorkflowAction::Approve));
        assert!(!AccountStatus::Rejected.can_transition(WorkflowAction::Approve));
        assert!(!AccountStatus::Pending.can_transition(WorkflowAction::Suspend));
        assert!(!AccountStatus::Suspended.can_transition(WorkflowAction::Suspend));
    }

    #[test]
    fn test_approved_account_offers_only_suspend() {
        let actions = AccountStatus::Approved.allowed_actions();
        assert_eq!(actions, vec![WorkflowAction::Suspend]);
    }

    #[test]
    fn test_employer_normalization_field_fallbacks() {
        // Mongo-style shape
        let a = json!({"_id": "65f1", "companyName": "Acme", "email": "x@acme.com",
                       "status": "pending", "candidateCount": 3, "createdAt": "2025-01-01"});
        // Legacy shape
        let b = json!({"id": "9", "company": "Acme", "email": "x@acme.com", "status": "approved"});

        let ea = employer_from_value(&a).unwrap();
        assert_eq!(ea.id, "65f1");
        assert_eq!(ea.company_name, "Acme");
        assert_eq!(ea.status, AccountStatus::Pending);
        assert_eq!(ea.candidate_count, 3);

        let eb = employer_from_value(&b).unwrap();
        assert_eq!(eb.id, "9");
        assert_eq!(eb.company_name, "Acme");
        assert_eq!(eb.status, AccountStatus::Approved);
        assert_eq!(eb.candidate_count, 0);
    }

    #[test]
    fn test_candidate_joining_status_derived() {
        let v = json!({"_id": "c1", "name": "Ravi", "email": "r@x.com",
                       "offerStatus": "Not Joined After Acceptance"});
        let c = candidate_from_value(&v).unwrap();
        assert_eq!(c.joining_status, JoiningStatus::NotJoined);
        assert_eq!(c.offer_status, "Not Joined After Acceptance");
    }

    #[test]
    fn test_unwrap_collection_shapes() {
        let bare = json!([{"_id": "1"}]);
        assert_eq!(unwrap_collection(bare, &["data"]).len(), 1);

        let wrapped = json!({"data": [{"_id": "1"}, {"_id": "2"}]});
        assert_eq!(unwrap_collection(wrapped, &["employers", "data"]).len(), 2);

        let empty = json!({"message": "ok"});
        assert!(unwrap_collection(empty, &["data"]).is_empty());
    }

    #[test]
    fn test_history_entry_normalization() {
        let v = json!({"_id": "h1", "points": 2, "date": "2025-12-01",
                       "updatedByRole": "admin", "updatedByName": "Ops",
                       "notes": "verified UAN",
                       "comments": [{"text": "seen", "author": "system"}]});
        let e = history_entry_from_value(&v).unwrap();
        assert_eq!(e.id.as_deref(), Some("h1"));
        assert_eq!(e.points, 2);
        assert_eq!(e.updated_by_role, Role::Admin);
        assert_eq!(e.comments.len(), 1);
    }

    #[test]
    fn test_record_without_identity_is_skipped() {
        assert!(employer_from_value(&json!({"companyName": "NoId"})).is_none());
        assert!(candidate_from_value(&json!({"name": "NoId"})).is_none());
    }

    #[test]
    fn test_validators() {
        assert!(is_valid_email("asha@co.com"));
        assert!(!is_valid_email("asha@"));
        assert!(!is_valid_email("not-an-email"));

        assert!(is_valid_pan("ABCDE1234F"));
        assert!(!is_valid_pan("abcde1234f"));
        assert!(!is_valid_pan("ABC1234F"));
    }
}
