use anyhow::{Context, Result};
use serde_json::{Value, json};
use tracing::debug;

use crate::models::{
    AccountStatus, Candidate, CandidateUser, DashboardMetrics, Employer, EmployerProfile, Role,
    UpdateHistoryEntry, WorkflowAction, candidate_from_value, candidate_user_from_value,
    employer_from_value, history_entry_from_value, metrics_from_value, profile_from_value,
    unwrap_collection,
};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client-observed failure classes. Commands match on these to decide
/// behavior: `Unauthorized` forces a logout, `Unreachable` lets list flows
/// fall back to demo data, everything else becomes an inline message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("session expired or not authenticated")]
    Unauthorized,
    #[error("you do not have permission to perform this action")]
    Forbidden,
    #[error("endpoint not found on server")]
    NotFound,
    #[error("cannot reach server")]
    Unreachable(#[source] reqwest::Error),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("invalid response from server: {0}")]
    Invalid(String),
}

/// Best-effort message extraction from an error body: prefer the JSON
/// `message`/`error` field, fall back to the raw body, then to a generic
/// string carrying the status code.
pub fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("server returned status {}", status)
    } else {
        trimmed.to_string()
    }
}

pub struct ApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    role: Role,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, role: Role, token: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            role,
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.role.path_prefix(), path)
    }

    fn send(&self, mut req: reqwest::blocking::RequestBuilder) -> Result<Value, ApiError> {
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().map_err(ApiError::Unreachable)?;
        let status = resp.status();
        debug!(status = status.as_u16(), "api response");

        match status.as_u16() {
            401 => return Err(ApiError::Unauthorized),
            403 => return Err(ApiError::Forbidden),
            404 => return Err(ApiError::NotFound),
            _ => {}
        }

        let body = resp.text().map_err(|e| ApiError::Invalid(e.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: extract_error_message(status.as_u16(), &body),
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Invalid(e.to_string()))
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        self.send(self.client.get(&url).query(query))
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        self.send(self.client.post(&url).json(body))
    }

    fn patch(&self, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(%url, "PATCH");
        let mut req = self.client.patch(&url);
        if let Some(body) = body {
            req = req.json(body);
        }
        self.send(req)
    }

    fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(%url, "PUT");
        self.send(self.client.put(&url).json(body))
    }

    fn delete(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(%url, "DELETE");
        self.send(self.client.delete(&url))
    }

    // --- Admin: employers ---

    pub fn list_employers(&self) -> Result<Vec<Employer>, ApiError> {
        let value = self.get("/employers", &[])?;
        Ok(unwrap_collection(value, &["employers", "data"])
            .iter()
            .filter_map(employer_from_value)
            .collect())
    }

    pub fn employer_action(&self, id: &str, action: WorkflowAction) -> Result<(), ApiError> {
        self.patch(&format!("/employers/{}/{}", id, action.segment()), None)?;
        Ok(())
    }

    // --- Admin: candidate users ---

    pub fn list_candidate_users(
        &self,
        status: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<CandidateUser>, ApiError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(s) = status {
            query.push(("status", s));
        }
        if let Some(q) = search {
            query.push(("search", q));
        }
        let value = self.get("/candidate-users", &query)?;
        Ok(unwrap_collection(value, &["candidateUsers", "candidates", "data"])
            .iter()
            .filter_map(candidate_user_from_value)
            .collect())
    }

    pub fn get_candidate_user(&self, id: &str) -> Result<CandidateUser, ApiError> {
        let value = self.get(&format!("/candidate-users/{}", id), &[])?;
        let record = unwrap_record(value, &["candidateUser", "data"]);
        candidate_user_from_value(&record)
            .ok_or_else(|| ApiError::Invalid("candidate record missing identity".to_string()))
    }

    pub fn candidate_user_action(&self, id: &str, action: WorkflowAction) -> Result<(), ApiError> {
        self.patch(&format!("/candidate-users/{}/{}", id, action.segment()), None)?;
        Ok(())
    }

    // --- Status history (admin and employer paths differ for "add") ---

    /// Add a status note. For the admin this is the status-update endpoint
    /// (optionally carrying a new account status); for the employer it is
    /// the update-history sub-resource.
    pub fn add_status_note(
        &self,
        candidate_id: &str,
        status: Option<AccountStatus>,
        note: &str,
    ) -> Result<(), ApiError> {
        let mut body = json!({ "note": note });
        if let Some(status) = status {
            body["status"] = json!(status.as_str());
        }
        let path = match self.role {
            Role::Admin => format!("/candidate-users/{}/status", candidate_id),
            Role::Employer => format!("/candidate-users/{}/update-history", candidate_id),
        };
        self.patch(&path, Some(&body))?;
        Ok(())
    }

    pub fn edit_history_entry(
        &self,
        candidate_id: &str,
        entry_id: &str,
        note: &str,
    ) -> Result<(), ApiError> {
        let body = json!({ "notes": note });
        self.patch(
            &format!("/candidate-users/{}/update-history/{}", candidate_id, entry_id),
            Some(&body),
        )?;
        Ok(())
    }

    pub fn delete_history_entry(
        &self,
        candidate_id: &str,
        entry_id: &str,
    ) -> Result<(), ApiError> {
        self.delete(&format!(
            "/candidate-users/{}/update-history/{}",
            candidate_id, entry_id
        ))?;
        Ok(())
    }

    pub fn fetch_update_history(
        &self,
        candidate_id: &str,
    ) -> Result<Vec<UpdateHistoryEntry>, ApiError> {
        let value = self.get(&format!("/candidate-users/{}/update-history", candidate_id), &[])?;
        Ok(unwrap_collection(value, &["updateHistory", "history", "data"])
            .iter()
            .filter_map(history_entry_from_value)
            .collect())
    }

    // --- Employer: candidate records ---

    pub fn list_candidates(
        &self,
        search: Option<&str>,
        search_type: Option<&str>,
    ) -> Result<Vec<Candidate>, ApiError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(q) = search {
            query.push(("search", q));
        }
        if let Some(t) = search_type {
            query.push(("type", t));
        }
        let value = self.get("/candidates/all", &query)?;
        Ok(unwrap_collection(value, &["candidates", "data"])
            .iter()
            .filter_map(candidate_from_value)
            .collect())
    }

    pub fn create_candidate(&self, payload: &Value) -> Result<(), ApiError> {
        self.post("/candidates", payload)?;
        Ok(())
    }

    // --- Employer: profile ---

    pub fn get_profile(&self) -> Result<EmployerProfile, ApiError> {
        let value = self.get("/profile", &[])?;
        Ok(profile_from_value(&unwrap_record(value, &["profile", "data"])))
    }

    pub fn update_profile(&self, profile: &Value) -> Result<(), ApiError> {
        self.put("/profile", profile)?;
        Ok(())
    }

    // --- Admin: overview metrics ---

    pub fn metrics(&self) -> Result<DashboardMetrics, ApiError> {
        let value = self.get("/metrics", &[])?;
        Ok(metrics_from_value(&unwrap_record(value, &["metrics", "data"])))
    }
}

/// Single records arrive either bare or wrapped under one of several keys.
fn unwrap_record(value: Value, keys: &[&str]) -> Value {
    if let Value::Object(obj) = &value {
        for key in keys {
            if let Some(inner) = obj.get(*key) {
                if inner.is_object() {
                    return inner.clone();
                }
            }
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_message_prefers_json_message() {
        assert_eq!(
            extract_error_message(500, r#"{"message": "employer not found"}"#),
            "employer not found"
        );
        assert_eq!(
            extract_error_message(400, r#"{"error": "bad id"}"#),
            "bad id"
        );
    }

    #[test]
    fn test_extract_error_message_falls_back_to_body_then_status() {
        assert_eq!(extract_error_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_error_message(500, ""), "server returned status 500");
        assert_eq!(extract_error_message(500, "  "), "server returned status 500");
        // JSON without a usable message field falls back to the raw body
        assert_eq!(
            extract_error_message(500, r#"{"ok": false}"#),
            r#"{"ok": false}"#
        );
    }

    #[test]
    fn test_unwrap_record_shapes() {
        let wrapped: Value = serde_json::json!({"data": {"_id": "1", "email": "a@b.co"}});
        assert_eq!(unwrap_record(wrapped, &["data"])["_id"], "1");

        let bare: Value = serde_json::json!({"_id": "2"});
        assert_eq!(unwrap_record(bare, &["data"])["_id"], "2");
    }
}
