use super::task::Latest;
use crate::api::{ApiClient, ApiResult, BypassRulesDto, SaveResponse, ValidationResult};
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Diagnostics shown under the validation badge.
pub const MAX_MESSAGES: usize = 3;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

enum Outcome {
    Loaded(ApiResult<BypassRulesDto>),
    /// Carries the text that was sent so it can become the new server copy.
    Saved(String, ApiResult<SaveResponse>),
}

/// Editor for `/bypass-rules` with debounced validation and ETag-guarded
/// saves.
pub struct BypassRulesEditor {
    client: ApiClient,
    debounce: Duration,
    pub raw: String,
    pub server_raw: String,
    pub etag: Option<String>,
    pub loading: bool,
    pub saving: bool,
    pub saved_at: Option<DateTime<Local>>,
    pub validation: Option<ValidationResult>,
    pub message: Option<String>,
    validate_due: Option<Instant>,
    io: Latest<Outcome>,
    validator: Latest<ApiResult<ValidationResult>>,
}

impl BypassRulesEditor {
    pub fn new(client: ApiClient, debounce: Duration) -> Self {
        Self {
            client,
            debounce,
            raw: String::new(),
            server_raw: String::new(),
            etag: None,
            loading: false,
            saving: false,
            saved_at: None,
            validation: None,
            message: None,
            validate_due: None,
            io: Latest::new(),
            validator: Latest::new(),
        }
    }

    pub fn dirty(&self) -> bool {
        self.raw != self.server_raw
    }

    pub fn can_save(&self) -> bool {
        self.dirty() && !self.loading && !self.saving
    }

    /// Fetch `{etag, raw}`. Refused while a save is in flight. Pending
    /// validation of the outgoing buffer is dropped.
    pub fn load(&mut self) -> bool {
        if self.saving {
            return false;
        }
        let client = self.client.clone();
        self.validator.cancel();
        self.validate_due = None;
        self.loading = true;
        self.io
            .start(async move { Outcome::Loaded(client.bypass_rules().await) });
        true
    }

    /// Replace the buffer and (re)arm the validation timer.
    pub fn set_raw(&mut self, raw: String, now: Instant) {
        self.raw = raw;
        self.validate_due = Some(now + self.debounce);
    }

    pub fn validation_due(&self) -> Option<Instant> {
        self.validate_due
    }

    /// Fire the debounced validation once its timer has expired. Returns
    /// true when a request was started.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.validate_due {
            Some(due) if due <= now => {
                self.validate_due = None;
                self.validate_now();
                true
            }
            _ => false,
        }
    }

    /// Validate the current buffer. A newer validation supersedes an older
    /// one still in flight.
    pub fn validate_now(&mut self) {
        let client = self.client.clone();
        let raw = self.raw.clone();
        self.validator
            .start(async move { client.validate_bypass_rules(&raw).await });
    }

    /// Conditional save with `If-Match: <etag>`. Returns false when saving
    /// is not possible right now.
    pub fn save(&mut self) -> bool {
        if !self.can_save() {
            return false;
        }
        let client = self.client.clone();
        let raw = self.raw.clone();
        let etag = self.etag.clone();
        self.saving = true;
        self.message = None;
        self.io.start(async move {
            let result = client.save_bypass_rules(&raw, etag.as_deref()).await;
            Outcome::Saved(raw, result)
        });
        true
    }

    /// Collect finished requests. Returns true when the buffer was replaced by
    /// a load.
    pub fn poll(&mut self) -> bool {
        if let Some(result) = self.validator.poll() {
            self.commit_validation(result);
        }
        match self.io.poll() {
            Some(outcome) => self.commit(outcome),
            None => false,
        }
    }

    /// Wait for pending load/save and validation requests.
    pub async fn settle(&mut self) -> bool {
        if let Some(result) = self.validator.wait().await {
            self.commit_validation(result);
        }
        match self.io.wait().await {
            Some(outcome) => self.commit(outcome),
            None => false,
        }
    }

    fn commit_validation(&mut self, result: ApiResult<ValidationResult>) {
        match result {
            Ok(validation) => self.validation = Some(validation),
            Err(e) => {
                warn!(error = %e, "bypass rules validation failed");
                self.validation = Some(ValidationResult {
                    ok: false,
                    messages: vec![e.to_string()],
                });
            }
        }
    }

    fn commit(&mut self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Loaded(result) => {
                self.loading = false;
                match result {
                    Ok(dto) => {
                        let raw = dto.raw.unwrap_or_default();
                        self.server_raw = raw.clone();
                        self.raw = raw;
                        self.etag = dto.etag;
                        self.validator.cancel();
                        self.validation = None;
                        self.validate_due = Some(Instant::now() + self.debounce);
                        self.message = None;
                        true
                    }
                    Err(e) => {
                        self.message = Some(format!("Load failed: {}", e));
                        false
                    }
                }
            }
            Outcome::Saved(sent, result) => {
                self.saving = false;
                match result {
                    Ok(resp) if !resp.ok => {
                        warn!("bypass rules save rejected");
                        self.message = Some("Save failed: save failed".to_string());
                    }
                    Ok(resp) => {
                        if resp.etag.is_some() {
                            self.etag = resp.etag;
                        }
                        self.server_raw = sent;
                        let now = Local::now();
                        self.saved_at = Some(now);
                        self.message = Some(format!("Saved at {}", now.format("%H:%M:%S")));
                        info!(etag = ?self.etag, "bypass rules saved");
                    }
                    Err(e) => {
                        self.message = Some(format!("Save failed: {}", e));
                    }
                }
                false
            }
        }
    }

    /// Validation diagnostics, capped at `MAX_MESSAGES`.
    pub fn visible_messages(&self) -> &[String] {
        match &self.validation {
            Some(v) => &v.messages[..v.messages.len().min(MAX_MESSAGES)],
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> BypassRulesEditor {
        let client = ApiClient::new("http://127.0.0.1:9/mamotama-api", None, Duration::from_secs(1)).unwrap();
        BypassRulesEditor::new(client, DEFAULT_DEBOUNCE)
    }

    #[test]
    fn test_save_disabled_until_buffer_differs() {
        let mut editor = editor();
        editor.server_raw = "/healthz\n".to_string();
        editor.raw = "/healthz\n".to_string();
        assert!(!editor.dirty());
        assert!(!editor.can_save());

        editor.raw.push_str("/metrics\n");
        assert!(editor.dirty());
        assert!(editor.can_save());

        editor.loading = true;
        assert!(!editor.can_save());
        editor.loading = false;
        editor.saving = true;
        assert!(!editor.can_save());
    }

    #[test]
    fn test_save_is_refused_when_clean() {
        let mut editor = editor();
        assert!(!editor.save());
        assert!(!editor.saving);
    }

    #[tokio::test]
    async fn test_debounce_resets_on_each_edit() {
        let mut editor = editor();
        let t0 = Instant::now();

        editor.set_raw("/a".to_string(), t0);
        editor.set_raw("/ab".to_string(), t0 + Duration::from_millis(200));

        assert!(!editor.tick(t0 + Duration::from_millis(400)));
        assert!(editor.tick(t0 + Duration::from_millis(500)));
        assert!(!editor.tick(t0 + Duration::from_millis(900)));
        assert!(editor.validation_due().is_none());
    }

    #[test]
    fn test_successful_save_reconciles() {
        let mut editor = editor();
        editor.server_raw = "old".to_string();
        editor.raw = "new".to_string();
        editor.etag = Some("W/\"sha256:old\"".to_string());
        editor.saving = true;

        editor.commit(Outcome::Saved(
            "new".to_string(),
            Ok(SaveResponse {
                ok: true,
                etag: Some("W/\"sha256:new\"".to_string()),
            }),
        ));

        assert!(!editor.dirty());
        assert!(!editor.saving);
        assert_eq!(editor.etag.as_deref(), Some("W/\"sha256:new\""));
        assert!(editor.saved_at.is_some());
    }

    #[test]
    fn test_edits_during_save_stay_dirty() {
        let mut editor = editor();
        editor.raw = "typed after save".to_string();
        editor.saving = true;

        editor.commit(Outcome::Saved(
            "sent".to_string(),
            Ok(SaveResponse {
                ok: true,
                etag: Some("e2".to_string()),
            }),
        ));

        assert_eq!(editor.server_raw, "sent");
        assert!(editor.dirty());
    }

    #[test]
    fn test_failed_save_keeps_etag() {
        let mut editor = editor();
        editor.raw = "x".to_string();
        editor.etag = Some("e1".to_string());
        editor.saving = true;

        editor.commit(Outcome::Saved(
            "x".to_string(),
            Err(crate::api::ApiError::Http {
                status: 409,
                message: "conflict".to_string(),
            }),
        ));

        assert_eq!(editor.etag.as_deref(), Some("e1"));
        assert!(editor.dirty());
        assert_eq!(editor.message.as_deref(), Some("Save failed: conflict"));
    }

    #[test]
    fn test_rejected_save_stays_dirty() {
        let mut editor = editor();
        editor.server_raw = "old".to_string();
        editor.raw = "new".to_string();
        editor.etag = Some("e1".to_string());
        editor.saving = true;

        editor.commit(Outcome::Saved(
            "new".to_string(),
            Ok(SaveResponse {
                ok: false,
                etag: Some("e2".to_string()),
            }),
        ));

        assert!(!editor.saving);
        assert!(editor.dirty());
        assert_eq!(editor.server_raw, "old");
        assert_eq!(editor.etag.as_deref(), Some("e1"));
        assert!(editor.saved_at.is_none());
        assert_eq!(editor.message.as_deref(), Some("Save failed: save failed"));
    }

    #[tokio::test]
    async fn test_load_arms_validation() {
        let mut editor = editor();
        editor.loading = true;

        let replaced = editor.commit(Outcome::Loaded(Ok(BypassRulesDto {
            etag: Some("e1".to_string()),
            raw: Some("/healthz\n".to_string()),
        })));

        assert!(replaced);
        assert!(!editor.dirty());
        assert!(editor.validation_due().is_some());
    }

    #[test]
    fn test_visible_messages_are_capped() {
        let mut editor = editor();
        editor.validation = Some(ValidationResult {
            ok: false,
            messages: (0..8).map(|i| format!("line {}: bad", i)).collect(),
        });
        assert_eq!(editor.visible_messages().len(), MAX_MESSAGES);
    }
}
