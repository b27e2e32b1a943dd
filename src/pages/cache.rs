use super::task::Latest;
use crate::api::{
    ApiClient, ApiResult, CacheKind, CacheRule, CacheRulesDto, CacheRulesPayload, MatchType, SaveResponse,
    ValidationResult,
};
use tracing::info;

pub const SAVED_MESSAGE: &str = "Saved. The backend hot-reloads cache rules.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Raw,
    Table,
}

/// Editable columns of a rule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheField {
    Kind,
    MatchType,
    MatchValue,
    Methods,
    Ttl,
    Vary,
}

impl CacheField {
    pub const ALL: [CacheField; 6] = [
        CacheField::Kind,
        CacheField::MatchType,
        CacheField::MatchValue,
        CacheField::Methods,
        CacheField::Ttl,
        CacheField::Vary,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CacheField::Kind => "Kind",
            CacheField::MatchType => "Match",
            CacheField::MatchValue => "Value",
            CacheField::Methods => "Methods",
            CacheField::Ttl => "TTL (s)",
            CacheField::Vary => "Vary",
        }
    }

    /// Current value of this field rendered the way the form shows it.
    pub fn display(&self, rule: &CacheRule) -> String {
        match self {
            CacheField::Kind => rule.kind.as_str().to_string(),
            CacheField::MatchType => rule.matcher.kind.as_str().to_string(),
            CacheField::MatchValue => rule.matcher.value.clone(),
            CacheField::Methods => rule.methods.as_deref().map(join_csv).unwrap_or_default(),
            CacheField::Ttl => rule.ttl.map(|t| t.to_string()).unwrap_or_default(),
            CacheField::Vary => rule.vary.as_deref().map(join_csv).unwrap_or_default(),
        }
    }
}

fn join_csv(items: &[String]) -> String {
    items.join(",")
}

/// Split a comma-separated form value; `None` when nothing is left.
pub fn split_csv(text: &str) -> Option<Vec<String>> {
    let items: Vec<String> = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

enum Outcome {
    Loaded(ApiResult<CacheRulesDto>),
    Validated(ApiResult<ValidationResult>),
    Saved(ApiResult<SaveResponse>),
}

/// Editor for `/cache-rules`, either as raw `cache.conf` text or as a table
/// of rules.
pub struct CacheRulesEditor {
    client: ApiClient,
    pub mode: EditMode,
    pub etag: String,
    pub raw: String,
    pub rules: Vec<CacheRule>,
    pub messages: Vec<String>,
    pub loading: bool,
    pub saving: bool,
    inflight: Latest<Outcome>,
}

impl CacheRulesEditor {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            mode: EditMode::Table,
            etag: String::new(),
            raw: String::new(),
            rules: Vec::new(),
            messages: Vec::new(),
            loading: false,
            saving: false,
            inflight: Latest::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.inflight.is_pending()
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            EditMode::Raw => EditMode::Table,
            EditMode::Table => EditMode::Raw,
        };
    }

    /// Body for validate/save in the active mode.
    pub fn payload(&self) -> CacheRulesPayload {
        match self.mode {
            EditMode::Raw => CacheRulesPayload::raw(self.raw.clone()),
            EditMode::Table => CacheRulesPayload::rules(self.rules.clone()),
        }
    }

    pub fn reload(&mut self) -> bool {
        if self.saving {
            return false;
        }
        let client = self.client.clone();
        self.loading = true;
        self.inflight
            .start(async move { Outcome::Loaded(client.cache_rules().await) });
        true
    }

    pub fn validate(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        let client = self.client.clone();
        let payload = self.payload();
        self.inflight
            .start(async move { Outcome::Validated(client.validate_cache_rules(&payload).await) });
        true
    }

    pub fn save(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        let client = self.client.clone();
        let payload = self.payload();
        let etag = self.etag.clone();
        self.saving = true;
        self.inflight.start(async move {
            Outcome::Saved(client.save_cache_rules(&payload, Some(etag.as_str())).await)
        });
        true
    }

    pub fn poll(&mut self) -> bool {
        match self.inflight.poll() {
            Some(outcome) => self.commit(outcome),
            None => false,
        }
    }

    pub async fn settle(&mut self) -> bool {
        match self.inflight.wait().await {
            Some(outcome) => self.commit(outcome),
            None => false,
        }
    }

    /// Returns true when local state was replaced by a reload.
    fn commit(&mut self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Loaded(result) => {
                self.loading = false;
                match result {
                    Ok(dto) => {
                        self.etag = dto.etag;
                        self.raw = dto.raw;
                        self.rules = dto.rules;
                        self.messages = dto.errors.unwrap_or_default();
                        true
                    }
                    Err(e) => {
                        self.messages.push(format!("Load failed: {}", e));
                        false
                    }
                }
            }
            Outcome::Validated(result) => {
                match result {
                    Ok(v) if v.ok => self.messages.push("Validation OK".to_string()),
                    Ok(v) if v.messages.is_empty() => self.messages.push("Validation failed".to_string()),
                    Ok(v) => self.messages.extend(v.messages),
                    Err(e) => self.messages.push(format!("Validation failed: {}", e)),
                }
                false
            }
            Outcome::Saved(result) => {
                self.saving = false;
                match result {
                    Ok(resp) if !resp.ok => self.messages.push("Save failed: save failed".to_string()),
                    Ok(resp) => {
                        if let Some(etag) = resp.etag {
                            self.etag = etag;
                        }
                        info!(etag = %self.etag, "cache rules saved");
                        self.messages.push(SAVED_MESSAGE.to_string());
                    }
                    Err(e) => self.messages.push(format!("Save failed: {}", e)),
                }
                false
            }
        }
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    // Table editing

    pub fn add_rule(&mut self) -> usize {
        self.rules.push(CacheRule::default());
        self.rules.len() - 1
    }

    /// Remove row `index`; out-of-range indices are ignored.
    pub fn remove_rule(&mut self, index: usize) -> Option<CacheRule> {
        if index < self.rules.len() {
            Some(self.rules.remove(index))
        } else {
            None
        }
    }

    /// Apply a form value to one field of row `index`. Other rows are never
    /// touched.
    pub fn set_field(&mut self, index: usize, field: CacheField, text: &str) {
        let Some(rule) = self.rules.get_mut(index) else {
            return;
        };

        match field {
            CacheField::Kind => match text.parse::<CacheKind>() {
                Ok(kind) => rule.kind = kind,
                Err(e) => self.messages.push(format!("rules[{}]: {}", index, e)),
            },
            CacheField::MatchType => match text.parse::<MatchType>() {
                Ok(kind) => rule.matcher.kind = kind,
                Err(e) => self.messages.push(format!("rules[{}]: {}", index, e)),
            },
            CacheField::MatchValue => rule.matcher.value = text.trim().to_string(),
            CacheField::Methods => {
                rule.methods = split_csv(text).map(|ms| ms.into_iter().map(|m| m.to_ascii_uppercase()).collect())
            }
            CacheField::Ttl => {
                let text = text.trim();
                if text.is_empty() {
                    rule.ttl = None;
                } else {
                    match text.parse::<i64>() {
                        Ok(ttl) => rule.ttl = Some(ttl),
                        Err(_) => self
                            .messages
                            .push(format!("rules[{}]: ttl must be a whole number of seconds", index)),
                    }
                }
            }
            CacheField::Vary => rule.vary = split_csv(text),
        }
    }

    /// Toggle-style edit for enumerated fields (kind and match type).
    pub fn cycle_field(&mut self, index: usize, field: CacheField) {
        if let Some(rule) = self.rules.get_mut(index) {
            match field {
                CacheField::Kind => rule.kind = rule.kind.toggled(),
                CacheField::MatchType => rule.matcher.kind = rule.matcher.kind.next(),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CacheMatch;
    use std::time::Duration;

    fn editor_with(n: usize) -> CacheRulesEditor {
        let client = ApiClient::new("http://127.0.0.1:9/mamotama-api", None, Duration::from_secs(1)).unwrap();
        let mut editor = CacheRulesEditor::new(client);
        for i in 0..n {
            editor.rules.push(CacheRule {
                kind: CacheKind::Allow,
                matcher: CacheMatch {
                    kind: MatchType::Prefix,
                    value: format!("/static/{}", i),
                },
                methods: None,
                ttl: Some(60),
                vary: None,
            });
        }
        editor
    }

    #[test]
    fn test_edit_touches_only_target_row() {
        let mut editor = editor_with(3);
        let before = editor.rules.clone();

        editor.set_field(1, CacheField::Methods, " get, head ,,");
        editor.set_field(1, CacheField::Vary, "Accept-Encoding, Accept-Language");
        editor.set_field(1, CacheField::Kind, "deny");

        assert_eq!(editor.rules[0], before[0]);
        assert_eq!(editor.rules[2], before[2]);
        assert_eq!(editor.rules[1].kind, CacheKind::Deny);
        assert_eq!(
            editor.rules[1].methods,
            Some(vec!["GET".to_string(), "HEAD".to_string()])
        );
        assert_eq!(
            editor.rules[1].vary,
            Some(vec!["Accept-Encoding".to_string(), "Accept-Language".to_string()])
        );
    }

    #[test]
    fn test_remove_drops_exactly_one_row() {
        let mut editor = editor_with(4);
        let before = editor.rules.clone();

        let removed = editor.remove_rule(2).unwrap();
        assert_eq!(removed, before[2]);
        assert_eq!(editor.rules.len(), 3);
        assert_eq!(editor.rules, vec![before[0].clone(), before[1].clone(), before[3].clone()]);

        assert!(editor.remove_rule(10).is_none());
        assert_eq!(editor.rules.len(), 3);
    }

    #[test]
    fn test_ttl_parsing() {
        let mut editor = editor_with(1);
        editor.set_field(0, CacheField::Ttl, "");
        assert_eq!(editor.rules[0].ttl, None);

        editor.set_field(0, CacheField::Ttl, "3600");
        assert_eq!(editor.rules[0].ttl, Some(3600));

        editor.set_field(0, CacheField::Ttl, "1h");
        assert_eq!(editor.rules[0].ttl, Some(3600));
        assert_eq!(editor.messages.len(), 1);
    }

    #[test]
    fn test_clearing_csv_fields() {
        let mut editor = editor_with(1);
        editor.set_field(0, CacheField::Methods, "GET");
        editor.set_field(0, CacheField::Methods, " , ");
        assert_eq!(editor.rules[0].methods, None);
    }

    #[test]
    fn test_out_of_range_edit_is_ignored() {
        let mut editor = editor_with(1);
        let before = editor.rules.clone();
        editor.set_field(5, CacheField::MatchValue, "/x");
        editor.cycle_field(5, CacheField::Kind);
        assert_eq!(editor.rules, before);
    }

    #[test]
    fn test_payload_follows_mode() {
        let mut editor = editor_with(1);
        editor.raw = "ALLOW prefix=/static/ ttl=600".to_string();

        assert_eq!(editor.payload(), CacheRulesPayload::rules(editor.rules.clone()));
        editor.toggle_mode();
        assert_eq!(editor.payload(), CacheRulesPayload::raw("ALLOW prefix=/static/ ttl=600"));
    }

    #[test]
    fn test_cycle_fields() {
        let mut editor = editor_with(1);
        editor.cycle_field(0, CacheField::Kind);
        editor.cycle_field(0, CacheField::MatchType);
        assert_eq!(editor.rules[0].kind, CacheKind::Deny);
        assert_eq!(editor.rules[0].matcher.kind, MatchType::Regex);
        assert_eq!(CacheField::MatchType.display(&editor.rules[0]), "regex");
    }

    #[test]
    fn test_validation_and_save_messages() {
        let mut editor = editor_with(1);
        editor.etag = "e1".to_string();

        editor.commit(Outcome::Validated(Ok(ValidationResult {
            ok: false,
            messages: vec!["rules[0]: regex value required".to_string()],
        })));
        editor.commit(Outcome::Saved(Ok(SaveResponse {
            ok: true,
            etag: Some("e2".to_string()),
        })));

        assert_eq!(editor.etag, "e2");
        assert_eq!(
            editor.messages,
            vec!["rules[0]: regex value required".to_string(), SAVED_MESSAGE.to_string()]
        );
    }

    #[test]
    fn test_rejected_save_keeps_etag() {
        let mut editor = editor_with(1);
        editor.etag = "e1".to_string();
        editor.saving = true;

        editor.commit(Outcome::Saved(Ok(SaveResponse {
            ok: false,
            etag: Some("e2".to_string()),
        })));

        assert!(!editor.saving);
        assert_eq!(editor.etag, "e1");
        assert_eq!(editor.messages, vec!["Save failed: save failed".to_string()]);
    }

    #[test]
    fn test_new_rule_defaults() {
        let mut editor = editor_with(0);
        let index = editor.add_rule();
        let rule = &editor.rules[index];

        assert_eq!(rule.kind, CacheKind::Allow);
        assert_eq!(rule.matcher.value, "/");
        assert_eq!(rule.vary, Some(vec!["Accept-Encoding".to_string()]));
    }

    #[test]
    fn test_reload_replaces_local_state() {
        let mut editor = editor_with(2);
        editor.messages.push("old".to_string());
        editor.loading = true;

        let replaced = editor.commit(Outcome::Loaded(Ok(CacheRulesDto {
            etag: "e9".to_string(),
            raw: "DENY prefix=/admin".to_string(),
            rules: vec![],
            errors: None,
        })));

        assert!(replaced);
        assert!(!editor.loading);
        assert!(editor.rules.is_empty());
        assert!(editor.messages.is_empty());
        assert_eq!(editor.raw, "DENY prefix=/admin");
    }
}
