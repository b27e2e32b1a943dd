use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Log source served by `/logs/read` and `/logs/download`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogSource {
    #[serde(rename = "waf")]
    Waf,
    #[serde(rename = "accerr")]
    AccessError,
    #[serde(rename = "intr")]
    Interesting,
}

impl LogSource {
    pub const ALL: [LogSource; 3] = [LogSource::Waf, LogSource::AccessError, LogSource::Interesting];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogSource::Waf => "waf",
            LogSource::AccessError => "accerr",
            LogSource::Interesting => "intr",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LogSource::Waf => "WAF events",
            LogSource::AccessError => "Access errors",
            LogSource::Interesting => "Interesting",
        }
    }

    pub fn next(&self) -> LogSource {
        match self {
            LogSource::Waf => LogSource::AccessError,
            LogSource::AccessError => LogSource::Interesting,
            LogSource::Interesting => LogSource::Waf,
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waf" => Ok(LogSource::Waf),
            "accerr" => Ok(LogSource::AccessError),
            "intr" => Ok(LogSource::Interesting),
            other => Err(format!("unknown log source '{}' (expected waf, accerr or intr)", other)),
        }
    }
}

/// Paging direction. `Prev` walks toward older lines, `Next` toward the tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Prev => "prev",
            Direction::Next => "next",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev" => Ok(Direction::Prev),
            "next" => Ok(Direction::Next),
            other => Err(format!("unknown direction '{}' (expected prev or next)", other)),
        }
    }
}

/// `event` tag of a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    WafBlock,
    WafHitAllow,
    Other(String),
}

/// One NDJSON log record. No fixed schema: every key the backend sent is
/// kept, the accessors below only interpret the well-known ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogLine(pub Map<String, Value>);

impl LogLine {
    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn ts(&self) -> Option<&str> {
        self.str_field("ts")
    }

    pub fn req_id(&self) -> Option<&str> {
        self.str_field("req_id")
    }

    pub fn path(&self) -> Option<&str> {
        self.str_field("path")
    }

    pub fn method(&self) -> Option<&str> {
        self.str_field("method")
    }

    /// Rule ids show up both as numbers and strings depending on the writer.
    pub fn rule_id(&self) -> Option<String> {
        match self.0.get("rule_id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.0.get("status")? {
            Value::Number(n) => n.as_u64().and_then(|v| u16::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn event(&self) -> Option<LogEvent> {
        self.str_field("event").map(|e| match e {
            "waf_block" => LogEvent::WafBlock,
            "waf_hit_allow" => LogEvent::WafHitAllow,
            other => LogEvent::Other(other.to_string()),
        })
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response of `GET /logs/read`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: Vec<LogLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<u64>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_prev: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next: Option<bool>,
}

/// Parameters of `GET /logs/read`. No `dir` asks for the most recent page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery {
    pub src: LogSource,
    pub tail: u32,
    pub cursor: Option<u64>,
    pub dir: Option<Direction>,
}

impl LogQuery {
    pub fn latest(src: LogSource, tail: u32) -> Self {
        Self {
            src,
            tail,
            cursor: None,
            dir: None,
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("src", self.src.as_str().to_string()), ("tail", self.tail.to_string())];
        if let Some(cursor) = self.cursor {
            params.push(("cursor", cursor.to_string()));
        }
        if let Some(dir) = self.dir {
            params.push(("dir", dir.as_str().to_string()));
        }
        params
    }
}

/// Response of the legacy `GET /logs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyLogTail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub log_tail: Vec<String>,
}

/// Rule filename -> rule file text.
pub type RuleMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BypassRulesDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheKind {
    #[default]
    Allow,
    Deny,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Allow => "ALLOW",
            CacheKind::Deny => "DENY",
        }
    }

    pub fn toggled(&self) -> CacheKind {
        match self {
            CacheKind::Allow => CacheKind::Deny,
            CacheKind::Deny => CacheKind::Allow,
        }
    }
}

impl FromStr for CacheKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALLOW" => Ok(CacheKind::Allow),
            "DENY" => Ok(CacheKind::Deny),
            other => Err(format!("kind must be ALLOW or DENY, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    #[default]
    Prefix,
    Regex,
    Exact,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Prefix => "prefix",
            MatchType::Regex => "regex",
            MatchType::Exact => "exact",
        }
    }

    pub fn next(&self) -> MatchType {
        match self {
            MatchType::Prefix => MatchType::Regex,
            MatchType::Regex => MatchType::Exact,
            MatchType::Exact => MatchType::Prefix,
        }
    }
}

impl FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(MatchType::Prefix),
            "regex" => Ok(MatchType::Regex),
            "exact" => Ok(MatchType::Exact),
            other => Err(format!("match type must be prefix, regex or exact, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheMatch {
    #[serde(rename = "type")]
    pub kind: MatchType,
    pub value: String,
}

/// One line of `cache.conf` in structured form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRule {
    pub kind: CacheKind,
    #[serde(rename = "match")]
    pub matcher: CacheMatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    /// Seconds. Signed so that a bad value still reaches backend validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vary: Option<Vec<String>>,
}

impl Default for CacheRule {
    fn default() -> Self {
        Self {
            kind: CacheKind::Allow,
            matcher: CacheMatch {
                kind: MatchType::Prefix,
                value: "/".to_string(),
            },
            methods: Some(vec!["GET".to_string(), "HEAD".to_string()]),
            ttl: Some(600),
            vary: Some(vec!["Accept-Encoding".to_string()]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheRulesDto {
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub raw: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<CacheRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Body of `POST /cache-rules:validate` and `PUT /cache-rules`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRulesPayload {
    pub raw_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<CacheRule>>,
}

impl CacheRulesPayload {
    pub fn raw(raw: impl Into<String>) -> Self {
        Self {
            raw_mode: true,
            raw: Some(raw.into()),
            rules: None,
        }
    }

    pub fn rules(rules: Vec<CacheRule>) -> Self {
        Self {
            raw_mode: false,
            raw: None,
            rules: Some(rules),
        }
    }
}

/// Outcome of a `:validate` call. Not an error even when `ok` is false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<String>,
}

/// Successful conditional write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub etag: Option<String>,
}

/// Binary download with the server-suggested filename, if any.
#[derive(Debug, Clone)]
pub struct Download {
    pub blob: Bytes,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_line_tolerates_missing_and_odd_fields() {
        let line: LogLine = serde_json::from_value(json!({
            "ts": "2025-01-01T00:00:00Z",
            "status": "503",
            "rule_id": 942100,
            "custom": {"nested": true}
        }))
        .unwrap();

        assert_eq!(line.ts(), Some("2025-01-01T00:00:00Z"));
        assert_eq!(line.status(), Some(503));
        assert_eq!(line.rule_id(), Some("942100".to_string()));
        assert_eq!(line.path(), None);
        assert_eq!(line.event(), None);
        assert!(line.to_pretty_json().contains("nested"));
    }

    #[test]
    fn test_log_event_tags() {
        let block: LogLine = serde_json::from_value(json!({"event": "waf_block"})).unwrap();
        let other: LogLine = serde_json::from_value(json!({"event": "proxy_error"})).unwrap();
        assert_eq!(block.event(), Some(LogEvent::WafBlock));
        assert_eq!(other.event(), Some(LogEvent::Other("proxy_error".to_string())));
    }

    #[test]
    fn test_read_response_null_lines() {
        let resp: ReadResponse =
            serde_json::from_value(json!({"lines": null, "has_more": false})).unwrap();
        assert!(resp.lines.is_empty());
        assert_eq!(resp.next_cursor, None);
        assert_eq!(resp.has_prev, None);
    }

    #[test]
    fn test_log_query_params() {
        let query = LogQuery {
            src: LogSource::AccessError,
            tail: 50,
            cursor: Some(120),
            dir: Some(Direction::Prev),
        };
        let params = query.to_params();
        assert_eq!(params[0], ("src", "accerr".to_string()));
        assert_eq!(params[2], ("cursor", "120".to_string()));
        assert_eq!(params[3], ("dir", "prev".to_string()));

        assert_eq!(LogQuery::latest(LogSource::Waf, 30).to_params().len(), 2);
    }

    #[test]
    fn test_cache_rule_wire_shape() {
        let rule = CacheRule {
            kind: CacheKind::Deny,
            matcher: CacheMatch {
                kind: MatchType::Regex,
                value: "^/api/".to_string(),
            },
            methods: None,
            ttl: None,
            vary: Some(vec!["Accept-Encoding".to_string()]),
        };

        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "DENY",
                "match": {"type": "regex", "value": "^/api/"},
                "vary": ["Accept-Encoding"]
            })
        );
    }

    #[test]
    fn test_cache_payload_modes() {
        let raw = serde_json::to_value(CacheRulesPayload::raw("ALLOW prefix=/")).unwrap();
        assert_eq!(raw, json!({"rawMode": true, "raw": "ALLOW prefix=/"}));

        let rules = serde_json::to_value(CacheRulesPayload::rules(vec![])).unwrap();
        assert_eq!(rules, json!({"rawMode": false, "rules": []}));
    }

    #[test]
    fn test_source_round_trip_names() {
        for src in LogSource::ALL {
            assert_eq!(src.as_str().parse::<LogSource>().unwrap(), src);
        }
        assert!("nginx".parse::<LogSource>().is_err());
    }
}
