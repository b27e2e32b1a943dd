use super::task::Latest;
use crate::api::{ApiClient, ApiResult, RuleMap};

/// Read-only view of the rule files the backend loaded.
pub struct RulesView {
    client: ApiClient,
    pub rules: RuleMap,
    pub error: Option<String>,
    inflight: Latest<ApiResult<RuleMap>>,
}

impl RulesView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            rules: RuleMap::new(),
            error: None,
            inflight: Latest::new(),
        }
    }

    pub fn load(&mut self) {
        let client = self.client.clone();
        self.inflight.start(async move { client.rules().await });
    }

    pub fn is_loading(&self) -> bool {
        self.inflight.is_pending()
    }

    pub fn poll(&mut self) -> bool {
        match self.inflight.poll() {
            Some(result) => {
                self.commit(result);
                true
            }
            None => false,
        }
    }

    pub async fn settle(&mut self) {
        if let Some(result) = self.inflight.wait().await {
            self.commit(result);
        }
    }

    fn commit(&mut self, result: ApiResult<RuleMap>) {
        match result {
            Ok(rules) => {
                self.rules = rules;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Rule files in filename order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|(name, body)| (name.as_str(), body.as_str()))
    }

    pub fn total_lines(&self) -> usize {
        self.rules.values().map(|body| body.lines().count()).sum()
    }
}
