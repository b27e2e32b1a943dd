use super::task::Latest;
use crate::api::{ApiClient, ApiResult};
use serde_json::Value;

/// Backend `/status`, shown verbatim.
pub struct StatusView {
    client: ApiClient,
    pub status: Option<Value>,
    pub error: Option<String>,
    inflight: Latest<ApiResult<Value>>,
}

impl StatusView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            status: None,
            error: None,
            inflight: Latest::new(),
        }
    }

    pub fn load(&mut self) {
        let client = self.client.clone();
        self.inflight.start(async move { client.status().await });
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

    fn commit(&mut self, result: ApiResult<Value>) {
        match result {
            Ok(status) => {
                self.status = Some(status);
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    pub fn pretty(&self) -> Option<String> {
        self.status
            .as_ref()
            .map(|s| serde_json::to_string_pretty(s).unwrap_or_else(|_| s.to_string()))
    }
}
