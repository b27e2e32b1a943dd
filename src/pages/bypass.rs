use super::task::Latest;
use crate::api::{ApiClient, ApiResult};
use tracing::info;

enum Outcome {
    Loaded(ApiResult<String>),
    Saved(ApiResult<()>),
}

/// Legacy editor for `/bypass`: plain text in, plain text out, last write
/// wins.
pub struct RawBypassEditor {
    client: ApiClient,
    pub text: String,
    pub message: Option<String>,
    pub saving: bool,
    inflight: Latest<Outcome>,
}

impl RawBypassEditor {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            text: String::new(),
            message: None,
            saving: false,
            inflight: Latest::new(),
        }
    }

    pub fn load(&mut self) {
        let client = self.client.clone();
        self.saving = false;
        self.inflight
            .start(async move { Outcome::Loaded(client.bypass_raw().await) });
    }

    pub fn is_busy(&self) -> bool {
        self.inflight.is_pending()
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    /// Post the whole buffer. Ignored while a request is pending.
    pub fn save(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        let client = self.client.clone();
        let text = self.text.clone();
        self.saving = true;
        self.inflight
            .start(async move { Outcome::Saved(client.save_bypass_raw(text).await) });
        true
    }

    /// Returns true when the buffer was replaced by a load.
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

    fn commit(&mut self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Loaded(Ok(text)) => {
                self.text = text;
                self.message = None;
                true
            }
            Outcome::Loaded(Err(e)) => {
                self.message = Some(format!("Load failed: {}", e));
                false
            }
            Outcome::Saved(result) => {
                self.saving = false;
                self.message = Some(match result {
                    Ok(()) => {
                        info!(bytes = self.text.len(), "bypass list saved");
                        "Saved".to_string()
                    }
                    Err(e) => format!("Save failed: {}", e),
                });
                false
            }
        }
    }
}
