use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde_json::json,
};

use crate::{Result, error::Error};

/// Outbound side of the messaging platform: send a text reply, fetch the
/// bytes of an inbound attachment. Implemented over the Graph API in
/// production and mocked in tests.
#[async_trait]
pub trait ChannelClient: Send + Sync {
    /// Send a plain text message to `to` from the business number
    /// `business_id`.
    async fn send_text(&self, to: &str, body: &str, business_id: &str) -> Result<()>;

    /// Download an inbound attachment by its platform media id.
    async fn download_media(&self, media_id: &str) -> Result<Vec<u8>>;
}

pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v22.0";

/// Graph API client. Attachments download in two steps: a metadata lookup
/// that yields a short-lived URL, then the authenticated fetch of that URL.
pub struct GraphClient {
    http:         reqwest::Client,
    access_token: Secret<String>,
    api_base:     String,
}

impl GraphClient {
    #[must_use]
    pub fn new(access_token: Secret<String>) -> Self {
        Self::with_api_base(access_token, DEFAULT_API_BASE)
    }

    #[must_use]
    pub fn with_api_base(access_token: Secret<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token,
            api_base: api_base.into(),
        }
    }

    fn bearer(&self) -> &str {
        self.access_token.expose_secret()
    }
}

#[async_trait]
impl ChannelClient for GraphClient {
    async fn send_text(&self, to: &str, body: &str, business_id: &str) -> Result<()> {
        let url = format!("{}/{business_id}/messages", self.api_base);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.bearer())
            .json(&json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": to,
                "type": "text",
                "text": { "body": body },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(to, %status, "text send rejected by platform");
            return Err(Error::platform(format!("send failed ({status}): {detail}")));
        }
        Ok(())
    }

    async fn download_media(&self, media_id: &str) -> Result<Vec<u8>> {
        let lookup_url = format!("{}/{media_id}", self.api_base);
        let lookup = self
            .http
            .get(&lookup_url)
            .bearer_auth(self.bearer())
            .send()
            .await?;
        let status = lookup.status();
        if !status.is_success() {
            return Err(Error::platform(format!("media lookup failed ({status})")));
        }

        let meta: serde_json::Value = lookup.json().await?;
        let url = meta
            .get("url")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| Error::platform("media lookup response missing url"))?;

        let download = self.http.get(url).bearer_auth(self.bearer()).send().await?;
        let status = download.status();
        if !status.is_success() {
            return Err(Error::platform(format!("media download failed ({status})")));
        }
        Ok(download.bytes().await?.to_vec())
    }
}
