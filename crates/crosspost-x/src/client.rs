use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use crosspost_core::config::XConfig;
use crosspost_media::MediaAsset;

use crate::api::MicroblogApi;
use crate::error::XError;
use crate::oauth::OAuthCredentials;

/// Minimal X API client: media upload (v1.1), post creation and account
/// lookup (v2), all signed with OAuth 1.0a user context.
pub struct XClient {
    http: reqwest::Client,
    credentials: OAuthCredentials,
    api_base: String,
    upload_base: String,
}

impl XClient {
    pub fn new(config: &XConfig, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build HTTP client with timeout, using defaults");
                reqwest::Client::new()
            });
        Self {
            http,
            credentials: OAuthCredentials::from_config(config),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            upload_base: config.upload_base.trim_end_matches('/').to_string(),
        }
    }

    fn signed(&self, method: Method, url: &str) -> RequestBuilder {
        let auth = self.credentials.authorization(method.as_str(), url, &[]);
        self.http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, auth)
    }
}

#[async_trait]
impl MicroblogApi for XClient {
    async fn upload_media(&self, media: &MediaAsset) -> Result<String, XError> {
        let url = format!("{}/1.1/media/upload.json", self.upload_base);
        let part = reqwest::multipart::Part::bytes(media.data().to_vec())
            .file_name(media.file_name())
            .mime_str(media.media_type())?;
        let form = reqwest::multipart::Form::new().part("media", part);

        debug!(bytes = media.len(), media_type = media.media_type(), "uploading media to X");
        let resp = self.signed(Method::POST, &url).multipart(form).send().await?;
        let body: UploadResponse = parse(resp).await?;
        Ok(body.media_id_string)
    }

    async fn create_post(&self, text: &str, media_id: Option<&str>) -> Result<String, XError> {
        let url = format!("{}/2/tweets", self.api_base);
        let mut body = serde_json::json!({ "text": text });
        if let Some(id) = media_id {
            body["media"] = serde_json::json!({ "media_ids": [id] });
        }

        let resp = self.signed(Method::POST, &url).json(&body).send().await?;
        let created: DataEnvelope<CreatedPost> = parse(resp).await?;
        Ok(created.data.id)
    }

    async fn account_handle(&self) -> Result<String, XError> {
        let url = format!("{}/2/users/me", self.api_base);
        let resp = self.signed(Method::GET, &url).send().await?;
        let me: DataEnvelope<Account> = parse(resp).await?;
        Ok(me.data.username)
    }
}

/// Map HTTP status to [`XError`] and decode the JSON body on success.
async fn parse<T: for<'de> Deserialize<'de>>(resp: Response) -> Result<T, XError> {
    let status = resp.status().as_u16();
    match status {
        200..=299 => resp.json().await.map_err(|e| XError::Parse(e.to_string())),
        401 | 403 => Err(XError::Auth {
            status,
            message: resp.text().await.unwrap_or_default(),
        }),
        429 => Err(XError::RateLimited {
            reset: resp
                .headers()
                .get("x-rate-limit-reset")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string(),
        }),
        _ => Err(XError::Api {
            status,
            message: resp.text().await.unwrap_or_default(),
        }),
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    media_id_string: String,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: String,
}

#[derive(Deserialize)]
struct Account {
    username: String,
}
