use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crosspost_channels::{ChannelError, ChannelKind, ChannelPublisher};
use crosspost_core::text;
use crosspost_media::MediaAsset;

use crate::api::MicroblogApi;
use crate::error::XError;

/// Publishes the short variant to X.
pub struct XPublisher {
    api: Arc<dyn MicroblogApi>,
    handle: OnceCell<String>,
}

impl XPublisher {
    /// `handle` skips the account lookup when set (leading `@` is ignored).
    pub fn new(api: Arc<dyn MicroblogApi>, handle: Option<String>) -> Self {
        let handle = match handle
            .map(|h| h.trim().trim_start_matches('@').to_string())
            .filter(|h| !h.is_empty())
        {
            Some(h) => OnceCell::new_with(Some(h)),
            None => OnceCell::new(),
        };
        Self { api, handle }
    }

    /// Account handle, looked up once and then cached.
    async fn handle(&self) -> Result<&str, XError> {
        self.handle
            .get_or_try_init(|| self.api.account_handle())
            .await
            .map(String::as_str)
    }
}

pub fn post_url(handle: &str, post_id: &str) -> String {
    format!("https://x.com/{handle}/status/{post_id}")
}

#[async_trait]
impl ChannelPublisher for XPublisher {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Microblog
    }

    async fn try_publish(
        &self,
        text: &str,
        media: Option<&MediaAsset>,
    ) -> Result<Option<String>, ChannelError> {
        let bounded = text::enforce_microblog_limit(text);
        if bounded.len() != text.len() {
            warn!(
                chars = text::char_len(text),
                max = text::MICROBLOG_MAX_CHARS,
                "post text too long, truncated"
            );
        }

        let media_id = match media {
            Some(asset) => match self.api.upload_media(asset).await {
                Ok(id) => {
                    debug!(media_id = %id, "media uploaded");
                    Some(id)
                }
                Err(e) => {
                    warn!(error = %e, "media upload failed, posting text only");
                    None
                }
            },
            None => None,
        };

        let post_id = self.api.create_post(&bounded, media_id.as_deref()).await?;

        match self.handle().await {
            Ok(handle) => Ok(Some(post_url(handle, &post_id))),
            Err(e) => {
                warn!(error = %e, post_id = %post_id, "posted, but account handle lookup failed");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        fail_upload: bool,
        fail_post: bool,
        fail_handle: bool,
        posts: Mutex<Vec<(String, Option<String>)>>,
        handle_lookups: AtomicUsize,
    }

    #[async_trait]
    impl MicroblogApi for FakeApi {
        async fn upload_media(&self, _media: &MediaAsset) -> Result<String, XError> {
            if self.fail_upload {
                Err(XError::Api {
                    status: 400,
                    message: "media type unrecognized".to_string(),
                })
            } else {
                Ok("710511363345354753".to_string())
            }
        }

        async fn create_post(&self, text: &str, media_id: Option<&str>) -> Result<String, XError> {
            if self.fail_post {
                return Err(XError::Auth {
                    status: 403,
                    message: "Forbidden".to_string(),
                });
            }
            self.posts
                .lock()
                .unwrap()
                .push((text.to_string(), media_id.map(str::to_string)));
            Ok("1445880548472328192".to_string())
        }

        async fn account_handle(&self) -> Result<String, XError> {
            self.handle_lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail_handle {
                Err(XError::Parse("no data".to_string()))
            } else {
                Ok("crosspost".to_string())
            }
        }
    }

    fn asset() -> MediaAsset {
        MediaAsset::new(vec![0xFF, 0xD8, 0xFF, 0xE0])
    }

    #[tokio::test]
    async fn publishes_with_media_and_builds_url() {
        let api = Arc::new(FakeApi::default());
        let publisher = XPublisher::new(api.clone(), None);

        let outcome = publisher.publish("hello #x", Some(&asset())).await;
        assert!(outcome.success);
        assert_eq!(
            outcome.reference.as_deref(),
            Some("https://x.com/crosspost/status/1445880548472328192")
        );
        assert_eq!(
            api.posts.lock().unwrap()[0],
            ("hello #x".to_string(), Some("710511363345354753".to_string()))
        );
    }

    #[tokio::test]
    async fn upload_failure_degrades_to_text_only() {
        let api = Arc::new(FakeApi {
            fail_upload: true,
            ..Default::default()
        });
        let outcome = XPublisher::new(api.clone(), None)
            .publish("hello", Some(&asset()))
            .await;
        assert!(outcome.success);
        assert_eq!(api.posts.lock().unwrap()[0].1, None);
    }

    #[tokio::test]
    async fn handle_lookup_failure_still_succeeds() {
        let api = Arc::new(FakeApi {
            fail_handle: true,
            ..Default::default()
        });
        let outcome = XPublisher::new(api, None).publish("hello", None).await;
        assert!(outcome.success);
        assert!(outcome.reference.is_none());
    }

    #[tokio::test]
    async fn post_failure_is_a_failed_outcome() {
        let api = Arc::new(FakeApi {
            fail_post: true,
            ..Default::default()
        });
        let outcome = XPublisher::new(api, None).publish("hello", None).await;
        assert!(!outcome.success);
        assert_eq!(outcome.channel, ChannelKind::Microblog);
    }

    #[tokio::test]
    async fn over_long_text_is_truncated_before_posting() {
        let api = Arc::new(FakeApi::default());
        XPublisher::new(api.clone(), None)
            .publish(&"я".repeat(300), None)
            .await;
        let posted = api.posts.lock().unwrap()[0].0.clone();
        assert_eq!(text::char_len(&posted), 280);
        assert!(posted.ends_with("..."));
    }

    #[tokio::test]
    async fn configured_handle_skips_lookup() {
        let api = Arc::new(FakeApi::default());
        let publisher = XPublisher::new(api.clone(), Some("@mybrand".to_string()));
        let outcome = publisher.publish("hi", None).await;
        assert_eq!(
            outcome.reference.as_deref(),
            Some("https://x.com/mybrand/status/1445880548472328192")
        );
        assert_eq!(api.handle_lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn looked_up_handle_is_cached() {
        let api = Arc::new(FakeApi::default());
        let publisher = XPublisher::new(api.clone(), None);
        publisher.publish("one", None).await;
        publisher.publish("two", None).await;
        assert_eq!(api.handle_lookups.load(Ordering::SeqCst), 1);
    }
}
