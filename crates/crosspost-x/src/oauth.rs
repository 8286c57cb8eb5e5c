//! OAuth 1.0a request signing (HMAC-SHA1) for the X API.
//!
//! Only query/form parameters take part in the signature. JSON and multipart
//! bodies are not signed, so callers pass an empty parameter list for those.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crosspost_core::config::XConfig;

type HmacSha1 = Hmac<Sha1>;

/// User-context credentials for one X account.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl OAuthCredentials {
    pub fn from_config(config: &XConfig) -> Self {
        Self {
            consumer_key: config.api_key.clone(),
            consumer_secret: config.api_secret.clone(),
            token: config.access_token.clone(),
            token_secret: config.access_secret.clone(),
        }
    }

    /// `Authorization` header value for `method url` with a fresh nonce and timestamp.
    pub fn authorization(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.authorization_with(method, url, params, &nonce, &timestamp)
    }

    fn authorization_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> String {
        let mut oauth = vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let mut all = oauth.clone();
        all.extend_from_slice(params);
        let signature = self.sign(method, url, &all);
        oauth.push(("oauth_signature", signature.as_str()));
        oauth.sort_by(|a, b| a.0.cmp(b.0));

        let fields: Vec<String> = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect();
        format!("OAuth {}", fields.join(", "))
    }

    /// Base64 HMAC-SHA1 of the signature base string.
    fn sign(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        let base = base_string(method, url, params);
        let key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.token_secret)
        );
        // HMAC accepts keys of any length.
        let mut mac = match HmacSha1::new_from_slice(key.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return String::new(),
        };
        mac.update(base.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("token", &"***")
            .finish()
    }
}

fn base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> =
        params.iter().map(|(k, v)| (encode(k), encode(v))).collect();
    encoded.sort();
    let joined = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&joined)
    )
}

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~`.
fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked example from X's "Creating a signature" developer documentation.
    fn docs_credentials() -> OAuthCredentials {
        OAuthCredentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string(),
            token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string(),
            token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string(),
        }
    }

    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: &str = "1318622958";
    const URL: &str = "https://api.twitter.com/1.1/statuses/update.json";
    const PARAMS: &[(&str, &str)] = &[
        ("include_entities", "true"),
        ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
    ];

    #[test]
    fn encode_follows_rfc3986() {
        assert_eq!(encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(encode("!"), "%21");
    }

    #[test]
    fn signature_matches_documented_example() {
        let creds = docs_credentials();
        let header = creds.authorization_with("POST", URL, PARAMS, NONCE, TIMESTAMP);
        assert!(header.contains(r#"oauth_signature="hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D""#));
    }

    #[test]
    fn base_string_sorts_and_encodes() {
        let base = base_string("post", URL, &[("b", "2"), ("a", "1 1")]);
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&a%3D1%25201%26b%3D2"
        );
    }

    #[test]
    fn header_lists_oauth_fields_only() {
        let creds = docs_credentials();
        let header = creds.authorization_with("POST", URL, PARAMS, NONCE, TIMESTAMP);
        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_version=\"1.0\""));
        assert!(!header.contains("include_entities"));
    }

    #[test]
    fn fresh_headers_use_new_nonces() {
        let creds = docs_credentials();
        let a = creds.authorization("GET", "https://api.x.com/2/users/me", &[]);
        let b = creds.authorization("GET", "https://api.x.com/2/users/me", &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn debug_hides_secrets() {
        let shown = format!("{:?}", docs_credentials());
        assert!(!shown.contains("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"));
        assert!(!shown.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
    }
}
