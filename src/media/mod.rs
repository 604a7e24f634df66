//! External media store adapter.
//!
//! Hides the wire format of the third-party asset API: authenticated
//! list/tag/context calls use basic auth, the destroy call uses the store's
//! signed-request scheme. Upstream failures always surface the upstream
//! response body so the gateway can pass diagnostic detail upward.

use chrono::Utc;
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{PhotoResource, DISPLAY_ORDER_UNSET};

/// Tag mutation commands accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCommand {
    Add,
    Remove,
}

impl TagCommand {
    fn as_str(&self) -> &'static str {
        match self {
            TagCommand::Add => "add",
            TagCommand::Remove => "remove",
        }
    }
}

/// Outcome of a destroy call. The store reports deletion of an unknown
/// asset as "not found"; both outcomes count as success for the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Destroyed,
    NotFound,
}

/// Client for the external media store.
pub struct MediaStore {
    client: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl MediaStore {
    /// Build a store client from configuration. Returns `None` when any
    /// credential is unset; callers surface that as a config error per request.
    pub fn from_config(config: &Config) -> Option<Self> {
        let cloud_name = config.cloud_name.clone()?;
        let api_key = config.api_key.clone()?;
        let api_secret = config.api_secret.clone()?;

        Some(Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            cloud_name,
            api_key,
            api_secret,
        })
    }

    /// Build an API URL from path segments, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, AppError> {
        let mut url = reqwest::Url::parse(&self.api_base)
            .map_err(|e| AppError::Config(format!("Invalid media API base URL: {}", e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| AppError::Config("Media API base URL cannot be a base".into()))?;
            path.push(&self.cloud_name);
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Fetch all resources carrying `tag`, in the store's descending order.
    ///
    /// Only the first page (100 results) is fetched; larger galleries are a
    /// known limitation.
    pub async fn list_tagged(&self, tag: &str) -> Result<Vec<PhotoResource>, AppError> {
        let mut url = self.url(&["resources", "image", "tags", tag])?;
        url.query_pairs_mut()
            .append_pair("max_results", "100")
            .append_pair("direction", "desc")
            .append_pair("context", "true");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Media store request failed: {}",
                body
            )));
        }

        let payload: RawListResponse = response.json().await?;
        Ok(payload.resources.into_iter().map(to_photo_resource).collect())
    }

    /// Add or remove `tag` on a single resource.
    pub async fn update_tag(
        &self,
        tag: &str,
        command: TagCommand,
        public_id: &str,
    ) -> Result<(), AppError> {
        let url = self.url(&["resources", "image", "tags", tag])?;

        let response = self
            .client
            .post(url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .form(&[("command", command.as_str()), ("public_ids[]", public_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Media store tag update failed: {}",
                body
            )));
        }

        Ok(())
    }

    /// Overwrite a resource's structured context metadata.
    ///
    /// The wire format is a pipe-delimited key=value list; `caption` is kept
    /// as a duplicate of `alt_text` for the legacy metadata schema.
    pub async fn write_context(
        &self,
        public_id: &str,
        display_order: i64,
        alt_text: &str,
    ) -> Result<(), AppError> {
        let url = self.url(&["resources", "image", "upload", public_id])?;

        let context = format!(
            "display_order={}|caption={}|alt_text={}",
            display_order,
            escape_context_value(alt_text),
            escape_context_value(alt_text),
        );

        let response = self
            .client
            .post(url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .form(&[("context", context.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Media store context update failed: {}",
                body
            )));
        }

        Ok(())
    }

    /// Permanently destroy a resource and invalidate cached copies.
    ///
    /// The destroy endpoint takes a signed request rather than basic auth:
    /// the signature is a SHA-1 over the sorted non-empty parameters with
    /// the API secret appended, and the secret itself is never transmitted.
    pub async fn destroy(&self, public_id: &str) -> Result<DestroyOutcome, AppError> {
        let url = self.url(&["image", "destroy"])?;

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_request(
            &[
                ("invalidate", "true"),
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
            ],
            &self.api_secret,
        );

        let response = self
            .client
            .post(url)
            .form(&[
                ("api_key", self.api_key.as_str()),
                ("invalidate", "true"),
                ("public_id", public_id),
                ("signature", signature.as_str()),
                ("timestamp", timestamp.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Media store delete failed: {}",
                body
            )));
        }

        let payload: RawDestroyResponse = response.json().await?;
        match payload.result.as_str() {
            "ok" => Ok(DestroyOutcome::Destroyed),
            "not found" => Ok(DestroyOutcome::NotFound),
            other => Err(AppError::Upstream(format!(
                "Media store delete failed: unexpected result {:?}",
                other
            ))),
        }
    }
}

/// Compute the store's request signature: alphabetically key-sorted
/// `key=value` pairs joined by `&`, empty values omitted, secret appended,
/// SHA-1 hex digest. Must be byte-exact or the store rejects the request.
fn sign_request(params: &[(&str, &str)], secret: &str) -> String {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .copied()
        .filter(|(_, value)| !value.is_empty())
        .collect();
    pairs.sort_by_key(|(key, _)| *key);

    let serialized = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(serialized.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Escape the three characters the context wire format reserves.
fn escape_context_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace('=', "\\=")
}

#[derive(Debug, Deserialize)]
struct RawListResponse {
    #[serde(default)]
    resources: Vec<RawResource>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(default)]
    asset_id: String,
    #[serde(default)]
    public_id: String,
    #[serde(default)]
    secure_url: String,
    #[serde(default)]
    context: Option<RawContext>,
}

#[derive(Debug, Deserialize)]
struct RawContext {
    #[serde(default)]
    custom: Option<RawCustom>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCustom {
    #[serde(default)]
    display_order: Option<serde_json::Value>,
    #[serde(default)]
    alt_text: Option<String>,
    #[serde(default)]
    caption: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDestroyResponse {
    #[serde(default)]
    result: String,
}

fn to_photo_resource(raw: RawResource) -> PhotoResource {
    let custom = raw
        .context
        .and_then(|context| context.custom)
        .unwrap_or_default();

    PhotoResource {
        asset_id: raw.asset_id,
        public_id: raw.public_id,
        secure_url: raw.secure_url,
        display_order: parse_display_order(custom.display_order.as_ref()),
        alt_text: parse_alt_text(&custom),
    }
}

/// Parse a context display order, which the store may hand back as a string
/// or a number. Unparseable values sort last.
fn parse_display_order(value: Option<&serde_json::Value>) -> i64 {
    match value {
        Some(serde_json::Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f as i64))
            .unwrap_or(DISPLAY_ORDER_UNSET),
        Some(serde_json::Value::String(text)) => {
            text.trim().parse::<i64>().unwrap_or(DISPLAY_ORDER_UNSET)
        }
        _ => DISPLAY_ORDER_UNSET,
    }
}

/// Prefer the explicit alt-text field, fall back to the legacy caption field,
/// then to an empty caption.
fn parse_alt_text(custom: &RawCustom) -> String {
    if let Some(alt_text) = custom.alt_text.as_deref() {
        if !alt_text.trim().is_empty() {
            return alt_text.trim().to_string();
        }
    }

    if let Some(caption) = custom.caption.as_deref() {
        if !caption.trim().is_empty() {
            return caption.trim().to_string();
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sign_request_known_vector() {
        // sha1("invalidate=true&public_id=IMG_0001&timestamp=1700000000shhh")
        let signature = sign_request(
            &[
                ("invalidate", "true"),
                ("public_id", "IMG_0001"),
                ("timestamp", "1700000000"),
            ],
            "shhh",
        );
        assert_eq!(signature, "b93a8e0063030ac143b32fd256a63a7935ca0a34");
    }

    #[test]
    fn test_sign_request_sorts_keys_and_omits_empty() {
        // sha1("folder=wedding&public_id=a&timestamp=42topsecret")
        let signature = sign_request(
            &[
                ("timestamp", "42"),
                ("tags", ""),
                ("public_id", "a"),
                ("folder", "wedding"),
            ],
            "topsecret",
        );
        assert_eq!(signature, "4f64597cd30f98eb8739274e8afc4f664d43b2f9");
    }

    #[test]
    fn test_escape_context_value() {
        assert_eq!(escape_context_value("plain caption"), "plain caption");
        assert_eq!(escape_context_value("a|b=c"), "a\\|b\\=c");
        assert_eq!(escape_context_value("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_parse_display_order() {
        assert_eq!(parse_display_order(Some(&json!("3"))), 3);
        assert_eq!(parse_display_order(Some(&json!(7))), 7);
        assert_eq!(parse_display_order(Some(&json!(" 12 "))), 12);
        assert_eq!(
            parse_display_order(Some(&json!("not a number"))),
            DISPLAY_ORDER_UNSET
        );
        assert_eq!(parse_display_order(None), DISPLAY_ORDER_UNSET);
    }

    #[test]
    fn test_parse_alt_text_fallback_chain() {
        let explicit = RawCustom {
            display_order: None,
            alt_text: Some(" First dance ".into()),
            caption: Some("ignored".into()),
        };
        assert_eq!(parse_alt_text(&explicit), "First dance");

        let legacy = RawCustom {
            display_order: None,
            alt_text: Some("   ".into()),
            caption: Some("The venue".into()),
        };
        assert_eq!(parse_alt_text(&legacy), "The venue");

        let neither = RawCustom::default();
        assert_eq!(parse_alt_text(&neither), "");
    }
}
