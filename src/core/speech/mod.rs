//! Speech gateway client.
//!
//! Wraps the Baidu speech-synthesis API: a client-credentials token
//! exchange with a one-entry in-memory cache, and a single form-encoded
//! synthesis call that returns either raw MP3 bytes or a JSON error
//! descriptor (`err_no` / `err_msg`).
//!
//! The token cache is shared across all in-flight requests. The refresh
//! path is not mutually excluded: two requests racing past an expired
//! token may both perform the exchange and the last write wins. Both
//! tokens are valid, so the race only costs a duplicate provider call.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::errors::{ApiError, ApiResult};

mod token;

pub use token::{CachedToken, Clock, SystemClock, TOKEN_SAFETY_MARGIN_SECS};

/// Ceiling on synthesis input length, in characters.
///
/// The provider's actual limit is 1024 GBK bytes; one Chinese character
/// is two bytes, so this is an approximation, not an exact guarantee.
pub const MAX_TEXT_CHARS: usize = 512;

/// Bounded wait on the synthesis call.
const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed client identifier sent with every synthesis request.
const CLIENT_ID: &str = "miniprogram";

/// Voice / prosody selectors for a synthesis call.
///
/// Ranges are provider-defined (0-15 for speed/pitch/volume). Defaults
/// are child-friendly: the emotional female voice at normal speed with
/// raised volume.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisOptions {
    /// Speaking speed (0-15, 5 = normal).
    pub speed: u8,
    /// Pitch (0-15, 5 = normal).
    pub pitch: u8,
    /// Volume (0-15, 9 = loud enough for children).
    pub volume: u8,
    /// Voice selector (4 = emotional female).
    pub voice: u8,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            speed: 5,
            pitch: 5,
            volume: 9,
            voice: 4,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    err_no: Option<i64>,
    err_msg: Option<String>,
}

/// HTTP client for the speech-synthesis provider.
pub struct SpeechClient {
    client: Client,
    api_key: Option<String>,
    secret_key: Option<String>,
    auth_url: String,
    tts_url: String,
    token: RwLock<Option<CachedToken>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SpeechClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechClient")
            .field("auth_url", &self.auth_url)
            .field("tts_url", &self.tts_url)
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl SpeechClient {
    /// Create a new client from server configuration, using the system clock.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.speech_api_key.clone(),
            secret_key: config.speech_secret_key.clone(),
            auth_url: config.speech_auth_url.clone(),
            tts_url: config.speech_tts_url.clone(),
            token: RwLock::new(None),
            clock: Arc::new(SystemClock),
        }
    }

    /// True iff both provider credentials are present in configuration.
    ///
    /// Callers use this to short-circuit with a configuration error
    /// before any network call is attempted.
    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.api_key.as_deref(), self.secret_key.as_deref()) {
            (Some(api_key), Some(secret_key)) if !api_key.is_empty() && !secret_key.is_empty() => {
                Some((api_key, secret_key))
            }
            _ => None,
        }
    }

    /// Return the cached access token, or perform a client-credentials
    /// exchange if no valid token is held.
    ///
    /// On exchange failure the cached token is left untouched: the
    /// precondition for reaching the exchange is that the reserved-margin
    /// expiry already passed, so a stale token is never handed out early.
    pub async fn get_access_token(&self) -> ApiResult<String> {
        let now_ms = self.clock.now_ms();

        if let Some(cached) = self.token.read().await.as_ref() {
            if cached.is_valid_at(now_ms) {
                debug!("reusing cached speech access token");
                return Ok(cached.value.clone());
            }
        }

        let (api_key, secret_key) = self
            .credentials()
            .ok_or_else(|| ApiError::Configuration("语音服务未配置".to_string()))?;

        let response = self
            .client
            .get(&self.auth_url)
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", api_key),
                ("client_secret", secret_key),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "speech token exchange request failed");
                ApiError::SpeechAuth(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "speech token exchange returned non-success status");
            return Err(ApiError::SpeechAuth(format!("provider returned {status}")));
        }

        let payload: TokenResponse = response.json().await.map_err(|e| {
            error!(error = %e, "speech token exchange response was malformed");
            ApiError::SpeechAuth(format!("malformed response: {e}"))
        })?;

        let Some(value) = payload.access_token else {
            error!("speech token exchange response carried no access_token");
            return Err(ApiError::SpeechAuth(
                "response carried no access_token".to_string(),
            ));
        };

        let cached = CachedToken::new(value.clone(), now_ms, payload.expires_in);
        info!(
            expires_at_ms = cached.expires_at_ms,
            "speech access token refreshed"
        );
        *self.token.write().await = Some(cached);

        Ok(value)
    }

    /// Synthesize `text` to MP3 audio.
    ///
    /// Validates the input before any network call, then issues one
    /// synthesis request with a 10-second timeout. A response declaring
    /// an audio content type is returned as raw bytes; anything else is
    /// parsed as a provider error descriptor.
    pub async fn text_to_speech(
        &self,
        text: &str,
        options: &SynthesisOptions,
    ) -> ApiResult<Bytes> {
        if text.trim().is_empty() {
            return Err(ApiError::InvalidInput("文本内容不能为空".to_string()));
        }
        if text.chars().count() > MAX_TEXT_CHARS {
            return Err(ApiError::InvalidInput(
                "文本过长，最多支持512个汉字".to_string(),
            ));
        }

        let token = self.get_access_token().await?;

        let params = [
            ("tok", token),
            ("tex", text.to_string()),
            ("cuid", CLIENT_ID.to_string()),
            ("ctp", "1".to_string()),
            ("lan", "zh".to_string()),
            ("spd", options.speed.to_string()),
            ("pit", options.pitch.to_string()),
            ("vol", options.volume.to_string()),
            ("per", options.voice.to_string()),
            ("aue", "3".to_string()),
        ];

        let response = self
            .client
            .post(&self.tts_url)
            .form(&params)
            .timeout(SYNTHESIS_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "speech synthesis request failed");
                ApiError::SpeechSynthesis {
                    code: None,
                    message: "网络请求失败".to_string(),
                }
            })?;

        let status = response.status();
        let is_audio = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("audio"));

        if is_audio && status.is_success() {
            let audio = response.bytes().await.map_err(|e| {
                error!(error = %e, "failed to read synthesis audio body");
                ApiError::SpeechSynthesis {
                    code: None,
                    message: "网络请求失败".to_string(),
                }
            })?;
            debug!(bytes = audio.len(), "speech synthesis succeeded");
            return Ok(audio);
        }

        // Not audio: the body is a JSON error descriptor, or garbage.
        let body = response.bytes().await.unwrap_or_default();
        match serde_json::from_slice::<ProviderError>(&body) {
            Ok(provider_error) => {
                error!(
                    code = ?provider_error.err_no,
                    message = ?provider_error.err_msg,
                    "speech synthesis returned a provider error"
                );
                Err(ApiError::SpeechSynthesis {
                    code: provider_error.err_no,
                    message: provider_error
                        .err_msg
                        .unwrap_or_else(|| "未知错误".to_string()),
                })
            }
            Err(_) => {
                error!(%status, "speech synthesis returned an unparseable non-audio body");
                Err(ApiError::SpeechSynthesis {
                    code: None,
                    message: "服务器错误".to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Fake clock driven by the test.
    struct MockClock {
        now_ms: AtomicU64,
    }

    impl MockClock {
        fn new(now_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                now_ms: AtomicU64::new(now_ms),
            })
        }

        fn advance_secs(&self, secs: u64) {
            self.now_ms.fetch_add(secs * 1000, Ordering::SeqCst);
        }
    }

    impl Clock for MockClock {
        fn now_ms(&self) -> u64 {
            self.now_ms.load(Ordering::SeqCst)
        }
    }

    fn test_client(base_url: &str, clock: Arc<dyn Clock>) -> SpeechClient {
        SpeechClient {
            client: Client::new(),
            api_key: Some("test-api-key".to_string()),
            secret_key: Some("test-secret-key".to_string()),
            auth_url: format!("{base_url}/oauth/2.0/token"),
            tts_url: format!("{base_url}/text2audio"),
            token: RwLock::new(None),
            clock,
        }
    }

    fn unconfigured_client() -> SpeechClient {
        SpeechClient {
            client: Client::new(),
            api_key: None,
            secret_key: None,
            auth_url: "http://127.0.0.1:1/oauth".to_string(),
            tts_url: "http://127.0.0.1:1/tts".to_string(),
            token: RwLock::new(None),
            clock: Arc::new(SystemClock),
        }
    }

    fn token_reply(token: &str, expires_in: u64) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "expires_in": expires_in,
        }))
    }

    #[test]
    fn test_is_configured() {
        assert!(!unconfigured_client().is_configured());

        let mut client = unconfigured_client();
        client.api_key = Some("ak".to_string());
        assert!(!client.is_configured());

        client.secret_key = Some("sk".to_string());
        assert!(client.is_configured());

        client.secret_key = Some(String::new());
        assert!(!client.is_configured());
    }

    #[tokio::test]
    async fn test_token_cached_within_safety_margin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/2.0/token"))
            .and(query_param("grant_type", "client_credentials"))
            .and(query_param("client_id", "test-api-key"))
            .and(query_param("client_secret", "test-secret-key"))
            .respond_with(token_reply("token-1", 2_592_000))
            .expect(1)
            .mount(&server)
            .await;

        let clock = MockClock::new(1_000_000);
        let client = test_client(&server.uri(), clock);

        let first = client.get_access_token().await.unwrap();
        let second = client.get_access_token().await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(second, "token-1");
        // expect(1) verifies the second call issued no network request.
    }

    #[tokio::test]
    async fn test_token_refreshed_after_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/2.0/token"))
            .respond_with(token_reply("token-1", 600))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/oauth/2.0/token"))
            .respond_with(token_reply("token-2", 600))
            .expect(1)
            .mount(&server)
            .await;

        let clock = MockClock::new(0);
        let client = test_client(&server.uri(), clock.clone());

        assert_eq!(client.get_access_token().await.unwrap(), "token-1");

        // 600s lifetime minus the 300s margin: expired after 300s.
        clock.advance_secs(301);
        assert_eq!(client.get_access_token().await.unwrap(), "token-2");
    }

    #[tokio::test]
    async fn test_missing_access_token_field_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/2.0/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_client"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), MockClock::new(0));
        let result = client.get_access_token().await;

        assert!(matches!(result.unwrap_err(), ApiError::SpeechAuth(_)));
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_cache_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/2.0/token"))
            .respond_with(token_reply("token-1", 600))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/oauth/2.0/token"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let clock = MockClock::new(0);
        let client = test_client(&server.uri(), clock.clone());

        client.get_access_token().await.unwrap();
        clock.advance_secs(301);

        let result = client.get_access_token().await;
        assert!(matches!(result.unwrap_err(), ApiError::SpeechAuth(_)));

        let cached = client.token.read().await.clone();
        assert_eq!(cached.unwrap().value, "token-1");
    }

    #[tokio::test]
    async fn test_unconfigured_token_fetch_is_configuration_error() {
        let client = unconfigured_client();
        let result = client.get_access_token().await;
        assert!(matches!(result.unwrap_err(), ApiError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_empty_text_rejected_before_network() {
        // Ports that cannot be reached; any network attempt would error
        // differently than InvalidInput.
        let client = SpeechClient {
            api_key: Some("ak".to_string()),
            secret_key: Some("sk".to_string()),
            ..unconfigured_client()
        };

        let result = client
            .text_to_speech("   ", &SynthesisOptions::default())
            .await;
        assert!(matches!(result.unwrap_err(), ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_overlong_text_rejected_before_network() {
        let client = SpeechClient {
            api_key: Some("ak".to_string()),
            secret_key: Some("sk".to_string()),
            ..unconfigured_client()
        };

        let text = "水".repeat(MAX_TEXT_CHARS + 1);
        let result = client
            .text_to_speech(&text, &SynthesisOptions::default())
            .await;
        assert!(matches!(result.unwrap_err(), ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_text_at_ceiling_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/2.0/token"))
            .respond_with(token_reply("tok", 2_592_000))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/text2audio"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mp3")
                    .set_body_bytes(vec![0xffu8, 0xf3, 0x00]),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), MockClock::new(0));
        let text = "水".repeat(MAX_TEXT_CHARS);
        let result = client
            .text_to_speech(&text, &SynthesisOptions::default())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_synthesis_returns_audio_bytes() {
        let server = MockServer::start().await;
        let audio = vec![0xffu8, 0xf3, 0x18, 0xc4];
        Mock::given(method("GET"))
            .and(path("/oauth/2.0/token"))
            .respond_with(token_reply("tok", 2_592_000))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/text2audio"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mp3")
                    .set_body_bytes(audio.clone()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), MockClock::new(0));
        let result = client
            .text_to_speech("你好", &SynthesisOptions::default())
            .await
            .unwrap();

        assert_eq!(result.as_ref(), audio.as_slice());
    }

    #[tokio::test]
    async fn test_synthesis_error_body_carries_code_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/2.0/token"))
            .respond_with(token_reply("tok", 2_592_000))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/text2audio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "err_no": 502,
                "err_msg": "speech quota exceeded",
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), MockClock::new(0));
        let result = client
            .text_to_speech("你好", &SynthesisOptions::default())
            .await;

        match result.unwrap_err() {
            ApiError::SpeechSynthesis { code, message } => {
                assert_eq!(code, Some(502));
                assert_eq!(message, "speech quota exceeded");
            }
            other => panic!("expected SpeechSynthesis error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_synthesis_unparseable_failure_is_generic() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/2.0/token"))
            .respond_with(token_reply("tok", 2_592_000))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/text2audio"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), MockClock::new(0));
        let result = client
            .text_to_speech("你好", &SynthesisOptions::default())
            .await;

        match result.unwrap_err() {
            ApiError::SpeechSynthesis { code, message } => {
                assert_eq!(code, None);
                assert_eq!(message, "服务器错误");
            }
            other => panic!("expected SpeechSynthesis error, got {other:?}"),
        }
    }
}
