// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Shirokuma diagnosis service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Top-level Shirokuma configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment variable
/// overrides. Every section defaults; the platform secrets have no default and
/// are enforced by [`crate::validation::validate_config`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShirokumaConfig {
    /// HTTP listener and webhook forwarding settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LINE Messaging API settings.
    #[serde(default)]
    pub line: LineConfig,

    /// Completion endpoint settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Reference dates for the day-cycle classifier.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Local lookup tables, templates and fonts.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Deduplication settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// PDF report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Cloudinary upload credentials.
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (env `PORT`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Raw events are copied here before processing. Failures are ignored.
    #[serde(default)]
    pub secondary_webhook_url: Option<String>,

    /// Timeout for the secondary webhook copy.
    #[serde(default = "default_forward_timeout_secs")]
    pub forward_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            secondary_webhook_url: None,
            forward_timeout_secs: default_forward_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_forward_timeout_secs() -> u64 {
    5
}

/// LINE Messaging API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LineConfig {
    /// Long-lived channel access token (env `LINE_CHANNEL_ACCESS_TOKEN`).
    #[serde(default)]
    pub channel_access_token: Option<String>,

    /// Channel secret used for webhook signatures (env `LINE_CHANNEL_SECRET`).
    #[serde(default)]
    pub channel_secret: Option<String>,

    /// API base URL.
    #[serde(default = "default_line_api_base_url")]
    pub api_base_url: String,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: None,
            channel_secret: None,
            api_base_url: default_line_api_base_url(),
        }
    }
}

fn default_line_api_base_url() -> String {
    "https://api.line.me".to_string()
}

/// Completion endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key (env `OPENAI_API_KEY`).
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature, 0.0..=2.0.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Client-side request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt on 429/5xx.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay, doubled per attempt unless `Retry-After` is sent.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// API base URL (the `/chat/completions` path is appended).
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            base_url: default_openai_base_url(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.8
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Reference dates for the classifier, as `YYYY-MM-DD`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    /// A day with cycle index 1 (甲子).
    #[serde(default = "default_cycle_epoch")]
    pub cycle_epoch: String,

    /// A day with stem index 0 (甲).
    #[serde(default = "default_stem_epoch")]
    pub stem_epoch: String,
}

impl CalendarConfig {
    pub fn cycle_epoch_date(&self) -> Option<NaiveDate> {
        parse_date(&self.cycle_epoch)
    }

    pub fn stem_epoch_date(&self) -> Option<NaiveDate> {
        parse_date(&self.stem_epoch)
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            cycle_epoch: default_cycle_epoch(),
            stem_epoch: default_stem_epoch(),
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn default_cycle_epoch() -> String {
    "1899-12-22".to_string()
}

fn default_stem_epoch() -> String {
    "1900-01-01".to_string()
}

/// Locations of the read-only assets loaded at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssetsConfig {
    /// Directory holding `animals.json` and `stems.json`.
    #[serde(default = "default_tables_dir")]
    pub tables_dir: String,

    /// Directory holding one `<diagnosis>.json` template per diagnosis type.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,

    /// TrueType font embedded in PDFs. Without it Japanese text cannot be drawn.
    #[serde(default)]
    pub font_path: Option<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            tables_dir: default_tables_dir(),
            templates_dir: default_templates_dir(),
            font_path: None,
        }
    }
}

fn default_tables_dir() -> String {
    "assets/tables".to_string()
}

fn default_templates_dir() -> String {
    "assets/templates".to_string()
}

/// Request deduplication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// How long an accepted job key suppresses identical requests.
    #[serde(default = "default_dedup_ttl_secs")]
    pub dedup_ttl_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            dedup_ttl_secs: default_dedup_ttl_secs(),
        }
    }
}

fn default_dedup_ttl_secs() -> u64 {
    120
}

/// PDF report configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Render and upload PDFs for premium diagnoses. When off, results are pushed as text.
    #[serde(default = "default_report_enabled")]
    pub enabled: bool,

    /// Title printed on the first page.
    #[serde(default = "default_report_title")]
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: default_report_enabled(),
            title: default_report_title(),
        }
    }
}

fn default_report_enabled() -> bool {
    true
}

fn default_report_title() -> String {
    "しろくま診断結果".to_string()
}

/// Cloudinary upload configuration.
///
/// Credentials come either from the three explicit fields or from a
/// `cloudinary://<api_key>:<api_secret>@<cloud_name>` URL (env `CLOUDINARY_URL`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CloudinaryConfig {
    #[serde(default)]
    pub cloud_name: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub api_secret: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    /// Folder reports are uploaded into.
    #[serde(default = "default_cloudinary_folder")]
    pub folder: String,

    /// Upload API base URL.
    #[serde(default = "default_cloudinary_api_base_url")]
    pub api_base_url: String,
}

/// Resolved Cloudinary account credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[redacted]")
            .finish()
    }
}

impl CloudinaryConfig {
    /// Resolves credentials, preferring explicit fields over the URL form.
    pub fn credentials(&self) -> Option<CloudinaryCredentials> {
        let explicit = (
            non_empty(&self.cloud_name),
            non_empty(&self.api_key),
            non_empty(&self.api_secret),
        );
        if let (Some(cloud_name), Some(api_key), Some(api_secret)) = explicit {
            return Some(CloudinaryCredentials {
                cloud_name: cloud_name.to_string(),
                api_key: api_key.to_string(),
                api_secret: api_secret.to_string(),
            });
        }
        self.url.as_deref().and_then(parse_cloudinary_url)
    }
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            url: None,
            folder: default_cloudinary_folder(),
            api_base_url: default_cloudinary_api_base_url(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parses `cloudinary://<api_key>:<api_secret>@<cloud_name>`.
pub fn parse_cloudinary_url(raw: &str) -> Option<CloudinaryCredentials> {
    let parsed = url::Url::parse(raw.trim()).ok()?;
    if parsed.scheme() != "cloudinary" {
        return None;
    }
    let api_key = parsed.username();
    let api_secret = parsed.password()?;
    let cloud_name = parsed.host_str()?;
    if api_key.is_empty() || api_secret.is_empty() || cloud_name.is_empty() {
        return None;
    }
    Some(CloudinaryCredentials {
        cloud_name: cloud_name.to_string(),
        api_key: api_key.to_string(),
        api_secret: api_secret.to_string(),
    })
}

fn default_cloudinary_folder() -> String {
    "shirokuma_reports".to_string()
}

fn default_cloudinary_api_base_url() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}
