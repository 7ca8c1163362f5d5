// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types used across adapter traits and the diagnosis pipeline.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sentinel used when a lookup table has no entry for a derived attribute.
pub const UNKNOWN: &str = "unknown";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays in the pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Messenger,
    Provider,
    Renderer,
    Uploader,
    Store,
}

/// The request category, selecting template, extraction rules and delivery.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisType {
    FreeTotal,
    SelfPremium,
    Compatibility,
}

impl DiagnosisType {
    /// Every diagnosis type, in menu order.
    pub const ALL: [DiagnosisType; 3] = [
        DiagnosisType::FreeTotal,
        DiagnosisType::SelfPremium,
        DiagnosisType::Compatibility,
    ];

    /// The label users put between `《《《` and `》》》`.
    pub fn label(self) -> &'static str {
        match self {
            DiagnosisType::FreeTotal => "無料トータル診断",
            DiagnosisType::SelfPremium => "プレミアム自分診断",
            DiagnosisType::Compatibility => "相性診断",
        }
    }

    /// Resolves a bracketed label back to a diagnosis type.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    /// Stable identifier used for template file names and job keys.
    pub fn slug(self) -> &'static str {
        match self {
            DiagnosisType::FreeTotal => "free_total",
            DiagnosisType::SelfPremium => "self_premium",
            DiagnosisType::Compatibility => "compatibility",
        }
    }

    /// Whether results are delivered as an uploaded PDF rather than chat text.
    pub fn delivers_pdf(self) -> bool {
        !matches!(self, DiagnosisType::FreeTotal)
    }

    /// Whether the request must carry a partner record.
    pub fn requires_partner(self) -> bool {
        matches!(self, DiagnosisType::Compatibility)
    }
}

/// A validated proleptic Gregorian birth date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BirthDate(NaiveDate);

impl BirthDate {
    /// Builds a birth date, returning `None` for impossible calendar dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parses an ISO `YYYY-MM-DD` date.
    pub fn parse_iso(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok().map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// The underlying calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// ISO 8601 rendering (`1996-04-24`).
    pub fn iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl From<NaiveDate> for BirthDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}年{}月{}日", self.year(), self.month(), self.day())
    }
}

/// A four-letter MBTI code, normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonalityCode(String);

impl PersonalityCode {
    /// Parses a code such as `enfp` or `ENFP`.
    ///
    /// Each position must be one of its two valid letters (`E/I`, `S/N`,
    /// `T/F`, `J/P`).
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let bytes = upper.as_bytes();
        if bytes.len() != 4 {
            return None;
        }
        let valid = matches!(bytes[0], b'E' | b'I')
            && matches!(bytes[1], b'S' | b'N')
            && matches!(bytes[2], b'T' | b'F')
            && matches!(bytes[3], b'J' | b'P');
        valid.then_some(Self(upper))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonalityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The second person in a compatibility request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerProfile {
    pub birth_date: BirthDate,
    pub personality_code: PersonalityCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

/// A fully-populated diagnosis request extracted from one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRequest {
    pub diagnosis_type: DiagnosisType,
    pub birth_date: BirthDate,
    pub personality_code: PersonalityCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Free-text question (premium) or relationship topic (compatibility).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<PartnerProfile>,
}

impl DiagnosisRequest {
    /// Builds the deduplication key for this request on behalf of `user_id`.
    pub fn job_key(&self, user_id: &str) -> JobKey {
        JobKey {
            user_id: user_id.to_string(),
            diagnosis_type: self.diagnosis_type,
            birth_date: self.birth_date,
            personality_code: self.personality_code.clone(),
            partner: self
                .partner
                .as_ref()
                .map(|p| (p.birth_date, p.personality_code.clone())),
        }
    }
}

/// Date-derived attributes of one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Position in the 60-day cycle, 1..=60.
    pub cycle_index: u8,
    /// Animal character for the cycle index.
    pub animal: String,
    /// Position in the 10-day stem cycle, 0..=9.
    pub stem_index: u8,
    /// Stem symbol (`甲` .. `癸`).
    pub stem_symbol: String,
    pub element: String,
    pub guardian: String,
}

impl ClassificationResult {
    /// True when none of the derived attributes could be looked up.
    pub fn is_unresolved(&self) -> bool {
        self.animal == UNKNOWN && self.element == UNKNOWN && self.guardian == UNKNOWN
    }
}

/// Composite identifier used for short-window deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub user_id: String,
    pub diagnosis_type: DiagnosisType,
    pub birth_date: BirthDate,
    pub personality_code: PersonalityCode,
    pub partner: Option<(BirthDate, PersonalityCode)>,
}

/// Display profile of a messaging-platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
}

/// A message delivered to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Plain chat text.
    Text(String),
}

impl OutboundMessage {
    pub fn text(s: impl Into<String>) -> Self {
        OutboundMessage::Text(s.into())
    }

    /// The text carried by the message.
    pub fn as_text(&self) -> &str {
        match self {
            OutboundMessage::Text(t) => t,
        }
    }
}

/// A chat-style completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System preamble.
    pub system: String,
    /// The assembled user prompt.
    pub user: String,
}

/// Token usage reported by the completion endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A completed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub finish_reason: Option<String>,
    pub usage: TokenUsage,
}

/// Content for a rendered diagnosis report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub title: String,
    /// Summary block shown above the body.
    pub summary: String,
    /// The generated diagnosis text.
    pub body: String,
    /// File name used for the upload (without directory).
    pub file_name: String,
}

/// PDF bytes ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
