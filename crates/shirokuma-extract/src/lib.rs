// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction of a [`DiagnosisRequest`] from a free-form chat message.
//!
//! Messages come from rich-menu templates that users edit by hand, so the
//! extractor tolerates full-width digits and letters, either colon style,
//! and several date shapes. It never produces a partial request: either
//! every required field is present and valid, or the caller gets the
//! [`ExtractFailure`] that explains what was missing.

pub mod normalize;
pub mod patterns;
pub mod sections;

use shirokuma_core::{DiagnosisRequest, DiagnosisType, PartnerProfile};
use thiserror::Error;

use crate::normalize::normalize;
use crate::patterns::{find_gender, find_line_field, find_record};
use crate::sections::Sections;

/// Why a message did not yield a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractFailure {
    /// A `《《《》》》` marker was present but empty.
    #[error("diagnosis label marker is empty")]
    MissingLabel,

    /// The marker names a diagnosis type that does not exist.
    #[error("unknown diagnosis label `{0}`")]
    UnknownLabel(String),

    /// No valid birth date and MBTI code pair was found.
    #[error("birth date or MBTI code missing")]
    MissingBirthData,

    /// A compatibility request without a complete partner record.
    #[error("partner record missing")]
    MissingPartner,
}

/// Extracts a request, discarding the failure reason.
pub fn extract(text: &str) -> Option<DiagnosisRequest> {
    extract_detailed(text).ok()
}

/// Extracts a request or reports why it could not.
pub fn extract_detailed(text: &str) -> Result<DiagnosisRequest, ExtractFailure> {
    let text = normalize(text);
    let diagnosis_type = diagnosis_label(&text)?;
    let sections = Sections::parse(&text);

    let request = match diagnosis_type {
        DiagnosisType::Compatibility => {
            let own_text = sections.body("あなた").unwrap_or_else(|| sections.preamble());
            let (birth_date, personality_code) =
                find_record(own_text).ok_or(ExtractFailure::MissingBirthData)?;
            let partner_text = sections.body("お相手").ok_or(ExtractFailure::MissingPartner)?;
            let (partner_birth, partner_code) =
                find_record(partner_text).ok_or(ExtractFailure::MissingPartner)?;

            DiagnosisRequest {
                diagnosis_type,
                birth_date,
                personality_code,
                gender: find_gender(own_text),
                question: free_text(&sections, &text, "相談内容"),
                partner: Some(PartnerProfile {
                    birth_date: partner_birth,
                    personality_code: partner_code,
                    gender: find_gender(partner_text),
                }),
            }
        }
        DiagnosisType::SelfPremium | DiagnosisType::FreeTotal => {
            let (birth_date, personality_code) =
                find_record(&text).ok_or(ExtractFailure::MissingBirthData)?;
            let question = if diagnosis_type == DiagnosisType::SelfPremium {
                free_text(&sections, &text, "質問")
            } else {
                None
            };
            DiagnosisRequest {
                diagnosis_type,
                birth_date,
                personality_code,
                gender: find_gender(&text),
                question,
                partner: None,
            }
        }
    };

    tracing::debug!(
        diagnosis = %request.diagnosis_type,
        has_partner = request.partner.is_some(),
        has_question = request.question.is_some(),
        "request extracted"
    );
    Ok(request)
}

/// Reads the diagnosis type from the `《《《label》》》` marker.
///
/// A message without a marker is a free total diagnosis.
pub fn diagnosis_label(text: &str) -> Result<DiagnosisType, ExtractFailure> {
    match patterns::find_label(text) {
        None => Ok(DiagnosisType::FreeTotal),
        Some(label) if label.is_empty() => Err(ExtractFailure::MissingLabel),
        Some(label) => {
            DiagnosisType::from_label(label).ok_or_else(|| ExtractFailure::UnknownLabel(label.to_string()))
        }
    }
}

/// A `【name】` block wins over a `name：` line.
fn free_text(sections: &Sections<'_>, text: &str, name: &str) -> Option<String> {
    sections
        .body(name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| find_line_field(text, name))
}

#[cfg(test)]
mod tests {
    use shirokuma_core::BirthDate;

    use super::*;

    #[test]
    fn labeled_free_total() {
        let req = extract("《《《無料トータル診断》》》\n生年月日：1996年4月24日\nMBTI：ENFP").unwrap();
        assert_eq!(req.diagnosis_type, DiagnosisType::FreeTotal);
        assert_eq!(req.birth_date, BirthDate::from_ymd(1996, 4, 24).unwrap());
        assert_eq!(req.personality_code.as_str(), "ENFP");
        assert!(req.partner.is_none());
        assert!(req.question.is_none());
    }

    #[test]
    fn unlabeled_message_is_free_total() {
        let req = extract("1996年4月24日 enfp です").unwrap();
        assert_eq!(req.diagnosis_type, DiagnosisType::FreeTotal);
        assert_eq!(req.personality_code.as_str(), "ENFP");
    }

    #[test]
    fn numeric_dates_and_full_width_input() {
        let req = extract("１９９６／４／２４　ＩＮＴＪ").unwrap();
        assert_eq!(req.birth_date, BirthDate::from_ymd(1996, 4, 24).unwrap());
        assert_eq!(req.personality_code.as_str(), "INTJ");

        let req = extract("2001-12-03 ISFP").unwrap();
        assert_eq!(req.birth_date, BirthDate::from_ymd(2001, 12, 3).unwrap());
    }

    #[test]
    fn premium_question_block_and_gender() {
        let text = "《《《プレミアム自分診断》》》\n生年月日: 1990年1月2日\nMBTI: istp\n性別：女性\n【質問】\n転職すべきか迷っています。\n今の職場は好きです。";
        let req = extract(text).unwrap();
        assert_eq!(req.diagnosis_type, DiagnosisType::SelfPremium);
        assert_eq!(req.gender.as_deref(), Some("女性"));
        assert_eq!(
            req.question.as_deref(),
            Some("転職すべきか迷っています。\n今の職場は好きです。")
        );
    }

    #[test]
    fn premium_question_line() {
        let text = "《《《プレミアム自分診断》》》\n1990年1月2日 ISTP\n質問：来年の運勢は？";
        let req = extract(text).unwrap();
        assert_eq!(req.question.as_deref(), Some("来年の運勢は？"));
    }

    #[test]
    fn compatibility_with_partner() {
        let text = "《《《相性診断》》》\n【あなた】\n生年月日：1996年4月24日\nMBTI：ENFP\n性別：女性\n【お相手】\n生年月日：1994年11月3日\nMBTI：ISTJ\n性別：男性\n【相談内容】\n結婚を考えています";
        let req = extract(text).unwrap();
        assert_eq!(req.diagnosis_type, DiagnosisType::Compatibility);
        assert_eq!(req.personality_code.as_str(), "ENFP");
        assert_eq!(req.gender.as_deref(), Some("女性"));
        let partner = req.partner.unwrap();
        assert_eq!(partner.birth_date, BirthDate::from_ymd(1994, 11, 3).unwrap());
        assert_eq!(partner.personality_code.as_str(), "ISTJ");
        assert_eq!(partner.gender.as_deref(), Some("男性"));
        assert_eq!(req.question.as_deref(), Some("結婚を考えています"));
    }

    #[test]
    fn compatibility_without_partner_fails() {
        let text = "《《《相性診断》》》\n生年月日：1996年4月24日\nMBTI：ENFP";
        assert_eq!(extract_detailed(text), Err(ExtractFailure::MissingPartner));

        let text = "《《《相性診断》》》\n【あなた】1996年4月24日 ENFP\n【お相手】1994年11月3日";
        assert_eq!(extract_detailed(text), Err(ExtractFailure::MissingPartner));
    }

    #[test]
    fn missing_birth_data() {
        assert_eq!(
            extract_detailed("《《《無料トータル診断》》》\nよろしくお願いします"),
            Err(ExtractFailure::MissingBirthData)
        );
        assert_eq!(
            extract_detailed("生年月日：1996年4月24日"),
            Err(ExtractFailure::MissingBirthData)
        );
    }

    #[test]
    fn invalid_calendar_date_fails() {
        assert_eq!(
            extract_detailed("生年月日：2001年2月30日\nMBTI：ENFP"),
            Err(ExtractFailure::MissingBirthData)
        );
    }

    #[test]
    fn invalid_code_letters_fail() {
        assert!(extract("1996年4月24日 ABCD").is_none());
        assert!(extract("1996年4月24日 ENFPX").is_none());
    }

    #[test]
    fn label_failures() {
        assert_eq!(
            extract_detailed("《《《星座診断》》》\n1996年4月24日 ENFP"),
            Err(ExtractFailure::UnknownLabel("星座診断".into()))
        );
        assert_eq!(
            extract_detailed("《《《 》》》\n1996年4月24日 ENFP"),
            Err(ExtractFailure::MissingLabel)
        );
    }

    proptest::proptest! {
        #[test]
        fn never_panics(text in "\\PC{0,200}") {
            let _ = extract_detailed(&text);
        }

        #[test]
        fn accepts_every_valid_pair(
            year in 1900i32..2030,
            month in 1u32..=12,
            day in 1u32..=28,
            code in "[EeIi][SsNn][TtFf][JjPp]",
        ) {
            let text = format!("生年月日：{year}年{month}月{day}日\nMBTI：{code}");
            let req = extract(&text).unwrap();
            proptest::prop_assert_eq!(req.birth_date, BirthDate::from_ymd(year, month, day).unwrap());
            proptest::prop_assert_eq!(req.personality_code.as_str(), code.to_ascii_uppercase());
        }
    }
}
