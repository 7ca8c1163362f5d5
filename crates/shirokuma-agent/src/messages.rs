// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing chat texts.

use shirokuma_core::{DiagnosisType, ShirokumaError};
use shirokuma_extract::ExtractFailure;

pub const ACKNOWLEDGED: &str =
    "診断を受け付けました！\n結果ができあがるまで、少しだけお待ちください。";

pub const NEED_BIRTH_DATA: &str = "生年月日とMBTIの両方を入力してください。\n\
例）\n生年月日：1996年4月24日\nMBTI：ENFP";

pub const NEED_LABEL: &str =
    "診断の種類を読み取れませんでした。\nメニューから診断を選んで、もう一度送信してください。";

pub const NEED_PARTNER: &str = "相性診断には、お相手の生年月日とMBTIも必要です。\n\
【お相手】の下に入力して、もう一度送信してください。";

pub const UNRESOLVED_DATE: &str =
    "この生年月日では診断を作成できませんでした。\n別の日付でお試しください。";

pub const BUSY: &str =
    "ただいま大変混み合っています。\n申し訳ありませんが、しばらくしてからもう一度お試しください。";

pub const REFUSED: &str = "申し訳ありません。この内容では診断を作成できませんでした。\n\
内容を変えて、もう一度お試しください。";

pub const FAILED: &str = "申し訳ありません。診断の作成中にエラーが発生しました。\n\
時間をおいて、もう一度お試しください。";

/// Guidance for a message the extractor could not use.
pub fn guidance(failure: &ExtractFailure) -> &'static str {
    match failure {
        ExtractFailure::MissingLabel | ExtractFailure::UnknownLabel(_) => NEED_LABEL,
        ExtractFailure::MissingBirthData => NEED_BIRTH_DATA,
        ExtractFailure::MissingPartner => NEED_PARTNER,
    }
}

/// The apology pushed when a job fails after acknowledgment.
pub fn failure_message(error: &ShirokumaError) -> &'static str {
    match error {
        ShirokumaError::Extraction(_) => NEED_BIRTH_DATA,
        ShirokumaError::Classification(_) => UNRESOLVED_DATE,
        ShirokumaError::RateLimited { .. } | ShirokumaError::Timeout { .. } => BUSY,
        ShirokumaError::Refused => REFUSED,
        _ => FAILED,
    }
}

pub fn report_ready(diagnosis: DiagnosisType, url: &str) -> String {
    format!("{}の結果ができあがりました！\n下のリンクからPDFをご覧ください。\n{url}", diagnosis.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_has_guidance() {
        assert_eq!(guidance(&ExtractFailure::MissingBirthData), NEED_BIRTH_DATA);
        assert_eq!(guidance(&ExtractFailure::UnknownLabel("星座".into())), NEED_LABEL);
        assert_eq!(guidance(&ExtractFailure::MissingPartner), NEED_PARTNER);
    }

    #[test]
    fn errors_map_to_categories() {
        assert_eq!(failure_message(&ShirokumaError::Classification("x".into())), UNRESOLVED_DATE);
        assert_eq!(failure_message(&ShirokumaError::RateLimited { attempts: 4 }), BUSY);
        assert_eq!(failure_message(&ShirokumaError::Refused), REFUSED);
        assert_eq!(
            failure_message(&ShirokumaError::Upload {
                message: "503".into(),
                source: None
            }),
            FAILED
        );
    }

    #[test]
    fn report_link_names_the_diagnosis() {
        let text = report_ready(DiagnosisType::SelfPremium, "https://example.com/r.pdf");
        assert!(text.starts_with("プレミアム自分診断"));
        assert!(text.ends_with("https://example.com/r.pdf"));
    }
}
