// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The template environment for one request.
//!
//! Shape:
//!
//! ```text
//! user      { name, birth, birth_iso, mbti, gender, cycle_index, animal,
//!             stem, element, guardian }
//! partner   same fields except name (compatibility only)
//! question  premium question, or "特になし"
//! topic     compatibility topic, or "特になし"
//! diagnosis { type, label }
//! ```

use serde_json::{Map, Value, json};
use shirokuma_core::{
    BirthDate, ClassificationResult, DiagnosisRequest, DiagnosisType, PersonalityCode,
};

/// Name used when the messaging profile cannot be fetched.
pub const DEFAULT_USER_NAME: &str = "あなた";

const NOT_ANSWERED: &str = "未回答";
const NOTHING: &str = "特になし";

/// Builds the environment for `request`.
///
/// `partner` must be `Some` exactly when the request carries a partner.
pub fn build_environment(
    request: &DiagnosisRequest,
    own: &ClassificationResult,
    partner: Option<&ClassificationResult>,
    user_name: Option<&str>,
) -> Value {
    let mut user = person(
        &request.birth_date,
        &request.personality_code,
        request.gender.as_deref(),
        own,
    );
    let name = user_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_USER_NAME);
    user.insert("name".to_string(), json!(name));

    let mut env = Map::new();
    env.insert("user".to_string(), Value::Object(user));

    if let (Some(profile), Some(classification)) = (&request.partner, partner) {
        env.insert(
            "partner".to_string(),
            Value::Object(person(
                &profile.birth_date,
                &profile.personality_code,
                profile.gender.as_deref(),
                classification,
            )),
        );
    }

    let free_text = request.question.as_deref().unwrap_or(NOTHING);
    let (question, topic) = match request.diagnosis_type {
        DiagnosisType::Compatibility => (NOTHING, free_text),
        _ => (free_text, NOTHING),
    };
    env.insert("question".to_string(), json!(question));
    env.insert("topic".to_string(), json!(topic));
    env.insert(
        "diagnosis".to_string(),
        json!({
            "type": request.diagnosis_type.slug(),
            "label": request.diagnosis_type.label(),
        }),
    );

    Value::Object(env)
}

fn person(
    birth: &BirthDate,
    code: &PersonalityCode,
    gender: Option<&str>,
    classification: &ClassificationResult,
) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("birth".to_string(), json!(birth.to_string()));
    map.insert("birth_iso".to_string(), json!(birth.iso()));
    map.insert("mbti".to_string(), json!(code.as_str()));
    map.insert("gender".to_string(), json!(gender.unwrap_or(NOT_ANSWERED)));
    map.insert("cycle_index".to_string(), json!(classification.cycle_index));
    map.insert("animal".to_string(), json!(classification.animal));
    map.insert("stem".to_string(), json!(classification.stem_symbol));
    map.insert("element".to_string(), json!(classification.element));
    map.insert("guardian".to_string(), json!(classification.guardian));
    map
}

#[cfg(test)]
mod tests {
    use shirokuma_core::PartnerProfile;

    use super::*;
    use crate::render::render;

    fn classification(animal: &str) -> ClassificationResult {
        ClassificationResult {
            cycle_index: 28,
            animal: animal.into(),
            stem_index: 7,
            stem_symbol: "辛".into(),
            element: "金".into(),
            guardian: "宝石".into(),
        }
    }

    fn request(diagnosis_type: DiagnosisType) -> DiagnosisRequest {
        DiagnosisRequest {
            diagnosis_type,
            birth_date: BirthDate::from_ymd(1996, 4, 24).unwrap(),
            personality_code: PersonalityCode::parse("ENFP").unwrap(),
            gender: None,
            question: Some("仕事について".into()),
            partner: None,
        }
    }

    #[test]
    fn user_fields() {
        let env = build_environment(
            &request(DiagnosisType::SelfPremium),
            &classification("優雅なペガサス"),
            None,
            Some("しろ"),
        );
        assert_eq!(
            render("${user.name}:${user.birth}:${user.mbti}:${user.animal}:${user.stem}", &env),
            "しろ:1996年4月24日:ENFP:優雅なペガサス:辛"
        );
        assert_eq!(render("${user.gender}", &env), NOT_ANSWERED);
        assert_eq!(render("${question}/${topic}", &env), "仕事について/特になし");
        assert_eq!(render("${diagnosis.type}", &env), "self_premium");
        assert_eq!(render("${partner.mbti}", &env), "${partner.mbti}");
    }

    #[test]
    fn blank_name_falls_back() {
        let env = build_environment(
            &request(DiagnosisType::FreeTotal),
            &classification("x"),
            None,
            Some("  "),
        );
        assert_eq!(render("${user.name}", &env), DEFAULT_USER_NAME);
    }

    #[test]
    fn compatibility_has_partner_and_topic() {
        let mut req = request(DiagnosisType::Compatibility);
        req.partner = Some(PartnerProfile {
            birth_date: BirthDate::from_ymd(1994, 11, 3).unwrap(),
            personality_code: PersonalityCode::parse("ISTJ").unwrap(),
            gender: Some("男性".into()),
        });
        let env = build_environment(
            &req,
            &classification("a"),
            Some(&classification("b")),
            None,
        );
        assert_eq!(
            render("${partner.mbti} ${partner.animal} ${partner.gender} ${topic} ${question}", &env),
            "ISTJ b 男性 仕事について 特になし"
        );
    }
}
