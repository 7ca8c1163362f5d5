// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-diagnosis prompt templates and the set loaded at startup.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use shirokuma_core::{DiagnosisType, ShirokumaError};

/// One diagnosis type's prompt template. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptTemplate {
    /// Opening instruction of the user prompt.
    pub preamble: String,

    #[serde(default)]
    pub extra_instructions: String,

    /// Section outline, one line per section, kept in order.
    #[serde(default)]
    pub structure_guide: Vec<String>,

    /// Tone line appended to the system message.
    #[serde(default)]
    pub tone: String,

    /// Text appended after the generated diagnosis when delivered as chat text.
    #[serde(default)]
    pub closing: String,

    /// Short profile rendered above the body of the PDF report.
    #[serde(default)]
    pub summary_block: Option<String>,

    /// Form identifier accepted by the form-intake endpoint.
    #[serde(default)]
    pub form_id: Option<String>,
}

/// Templates for every diagnosis type.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: HashMap<DiagnosisType, PromptTemplate>,
}

impl TemplateSet {
    /// Loads `<slug>.json` for each diagnosis type from `dir`.
    ///
    /// Every type must have a readable, well-formed template.
    pub fn load(dir: &Path) -> Result<Self, ShirokumaError> {
        let mut templates = HashMap::new();
        for diagnosis in DiagnosisType::ALL {
            let path = dir.join(format!("{}.json", diagnosis.slug()));
            let asset_err = |message: String| ShirokumaError::Asset {
                path: path.display().to_string(),
                message,
            };
            let raw = std::fs::read_to_string(&path).map_err(|e| asset_err(e.to_string()))?;
            let template: PromptTemplate =
                serde_json::from_str(&raw).map_err(|e| asset_err(e.to_string()))?;
            if template.preamble.trim().is_empty() {
                return Err(asset_err("preamble must not be empty".to_string()));
            }
            templates.insert(diagnosis, template);
        }
        let set = Self::from_map(templates)?;
        tracing::debug!(dir = %dir.display(), "prompt templates loaded");
        Ok(set)
    }

    /// Builds a set from already-parsed templates, checking completeness and
    /// form id uniqueness.
    pub fn from_map(templates: HashMap<DiagnosisType, PromptTemplate>) -> Result<Self, ShirokumaError> {
        if let Some(missing) = DiagnosisType::ALL.iter().find(|t| !templates.contains_key(t)) {
            return Err(ShirokumaError::Asset {
                path: format!("{}.json", missing.slug()),
                message: "template missing".to_string(),
            });
        }
        let mut seen = Vec::new();
        for form_id in templates.values().filter_map(|t| t.form_id.as_deref()) {
            if seen.contains(&form_id) {
                return Err(ShirokumaError::Asset {
                    path: "templates".to_string(),
                    message: format!("form_id `{form_id}` used by more than one template"),
                });
            }
            seen.push(form_id);
        }
        Ok(Self { templates })
    }

    pub fn get(&self, diagnosis: DiagnosisType) -> Result<&PromptTemplate, ShirokumaError> {
        self.templates
            .get(&diagnosis)
            .ok_or_else(|| ShirokumaError::Internal(format!("no template for {diagnosis}")))
    }

    /// Finds the template registered for a form id.
    pub fn by_form_id(&self, form_id: &str) -> Option<(DiagnosisType, &PromptTemplate)> {
        self.templates
            .iter()
            .find(|(_, t)| t.form_id.as_deref() == Some(form_id))
            .map(|(d, t)| (*d, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(form_id: Option<&str>) -> PromptTemplate {
        PromptTemplate {
            preamble: "診断してください".into(),
            extra_instructions: String::new(),
            structure_guide: vec![],
            tone: String::new(),
            closing: String::new(),
            summary_block: None,
            form_id: form_id.map(str::to_string),
        }
    }

    fn write_all(dir: &Path, skip: Option<DiagnosisType>) {
        for d in DiagnosisType::ALL {
            if Some(d) == skip {
                continue;
            }
            let body = format!(r#"{{"preamble": "{} の診断", "form_id": "form-{}"}}"#, d.label(), d.slug());
            std::fs::write(dir.join(format!("{}.json", d.slug())), body).unwrap();
        }
    }

    #[test]
    fn loads_complete_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path(), None);
        let set = TemplateSet::load(dir.path()).unwrap();
        assert!(set.get(DiagnosisType::FreeTotal).unwrap().preamble.contains("無料"));
        let (d, _) = set.by_form_id("form-compatibility").unwrap();
        assert_eq!(d, DiagnosisType::Compatibility);
        assert!(set.by_form_id("nope").is_none());
    }

    #[test]
    fn missing_template_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path(), Some(DiagnosisType::SelfPremium));
        let err = TemplateSet::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("self_premium.json"), "got: {err}");
    }

    #[test]
    fn malformed_template_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path(), None);
        std::fs::write(dir.path().join("free_total.json"), r#"{"preambel": "x"}"#).unwrap();
        assert!(matches!(
            TemplateSet::load(dir.path()),
            Err(ShirokumaError::Asset { .. })
        ));
    }

    #[test]
    fn duplicate_form_ids_rejected() {
        let map: HashMap<_, _> = DiagnosisType::ALL
            .into_iter()
            .map(|d| (d, template(Some("same"))))
            .collect();
        assert!(TemplateSet::from_map(map).is_err());
    }

    #[test]
    fn shipped_templates_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/templates");
        let set = TemplateSet::load(&dir).unwrap();
        for d in DiagnosisType::ALL {
            assert!(!set.get(d).unwrap().structure_guide.is_empty());
        }
        assert!(set.by_form_id("shirokuma-premium-form").is_some());
    }
}
