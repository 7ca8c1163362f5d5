// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Shirokuma diagnosis service.
//!
//! This crate provides the domain types shared by every stage of the
//! diagnosis pipeline (extraction, classification, prompting, completion,
//! delivery), the cross-crate error type, and the adapter traits that the
//! messaging, completion, report and concurrency-guard crates implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ShirokumaError;
pub use types::{
    AdapterType, BirthDate, ClassificationResult, DiagnosisRequest, DiagnosisType, HealthStatus,
    JobKey, PartnerProfile, PersonalityCode,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    CompletionProvider, JobPermit, JobStore, JobTicket, Messenger, PluginAdapter, ReportRenderer,
    ReportUploader, UserLocks,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shirokuma_error_has_all_variants() {
        let _config = ShirokumaError::Config("test".into());
        let _asset = ShirokumaError::Asset {
            path: "assets/tables/animals.json".into(),
            message: "missing".into(),
        };
        let _extraction = ShirokumaError::Extraction("no date".into());
        let _classification = ShirokumaError::Classification("1800-01-01".into());
        let _provider = ShirokumaError::Provider {
            message: "test".into(),
            source: None,
        };
        let _rate = ShirokumaError::RateLimited { attempts: 4 };
        let _refused = ShirokumaError::Refused;
        let _channel = ShirokumaError::Channel {
            message: "test".into(),
            source: None,
        };
        let _report = ShirokumaError::Report("font".into());
        let _upload = ShirokumaError::Upload {
            message: "test".into(),
            source: None,
        };
        let _timeout = ShirokumaError::Timeout {
            duration: std::time::Duration::from_secs(60),
        };
        let _internal = ShirokumaError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        let variants = [
            AdapterType::Messenger,
            AdapterType::Provider,
            AdapterType::Renderer,
            AdapterType::Uploader,
            AdapterType::Store,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_messenger<T: Messenger>() {}
        fn _assert_provider<T: CompletionProvider>() {}
        fn _assert_renderer<T: ReportRenderer>() {}
        fn _assert_uploader<T: ReportUploader>() {}
        fn _assert_job_store<T: JobStore>() {}
        fn _assert_user_locks<T: UserLocks>() {}
    }
}
