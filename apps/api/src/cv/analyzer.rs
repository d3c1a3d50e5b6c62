//! CV analysis: prompt, LLM call, structured parse, keyword fallback.

use tracing::{info, warn};

use crate::cv::fallback::fallback_analysis;
use crate::cv::models::{AnalysisSource, CvAnalysis};
use crate::cv::prompts::{build_cv_analysis_prompt, CV_ANALYSIS_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, CallOptions, ChatMessage, LlmClient, Role};

const ANALYSIS_TEMPERATURE: f32 = 0.3;
const ANALYSIS_MAX_TOKENS: u32 = 1500;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AnalysisParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("invalid analysis response: skills array missing")]
    MissingSkills,

    #[error("invalid analysis response: {0}")]
    Shape(String),
}

/// Analysis result and the backend that produced it.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: CvAnalysis,
    pub source: AnalysisSource,
}

/// Parses a raw model reply into a `CvAnalysis`.
/// A reply without a `skills` array is rejected.
pub fn parse_cv_analysis(raw: &str) -> Result<CvAnalysis, AnalysisParseError> {
    let value: serde_json::Value = serde_json::from_str(strip_json_fences(raw))
        .map_err(|e| AnalysisParseError::InvalidJson(e.to_string()))?;

    if !value.get("skills").is_some_and(|s| s.is_array()) {
        return Err(AnalysisParseError::MissingSkills);
    }

    serde_json::from_value(value).map_err(|e| AnalysisParseError::Shape(e.to_string()))
}

/// Runs the analysis pipeline. Any LLM or parse failure falls back to keyword
/// matching when `fallback_enabled`; otherwise it surfaces as an LLM error.
pub async fn analyze_cv(
    llm: &LlmClient,
    cv_text: &str,
    target_role: Option<&str>,
    fallback_enabled: bool,
) -> Result<AnalysisOutcome, AppError> {
    match request_analysis(llm, cv_text, target_role).await {
        Ok(analysis) => {
            info!(
                skills = analysis.skills.len(),
                "CV analysis completed by LLM"
            );
            Ok(AnalysisOutcome {
                analysis,
                source: AnalysisSource::Llm,
            })
        }
        Err(reason) if fallback_enabled => {
            warn!("CV analysis falling back to keyword matching: {reason}");
            Ok(AnalysisOutcome {
                analysis: fallback_analysis(cv_text),
                source: AnalysisSource::Fallback,
            })
        }
        Err(reason) => Err(AppError::Llm(format!(
            "CV analysis failed and fallback is disabled: {reason}"
        ))),
    }
}

async fn request_analysis(
    llm: &LlmClient,
    cv_text: &str,
    target_role: Option<&str>,
) -> Result<CvAnalysis, String> {
    let prompt = build_cv_analysis_prompt(cv_text, target_role);
    let messages = [
        ChatMessage::new(Role::System, CV_ANALYSIS_SYSTEM),
        ChatMessage::new(Role::User, prompt),
    ];
    let reply = llm
        .chat(
            &messages,
            CallOptions {
                temperature: ANALYSIS_TEMPERATURE,
                max_tokens: ANALYSIS_MAX_TOKENS,
                json_mode: true,
            },
        )
        .await
        .map_err(|e| e.to_string())?;

    parse_cv_analysis(&reply.text).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use crate::cv::models::SkillCategory;

    fn offline_llm() -> LlmClient {
        LlmClient::new(&LlmConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
            model: "test".to_string(),
            fallback_enabled: true,
        })
        .unwrap()
    }

    #[test]
    fn test_parse_full_response() {
        let raw = r#"```json
        {
            "skills": [
                {"name": "Rust", "category": "programming", "confidence": 90, "years": 4},
                {"name": "Kubernetes", "category": "tool", "confidence": 75, "years": null}
            ],
            "experience": {
                "totalYears": 7,
                "roles": [{"title": "Engineer", "company": "Acme", "duration": "2018-2025", "years": 7}]
            },
            "education": [{"degree": "BSc CS", "institution": "MIT", "year": 2018}],
            "summary": "Systems engineer.",
            "confidence": 85
        }
        ```"#;
        let analysis = parse_cv_analysis(raw).unwrap();
        assert_eq!(analysis.skills.len(), 2);
        assert_eq!(analysis.skills[0].category, SkillCategory::Programming);
        assert_eq!(analysis.experience.total_years, Some(7.0));
        assert_eq!(analysis.education[0].year, Some(2018.0));
        assert_eq!(analysis.confidence, 85.0);
    }

    #[test]
    fn test_parse_minimal_response_fills_defaults() {
        let analysis = parse_cv_analysis(r#"{"skills": []}"#).unwrap();
        assert!(analysis.skills.is_empty());
        assert!(analysis.education.is_empty());
        assert_eq!(analysis.summary, "");
    }

    #[test]
    fn test_parse_rejects_missing_skills() {
        assert_eq!(
            parse_cv_analysis(r#"{"summary": "x"}"#),
            Err(AnalysisParseError::MissingSkills)
        );
        assert_eq!(
            parse_cv_analysis(r#"{"skills": "Rust, Go"}"#),
            Err(AnalysisParseError::MissingSkills)
        );
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_cv_analysis("I cannot help with that."),
            Err(AnalysisParseError::InvalidJson(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_llm_uses_fallback() {
        let outcome = analyze_cv(&offline_llm(), "Python and Docker", None, true)
            .await
            .unwrap();
        assert_eq!(outcome.source, AnalysisSource::Fallback);
        let names: Vec<_> = outcome.analysis.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Python", "Docker"]);
    }

    #[tokio::test]
    async fn test_fallback_disabled_surfaces_llm_error() {
        let err = analyze_cv(&offline_llm(), "Python", None, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
