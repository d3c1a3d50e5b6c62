use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Programming,
    Framework,
    Tool,
    Language,
    Soft,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub name: String,
    #[serde(default = "default_category")]
    pub category: SkillCategory,
    /// 0-100
    #[serde(default, deserialize_with = "deserialize_percent")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub years: Option<f64>,
}

fn default_category() -> SkillCategory {
    SkillCategory::Other
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub years: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub total_years: Option<f64>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Education {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub year: Option<f64>,
}

/// Structured CV analysis, as produced by the LLM or the keyword fallback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CvAnalysis {
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub experience: Experience,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub summary: String,
    /// 0-100
    #[serde(default, deserialize_with = "deserialize_percent")]
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Course,
    Book,
    Tutorial,
    Project,
    Certification,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cost {
    Free,
    Paid,
    Freemium,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub priority: Priority,
    pub duration: String,
    pub level: Level,
    pub resource_url: String,
    pub cost: Cost,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MissingSkill {
    pub skill: String,
    pub demand: Priority,
    /// 1-10
    pub importance: u8,
    pub job_matches: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SalaryRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobMatch {
    pub title: String,
    pub match_percentage: u32,
    pub reason: String,
    pub salary_range: SalaryRange,
    pub companies: Vec<String>,
}

/// Which backend produced an analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Llm,
    Fallback,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisSource::Llm => "llm",
            AnalysisSource::Fallback => "fallback",
        }
    }
}

/// Analysis plus skill-gap enrichment, as returned to the client.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedAnalysis {
    #[serde(flatten)]
    pub analysis: CvAnalysis,
    pub experience_level: String,
    pub missing_skills: Vec<MissingSkill>,
    pub recommendations: Vec<Recommendation>,
    pub job_matches: Vec<JobMatch>,
}

/// Models return numbers as strings ("5"), floats, or null; accept all of them.
fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().trim_end_matches('+').parse().ok(),
        _ => None,
    })
}

fn deserialize_percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient_number(deserializer)?
        .unwrap_or(0.0)
        .clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category_maps_to_other() {
        let skill: Skill =
            serde_json::from_str(r#"{"name": "Figma", "category": "design", "confidence": 80}"#)
                .unwrap();
        assert_eq!(skill.category, SkillCategory::Other);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let skill: Skill =
            serde_json::from_str(r#"{"name": "Rust", "category": "programming", "confidence": 140}"#)
                .unwrap();
        assert_eq!(skill.confidence, 100.0);
        let skill: Skill =
            serde_json::from_str(r#"{"name": "Rust", "confidence": -3}"#).unwrap();
        assert_eq!(skill.confidence, 0.0);
    }

    #[test]
    fn test_lenient_years() {
        let skill: Skill =
            serde_json::from_str(r#"{"name": "Go", "category": "programming", "years": "5+"}"#)
                .unwrap();
        assert_eq!(skill.years, Some(5.0));
        let skill: Skill =
            serde_json::from_str(r#"{"name": "Go", "years": null}"#).unwrap();
        assert_eq!(skill.years, None);
    }

    #[test]
    fn test_experience_uses_camel_case() {
        let exp: Experience = serde_json::from_str(
            r#"{"totalYears": 6, "roles": [{"title": "Engineer", "company": "Acme", "duration": "2019-2025", "years": 6}]}"#,
        )
        .unwrap();
        assert_eq!(exp.total_years, Some(6.0));
        assert_eq!(exp.roles[0].company, "Acme");
    }

    #[test]
    fn test_enriched_analysis_flattens_base_fields() {
        let enriched = EnrichedAnalysis {
            analysis: CvAnalysis {
                skills: vec![],
                experience: Experience::default(),
                education: vec![],
                summary: "s".to_string(),
                confidence: 60.0,
            },
            experience_level: "Junior".to_string(),
            missing_skills: vec![],
            recommendations: vec![],
            job_matches: vec![],
        };
        let v = serde_json::to_value(&enriched).unwrap();
        assert_eq!(v["summary"], "s");
        assert_eq!(v["experienceLevel"], "Junior");
        assert!(v["missingSkills"].is_array());
    }
}
