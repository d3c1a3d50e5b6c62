//! Deterministic keyword-based CV analysis, used when the LLM is unavailable.
//!
//! Matches a fixed skill vocabulary against the extracted text. Matching is
//! case-insensitive and anchored on token boundaries so "Go" does not fire on
//! "good" and "Java" does not fire on "JavaScript".

use lazy_static::lazy_static;
use regex::Regex;

use crate::cv::models::{CvAnalysis, Experience, Skill, SkillCategory};

pub const FALLBACK_SUMMARY: &str = "Basic analysis completed using keyword matching.";
pub const FALLBACK_SKILL_CONFIDENCE: f64 = 70.0;
pub const FALLBACK_OVERALL_CONFIDENCE: f64 = 60.0;

const SKILL_VOCABULARY: &[(SkillCategory, &[&str])] = &[
    (
        SkillCategory::Programming,
        &[
            "JavaScript", "Python", "Java", "C++", "C#", "PHP", "Ruby", "Go", "Swift", "Kotlin",
        ],
    ),
    (
        SkillCategory::Framework,
        &[
            "React", "Vue", "Angular", "Node.js", "Express", "Django", "Spring", "Laravel",
        ],
    ),
    (
        SkillCategory::Tool,
        &[
            "Git", "Docker", "AWS", "Azure", "MongoDB", "MySQL", "PostgreSQL", "Redis",
        ],
    ),
    (
        SkillCategory::Soft,
        &[
            "Communication",
            "Leadership",
            "Teamwork",
            "Problem Solving",
            "Time Management",
        ],
    ),
];

struct SkillPattern {
    name: &'static str,
    category: SkillCategory,
    regex: Regex,
}

lazy_static! {
    static ref SKILL_PATTERNS: Vec<SkillPattern> = SKILL_VOCABULARY
        .iter()
        .flat_map(|(category, names)| {
            names.iter().map(move |name| SkillPattern {
                name,
                category: *category,
                regex: skill_regex(name),
            })
        })
        .collect();
}

fn skill_regex(name: &str) -> Regex {
    // Whitespace inside multi-word skills may be any run of whitespace.
    let body = name
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let pattern = format!(r"(?i)(?:^|[^a-z0-9+#.])(?:{body})(?:$|[^a-z0-9+#])");
    Regex::new(&pattern).expect("skill vocabulary patterns are valid")
}

/// Extracts vocabulary skills found in `text`, in vocabulary order.
pub fn extract_skills(text: &str) -> Vec<Skill> {
    SKILL_PATTERNS
        .iter()
        .filter(|p| p.regex.is_match(text))
        .map(|p| Skill {
            name: p.name.to_string(),
            category: p.category,
            confidence: FALLBACK_SKILL_CONFIDENCE,
            years: None,
        })
        .collect()
}

/// Builds the full fallback analysis for a CV.
pub fn fallback_analysis(cv_text: &str) -> CvAnalysis {
    CvAnalysis {
        skills: extract_skills(cv_text),
        experience: Experience {
            total_years: Some(0.0),
            roles: vec![],
        },
        education: vec![],
        summary: FALLBACK_SUMMARY.to_string(),
        confidence: FALLBACK_OVERALL_CONFIDENCE,
    }
}
