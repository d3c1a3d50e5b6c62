// CV analysis LLM prompt templates.

use crate::llm_client::prompts::truncate_chars;

/// Characters of CV text sent to the model.
pub const CV_TEXT_LIMIT: usize = 4000;

pub const CV_ANALYSIS_SYSTEM: &str = "\
You are an experienced technical recruiter and career coach. \
Analyze CVs accurately and conservatively: only list skills and roles that the text supports. \
You MUST respond with valid JSON only. No markdown fences, no explanations.";

pub const CV_ANALYSIS_PROMPT: &str = r#"Analyze the following CV and provide a comprehensive analysis. {role_context}
Return the analysis as JSON with this exact structure:

{
  "skills": [
    {
      "name": "skill name",
      "category": "programming|framework|tool|language|soft|other",
      "confidence": number between 0-100,
      "years": number or null
    }
  ],
  "experience": {
    "totalYears": number,
    "roles": [
      {
        "title": "job title",
        "company": "company name",
        "duration": "time period",
        "years": number
      }
    ]
  },
  "education": [
    {
      "degree": "degree name",
      "institution": "institution name",
      "year": graduation year
    }
  ],
  "summary": "brief professional summary",
  "confidence": overall analysis confidence 0-100
}

CV Text: {cv_text}"#;

pub fn build_cv_analysis_prompt(cv_text: &str, target_role: Option<&str>) -> String {
    let role_context = match target_role.map(str::trim).filter(|r| !r.is_empty()) {
        Some(role) => format!("Target role: {role}."),
        None => String::new(),
    };
    CV_ANALYSIS_PROMPT
        .replace("{role_context}", &role_context)
        .replace("{cv_text}", truncate_chars(cv_text, CV_TEXT_LIMIT))
}
