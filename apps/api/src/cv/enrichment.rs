//! Skill-gap enrichment. Derives missing skills, learning recommendations and
//! role matches from a finished analysis. Pure and deterministic.

use std::collections::HashSet;

use crate::cv::models::{
    Cost, CvAnalysis, EnrichedAnalysis, JobMatch, Level, MissingSkill, Priority, Recommendation,
    RecommendationType, SalaryRange,
};

/// Skills the job market currently rewards; absent ones become skill gaps.
pub const IN_DEMAND_SKILLS: &[&str] = &[
    "JavaScript",
    "React",
    "Node.js",
    "Python",
    "AWS",
    "Docker",
    "TypeScript",
    "GraphQL",
];

const MAX_RECOMMENDATIONS: usize = 3;
const MAX_JOB_MATCHES: usize = 3;
const MISSING_SKILL_IMPORTANCE: u8 = 8;

struct RoleProfile {
    title: &'static str,
    skills: &'static [&'static str],
    salary: SalaryRange,
    companies: &'static [&'static str],
}

const ROLE_PROFILES: &[RoleProfile] = &[
    RoleProfile {
        title: "Full Stack Developer",
        skills: &["JavaScript", "TypeScript", "React", "Node.js", "PostgreSQL", "Docker"],
        salary: SalaryRange {
            min: 80_000,
            max: 120_000,
        },
        companies: &["TechCorp", "WebSolutions", "StartUpInc"],
    },
    RoleProfile {
        title: "Frontend Developer",
        skills: &["JavaScript", "TypeScript", "React", "Vue", "Angular"],
        salary: SalaryRange {
            min: 70_000,
            max: 110_000,
        },
        companies: &["WebDev Inc", "Digital Solutions", "Creative Tech"],
    },
    RoleProfile {
        title: "Backend Developer",
        skills: &["Node.js", "Python", "Java", "Go", "PostgreSQL", "Redis", "GraphQL"],
        salary: SalaryRange {
            min: 85_000,
            max: 130_000,
        },
        companies: &["DataFlow", "CloudScale", "API Works"],
    },
    RoleProfile {
        title: "DevOps Engineer",
        skills: &["Docker", "AWS", "Azure", "Git", "Python", "Go"],
        salary: SalaryRange {
            min: 90_000,
            max: 140_000,
        },
        companies: &["InfraOps", "CloudScale", "ShipFast"],
    },
    RoleProfile {
        title: "Software Engineer",
        skills: &["Java", "Python", "C++", "C#", "Git", "Problem Solving"],
        salary: SalaryRange {
            min: 75_000,
            max: 125_000,
        },
        companies: &["TechCorp", "Enterprise Systems", "CodeWorks"],
    },
];

/// Percentage of `job_skills` covered by `user_skills`, case-insensitive, rounded.
pub fn calculate_skill_match<U, J>(user_skills: &[U], job_skills: &[J]) -> u32
where
    U: AsRef<str>,
    J: AsRef<str>,
{
    if user_skills.is_empty() || job_skills.is_empty() {
        return 0;
    }
    let user: HashSet<String> = user_skills.iter().map(|s| s.as_ref().to_lowercase()).collect();
    let job: HashSet<String> = job_skills.iter().map(|s| s.as_ref().to_lowercase()).collect();
    let overlap = job.iter().filter(|s| user.contains(*s)).count();
    ((overlap as f64 / job.len() as f64) * 100.0).round() as u32
}

/// Maps total years of experience to a seniority label.
pub fn experience_level(total_years: f64) -> &'static str {
    if total_years < 2.0 {
        "Junior"
    } else if total_years < 5.0 {
        "Mid-level"
    } else if total_years < 10.0 {
        "Senior"
    } else {
        "Expert"
    }
}

pub fn find_missing_skills(analysis: &CvAnalysis) -> Vec<MissingSkill> {
    let existing: HashSet<String> = analysis
        .skills
        .iter()
        .map(|s| s.name.to_lowercase())
        .collect();

    IN_DEMAND_SKILLS
        .iter()
        .filter(|skill| !existing.contains(&skill.to_lowercase()))
        .map(|skill| MissingSkill {
            skill: skill.to_string(),
            demand: Priority::High,
            importance: MISSING_SKILL_IMPORTANCE,
            job_matches: roles_requiring(skill),
        })
        .collect()
}

fn roles_requiring(skill: &str) -> Vec<String> {
    ROLE_PROFILES
        .iter()
        .filter(|r| r.skills.iter().any(|s| s.eq_ignore_ascii_case(skill)))
        .map(|r| r.title.to_string())
        .collect()
}

pub fn build_recommendations(missing: &[MissingSkill]) -> Vec<Recommendation> {
    missing
        .iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|m| Recommendation {
            title: format!("Learn {}", m.skill),
            description: format!(
                "Develop your {} skills to increase job opportunities",
                m.skill
            ),
            kind: RecommendationType::Course,
            priority: Priority::Medium,
            duration: "4-6 weeks".to_string(),
            level: Level::Beginner,
            resource_url: format!("https://example.com/learn-{}", slugify(&m.skill)),
            cost: Cost::Free,
        })
        .collect()
}

fn slugify(skill: &str) -> String {
    skill
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn match_roles(analysis: &CvAnalysis) -> Vec<JobMatch> {
    let user_skills: Vec<&str> = analysis.skills.iter().map(|s| s.name.as_str()).collect();

    let mut matches: Vec<JobMatch> = ROLE_PROFILES
        .iter()
        .filter_map(|role| {
            let pct = calculate_skill_match(user_skills.as_slice(), role.skills);
            (pct > 0).then(|| JobMatch {
                title: role.title.to_string(),
                match_percentage: pct,
                reason: match_reason(pct).to_string(),
                salary_range: role.salary,
                companies: role.companies.iter().map(|c| c.to_string()).collect(),
            })
        })
        .collect();

    // Stable sort keeps profile order among ties.
    matches.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
    matches.truncate(MAX_JOB_MATCHES);
    matches
}

fn match_reason(pct: u32) -> &'static str {
    if pct >= 75 {
        "Strong alignment with your technical skills"
    } else if pct >= 40 {
        "Matches several of your technical skills"
    } else {
        "Some overlap with your skills; closing the gaps would strengthen your fit"
    }
}

/// Attaches skill gaps, recommendations and role matches to an analysis.
pub fn enrich(analysis: CvAnalysis) -> EnrichedAnalysis {
    let missing_skills = find_missing_skills(&analysis);
    let recommendations = build_recommendations(&missing_skills);
    let job_matches = match_roles(&analysis);
    let level = experience_level(analysis.experience.total_years.unwrap_or(0.0));

    EnrichedAnalysis {
        analysis,
        experience_level: level.to_string(),
        missing_skills,
        recommendations,
        job_matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::models::{Experience, Skill, SkillCategory};

    fn analysis_with(skills: &[&str], years: f64) -> CvAnalysis {
        CvAnalysis {
            skills: skills
                .iter()
                .map(|name| Skill {
                    name: name.to_string(),
                    category: SkillCategory::Programming,
                    confidence: 80.0,
                    years: None,
                })
                .collect(),
            experience: Experience {
                total_years: Some(years),
                roles: vec![],
            },
            education: vec![],
            summary: String::new(),
            confidence: 80.0,
        }
    }

    #[test]
    fn test_skill_match_percentage() {
        assert_eq!(calculate_skill_match(&["react", "Go"], &["React", "Vue"]), 50);
        assert_eq!(calculate_skill_match::<&str, &str>(&[], &["React"]), 0);
        assert_eq!(calculate_skill_match(&["React"], &["React", "React"]), 100);
    }

    #[test]
    fn test_experience_level_boundaries() {
        assert_eq!(experience_level(0.0), "Junior");
        assert_eq!(experience_level(1.9), "Junior");
        assert_eq!(experience_level(2.0), "Mid-level");
        assert_eq!(experience_level(5.0), "Senior");
        assert_eq!(experience_level(10.0), "Expert");
    }

    #[test]
    fn test_missing_skills_are_case_insensitive() {
        let missing = find_missing_skills(&analysis_with(&["javascript", "REACT"], 1.0));
        let names: Vec<_> = missing.iter().map(|m| m.skill.as_str()).collect();
        assert!(!names.contains(&"JavaScript"));
        assert!(!names.contains(&"React"));
        assert_eq!(names.len(), IN_DEMAND_SKILLS.len() - 2);
        assert!(missing.iter().all(|m| m.importance == 8 && m.demand == Priority::High));
    }

    #[test]
    fn test_missing_skill_lists_roles_that_need_it() {
        let missing = find_missing_skills(&analysis_with(&[], 0.0));
        let docker = missing.iter().find(|m| m.skill == "Docker").unwrap();
        assert!(docker.job_matches.contains(&"DevOps Engineer".to_string()));
        assert!(docker.job_matches.contains(&"Full Stack Developer".to_string()));
    }

    #[test]
    fn test_recommendations_capped_at_three() {
        let missing = find_missing_skills(&analysis_with(&[], 0.0));
        let recs = build_recommendations(&missing);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].title, "Learn JavaScript");
        assert_eq!(recs[0].resource_url, "https://example.com/learn-javascript");
        assert_eq!(recs[0].kind, RecommendationType::Course);
    }

    #[test]
    fn test_slugify_symbols() {
        assert_eq!(slugify("Node.js"), "node-js");
        assert_eq!(slugify("C++"), "c");
    }

    #[test]
    fn test_role_matches_sorted_and_nonzero() {
        let matches = match_roles(&analysis_with(&["JavaScript", "TypeScript", "React"], 3.0));
        assert!(!matches.is_empty());
        assert!(matches.len() <= 3);
        assert_eq!(matches[0].title, "Frontend Developer");
        assert_eq!(matches[0].match_percentage, 60);
        assert!(matches
            .windows(2)
            .all(|w| w[0].match_percentage >= w[1].match_percentage));
        assert!(matches.iter().all(|m| m.match_percentage > 0));
    }

    #[test]
    fn test_no_skills_means_no_role_matches() {
        assert!(match_roles(&analysis_with(&[], 0.0)).is_empty());
    }

    #[test]
    fn test_enrich_keeps_analysis_and_sets_level() {
        let enriched = enrich(analysis_with(&["Python"], 6.0));
        assert_eq!(enriched.analysis.skills.len(), 1);
        assert_eq!(enriched.experience_level, "Senior");
        assert!(enriched.missing_skills.iter().all(|m| m.skill != "Python"));
    }
}
