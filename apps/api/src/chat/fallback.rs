//! Canned replies used when the hosted model is unavailable.

use crate::chat::questions::{InterviewQuestion, InterviewQuestionSet};

pub const REPLY_GENERAL: &str = "I understand you're looking for career advice. While I'm \
currently operating in fallback mode, I'd be happy to help with general interview preparation tips.";
pub const REPLY_QUESTION: &str = "That's an important question for interview preparation. A good \
approach is to focus on specific examples from your experience.";
pub const REPLY_TECHNICAL: &str = "For technical interviews, remember to explain your thought \
process clearly and consider edge cases in your solutions.";
pub const REPLY_BEHAVIORAL: &str = "Behavioral questions are best answered using the STAR method \
(Situation, Task, Action, Result).";

const BEHAVIORAL_KEYWORDS: &[&str] = &[
    "behavioral",
    "behavioural",
    "star",
    "tell me about a time",
    "conflict",
    "teamwork",
    "leadership",
    "weakness",
    "strength",
];

const TECHNICAL_KEYWORDS: &[&str] = &[
    "technical",
    "algorithm",
    "coding",
    "code",
    "system design",
    "data structure",
    "complexity",
    "debug",
];

fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack
        .match_indices(needle)
        .any(|(idx, _)| {
            let before = haystack[..idx].chars().next_back();
            let after = haystack[idx + needle.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
}

/// Picks a canned reply from the message content. Deterministic: the same
/// message always gets the same reply.
pub fn fallback_reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if BEHAVIORAL_KEYWORDS.iter().any(|k| contains_word(&lower, k)) {
        REPLY_BEHAVIORAL
    } else if TECHNICAL_KEYWORDS.iter().any(|k| contains_word(&lower, k)) {
        REPLY_TECHNICAL
    } else if lower.trim_end().ends_with('?') {
        REPLY_QUESTION
    } else {
        REPLY_GENERAL
    }
}

pub fn fallback_questions(role: &str, level: &str, count: u32) -> InterviewQuestionSet {
    let questions = vec![
        InterviewQuestion {
            kind: "technical".into(),
            question: format!("What are the key technical skills required for a {role} role?"),
            tips: vec![
                "Focus on fundamental concepts".into(),
                "Mention relevant technologies".into(),
            ],
            difficulty: "medium".into(),
        },
        InterviewQuestion {
            kind: "behavioral".into(),
            question: "Tell me about a challenging project you worked on.".into(),
            tips: vec![
                "Use the STAR method".into(),
                "Focus on your contributions".into(),
            ],
            difficulty: "medium".into(),
        },
    ];

    InterviewQuestionSet {
        role: role.to_string(),
        level: level.to_string(),
        questions: questions.into_iter().take(count as usize).collect(),
    }
}
