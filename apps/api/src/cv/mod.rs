// CV upload and analysis: text extraction, LLM analysis with keyword
// fallback, skill-gap enrichment.

pub mod analyzer;
pub mod enrichment;
pub mod extract;
pub mod fallback;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod repo;
