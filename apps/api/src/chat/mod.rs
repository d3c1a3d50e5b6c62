// Interview-practice chat: session state, prompting, fallbacks, persistence.

pub mod fallback;
pub mod handlers;
pub mod prompts;
pub mod questions;
pub mod repo;
pub mod session;
