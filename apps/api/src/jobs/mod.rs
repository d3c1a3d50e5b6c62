// Job board: filtered listing, recommendations from CV skills, stats.

pub mod filters;
pub mod format;
pub mod handlers;
pub mod repo;
pub mod stats;
