pub mod candidates;
pub mod history;
pub mod matcher;
pub mod reasons;
pub mod scoring;
pub mod signals;

pub use matcher::{find_matches, MatchOutcome};
