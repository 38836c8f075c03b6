pub mod history;
pub mod hub;
pub mod matching;
pub mod preference;
pub mod ride;
pub mod user;
