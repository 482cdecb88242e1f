pub mod orchestrator;

pub use orchestrator::{FetchOutcome, MatchRetriever, MatchSource};
