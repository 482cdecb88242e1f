pub mod match_cache;

pub use match_cache::MatchCache;
