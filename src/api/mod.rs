pub mod match_client;
pub mod models;

pub use match_client::MatchServiceClient;
