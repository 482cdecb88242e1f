pub mod settings;

pub use settings::{load_api_key, ApiSettings, AppConfig, DatabaseSettings, RetrievalSettings};
