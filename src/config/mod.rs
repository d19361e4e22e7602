pub mod settings;
pub mod sources;

pub use settings::AppConfig;
pub use sources::get_wpa_feeds;
