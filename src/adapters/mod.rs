// Adapters layer: concrete implementations of the domain ports.

pub mod http;
pub mod token;

pub use http::HttpBackend;
pub use token::{token_provider, EnvToken, FileTokenStore, StaticToken};
