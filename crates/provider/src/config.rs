//! Environment-based configuration for the collaborator clients.

/// Endpoints and credentials for the generation provider and media
/// storage service, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the generation provider API.
    pub generation_url: String,
    /// API key sent as a bearer token to the generation provider.
    pub generation_api_key: String,
    /// Base URL of the media storage service.
    pub storage_url: String,
}

impl ProviderConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                  |
    /// |----------------------|--------------------------|
    /// | `GENERATION_API_URL` | `http://localhost:8700`  |
    /// | `GENERATION_API_KEY` | (empty)                  |
    /// | `STORAGE_API_URL`    | `http://localhost:8701`  |
    pub fn from_env() -> Self {
        let generation_url = std::env::var("GENERATION_API_URL")
            .unwrap_or_else(|_| "http://localhost:8700".into());
        let generation_api_key = std::env::var("GENERATION_API_KEY").unwrap_or_default();
        let storage_url =
            std::env::var("STORAGE_API_URL").unwrap_or_else(|_| "http://localhost:8701".into());

        Self {
            generation_url,
            generation_api_key,
            storage_url,
        }
    }
}
