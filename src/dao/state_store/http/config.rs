/// Runtime configuration describing how to reach the remote document store.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    pub base_url: String,
    pub database: String,
    pub access_key: String,
}

impl HttpStoreConfig {
    /// Construct a configuration from explicit endpoint, database and key.
    pub fn new(
        base_url: impl Into<String>,
        database: impl Into<String>,
        access_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            database: database.into(),
            access_key: access_key.into(),
        }
    }
}
