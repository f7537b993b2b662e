use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};

use crate::dao::{state_store::StateStore, storage::StorageResult};
use crate::state::game::{GameState, GameStatePatch};

use super::{
    config::HttpStoreConfig,
    error::{HttpDaoError, HttpResult},
    models::{STATE_DOC_ID, StateDocument},
};

/// State store backed by a remote JSON document service.
///
/// The singleton record lives in a single document; updates are
/// read-modify-write at the document level, so the store is last-write-wins
/// for whole fields.
#[derive(Debug, Clone)]
pub struct HttpStateStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    access_key: Arc<str>,
}

impl HttpStateStore {
    /// Establish a connection to the store and ensure the database exists.
    pub async fn connect(config: HttpStoreConfig) -> HttpResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| HttpDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            database: Arc::<str>::from(config.database),
            access_key: Arc::<str>::from(config.access_key),
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, self.database, path);
        self.client
            .request(method, url)
            .bearer_auth(self.access_key.as_ref())
    }

    async fn ensure_database(&self) -> HttpResult<()> {
        let database = self.database.to_string();
        let url = format!("{}/{}", self.base_url, self.database);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.access_key.as_ref())
            .send()
            .await
            .map_err(|source| HttpDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .client
                    .put(&url)
                    .bearer_auth(self.access_key.as_ref())
                    .send()
                    .await
                    .map_err(|source| HttpDaoError::DatabaseQuery {
                        database: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(HttpDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(HttpDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document(&self) -> HttpResult<Option<StateDocument>> {
        let response = self
            .request(Method::GET, STATE_DOC_ID)
            .send()
            .await
            .map_err(|source| HttpDaoError::RequestSend {
                path: STATE_DOC_ID.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<StateDocument>()
                .await
                .map(Some)
                .map_err(|source| HttpDaoError::DecodeResponse {
                    path: STATE_DOC_ID.to_string(),
                    source,
                }),
            other => Err(HttpDaoError::RequestStatus {
                path: STATE_DOC_ID.to_string(),
                status: other,
            }),
        }
    }

    async fn put_document(&self, document: &StateDocument) -> HttpResult<()> {
        let response = self
            .request(Method::PUT, STATE_DOC_ID)
            .json(document)
            .send()
            .await
            .map_err(|source| HttpDaoError::RequestSend {
                path: STATE_DOC_ID.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.is_client_error() {
            Err(HttpDaoError::WriteRejected {
                path: STATE_DOC_ID.to_string(),
                status,
            })
        } else {
            Err(HttpDaoError::RequestStatus {
                path: STATE_DOC_ID.to_string(),
                status,
            })
        }
    }

    /// Fetch the singleton, creating it with idle contents when the
    /// deployment has never been written to.
    async fn fetch_or_seed(&self) -> HttpResult<StateDocument> {
        match self.get_document().await? {
            Some(doc) => Ok(doc),
            None => {
                let doc = StateDocument::new(GameState::idle(), None);
                self.put_document(&doc).await?;
                // Re-read to pick up the revision the store assigned.
                Ok(self.get_document().await?.unwrap_or(doc))
            }
        }
    }
}

impl StateStore for HttpStateStore {
    fn fetch_state(&self) -> BoxFuture<'static, StorageResult<GameState>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.fetch_or_seed().await?.state) })
    }

    fn update_state(&self, patch: GameStatePatch) -> BoxFuture<'static, StorageResult<GameState>> {
        let store = self.clone();
        Box::pin(async move {
            let mut doc = store.fetch_or_seed().await?;
            doc.state.apply(patch);
            store.put_document(&doc).await?;
            Ok(doc.state)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = format!("{}/{}", store.base_url, store.database);
            let response = store
                .client
                .get(&url)
                .bearer_auth(store.access_key.as_ref())
                .send()
                .await
                .map_err(|source| HttpDaoError::RequestSend {
                    path: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(HttpDaoError::RequestStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
