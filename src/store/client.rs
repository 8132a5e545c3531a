//! MongoDB-backed implementation of [`ListingStore`].

use crate::config::Config;
use crate::listing::{Listing, ListingDocument, ListingId};
use crate::store::{
    ListingStore,
    document::{from_stored, id_filter, parse_object_id, to_stored},
    types::{ReplaceSummary, StoreError},
};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc},
    options::ClientOptions,
};
use std::future::IntoFuture;
use std::time::Duration;

/// Connection settings for [`StoreGateway`].
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Connection string, e.g. `mongodb://localhost:27017` or a `mongodb+srv://` URI.
    pub uri: String,
    /// Database holding the collection.
    pub database: String,
    /// Collection holding listing documents.
    pub collection: String,
    /// Bound on establishing connections and selecting a server.
    pub connect_timeout: Duration,
    /// Bound on every individual store operation.
    pub request_timeout: Duration,
}

impl From<&Config> for StoreSettings {
    fn from(config: &Config) -> Self {
        Self {
            uri: config.store_url.clone(),
            database: config.store_database.clone(),
            collection: config.store_collection.clone(),
            connect_timeout: config.store_connect_timeout,
            request_timeout: config.store_request_timeout,
        }
    }
}

/// Gateway owning the driver handle used for every store call.
///
/// Build it once at startup with [`StoreGateway::connect`] and share it behind an `Arc`; the
/// driver pools connections and is safe to use from concurrent requests.
pub struct StoreGateway {
    database: Database,
    collection: Collection<Document>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl StoreGateway {
    /// Construct a gateway without contacting the store.
    ///
    /// `mongodb+srv://` URIs resolve DNS records here; plain URIs do no I/O.
    pub async fn new(settings: &StoreSettings) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&settings.uri).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.connect_timeout = Some(settings.connect_timeout);
        options.server_selection_timeout = Some(settings.connect_timeout);

        let client = Client::with_options(options)?;
        let database = client.database(&settings.database);
        let collection = database.collection::<Document>(&settings.collection);
        tracing::debug!(
            database = %settings.database,
            collection = %settings.collection,
            "Initialized document store client"
        );

        Ok(Self {
            database,
            collection,
            connect_timeout: settings.connect_timeout,
            request_timeout: settings.request_timeout,
        })
    }

    /// Construct a gateway and verify the store answers within the connect timeout.
    pub async fn connect(settings: &StoreSettings) -> Result<Self, StoreError> {
        let gateway = Self::new(settings).await?;
        tokio::time::timeout(gateway.connect_timeout, gateway.ping())
            .await
            .map_err(|_| StoreError::Timeout(gateway.connect_timeout))??;
        tracing::info!(database = %gateway.database.name(), "Connected to document store");
        Ok(gateway)
    }

    /// Run the server's `ping` command.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.bounded("ping", self.database.run_command(doc! { "ping": 1 }))
            .await?;
        Ok(())
    }

    async fn bounded<T, F>(&self, operation: &'static str, future: F) -> Result<T, StoreError>
    where
        F: IntoFuture<Output = mongodb::error::Result<T>>,
    {
        match tokio::time::timeout(self.request_timeout, future).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                tracing::error!(operation, error = %err, "Store request failed");
                Err(err.into())
            }
            Err(_) => {
                tracing::error!(operation, timeout = ?self.request_timeout, "Store request timed out");
                Err(StoreError::Timeout(self.request_timeout))
            }
        }
    }
}

#[async_trait]
impl ListingStore for StoreGateway {
    async fn insert(&self, document: ListingDocument) -> Result<ListingId, StoreError> {
        let stored = to_stored(&document)?;
        let result = self
            .bounded("insert_one", self.collection.insert_one(stored))
            .await?;
        let id = parse_object_id(result.inserted_id)?;
        tracing::debug!(%id, "Listing inserted");
        Ok(id)
    }

    async fn find_by_id(&self, id: &ListingId) -> Result<Listing, StoreError> {
        self.bounded("find_one", self.collection.find_one(id_filter(id)))
            .await?
            .ok_or(StoreError::NotFound)
            .and_then(from_stored)
    }

    async fn replace_by_id(
        &self,
        id: &ListingId,
        document: ListingDocument,
    ) -> Result<ReplaceSummary, StoreError> {
        let replacement = to_stored(&document)?;
        let result = self
            .bounded(
                "replace_one",
                self.collection.replace_one(id_filter(id), replacement),
            )
            .await?;
        tracing::debug!(
            %id,
            matched = result.matched_count,
            modified = result.modified_count,
            "Listing replaced"
        );
        Ok(ReplaceSummary {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_by_id(&self, id: &ListingId) -> Result<u64, StoreError> {
        let result = self
            .bounded("delete_one", self.collection.delete_one(id_filter(id)))
            .await?;
        tracing::debug!(%id, deleted = result.deleted_count, "Listing delete applied");
        Ok(result.deleted_count)
    }

    async fn find_all(&self) -> Result<Vec<Listing>, StoreError> {
        let documents = self
            .bounded("find", async {
                let cursor = self.collection.find(doc! {}).await?;
                cursor.try_collect::<Vec<Document>>().await
            })
            .await?;
        documents.into_iter().map(from_stored).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        StoreGateway::ping(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(uri: &str) -> StoreSettings {
        StoreSettings {
            uri: uri.into(),
            database: "acquire".into(),
            collection: "acquire".into(),
            connect_timeout: Duration::from_millis(300),
            request_timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn new_does_not_contact_the_store() {
        let gateway = StoreGateway::new(&settings("mongodb://127.0.0.1:1"))
            .await
            .expect("gateway");
        assert_eq!(gateway.collection.name(), "acquire");
        assert_eq!(gateway.database.name(), "acquire");
    }

    #[tokio::test]
    async fn new_rejects_malformed_connection_strings() {
        let result = StoreGateway::new(&settings("postgres://127.0.0.1")).await;
        assert!(matches!(result, Err(StoreError::Driver(_))));
    }

    #[tokio::test]
    async fn connect_fails_when_store_is_unreachable() {
        let result = StoreGateway::connect(&settings("mongodb://127.0.0.1:1")).await;
        let err = result.err().expect("unreachable store");
        assert!(err.is_transport());
        assert!(matches!(err, StoreError::Driver(_) | StoreError::Timeout(_)));
    }

    #[tokio::test]
    async fn operations_surface_transport_failures() {
        let gateway = StoreGateway::new(&settings("mongodb://127.0.0.1:1"))
            .await
            .expect("gateway");
        let id = ListingId::from_bytes([7; 12]);

        let err = gateway.find_by_id(&id).await.expect_err("offline");
        assert!(err.is_transport());
        let err = gateway.delete_by_id(&id).await.expect_err("offline");
        assert!(err.is_transport());
        let err = gateway.find_all().await.expect_err("offline");
        assert!(err.is_transport());
    }
}
