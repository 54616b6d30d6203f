//! Hosted file container source.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use super::{ByteStream, RemoteItem, SourceProvider};
use crate::auth::AuthProvider;
use crate::error::{Error, TransferError};
use crate::types::ContainerLocator;

const CONTINUATION_HEADER: &str = "x-ms-continuationtoken";

/// Container endpoint for a locator: `{base}/_apis/resources/Containers/{id}`
fn container_url(base_url: &str, container_id: u64) -> Result<Url, Error> {
    let mut url = Url::parse(base_url.trim())?;
    let id = container_id.to_string();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| Error::config("service.base_url", "base URL cannot carry a path"))?;
        path.pop_if_empty()
            .extend(["_apis", "resources", "Containers", id.as_str()]);
    }
    url.set_query(None);
    Ok(url)
}

fn with_item_path(container: &Url, item_path: &str) -> Url {
    let mut url = container.clone();
    url.query_pairs_mut()
        .append_pair("itemPath", item_path)
        .append_pair("isShallow", "true");
    url
}

/// Shallow item-listing URL for a container locator
pub fn container_listing_url(base_url: &str, locator: &ContainerLocator) -> Result<Url, Error> {
    let container = container_url(base_url, locator.container_id)?;
    Ok(with_item_path(&container, &locator.item_path))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerItem {
    path: String,
    item_type: String,
    #[serde(default)]
    content_location: Option<String>,
    #[serde(default)]
    file_length: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ContainerPage {
    #[serde(default)]
    value: Vec<ContainerItem>,
}

impl From<ContainerItem> for RemoteItem {
    fn from(item: ContainerItem) -> Self {
        let path = item.path.trim_start_matches('/').to_string();
        if item.item_type.eq_ignore_ascii_case("folder") {
            RemoteItem::folder(path, None)
        } else {
            RemoteItem::file(path, item.content_location, item.file_length)
        }
    }
}

/// Reads an artifact stored in a hosted file container
pub struct ContainerSource {
    client: reqwest::Client,
    container: Url,
    root_path: String,
    auth: Arc<dyn AuthProvider>,
}

impl ContainerSource {
    /// Create a source for `locator` on the service at `base_url`
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        locator: &ContainerLocator,
        auth: Arc<dyn AuthProvider>,
    ) -> Result<Self, Error> {
        Ok(Self {
            client,
            container: container_url(base_url, locator.container_id)?,
            root_path: locator.item_path.clone(),
            auth,
        })
    }

    /// The shallow listing URL of the artifact root
    pub fn listing_url(&self) -> Url {
        with_item_path(&self.container, &self.root_path)
    }

    /// Fetch every page of a listing, following continuation tokens
    async fn fetch_listing(&self, listing: Url) -> Result<Vec<RemoteItem>, TransferError> {
        let mut items = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut url = listing.clone();
            if let Some(token) = &continuation {
                url.query_pairs_mut()
                    .append_pair("continuationToken", token);
            }

            let response = self
                .auth
                .authorize(self.client.get(url.clone()))
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(TransferError::Listing {
                    location: url.to_string(),
                    reason: format!("status {status}"),
                });
            }

            continuation = response
                .headers()
                .get(CONTINUATION_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            let page: ContainerPage = response.json().await.map_err(|e| TransferError::Listing {
                location: url.to_string(),
                reason: e.to_string(),
            })?;
            items.extend(page.value.into_iter().map(RemoteItem::from));

            if continuation.is_none() {
                break;
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl SourceProvider for ContainerSource {
    async fn root_items(&self) -> Result<Vec<RemoteItem>, TransferError> {
        let mut items = self.fetch_listing(self.listing_url()).await?;
        // The root's children are already in this listing
        let root = self.root_path.trim_matches('/');
        items.retain(|item| !(item.kind.is_folder() && item.path == root));
        Ok(items)
    }

    async fn list(&self, folder: &RemoteItem) -> Result<Vec<RemoteItem>, TransferError> {
        self.fetch_listing(with_item_path(&self.container, &folder.path))
            .await
    }

    async fn open(&self, item: &RemoteItem) -> Result<ByteStream, TransferError> {
        let url = match &item.location {
            Some(location) => location.clone(),
            None => {
                let mut url = self.container.clone();
                url.query_pairs_mut().append_pair("itemPath", &item.path);
                url.to_string()
            }
        };

        let response = self.auth.authorize(self.client.get(&url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Http {
                url,
                status: status.as_u16(),
            });
        }

        Ok(response
            .bytes_stream()
            .map_err(TransferError::Network)
            .boxed())
    }

    fn describe(&self) -> String {
        self.listing_url().to_string()
    }
}
