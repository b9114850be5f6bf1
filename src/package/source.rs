use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;

use crate::http::HttpClient;

use super::index::{Package, PackageIndex};

pub const DEFAULT_INDEX_URL: &str = "https://thunderstore.io";

/// A provider of community package indexes.
///
/// The index itself is external; the install pipeline only ever reads the
/// [`PackageIndex`] this returns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IndexSource: Send + Sync {
    /// Fetches every package published for the given community.
    async fn fetch_packages(&self, community: &str) -> Result<Vec<Package>>;
}

/// Index source backed by the community registry's v1 HTTP API.
pub struct RemoteIndexSource {
    http: HttpClient,
    base_url: String,
}

impl RemoteIndexSource {
    pub fn new(http: HttpClient, base_url: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.unwrap_or_else(|| DEFAULT_INDEX_URL.to_string()),
        }
    }

    /// Fetches the full package list and builds an in-memory index from it.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_index(&self, community: &str) -> Result<PackageIndex> {
        let packages = self.fetch_packages(community).await?;
        info!(
            "Fetched {} packages for community '{}'",
            packages.len(),
            community
        );
        Ok(PackageIndex::new(packages))
    }
}

#[async_trait]
impl IndexSource for RemoteIndexSource {
    async fn fetch_packages(&self, community: &str) -> Result<Vec<Package>> {
        let url = format!(
            "{}/c/{}/api/v1/package/",
            self.base_url.trim_end_matches('/'),
            community
        );

        self.http
            .get_json(&url)
            .await
            .with_context(|| format!("Failed to fetch package index for '{}'", community))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_index_builds_lookup() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/c/lethal-company/api/v1/package/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{
                    "name": "ModA",
                    "full_name": "Owner-ModA",
                    "owner": "Owner",
                    "versions": [{
                        "full_name": "Owner-ModA-1.0.0",
                        "version_number": "1.0.0",
                        "download_url": "https://example.invalid/a.zip",
                        "dependencies": []
                    }]
                }]"#,
            )
            .create_async()
            .await;

        let source = RemoteIndexSource::new(HttpClient::build().unwrap(), Some(url));
        let index = source.fetch_index("lethal-company").await.unwrap();

        mock.assert_async().await;
        assert_eq!(index.len(), 1);
        assert!(index.get_version("Owner", "ModA", "1.0.0").is_some());
    }

    #[tokio::test]
    async fn test_fetch_packages_propagates_http_failure() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/c/nope/api/v1/package/")
            .with_status(404)
            .create_async()
            .await;

        let source = RemoteIndexSource::new(HttpClient::build().unwrap(), Some(url));
        let result = source.fetch_packages("nope").await;

        mock.assert_async().await;
        assert!(result.is_err());
    }
}
