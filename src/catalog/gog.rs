// src/catalog/gog.rs

//! GOG catalog client
//!
//! Wraps a blocking reqwest client with retry support. Four public GOG
//! endpoints are involved:
//!
//! - content-system builds: newest build id and version name of a product
//! - api.gog.com v2 games: product title, and pack → contained game mapping
//! - cdn manifests: `repository.json` of legacy builds, whose installer file
//!   name carries the version
//! - embed.gog.com filtered search: free-text product search

use super::{Catalog, CatalogEntry, CatalogError};
use crate::metadata::{lenient_id, version_from_old_filename};
use regex::Regex;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum attempts for a request failing at the transport level
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds, multiplied by the attempt number
const RETRY_DELAY_MS: u64 = 1000;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:137.0) Gecko/20100101 Firefox/137.0";

static GAME_ID_FROM_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/v2/games/([0-9]+)").expect("valid regex"));

/// Base URLs of the catalog services
#[derive(Debug, Clone)]
pub struct GogEndpoints {
    pub content_system: String,
    pub api: String,
    pub cdn: String,
    pub embed: String,
}

impl Default for GogEndpoints {
    fn default() -> Self {
        Self {
            content_system: "https://content-system.gog.com".to_string(),
            api: "https://api.gog.com".to_string(),
            cdn: "https://cdn.gog.com".to_string(),
            embed: "https://embed.gog.com".to_string(),
        }
    }
}

impl GogEndpoints {
    fn builds(&self, product_id: &str) -> String {
        format!(
            "{}/products/{}/os/windows/builds?generation=2",
            self.content_system, product_id
        )
    }

    fn product(&self, product_id: &str) -> String {
        format!("{}/v2/games/{}?locale=en-US", self.api, product_id)
    }

    fn legacy_repository(&self, product_id: &str, legacy_build_id: &str) -> String {
        format!(
            "{}/content-system/v1/manifests/{}/windows/{}/repository.json",
            self.cdn, product_id, legacy_build_id
        )
    }

    fn search(&self, title: &str) -> String {
        format!(
            "{}/games/ajax/filtered?mediaType=game&search={}",
            self.embed,
            urlencoding::encode(title)
        )
    }
}

#[derive(Debug, Default, Deserialize)]
struct BuildList {
    #[serde(default)]
    items: Vec<BuildItem>,
}

#[derive(Debug, Deserialize)]
struct BuildItem {
    #[serde(default, deserialize_with = "lenient_id")]
    build_id: Option<String>,
    #[serde(default)]
    version_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    legacy_build_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResults {
    #[serde(default)]
    products: Vec<SearchProduct>,
}

#[derive(Debug, Deserialize)]
struct SearchProduct {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default)]
    title: String,
}

/// Newest build as reported by the builds endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
struct LatestBuild {
    build_id: Option<String>,
    version_name: Option<String>,
    legacy_build_id: Option<String>,
}

/// HTTP-backed [`Catalog`]
pub struct GogCatalog {
    client: Client,
    endpoints: GogEndpoints,
    max_retries: u32,
    candidate_limit: usize,
}

impl GogCatalog {
    /// Create a client against the public GOG endpoints
    pub fn new() -> Result<Self, CatalogError> {
        Self::with_endpoints(GogEndpoints::default())
    }

    pub fn with_endpoints(endpoints: GogEndpoints) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoints,
            max_retries: MAX_RETRIES,
            candidate_limit: 1,
        })
    }

    /// Number of search candidates hydrated with build data
    ///
    /// Only the first candidate is ever used for resolution; raising this is
    /// useful for diagnostics only and costs one extra lookup per candidate.
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit;
        self
    }

    /// GET a JSON document; `Ok(None)` on 404
    fn get_json(&self, url: &str) -> Result<Option<Value>, CatalogError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).send() {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::NOT_FOUND {
                        debug!("404 from {}", url);
                        return Ok(None);
                    }
                    if !status.is_success() {
                        return Err(CatalogError::Status {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }

                    let bytes = response.bytes().map_err(|e| CatalogError::Http {
                        url: url.to_string(),
                        reason: format!("failed to read response: {e}"),
                    })?;
                    let body = String::from_utf8_lossy(&bytes);
                    let value = serde_json::from_str(&body).map_err(|e| CatalogError::Parse {
                        url: url.to_string(),
                        reason: e.to_string(),
                    })?;
                    return Ok(Some(value));
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(CatalogError::Http {
                            url: url.to_string(),
                            reason: format!("failed after {attempt} attempts: {e}"),
                        });
                    }
                    warn!("Request attempt {} to {} failed: {}, retrying...", attempt, url, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }

    fn fetch_builds(&self, product_id: &str) -> Result<Option<Vec<LatestBuild>>, CatalogError> {
        let url = self.endpoints.builds(product_id);
        info!("Retrieving latest build and version for {}", product_id);
        self.get_json(&url)?
            .map(|value| parse_builds(value).map_err(|reason| CatalogError::Parse { url, reason }))
            .transpose()
    }

    fn fetch_product(&self, product_id: &str) -> Result<Option<Value>, CatalogError> {
        self.get_json(&self.endpoints.product(product_id))
    }

    fn fetch_legacy_version(
        &self,
        product_id: &str,
        legacy_build_id: &str,
    ) -> Result<Option<String>, CatalogError> {
        info!("Retrieving latest legacy installer version for {}", product_id);
        let url = self.endpoints.legacy_repository(product_id, legacy_build_id);
        Ok(self
            .get_json(&url)?
            .as_ref()
            .and_then(legacy_version_from_repository))
    }
}

impl Catalog for GogCatalog {
    fn lookup_by_id(&self, catalog_id: &str) -> Result<Option<CatalogEntry>, CatalogError> {
        let Some(mut builds) = self.fetch_builds(catalog_id)? else {
            return Ok(None);
        };

        let product = self.fetch_product(catalog_id).unwrap_or_else(|e| {
            warn!("Could not fetch product data for {}: {}", catalog_id, e);
            None
        });

        let mut build_owner = catalog_id.to_string();
        if builds.is_empty() {
            debug!("No builds for {}, checking whether it is a pack", catalog_id);
            if let Some(game_id) = product.as_ref().and_then(pack_first_game) {
                if game_id != catalog_id {
                    info!("{} is a pack, using contained game {}", catalog_id, game_id);
                    builds = self.fetch_builds(&game_id)?.unwrap_or_default();
                    build_owner = game_id;
                }
            }
        }

        let Some(latest) = builds.into_iter().next() else {
            warn!("Build information for {} wasn't found", catalog_id);
            return Ok(None);
        };

        let title = product
            .as_ref()
            .and_then(product_title)
            .unwrap_or_else(|| catalog_id.to_string());
        let mut entry = CatalogEntry::new(catalog_id, title);

        match latest.legacy_build_id {
            Some(legacy_build_id) => {
                info!("Only legacy installers are available for {}", catalog_id);
                entry.remote_version = self.fetch_legacy_version(&build_owner, &legacy_build_id)?;
                entry.build_id = Some(legacy_build_id);
                entry.legacy = true;
            }
            None => {
                entry.remote_version = latest.version_name;
                entry.build_id = latest.build_id;
            }
        }

        Ok(Some(entry))
    }

    fn lookup_by_title(&self, title: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        info!("Performing public search for \"{}\"", title);
        let url = self.endpoints.search(title);
        let Some(value) = self.get_json(&url)? else {
            return Ok(Vec::new());
        };
        let candidates =
            parse_search(value).map_err(|reason| CatalogError::Parse { url, reason })?;
        debug!("{} candidates for \"{}\"", candidates.len(), title);

        let mut entries = Vec::with_capacity(candidates.len());
        for (idx, (id, found_title)) in candidates.into_iter().enumerate() {
            if idx < self.candidate_limit {
                if let Some(mut entry) = self.lookup_by_id(&id)? {
                    entry.title = found_title;
                    entries.push(entry);
                    continue;
                }
            }
            entries.push(CatalogEntry::new(id, found_title));
        }

        Ok(entries)
    }

    fn version_for_build(
        &self,
        catalog_id: &str,
        build_id: &str,
    ) -> Result<Option<String>, CatalogError> {
        let builds = self.fetch_builds(catalog_id)?.unwrap_or_default();
        Ok(version_of_build(builds, build_id))
    }
}

fn version_of_build(builds: Vec<LatestBuild>, build_id: &str) -> Option<String> {
    builds
        .into_iter()
        .find(|b| b.build_id.as_deref() == Some(build_id))
        .and_then(|b| b.version_name)
}

fn parse_builds(value: Value) -> Result<Vec<LatestBuild>, String> {
    let list: BuildList = serde_json::from_value(value).map_err(|e| e.to_string())?;
    Ok(list
        .items
        .into_iter()
        .map(|item| LatestBuild {
            build_id: item.build_id,
            version_name: item.version_name.filter(|v| !v.trim().is_empty()),
            legacy_build_id: item.legacy_build_id,
        })
        .collect())
}

fn parse_search(value: Value) -> Result<Vec<(String, String)>, String> {
    let results: SearchResults = serde_json::from_value(value).map_err(|e| e.to_string())?;
    Ok(results
        .products
        .into_iter()
        .filter_map(|p| p.id.map(|id| (id, p.title)))
        .collect())
}

fn product_title(product: &Value) -> Option<String> {
    product
        .pointer("/_embedded/product/title")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// For a product of type PACK, the id of the first game it includes
fn pack_first_game(product: &Value) -> Option<String> {
    let product_type = product.pointer("/_embedded/productType")?.as_str()?;
    if product_type != "PACK" {
        return None;
    }
    let href = product
        .pointer("/_links/includesGames/0/href")?
        .as_str()?
        .trim();
    GAME_ID_FROM_URL
        .captures(href)
        .map(|caps| caps[1].to_string())
}

fn legacy_version_from_repository(repository: &Value) -> Option<String> {
    let executable = repository
        .pointer("/product/support_commands/0/executable")?
        .as_str()?;
    let name = executable.rsplit(['/', '\\']).next().unwrap_or(executable);
    version_from_old_filename(name)
}
