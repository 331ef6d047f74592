use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::domain::{CandidateMatch, Category};
use crate::error::EpgError;

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// TMDB search endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Tv,
    Movie,
    Collection,
}

impl SearchKind {
    pub fn path(self) -> &'static str {
        match self {
            SearchKind::Tv => "tv",
            SearchKind::Movie => "movie",
            SearchKind::Collection => "collection",
        }
    }
}

pub trait MetadataProvider {
    fn search(&self, name: &str, kind: SearchKind) -> Result<Vec<CandidateMatch>, EpgError>;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for &P {
    fn search(&self, name: &str, kind: SearchKind) -> Result<Vec<CandidateMatch>, EpgError> {
        (**self).search(name, kind)
    }
}

#[derive(Clone)]
pub struct TmdbHttpClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbHttpClient {
    pub fn new(settings: &Settings) -> Result<Self, EpgError> {
        Self::with_endpoint(
            &settings.tmdb_base_url,
            &settings.tmdb_api_key,
            settings.request_timeout,
        )
    }

    pub fn with_endpoint(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, EpgError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("loop-epg/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| EpgError::TmdbHttp(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| EpgError::TmdbHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn search_url(&self, kind: SearchKind) -> String {
        format!("{}/search/{}", self.base_url, kind.path())
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, EpgError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "TMDB request failed".to_string());
        Err(EpgError::TmdbStatus { status, message })
    }
}

impl MetadataProvider for TmdbHttpClient {
    fn search(&self, name: &str, kind: SearchKind) -> Result<Vec<CandidateMatch>, EpgError> {
        let url = self.search_url(kind);
        debug!(%url, name, "searching TMDB");
        // The API key travels in the query string, so strip URLs from errors.
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", name)])
            .send()
            .map_err(|err| EpgError::TmdbHttp(err.without_url().to_string()))?;
        let response = Self::handle_status(response)?;
        let body = response
            .text()
            .map_err(|err| EpgError::TmdbHttp(err.without_url().to_string()))?;
        parse_search_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    first_air_date: Option<String>,
}

impl From<SearchResult> for CandidateMatch {
    fn from(result: SearchResult) -> Self {
        let title = result
            .title
            .or(result.name)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        let year = result
            .release_date
            .or(result.first_air_date)
            .and_then(|date| date.get(..4).map(str::to_string));
        let artwork = result
            .poster_path
            .filter(|path| !path.trim().is_empty())
            .map(|path| format!("{IMAGE_BASE_URL}{path}"));
        CandidateMatch {
            title,
            description: result.overview.filter(|value| !value.trim().is_empty()),
            artwork,
            year,
        }
    }
}

/// Decode a TMDB `/search/*` body into candidates.
pub fn parse_search_response(body: &str) -> Result<Vec<CandidateMatch>, EpgError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|err| EpgError::TmdbDecode(err.to_string()))?;
    Ok(response
        .results
        .into_iter()
        .map(CandidateMatch::from)
        .collect())
}

/// Candidates for a listed title, or `None` when nothing usable came back.
///
/// Movies try a collection search first and fall back to a plain movie search.
/// Provider failures are logged here and never reach the caller.
pub fn find_candidates<P: MetadataProvider + ?Sized>(
    provider: &P,
    name: &str,
    category: Category,
) -> Option<Vec<CandidateMatch>> {
    if category == Category::Movie
        && let Some(collections) = search_logged(provider, name, SearchKind::Collection)
    {
        return Some(collections);
    }
    let kind = match category {
        Category::Series => SearchKind::Tv,
        Category::Movie => SearchKind::Movie,
    };
    search_logged(provider, name, kind)
}

fn search_logged<P: MetadataProvider + ?Sized>(
    provider: &P,
    name: &str,
    kind: SearchKind,
) -> Option<Vec<CandidateMatch>> {
    match provider.search(name, kind) {
        Ok(candidates) if candidates.is_empty() => {
            warn!(name, kind = kind.path(), "no TMDB results");
            None
        }
        Ok(candidates) => Some(candidates),
        Err(err) => {
            warn!(name, kind = kind.path(), error = %err, "TMDB search failed");
            None
        }
    }
}
