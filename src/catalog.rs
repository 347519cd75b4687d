use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{Genre, Listing, Movie};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_by_path(&self, path: &str) -> Result<Vec<Movie>>;
    async fn list_category(&self, listing: Listing) -> Result<Vec<Movie>>;
    async fn search_by_keyword(&self, keyword: &str) -> Result<Vec<Movie>>;
    async fn list_by_genre(&self, genre_id: i32) -> Result<Vec<Movie>>;
    async fn list_genres(&self) -> Result<Vec<Genre>>;
    async fn get_detail(&self, movie_id: i32) -> Result<Movie>;
    async fn get_recommendations(&self, movie_id: i32) -> Result<Vec<Movie>>;
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    access_token: String,
    language: String,
}

impl CatalogClient {
    pub fn new(base_url: &str, access_token: &str, language: &str) -> Result<Self> {
        let user_agent = format!("movieshelf/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            language: language.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, &config.access_token, &config.language)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn language(&self) -> String {
        urlencoding::encode(&self.language).into_owned()
    }

    /// One GET, no retries. Non-success statuses become `CatalogUnavailable`.
    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        debug!("GET {}", url);
        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| {
                warn!("Catalog request to {} failed: {}", url, source);
                Error::Network {
                    url: url.clone(),
                    source,
                }
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|source| Error::Network {
            url: url.clone(),
            source,
        })?;
        if !status.is_success() {
            warn!("Catalog returned {} for {}: {}", status, url, text);
            return Err(Error::CatalogUnavailable { url, status });
        }
        serde_json::from_str(&text).map_err(|e| Error::InvalidResponse {
            url,
            reason: format!("JSON parse failed: {e}"),
        })
    }

    async fn fetch_movies(&self, path: &str) -> Result<Vec<Movie>> {
        let body = self.get_json(path).await?;
        match normalize_results(&body) {
            Some(movies) => Ok(movies),
            None => {
                warn!("Catalog response for '{}' has no results array", path);
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_by_path(&self, path: &str) -> Result<Vec<Movie>> {
        self.fetch_movies(path).await
    }

    async fn list_category(&self, listing: Listing) -> Result<Vec<Movie>> {
        self.fetch_movies(&listing.path(&self.language)).await
    }

    async fn search_by_keyword(&self, keyword: &str) -> Result<Vec<Movie>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            debug!("Skipping search for blank keyword");
            return Ok(Vec::new());
        }
        let path = format!(
            "search/movie?query={}&language={}&page=1",
            urlencoding::encode(keyword),
            self.language()
        );
        self.fetch_movies(&path).await
    }

    async fn list_by_genre(&self, genre_id: i32) -> Result<Vec<Movie>> {
        let path = format!(
            "discover/movie?with_genres={genre_id}&language={}&page=1",
            self.language()
        );
        self.fetch_movies(&path).await
    }

    async fn list_genres(&self) -> Result<Vec<Genre>> {
        let path = format!("genre/movie/list?language={}", self.language());
        let body = self.get_json(&path).await?;
        let Some(raw) = body.get("genres").and_then(Value::as_array) else {
            warn!("Genre list response has no genres array");
            return Ok(Vec::new());
        };
        Ok(raw
            .iter()
            .filter_map(|g| serde_json::from_value::<Genre>(g.clone()).ok())
            .collect())
    }

    async fn get_detail(&self, movie_id: i32) -> Result<Movie> {
        let path = format!("movie/{movie_id}?language={}", self.language());
        let body = match self.get_json(&path).await {
            Ok(body) => body,
            Err(Error::CatalogUnavailable { status, .. }) if status == StatusCode::NOT_FOUND => {
                return Err(Error::NotFound { movie_id });
            }
            Err(e) => return Err(e),
        };
        normalize_movie(&body).ok_or_else(|| Error::InvalidResponse {
            url: self.url(&path),
            reason: "detail is missing id or title".to_string(),
        })
    }

    async fn get_recommendations(&self, movie_id: i32) -> Result<Vec<Movie>> {
        let path = format!(
            "movie/{movie_id}/recommendations?language={}&page=1",
            self.language()
        );
        self.fetch_movies(&path).await
    }
}

/// Maps a catalog `results` array to movies. `None` when the array is absent.
pub fn normalize_results(body: &Value) -> Option<Vec<Movie>> {
    let raw = body.get("results")?.as_array()?;
    let movies: Vec<Movie> = raw.iter().filter_map(normalize_movie).collect();
    if movies.len() != raw.len() {
        debug!(
            "Dropped {} catalog entries missing id or title",
            raw.len() - movies.len()
        );
    }
    Some(movies)
}

/// Builds a `Movie` from one catalog object, or `None` if `id` or `title` is missing.
pub fn normalize_movie(value: &Value) -> Option<Movie> {
    let id = value
        .get("id")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())?;
    let title = value
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())?
        .to_string();

    Some(Movie {
        id,
        title,
        poster_path: image_path(value, "poster_path"),
        backdrop_path: image_path(value, "backdrop_path"),
        vote_average: number(value, "vote_average").clamp(0.0, 10.0),
        vote_count: value
            .get("vote_count")
            .and_then(Value::as_u64)
            .map(|c| u32::try_from(c).unwrap_or(u32::MAX))
            .unwrap_or(0),
        release_date: text(value, "release_date"),
        popularity: number(value, "popularity").max(0.0),
        overview: text(value, "overview"),
    })
}

fn image_path(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
}

fn number(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
