//! PokeAPI catalog client
//!
//! Issues blocking HTTP requests against the catalog service, decodes the
//! responses into typed records, and classifies failures. The client holds no
//! state beyond its HTTP session; retries, if wanted, belong to the caller.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::ApiConfig;

/// Errors that can occur when talking to the catalog service
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("empty lookup query")]
    InvalidQuery,

    #[error("no catalog entry found (HTTP {status}: {reason})")]
    RecordNotFound { status: u16, reason: String },

    #[error("unusable catalog response: {0}")]
    MalformedResponse(String),

    #[error("catalog service unavailable: {reason}")]
    ServiceUnavailable { status: Option<u16>, reason: String },
}

/// Normalized lookup key: trimmed, lower-cased, never empty.
///
/// Accepts either an entry name or a numeric identifier as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery(String);

impl CatalogQuery {
    /// Normalize `raw` into a query, rejecting empty or blank input before
    /// any I/O happens.
    pub fn new(raw: &str) -> Result<Self, CatalogError> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Err(CatalogError::InvalidQuery);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One decoded catalog entry
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub sprites: SpriteSet,
}

/// Sprite URLs attached to a record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpriteSet {
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: OtherSprites,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: ArtworkSprites,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtworkSprites {
    pub front_default: Option<String>,
}

impl CatalogRecord {
    /// The record's artwork reference, preferring the high-resolution
    /// official artwork over the default sprite.
    pub fn artwork_url(&self) -> Option<&str> {
        self.sprites
            .other
            .official_artwork
            .front_default
            .as_deref()
            .or(self.sprites.front_default.as_deref())
    }
}

/// Shape of the collection endpoint response
#[derive(Debug, Deserialize)]
struct NamedResourceList {
    results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

/// Blocking HTTP client for the catalog service
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::blocking::Client,
    base_url: String,
    list_limit: u32,
}

impl CatalogClient {
    /// Build a client from explicit configuration
    pub fn new(config: &ApiConfig) -> Result<Self, CatalogError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!(
                "poke-artwork-viewer/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| CatalogError::ServiceUnavailable {
                status: None,
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            list_limit: config.list_limit,
        })
    }

    /// Fetch the catalog record for an already-normalized query.
    ///
    /// 4xx responses map to `RecordNotFound`, 5xx and transport failures to
    /// `ServiceUnavailable`, and a 200 body missing required fields to
    /// `MalformedResponse`.
    pub fn fetch_record(&self, query: &CatalogQuery) -> Result<CatalogRecord, CatalogError> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(query.as_str()));
        log::info!("Fetching catalog record: {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| CatalogError::ServiceUnavailable {
                status: None,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            let record: CatalogRecord = response
                .json()
                .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;
            log::debug!("Decoded record #{} ({})", record.id, record.name);
            Ok(record)
        } else if status.is_client_error() {
            log::warn!("No catalog entry for '{}': {}", query, status);
            Err(CatalogError::RecordNotFound {
                status: status.as_u16(),
                reason: reason_phrase(status),
            })
        } else {
            log::error!("Catalog service error for '{}': {}", query, status);
            Err(CatalogError::ServiceUnavailable {
                status: Some(status.as_u16()),
                reason: reason_phrase(status),
            })
        }
    }

    /// Load every known entry name in server order.
    ///
    /// Issues one GET with a page size large enough to cover the whole
    /// catalog. All-or-nothing: any failure returns an error, never a
    /// partial list.
    pub fn load_all_names(&self) -> Result<Vec<String>, CatalogError> {
        let url = format!("{}?limit={}", self.base_url, self.list_limit);
        log::info!("Loading catalog name index: {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| CatalogError::ServiceUnavailable {
                status: None,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            log::error!("Failed to load name index: {}", status);
            return Err(CatalogError::ServiceUnavailable {
                status: Some(status.as_u16()),
                reason: reason_phrase(status),
            });
        }

        let list: NamedResourceList = response
            .json()
            .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;

        let names: Vec<String> = list.results.into_iter().map(|entry| entry.name).collect();
        log::info!("Name index loaded with {} entries", names.len());
        Ok(names)
    }

    /// Plain GET against an absolute URL using the shared session.
    ///
    /// Used for artwork payloads, which live on a different host than the
    /// catalog endpoints. Status handling is the caller's responsibility.
    pub fn get_url(&self, url: &str) -> Result<reqwest::blocking::Response, reqwest::Error> {
        self.http.get(url).send()
    }
}

/// Canonical reason phrase for a status code (HTTP/2 carries none on the wire)
fn reason_phrase(status: reqwest::StatusCode) -> String {
    status.canonical_reason().unwrap_or("unknown status").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    /// Serve a fixed sequence of scripted responses on a local port,
    /// recording the request paths as they arrive.
    fn spawn_server(
        responses: Vec<(u16, String)>,
    ) -> (String, Arc<Mutex<Vec<String>>>, thread::JoinHandle<()>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let base_url = format!("http://{}", addr);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_thread = seen.clone();

        let handle = thread::spawn(move || {
            for (status, body) in responses {
                let request = match server.recv() {
                    Ok(request) => request,
                    Err(_) => return,
                };
                seen_in_thread.lock().unwrap().push(request.url().to_string());
                let response = tiny_http::Response::from_string(body).with_status_code(status);
                let _ = request.respond(response);
            }
        });

        (base_url, seen, handle)
    }

    fn test_client(base_url: &str) -> CatalogClient {
        CatalogClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
            list_limit: 100,
        })
        .unwrap()
    }

    #[test]
    fn test_normalize_trims_and_lowercases() {
        let query = CatalogQuery::new("  Rockruff ").unwrap();
        assert_eq!(query.as_str(), "rockruff");

        // Numeric identifiers pass through as text
        let query = CatalogQuery::new("25").unwrap();
        assert_eq!(query.as_str(), "25");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["  PIKACHU  ", "Mr. Mime", "nidoran-f", "\tCharizard\n"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_blank_query_fails_fast() {
        assert!(matches!(
            CatalogQuery::new(""),
            Err(CatalogError::InvalidQuery)
        ));
        assert!(matches!(
            CatalogQuery::new("   \t "),
            Err(CatalogError::InvalidQuery)
        ));
    }

    #[test]
    fn test_fetch_record_success() {
        let body = r#"{
            "id": 25,
            "name": "pikachu",
            "sprites": {
                "front_default": "https://img.example/sprites/25.png",
                "other": {
                    "official-artwork": {
                        "front_default": "https://img.example/artwork/25.png"
                    }
                }
            }
        }"#;
        let (base_url, seen, handle) = spawn_server(vec![(200, body.to_string())]);
        let client = test_client(&base_url);

        let query = CatalogQuery::new("Pikachu").unwrap();
        let record = client.fetch_record(&query).unwrap();
        handle.join().unwrap();

        assert_eq!(record.id, 25);
        assert_eq!(record.name, "pikachu");
        assert_eq!(
            record.artwork_url(),
            Some("https://img.example/artwork/25.png")
        );
        assert_eq!(seen.lock().unwrap().as_slice(), ["/pikachu"]);
    }

    #[test]
    fn test_fetch_record_not_found_carries_status() {
        let (base_url, _seen, handle) = spawn_server(vec![(404, "Not Found".to_string())]);
        let client = test_client(&base_url);

        let query = CatalogQuery::new("doesnotexist").unwrap();
        let err = client.fetch_record(&query).unwrap_err();
        handle.join().unwrap();

        match err {
            CatalogError::RecordNotFound { status, reason } => {
                assert_eq!(status, 404);
                assert_eq!(reason, "Not Found");
            }
            other => panic!("expected RecordNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_record_missing_id_is_malformed() {
        let body = r#"{"name": "pikachu"}"#;
        let (base_url, _seen, handle) = spawn_server(vec![(200, body.to_string())]);
        let client = test_client(&base_url);

        let query = CatalogQuery::new("pikachu").unwrap();
        let err = client.fetch_record(&query).unwrap_err();
        handle.join().unwrap();

        assert!(matches!(err, CatalogError::MalformedResponse(_)));
    }

    #[test]
    fn test_fetch_record_server_error() {
        let (base_url, _seen, handle) = spawn_server(vec![(500, "boom".to_string())]);
        let client = test_client(&base_url);

        let query = CatalogQuery::new("pikachu").unwrap();
        let err = client.fetch_record(&query).unwrap_err();
        handle.join().unwrap();

        match err {
            CatalogError::ServiceUnavailable { status, .. } => assert_eq!(status, Some(500)),
            other => panic!("expected ServiceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_record_connection_refused() {
        // Nothing listens here; the request must fail before any decode
        let client = test_client("http://127.0.0.1:1");
        let query = CatalogQuery::new("pikachu").unwrap();
        let err = client.fetch_record(&query).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::ServiceUnavailable { status: None, .. }
        ));
    }

    #[test]
    fn test_load_all_names_preserves_order() {
        let body = r#"{"results":[{"name":"bulbasaur","url":"u1"},{"name":"ivysaur","url":"u2"}]}"#;
        let (base_url, seen, handle) = spawn_server(vec![(200, body.to_string())]);
        let client = test_client(&base_url);

        let names = client.load_all_names().unwrap();
        handle.join().unwrap();

        assert_eq!(names, ["bulbasaur", "ivysaur"]);
        assert_eq!(seen.lock().unwrap().as_slice(), ["/?limit=100"]);
    }

    #[test]
    fn test_load_all_names_failure_is_all_or_nothing() {
        let (base_url, _seen, handle) = spawn_server(vec![(503, "down".to_string())]);
        let client = test_client(&base_url);

        let err = client.load_all_names().unwrap_err();
        handle.join().unwrap();

        assert!(matches!(err, CatalogError::ServiceUnavailable { .. }));
    }

    #[test]
    fn test_artwork_url_falls_back_to_default_sprite() {
        let record: CatalogRecord = serde_json::from_str(
            r#"{"id": 7, "name": "squirtle", "sprites": {"front_default": "https://img.example/7.png"}}"#,
        )
        .unwrap();
        assert_eq!(record.artwork_url(), Some("https://img.example/7.png"));
    }

    #[test]
    fn test_artwork_url_absent() {
        let record: CatalogRecord =
            serde_json::from_str(r#"{"id": 132, "name": "ditto", "sprites": {"front_default": null}}"#)
                .unwrap();
        assert_eq!(record.artwork_url(), None);
    }
}
