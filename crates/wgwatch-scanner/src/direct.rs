//! Plain HTTP acquisition, no browser involved.

use crate::error::{Result, ScanError};
use crate::parser::parse_listings;
use crate::source::ListingSource;
use crate::url_builder::{build_search_url_at, search_params, LANDING_URL, SEARCH_URL};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use wgwatch_browser::fingerprint::{ACCEPT_LANGUAGE as LANGUAGES, DESKTOP_USER_AGENT};
use wgwatch_core::Listing;

/// Fetches the results page directly: GET with query parameters first,
/// then the same parameters as a form POST.
#[derive(Debug, Clone)]
pub struct DirectFetcher {
    client: Client,
    endpoint: String,
}

impl DirectFetcher {
    /// Fetcher against the live search endpoint.
    pub fn new() -> Result<Self> {
        Self::with_endpoint(SEARCH_URL)
    }

    /// Fetcher against another endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DESKTOP_USER_AGENT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(LANGUAGES));
        headers.insert(REFERER, HeaderValue::from_static(LANDING_URL));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScanError::Fetch(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Run one direct search.
    pub async fn fetch_listings(&self, query: &str) -> Result<Vec<Listing>> {
        match self.try_get(query).await {
            Ok(listings) if !listings.is_empty() => {
                tracing::info!("Direct GET returned {} listing(s)", listings.len());
                return Ok(listings);
            }
            Ok(_) => tracing::debug!("Direct GET yielded no listings, trying POST"),
            Err(e) => tracing::warn!("Direct GET failed, trying POST: {}", e),
        }

        let response = self
            .client
            .post(&self.endpoint)
            .form(&search_params(query))
            .send()
            .await
            .map_err(|e| ScanError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Fetch(format!(
                "direct fetch status {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScanError::Fetch(e.to_string()))?;
        let listings = parse_listings(&body);
        if listings.is_empty() {
            return Err(ScanError::Fetch(
                "direct fetch returned no listings".to_string(),
            ));
        }

        tracing::info!("Direct POST returned {} listing(s)", listings.len());
        Ok(listings)
    }

    /// GET the canonical results URL. Non-2xx counts as no listings.
    async fn try_get(&self, query: &str) -> Result<Vec<Listing>> {
        let url = build_search_url_at(&self.endpoint, query)
            .map_err(|e| ScanError::Fetch(format!("invalid search endpoint: {e}")))?;
        tracing::debug!("Direct GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Direct GET status {}", status.as_u16());
            return Ok(Vec::new());
        }
        Ok(parse_listings(&response.text().await?))
    }
}

#[async_trait]
impl ListingSource for DirectFetcher {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Listing>> {
        self.fetch_listings(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const RESULTS_FRAGMENT: &str = r#"<ul id="search-result-list">
        <li class="search-mate-entry"><a href="https://www.wgzimmer.ch/wglink/de/123456/a.html">Zimmer <b>Kreis 3</b></a></li>
        <li class="search-mate-entry"><a href="https://www.wgzimmer.ch/wglink/de/654321/b.html">Zimmer Oerlikon</a></li>
    </ul>"#;

    /// Serves canned `(status, body)` responses in order and records the
    /// raw requests it received.
    struct MockServer {
        endpoint: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    async fn serve(responses: Vec<(u16, &'static str)>) -> MockServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut socket).await;
                recorded.lock().expect("lock").push(request);
                let response = format!(
                    "HTTP/1.1 {status} Canned\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        MockServer {
            endpoint: format!("http://{addr}/wgzimmer/search/mate.html"),
            requests,
        }
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_get_success_skips_post() {
        let server = serve(vec![(200, RESULTS_FRAGMENT)]).await;
        let fetcher = DirectFetcher::with_endpoint(&server.endpoint).expect("client");

        let listings = fetcher.fetch_listings("zurich").await.expect("listings");
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].id.as_str(), "123456");
        assert_eq!(listings[0].summary, "Zimmer Kreis 3");

        let requests = server.requests.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        let get = requests[0].to_lowercase();
        assert!(get.starts_with("get /wgzimmer/search/mate.html?startsearch=true"));
        assert!(get.contains("query=zurich"));
        assert!(get.contains("accept-language: de-de,de;q=0.9,en;q=0.8"));
        assert!(get.contains("referer: https://www.wgzimmer.ch/wgzimmer/search/room.html"));
        assert!(get.contains("user-agent: mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_empty_get_falls_back_to_post() {
        let server = serve(vec![(200, "<p>nothing</p>"), (200, RESULTS_FRAGMENT)]).await;
        let fetcher = DirectFetcher::with_endpoint(&server.endpoint).expect("client");

        let listings = fetcher.fetch_listings("zurich").await.expect("listings");
        assert_eq!(listings.len(), 2);

        let requests = server.requests.lock().expect("lock");
        assert_eq!(requests.len(), 2);
        let post = &requests[1];
        assert!(post.starts_with("POST /wgzimmer/search/mate.html "));
        assert!(post
            .to_lowercase()
            .contains("content-type: application/x-www-form-urlencoded"));
        assert!(post.ends_with(
            "startSearch=true&g-recaptcha-response=&bypass-csrf=true&query=zurich&priceMin=200&priceMax=2000&wgState=all&permanent=all&studio=false&student=none&typeofwg=all"
        ));
    }

    #[tokio::test]
    async fn test_post_status_error() {
        let server = serve(vec![(403, "blocked"), (503, "unavailable")]).await;
        let fetcher = DirectFetcher::with_endpoint(&server.endpoint).expect("client");

        let err = fetcher.fetch_listings("zurich").await.expect_err("fails");
        assert_eq!(err.to_string(), "direct fetch failed: direct fetch status 503");
    }

    #[tokio::test]
    async fn test_post_without_listings() {
        let server = serve(vec![(200, "<p>none</p>"), (200, "<p>none</p>")]).await;
        let fetcher = DirectFetcher::with_endpoint(&server.endpoint).expect("client");

        let err = fetcher.fetch_listings("zurich").await.expect_err("fails");
        assert!(
            matches!(err, ScanError::Fetch(ref msg) if msg == "direct fetch returned no listings")
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_fetch_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let fetcher =
            DirectFetcher::with_endpoint(format!("http://{addr}/search")).expect("client");
        let err = fetcher.fetch_listings("zurich").await.expect_err("fails");
        assert!(matches!(err, ScanError::Fetch(_)));
    }
}
