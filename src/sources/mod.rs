// =============================================================================
// sources/mod.rs — EVERYONE WE ASK FOR DATA
// =============================================================================
//
// Three kinds of upstream, one file each:
//
// - registry:      BrasilAPI's CNPJ endpoint. JSON. Usually polite.
// - indexers:      JusBrasil and Escavador search pages. HTML. Sometimes
//                  polite, often a 403.
// - court_portals: 27 state courts, the federal courts and the labor PJe.
//                  HTML. Frequently a CAPTCHA.
//
// All of them share one reqwest client and the helpers below. Nothing here
// retries: one GET, then we report what happened.
// =============================================================================

pub mod registry;
pub mod indexers;
pub mod court_portals;

use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::debug;

use crate::config::Config;

/// Fetched bodies are cut to this many characters before anyone reads them.
pub const MAX_BODY_CHARS: usize = 200_000;

/// Bytes read off the wire per body. Enough for `MAX_BODY_CHARS` of any
/// UTF-8 text; the rest of the stream is never buffered.
pub const MAX_BODY_BYTES: usize = MAX_BODY_CHARS * 4;

/// Transport error messages are cut to this many characters.
pub const MAX_ERROR_CHARS: usize = 200;

/// Build the shared outbound client: browser-ish User-Agent, redirects
/// followed, rustls. Per-call timeouts are set on each request.
pub fn build_client(config: &Config) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .redirect(Policy::limited(10))
        .timeout(config.registry_timeout.max(config.fetch_timeout))
        .build()
}

/// A page that came back, whatever its status.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

/// One GET. Any status is a page; only transport problems are errors.
pub async fn fetch_page(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<FetchedPage, reqwest::Error> {
    let response = client.get(url).timeout(timeout).send().await?;
    let status = response.status().as_u16();
    let bytes = read_capped(response, MAX_BODY_BYTES).await?;

    debug!(url = url, status = status, body_len = bytes.len(), "Fetched page");

    Ok(FetchedPage {
        status,
        body: truncate_chars(&String::from_utf8_lossy(&bytes), MAX_BODY_CHARS),
    })
}

/// Read at most `limit` bytes of the body, chunk by chunk, then drop the
/// connection.
pub async fn read_capped(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, reqwest::Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit - bytes.len();
        if chunk.len() >= room {
            bytes.extend_from_slice(&chunk[..room]);
            break;
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Cut `text` to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Render a transport error for a diagnostic payload.
pub fn error_text(err: &reqwest::Error) -> String {
    truncate_chars(&err.to_string(), MAX_ERROR_CHARS)
}

#[cfg(test)]
pub(crate) fn test_client() -> Client {
    build_client(&Config::for_mock_server("http://unused")).expect("test client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("execução", 6), "execuç");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[tokio::test]
    async fn test_fetch_page_returns_non_200_as_page() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone");
                then.status(404).body("nope");
            })
            .await;

        let page = fetch_page(&test_client(), &server.url("/gone"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(page.status, 404);
        assert_eq!(page.body, "nope");
    }

    #[tokio::test]
    async fn test_fetch_page_sends_user_agent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ua").header("user-agent", "Mozilla/5.0");
                then.status(200).body("ok");
            })
            .await;

        let page = fetch_page(&test_client(), &server.url("/ua"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(page.status, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_capped_stops_at_limit() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/big");
                then.status(200).body("a".repeat(100_000));
            })
            .await;

        let response = test_client().get(server.url("/big")).send().await.unwrap();
        let bytes = read_capped(response, 1_000).await.unwrap();
        assert_eq!(bytes.len(), 1_000);
    }

    #[tokio::test]
    async fn test_fetch_page_cuts_oversized_body() {
        let server = MockServer::start_async().await;
        let huge = "é".repeat(MAX_BODY_CHARS + 50_000);
        server
            .mock_async(|when, then| {
                when.method(GET).path("/huge");
                then.status(200).body(huge.as_str());
            })
            .await;

        let page = fetch_page(&test_client(), &server.url("/huge"), Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(page.body.chars().count(), MAX_BODY_CHARS);
        assert!(page.body.chars().all(|c| c == 'é'));
    }

    #[tokio::test]
    async fn test_fetch_page_follows_redirects() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/old");
                then.status(302).header("location", "/new");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/new");
                then.status(200).body("moved here");
            })
            .await;

        let page = fetch_page(&test_client(), &server.url("/old"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "moved here");
    }
}
