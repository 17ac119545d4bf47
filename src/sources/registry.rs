// =============================================================================
// registry.rs — ASKING BRASILAPI WHO THIS COMPANY IS
// =============================================================================
//
// Real API: https://brasilapi.com.br/api/cnpj/v1/{cnpj}
//
// BrasilAPI fronts the Receita Federal's public CNPJ data. It is free, needs
// no key, and rate-limits enthusiastic clients. When it says no we write the
// reason down and let the handler carry on with a partial profile.
// =============================================================================

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::sources::{error_text, fetch_page, truncate_chars};

/// Registry error bodies are cut to this many characters.
pub const MAX_REGISTRY_BODY_CHARS: usize = 2_000;

/// Why the registry lookup produced no data. Serialized as the profile's
/// `cadastro_erro` diagnostic.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistryFailure {
    /// The registry answered, but not with a 200.
    HttpStatus { status_code: u16, text: String },
    /// Timeout, DNS, TLS, or a 200 whose body was not JSON.
    Transport { error: String },
}

#[derive(Debug, Clone)]
pub enum RegistryResult {
    Success(Value),
    Failure(RegistryFailure),
}

impl RegistryResult {
    pub fn data(&self) -> Option<&Value> {
        match self {
            RegistryResult::Success(data) => Some(data),
            RegistryResult::Failure(_) => None,
        }
    }
}

/// Look up a normalized CNPJ. Never fails: every problem becomes a
/// `RegistryResult::Failure`.
pub async fn fetch_registry(client: &Client, config: &Config, cnpj: &str) -> RegistryResult {
    let url = config.registry_url(cnpj);

    let page = match fetch_page(client, &url, config.registry_timeout).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, url = url.as_str(), "Registry: request failed");
            return RegistryResult::Failure(RegistryFailure::Transport { error: error_text(&e) });
        }
    };

    if page.status != 200 {
        warn!(status = page.status, url = url.as_str(), "Registry: non-200 response");
        return RegistryResult::Failure(RegistryFailure::HttpStatus {
            status_code: page.status,
            text: truncate_chars(&page.body, MAX_REGISTRY_BODY_CHARS),
        });
    }

    match serde_json::from_str::<Value>(&page.body) {
        Ok(data) => {
            debug!(cnpj = cnpj, "Registry: record found");
            RegistryResult::Success(data)
        }
        Err(e) => {
            warn!(error = %e, url = url.as_str(), "Registry: body is not JSON");
            RegistryResult::Failure(RegistryFailure::Transport {
                error: truncate_chars(&e.to_string(), crate::sources::MAX_ERROR_CHARS),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::test_client;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_success_returns_parsed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/cnpj/v1/11222333000144");
                then.status(200).json_body(json!({ "razao_social": "ACME LTDA", "uf": "RJ" }));
            })
            .await;

        let config = Config::for_mock_server(&server.base_url());
        let result = fetch_registry(&test_client(), &config, "11222333000144").await;
        let data = result.data().expect("should succeed");
        assert_eq!(data["razao_social"], "ACME LTDA");
    }

    #[tokio::test]
    async fn test_server_error_is_http_failure_with_truncated_body() {
        let server = MockServer::start_async().await;
        let long_body = "x".repeat(5_000);
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/cnpj/v1/11222333000144");
                then.status(500).body(long_body.as_str());
            })
            .await;

        let config = Config::for_mock_server(&server.base_url());
        let result = fetch_registry(&test_client(), &config, "11222333000144").await;
        match result {
            RegistryResult::Failure(RegistryFailure::HttpStatus { status_code, text }) => {
                assert_eq!(status_code, 500);
                assert_eq!(text.chars().count(), MAX_REGISTRY_BODY_CHARS);
            }
            other => panic!("expected HttpStatus failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_200_is_a_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/cnpj/v1/11222333000144");
                then.status(200).body("<html>manutenção</html>");
            })
            .await;

        let config = Config::for_mock_server(&server.base_url());
        let result = fetch_registry(&test_client(), &config, "11222333000144").await;
        assert!(matches!(
            result,
            RegistryResult::Failure(RegistryFailure::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_registry_is_transport_failure() {
        // Port 9 (discard) on localhost: nothing listens there in CI
        let config = Config::for_mock_server("http://127.0.0.1:9");
        let result = fetch_registry(&test_client(), &config, "11222333000144").await;
        match result {
            RegistryResult::Failure(RegistryFailure::Transport { error }) => {
                assert!(!error.is_empty());
                assert!(error.chars().count() <= crate::sources::MAX_ERROR_CHARS);
            }
            other => panic!("expected Transport failure, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_serializes_with_kind_tag() {
        let failure = RegistryFailure::HttpStatus { status_code: 429, text: "slow down".into() };
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            json!({ "kind": "http_status", "status_code": 429, "text": "slow down" })
        );
    }
}
