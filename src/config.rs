// =============================================================================
// config.rs — THE SWITCHBOARD
// =============================================================================
//
// Every URL we call and every timeout we wait on lives here. All values can
// be overridden via environment variables prefixed with CREDITO_PUBLICO_,
// which is also how the tests point the engine at fake upstreams instead of
// the real BrasilAPI and the real courts.
//
// The defaults are the real public endpoints. No keys, no accounts, just a
// browser-looking User-Agent and a lot of patience.
// =============================================================================

use std::env;
use std::time::Duration;

/// Everything the service needs to know before it accepts its first request.
/// Built once at startup and shared read-only across handlers.
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // SERVICE
    // =========================================================================

    /// Address the HTTP server binds to. Default: 0.0.0.0:8000
    pub bind_addr: String,

    /// Public URL the service is reachable at. Only used to describe itself
    /// on `GET /`, never to route anything.
    pub public_base_url: String,

    pub service_title: String,
    pub service_version: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub log_json: bool,

    // =========================================================================
    // OUTBOUND HTTP
    // =========================================================================

    /// User-Agent sent on every outbound call. Several court portals refuse
    /// anything that does not at least pretend to be a browser.
    pub user_agent: String,

    /// Timeout for the registry lookup. Default: 25 seconds.
    /// BrasilAPI proxies the Receita Federal and is sometimes slow about it.
    pub registry_timeout: Duration,

    /// Timeout for indexer searches and court probes. Default: 20 seconds.
    pub fetch_timeout: Duration,

    // =========================================================================
    // REGISTRY
    // =========================================================================

    /// BrasilAPI CNPJ endpoint; the normalized CNPJ is appended as a path segment.
    pub registry_base_url: String,

    /// Registry home page, surfaced as a navigation link.
    pub registry_home_url: String,

    // =========================================================================
    // LITIGATION INDEXERS
    // The CNPJ is appended (URL-encoded) to each of these.
    // =========================================================================

    pub jusbrasil_search_url: String,
    pub escavador_search_url: String,
    pub google_search_url: String,

    // =========================================================================
    // COURT PORTALS
    // =========================================================================

    /// State court home page template. `{uf}` is replaced by the lower-cased
    /// state code: "SP" becomes https://www.tjsp.jus.br
    pub tj_home_template: String,

    /// Labor courts share one national PJe consultation portal.
    pub trt_pje_url: String,
}

impl Config {
    /// Load configuration from environment variables with working defaults.
    /// A `.env` file is honoured if present and silently ignored if not.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Config {
            bind_addr: env_or_default("CREDITO_PUBLICO_BIND_ADDR", "0.0.0.0:8000"),
            public_base_url: env_or_default(
                "CREDITO_PUBLICO_PUBLIC_BASE_URL",
                "https://assistente-credito-publico.onrender.com",
            ),
            service_title: env_or_default("CREDITO_PUBLICO_TITLE", "Assistente Crédito Público"),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_json: env_or_default("CREDITO_PUBLICO_LOG_JSON", "false")
                .parse()
                .unwrap_or(false),

            user_agent: env_or_default("CREDITO_PUBLICO_USER_AGENT", "Mozilla/5.0"),
            registry_timeout: Duration::from_secs(
                env_or_default("CREDITO_PUBLICO_REGISTRY_TIMEOUT_SECS", "25").parse().unwrap_or(25)
            ),
            fetch_timeout: Duration::from_secs(
                env_or_default("CREDITO_PUBLICO_FETCH_TIMEOUT_SECS", "20").parse().unwrap_or(20)
            ),

            registry_base_url: env_or_default(
                "CREDITO_PUBLICO_REGISTRY_BASE_URL",
                "https://brasilapi.com.br/api/cnpj/v1",
            ),
            registry_home_url: env_or_default(
                "CREDITO_PUBLICO_REGISTRY_HOME_URL",
                "https://brasilapi.com.br",
            ),

            jusbrasil_search_url: env_or_default(
                "CREDITO_PUBLICO_JUSBRASIL_SEARCH_URL",
                "https://www.jusbrasil.com.br/busca?q=",
            ),
            escavador_search_url: env_or_default(
                "CREDITO_PUBLICO_ESCAVADOR_SEARCH_URL",
                "https://www.escavador.com/busca?qo=",
            ),
            google_search_url: env_or_default(
                "CREDITO_PUBLICO_GOOGLE_SEARCH_URL",
                "https://www.google.com/search?q=",
            ),

            tj_home_template: env_or_default(
                "CREDITO_PUBLICO_TJ_HOME_TEMPLATE",
                "https://www.tj{uf}.jus.br",
            ),
            trt_pje_url: env_or_default(
                "CREDITO_PUBLICO_TRT_PJE_URL",
                "https://pje.trt.jus.br/consultaprocessual/",
            ),
        }
    }

    /// Registry lookup URL for an already-normalized CNPJ.
    pub fn registry_url(&self, cnpj: &str) -> String {
        format!("{}/{}", self.registry_base_url.trim_end_matches('/'), cnpj)
    }

    pub fn jusbrasil_url(&self, query: &str) -> String {
        format!("{}{}", self.jusbrasil_search_url, urlencoding::encode(query))
    }

    pub fn escavador_url(&self, query: &str) -> String {
        format!("{}{}", self.escavador_search_url, urlencoding::encode(query))
    }

    pub fn google_url(&self, query: &str) -> String {
        format!("{}{}", self.google_search_url, urlencoding::encode(query))
    }

    /// State court home page for an upper-cased state code.
    pub fn tj_home_url(&self, uf: &str) -> String {
        self.tj_home_template.replace("{uf}", &uf.to_lowercase())
    }
}

/// Read an environment variable, falling back to `default` when unset.
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl Config {
    /// Defaults with every upstream pointed at a single mock server.
    pub fn for_mock_server(base: &str) -> Self {
        Config {
            bind_addr: "127.0.0.1:0".to_string(),
            public_base_url: "http://localhost:8000".to_string(),
            service_title: "Assistente Crédito Público".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_json: false,
            user_agent: "Mozilla/5.0".to_string(),
            registry_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(5),
            registry_base_url: format!("{}/api/cnpj/v1", base),
            registry_home_url: "https://brasilapi.com.br".to_string(),
            jusbrasil_search_url: format!("{}/jusbrasil/busca?q=", base),
            escavador_search_url: format!("{}/escavador/busca?qo=", base),
            google_search_url: "https://www.google.com/search?q=".to_string(),
            tj_home_template: format!("{}/tj{{uf}}", base),
            trt_pje_url: format!("{}/pje/consultaprocessual/", base),
        }
    }
}
