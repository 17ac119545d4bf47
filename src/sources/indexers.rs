// =============================================================================
// indexers.rs — WHAT DOES THE INTERNET SAY ABOUT THIS CNPJ?
// =============================================================================
//
// JusBrasil and Escavador index court gazettes and make them searchable.
// Their search pages are HTML meant for humans, and both are happy to answer
// a bot with a 403. Whatever comes back with a 200 is lower-cased, glued
// together and handed to the term counter.
//
// A hit here means "a page mentioning this CNPJ also mentions execução
// fiscal". It does NOT mean there is a lawsuit. The signals note says so.
// =============================================================================

use std::collections::BTreeMap;

use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::EvidenceSignals;
use crate::sources::{error_text, fetch_page};
use crate::text_scanner::{self, TOP_FINDINGS_CAP};

pub const SIGNALS_NOTE: &str =
    "Indícios por indexadores. NÃO confirma processos. Requer validação no tribunal.";

/// A search link handed back to the caller for manual follow-up.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchLink {
    pub title: &'static str,
    pub url: String,
}

/// An indexer that answered with content.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndexerHit {
    pub source: &'static str,
    pub url: String,
}

/// Why an indexer gave us nothing usable.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchFailure {
    /// Non-200, most often a bot wall.
    HttpStatus { status: u16, note: &'static str },
    Transport { error: String },
}

/// An indexer that did not answer with content.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndexerMiss {
    pub source: &'static str,
    pub url: String,
    pub detail: FetchFailure,
}

/// Everything the evidence endpoint learned from the indexers.
#[derive(Debug, Clone)]
pub struct IndexerReport {
    pub signals: EvidenceSignals,
    pub sources: Vec<IndexerHit>,
    pub limitations: Vec<IndexerMiss>,
}

/// The indexers we search, in the order we search them.
fn indexer_targets(config: &Config, query: &str) -> Vec<(&'static str, String)> {
    vec![
        ("jusbrasil", config.jusbrasil_url(query)),
        ("escavador", config.escavador_url(query)),
    ]
}

/// Links for a human to run the same searches by hand.
pub fn search_links(config: &Config, query: &str) -> Vec<SearchLink> {
    vec![
        SearchLink { title: "JusBrasil - busca", url: config.jusbrasil_url(query) },
        SearchLink { title: "Escavador - busca", url: config.escavador_url(query) },
        SearchLink { title: "Google - busca", url: config.google_url(query) },
    ]
}

/// Search every indexer for `query`, one after another. A failing indexer
/// is recorded and skipped; if all fail the counts are simply all zero.
pub async fn search(client: &Client, config: &Config, query: &str) -> IndexerReport {
    let mut combined_text = String::new();
    let mut sources = Vec::new();
    let mut limitations = Vec::new();

    for (source, url) in indexer_targets(config, query) {
        let detail = match fetch_page(client, &url, config.fetch_timeout).await {
            Ok(page) if page.status == 200 => {
                if !combined_text.is_empty() {
                    combined_text.push('\n');
                }
                combined_text.push_str(&page.body);
                sources.push(IndexerHit { source, url });
                continue;
            }
            Ok(page) => {
                warn!(source = source, status = page.status, "Indexer: blocked or error");
                FetchFailure::HttpStatus { status: page.status, note: "blocked_or_error" }
            }
            Err(e) => {
                warn!(source = source, error = %e, "Indexer: request failed");
                FetchFailure::Transport { error: error_text(&e) }
            }
        };
        limitations.push(IndexerMiss { source, url, detail });
    }

    let counts = text_scanner::count_terms(&combined_text);
    let top_findings = text_scanner::top_findings(&counts, TOP_FINDINGS_CAP);
    let term_counts: BTreeMap<&'static str, usize> =
        counts.iter().map(|c| (c.term, c.hits)).collect();

    info!(
        query = query,
        sources_ok = sources.len(),
        sources_blocked = limitations.len(),
        findings = top_findings.len(),
        "Indexer search complete"
    );

    IndexerReport {
        signals: EvidenceSignals {
            index_sources_ok: sources.len(),
            index_sources_blocked: limitations.len(),
            term_counts,
            top_findings,
            note: SIGNALS_NOTE,
        },
        sources,
        limitations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::test_client;
    use crate::text_scanner::KEY_TERMS;
    use httpmock::prelude::*;

    const CNPJ: &str = "11222333000144";

    #[tokio::test]
    async fn test_counts_across_both_indexers() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/jusbrasil/busca").query_param("q", CNPJ);
                then.status(200).body("<p>Execução Fiscal contra ACME</p>");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/escavador/busca").query_param("qo", CNPJ);
                then.status(200).body("<p>execucao fiscal; protesto em cartório</p>");
            })
            .await;

        let config = Config::for_mock_server(&server.base_url());
        let report = search(&test_client(), &config, CNPJ).await;

        assert_eq!(report.signals.index_sources_ok, 2);
        assert_eq!(report.signals.index_sources_blocked, 0);
        assert_eq!(report.signals.term_counts["execucao_fiscal"], 2);
        assert_eq!(report.signals.term_counts["protesto"], 2);
        assert_eq!(report.signals.term_counts.len(), KEY_TERMS.len());
        assert_eq!(report.signals.top_findings[0].term, "execucao");
        assert!(report.limitations.is_empty());
    }

    #[tokio::test]
    async fn test_blocked_indexer_is_isolated() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/jusbrasil/busca");
                then.status(403).body("Forbidden");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/escavador/busca");
                then.status(200).body("falência decretada");
            })
            .await;

        let config = Config::for_mock_server(&server.base_url());
        let report = search(&test_client(), &config, CNPJ).await;

        assert_eq!(report.signals.index_sources_ok, 1);
        assert_eq!(report.signals.index_sources_blocked, 1);
        assert_eq!(report.sources[0].source, "escavador");
        assert_eq!(report.limitations[0].source, "jusbrasil");
        assert_eq!(
            report.limitations[0].detail,
            FetchFailure::HttpStatus { status: 403, note: "blocked_or_error" }
        );
        assert_eq!(report.signals.term_counts["falencia"], 1);
    }

    #[tokio::test]
    async fn test_all_indexers_down_yields_zero_counts() {
        let config = Config::for_mock_server("http://127.0.0.1:9");
        let report = search(&test_client(), &config, CNPJ).await;

        assert_eq!(report.signals.index_sources_ok, 0);
        assert_eq!(report.signals.index_sources_blocked, 2);
        assert!(report.signals.top_findings.is_empty());
        assert!(report.signals.term_counts.values().all(|&v| v == 0));
        assert!(report
            .limitations
            .iter()
            .all(|m| matches!(m.detail, FetchFailure::Transport { .. })));
    }

    #[test]
    fn test_search_links_cover_three_engines() {
        let config = Config::for_mock_server("http://mock");
        let links = search_links(&config, CNPJ);
        let titles: Vec<&str> = links.iter().map(|l| l.title).collect();
        assert_eq!(titles, vec!["JusBrasil - busca", "Escavador - busca", "Google - busca"]);
        assert!(links[2].url.ends_with(CNPJ));
    }
}
