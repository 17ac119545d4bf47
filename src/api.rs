// =============================================================================
// api.rs — THE FRONT DESK
// =============================================================================
//
// Every endpoint is the same straight line:
//
//   normalize CNPJ -> ask upstreams one at a time -> assemble one JSON body
//
// An invalid CNPJ stops the line before any network call. Anything an
// upstream does wrong becomes a note in the response, never an error status.
// =============================================================================

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use reqwest::Client;
use tracing::info;

use crate::cnpj;
use crate::config::Config;
use crate::error::ApiError;
use crate::jurisdiction::{self, normalize_uf};
use crate::metrics::{Endpoint, MetricsCollector, MetricsSnapshot};
use crate::models::{
    text_field, AnalyzeRequest, AnalyzeResponse, CompanyProfile, CourtAttemptRequest,
    CourtAttemptResponse, CourtRegions, EvidenceRequest, EvidenceResponse, HealthResponse,
    ServerEntry, ServiceInfo, REGISTRY_LIMITATION,
};
use crate::sources::court_portals::{self, CourtKind};
use crate::sources::registry::{self, RegistryResult};
use crate::sources::{build_client, indexers};

const ANALYZE_NOTE: &str = "Fase 1: Cadastro + Jurisdição (com links para consulta).";
const COURT_ATTEMPT_NOTE: &str =
    "Tentativa automática de acesso aos portais. ok=false + block_reason indica bloqueio (captcha/JS/etc).";

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Client,
    pub metrics: Arc<MetricsCollector>,
    /// Source of "today" for company age. Swapped out in tests.
    pub today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(config: Config) -> reqwest::Result<Self> {
        let client = build_client(&config)?;
        Ok(Self {
            config: Arc::new(config),
            client,
            metrics: Arc::new(MetricsCollector::new()),
            today: local_today,
        })
    }

    /// Normalize and validate, counting rejections.
    fn validate(&self, raw: &str) -> Result<String, ApiError> {
        cnpj::normalize_and_validate(raw).inspect_err(|_| self.metrics.increment_invalid_cnpj())
    }

    async fn lookup_registry(&self, cnpj: &str) -> RegistryResult {
        let result = registry::fetch_registry(&self.client, &self.config, cnpj).await;
        self.metrics.record_registry_lookup(result.data().is_some());
        result
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Build the router. Called once at startup.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/analyze_public", post(analyze_public))
        .route("/evidence_search", post(evidence_search))
        .route("/court_attempt", post(court_attempt))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        title: state.config.service_title.clone(),
        version: state.config.service_version.clone(),
        servers: vec![ServerEntry { url: state.config.public_base_url.clone() }],
        endpoints: vec![
            "GET /health",
            "GET /metrics",
            "POST /analyze_public",
            "POST /evidence_search",
            "POST /court_attempt",
        ],
    })
}

/// Registry profile plus jurisdiction. A dead registry yields a partial
/// profile with a limitation note, not an error.
async fn analyze_public(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    state.metrics.increment_requests(Endpoint::Analyze);
    let cnpj = state.validate(&req.cnpj)?;
    info!(cnpj = cnpj.as_str(), "POST /analyze_public");

    let mut profile = CompanyProfile::new(&cnpj, req.razao_social);
    match state.lookup_registry(&cnpj).await {
        RegistryResult::Success(data) => profile.apply_registry(&data, (state.today)()),
        RegistryResult::Failure(failure) => profile.apply_registry_failure(failure),
    }

    let jurisdicao = jurisdiction::resolve(
        profile.uf.as_deref(),
        profile.municipio.as_deref(),
        &cnpj,
        profile.best_name(),
        &state.config,
    );

    Ok(Json(AnalyzeResponse {
        perfil: profile,
        jurisdicao,
        nota: ANALYZE_NOTE,
    }))
}

/// Keyword signals from the litigation indexers.
async fn evidence_search(
    State(state): State<AppState>,
    Json(req): Json<EvidenceRequest>,
) -> Result<Json<EvidenceResponse>, ApiError> {
    state.metrics.increment_requests(Endpoint::Evidence);
    let cnpj = state.validate(&req.cnpj)?;
    info!(
        cnpj = cnpj.as_str(),
        razao_social = req.razao_social.as_deref().unwrap_or(""),
        "POST /evidence_search"
    );

    let report = indexers::search(&state.client, &state.config, &cnpj).await;
    state
        .metrics
        .record_indexer_sources(report.sources.len(), report.limitations.len());

    Ok(Json(EvidenceResponse {
        links: indexers::search_links(&state.config, &cnpj),
        query: cnpj,
        signals: report.signals,
        sources: report.sources,
        limitations: report.limitations,
    }))
}

/// Probe TJ, TRT and TRF portals for the company's state.
async fn court_attempt(
    State(state): State<AppState>,
    Json(req): Json<CourtAttemptRequest>,
) -> Result<Json<CourtAttemptResponse>, ApiError> {
    state.metrics.increment_requests(Endpoint::CourtAttempt);
    let cnpj = state.validate(&req.cnpj)?;
    info!(cnpj = cnpj.as_str(), uf = ?req.uf, "POST /court_attempt");

    let mut uf = normalize_uf(req.uf.as_deref());
    let mut municipio = req
        .municipio
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    // No usable state given: ask the registry where the company lives
    let mut limitacoes = Vec::new();
    if uf.is_none() {
        match state.lookup_registry(&cnpj).await {
            RegistryResult::Success(data) => {
                uf = normalize_uf(text_field(&data, "uf").as_deref());
                municipio = text_field(&data, "municipio").or(municipio);
            }
            RegistryResult::Failure(_) => limitacoes.push(REGISTRY_LIMITATION.to_string()),
        }
    }

    let juris = jurisdiction::resolve(
        uf.as_deref(),
        municipio.as_deref(),
        &cnpj,
        req.razao_social.as_deref(),
        &state.config,
    );

    let targets = [
        (CourtKind::Tj, juris.links.tj_home.as_deref()),
        (CourtKind::Trt, juris.links.trt_pje.as_deref()),
        (CourtKind::Trf, juris.links.trf_home.as_deref()),
    ];

    let mut attempts = Vec::with_capacity(targets.len());
    for (kind, url) in targets {
        let attempt =
            court_portals::attempt(&state.client, kind, url, state.config.fetch_timeout).await;
        if url.is_some() {
            state.metrics.record_court_probe(attempt.probe.ok);
        }
        attempts.push(attempt);
    }

    Ok(Json(CourtAttemptResponse {
        cnpj,
        uf: juris.uf,
        municipio: juris.municipio,
        jurisdicao: CourtRegions { trf: juris.trf, trt: juris.trt },
        attempts,
        note: COURT_ATTEMPT_NOTE,
        limitacoes,
    }))
}
