// =============================================================================
// models.rs — WHAT GOES IN, WHAT COMES OUT
// =============================================================================
//
// Request bodies, response bodies, and the company profile assembled from
// the registry. Everything here lives for exactly one request. Field names
// are Portuguese where the API speaks Portuguese to its callers (`perfil`,
// `limitacoes`), always without accents so nobody has to type "limitações"
// into a JSON path.
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cnpj;
use crate::jurisdiction::{normalize_uf, JurisdictionInfo};
use crate::sources::court_portals::CourtAttempt;
use crate::sources::indexers::{IndexerHit, IndexerMiss, SearchLink};
use crate::sources::registry::RegistryFailure;
use crate::text_scanner::TermCount;

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub cnpj: String,
    pub razao_social: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvidenceRequest {
    pub cnpj: String,
    pub razao_social: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourtAttemptRequest {
    pub cnpj: String,
    pub uf: Option<String>,
    pub municipio: Option<String>,
    pub razao_social: Option<String>,
}

// =============================================================================
// COMPANY PROFILE
// =============================================================================

/// Label recorded in `fontes` when the registry answered.
pub const REGISTRY_SOURCE_OK: &str = "BrasilAPI CNPJ (fonte pública)";
/// Label recorded in `fontes` when it did not.
pub const REGISTRY_SOURCE_FAILED: &str = "BrasilAPI CNPJ (falhou)";
pub const REGISTRY_LIMITATION: &str =
    "Não foi possível obter cadastro via BrasilAPI (instabilidade, limite ou falha).";

/// What we know about a company after asking the registry.
///
/// `idade_anos` is `None` exactly when `data_abertura` is missing or cannot
/// be parsed as a date.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompanyProfile {
    pub cnpj: String,
    pub razao_social_informada: Option<String>,
    pub razao_social_encontrada: Option<String>,
    pub situacao: Option<String>,
    pub data_abertura: Option<String>,
    pub idade_anos: Option<i32>,
    pub cnae_principal: Option<String>,
    pub uf: Option<String>,
    pub municipio: Option<String>,
    pub endereco: Option<String>,
    pub fontes: Vec<String>,
    pub limitacoes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadastro_erro: Option<RegistryFailure>,
}

impl CompanyProfile {
    /// A profile with nothing but the identifiers the caller gave us.
    pub fn new(cnpj: &str, razao_social_informada: Option<String>) -> Self {
        Self {
            cnpj: cnpj.to_string(),
            razao_social_informada,
            razao_social_encontrada: None,
            situacao: None,
            data_abertura: None,
            idade_anos: None,
            cnae_principal: None,
            uf: None,
            municipio: None,
            endereco: None,
            fontes: Vec::new(),
            limitacoes: Vec::new(),
            cadastro_erro: None,
        }
    }

    /// Fill the profile from a BrasilAPI CNPJ payload.
    pub fn apply_registry(&mut self, data: &Value, today: NaiveDate) {
        self.fontes.push(REGISTRY_SOURCE_OK.to_string());
        self.razao_social_encontrada = text_field(data, "razao_social");
        self.situacao = text_field(data, "descricao_situacao_cadastral")
            .or_else(|| text_field(data, "situacao_cadastral"));
        self.data_abertura = text_field(data, "data_inicio_atividade");
        self.idade_anos = cnpj::years_since(self.data_abertura.as_deref(), today);
        self.cnae_principal = text_field(data, "cnae_fiscal_descricao")
            .or_else(|| text_field(data, "cnae_fiscal"));
        self.uf = normalize_uf(text_field(data, "uf").as_deref());
        self.municipio = text_field(data, "municipio");

        let parts = [
            text_field(data, "logradouro"),
            text_field(data, "numero"),
            text_field(data, "bairro"),
            self.municipio.clone(),
            self.uf.clone(),
            text_field(data, "cep"),
        ];
        let endereco = parts.into_iter().flatten().collect::<Vec<_>>().join(", ");
        self.endereco = Some(endereco);
    }

    /// Record that the registry could not be consulted.
    pub fn apply_registry_failure(&mut self, failure: RegistryFailure) {
        self.limitacoes.push(REGISTRY_LIMITATION.to_string());
        self.fontes.push(REGISTRY_SOURCE_FAILED.to_string());
        self.cadastro_erro = Some(failure);
    }

    /// Legal name to search by: what the registry says, else what the caller said.
    pub fn best_name(&self) -> Option<&str> {
        self.razao_social_encontrada
            .as_deref()
            .or(self.razao_social_informada.as_deref())
    }
}

/// Read a registry field as text. BrasilAPI mixes strings and numbers
/// (`cnae_fiscal` is a number, `situacao_cadastral` sometimes too); empty
/// strings and nulls are treated as absent.
pub fn text_field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub perfil: CompanyProfile,
    pub jurisdicao: JurisdictionInfo,
    pub nota: &'static str,
}

/// Evidence signals: weak hints from search engines, not court records.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EvidenceSignals {
    pub index_sources_ok: usize,
    pub index_sources_blocked: usize,
    /// One entry per taxonomy key, zero-filled.
    pub term_counts: std::collections::BTreeMap<&'static str, usize>,
    pub top_findings: Vec<TermCount>,
    pub note: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EvidenceResponse {
    pub query: String,
    pub signals: EvidenceSignals,
    pub links: Vec<SearchLink>,
    pub sources: Vec<IndexerHit>,
    pub limitations: Vec<IndexerMiss>,
}

#[derive(Debug, Serialize)]
pub struct CourtRegions {
    pub trf: Option<String>,
    pub trt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CourtAttemptResponse {
    pub cnpj: String,
    pub uf: Option<String>,
    pub municipio: Option<String>,
    pub jurisdicao: CourtRegions,
    pub attempts: Vec<CourtAttempt>,
    pub note: &'static str,
    /// Present only when the registry was asked for the state and failed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub limitacoes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ServerEntry {
    pub url: String,
}

/// Self-description served on `GET /`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub title: String,
    pub version: String,
    pub servers: Vec<ServerEntry>,
    pub endpoints: Vec<&'static str>,
}
