// =============================================================================
// court_portals.rs — KNOCKING ON THE COURTHOUSE DOOR
// =============================================================================
//
// Brazilian court portals really do not want to be scraped. Between
// reCAPTCHA, Cloudflare challenges and single-page apps that render nothing
// without JavaScript, an automated GET usually comes back with a bouncer
// instead of a docket.
//
// So we knock once, write down who answered, and always hand back the steps
// a human needs to do the search by hand. The instructions are the product;
// the probe is a bonus.
// =============================================================================

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::sources::{error_text, fetch_page};
use crate::text_scanner::{self, BlockReason};

/// Which kind of court a probe targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourtKind {
    /// State court: civil, criminal, tax enforcement by states and cities.
    Tj,
    /// Labor court, through the national PJe consultation portal.
    Trt,
    /// Federal court: federal tax enforcement, social security.
    Trf,
}

impl CourtKind {
    pub fn source_label(self) -> &'static str {
        match self {
            CourtKind::Tj => "TJ",
            CourtKind::Trt => "TRT_PJe_JT",
            CourtKind::Trf => "TRF",
        }
    }

    /// Marker reported instead of a probe when no URL could be resolved.
    pub fn unavailable_note(self) -> &'static str {
        match self {
            CourtKind::Tj => "tj_url_indisponivel",
            CourtKind::Trt => "trt_url_indisponivel",
            CourtKind::Trf => "trf_url_indisponivel",
        }
    }

    /// How to run the search by hand. Independent of what the probe saw.
    pub fn manual_instructions(self) -> &'static [&'static str] {
        match self {
            CourtKind::Tj => &[
                "Abra o site do TJ.",
                "Procure por 'Consulta Processual' ou 'Consulta de Processos'.",
                "Tente pesquisar por CNPJ (se existir campo) ou por razão social.",
                "Se houver captcha/JS, a consulta precisará ser manual.",
            ],
            CourtKind::Trt => &[
                "Abra o PJe - Consulta Processual.",
                "Selecione o grau (1º/2º) se solicitado.",
                "Pesquise por CNPJ e/ou razão social.",
                "Se o portal pedir captcha, registre como bloqueado e faça manualmente.",
            ],
            CourtKind::Trf => &[
                "Abra o site do TRF competente.",
                "Procure por 'Consulta Processual' (e-Proc/PJe/Consulta Pública).",
                "Pesquise por CNPJ/razão social quando disponível.",
                "Se houver captcha/JS, a consulta precisará ser manual.",
            ],
        }
    }
}

/// What happened when we knocked.
///
/// `ok` is true only for a 200 with no block signature. A transport error
/// sets `error` and skips classification; an unresolvable portal sets `note`
/// and has no `url`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProbeResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub ok: bool,
    pub block_reason: Option<BlockReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

impl ProbeResult {
    fn unavailable(kind: CourtKind) -> Self {
        Self {
            url: None,
            http_status: None,
            ok: false,
            block_reason: None,
            error: None,
            note: Some(kind.unavailable_note()),
        }
    }
}

/// One court, one probe, and the manual fallback.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CourtAttempt {
    pub source: &'static str,
    pub probe: ProbeResult,
    pub manual_instructions: &'static [&'static str],
}

/// GET a portal and classify the answer.
pub async fn probe(client: &Client, url: &str, timeout: Duration) -> ProbeResult {
    match fetch_page(client, url, timeout).await {
        Ok(page) => {
            let block_reason = text_scanner::detect_block_reason(&page.body);
            let ok = page.status == 200 && block_reason.is_none();
            debug!(
                url = url,
                status = page.status,
                block_reason = ?block_reason,
                ok = ok,
                "Court probe complete"
            );
            ProbeResult {
                url: Some(url.to_string()),
                http_status: Some(page.status),
                ok,
                block_reason,
                error: None,
                note: None,
            }
        }
        Err(e) => {
            warn!(url = url, error = %e, "Court probe: request failed");
            ProbeResult {
                url: Some(url.to_string()),
                http_status: None,
                ok: false,
                block_reason: None,
                error: Some(error_text(&e)),
                note: None,
            }
        }
    }
}

/// Probe a court if we know where it lives; otherwise record that we don't.
pub async fn attempt(
    client: &Client,
    kind: CourtKind,
    url: Option<&str>,
    timeout: Duration,
) -> CourtAttempt {
    let probe = match url {
        Some(url) => probe(client, url, timeout).await,
        None => ProbeResult::unavailable(kind),
    };
    CourtAttempt {
        source: kind.source_label(),
        probe,
        manual_instructions: kind.manual_instructions(),
    }
}
