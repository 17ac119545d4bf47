// =============================================================================
// text_scanner.rs — READING INDEXER HTML SO HUMANS DON'T HAVE TO
// =============================================================================
//
// Two jobs live here:
//
// 1. Counting legally meaningful Portuguese terms ("execução fiscal",
//    "falência", "recuperação judicial"...) in raw indexer HTML. Every term
//    has accent and no-accent spellings because half the internet types
//    "execucao". memchr's SIMD substring search does the counting.
//
// 2. Recognising when a court portal answered with an anti-bot page instead
//    of content. An Aho-Corasick automaton scans for every known signature
//    at once and the highest-priority category wins.
//
// Counts are weak evidence. A page that says "protesto" three times might be
// about a notary office, a street demonstration, or the company's debts.
// =============================================================================

use aho_corasick::AhoCorasick;
use memchr::memmem;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

/// Maximum number of entries in the ranked findings list.
pub const TOP_FINDINGS_CAP: usize = 6;

/// Keyword taxonomy: canonical key -> literal spellings.
///
/// Counts are summed over the spellings of a key and keys are counted
/// independently, so "execução fiscal" also counts once towards `execucao`.
/// Declared order is the ranking tie-break.
pub const KEY_TERMS: &[(&str, &[&str])] = &[
    ("execucao", &["execução", "execucao"]),
    ("execucao_fiscal", &["execução fiscal", "execucao fiscal"]),
    ("protesto", &["protesto", "cartório", "cartorio"]),
    ("falencia", &["falência", "falencia"]),
    ("recuperacao_judicial", &["recuperação judicial", "recuperacao judicial"]),
    (
        "trabalhista",
        &["trabalhista", "reclamatória", "reclamatoria", "verbas rescisórias", "verbas rescisorias"],
    ),
    ("cobranca", &["cobrança", "cobranca", "cobrança judicial", "cobranca judicial"]),
];

/// One taxonomy key and how many times its spellings appeared.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TermCount {
    pub term: &'static str,
    pub hits: usize,
}

/// Count every taxonomy key in `text`, case-insensitively.
///
/// The result has one entry per key, in declared order, zero-filled.
pub fn count_terms(text: &str) -> Vec<TermCount> {
    let low = text.to_lowercase();
    let haystack = low.as_bytes();

    let counts: Vec<TermCount> = KEY_TERMS
        .iter()
        .map(|&(term, variants)| TermCount {
            term,
            hits: variants
                .iter()
                .map(|v| memmem::find_iter(haystack, v.as_bytes()).count())
                .sum(),
        })
        .collect();

    debug!(
        text_len = text.len(),
        nonzero_terms = counts.iter().filter(|c| c.hits > 0).count(),
        "Term count complete"
    );

    counts
}

/// Rank the non-zero counts, highest first, capped at `cap`.
/// Ties keep their input order.
pub fn top_findings(counts: &[TermCount], cap: usize) -> Vec<TermCount> {
    let mut ranked: Vec<TermCount> = counts.iter().filter(|c| c.hits > 0).cloned().collect();
    // sort_by is stable, so equal counts stay in taxonomy order
    ranked.sort_by(|a, b| b.hits.cmp(&a.hits));
    ranked.truncate(cap);
    ranked
}

/// Why an automated portal probe did not get usable content.
/// Variants are declared in detection priority order.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    Captcha,
    Cloudflare,
    JavascriptRequired,
    AccessDenied,
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::Captcha => write!(f, "captcha"),
            BlockReason::Cloudflare => write!(f, "cloudflare"),
            BlockReason::JavascriptRequired => write!(f, "javascript_required"),
            BlockReason::AccessDenied => write!(f, "access_denied"),
        }
    }
}

/// Lower-case markers of anti-automation pages.
const BLOCK_SIGNATURES: &[(&str, BlockReason)] = &[
    ("captcha", BlockReason::Captcha),
    ("recaptcha", BlockReason::Captcha),
    ("cloudflare", BlockReason::Cloudflare),
    ("attention required", BlockReason::Cloudflare),
    ("enable javascript", BlockReason::JavascriptRequired),
    ("javascript is required", BlockReason::JavascriptRequired),
    ("access denied", BlockReason::AccessDenied),
    ("forbidden", BlockReason::AccessDenied),
];

static BLOCK_AUTOMATON: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::new(BLOCK_SIGNATURES.iter().map(|(marker, _)| *marker))
        .expect("Failed to build block signature automaton")
});

/// Classify a portal response body. When several categories match, the
/// earliest in `BlockReason` order wins regardless of where it appears.
pub fn detect_block_reason(html: &str) -> Option<BlockReason> {
    if html.is_empty() {
        return None;
    }
    let low = html.to_lowercase();
    BLOCK_AUTOMATON
        .find_overlapping_iter(&low)
        .map(|m| BLOCK_SIGNATURES[m.pattern().as_usize()].1)
        .min()
}
