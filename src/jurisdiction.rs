// =============================================================================
// jurisdiction.rs — WHICH COURTS CARE ABOUT THIS COMPANY?
// =============================================================================
//
// Brazil has 27 federative units, 6 regional federal courts (TRF) and 24
// regional labor courts (TRT). Which ones have jurisdiction over a company is
// decided by the state it is registered in, and that mapping changes about
// once a decade (TRF6 split off from TRF1 in 2022 to take Minas Gerais).
//
// So: two static tables and some string templating. No network calls happen
// in this module.
// =============================================================================

use serde::Serialize;

use crate::config::Config;

/// State -> regional federal court.
const TRF_BY_UF: &[(&str, &str)] = &[
    // TRF1
    ("AC", "TRF1"), ("AM", "TRF1"), ("AP", "TRF1"), ("BA", "TRF1"), ("DF", "TRF1"),
    ("GO", "TRF1"), ("MA", "TRF1"), ("MT", "TRF1"), ("PA", "TRF1"), ("PI", "TRF1"),
    ("RO", "TRF1"), ("RR", "TRF1"), ("TO", "TRF1"),
    // TRF2
    ("RJ", "TRF2"), ("ES", "TRF2"),
    // TRF3
    ("SP", "TRF3"), ("MS", "TRF3"),
    // TRF4
    ("PR", "TRF4"), ("SC", "TRF4"), ("RS", "TRF4"),
    // TRF5
    ("AL", "TRF5"), ("CE", "TRF5"), ("PB", "TRF5"), ("PE", "TRF5"), ("RN", "TRF5"),
    ("SE", "TRF5"),
    // TRF6
    ("MG", "TRF6"),
];

/// State -> regional labor court.
const TRT_BY_UF: &[(&str, &str)] = &[
    ("RJ", "TRT1"),
    ("MG", "TRT3"),
    ("RS", "TRT4"),
    ("BA", "TRT5"),
    ("PE", "TRT6"),
    ("CE", "TRT7"),
    ("PA", "TRT8"), ("AP", "TRT8"),
    ("PR", "TRT9"),
    ("DF", "TRT10"), ("TO", "TRT10"),
    ("AM", "TRT11"), ("RR", "TRT11"),
    ("SC", "TRT12"),
    ("PB", "TRT13"),
    ("RO", "TRT14"), ("AC", "TRT14"),
    ("MA", "TRT16"),
    ("ES", "TRT17"),
    ("GO", "TRT18"),
    ("AL", "TRT19"),
    ("SE", "TRT20"),
    ("RN", "TRT21"),
    ("PI", "TRT22"),
    ("MT", "TRT23"),
    ("MS", "TRT24"),
    // São Paulo is split: TRT2 covers greater São Paulo, TRT15 (Campinas)
    // the interior. Both are valid until we know the municipality.
    ("SP", "TRT2/TRT15"),
];

/// Federal court region -> public home page.
const TRF_HOME: &[(&str, &str)] = &[
    ("TRF1", "https://portal.trf1.jus.br"),
    ("TRF2", "https://www.trf2.jus.br"),
    ("TRF3", "https://www.trf3.jus.br"),
    ("TRF4", "https://www.trf4.jus.br"),
    ("TRF5", "https://www.trf5.jus.br"),
    ("TRF6", "https://www.trf6.jus.br"),
];

fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Regional federal court for an upper-cased state code.
pub fn trf_for(uf: &str) -> Option<&'static str> {
    lookup(TRF_BY_UF, uf)
}

/// Regional labor court label for an upper-cased state code. The label is
/// opaque: São Paulo yields a compound "TRT2/TRT15".
pub fn trt_for(uf: &str) -> Option<&'static str> {
    lookup(TRT_BY_UF, uf)
}

/// Home page of a federal court region, when one is on record.
pub fn trf_home(trf: &str) -> Option<&'static str> {
    lookup(TRF_HOME, trf)
}

/// Trim and upper-case a state code. Anything that is not exactly two ASCII
/// letters becomes `None`: the code is pasted into portal host names.
pub fn normalize_uf(uf: Option<&str>) -> Option<String> {
    let uf = uf?.trim();
    if uf.len() == 2 && uf.bytes().all(|b| b.is_ascii_alphabetic()) {
        Some(uf.to_ascii_uppercase())
    } else {
        None
    }
}

/// Navigation links for a company. Entries are `null` when they cannot be
/// built from what we know.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JurisdictionLinks {
    pub cadastro_base: Option<String>,
    pub jusbrasil_busca: Option<String>,
    pub tj_home: Option<String>,
    pub trt_pje: Option<String>,
    pub trf_home: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JurisdictionInfo {
    pub uf: Option<String>,
    pub municipio: Option<String>,
    pub trf: Option<String>,
    pub trt: Option<String>,
    pub links: JurisdictionLinks,
}

/// Resolve courts and links for a company.
///
/// `name` is only used to build the indexer search link when no identifier
/// is available; the identifier always wins when both are present.
pub fn resolve(
    uf: Option<&str>,
    municipio: Option<&str>,
    cnpj: &str,
    name: Option<&str>,
    config: &Config,
) -> JurisdictionInfo {
    let uf = normalize_uf(uf);
    let trf = uf.as_deref().and_then(trf_for);
    let trt = uf.as_deref().and_then(trt_for);

    let query = if !cnpj.is_empty() {
        Some(cnpj)
    } else {
        name.map(str::trim).filter(|n| !n.is_empty())
    };

    let links = JurisdictionLinks {
        cadastro_base: Some(config.registry_home_url.clone()),
        jusbrasil_busca: query.map(|q| config.jusbrasil_url(q)),
        tj_home: uf.as_deref().map(|u| config.tj_home_url(u)),
        trt_pje: Some(config.trt_pje_url.clone()),
        trf_home: trf.and_then(trf_home).map(str::to_string),
    };

    JurisdictionInfo {
        uf,
        municipio: municipio.map(str::to_string),
        trf: trf.map(str::to_string),
        trt: trt.map(str::to_string),
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_UFS: [&str; 27] = [
        "AC", "AL", "AM", "AP", "BA", "CE", "DF", "ES", "GO", "MA", "MG", "MS", "MT", "PA",
        "PB", "PE", "PI", "PR", "RJ", "RN", "RO", "RR", "RS", "SC", "SE", "SP", "TO",
    ];

    fn config() -> Config {
        Config::for_mock_server("http://mock")
    }

    #[test]
    fn test_every_state_has_both_regions() {
        assert_eq!(TRF_BY_UF.len(), 27);
        assert_eq!(TRT_BY_UF.len(), 27);
        for uf in ALL_UFS {
            assert!(trf_for(uf).is_some(), "no TRF for {}", uf);
            assert!(trt_for(uf).is_some(), "no TRT for {}", uf);
        }
    }

    #[test]
    fn test_resolve_maps_present_states() {
        for uf in ALL_UFS {
            let info = resolve(Some(uf), None, "11222333000144", None, &config());
            assert_eq!(info.trf.as_deref(), trf_for(uf));
            assert_eq!(info.trt.as_deref(), trt_for(uf));
        }
    }

    #[test]
    fn test_unknown_or_missing_state_resolves_to_null() {
        for uf in [None, Some(""), Some("   "), Some("XX"), Some("BR")] {
            let info = resolve(uf, None, "11222333000144", None, &config());
            assert_eq!(info.trf, None);
            assert_eq!(info.trt, None);
            assert_eq!(info.links.trf_home, None);
        }
        let info = resolve(None, None, "11222333000144", None, &config());
        assert_eq!(info.uf, None);
        assert_eq!(info.links.tj_home, None);
    }

    #[test]
    fn test_state_code_is_trimmed_and_uppercased() {
        let info = resolve(Some(" rj "), Some("Niterói"), "11222333000144", None, &config());
        assert_eq!(info.uf.as_deref(), Some("RJ"));
        assert_eq!(info.trf.as_deref(), Some("TRF2"));
        assert_eq!(info.trt.as_deref(), Some("TRT1"));
        assert_eq!(info.municipio.as_deref(), Some("Niterói"));
        assert_eq!(info.links.tj_home.as_deref(), Some("http://mock/tjrj"));
        assert_eq!(info.links.trf_home.as_deref(), Some("https://www.trf2.jus.br"));
    }

    #[test]
    fn test_malformed_state_code_is_unresolved() {
        for uf in ["@169.254.169.254/", "s", "SPX", "s p", "1A", "ÇA", "sp.evil.com"] {
            assert_eq!(normalize_uf(Some(uf)), None, "{}", uf);
            let info = resolve(Some(uf), None, "11222333000144", None, &config());
            assert_eq!(info.uf, None);
            assert_eq!(info.links.tj_home, None);
        }
        assert_eq!(normalize_uf(Some(" mg\n")).as_deref(), Some("MG"));
    }

    #[test]
    fn test_sao_paulo_labor_region_is_compound() {
        let sp = trt_for("SP").unwrap();
        assert!(sp.contains('/'));
        let singles: Vec<&str> = TRT_BY_UF
            .iter()
            .filter(|(uf, _)| *uf != "SP")
            .map(|(_, trt)| *trt)
            .collect();
        assert!(!singles.contains(&sp));
        assert!(singles.iter().all(|t| !t.contains('/')));
    }

    #[test]
    fn test_search_link_prefers_cnpj_over_name() {
        let info = resolve(None, None, "11222333000144", Some("ACME LTDA"), &config());
        assert_eq!(
            info.links.jusbrasil_busca.as_deref(),
            Some("http://mock/jusbrasil/busca?q=11222333000144")
        );

        let info = resolve(None, None, "", Some("ACME LTDA"), &config());
        assert_eq!(
            info.links.jusbrasil_busca.as_deref(),
            Some("http://mock/jusbrasil/busca?q=ACME%20LTDA")
        );

        let info = resolve(None, None, "", None, &config());
        assert_eq!(info.links.jusbrasil_busca, None);
    }

    #[test]
    fn test_static_links_always_present() {
        let info = resolve(None, None, "", None, &config());
        assert_eq!(info.links.cadastro_base.as_deref(), Some("https://brasilapi.com.br"));
        assert_eq!(
            info.links.trt_pje.as_deref(),
            Some("http://mock/pje/consultaprocessual/")
        );
    }
}
