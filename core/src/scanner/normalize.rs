use crate::model::{ExtractedEndpoint, HttpMethod};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn version_prefix() -> &'static Regex {
    static VERSION_PREFIX: OnceLock<Regex> = OnceLock::new();
    VERSION_PREFIX.get_or_init(|| Regex::new(r"^/api/v\d+\.\d+").unwrap())
}

/// Cleans raw findings into canonical endpoints.
///
/// Paths lose any query string, are trimmed of whitespace and trailing slashes,
/// must start with `/` and be at least two characters long, and lose a leading
/// `/api/vX.Y` prefix.
/// Methods are canonicalized and de-duplicated; raw paths that collapse to the
/// same endpoint have their methods merged.
pub fn normalize_endpoints(raw: &BTreeMap<String, Vec<String>>) -> BTreeMap<String, ExtractedEndpoint> {
    let mut normalized: BTreeMap<String, ExtractedEndpoint> = BTreeMap::new();

    for (raw_url, methods) in raw {
        let Some(clean_url) = normalize_path(raw_url) else {
            continue;
        };

        let canonical: Vec<HttpMethod> = methods
            .iter()
            .filter_map(|m| HttpMethod::canonicalize(m))
            .collect();
        if canonical.is_empty() {
            continue;
        }

        tracing::debug!("Normalized: {} -> {} with methods {:?}", raw_url, clean_url, canonical);

        let endpoint = normalized
            .entry(clean_url.clone())
            .or_insert_with(|| ExtractedEndpoint::new(clean_url));
        for method in canonical {
            endpoint.add_method(method);
        }
    }

    normalized
}

fn normalize_path(raw_url: &str) -> Option<String> {
    let without_query = raw_url.split('?').next().unwrap_or(raw_url);
    let clean = without_query.trim().trim_end_matches('/');
    if clean.len() < 2 || !clean.starts_with('/') {
        return None;
    }

    let stripped = version_prefix().replace(clean, "");
    if stripped.is_empty() {
        return Some("/".to_string());
    }
    if !stripped.starts_with('/') {
        return None;
    }
    Some(stripped.into_owned())
}
