use crate::model::ResourceCoverage;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Canonical business terms and the spellings accepted for them.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("id", &["identifier", "uuid"]),
    ("name", &["display_name", "title", "label"]),
    ("description", &["desc", "comment"]),
    ("enabled", &["is_enabled", "active", "is_active"]),
    ("type", &["kind", "category"]),
    ("url", &["uri", "link", "href"]),
    ("host", &["hostname", "server", "address"]),
    ("port", &["port_number"]),
    ("login", &["username", "user_name", "account_login"]),
    ("password", &["secret", "passphrase"]),
];

const VERB_SUFFIXES: &[&str] = &["_get", "_post", "_put", "_delete", "_patch"];

/// Which strategy proved a property covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Exact,
    Normalized,
    Synonym,
    SchemaRelation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMatch {
    pub strategy: MatchStrategy,
    pub resource: String,
    pub source_property: String,
}

/// `displayName` -> `display_name`, `HTTPServer` -> `http_server`.
pub fn camel_to_snake(name: &str) -> String {
    static WORD: OnceLock<Regex> = OnceLock::new();
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    let word = WORD.get_or_init(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());
    let boundary = BOUNDARY.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

    let snake = word.replace_all(name, "${1}_${2}");
    let snake = boundary.replace_all(&snake, "${1}_${2}");
    snake.to_lowercase()
}

/// Case-insensitive equality, directly or after camelCase -> snake_case.
pub fn names_equivalent(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase() || camel_to_snake(a) == camel_to_snake(b)
}

/// Both names belong to the same synonym group.
pub fn synonym_match(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    SYNONYMS.iter().any(|(canonical, variants)| {
        let a_variant = variants.contains(&a.as_str());
        let b_variant = variants.contains(&b.as_str());
        (a == *canonical && b_variant) || (b == *canonical && a_variant) || (a_variant && b_variant)
    })
}

/// Approximate property match: normalized names or synonyms.
pub fn is_property_match(a: &str, b: &str) -> bool {
    names_equivalent(a, b) || synonym_match(a, b)
}

/// Schema name without a trailing HTTP verb suffix (`user_get` -> `user`).
pub fn schema_base_name(schema_name: &str) -> &str {
    VERB_SUFFIXES
        .iter()
        .find_map(|suffix| schema_name.strip_suffix(suffix))
        .unwrap_or(schema_name)
}

/// Looks up API-schema properties among the properties found in source.
pub struct PropertyMatcher<'a> {
    sources: BTreeMap<&'a str, &'a ResourceCoverage>,
}

impl<'a> PropertyMatcher<'a> {
    /// Data sources shadow resources of the same name.
    pub fn new(
        resources: &'a BTreeMap<String, ResourceCoverage>,
        data_sources: &'a BTreeMap<String, ResourceCoverage>,
    ) -> Self {
        let mut sources = BTreeMap::new();
        for (name, coverage) in resources.iter().chain(data_sources.iter()) {
            sources.insert(name.as_str(), coverage);
        }
        Self { sources }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Tries each strategy over every source before moving to the next one.
    pub fn find(&self, schema_name: &str, prop_name: &str) -> Option<PropertyMatch> {
        self.find_exact(prop_name)
            .or_else(|| self.find_by(prop_name, MatchStrategy::Normalized, names_equivalent))
            .or_else(|| self.find_by(prop_name, MatchStrategy::Synonym, synonym_match))
            .or_else(|| self.find_by_schema_name(schema_name, prop_name))
    }

    fn find_exact(&self, prop_name: &str) -> Option<PropertyMatch> {
        self.sources.iter().find_map(|(name, coverage)| {
            coverage
                .schema_properties
                .contains_key(prop_name)
                .then(|| PropertyMatch {
                    strategy: MatchStrategy::Exact,
                    resource: name.to_string(),
                    source_property: prop_name.to_string(),
                })
        })
    }

    fn find_by(
        &self,
        prop_name: &str,
        strategy: MatchStrategy,
        matches: fn(&str, &str) -> bool,
    ) -> Option<PropertyMatch> {
        self.sources.iter().find_map(|(name, coverage)| {
            coverage
                .schema_properties
                .keys()
                .find(|candidate| matches(prop_name, candidate))
                .map(|candidate| PropertyMatch {
                    strategy,
                    resource: name.to_string(),
                    source_property: candidate.clone(),
                })
        })
    }

    fn find_by_schema_name(&self, schema_name: &str, prop_name: &str) -> Option<PropertyMatch> {
        let base = schema_base_name(schema_name);
        self.sources.iter().find_map(|(name, coverage)| {
            let related = name.contains(base) || base.contains(name);
            (related && coverage.schema_properties.contains_key(prop_name)).then(|| PropertyMatch {
                strategy: MatchStrategy::SchemaRelation,
                resource: name.to_string(),
                source_property: prop_name.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Property;

    fn coverage(name: &str, props: &[&str]) -> ResourceCoverage {
        let mut c = ResourceCoverage::new(name);
        for p in props {
            c.schema_properties
                .insert(p.to_string(), Property::new(*p, "unknown").into_covered());
        }
        c
    }

    fn sources(entries: &[(&str, &[&str])]) -> BTreeMap<String, ResourceCoverage> {
        entries
            .iter()
            .map(|(n, ps)| (n.to_string(), coverage(n, ps)))
            .collect()
    }

    #[test]
    fn camel_to_snake_matches_common_shapes() {
        assert_eq!(camel_to_snake("displayName"), "display_name");
        assert_eq!(camel_to_snake("HTTPServer"), "http_server");
        assert_eq!(camel_to_snake("ipSource"), "ip_source");
        assert_eq!(camel_to_snake("already_snake"), "already_snake");
    }

    #[test]
    fn synonym_matching_is_symmetric() {
        let names = ["id", "uuid", "identifier", "enabled", "is_active", "active", "name", "title", "host", "port", "email"];
        for a in names {
            for b in names {
                assert_eq!(synonym_match(a, b), synonym_match(b, a), "{} / {}", a, b);
                assert_eq!(is_property_match(a, b), is_property_match(b, a), "{} / {}", a, b);
            }
        }
        assert!(synonym_match("enabled", "is_active"));
        assert!(synonym_match("active", "is_active"));
        assert!(synonym_match("Login", "user_name"));
        assert!(!synonym_match("port", "host"));
    }

    #[test]
    fn schema_base_name_strips_one_verb_suffix() {
        assert_eq!(schema_base_name("user_get"), "user");
        assert_eq!(schema_base_name("device_delete"), "device");
        assert_eq!(schema_base_name("UserGet"), "UserGet");
    }

    #[test]
    fn strategies_apply_in_order() {
        let resources = sources(&[("user", &["display_name", "is_active", "email"])]);
        let data_sources = sources(&[("version", &["version"])]);
        let matcher = PropertyMatcher::new(&resources, &data_sources);
        assert_eq!(matcher.source_count(), 2);

        let exact = matcher.find("UserGet", "email").unwrap();
        assert_eq!(exact.strategy, MatchStrategy::Exact);

        let normalized = matcher.find("UserGet", "displayName").unwrap();
        assert_eq!(normalized.strategy, MatchStrategy::Normalized);
        assert_eq!(normalized.source_property, "display_name");

        let synonym = matcher.find("Widget", "enabled").unwrap();
        assert_eq!(synonym.strategy, MatchStrategy::Synonym);
        assert_eq!(synonym.resource, "user");

        assert!(matcher.find("Widget", "serial").is_none());
    }

    #[test]
    fn data_sources_shadow_resources() {
        let resources = sources(&[("user", &["email"])]);
        let data_sources = sources(&[("user", &["login"])]);
        let matcher = PropertyMatcher::new(&resources, &data_sources);
        assert!(matcher.find("x", "email").is_none());
        assert!(matcher.find("x", "login").is_some());
    }

    #[test]
    fn schema_relation_requires_exact_property() {
        // The relation strategy needs the exact property, which the exact strategy
        // finds first; exercise it directly.
        let resources = sources(&[("device", &["serial"])]);
        let empty = BTreeMap::new();
        let matcher = PropertyMatcher::new(&resources, &empty);

        let found = matcher.find_by_schema_name("device_get", "serial").unwrap();
        assert_eq!(found.strategy, MatchStrategy::SchemaRelation);
        assert!(matcher.find_by_schema_name("other_get", "serial").is_none());
        assert!(matcher.find_by_schema_name("device_get", "model").is_none());
    }
}
