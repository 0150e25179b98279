use crate::matcher::PropertyMatcher;
use crate::model::{
    Coverage, CoverageReport, Diagnostics, ExtractedEndpoint, ResourceCoverage, SchemaAnalysis,
    SchemaCoverage,
};
use crate::openapi::ApiDescription;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn path_placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{[^}]+\}").unwrap())
}

/// `covered / total * 100`, or 0 when there is nothing to cover.
pub fn percent(covered: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64 * 100.0
    }
}

/// Splits `coverage.methods` into covered and missing against one endpoint.
fn split_methods(coverage: &mut Coverage, endpoint: &ExtractedEndpoint) {
    for method in &coverage.methods {
        if endpoint.has_method(method) {
            coverage.covered.push(method.clone());
        } else {
            coverage.missing.push(method.clone());
        }
    }
    coverage.matched_path = Some(endpoint.path.clone());
}

/// Coverage of one declared path: exact match first, then the first extracted
/// path that is a prefix either way of the declared path without `{...}`
/// placeholders.
pub fn endpoint_coverage(
    path: &str,
    path_item: &BTreeMap<String, Value>,
    extracted: &BTreeMap<String, ExtractedEndpoint>,
) -> Coverage {
    let methods = ApiDescription::declared_methods(path_item);
    let mut coverage = Coverage {
        path: path.to_string(),
        methods,
        covered: Vec::new(),
        missing: Vec::new(),
        matched_path: None,
    };

    if coverage.methods.is_empty() {
        return coverage;
    }

    if let Some(endpoint) = extracted.get(path) {
        split_methods(&mut coverage, endpoint);
        return coverage;
    }

    let base_path = path_placeholder().replace_all(path, "");
    let base_path = base_path.strip_suffix('/').unwrap_or(&base_path);

    let candidate = extracted
        .values()
        .find(|e| e.path.starts_with(base_path) || base_path.starts_with(e.path.as_str()));

    match candidate {
        Some(endpoint) => split_methods(&mut coverage, endpoint),
        None => coverage.missing = coverage.methods.clone(),
    }

    coverage
}

/// Scores every declared schema property against the properties found in source.
pub fn analyze_schemas(
    api: &ApiDescription,
    resources: &BTreeMap<String, ResourceCoverage>,
    data_sources: &BTreeMap<String, ResourceCoverage>,
) -> SchemaAnalysis {
    let matcher = PropertyMatcher::new(resources, data_sources);
    let mut analysis = SchemaAnalysis::default();

    for (schema_name, schema) in &api.components.schemas {
        let mut coverage = SchemaCoverage {
            schema_name: schema_name.clone(),
            properties: ApiDescription::schema_properties(schema),
            ..Default::default()
        };
        coverage.total_properties = coverage.properties.len();

        tracing::debug!(
            "  Checking coverage for schema '{}' with {} properties against {} sources",
            schema_name,
            coverage.total_properties,
            matcher.source_count()
        );

        for (prop_name, property) in coverage.properties.iter_mut() {
            match matcher.find(schema_name, prop_name) {
                Some(found) => {
                    property.covered = true;
                    coverage.covered_properties += 1;
                    tracing::debug!(
                        "    ✓ Property {}.{} matches {} in {} ({:?})",
                        schema_name,
                        prop_name,
                        found.source_property,
                        found.resource,
                        found.strategy
                    );
                }
                None => {
                    coverage.missing_properties.push(prop_name.clone());
                    tracing::debug!("    ✗ Property {}.{} not found in any resource", schema_name, prop_name);
                }
            }
        }

        analysis.total_schemas += 1;
        if coverage.covered_properties > 0 {
            analysis.covered_schemas += 1;
        }
        analysis.total_properties += coverage.total_properties;
        analysis.covered_properties += coverage.covered_properties;
        analysis.schema_details.insert(schema_name.clone(), coverage);
    }

    analysis.schema_coverage_percent = percent(analysis.covered_schemas, analysis.total_schemas);
    analysis.property_coverage_percent =
        percent(analysis.covered_properties, analysis.total_properties);
    analysis
}

/// Assembles the final report. Every declared path counts toward the total; a
/// path is covered when at least one of its methods is.
pub fn build_report(
    api: &ApiDescription,
    endpoints: &BTreeMap<String, ExtractedEndpoint>,
    schema_analysis: SchemaAnalysis,
    resources: BTreeMap<String, ResourceCoverage>,
    data_sources: BTreeMap<String, ResourceCoverage>,
    diagnostics: Diagnostics,
) -> CoverageReport {
    let mut endpoint_details = BTreeMap::new();
    let mut covered_endpoints = 0;

    for (path, path_item) in &api.paths {
        let coverage = endpoint_coverage(path, path_item, endpoints);
        if coverage.is_covered() {
            covered_endpoints += 1;
        }
        endpoint_details.insert(path.clone(), coverage);
    }

    let total_endpoints = endpoint_details.len();

    CoverageReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_endpoints,
        covered_endpoints,
        coverage_percent: percent(covered_endpoints, total_endpoints),
        endpoint_details,
        schema_analysis,
        resource_analysis: resources,
        data_source_analysis: data_sources,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpMethod, Property};

    fn item(methods: &[&str]) -> BTreeMap<String, Value> {
        methods
            .iter()
            .map(|m| (m.to_string(), Value::Object(Default::default())))
            .collect()
    }

    fn extracted(entries: &[(&str, &[HttpMethod])]) -> BTreeMap<String, ExtractedEndpoint> {
        entries
            .iter()
            .map(|(p, ms)| {
                let mut e = ExtractedEndpoint::new(*p);
                for m in *ms {
                    e.add_method(*m);
                }
                (p.to_string(), e)
            })
            .collect()
    }

    fn assert_partition(c: &Coverage) {
        let mut union: Vec<_> = c.covered.iter().chain(c.missing.iter()).cloned().collect();
        union.sort();
        let mut declared = c.methods.clone();
        declared.sort();
        assert_eq!(union, declared, "covered + missing must equal declared for {}", c.path);
    }

    #[test]
    fn exact_path_match() {
        let found = extracted(&[("/users", &[HttpMethod::Get])]);
        let c = endpoint_coverage("/users", &item(&["get", "post"]), &found);
        assert_eq!(c.covered, vec!["GET"]);
        assert_eq!(c.missing, vec!["POST"]);
        assert_eq!(c.matched_path.as_deref(), Some("/users"));
        assert_partition(&c);
    }

    #[test]
    fn placeholder_path_matches_by_prefix() {
        let found = extracted(&[("/users", &[HttpMethod::Get, HttpMethod::Delete])]);
        let c = endpoint_coverage("/users/{id}", &item(&["get", "delete", "parameters"]), &found);
        assert_eq!(c.covered, vec!["DELETE", "GET"]);
        assert!(c.missing.is_empty());
        assert_partition(&c);
    }

    #[test]
    fn unmatched_path_is_entirely_missing() {
        let found = extracted(&[("/users", &[HttpMethod::Get])]);
        let c = endpoint_coverage("/timeframes/{id}", &item(&["get", "put"]), &found);
        assert!(c.covered.is_empty());
        assert_eq!(c.missing, vec!["GET", "PUT"]);
        assert_eq!(c.matched_path, None);
        assert_partition(&c);
    }

    #[test]
    fn prefix_match_without_common_methods_reports_all_missing() {
        let found = extracted(&[("/devices", &[HttpMethod::Post])]);
        let c = endpoint_coverage("/devices/{id}/services", &item(&["get"]), &found);
        assert!(c.covered.is_empty());
        assert_eq!(c.missing, vec!["GET"]);
        assert_partition(&c);
    }

    #[test]
    fn percent_never_divides_by_zero() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    #[test]
    fn schema_counts_are_consistent() {
        let api = ApiDescription::from_json_str(
            r#"{"components": {"schemas": {
                "UserGet": {"properties": {"displayName": {"type": "string"}, "shoeSize": {}}},
                "Empty": {"type": "object"}
            }}}"#,
        )
        .unwrap();

        let mut user = ResourceCoverage::new("user");
        user.schema_properties.insert(
            "display_name".to_string(),
            Property::new("display_name", "string").into_covered(),
        );
        let resources = BTreeMap::from([("user".to_string(), user)]);
        let analysis = analyze_schemas(&api, &resources, &BTreeMap::new());

        assert_eq!(analysis.total_schemas, 2);
        assert_eq!(analysis.covered_schemas, 1);
        assert_eq!(analysis.schema_coverage_percent, 50.0);
        assert_eq!(analysis.total_properties, 2);
        assert_eq!(analysis.covered_properties, 1);

        let user = &analysis.schema_details["UserGet"];
        assert!(user.properties["displayName"].covered);
        assert_eq!(user.properties["shoeSize"].prop_type, "unknown");
        assert_eq!(user.missing_properties, vec!["shoeSize"]);
        for schema in analysis.schema_details.values() {
            let covered = schema.properties.values().filter(|p| p.covered).count();
            assert_eq!(schema.covered_properties, covered);
            assert!(schema.covered_properties <= schema.total_properties);
        }
    }

    #[test]
    fn report_counts_paths_with_any_covered_method() {
        let api = ApiDescription::from_json_str(
            r#"{"paths": {
                "/users": {"get": {}, "post": {}},
                "/groups": {"get": {}},
                "/health": {"parameters": []}
            }}"#,
        )
        .unwrap();
        let found = extracted(&[("/users", &[HttpMethod::Post])]);

        let report = build_report(
            &api,
            &found,
            SchemaAnalysis::default(),
            BTreeMap::new(),
            BTreeMap::new(),
            Diagnostics::default(),
        );

        assert_eq!(report.total_endpoints, 3);
        assert_eq!(report.covered_endpoints, 1);
        assert!((report.coverage_percent - 100.0 / 3.0).abs() < 1e-9);
        assert!(report.endpoint_details["/health"].methods.is_empty());
    }
}
