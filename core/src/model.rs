use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical HTTP verbs recognised in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Fixed scan order used by the textual extractor.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Symbolic constant name as spelled in Go's `net/http` (`MethodGet`, ...).
    pub fn symbol(&self) -> &'static str {
        match self {
            HttpMethod::Get => "MethodGet",
            HttpMethod::Post => "MethodPost",
            HttpMethod::Put => "MethodPut",
            HttpMethod::Delete => "MethodDelete",
            HttpMethod::Patch => "MethodPatch",
        }
    }

    /// Maps a verb (any case) or a symbolic name such as `http.MethodGet`
    /// to its canonical verb. Other tokens, `UNKNOWN` included, yield `None`.
    pub fn canonicalize(token: &str) -> Option<Self> {
        let token = token.trim();
        let token = token.rsplit('.').next().unwrap_or(token);
        let upper = token.to_ascii_uppercase();
        let verb = upper.strip_prefix("METHOD").unwrap_or(&upper);
        match verb {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Read => "READ",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }

    /// Verb as it appears in function names (`resourceUserCreate`).
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Create => "Create",
            Operation::Read => "Read",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema property, either declared by the API description or found in source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub prop_type: String,
    pub required: bool,
    pub covered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, prop_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prop_type: prop_type.into(),
            required: false,
            covered: false,
            source_type: None,
        }
    }

    pub fn into_covered(mut self) -> Self {
        self.covered = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEndpoint {
    pub path: String,
    pub methods: Vec<HttpMethod>,
}

impl ExtractedEndpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            methods: Vec::new(),
        }
    }

    /// Appends `method` unless already present, keeping first-seen order.
    pub fn add_method(&mut self, method: HttpMethod) {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m.as_str() == method)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceCoverage {
    pub resource_name: String,
    pub schema_properties: BTreeMap<String, Property>,
    pub supported_operations: Vec<Operation>,
    pub related_endpoints: Vec<String>,
}

impl ResourceCoverage {
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            ..Default::default()
        }
    }
}

/// Coverage status of one declared API path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    pub path: String,
    pub methods: Vec<String>,
    pub covered: Vec<String>,
    pub missing: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_path: Option<String>,
}

impl Coverage {
    pub fn is_covered(&self) -> bool {
        !self.covered.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaCoverage {
    pub schema_name: String,
    pub total_properties: usize,
    pub covered_properties: usize,
    pub properties: BTreeMap<String, Property>,
    pub missing_properties: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaAnalysis {
    pub total_schemas: usize,
    pub covered_schemas: usize,
    pub schema_coverage_percent: f64,
    pub total_properties: usize,
    pub covered_properties: usize,
    pub property_coverage_percent: f64,
    pub schema_details: BTreeMap<String, SchemaCoverage>,
}

/// Observability block carried in the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub files_analyzed: usize,
    pub files_with_errors: usize,
    pub total_api_calls_found: usize,
    pub analyzed_files: Vec<String>,
    pub errors: Vec<String>,
    pub found_endpoints: BTreeMap<String, Vec<String>>,
    pub found_resources: Vec<String>,
    pub found_data_sources: Vec<String>,
}

impl Diagnostics {
    pub fn record_error(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.errors.push(message);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub generated_at: String,
    pub total_endpoints: usize,
    pub covered_endpoints: usize,
    pub coverage_percent: f64,
    pub endpoint_details: BTreeMap<String, Coverage>,
    pub schema_analysis: SchemaAnalysis,
    pub resource_analysis: BTreeMap<String, ResourceCoverage>,
    pub data_source_analysis: BTreeMap<String, ResourceCoverage>,
    pub diagnostics: Diagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_accepts_symbols_and_literals() {
        assert_eq!(HttpMethod::canonicalize("MethodGet"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::canonicalize("http.MethodDelete"), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::canonicalize(" patch "), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::canonicalize("UNKNOWN"), None);
        assert_eq!(HttpMethod::canonicalize("OPTIONS"), None);
        assert_eq!(HttpMethod::canonicalize(""), None);
    }

    #[test]
    fn add_method_deduplicates_in_order() {
        let mut endpoint = ExtractedEndpoint::new("/users");
        endpoint.add_method(HttpMethod::Post);
        endpoint.add_method(HttpMethod::Get);
        endpoint.add_method(HttpMethod::Post);
        assert_eq!(endpoint.methods, vec![HttpMethod::Post, HttpMethod::Get]);
        assert!(endpoint.has_method("GET"));
        assert!(!endpoint.has_method("PUT"));
    }

    #[test]
    fn methods_serialize_upper_case() {
        let json = serde_json::to_string(&vec![HttpMethod::Get, HttpMethod::Patch]).unwrap();
        assert_eq!(json, r#"["GET","PATCH"]"#);
        let ops = serde_json::to_string(&vec![Operation::Read]).unwrap();
        assert_eq!(ops, r#"["READ"]"#);
    }
}
