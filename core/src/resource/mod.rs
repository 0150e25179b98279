// Resource module - 资源分析模块
// 从 resource_*/data_source_* 文件中提取 schema 属性、CRUD 操作和相关端点

use crate::model::{Diagnostics, Operation, Property, ResourceCoverage};
use crate::scanner::walk_source_files;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const RESOURCE_PREFIX: &str = "resource_";
pub const DATA_SOURCE_PREFIX: &str = "data_source_";

const GO_KEYWORDS: &[&str] = &[
    "package", "import", "func", "var", "const", "type", "struct", "interface", "map", "chan",
    "select", "case", "default", "if", "else", "switch", "for", "range", "go", "defer", "return",
    "break", "continue", "fallthrough", "goto",
];

/// Role of a source file, decided by its file-name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Resource,
    DataSource,
    Support,
}

impl FileKind {
    pub fn classify(file_name: &str) -> Self {
        if file_name.starts_with(RESOURCE_PREFIX) {
            FileKind::Resource
        } else if file_name.starts_with(DATA_SOURCE_PREFIX) {
            FileKind::DataSource
        } else {
            FileKind::Support
        }
    }

    /// `resource_user.go` -> `user`. `None` for support files or an empty name.
    pub fn derive_name(file_name: &str) -> Option<String> {
        let prefix = match Self::classify(file_name) {
            FileKind::Resource => RESOURCE_PREFIX,
            FileKind::DataSource => DATA_SOURCE_PREFIX,
            FileKind::Support => return None,
        };
        let name = file_name.strip_prefix(prefix)?;
        let name = match name.rfind('.') {
            Some(dot) => &name[..dot],
            None => name,
        };
        (!name.is_empty()).then(|| name.to_string())
    }
}

pub struct ResourceAnalyzer {
    schema_block: Regex,
    type_pattern: Regex,
    required_pattern: Regex,
    optional_pattern: Regex,
    computed_pattern: Regex,
    simple_property: Regex,
    operation_patterns: Vec<(Operation, Vec<Regex>)>,
    endpoint_patterns: Vec<Regex>,
}

impl ResourceAnalyzer {
    pub fn new() -> Self {
        let operation_patterns = Operation::ALL
            .iter()
            .map(|op| {
                let verb = op.verb();
                let patterns = vec![
                    Regex::new(&format!("resource{}", verb)).unwrap(),
                    Regex::new(&format!("{}:", verb)).unwrap(),
                    Regex::new(&format!("func.*{}", verb)).unwrap(),
                ];
                (*op, patterns)
            })
            .collect();

        Self {
            schema_block: Regex::new(
                r#""([a-zA-Z_][a-zA-Z0-9_]*)"\s*:\s*&?schema\.Schema\s*\{([^}]+)\}"#,
            )
            .unwrap(),
            type_pattern: Regex::new(r"Type:\s*schema\.Type([A-Za-z]+)").unwrap(),
            required_pattern: Regex::new(r"Required:\s*(true|false)").unwrap(),
            optional_pattern: Regex::new(r"Optional:\s*(true|false)").unwrap(),
            computed_pattern: Regex::new(r"Computed:\s*(true|false)").unwrap(),
            simple_property: Regex::new(r#""([a-zA-Z_][a-zA-Z0-9_]*)"\s*:"#).unwrap(),
            operation_patterns,
            endpoint_patterns: vec![
                Regex::new(r#""(/[a-zA-Z0-9_/-]+)""#).unwrap(),
                Regex::new(r#"\.newRequest\([^,]+,\s*"([^"]+)""#).unwrap(),
                Regex::new(r#"fmt\.Sprintf\("([^"]*%[^"]*)"[^)]*\)"#).unwrap(),
            ],
        }
    }

    pub fn analyze_resource(&self, name: &str, content: &str) -> ResourceCoverage {
        let mut coverage = ResourceCoverage::new(name);
        coverage.schema_properties = self.extract_schema_properties(content);
        coverage.supported_operations = self.infer_operations(content);
        coverage.related_endpoints = self.extract_related_endpoints(content);

        tracing::debug!(
            "  Resource {}: {} properties, {} operations, {} endpoints",
            name,
            coverage.schema_properties.len(),
            coverage.supported_operations.len(),
            coverage.related_endpoints.len()
        );
        coverage
    }

    /// Data sources only ever read.
    pub fn analyze_data_source(&self, name: &str, content: &str) -> ResourceCoverage {
        let mut coverage = ResourceCoverage::new(name);
        coverage.schema_properties = self.extract_schema_properties(content);
        coverage.supported_operations = vec![Operation::Read];
        coverage.related_endpoints = self.extract_related_endpoints(content);
        coverage
    }

    /// Typed `schema.Schema{...}` blocks first; loose `"name":` keys otherwise.
    pub fn extract_schema_properties(&self, content: &str) -> BTreeMap<String, Property> {
        let properties = self.extract_schema_block_properties(content);
        if properties.is_empty() {
            self.extract_simple_properties(content)
        } else {
            properties
        }
    }

    fn extract_schema_block_properties(&self, content: &str) -> BTreeMap<String, Property> {
        let mut properties = BTreeMap::new();

        for cap in self.schema_block.captures_iter(content) {
            let name = &cap[1];
            let block = &cap[2];
            let mut property = Property::new(name, "unknown").into_covered();

            if let Some(t) = self.type_pattern.captures(block) {
                property.prop_type = t[1].to_lowercase();
                property.source_type = Some(format!("Type{}", &t[1]));
            }

            if let Some(r) = self.required_pattern.captures(block) {
                property.required = &r[1] == "true";
            } else if let Some(o) = self.optional_pattern.captures(block) {
                property.required = &o[1] != "true";
            }

            // computed properties are never required
            if self
                .computed_pattern
                .captures(block)
                .map_or(false, |c| &c[1] == "true")
            {
                property.required = false;
            }

            tracing::debug!(
                "    Found property: {} (type: {}, required: {})",
                name,
                property.prop_type,
                property.required
            );
            properties.insert(name.to_string(), property);
        }

        properties
    }

    fn extract_simple_properties(&self, content: &str) -> BTreeMap<String, Property> {
        let mut properties = BTreeMap::new();

        for cap in self.simple_property.captures_iter(content) {
            let name = &cap[1];
            if GO_KEYWORDS.contains(&name) || name.starts_with("Test") {
                continue;
            }
            properties.insert(name.to_string(), Property::new(name, "unknown").into_covered());
        }

        properties
    }

    pub fn infer_operations(&self, content: &str) -> Vec<Operation> {
        let mut operations = Vec::new();
        for (op, patterns) in &self.operation_patterns {
            if patterns.iter().any(|p| p.is_match(content)) && !operations.contains(op) {
                operations.push(*op);
            }
        }
        operations
    }

    pub fn extract_related_endpoints(&self, content: &str) -> Vec<String> {
        let mut endpoints: Vec<String> = Vec::new();

        for pattern in &self.endpoint_patterns {
            for cap in pattern.captures_iter(content) {
                let endpoint = &cap[1];
                if !endpoint.starts_with('/') || endpoint.len() <= 1 {
                    continue;
                }
                let endpoint = endpoint.strip_suffix('/').unwrap_or(endpoint);
                if !endpoints.iter().any(|e| e == endpoint) {
                    endpoints.push(endpoint.to_string());
                }
            }
        }

        endpoints
    }

    /// Analyzes every resource and data-source file under `root`.
    /// Later files overwrite earlier ones that derive the same name.
    pub fn analyze_directory(
        &self,
        root: &Path,
        diagnostics: &mut Diagnostics,
    ) -> (BTreeMap<String, ResourceCoverage>, BTreeMap<String, ResourceCoverage>) {
        let mut resources = BTreeMap::new();
        let mut data_sources = BTreeMap::new();

        for path in walk_source_files(root, diagnostics) {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let kind = FileKind::classify(file_name);
            let Some(name) = FileKind::derive_name(file_name) else {
                continue;
            };

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    diagnostics.record_error(format!("Read error in {}: {}", path.display(), e));
                    continue;
                }
            };

            tracing::debug!("Analyzing {:?} file: {}", kind, path.display());

            match kind {
                FileKind::Resource => {
                    resources.insert(name.clone(), self.analyze_resource(&name, &content));
                    diagnostics.found_resources.push(name);
                }
                FileKind::DataSource => {
                    data_sources.insert(name.clone(), self.analyze_data_source(&name, &content));
                    diagnostics.found_data_sources.push(name);
                }
                FileKind::Support => {}
            }
        }

        tracing::info!(
            "Found {} resources and {} data sources",
            resources.len(),
            data_sources.len()
        );
        (resources, data_sources)
    }
}

impl Default for ResourceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
