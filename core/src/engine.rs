use crate::coverage::{analyze_schemas, build_report};
use crate::error::{CoreError, Result};
use crate::model::{CoverageReport, Diagnostics, SchemaAnalysis};
use crate::openapi::ApiDescription;
use crate::resource::ResourceAnalyzer;
use crate::scanner::SourceScanner;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where to read from, where to write to, and which analyses to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub openapi_path: PathBuf,
    pub provider_dir: PathBuf,
    pub output_path: PathBuf,
    pub html_output: Option<PathBuf>,
    pub verbose: bool,
    pub analyze_schemas: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            openapi_path: PathBuf::from("api/openapi.json"),
            provider_dir: PathBuf::from("bastion/"),
            output_path: PathBuf::from("coverage-report.json"),
            html_output: None,
            verbose: false,
            analyze_schemas: true,
        }
    }
}

pub struct CoverageEngine {
    config: AnalyzerConfig,
    scanner: SourceScanner,
    resources: ResourceAnalyzer,
}

impl CoverageEngine {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        Ok(Self {
            config,
            scanner: SourceScanner::new()?,
            resources: ResourceAnalyzer::new(),
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Runs the whole pipeline. Only a bad API description or a missing
    /// provider directory fail; per-file problems land in the diagnostics.
    pub fn analyze(&mut self) -> Result<CoverageReport> {
        tracing::info!("Loading API description from {}", self.config.openapi_path.display());
        let api = ApiDescription::load(&self.config.openapi_path)?;
        tracing::info!(
            "API description has {} paths and {} schemas",
            api.paths.len(),
            api.components.schemas.len()
        );

        let root = &self.config.provider_dir;
        if !root.exists() {
            return Err(CoreError::MissingSourceDir(root.display().to_string()));
        }

        tracing::info!("Scanning provider sources in {}", root.display());
        let scan = self.scanner.scan_directory(root);
        let mut diagnostics = scan.diagnostics;

        let mut walk_diagnostics = Diagnostics::default();
        let (resources, data_sources) = self.resources.analyze_directory(root, &mut walk_diagnostics);
        merge_resource_diagnostics(&mut diagnostics, walk_diagnostics);

        let schema_analysis = if self.config.analyze_schemas {
            tracing::info!("Analyzing schema property coverage");
            analyze_schemas(&api, &resources, &data_sources)
        } else {
            SchemaAnalysis::default()
        };

        let report = build_report(
            &api,
            &scan.endpoints,
            schema_analysis,
            resources,
            data_sources,
            diagnostics,
        );
        tracing::info!(
            "Endpoint coverage: {}/{} ({:.1}%)",
            report.covered_endpoints,
            report.total_endpoints,
            report.coverage_percent
        );
        Ok(report)
    }
}

/// The resource pass walks the same files as the scan; walk errors it repeats
/// are not recorded twice.
fn merge_resource_diagnostics(into: &mut Diagnostics, from: Diagnostics) {
    into.found_resources.extend(from.found_resources);
    into.found_data_sources.extend(from.found_data_sources);
    for error in from.errors {
        if !into.errors.contains(&error) {
            into.errors.push(error);
        }
    }
}
