use super::normalize::normalize_endpoints;
use super::{walk_source_files, EndpointExtractor, SourceFile, StructuralExtractor, TextualExtractor};
use crate::ast::GoParser;
use crate::error::Result;
use crate::model::{Diagnostics, ExtractedEndpoint};
use crate::resource::FileKind;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Output of a scan: normalized endpoints plus what happened along the way.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub endpoints: BTreeMap<String, ExtractedEndpoint>,
    pub diagnostics: Diagnostics,
}

/// Runs every registered extractor over each eligible file of a tree.
pub struct SourceScanner {
    parser: GoParser,
    extractors: Vec<Box<dyn EndpointExtractor>>,
}

impl SourceScanner {
    /// Scanner with the structural and textual extractors registered.
    pub fn new() -> Result<Self> {
        let mut scanner = Self::empty()?;
        scanner.register_extractor(StructuralExtractor::new());
        scanner.register_extractor(TextualExtractor::new());
        Ok(scanner)
    }

    pub fn empty() -> Result<Self> {
        Ok(Self {
            parser: GoParser::new()?,
            extractors: Vec::new(),
        })
    }

    pub fn register_extractor<E: EndpointExtractor + 'static>(&mut self, extractor: E) {
        self.extractors.push(Box::new(extractor));
    }

    /// Parses one file and unions the findings of all extractors into `raw`.
    /// Read and parse failures are recorded and the file is skipped.
    pub fn scan_file(
        &mut self,
        path: &Path,
        raw: &mut BTreeMap<String, Vec<String>>,
        diagnostics: &mut Diagnostics,
    ) {
        let file_path = path.to_string_lossy().to_string();
        diagnostics.files_analyzed += 1;
        diagnostics.analyzed_files.push(file_path.clone());
        tracing::debug!("Analyzing file: {}", file_path);

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                diagnostics.files_with_errors += 1;
                diagnostics.record_error(format!("Read error in {}: {}", file_path, e));
                return;
            }
        };

        let ast = match self.parser.parse_file(path, &content) {
            Ok(ast) => ast,
            Err(e) => {
                diagnostics.files_with_errors += 1;
                diagnostics.record_error(format!("Parse error in {}: {}", file_path, e));
                return;
            }
        };

        let kind = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(FileKind::classify)
            .unwrap_or(FileKind::Support);

        let file = SourceFile {
            path: path.to_path_buf(),
            content,
            kind,
            ast,
        };

        for extractor in &self.extractors {
            for call in extractor.extract(&file) {
                tracing::debug!(
                    "  {} found: {} {} ({}:{})",
                    call.detector,
                    call.method,
                    call.path,
                    call.file_path,
                    call.line
                );
                diagnostics.total_api_calls_found += 1;
                diagnostics
                    .found_endpoints
                    .entry(call.path.clone())
                    .or_default()
                    .push(call.method.clone());
                raw.entry(call.path).or_default().push(call.method);
            }
        }
    }

    /// Walks `root` and returns the normalized endpoint map.
    pub fn scan_directory(&mut self, root: &Path) -> ScanResult {
        let mut diagnostics = Diagnostics::default();
        let mut raw: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for path in walk_source_files(root, &mut diagnostics) {
            self.scan_file(&path, &mut raw, &mut diagnostics);
        }

        let endpoints = normalize_endpoints(&raw);
        tracing::info!(
            "Scanned {} files, {} raw API calls, {} endpoints",
            diagnostics.files_analyzed,
            diagnostics.total_api_calls_found,
            endpoints.len()
        );

        ScanResult {
            endpoints,
            diagnostics,
        }
    }
}
