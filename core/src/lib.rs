// apicov Core Library
// 核心功能库，包含 OpenAPI 加载、源码扫描、资源分析、属性匹配和覆盖率报告

mod ast;
mod coverage;
mod engine;
mod matcher;
mod model;
mod openapi;
mod report;
mod resource;
mod scanner;

// 重新导出常用类型
pub use ast::{CallExpr, Expr, GoParser, ParsedFile};
pub use coverage::{analyze_schemas, build_report, endpoint_coverage, percent};
pub use engine::{AnalyzerConfig, CoverageEngine};
pub use matcher::{camel_to_snake, is_property_match, schema_base_name, MatchStrategy, PropertyMatch, PropertyMatcher};
pub use model::{
    Coverage, CoverageReport, Diagnostics, ExtractedEndpoint, HttpMethod, Operation, Property,
    ResourceCoverage, SchemaAnalysis, SchemaCoverage,
};
pub use openapi::ApiDescription;
pub use report::{render_html, render_summary, save_html, save_json};
pub use resource::{FileKind, ResourceAnalyzer};
pub use scanner::normalize::normalize_endpoints;
pub use scanner::{
    walk_source_files, ApiCall, EndpointExtractor, ScanResult, SourceFile, SourceScanner,
    StructuralExtractor, TextualExtractor, SUPPORTED_EXTENSIONS,
};

pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum CoreError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("failed to read {path}: {source}")]
        Read {
            path: String,
            #[source]
            source: std::io::Error,
        },

        #[error("Parse error: {0}")]
        Parse(String),

        #[error("AST error: {0}")]
        Ast(String),

        #[error("invalid API description {path}: {message}")]
        ApiDescription { path: String, message: String },

        #[error("provider directory '{0}' does not exist")]
        MissingSourceDir(String),

        #[error("Serialize error: {0}")]
        Serialize(#[from] serde_json::Error),
    }

    pub type Result<T> = std::result::Result<T, CoreError>;
}
