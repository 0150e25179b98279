// Scanner module - 扫描器模块
// 定义端点提取器的核心接口和类型

pub mod manager;
pub mod normalize;
pub mod structural;
pub mod textual;

pub use manager::{ScanResult, SourceScanner};
pub use structural::StructuralExtractor;
pub use textual::TextualExtractor;

use crate::ast::ParsedFile;
use crate::model::Diagnostics;
use crate::resource::FileKind;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Source extensions the scanner understands.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["go"];

/// One raw (method, path) observation, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    pub file_path: String,
    pub line: usize,
    pub detector: String,
    pub method: String,
    pub path: String,
}

/// An eligible file, read and parsed.
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
    pub kind: FileKind,
    pub ast: ParsedFile,
}

impl SourceFile {
    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// 端点提取器 trait - 所有提取策略都需要实现此接口
pub trait EndpointExtractor {
    /// 返回提取器名称
    fn name(&self) -> &'static str;

    /// 从单个文件提取 API 调用
    fn extract(&self, file: &SourceFile) -> Vec<ApiCall>;
}

/// Recursively lists eligible source files under `root`, sorted by name.
/// Walk failures are recorded in `diagnostics` and skipped.
pub fn walk_source_files(root: &Path, diagnostics: &mut Diagnostics) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for result in walker {
        match result {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().map_or(false, |ft| ft.is_file()) && is_source_file(path) {
                    files.push(path.to_path_buf());
                }
            }
            Err(e) => diagnostics.record_error(format!("Walk error in {}: {}", root.display(), e)),
        }
    }

    files
}

/// Supported extension and not a test file (`*_test.go`).
pub fn is_source_file(path: &Path) -> bool {
    let supported = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |ext| SUPPORTED_EXTENSIONS.contains(&ext));

    let is_test = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map_or(false, |stem| stem.ends_with("_test"));

    supported && !is_test
}

/// 1-based line number of a byte offset.
pub(crate) fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}
