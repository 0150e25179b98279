use super::{line_of, ApiCall, EndpointExtractor, SourceFile};
use crate::model::HttpMethod;
use crate::resource::FileKind;
use regex::Regex;

/// Harvests path-shaped string literals and HTTP method tokens from raw text.
pub struct TextualExtractor {
    url_patterns: Vec<Regex>,
    method_patterns: Vec<(Regex, HttpMethod)>,
}

impl TextualExtractor {
    pub fn new() -> Self {
        let url_patterns = vec![
            Regex::new(r#""(/[a-zA-Z0-9_/-]*[a-zA-Z0-9_])""#).unwrap(),
            Regex::new(r#""/api/v\d+\.\d+(/[a-zA-Z0-9_/-]*[a-zA-Z0-9_])""#).unwrap(),
            Regex::new(r#""(/config/[a-zA-Z0-9_/-]*)""#).unwrap(),
            Regex::new(r#""(/auth[a-zA-Z0-9_/-]*)""#).unwrap(),
            Regex::new(r#""(/users?[a-zA-Z0-9_/-]*)""#).unwrap(),
            Regex::new(r#""(/devices?[a-zA-Z0-9_/-]*)""#).unwrap(),
            Regex::new(r#""(/domains?[a-zA-Z0-9_/-]*)""#).unwrap(),
            Regex::new(r#""(/applications?[a-zA-Z0-9_/-]*)""#).unwrap(),
        ];

        let mut method_patterns = Vec::new();
        for method in HttpMethod::ALL {
            method_patterns.push((
                Regex::new(&format!(r"http\.{}\b", method.symbol())).unwrap(),
                method,
            ));
            method_patterns.push((
                Regex::new(&format!(r#""{}""#, method.as_str())).unwrap(),
                method,
            ));
        }

        Self {
            url_patterns,
            method_patterns,
        }
    }

    /// Every URL match in pattern order, with its line. Overlapping patterns
    /// report the same literal more than once.
    fn find_urls(&self, content: &str) -> Vec<(String, usize)> {
        let mut urls = Vec::new();
        for regex in &self.url_patterns {
            for cap in regex.captures_iter(content) {
                if let Some(m) = cap.get(1) {
                    urls.push((m.as_str().to_string(), line_of(content, m.start())));
                }
            }
        }
        urls
    }

    fn find_methods(&self, content: &str) -> Vec<HttpMethod> {
        let mut methods = Vec::new();
        for (regex, method) in &self.method_patterns {
            if !methods.contains(method) && regex.is_match(content) {
                methods.push(*method);
            }
        }
        methods
    }
}

impl Default for TextualExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Guesses a method from keywords when a file names URLs but no method token.
pub fn guess_http_method(content: &str, kind: FileKind) -> HttpMethod {
    let lower = content.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has(&["create", "add"]) {
        return HttpMethod::Post;
    }
    if has(&["update", "modify"]) {
        return HttpMethod::Put;
    }
    if has(&["delete", "remove"]) {
        return HttpMethod::Delete;
    }
    if has(&["read", "get", "fetch"]) {
        return HttpMethod::Get;
    }

    match kind {
        FileKind::DataSource => HttpMethod::Get,
        FileKind::Resource => HttpMethod::Post,
        FileKind::Support => HttpMethod::Get,
    }
}

impl EndpointExtractor for TextualExtractor {
    fn name(&self) -> &'static str {
        "TextualExtractor"
    }

    fn extract(&self, file: &SourceFile) -> Vec<ApiCall> {
        let urls = self.find_urls(&file.content);
        if urls.is_empty() {
            return Vec::new();
        }

        let mut methods = self.find_methods(&file.content);
        let guessed = methods.is_empty();
        if guessed {
            methods.push(guess_http_method(&file.content, file.kind));
        }

        // Every URL is paired with every method in the file.
        let detector = if guessed {
            format!("{} (guessed)", self.name())
        } else {
            self.name().to_string()
        };
        let mut calls = Vec::with_capacity(urls.len() * methods.len());
        for (url, line) in &urls {
            for method in &methods {
                calls.push(ApiCall {
                    file_path: file.display_path(),
                    line: *line,
                    detector: detector.clone(),
                    method: method.as_str().to_string(),
                    path: url.clone(),
                });
            }
        }
        calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ParsedFile;
    use std::path::PathBuf;

    fn source(content: &str, kind: FileKind) -> SourceFile {
        SourceFile {
            path: PathBuf::from("resource_user.go"),
            content: content.to_string(),
            kind,
            ast: ParsedFile::default(),
        }
    }

    fn pairs(calls: Vec<ApiCall>) -> Vec<(String, String)> {
        calls.into_iter().map(|c| (c.method, c.path)).collect()
    }

    #[test]
    fn crosses_urls_with_methods() {
        let file = source(
            r#"c.newRequest(ctx, "/users", http.MethodGet, nil)
               c.newRequest(ctx, "/profiles", "DELETE", nil)"#,
            FileKind::Resource,
        );
        let found = pairs(TextualExtractor::new().extract(&file));

        // "/users" matches the generic and the user-family pattern.
        assert!(found.contains(&("GET".to_string(), "/users".to_string())));
        assert!(found.contains(&("DELETE".to_string(), "/users".to_string())));
        assert!(found.contains(&("GET".to_string(), "/profiles".to_string())));
        assert!(found.contains(&("DELETE".to_string(), "/profiles".to_string())));
        assert_eq!(found.len(), 6);
    }

    #[test]
    fn versioned_prefix_pattern_captures_remainder() {
        let file = source(
            r#"u := "/api/v3.12/devices"; m := http.MethodGet"#,
            FileKind::Support,
        );
        let found = pairs(TextualExtractor::new().extract(&file));
        assert_eq!(found, vec![("GET".to_string(), "/devices".to_string())]);
    }

    #[test]
    fn no_urls_means_no_findings() {
        let file = source(r#"x := http.MethodPost"#, FileKind::Resource);
        assert!(TextualExtractor::new().extract(&file).is_empty());
    }

    #[test]
    fn guesses_method_from_keywords() {
        assert_eq!(guess_http_method("func createThing()", FileKind::Support), HttpMethod::Post);
        assert_eq!(guess_http_method("modify it", FileKind::Support), HttpMethod::Put);
        assert_eq!(guess_http_method("remove it", FileKind::Support), HttpMethod::Delete);
        assert_eq!(guess_http_method("fetch it", FileKind::Support), HttpMethod::Get);
        assert_eq!(guess_http_method("nothing", FileKind::Resource), HttpMethod::Post);
        assert_eq!(guess_http_method("nothing", FileKind::DataSource), HttpMethod::Get);
        assert_eq!(guess_http_method("nothing", FileKind::Support), HttpMethod::Get);
    }

    #[test]
    fn guessed_findings_are_labelled() {
        let file = source(r#"path := "/timeframes""#, FileKind::Resource);
        let calls = TextualExtractor::new().extract(&file);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].detector, "TextualExtractor (guessed)");
    }
}
