use super::{ApiCall, EndpointExtractor, SourceFile};
use crate::ast::{CallExpr, Expr};

/// Call shapes recognised as HTTP requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestShape {
    /// `client.newRequest(ctx, url, method, body)`: the method follows the URL.
    ClientRequest,
    /// `http.NewRequest(method, url, body)` and friends.
    Positional { method: usize, url: usize },
}

impl RequestShape {
    fn recognize(name: &str) -> Option<Self> {
        match name {
            "newRequest" => Some(RequestShape::ClientRequest),
            "NewRequest" | "doRequest" | "DoRequest" => {
                Some(RequestShape::Positional { method: 0, url: 1 })
            }
            "NewRequestWithContext" => Some(RequestShape::Positional { method: 1, url: 2 }),
            _ => None,
        }
    }
}

/// Inspects call expressions of the parsed file.
pub struct StructuralExtractor;

impl StructuralExtractor {
    pub fn new() -> Self {
        Self
    }

    fn match_call(call: &CallExpr) -> Option<(String, String)> {
        let shape = RequestShape::recognize(call.callee_name()?)?;

        match shape {
            RequestShape::ClientRequest => {
                let (idx, url) = call
                    .args
                    .iter()
                    .enumerate()
                    .find_map(|(i, arg)| arg.path_text().map(|url| (i, url)))?;
                let method = call.args.get(idx + 1).and_then(Expr::method_token)?;
                Some((method, url))
            }
            RequestShape::Positional { method, url } => {
                let method = call.args.get(method).and_then(Expr::method_token)?;
                let url = call.args.get(url).and_then(Expr::path_text)?;
                Some((method, url))
            }
        }
    }
}

impl Default for StructuralExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EndpointExtractor for StructuralExtractor {
    fn name(&self) -> &'static str {
        "StructuralExtractor"
    }

    fn extract(&self, file: &SourceFile) -> Vec<ApiCall> {
        file.ast
            .calls
            .iter()
            .filter_map(|call| {
                Self::match_call(call).map(|(method, path)| ApiCall {
                    file_path: file.display_path(),
                    line: call.line,
                    detector: self.name().to_string(),
                    method,
                    path,
                })
            })
            .collect()
    }
}
