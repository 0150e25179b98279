use crate::model::HttpMethod;

/// Expression nodes the extractors care about. Everything else lowers to `Other`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    StringLit(String),
    Ident(String),
    Selector { operand: Box<Expr>, field: String },
    Binary { op: String, left: Box<Expr>, right: Box<Expr> },
    Call(Box<CallExpr>),
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Vec<Expr>,
    /// 1-based source line of the call.
    pub line: usize,
}

impl Expr {
    /// Best-effort URL text for an argument: a literal, the leading literal of a
    /// `+` concatenation, or a `Sprintf` template cut at its first placeholder.
    pub fn url_text(&self) -> Option<String> {
        match self {
            Expr::StringLit(s) => Some(s.clone()),
            Expr::Binary { op, left, .. } if op == "+" => left.url_text(),
            Expr::Call(call) if call.callee_name() == Some("Sprintf") => match call.args.first() {
                Some(Expr::StringLit(template)) => {
                    let end = template.find('%').unwrap_or(template.len());
                    Some(template[..end].to_string())
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Path-shaped URL text, i.e. starting with `/`.
    pub fn path_text(&self) -> Option<String> {
        self.url_text().filter(|url| url.starts_with('/'))
    }

    /// HTTP method token: `http.MethodX` maps to its verb, literals are upper-cased.
    pub fn method_token(&self) -> Option<String> {
        match self {
            Expr::Selector { field, .. } if field.starts_with("Method") => Some(
                HttpMethod::canonicalize(field)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| field.to_uppercase()),
            ),
            Expr::StringLit(s) => Some(s.trim().to_uppercase()),
            _ => None,
        }
    }
}

impl CallExpr {
    /// Name of the called function or method (`newRequest` for `c.newRequest(...)`).
    pub fn callee_name(&self) -> Option<&str> {
        match &self.callee {
            Expr::Ident(name) => Some(name),
            Expr::Selector { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Expr {
        Expr::StringLit(s.to_string())
    }

    fn sel(pkg: &str, field: &str) -> Expr {
        Expr::Selector {
            operand: Box::new(Expr::Ident(pkg.to_string())),
            field: field.to_string(),
        }
    }

    #[test]
    fn url_text_follows_concatenation_and_sprintf() {
        let concat = Expr::Binary {
            op: "+".to_string(),
            left: Box::new(lit("/users/")),
            right: Box::new(Expr::Ident("name".to_string())),
        };
        assert_eq!(concat.path_text().as_deref(), Some("/users/"));

        let sprintf = Expr::Call(Box::new(CallExpr {
            callee: sel("fmt", "Sprintf"),
            args: vec![lit("/devices/%s/services"), Expr::Ident("id".to_string())],
            line: 1,
        }));
        assert_eq!(sprintf.path_text().as_deref(), Some("/devices/"));

        assert_eq!(Expr::Ident("uri".to_string()).url_text(), None);
        assert_eq!(lit("application/json").path_text(), None);
    }

    #[test]
    fn method_token_maps_symbols_and_uppercases_literals() {
        assert_eq!(sel("http", "MethodPut").method_token().as_deref(), Some("PUT"));
        assert_eq!(lit("patch").method_token().as_deref(), Some("PATCH"));
        assert_eq!(sel("http", "StatusOK").method_token(), None);
        assert_eq!(Expr::Ident("method".to_string()).method_token(), None);
    }
}
