pub mod expr;
pub mod parser;

pub use expr::{CallExpr, Expr};
pub use parser::{GoParser, ParsedFile};
