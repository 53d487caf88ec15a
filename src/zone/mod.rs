//! RFC 1035 section 5 master-file (zone file) lexer and parser.

pub mod lexer;
pub mod parser;

pub use lexer::{Error as LexError, LogicalLine};
pub use parser::{parse_zone, Error, ErrorKind, IncludeResolver, NoIncludes};
