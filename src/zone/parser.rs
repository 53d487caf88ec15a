//! RFC 1035 section 5 zone-file parser: owner/ttl/class/type/rdata per
//! logical line, `$TTL`/`$ORIGIN`/`$INCLUDE`/`$GENERATE` directives.

use std::fmt;
use std::str::FromStr;

use crate::name::Name;
use crate::rr::codes::{RecordClass, RecordType};
use crate::rr::presentation;
use crate::rr::{RecordTypeWithData, ResourceRecord};
use crate::zone::lexer::{self, LogicalLine};

const MAX_INCLUDE_DEPTH: usize = 7;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    Lexer(lexer::Error),
    BadTtl(String),
    BadOwner(String),
    BadClass(String),
    UnknownType(String),
    MissingType,
    BadRdata(presentation::Error),
    BadOrigin(String),
    IncludeTooDeep,
    IncludeUnresolved(String),
    BadGenerate(String),
    EmptyLine,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lexer(e) => write!(f, "{e}"),
            ErrorKind::BadTtl(s) => write!(f, "invalid TTL: {s}"),
            ErrorKind::BadOwner(s) => write!(f, "invalid owner name: {s}"),
            ErrorKind::BadClass(s) => write!(f, "invalid class: {s}"),
            ErrorKind::UnknownType(s) => write!(f, "unknown record type: {s}"),
            ErrorKind::MissingType => write!(f, "record is missing a type"),
            ErrorKind::BadRdata(e) => write!(f, "{e}"),
            ErrorKind::BadOrigin(s) => write!(f, "invalid $ORIGIN: {s}"),
            ErrorKind::IncludeTooDeep => write!(f, "$INCLUDE nested more than {MAX_INCLUDE_DEPTH} deep"),
            ErrorKind::IncludeUnresolved(s) => write!(f, "could not resolve $INCLUDE {s}"),
            ErrorKind::BadGenerate(s) => write!(f, "invalid $GENERATE directive: {s}"),
            ErrorKind::EmptyLine => write!(f, "empty record line"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Error {
    pub file: String,
    pub line: usize,
    /// 1-based column of the offending token; 0 when the error isn't
    /// anchored to a specific token (e.g. a line with too few tokens).
    pub col: usize,
    /// The offending token's text; empty when there wasn't one to point at.
    pub token: String,
    pub kind: ErrorKind,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.token.is_empty() {
            write!(f, "{}:{}:{}: {}", self.file, self.line, self.col, self.kind)
        } else {
            write!(f, "{}:{}:{}: {} (near '{}')", self.file, self.line, self.col, self.kind, self.token)
        }
    }
}

impl std::error::Error for Error {}

/// Resolves `$INCLUDE` targets. Kept abstract so the core never touches
/// the filesystem directly; a caller backs this with real file I/O.
pub trait IncludeResolver {
    fn resolve(&mut self, path: &str) -> Option<String>;
}

/// An [`IncludeResolver`] that always fails; useful for zone text known
/// not to use `$INCLUDE`.
pub struct NoIncludes;

impl IncludeResolver for NoIncludes {
    fn resolve(&mut self, _path: &str) -> Option<String> {
        None
    }
}

struct ParserState {
    origin: Name,
    default_ttl: Option<u32>,
    last_explicit_ttl: Option<u32>,
    last_owner: Option<Name>,
    last_class: RecordClass,
}

pub fn parse_zone(
    file: &str,
    text: &str,
    origin: Name,
    default_ttl: Option<u32>,
    includes: &mut dyn IncludeResolver,
) -> Result<Vec<ResourceRecord>, Error> {
    let mut state = ParserState {
        origin,
        default_ttl,
        last_explicit_ttl: default_ttl,
        last_owner: None,
        last_class: RecordClass::IN,
    };
    parse_zone_inner(file, text, &mut state, includes, 0)
}

fn parse_zone_inner(
    file: &str,
    text: &str,
    state: &mut ParserState,
    includes: &mut dyn IncludeResolver,
    depth: usize,
) -> Result<Vec<ResourceRecord>, Error> {
    let lines = lexer::tokenize(text).map_err(|e| Error { file: file.to_string(), line: 1, col: 0, token: String::new(), kind: ErrorKind::Lexer(e) })?;
    let mut records = Vec::new();

    for logical in &lines {
        if logical.tokens.is_empty() {
            continue;
        }
        let first = &logical.tokens[0];

        if first.eq_ignore_ascii_case("$TTL") {
            let ttl = parse_ttl(logical.tokens.get(1).ok_or_else(|| err_tok(file, logical, 1, ErrorKind::BadTtl("missing value".into())))?)
                .map_err(|e| err_tok(file, logical, 1, ErrorKind::BadTtl(e)))?;
            state.default_ttl = Some(ttl);
            state.last_explicit_ttl = Some(ttl);
            continue;
        }

        if first.eq_ignore_ascii_case("$ORIGIN") {
            let tok = logical.tokens.get(1).ok_or_else(|| err_tok(file, logical, 1, ErrorKind::BadOrigin("missing name".into())))?;
            state.origin = Name::from_relative(&state.origin, tok)
                .map_err(|e| err_tok(file, logical, 1, ErrorKind::BadOrigin(e.to_string())))?;
            continue;
        }

        if first.eq_ignore_ascii_case("$INCLUDE") {
            if depth + 1 > MAX_INCLUDE_DEPTH {
                return Err(err(file, logical.line, ErrorKind::IncludeTooDeep));
            }
            let path = logical.tokens.get(1).ok_or_else(|| err_tok(file, logical, 1, ErrorKind::IncludeUnresolved("missing path".into())))?;
            let include_origin = match logical.tokens.get(2) {
                Some(tok) => Name::from_relative(&state.origin, tok)
                    .map_err(|e| err_tok(file, logical, 2, ErrorKind::BadOrigin(e.to_string())))?,
                None => state.origin.clone(),
            };
            let content = includes
                .resolve(path)
                .ok_or_else(|| err_tok(file, logical, 1, ErrorKind::IncludeUnresolved(path.clone())))?;
            let mut included_state = ParserState {
                origin: include_origin,
                default_ttl: state.default_ttl,
                last_explicit_ttl: state.last_explicit_ttl,
                last_owner: None,
                last_class: state.last_class,
            };
            let included = parse_zone_inner(path, &content, &mut included_state, includes, depth + 1)?;
            records.extend(included);
            continue;
        }

        if first.eq_ignore_ascii_case("$GENERATE") {
            records.extend(parse_generate(file, logical, state)?);
            continue;
        }

        records.push(parse_record_line(file, logical, state)?);
    }

    Ok(records)
}

fn err(file: &str, line: usize, kind: ErrorKind) -> Error {
    Error { file: file.to_string(), line, col: 0, token: String::new(), kind }
}

/// Builds an [`Error`] anchored to `logical.tokens[idx]`, filling in its
/// column and text when that index exists (falls back to `col: 0` /
/// an empty token when the line simply ran out of tokens).
fn err_tok(file: &str, logical: &LogicalLine, idx: usize, kind: ErrorKind) -> Error {
    let col = logical.cols.get(idx).copied().unwrap_or(0);
    let token = logical.tokens.get(idx).cloned().unwrap_or_default();
    Error { file: file.to_string(), line: logical.line, col, token, kind }
}

fn parse_record_line(file: &str, logical: &LogicalLine, state: &mut ParserState) -> Result<ResourceRecord, Error> {
    let mut idx = 0usize;
    let tokens = &logical.tokens;

    let owner = if logical.leading_blank {
        state
            .last_owner
            .clone()
            .ok_or_else(|| err(file, logical.line, ErrorKind::BadOwner("no previous owner to reuse".into())))?
    } else {
        let owner_idx = idx;
        let tok = &tokens[idx];
        idx += 1;
        if tok == "@" {
            state.origin.clone()
        } else {
            Name::from_relative(&state.origin, tok)
                .map_err(|e| err_tok(file, logical, owner_idx, ErrorKind::BadOwner(e.to_string())))?
        }
    };
    state.last_owner = Some(owner.clone());

    // TTL and class may appear in either order, and either or both may
    // be omitted (RFC 1035 section 5.1 / RFC 2308 section 4).
    let mut ttl: Option<u32> = None;
    let mut class: Option<RecordClass> = None;

    for _ in 0..2 {
        let Some(tok) = tokens.get(idx) else { break };
        if let Ok(t) = parse_ttl(tok) {
            if ttl.is_none() {
                ttl = Some(t);
                idx += 1;
                continue;
            }
        }
        if let Some(c) = parse_class(tok) {
            if class.is_none() {
                class = Some(c);
                idx += 1;
                continue;
            }
        }
        break;
    }

    let type_idx = idx;
    let rtype_tok = tokens.get(idx).ok_or_else(|| err_tok(file, logical, type_idx, ErrorKind::MissingType))?;
    idx += 1;
    let rtype = RecordType::from_str(rtype_tok)
        .map_err(|_| err_tok(file, logical, type_idx, ErrorKind::UnknownType(rtype_tok.clone())))?;

    let rdata_start = idx;
    let rdata_tokens: Vec<String> = tokens[idx..].to_vec();
    let rtype_with_data = presentation::parse_rdata(rtype, &state.origin, &rdata_tokens)
        .map_err(|e| err_tok(file, logical, rdata_start, ErrorKind::BadRdata(e)))?;

    let resolved_ttl = ttl.or(state.last_explicit_ttl).ok_or_else(|| err(file, logical.line, ErrorKind::BadTtl("no TTL in scope".into())))?;
    if let Some(t) = ttl {
        state.last_explicit_ttl = Some(t);
    }
    let resolved_class = class.unwrap_or(state.last_class);
    state.last_class = resolved_class;

    Ok(ResourceRecord { name: owner, rtype_with_data, rclass: resolved_class, ttl: resolved_ttl })
}

fn parse_class(tok: &str) -> Option<RecordClass> {
    match tok.to_ascii_uppercase().as_str() {
        "IN" => Some(RecordClass::IN),
        "CH" => Some(RecordClass::CH),
        "HS" => Some(RecordClass::HS),
        "NONE" => Some(RecordClass::NONE),
        _ => None,
    }
}

/// Accepts a bare integer (seconds) or a sequence of `<n><unit>` chunks
/// (`w`/`d`/`h`/`m`/`s`), summed; e.g. `1w2h` = 612000, `1d1d` = 172800.
/// Any other suffix (e.g. `y`) is rejected.
pub fn parse_ttl(s: &str) -> Result<u32, String> {
    if s.is_empty() || !s.chars().next().unwrap().is_ascii_digit() {
        return Err(format!("'{s}' does not start with a digit"));
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().map_err(|_| format!("'{s}' is out of range"));
    }

    let mut total: u64 = 0;
    let mut num = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            num.push(c);
            continue;
        }
        if num.is_empty() {
            return Err(format!("'{s}' has a unit with no preceding number"));
        }
        let n: u64 = num.parse().map_err(|_| format!("'{s}' is out of range"))?;
        num.clear();
        let multiplier = match c.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 3600,
            'd' => 86400,
            'w' => 604800,
            other => return Err(format!("'{other}' is not a valid TTL unit")),
        };
        total += n * multiplier;
    }
    if !num.is_empty() {
        return Err(format!("'{s}' has a trailing number with no unit"));
    }
    u32::try_from(total).map_err(|_| format!("'{s}' is out of range"))
}

/// `$GENERATE start-stop[/step] lhs [ttl] [class] type rhs`
fn parse_generate(file: &str, logical: &LogicalLine, state: &mut ParserState) -> Result<Vec<ResourceRecord>, Error> {
    let bad = |msg: &str| err(file, logical.line, ErrorKind::BadGenerate(msg.to_string()));
    let bad_at = |idx: usize, msg: &str| err_tok(file, logical, idx, ErrorKind::BadGenerate(msg.to_string()));

    let range_tok = logical.tokens.get(1).ok_or_else(|| bad("missing range"))?;
    let (range, step) = match range_tok.split_once('/') {
        Some((r, s)) => (r, Some(s.parse::<i64>().map_err(|_| bad_at(1, "bad step"))?)),
        None => (range_tok.as_str(), None),
    };
    let (start_s, stop_s) = range.split_once('-').ok_or_else(|| bad_at(1, "range must be start-stop"))?;
    let start: i64 = start_s.parse().map_err(|_| bad_at(1, "bad range start"))?;
    let stop: i64 = stop_s.parse().map_err(|_| bad_at(1, "bad range stop"))?;
    let step = step.unwrap_or(1).max(1);

    let rest = &logical.tokens[2..];
    if rest.is_empty() {
        return Err(bad("missing lhs/type/rhs"));
    }

    // rest: lhs [ttl] [class] type rhs...
    let lhs_pattern = rest[0].clone();
    let mut idx = 1usize;
    let mut ttl = None;
    let mut class = None;
    for _ in 0..2 {
        let Some(tok) = rest.get(idx) else { break };
        if let Ok(t) = parse_ttl(tok) {
            if ttl.is_none() {
                ttl = Some(t);
                idx += 1;
                continue;
            }
        }
        if let Some(c) = parse_class(tok) {
            if class.is_none() {
                class = Some(c);
                idx += 1;
                continue;
            }
        }
        break;
    }
    let rtype_tok = rest.get(idx).ok_or_else(|| bad_at(idx + 2, "missing type"))?;
    idx += 1;
    let rtype = RecordType::from_str(rtype_tok).map_err(|_| bad_at(idx + 1, "unknown type"))?;
    let rhs_pattern = rest[idx..].join(" ");

    let resolved_ttl = ttl.or(state.last_explicit_ttl).ok_or_else(|| bad("no TTL in scope"))?;
    let resolved_class = class.unwrap_or(state.last_class);

    let mut out = Vec::new();
    let mut i = start;
    while (step > 0 && i <= stop) || (step < 0 && i >= stop) {
        let owner_text = expand_generate_pattern(&lhs_pattern, i);
        let rdata_text = expand_generate_pattern(&rhs_pattern, i);
        let owner = Name::from_relative(&state.origin, &owner_text).map_err(|e| bad(&e.to_string()))?;
        let rdata_tokens: Vec<String> = rdata_text.split_whitespace().map(String::from).collect();
        let data = presentation::parse_rdata(rtype, &state.origin, &rdata_tokens)
            .map_err(|e| err(file, logical.line, ErrorKind::BadRdata(e)))?;
        out.push(ResourceRecord { name: owner, rtype_with_data: data, rclass: resolved_class, ttl: resolved_ttl });
        i += step;
    }

    Ok(out)
}

/// Expand `$` (and `${offset,width,base}`) in a `$GENERATE` pattern
/// against the current index, per RFC 8624 / BIND's documented syntax.
/// A literal `$` is written `\$`.
fn expand_generate_pattern(pattern: &str, index: i64) -> String {
    let bytes = pattern.as_bytes();
    let mut out = String::new();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() && bytes[i + 1] == b'$' => {
                out.push('$');
                i += 2;
            }
            b'$' if i + 1 < bytes.len() && bytes[i + 1] == b'{' => {
                if let Some(close) = pattern[i..].find('}') {
                    let spec = &pattern[i + 2..i + close];
                    let parts: Vec<&str> = spec.split(',').collect();
                    let offset: i64 = parts.first().and_then(|s| s.parse().ok()).unwrap_or(0);
                    let width: usize = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(0);
                    let base = parts.get(2).copied().unwrap_or("d");
                    let value = index + offset;
                    out.push_str(&format_generate_number(value, width, base));
                    i += close + 1;
                } else {
                    out.push('$');
                    i += 1;
                }
            }
            b'$' => {
                out.push_str(&index.to_string());
                i += 1;
            }
            b => {
                out.push(b as char);
                i += 1;
            }
        }
    }
    out
}

fn format_generate_number(value: i64, width: usize, base: &str) -> String {
    let unsigned = value as u64;
    let digits = match base {
        "o" => format!("{unsigned:o}"),
        "x" => format!("{unsigned:x}"),
        "X" => format!("{unsigned:X}"),
        _ => format!("{value}"),
    };
    if digits.len() >= width {
        digits
    } else {
        format!("{:0>width$}", digits, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_suffixes() {
        assert_eq!(parse_ttl("1w2h").unwrap(), 7 * 86400 + 2 * 3600);
        assert_eq!(parse_ttl("86400").unwrap(), 86400);
        assert_eq!(parse_ttl("1d1d").unwrap(), 2 * 86400);
        assert!(parse_ttl("1y").is_err());
    }

    #[test]
    fn simple_zone_parses() {
        let text = "$TTL 3600\n@ IN SOA ns1.example.com. hostmaster.example.com. (\n  2024010100 3600 900 604800 86400 )\n@ IN NS ns1.example.com.\nns1 IN A 192.0.2.1\nwww IN A 192.0.2.2\n";
        let origin = Name::from_str("example.com.").unwrap();
        let records = parse_zone("test.zone", text, origin, None, &mut NoIncludes).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].rtype(), RecordType::SOA);
        assert_eq!(records[2].name, Name::from_str("ns1.example.com.").unwrap());
    }

    #[test]
    fn generate_expands_range() {
        let text = "$TTL 300\n$ORIGIN example.com.\n$GENERATE 1-3 host${0,3,d} A 10.0.0.$\n";
        let origin = Name::from_str("example.com.").unwrap();
        let records = parse_zone("test.zone", text, origin, None, &mut NoIncludes).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, Name::from_str("host001.example.com.").unwrap());
        assert_eq!(records[2].name, Name::from_str("host003.example.com.").unwrap());
    }

    #[test]
    fn blank_leading_reuses_owner() {
        let text = "a.example.com. 300 IN A 1.2.3.4\n  300 IN A 1.2.3.5\n";
        let origin = Name::from_str("example.com.").unwrap();
        let records = parse_zone("test.zone", text, origin, None, &mut NoIncludes).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, records[1].name);
    }
}
