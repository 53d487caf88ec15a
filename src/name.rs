//! Domain names: presentation-form escaping and wire-form encoding with
//! RFC 1035 section 4.1.4 pointer compression.

use std::collections::HashMap;
use std::fmt;

/// Maximum length, in octets, of a single label (RFC 1035 section 3.1).
pub const LABEL_MAX_LEN: usize = 63;

/// Maximum length, in octets, of the wire-encoded name, including length
/// octets (RFC 1035 section 3.1).
pub const DOMAINNAME_MAX_LEN: usize = 255;

/// A pointer may only ever point backwards into the first 14 bits worth
/// of the message.
const MAX_POINTER_OFFSET: usize = 0x3FFF;

/// How many compression pointers we will follow while decoding a single
/// name before giving up. Real names never need more than a handful of
/// jumps; this exists purely to bound a malicious or corrupt message.
const MAX_POINTER_JUMPS: usize = 10;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    NameTooLong,
    LabelTooLong,
    BadEscape,
    MultipleDots,
    BadPointer,
    PointerLoop,
    TruncatedName,
    UnexpectedEof,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NameTooLong => write!(f, "domain name exceeds 255 octets"),
            Error::LabelTooLong => write!(f, "label exceeds 63 octets"),
            Error::BadEscape => write!(f, "invalid escape sequence in domain name"),
            Error::MultipleDots => write!(f, "empty label in domain name"),
            Error::BadPointer => write!(f, "compression pointer with reserved top bits"),
            Error::PointerLoop => write!(f, "too many compression pointer jumps"),
            Error::TruncatedName => write!(f, "domain name runs past end of message"),
            Error::UnexpectedEof => write!(f, "unexpected end of buffer while reading name"),
        }
    }
}

impl std::error::Error for Error {}

/// A domain name: an ordered sequence of labels, each at most 63 octets,
/// stored case-preserved (comparisons fold ASCII case; storage does not).
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(any(feature = "test-util", test), derive(arbitrary::Arbitrary))]
pub struct Name {
    labels: Vec<Vec<u8>>,
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Name")
            .field("presentation", &self.to_presentation())
            .finish()
    }
}

const SPECIAL_BYTES: &[u8] = b".()\";@\\";

impl Name {
    pub fn root() -> Self {
        Name { labels: vec![] }
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Vec<u8>] {
        &self.labels
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Construct from already-validated labels (e.g. produced while
    /// decoding the wire form).
    pub fn from_labels(labels: Vec<Vec<u8>>) -> Result<Self, Error> {
        let mut wire_len = 1usize;
        for label in &labels {
            if label.len() > LABEL_MAX_LEN {
                return Err(Error::LabelTooLong);
            }
            wire_len += label.len() + 1;
        }
        if wire_len > DOMAINNAME_MAX_LEN {
            return Err(Error::NameTooLong);
        }
        Ok(Name { labels })
    }

    /// Parse RFC 1035 section 5.1 presentation syntax, with the usual
    /// `\X` / `\DDD` escapes. A trailing `.` makes the name absolute; a
    /// non-trailing-dot string is returned relative to nothing (callers
    /// needing origin-relative completion should use
    /// [`Name::from_relative`]).
    pub fn from_presentation(s: &str) -> Result<Self, Error> {
        if s == "." {
            return Ok(Name::root());
        }

        let bytes = s.as_bytes();
        let mut labels = Vec::new();
        let mut current = Vec::new();
        let mut i = 0;
        let mut saw_any = false;

        while i < bytes.len() {
            match bytes[i] {
                b'.' => {
                    if current.is_empty() && saw_any {
                        return Err(Error::MultipleDots);
                    }
                    labels.push(std::mem::take(&mut current));
                    saw_any = true;
                    i += 1;
                }
                b'\\' => {
                    i += 1;
                    if i >= bytes.len() {
                        return Err(Error::BadEscape);
                    }
                    if bytes[i].is_ascii_digit() {
                        if i + 2 >= bytes.len()
                            || !bytes[i + 1].is_ascii_digit()
                            || !bytes[i + 2].is_ascii_digit()
                        {
                            return Err(Error::BadEscape);
                        }
                        let value: u32 = std::str::from_utf8(&bytes[i..i + 3])
                            .ok()
                            .and_then(|s| s.parse().ok())
                            .ok_or(Error::BadEscape)?;
                        if value > 255 {
                            return Err(Error::BadEscape);
                        }
                        current.push(value as u8);
                        i += 3;
                    } else {
                        current.push(bytes[i]);
                        i += 1;
                    }
                }
                b => {
                    current.push(b);
                    i += 1;
                }
            }
        }

        if !current.is_empty() || !saw_any {
            labels.push(current);
        }

        for label in &labels {
            if label.len() > LABEL_MAX_LEN {
                return Err(Error::LabelTooLong);
            }
        }

        Name::from_labels(labels)
    }

    /// As [`Name::from_presentation`], but a name not ending in `.` is
    /// completed against `origin`.
    pub fn from_relative(origin: &Name, s: &str) -> Result<Self, Error> {
        if s.is_empty() {
            return Ok(origin.clone());
        }
        if s == "@" {
            return Ok(origin.clone());
        }
        if s.ends_with('.') {
            return Name::from_presentation(s);
        }
        let relative = Name::from_presentation(s)?;
        let mut labels = relative.labels;
        labels.extend(origin.labels.iter().cloned());
        Name::from_labels(labels)
    }

    pub fn to_presentation(&self) -> String {
        if self.is_root() {
            return ".".to_string();
        }
        let mut out = String::new();
        for label in &self.labels {
            for &b in label {
                if SPECIAL_BYTES.contains(&b) {
                    out.push('\\');
                    out.push(b as char);
                } else if b.is_ascii_graphic() || b == b' ' {
                    out.push(b as char);
                } else {
                    out.push_str(&format!("\\{:03}", b));
                }
            }
            out.push('.');
        }
        out
    }

    pub fn eq_ignore_case(&self, other: &Name) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(other.labels.iter())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    pub fn to_lowercase(&self) -> Name {
        Name {
            labels: self
                .labels
                .iter()
                .map(|l| l.iter().map(u8::to_ascii_lowercase).collect())
                .collect(),
        }
    }

    pub fn is_subdomain_of(&self, other: &Name) -> bool {
        if other.labels.len() > self.labels.len() {
            return false;
        }
        let offset = self.labels.len() - other.labels.len();
        self.labels[offset..]
            .iter()
            .zip(other.labels.iter())
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// Length of the name as it would be written uncompressed on the
    /// wire, including the terminating root octet.
    pub fn wire_len(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    /// Encode without compression. Used for DNSSEC canonical forms,
    /// where compression is explicitly forbidden.
    pub fn to_uncompressed_octets(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        for label in &self.labels {
            out.push(label.len() as u8);
            out.extend_from_slice(label);
        }
        out.push(0);
        out
    }

    /// Encode onto `out`, consulting and updating `compression` (a map
    /// from lowercased tail-suffix to the absolute offset it was last
    /// written at). `base_offset` is the absolute offset `out` starts
    /// at within the overall message.
    pub fn encode(
        &self,
        out: &mut Vec<u8>,
        compression: &mut HashMap<Vec<Vec<u8>>, usize>,
        base_offset: usize,
    ) {
        let mut labels: &[Vec<u8>] = &self.labels;
        loop {
            if labels.is_empty() {
                out.push(0);
                return;
            }

            let key: Vec<Vec<u8>> = labels
                .iter()
                .map(|l| l.to_ascii_lowercase())
                .collect();

            if let Some(&offset) = compression.get(&key) {
                let pointer = 0xC000u16 | (offset as u16);
                out.extend_from_slice(&pointer.to_be_bytes());
                return;
            }

            let here = base_offset + out.len();
            if here <= MAX_POINTER_OFFSET {
                compression.insert(key, here);
            }

            let label = &labels[0];
            out.push(label.len() as u8);
            out.extend_from_slice(label);
            labels = &labels[1..];
        }
    }

    /// Decode a name starting at `pos` in `buf`. Returns the name and
    /// the position immediately after its first occurrence in the
    /// buffer (i.e. *not* following any pointer jump).
    pub fn decode(buf: &[u8], pos: usize) -> Result<(Name, usize), Error> {
        let mut labels = Vec::new();
        let mut cursor = pos;
        let mut resume: Option<usize> = None;
        let mut jumps = 0usize;
        let mut wire_len = 1usize;

        loop {
            let len_byte = *buf.get(cursor).ok_or(Error::TruncatedName)?;
            match len_byte & 0xC0 {
                0x00 => {
                    let len = usize::from(len_byte);
                    if len == 0 {
                        if resume.is_none() {
                            resume = Some(cursor + 1);
                        }
                        break;
                    }
                    let start = cursor + 1;
                    let end = start + len;
                    let label = buf.get(start..end).ok_or(Error::TruncatedName)?.to_vec();
                    wire_len += len + 1;
                    if wire_len > DOMAINNAME_MAX_LEN {
                        return Err(Error::NameTooLong);
                    }
                    labels.push(label);
                    cursor = end;
                }
                0xC0 => {
                    let lo = *buf.get(cursor + 1).ok_or(Error::TruncatedName)?;
                    let offset = (usize::from(len_byte & 0x3F) << 8) | usize::from(lo);
                    if resume.is_none() {
                        resume = Some(cursor + 2);
                    }
                    jumps += 1;
                    if jumps > MAX_POINTER_JUMPS {
                        return Err(Error::PointerLoop);
                    }
                    if offset >= cursor {
                        // Pointers must always point strictly backwards;
                        // this also rules out a pointer pointing at itself.
                        return Err(Error::PointerLoop);
                    }
                    cursor = offset;
                }
                _ => return Err(Error::BadPointer),
            }
        }

        let name = Name::from_labels(labels)?;
        Ok((name, resume.unwrap_or(cursor + 1)))
    }
}

impl std::str::FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Name::from_presentation(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_presentation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_round_trips() {
        assert_eq!(Name::from_presentation(".").unwrap(), Name::root());
        assert_eq!(Name::root().to_presentation(), ".");
    }

    #[test]
    fn simple_round_trip() {
        let n = Name::from_presentation("www.example.com.").unwrap();
        assert_eq!(n.to_presentation(), "www.example.com.");
        assert_eq!(n.label_count(), 3);
    }

    #[test]
    fn escaped_dot_is_one_label() {
        let n = Name::from_presentation("a\\.b.com.").unwrap();
        assert_eq!(n.label_count(), 2);
        assert_eq!(n.labels()[0], b"a.b");
    }

    #[test]
    fn decimal_escape() {
        let n = Name::from_presentation("a\\046b.com.").unwrap();
        assert_eq!(n.labels()[0], b"a.b");
    }

    #[test]
    fn label_too_long_rejected() {
        let long = "a".repeat(64);
        assert_eq!(
            Name::from_presentation(&format!("{}.com.", long)),
            Err(Error::LabelTooLong)
        );
    }

    #[test]
    fn compression_pointer_reused() {
        let mut out = Vec::new();
        let mut table = HashMap::new();
        let www = Name::from_presentation("www.example.com.").unwrap();
        let mail = Name::from_presentation("mail.example.com.").unwrap();

        www.encode(&mut out, &mut table, 0);
        let first_len = out.len();
        mail.encode(&mut out, &mut table, 0);

        // "mail" label (1 + 4 bytes) followed by a 2-byte pointer back
        // into the "example.com." suffix of the first name.
        assert_eq!(out.len(), first_len + 1 + 4 + 2);
        assert_eq!(out[out.len() - 2] & 0xC0, 0xC0);
    }

    #[test]
    fn decode_rejects_pointer_loop() {
        let buf = [0x03, b'f', b'o', b'o', 0xC0, 0x00];
        assert_eq!(Name::decode(&buf, 0), Err(Error::PointerLoop));
    }

    #[test]
    fn decode_follows_pointer() {
        // "example.com." at offset 0, then a name at offset 13 which is
        // just a pointer back to offset 0.
        let mut buf = Name::root().to_uncompressed_octets();
        buf.clear();
        let base = Name::from_presentation("example.com.").unwrap();
        buf.extend(base.to_uncompressed_octets());
        let pointer_offset = buf.len();
        buf.extend_from_slice(&[0xC0, 0x00]);

        let (decoded, next) = Name::decode(&buf, pointer_offset).unwrap();
        assert_eq!(decoded, base);
        assert_eq!(next, buf.len());
    }

    #[test]
    fn case_insensitive_equality() {
        let a = Name::from_presentation("WWW.Example.COM.").unwrap();
        let b = Name::from_presentation("www.example.com.").unwrap();
        assert!(a.eq_ignore_case(&b));
    }
}
