//! Parser for BIND's `.private` key file format (the text sidecar that
//! accompanies a `Knnnn+aaa+iiiii.key` DNSKEY file). Pure text-to-struct
//! parsing; nothing here touches the filesystem; callers read the file
//! and hand us its contents.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    MissingField(&'static str),
    BadVersion(String),
    BadAlgorithm(String),
    BadBase64(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingField(field) => write!(f, "private key file is missing field '{field}'"),
            Error::BadVersion(v) => write!(f, "unsupported private key file version '{v}'"),
            Error::BadAlgorithm(a) => write!(f, "unrecognised algorithm field '{a}'"),
            Error::BadBase64(field) => write!(f, "field '{field}' is not valid base64"),
        }
    }
}

impl std::error::Error for Error {}

/// A parsed BIND private-key file. Only the fields common across
/// algorithms are pulled into named slots; algorithm-specific fields
/// (e.g. RSA's `Prime1`/`Prime2`) stay in `extra` since this crate signs
/// through PKCS8, not BIND's own multi-prime representation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PrivateKeyFile {
    pub version: String,
    pub algorithm: u8,
    /// The field BIND calls `PrivateKey` for EdDSA/ECDSA algorithms — a
    /// raw base64-decoded private scalar/seed, *not* PKCS8. Callers
    /// signing through [`crate::crypto::Crypto`] must wrap this
    /// themselves if their backend demands PKCS8.
    pub private_key: Vec<u8>,
    pub extra: HashMap<String, String>,
}

/// Parse a BIND `Key: value` private-key file. Lines starting with `;`
/// are comments (BIND always emits one describing the creation time);
/// blank lines are ignored.
pub fn parse(text: &str) -> Result<PrivateKeyFile, Error> {
    let mut fields: HashMap<String, String> = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else { continue };
        fields.insert(key.trim().to_string(), value.trim().to_string());
    }

    let version = fields.get("Private-key-format").cloned().ok_or(Error::MissingField("Private-key-format"))?;
    if !version.starts_with("v1.") {
        return Err(Error::BadVersion(version));
    }

    let algorithm_field = fields.get("Algorithm").ok_or(Error::MissingField("Algorithm"))?;
    let algorithm = algorithm_field
        .split_whitespace()
        .next()
        .and_then(|n| n.parse::<u8>().ok())
        .ok_or_else(|| Error::BadAlgorithm(algorithm_field.clone()))?;

    let private_key_b64 = fields.get("PrivateKey").ok_or(Error::MissingField("PrivateKey"))?;
    let private_key = data_encoding::BASE64
        .decode(private_key_b64.as_bytes())
        .map_err(|_| Error::BadBase64("PrivateKey"))?;

    let mut extra = fields;
    extra.remove("Private-key-format");
    extra.remove("Algorithm");
    extra.remove("PrivateKey");

    Ok(PrivateKeyFile { version, algorithm, private_key, extra })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ed25519_private_key_file() {
        let text = "Private-key-format: v1.3\nAlgorithm: 15 (ED25519)\nPrivateKey: fhsOwapgUNnQH3iZJ3FnqegY36wCQh/dRyhTYFV1eYw=\n";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.version, "v1.3");
        assert_eq!(parsed.algorithm, 15);
        assert_eq!(parsed.private_key.len(), 32);
    }

    #[test]
    fn rejects_missing_algorithm() {
        let text = "Private-key-format: v1.3\nPrivateKey: aGVsbG8=\n";
        assert_eq!(parse(text), Err(Error::MissingField("Algorithm")));
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        let text = "; Created: 20240101000000\nPrivate-key-format: v1.3\n\nAlgorithm: 15 (ED25519)\nPrivateKey: fhsOwapgUNnQH3iZJ3FnqegY36wCQh/dRyhTYFV1eYw=\n";
        assert!(parse(text).is_ok());
    }
}
