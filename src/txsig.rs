//! Transaction signatures: TSIG (RFC 8945) shared-secret MACs and SIG(0)
//! (RFC 2931) public-key signatures over a whole DNS message.
//!
//! Both append a pseudo-record to the additional section and sign a
//! digest built from the *adjusted* message (the original message minus
//! the signature record itself, plus a few out-of-band fields). To avoid
//! the classic bug of tracking rdlength deltas by hand as fields get
//! bolted on, both `append_*` functions build the digest by
//! re-serialising the whole adjusted message once rather than patching a
//! running length counter.

use std::fmt;

use crate::crypto::{self, Crypto, MacAlgorithm, SignAlgorithm};
use crate::message::Message;
use crate::name::Name;
use crate::primitive::{self, Writer};
use crate::rr::{RecordClass, RecordType, RecordTypeWithData, ResourceRecord};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    UnsupportedMacAlgorithm(Name),
    BadTsigRecord,
    NoTsigRecord,
    MacMismatch,
    BadTime,
    Crypto(crypto::Error),
    Primitive(primitive::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedMacAlgorithm(n) => write!(f, "unsupported TSIG algorithm {n}"),
            Error::BadTsigRecord => write!(f, "malformed TSIG record"),
            Error::NoTsigRecord => write!(f, "message carries no TSIG record"),
            Error::MacMismatch => write!(f, "TSIG MAC or SIG(0) signature verification failed"),
            Error::BadTime => write!(f, "TSIG time outside the fudge window"),
            Error::Crypto(e) => write!(f, "{e}"),
            Error::Primitive(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<crypto::Error> for Error {
    fn from(e: crypto::Error) -> Self {
        Error::Crypto(e)
    }
}
impl From<primitive::Error> for Error {
    fn from(e: primitive::Error) -> Self {
        Error::Primitive(e)
    }
}

/// RFC 8945 section 6 algorithm names, as they appear in the TSIG
/// record's algorithm-name field.
fn mac_algorithm_name(alg: &Name) -> Option<&'static str> {
    let s = alg.to_presentation();
    let s = s.trim_end_matches('.');
    match s.to_ascii_lowercase().as_str() {
        "hmac-md5.sig-alg.reg.int" => Some("hmac-md5"),
        "hmac-sha1" => Some("hmac-sha1"),
        "hmac-sha256" => Some("hmac-sha256"),
        "hmac-sha384" => Some("hmac-sha384"),
        "hmac-sha512" => Some("hmac-sha512"),
        _ => None,
    }
}

fn mac_algorithm_id(alg: &str) -> Result<MacAlgorithm, Error> {
    Ok(match alg {
        "hmac-md5" => MacAlgorithm::HmacMd5,
        "hmac-sha1" => MacAlgorithm::HmacSha1,
        "hmac-sha256" => MacAlgorithm::HmacSha256,
        "hmac-sha384" => MacAlgorithm::HmacSha384,
        "hmac-sha512" => MacAlgorithm::HmacSha512,
        _ => return Err(Error::BadTsigRecord),
    })
}

fn compute_mac(crypto: &dyn Crypto, alg: &str, key: &[u8], message: &[u8]) -> Result<Vec<u8>, Error> {
    let algorithm = mac_algorithm_id(alg)?;
    Ok(crypto.mac(algorithm, key, message))
}

/// Unpacked view of a TSIG RR's rdata (RFC 8945 section 4.2).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TsigFields {
    pub algorithm: Name,
    pub time_signed: u64,
    pub fudge: u16,
    pub mac: Vec<u8>,
    pub original_id: u16,
    pub error: u16,
    pub other_data: Vec<u8>,
}

fn encode_tsig_rdata(f: &TsigFields) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_bytes(&f.algorithm.to_uncompressed_octets());
    w.write_bytes(&f.time_signed.to_be_bytes()[2..8]);
    w.write_u16(f.fudge);
    w.write_u16(f.mac.len() as u16);
    w.write_bytes(&f.mac);
    w.write_u16(f.original_id);
    w.write_u16(f.error);
    w.write_u16(f.other_data.len() as u16);
    w.write_bytes(&f.other_data);
    w.buf
}

fn decode_tsig_rdata(octets: &[u8]) -> Result<TsigFields, Error> {
    let (algorithm, next) = Name::decode(octets, 0).map_err(|_| Error::BadTsigRecord)?;
    let rest = octets.get(next..).ok_or(Error::BadTsigRecord)?;
    let mut r = primitive::Reader::new(rest);
    let time_hi = u64::from(r.read_u16()?);
    let time_lo = u64::from(r.read_u32()?);
    let time_signed = (time_hi << 32) | time_lo;
    let fudge = r.read_u16()?;
    let mac_len = usize::from(r.read_u16()?);
    let mac = r.read_bytes(mac_len)?.to_vec();
    let original_id = r.read_u16()?;
    let error = r.read_u16()?;
    let other_len = usize::from(r.read_u16()?);
    let other_data = r.read_bytes(other_len)?.to_vec();
    Ok(TsigFields { algorithm, time_signed, fudge, mac, original_id, error, other_data })
}

/// Build the MAC-input digest for a TSIG record per RFC 8945 section
/// 4.2/5.3: the request/response message (with the TSIG RR's TTL/class
/// replaced by fixed values and the MAC field itself excluded), optionally
/// preceded by the prior request's MAC (for chaining a TCP response
/// stream's signatures), and followed either by the full TSIG variables
/// or, in `timers_only` mode (used for error responses such as BADTIME),
/// by just the signing time and fudge.
fn tsig_digest(
    message: &Message,
    name: &Name,
    f: &TsigFields,
    request_mac: Option<&[u8]>,
    timers_only: bool,
) -> Vec<u8> {
    let mut w = Writer::new();
    if let Some(mac) = request_mac {
        w.write_u16(mac.len() as u16);
        w.write_bytes(mac);
    }

    let mut msg_for_digest = message.clone();
    msg_for_digest.header.id = f.original_id;
    w.write_bytes(&msg_for_digest.to_octets());

    if timers_only {
        w.write_bytes(&f.time_signed.to_be_bytes()[2..8]);
        w.write_u16(f.fudge);
        return w.buf;
    }

    w.write_bytes(&name.to_uncompressed_octets());
    w.write_u16(RecordClass::ANY_U16);
    w.write_u32(0);
    w.write_bytes(&f.algorithm.to_uncompressed_octets());
    w.write_bytes(&f.time_signed.to_be_bytes()[2..8]);
    w.write_u16(f.fudge);
    w.write_u16(f.error);
    w.write_u16(f.other_data.len() as u16);
    w.write_bytes(&f.other_data);
    w.buf
}

/// Append a TSIG record to `message`'s additional section, signed with
/// `key` under `key_name`/`algorithm`. `now` is the caller-supplied
/// signing time (Unix seconds); this module has no clock of its own.
///
/// `request_mac` is the prior request's MAC, required when signing a
/// response so the signature chains to the request it answers (RFC 8945
/// section 5.3); pass `None` when signing a request or a standalone
/// message. `timers_only` selects the lightweight digest used for
/// subsequent messages in a signed TCP stream and for error responses
/// where the full TSIG variables can't be trusted yet.
pub fn append_tsig(
    message: &mut Message,
    crypto: &dyn Crypto,
    key_name: &Name,
    algorithm: &str,
    key: &[u8],
    now: u64,
    fudge: u16,
    request_mac: Option<&[u8]>,
    timers_only: bool,
) -> Result<(), Error> {
    let mut fields = TsigFields {
        algorithm: Name::from_presentation(&format!("{algorithm}.")).map_err(|_| Error::BadTsigRecord)?,
        time_signed: now,
        fudge,
        mac: Vec::new(),
        original_id: message.header.id,
        error: 0,
        other_data: Vec::new(),
    };

    let canonical_algorithm =
        mac_algorithm_name(&fields.algorithm).ok_or_else(|| Error::UnsupportedMacAlgorithm(fields.algorithm.clone()))?;
    let digest = tsig_digest(message, key_name, &fields, request_mac, timers_only);
    fields.mac = compute_mac(crypto, canonical_algorithm, key, &digest)?;

    message.additional.push(ResourceRecord {
        name: key_name.clone(),
        rtype_with_data: RecordTypeWithData::Unknown {
            tag: crate::rr::RecordTypeUnknown(RecordType::TSIG.into()),
            octets: encode_tsig_rdata(&fields),
        },
        rclass: RecordClass::ANY,
        ttl: 0,
    });
    Ok(())
}

/// Verify and strip a TSIG record from `message`, returning the verified
/// [`TsigFields`]. `now` implements the fudge-window check (RFC 8945
/// section 5.2.3). `request_mac` and `timers_only` mirror [`append_tsig`]'s
/// parameters of the same name and must match how the signer built the
/// digest.
pub fn verify_and_strip_tsig(
    message: &mut Message,
    crypto: &dyn Crypto,
    key: &[u8],
    now: u64,
    request_mac: Option<&[u8]>,
    timers_only: bool,
) -> Result<TsigFields, Error> {
    let pos = message
        .additional
        .iter()
        .position(|rr| rr.rtype() == RecordType::TSIG)
        .ok_or(Error::NoTsigRecord)?;
    let tsig_rr = message.additional.remove(pos);

    let RecordTypeWithData::Unknown { octets, .. } = &tsig_rr.rtype_with_data else {
        return Err(Error::BadTsigRecord);
    };
    let fields = decode_tsig_rdata(octets)?;

    let algorithm = mac_algorithm_name(&fields.algorithm).ok_or_else(|| Error::UnsupportedMacAlgorithm(fields.algorithm.clone()))?;

    let digest = tsig_digest(message, &tsig_rr.name, &fields, request_mac, timers_only);
    let expected = compute_mac(crypto, algorithm, key, &digest)?;
    if !crypto::constant_time_eq(&expected, &fields.mac) {
        return Err(Error::MacMismatch);
    }

    let window = u64::from(fields.fudge);
    let delta = now.abs_diff(fields.time_signed);
    if delta > window {
        return Err(Error::BadTime);
    }

    Ok(fields)
}

impl RecordClass {
    /// ANY (255) used as TSIG's fixed RR class; not part of the closed
    /// code table since it only ever appears here and in UPDATE prerequisites.
    const ANY_U16: u16 = 255;
    const ANY: RecordClass = RecordClass::Unknown(crate::rr::RecordClassUnknown(255));
}

/// SIG(0) (RFC 2931): a public-key signature over the whole message,
/// carried as a SIG record with `type_covered = 0` in the additional
/// section. Unlike TSIG, the keypair identifies the signer directly, so
/// there is no out-of-band shared secret to distribute.
pub fn append_sig0(
    message: &mut Message,
    crypto: &dyn Crypto,
    algorithm: SignAlgorithm,
    signer_name: &Name,
    key_tag: u16,
    private_key: &[u8],
    inception: u32,
    expiration: u32,
) -> Result<(), Error> {
    let alg_number = crate::dnssec::sign_algorithm_to_number(algorithm);
    let mut sig = crate::rr::data::Sig {
        type_covered: RecordType::from(0u16),
        algorithm: alg_number,
        labels: 0,
        original_ttl: 0,
        expiration,
        inception,
        key_tag,
        signer_name: signer_name.clone(),
        signature: Vec::new(),
    };

    let tbs = sig0_tbs(message, &sig);
    sig.signature = crypto.sign(algorithm, private_key, &tbs)?;

    message.additional.push(ResourceRecord {
        name: Name::root(),
        rtype_with_data: RecordTypeWithData::SIG(sig),
        rclass: RecordClass::ANY,
        ttl: 0,
    });
    Ok(())
}

pub fn verify_and_strip_sig0(
    message: &mut Message,
    crypto: &dyn Crypto,
    algorithm: SignAlgorithm,
    public_key: &[u8],
) -> Result<crate::rr::data::Sig, Error> {
    let pos = message
        .additional
        .iter()
        .position(|rr| rr.rtype() == RecordType::SIG)
        .ok_or(Error::NoTsigRecord)?;
    let sig_rr = message.additional.remove(pos);
    let RecordTypeWithData::SIG(sig) = sig_rr.rtype_with_data else {
        return Err(Error::BadTsigRecord);
    };

    let tbs = sig0_tbs(message, &sig);
    crypto
        .verify(algorithm, public_key, &tbs, &sig.signature)
        .map_err(|_| Error::MacMismatch)?;
    Ok(sig)
}

fn sig0_tbs(message: &Message, sig: &crate::rr::data::Sig) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_u16(sig.type_covered.into());
    w.write_u8(sig.algorithm);
    w.write_u8(sig.labels);
    w.write_u32(sig.original_ttl);
    w.write_u32(sig.expiration);
    w.write_u32(sig.inception);
    w.write_u16(sig.key_tag);
    w.write_bytes(&sig.signer_name.to_uncompressed_octets());
    w.write_bytes(&message.to_octets());
    w.buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::RingCrypto;
    use crate::message::Question;
    use crate::rr::codes::RecordType as RT;
    use crate::rr::{QueryClass, QueryType};
    use std::str::FromStr;

    fn sample_message() -> Message {
        Message::query(
            7,
            Question {
                name: Name::from_str("example.com.").unwrap(),
                qtype: QueryType::Record(RT::A),
                qclass: QueryClass::Record(RecordClass::IN),
            },
        )
    }

    #[test]
    fn tsig_round_trips() {
        let crypto = RingCrypto;
        let key_name = Name::from_str("key.example.com.").unwrap();
        let key = b"super-secret-key-bytes";

        let mut message = sample_message();
        append_tsig(&mut message, &crypto, &key_name, "hmac-sha256", key, 1_700_000_000, 300, None, false).unwrap();

        let bytes = message.to_octets();
        let mut decoded = Message::from_octets(&bytes).unwrap();
        let fields = verify_and_strip_tsig(&mut decoded, &crypto, key, 1_700_000_000, None, false).unwrap();
        assert_eq!(fields.original_id, 7);
        assert!(decoded.additional.iter().all(|rr| rr.rtype() != RT::TSIG));
    }

    #[test]
    fn tsig_round_trips_hmac_md5() {
        let crypto = RingCrypto;
        let key_name = Name::from_str("key.example.com.").unwrap();
        let key = b"super-secret-key-bytes";

        let mut message = sample_message();
        append_tsig(
            &mut message,
            &crypto,
            &key_name,
            "hmac-md5.sig-alg.reg.int",
            key,
            1_700_000_000,
            300,
            None,
            false,
        )
        .unwrap();

        let bytes = message.to_octets();
        let mut decoded = Message::from_octets(&bytes).unwrap();
        let fields = verify_and_strip_tsig(&mut decoded, &crypto, key, 1_700_000_000, None, false).unwrap();
        assert_eq!(fields.original_id, 7);
    }

    #[test]
    fn tsig_chains_to_request_mac() {
        let crypto = RingCrypto;
        let key_name = Name::from_str("key.example.com.").unwrap();
        let key = b"super-secret-key-bytes";

        let mut request = sample_message();
        append_tsig(&mut request, &crypto, &key_name, "hmac-sha256", key, 1_700_000_000, 300, None, false).unwrap();
        let request_bytes = request.to_octets();
        let decoded_request = Message::from_octets(&request_bytes).unwrap();
        let RecordTypeWithData::Unknown { octets, .. } = &decoded_request.additional.last().unwrap().rtype_with_data
        else {
            panic!("expected TSIG rdata");
        };
        let request_mac = decode_tsig_rdata(octets).unwrap().mac;

        let mut response = sample_message();
        append_tsig(
            &mut response,
            &crypto,
            &key_name,
            "hmac-sha256",
            key,
            1_700_000_000,
            300,
            Some(&request_mac),
            false,
        )
        .unwrap();

        let response_bytes = response.to_octets();
        let mut decoded_response = Message::from_octets(&response_bytes).unwrap();
        verify_and_strip_tsig(&mut decoded_response, &crypto, key, 1_700_000_000, Some(&request_mac), false).unwrap();
        assert!(verify_and_strip_tsig(
            &mut Message::from_octets(&response_bytes).unwrap(),
            &crypto,
            key,
            1_700_000_000,
            None,
            false
        )
        .is_err());
    }

    #[test]
    fn tsig_timers_only_digest_ignores_tsig_variables() {
        let crypto = RingCrypto;
        let key_name = Name::from_str("key.example.com.").unwrap();
        let key = b"super-secret-key-bytes";

        let mut message = sample_message();
        append_tsig(&mut message, &crypto, &key_name, "hmac-sha256", key, 1_700_000_000, 300, None, true).unwrap();
        let bytes = message.to_octets();
        let mut decoded = Message::from_octets(&bytes).unwrap();
        verify_and_strip_tsig(&mut decoded, &crypto, key, 1_700_000_000, None, true).unwrap();
        assert!(verify_and_strip_tsig(&mut Message::from_octets(&bytes).unwrap(), &crypto, key, 1_700_000_000, None, false).is_err());
    }

    #[test]
    fn tsig_append_grows_message_by_exactly_one_additional_record() {
        let crypto = RingCrypto;
        let key_name = Name::from_str("key.example.com.").unwrap();
        let key = b"super-secret-key-bytes";

        let mut message = sample_message();
        let pre_tsig_len = message.to_octets().len();
        let pre_arcount = message.additional.len();

        append_tsig(&mut message, &crypto, &key_name, "hmac-sha256", key, 1_700_000_000, 300, None, false).unwrap();

        assert_eq!(message.additional.len(), pre_arcount + 1);
        assert_eq!(message.additional.last().unwrap().rtype(), RT::TSIG);

        let bytes = message.to_octets();
        let tsig_record_len = bytes.len() - pre_tsig_len;
        assert_eq!(bytes.len(), pre_tsig_len + tsig_record_len);

        let decoded = Message::from_octets(&bytes).unwrap();
        assert_eq!(decoded.additional.len(), pre_arcount + 1);
        assert_eq!(decoded.additional.last().unwrap().rtype(), RT::TSIG);
    }

    #[test]
    fn tsig_rejects_wrong_key() {
        let crypto = RingCrypto;
        let key_name = Name::from_str("key.example.com.").unwrap();
        let mut message = sample_message();
        append_tsig(&mut message, &crypto, &key_name, "hmac-sha256", b"key-a", 1_700_000_000, 300, None, false).unwrap();
        let bytes = message.to_octets();
        let mut decoded = Message::from_octets(&bytes).unwrap();
        assert!(verify_and_strip_tsig(&mut decoded, &crypto, b"key-b", 1_700_000_000, None, false).is_err());
    }

    #[test]
    fn tsig_rejects_stale_time() {
        let crypto = RingCrypto;
        let key_name = Name::from_str("key.example.com.").unwrap();
        let key = b"super-secret-key-bytes";
        let mut message = sample_message();
        append_tsig(&mut message, &crypto, &key_name, "hmac-sha256", key, 1_700_000_000, 300, None, false).unwrap();
        let bytes = message.to_octets();
        let mut decoded = Message::from_octets(&bytes).unwrap();
        assert!(matches!(
            verify_and_strip_tsig(&mut decoded, &crypto, key, 1_700_001_000, None, false),
            Err(Error::BadTime)
        ));
    }
}
