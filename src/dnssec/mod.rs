//! DNSSEC (RFC 4034/4035/5155): canonical RRset form, RRSIG
//! signing/verification, key tags, DS digests, and a DS-to-DNSKEY chain
//! check. No resolver or trust-anchor store lives here; callers supply
//! the records they already have and get a yes/no verdict back.

pub mod privatekey;

use std::fmt;

use crate::crypto::{self, Crypto, SignAlgorithm};
use crate::name::Name;
use crate::primitive::Writer;
use crate::rr::data::Sig;
use crate::rr::{RecordType, RecordTypeWithData, ResourceRecord};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    UnsupportedAlgorithm(u8),
    UnsupportedDigestType(u8),
    EmptyRrset,
    RrsetMismatch,
    OwnerTooShort,
    NotYetValid,
    Expired,
    Crypto(crypto::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedAlgorithm(n) => write!(f, "unsupported DNSSEC algorithm {n}"),
            Error::UnsupportedDigestType(n) => write!(f, "unsupported DS digest type {n}"),
            Error::EmptyRrset => write!(f, "cannot sign or verify an empty RRset"),
            Error::RrsetMismatch => write!(f, "RRset does not match the RRSIG's owner/type/class"),
            Error::OwnerTooShort => write!(f, "RR owner has fewer labels than RRSIG.labels"),
            Error::NotYetValid => write!(f, "RRSIG inception is in the future"),
            Error::Expired => write!(f, "RRSIG has expired"),
            Error::Crypto(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<crypto::Error> for Error {
    fn from(e: crypto::Error) -> Self {
        Error::Crypto(e)
    }
}

pub fn sign_algorithm_from_number(n: u8) -> Result<SignAlgorithm, Error> {
    Ok(match n {
        5 => SignAlgorithm::RsaSha1,
        8 => SignAlgorithm::RsaSha256,
        10 => SignAlgorithm::RsaSha512,
        13 => SignAlgorithm::EcdsaP256Sha256,
        14 => SignAlgorithm::EcdsaP384Sha384,
        15 => SignAlgorithm::Ed25519,
        other => return Err(Error::UnsupportedAlgorithm(other)),
    })
}

pub fn sign_algorithm_to_number(alg: SignAlgorithm) -> u8 {
    match alg {
        SignAlgorithm::RsaSha1 => 5,
        SignAlgorithm::RsaSha256 => 8,
        SignAlgorithm::RsaSha512 => 10,
        SignAlgorithm::EcdsaP256Sha256 => 13,
        SignAlgorithm::EcdsaP384Sha384 => 14,
        SignAlgorithm::Ed25519 => 15,
    }
}

/// RFC 4034 appendix B key-tag algorithm: a checksum over the wire-form
/// DNSKEY rdata. Algorithm 1 (RSA/MD5) has its own scheme that this
/// crate does not implement, matching its absence from
/// [`sign_algorithm_from_number`].
pub fn key_tag(key: &crate::rr::data::Key) -> u16 {
    let mut w = Writer::new();
    w.write_u16(key.flags);
    w.write_u8(key.protocol);
    w.write_u8(key.algorithm);
    w.write_bytes(&key.public_key);

    let mut ac: u32 = 0;
    for (i, &byte) in w.buf.iter().enumerate() {
        if i % 2 == 0 {
            ac += u32::from(byte) << 8;
        } else {
            ac += u32::from(byte);
        }
    }
    ac += (ac >> 16) & 0xFFFF;
    (ac & 0xFFFF) as u16
}

/// RFC 4034 section 5.1.4: the DS digest is over the owner name
/// (canonical form) followed by the DNSKEY rdata.
pub fn ds_digest(crypto: &dyn Crypto, owner: &Name, key: &crate::rr::data::Key, digest_type: u8) -> Result<Vec<u8>, Error> {
    let mut w = Writer::new();
    w.write_bytes(&owner.to_lowercase().to_uncompressed_octets());
    w.write_u16(key.flags);
    w.write_u8(key.protocol);
    w.write_u8(key.algorithm);
    w.write_bytes(&key.public_key);

    Ok(match digest_type {
        1 => crypto.digest_sha1(&w.buf),
        2 => crypto.digest_sha256(&w.buf),
        4 => crypto.digest_sha384(&w.buf),
        other => return Err(Error::UnsupportedDigestType(other)),
    })
}

/// Build the RFC 4034 section 3.1.8.1 to-be-signed octet stream for an
/// RRset: the RRSIG rdata minus the signature field, followed by each
/// canonicalized, ttl-normalized RR in the set in canonical ordering.
/// The six steps (per the teacher's commentary style on multi-step wire
/// constructions): (1) RRSIG rdata minus signature, (2) for each RR:
/// canonical owner name, (3) type/class/original-ttl, (4) rdlength,
/// (5) canonical rdata, (6) RRs sorted into canonical order first.
pub fn rrset_tbs(sig: &Sig, rrset: &[ResourceRecord]) -> Result<Vec<u8>, Error> {
    if rrset.is_empty() {
        return Err(Error::EmptyRrset);
    }
    let owner = &rrset[0].name;
    let rtype = rrset[0].rtype();
    let rclass = rrset[0].rclass;
    for rr in rrset {
        if !rr.name.eq_ignore_case(owner) || rr.rtype() != rtype || rr.rclass != rclass {
            return Err(Error::RrsetMismatch);
        }
        if rr.name.label_count() < usize::from(sig.labels) {
            return Err(Error::OwnerTooShort);
        }
    }

    let mut w = Writer::new();
    w.write_u16(sig.type_covered.into());
    w.write_u8(sig.algorithm);
    w.write_u8(sig.labels);
    w.write_u32(sig.original_ttl);
    w.write_u32(sig.expiration);
    w.write_u32(sig.inception);
    w.write_u16(sig.key_tag);
    w.write_bytes(&sig.signer_name.to_uncompressed_octets());

    let mut canon: Vec<ResourceRecord> = rrset
        .iter()
        .map(|rr| ResourceRecord {
            name: wildcard_expand(&rr.name, sig.labels).to_lowercase(),
            rtype_with_data: rr.rtype_with_data.canonicalize(),
            rclass: rr.rclass,
            ttl: sig.original_ttl,
        })
        .collect();
    canon.sort_by(|a, b| canonical_rdata(&a.rtype_with_data).cmp(&canonical_rdata(&b.rtype_with_data)));

    for rr in &canon {
        w.write_bytes(&rr.name.to_uncompressed_octets());
        w.write_u16(rr.rtype().into());
        w.write_u16(rr.rclass.into());
        w.write_u32(rr.ttl);
        let rdata = canonical_rdata(&rr.rtype_with_data);
        w.write_u16(rdata.len() as u16);
        w.write_bytes(&rdata);
    }

    Ok(w.buf)
}

fn canonical_rdata(data: &RecordTypeWithData) -> Vec<u8> {
    let mut w = Writer::new();
    data.canonicalize().encode(&mut w, false);
    w.buf
}

/// RFC 4034 section 3.1.3: when `labels` (the RRSIG's `Labels` field) is
/// less than the RR owner's actual label count, the signature was made
/// over a wildcard name. Substitute `*` followed by the rightmost
/// `labels` labels of the owner name (the root label is never counted
/// on either side, matching [`crate::name::Name::label_count`]).
fn wildcard_expand(name: &Name, labels: u8) -> Name {
    let labels = usize::from(labels);
    let owner_labels = name.label_count();
    if labels >= owner_labels {
        return name.clone();
    }
    let suffix_start = owner_labels - labels;
    let mut wildcard_labels = vec![b"*".to_vec()];
    wildcard_labels.extend_from_slice(&name.labels()[suffix_start..]);
    Name::from_labels(wildcard_labels).unwrap_or_else(|_| name.clone())
}

pub fn sign_rrset(
    crypto: &dyn Crypto,
    algorithm: SignAlgorithm,
    signer_name: &Name,
    key_tag_value: u16,
    private_key: &[u8],
    rrset: &[ResourceRecord],
    inception: u32,
    expiration: u32,
) -> Result<Sig, Error> {
    if rrset.is_empty() {
        return Err(Error::EmptyRrset);
    }
    let mut sig = Sig {
        type_covered: rrset[0].rtype(),
        algorithm: sign_algorithm_to_number(algorithm),
        labels: rrset[0].name.label_count() as u8,
        original_ttl: rrset[0].ttl,
        expiration,
        inception,
        key_tag: key_tag_value,
        signer_name: signer_name.clone(),
        signature: Vec::new(),
    };
    let tbs = rrset_tbs(&sig, rrset)?;
    sig.signature = crypto.sign(algorithm, private_key, &tbs)?;
    Ok(sig)
}

/// Verify `sig` over `rrset` with `public_key`, checking both the
/// cryptographic signature and the validity window against `now` (a
/// caller-supplied Unix timestamp; this module has no clock).
pub fn verify_rrset(
    crypto: &dyn Crypto,
    public_key: &crate::rr::data::Key,
    sig: &Sig,
    rrset: &[ResourceRecord],
    now: u32,
) -> Result<(), Error> {
    if is_before(now, sig.inception) {
        return Err(Error::NotYetValid);
    }
    if is_after(now, sig.expiration) {
        return Err(Error::Expired);
    }
    let algorithm = sign_algorithm_from_number(sig.algorithm)?;
    let tbs = rrset_tbs(sig, rrset)?;
    crypto.verify(algorithm, &public_key.public_key, &tbs, &sig.signature)?;
    Ok(())
}

/// RFC 4034 section 3.1.5 says inception/expiration comparisons must use
/// serial-number arithmetic (RFC 1982), not plain integer comparison, so
/// a 32-bit wraparound decades from now doesn't make every signature
/// look expired.
fn is_before(t1: u32, t2: u32) -> bool {
    (t1.wrapping_sub(t2) as i32) < 0
}

fn is_after(t1: u32, t2: u32) -> bool {
    (t1.wrapping_sub(t2) as i32) > 0
}

/// Check that a DS record matches a DNSKEY, establishing one link of
/// the chain of trust (RFC 4035 section 5.2).
pub fn ds_matches_dnskey(
    crypto: &dyn Crypto,
    owner: &Name,
    ds_key_tag: u16,
    ds_algorithm: u8,
    ds_digest_type: u8,
    ds_digest_value: &[u8],
    dnskey: &crate::rr::data::Key,
) -> Result<bool, Error> {
    if key_tag(dnskey) != ds_key_tag || dnskey.algorithm != ds_algorithm {
        return Ok(false);
    }
    let computed = ds_digest(crypto, owner, dnskey, ds_digest_type)?;
    Ok(crypto::constant_time_eq(&computed, ds_digest_value))
}

/// Verify every RRSIG covering `rrset` against the supplied DNSKEYs,
/// returning the key tags of the DNSKEYs that produced a valid
/// signature. An empty result means the RRset is unsigned or every
/// signature failed; callers decide what that means for their policy
/// (e.g. whether the zone is signed at all).
pub fn verify_message_rrset(
    crypto: &dyn Crypto,
    dnskeys: &[(u16, crate::rr::data::Key)],
    rrset: &[ResourceRecord],
    rrsigs: &[Sig],
    now: u32,
) -> Vec<u16> {
    let mut verified = Vec::new();
    for sig in rrsigs {
        if sig.type_covered != rrset.first().map(ResourceRecord::rtype).unwrap_or(RecordType::from(0u16)) {
            continue;
        }
        for (tag, key) in dnskeys {
            if *tag != sig.key_tag {
                continue;
            }
            if verify_rrset(crypto, key, sig, rrset, now).is_ok() {
                verified.push(*tag);
            }
        }
    }
    verified
}

#[cfg(feature = "dnssec-ring")]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::RingCrypto;
    use crate::rr::data::Key;
    use crate::rr::RecordClass;
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    #[test]
    fn key_tag_matches_known_vector() {
        // RFC 4034 appendix B.1's example DNSKEY, tag 9465 (algorithm 5).
        let key = Key {
            flags: 256,
            protocol: 3,
            algorithm: 5,
            public_key: data_encoding::BASE64
                .decode(
                    b"AQOeiiR0GOMYkDshWoSKz9Xz\
                      fwJr1AYtsmx3TGkJaNXVbfi/\
                      2pHm822aJ5iI9BMzNXxeYCmZ\
                      DRD99WYwYqUSdjMmmAphXdvx\
                      egXd/M5+X7OrzKBaMbCVdFLU\
                      Uh6DhddQ/xymI5DlrhHtV2J+\
                      gmqDlXUMV4IDWpwPdbBzTf+h\
                      aY4VVeEUm/0/d4p4qWjCzt+M\
                      EUaXyJqe3LZh+QxeVDzEJR0I\
                      8RqZZOh0fZZu7CJbNv3Mg2N/\
                      K9B4PQHbI=",
                )
                .unwrap(),
        };
        assert_eq!(key_tag(&key), 9465);
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let crypto = RingCrypto;
        // A fresh P-256 PKCS8 key generated for this test only.
        let rng = ring::rand::SystemRandom::new();
        let pkcs8 = ring::signature::EcdsaKeyPair::generate_pkcs8(
            &ring::signature::ECDSA_P256_SHA256_FIXED_SIGNING,
            &rng,
        )
        .unwrap();
        let keypair = ring::signature::EcdsaKeyPair::from_pkcs8(
            &ring::signature::ECDSA_P256_SHA256_FIXED_SIGNING,
            pkcs8.as_ref(),
            &rng,
        )
        .unwrap();
        let public_key = keypair.public_key().as_ref().to_vec();

        let owner = Name::from_str("example.com.").unwrap();
        let rrset = vec![crate::rr::ResourceRecord {
            name: owner.clone(),
            rtype_with_data: RecordTypeWithData::A { address: Ipv4Addr::new(192, 0, 2, 1) },
            rclass: RecordClass::IN,
            ttl: 300,
        }];

        let sig = sign_rrset(
            &crypto,
            SignAlgorithm::EcdsaP256Sha256,
            &owner,
            12345,
            pkcs8.as_ref(),
            &rrset,
            1_700_000_000,
            1_800_000_000,
        )
        .unwrap();

        let key = Key { flags: 256, protocol: 3, algorithm: 13, public_key };
        verify_rrset(&crypto, &key, &sig, &rrset, 1_750_000_000).unwrap();
        assert!(matches!(
            verify_rrset(&crypto, &key, &sig, &rrset, 1_900_000_000),
            Err(Error::Expired)
        ));

        let mut tampered = sig.clone();
        tampered.signature[0] ^= 0x01;
        assert!(matches!(verify_rrset(&crypto, &key, &tampered, &rrset, 1_750_000_000), Err(Error::Crypto(_))));
    }
}
