//! Cross-module scenarios exercising the codec, zone parser, DNSSEC
//! validator, and TSIG signer together, the way a consumer actually
//! drives this crate rather than one function at a time.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::str::FromStr;

use dns_proto::crypto::{Crypto, RingCrypto, SignAlgorithm};
use dns_proto::dnssec;
use dns_proto::message::{Message, Question};
use dns_proto::name::Name;
use dns_proto::rr::data::{Key, RecordTypeWithData};
use dns_proto::rr::{QueryClass, QueryType, RecordClass, RecordType, ResourceRecord};
use dns_proto::txsig;
use dns_proto::zone::lexer;
use dns_proto::zone::parser::{self, NoIncludes};

#[test]
fn name_compression_shares_a_common_suffix() {
    let www = Name::from_str("www.example.com.").unwrap();
    let mail = Name::from_str("mail.example.com.").unwrap();

    let mut buf = Vec::new();
    let mut compression = HashMap::new();
    www.encode(&mut buf, &mut compression, 0);
    let second_start = buf.len();
    mail.encode(&mut buf, &mut compression, 0);

    assert_eq!(&buf[second_start..second_start + 5], b"\x04mail");
    let pointer = u16::from_be_bytes([buf[second_start + 5], buf[second_start + 6]]);
    assert_eq!(pointer, 0xC000 | 0x0004);
    assert_eq!(buf.len(), 18);
}

#[test]
fn pointer_loop_is_rejected() {
    let buf = b"\x03foo\xC0\x00";
    assert_eq!(Name::decode(buf, 0), Err(dns_proto::name::Error::PointerLoop));
}

#[test]
fn ttl_parsing_accumulates_units_and_rejects_unknown_ones() {
    assert_eq!(parser::parse_ttl("1w2h"), Ok(7 * 86400 + 2 * 3600));
    assert_eq!(parser::parse_ttl("86400"), Ok(86400));
    assert_eq!(parser::parse_ttl("1d1d"), Ok(2 * 86400));
    assert!(parser::parse_ttl("1y").is_err());
}

#[test]
fn generate_directive_expands_a_host_range() {
    let text = "$GENERATE 1-3 host${0,3,d} A 10.0.0.$\n";
    let origin = Name::from_str("example.com.").unwrap();
    let records = parser::parse_zone("zone", text, origin, Some(3600), &mut NoIncludes).unwrap();

    assert_eq!(records.len(), 3);
    let names: Vec<String> = records.iter().map(|rr| rr.name.to_presentation()).collect();
    assert_eq!(
        names,
        vec!["host001.example.com.".to_string(), "host002.example.com.".to_string(), "host003.example.com.".to_string()]
    );
    for (i, rr) in records.iter().enumerate() {
        match &rr.rtype_with_data {
            RecordTypeWithData::A { address } => assert_eq!(*address, Ipv4Addr::new(10, 0, 0, (i + 1) as u8)),
            other => panic!("expected A record, got {other:?}"),
        }
    }
}

#[test]
fn dnssec_verify_round_trip_and_failure_modes() {
    let crypto = RingCrypto;
    let rng = ring::rand::SystemRandom::new();
    let pkcs8 =
        ring::signature::EcdsaKeyPair::generate_pkcs8(&ring::signature::ECDSA_P256_SHA256_FIXED_SIGNING, &rng).unwrap();
    let keypair =
        ring::signature::EcdsaKeyPair::from_pkcs8(&ring::signature::ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &rng)
            .unwrap();
    let public_key = keypair.public_key().as_ref().to_vec();

    let owner = Name::from_str("example.com.").unwrap();
    let rrset = vec![ResourceRecord {
        name: owner.clone(),
        rtype_with_data: RecordTypeWithData::A { address: Ipv4Addr::new(192, 0, 2, 1) },
        rclass: RecordClass::IN,
        ttl: 3600,
    }];

    let now: u32 = 1_700_000_000;
    let sig = dnssec::sign_rrset(
        &crypto,
        SignAlgorithm::EcdsaP256Sha256,
        &owner,
        12345,
        pkcs8.as_ref(),
        &rrset,
        now - 3600,
        now + 3600,
    )
    .unwrap();

    let key = Key { flags: 257, protocol: 3, algorithm: 13, public_key };
    dnssec::verify_rrset(&crypto, &key, &sig, &rrset, now).unwrap();

    let mut tampered = sig.clone();
    tampered.signature[0] ^= 0x01;
    assert!(dnssec::verify_rrset(&crypto, &key, &tampered, &rrset, now).is_err());

    let expired_at = now + 3601 + (sig.expiration - sig.inception);
    assert!(matches!(
        dnssec::verify_rrset(&crypto, &key, &sig, &rrset, expired_at),
        Err(dnssec::Error::Expired)
    ));
}

#[test]
fn tsig_round_trip_detects_tampered_secret_and_grows_additional_by_one() {
    let crypto = RingCrypto;
    let key_name = Name::from_str("key.example.com.").unwrap();
    let key = [0x5Au8; 32];

    let mut message = Message::query(
        99,
        Question {
            name: Name::from_str("example.com.").unwrap(),
            qtype: QueryType::Record(RecordType::A),
            qclass: QueryClass::Record(RecordClass::IN),
        },
    );
    let pre_arcount = message.additional.len();

    txsig::append_tsig(&mut message, &crypto, &key_name, "hmac-sha256", &key, 1_700_000_000, 300, None, false).unwrap();
    assert_eq!(message.additional.len(), pre_arcount + 1);
    assert_eq!(message.additional.last().unwrap().rtype(), RecordType::TSIG);

    let bytes = message.to_octets();
    let mut decoded = Message::from_octets(&bytes).unwrap();
    txsig::verify_and_strip_tsig(&mut decoded, &crypto, &key, 1_700_000_000, None, false).unwrap();

    let mut bad_key = key;
    bad_key[0] ^= 0x01;
    let mut decoded_again = Message::from_octets(&bytes).unwrap();
    assert!(txsig::verify_and_strip_tsig(&mut decoded_again, &crypto, &bad_key, 1_700_000_000, None, false).is_err());
}

#[test]
fn mac_algorithm_covers_all_four_rfc_8945_names() {
    let crypto = RingCrypto;
    let key = b"a shared secret";
    let msg = b"some message bytes";
    for algorithm in [
        dns_proto::crypto::MacAlgorithm::HmacMd5,
        dns_proto::crypto::MacAlgorithm::HmacSha1,
        dns_proto::crypto::MacAlgorithm::HmacSha256,
        dns_proto::crypto::MacAlgorithm::HmacSha512,
    ] {
        assert!(!crypto.mac(algorithm, key, msg).is_empty());
    }
}

#[test]
fn lexer_reports_column_and_token_for_a_bad_record_line() {
    let lines = lexer::tokenize("a.example.com. IN BOGUSTYPE stuff\n").unwrap();
    assert_eq!(lines[0].cols, vec![1, 16, 19, 29]);
}
