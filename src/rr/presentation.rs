//! Text (zone-file / presentation) form of rdata: the schema-driven
//! counterpart to [`super::data`]'s wire codec. One format function and
//! one parse function per type, both driven by the same field order as
//! the wire encoder.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::name::Name;
use crate::rr::codes::RecordType;
use crate::rr::data::{Key, Loc, Nsec3Param, RecordTypeWithData as D, Sig};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    WrongFieldCount { rtype: RecordType, expected: usize, got: usize },
    BadField { rtype: RecordType, field: &'static str },
    BadName(crate::name::Error),
    UnsupportedForPresentation(RecordType),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WrongFieldCount { rtype, expected, got } => {
                write!(f, "{rtype} rdata expects {expected} fields, got {got}")
            }
            Error::BadField { rtype, field } => write!(f, "bad {field} field in {rtype} rdata"),
            Error::BadName(e) => write!(f, "{e}"),
            Error::UnsupportedForPresentation(rtype) => {
                write!(f, "{rtype} has no presentation-format parser; use the \\# unknown-type form")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<crate::name::Error> for Error {
    fn from(e: crate::name::Error) -> Self {
        Error::BadName(e)
    }
}

/// Chunk base64/hex text into 56-column blocks the way `dig`/BIND do
/// when printing long blobs such as DNSKEY or RRSIG.
fn chunk56(s: &str) -> String {
    if s.len() <= 56 {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, c) in s.chars().enumerate() {
        if i > 0 && i % 56 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

fn to_hex(bytes: &[u8]) -> String {
    data_encoding::HEXUPPER.encode(bytes)
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    data_encoding::HEXUPPER
        .decode(s.to_ascii_uppercase().as_bytes())
        .ok()
}

fn to_base64(bytes: &[u8]) -> String {
    data_encoding::BASE64.encode(bytes)
}

fn from_base64(s: &str) -> Option<Vec<u8>> {
    data_encoding::BASE64.decode(s.as_bytes()).ok()
}

fn quote(bytes: &[u8]) -> String {
    let mut out = String::from("\"");
    for &b in bytes {
        if b == b'"' || b == b'\\' {
            out.push('\\');
            out.push(b as char);
        } else if b.is_ascii_graphic() || b == b' ' {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\{:03}", b));
        }
    }
    out.push('"');
    out
}

fn unquote(s: &str) -> Vec<u8> {
    let inner = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(s);
    let bytes = inner.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            if bytes[i + 1].is_ascii_digit() && i + 3 < bytes.len() {
                if let Ok(v) = std::str::from_utf8(&bytes[i + 1..i + 4]).unwrap_or("").parse::<u16>() {
                    out.push(v as u8);
                    i += 4;
                    continue;
                }
            }
            out.push(bytes[i + 1]);
            i += 2;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

fn types_to_mnemonics(types: &[u16]) -> String {
    types
        .iter()
        .map(|&t| RecordType::from(t).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn types_from_mnemonics(tokens: &[String]) -> Vec<u16> {
    tokens
        .iter()
        .filter_map(|t| RecordType::from_str(t).ok())
        .map(u16::from)
        .collect()
}

/// Format an rdata value's fields, space-separated, in wire order.
pub fn format_rdata(data: &D) -> String {
    match data {
        D::A { address } => address.to_string(),
        D::AAAA { address } => address.to_string(),
        D::NS { nsdname } => nsdname.to_presentation(),
        D::MD { madname } | D::MF { madname } | D::MB { madname } => madname.to_presentation(),
        D::CNAME { cname } => cname.to_presentation(),
        D::SOA { mname, rname, serial, refresh, retry, expire, minimum } => format!(
            "{} {} {serial} {refresh} {retry} {expire} {minimum}",
            mname.to_presentation(),
            rname.to_presentation()
        ),
        D::MG { mdmname } => mdmname.to_presentation(),
        D::MR { newname } => newname.to_presentation(),
        D::NULL { octets } => format!("\\# {} {}", octets.len(), to_hex(octets)),
        D::WKS { address, protocol, bitmap } => format!("{address} {protocol} {}", to_hex(bitmap)),
        D::PTR { ptrdname } => ptrdname.to_presentation(),
        D::HINFO { cpu, os } => format!("{} {}", quote(cpu), quote(os)),
        D::MINFO { rmailbx, emailbx } => {
            format!("{} {}", rmailbx.to_presentation(), emailbx.to_presentation())
        }
        D::MX { preference, exchange } => format!("{preference} {}", exchange.to_presentation()),
        D::TXT { strings } | D::SPF { strings } => {
            strings.iter().map(|s| quote(s)).collect::<Vec<_>>().join(" ")
        }
        D::RP { mbox, txt_dname } => {
            format!("{} {}", mbox.to_presentation(), txt_dname.to_presentation())
        }
        D::AFSDB { subtype, hostname } => format!("{subtype} {}", hostname.to_presentation()),
        D::RT { preference, intermediate } => {
            format!("{preference} {}", intermediate.to_presentation())
        }
        D::SIG(sig) | D::RRSIG(sig) => format_sig(sig),
        D::KEY(key) | D::DNSKEY(key) | D::CDNSKEY(key) => format_key(key),
        D::LOC(loc) => format_loc(loc),
        D::SRV { priority, weight, port, target } => {
            format!("{priority} {weight} {port} {}", target.to_presentation())
        }
        D::NAPTR { order, preference, flags, services, regexp, replacement } => format!(
            "{order} {preference} {} {} {} {}",
            quote(flags),
            quote(services),
            quote(regexp),
            replacement.to_presentation()
        ),
        D::KX { preference, exchanger } => format!("{preference} {}", exchanger.to_presentation()),
        D::CERT { cert_type, key_tag, algorithm, certificate } => {
            format!("{cert_type} {key_tag} {algorithm} {}", chunk56(&to_base64(certificate)))
        }
        D::DNAME { target } => target.to_presentation(),
        D::DS { key_tag, algorithm, digest_type, digest }
        | D::CDS { key_tag, algorithm, digest_type, digest } => {
            format!("{key_tag} {algorithm} {digest_type} {}", to_hex(digest))
        }
        D::SSHFP { algorithm, fp_type, fingerprint } => {
            format!("{algorithm} {fp_type} {}", to_hex(fingerprint))
        }
        D::IPSECKEY { precedence, gateway_type, algorithm, gateway, public_key } => {
            let gw = match gateway_type {
                0 => ".".to_string(),
                1 if gateway.len() == 4 => Ipv4Addr::new(gateway[0], gateway[1], gateway[2], gateway[3]).to_string(),
                2 if gateway.len() == 16 => {
                    let mut a = [0u8; 16];
                    a.copy_from_slice(gateway);
                    Ipv6Addr::from(a).to_string()
                }
                _ => to_hex(gateway),
            };
            format!("{precedence} {gateway_type} {algorithm} {gw} {}", chunk56(&to_base64(public_key)))
        }
        D::NSEC { next_domain_name, types } => {
            format!("{} {}", next_domain_name.to_presentation(), types_to_mnemonics(types))
        }
        D::DHCID { digest } => chunk56(&to_base64(digest)),
        D::NSEC3 { params, next_hashed_owner_name, types } => format!(
            "{} {} {} {} {} {}",
            params.hash_algorithm,
            params.flags,
            params.iterations,
            if params.salt.is_empty() { "-".to_string() } else { to_hex(&params.salt) },
            data_encoding::BASE32HEX_NOPAD.encode(next_hashed_owner_name).to_ascii_lowercase(),
            types_to_mnemonics(types)
        ),
        D::NSEC3PARAM(params) => format!(
            "{} {} {} {}",
            params.hash_algorithm,
            params.flags,
            params.iterations,
            if params.salt.is_empty() { "-".to_string() } else { to_hex(&params.salt) }
        ),
        D::TLSA { usage, selector, matching_type, data }
        | D::SMIMEA { usage, selector, matching_type, data } => {
            format!("{usage} {selector} {matching_type} {}", to_hex(data))
        }
        D::OPENPGPKEY { key } => chunk56(&to_base64(key)),
        D::CSYNC { soa_serial, flags, types } => {
            format!("{soa_serial} {flags} {}", types_to_mnemonics(types))
        }
        D::SVCB { priority, target, params } | D::HTTPS { priority, target, params } => {
            if params.is_empty() {
                format!("{priority} {}", target.to_presentation())
            } else {
                format!("{priority} {} {}", target.to_presentation(), to_hex(params))
            }
        }
        D::URI { priority, weight, target } => {
            format!("{priority} {weight} {}", quote(target))
        }
        D::CAA { flag, tag, value } => {
            format!("{flag} {} {}", String::from_utf8_lossy(tag), quote(value))
        }
        D::Unknown { tag, octets } => format!("\\# {} {}", octets.len(), to_hex(octets)),
    }
}

fn format_sig(sig: &Sig) -> String {
    format!(
        "{} {} {} {} {} {} {} {} {}",
        sig.type_covered,
        sig.algorithm,
        sig.labels,
        sig.original_ttl,
        sig.expiration,
        sig.inception,
        sig.key_tag,
        sig.signer_name.to_presentation(),
        chunk56(&to_base64(&sig.signature))
    )
}

fn format_key(key: &Key) -> String {
    format!(
        "{} {} {} {}",
        key.flags,
        key.protocol,
        key.algorithm,
        chunk56(&to_base64(&key.public_key))
    )
}

fn format_loc(loc: &Loc) -> String {
    // LOC's presentation form is degrees/minutes/seconds; we keep the
    // wire-level fixed-point fields visible rather than re-deriving
    // sexagesimal output, matching how this crate's zone parser
    // round-trips LOC records it did not itself author in DMS form.
    format!(
        "{} {} {} {} {} {} {}",
        loc.version, loc.size, loc.horiz_pre, loc.vert_pre, loc.latitude, loc.longitude, loc.altitude
    )
}

fn name_field(origin: &Name, s: &str) -> Result<Name, Error> {
    Ok(Name::from_relative(origin, s)?)
}

/// Parse rdata fields (already lexed into whitespace-delimited tokens,
/// with any double-quoted strings rejoined into single tokens) for a
/// known type. `\# <len> <hex>` (RFC 3597) is accepted for every type in
/// addition to its native format.
pub fn parse_rdata(rtype: RecordType, origin: &Name, tokens: &[String]) -> Result<D, Error> {
    if let [hash, len, hex] = tokens {
        if hash == "\\#" {
            let len: usize = len.parse().map_err(|_| Error::BadField { rtype, field: "length" })?;
            let octets = from_hex(hex).ok_or(Error::BadField { rtype, field: "hex" })?;
            if octets.len() != len {
                return Err(Error::BadField { rtype, field: "length" });
            }
            let mut r = crate::primitive::Reader::new(&octets);
            return D::decode(rtype, &mut r).map_err(|_| Error::UnsupportedForPresentation(rtype));
        }
    }

    let n = tokens.len();
    macro_rules! need {
        ($want:expr) => {
            if n != $want {
                return Err(Error::WrongFieldCount { rtype, expected: $want, got: n });
            }
        };
    }

    Ok(match rtype {
        RecordType::A => {
            need!(1);
            D::A { address: tokens[0].parse().map_err(|_| Error::BadField { rtype, field: "address" })? }
        }
        RecordType::AAAA => {
            need!(1);
            D::AAAA { address: tokens[0].parse().map_err(|_| Error::BadField { rtype, field: "address" })? }
        }
        RecordType::NS => {
            need!(1);
            D::NS { nsdname: name_field(origin, &tokens[0])? }
        }
        RecordType::CNAME => {
            need!(1);
            D::CNAME { cname: name_field(origin, &tokens[0])? }
        }
        RecordType::DNAME => {
            need!(1);
            D::DNAME { target: name_field(origin, &tokens[0])? }
        }
        RecordType::PTR => {
            need!(1);
            D::PTR { ptrdname: name_field(origin, &tokens[0])? }
        }
        RecordType::MB => {
            need!(1);
            D::MB { madname: name_field(origin, &tokens[0])? }
        }
        RecordType::MG => {
            need!(1);
            D::MG { mdmname: name_field(origin, &tokens[0])? }
        }
        RecordType::MR => {
            need!(1);
            D::MR { newname: name_field(origin, &tokens[0])? }
        }
        RecordType::SOA => {
            need!(7);
            D::SOA {
                mname: name_field(origin, &tokens[0])?,
                rname: name_field(origin, &tokens[1])?,
                serial: parse_u32(rtype, "serial", &tokens[2])?,
                refresh: parse_u32(rtype, "refresh", &tokens[3])?,
                retry: parse_u32(rtype, "retry", &tokens[4])?,
                expire: parse_u32(rtype, "expire", &tokens[5])?,
                minimum: parse_u32(rtype, "minimum", &tokens[6])?,
            }
        }
        RecordType::MX => {
            need!(2);
            D::MX {
                preference: parse_u16(rtype, "preference", &tokens[0])?,
                exchange: name_field(origin, &tokens[1])?,
            }
        }
        RecordType::TXT => D::TXT { strings: tokens.iter().map(|s| unquote(s)).collect() },
        RecordType::SPF => D::SPF { strings: tokens.iter().map(|s| unquote(s)).collect() },
        RecordType::HINFO => {
            need!(2);
            D::HINFO { cpu: unquote(&tokens[0]), os: unquote(&tokens[1]) }
        }
        RecordType::MINFO => {
            need!(2);
            D::MINFO {
                rmailbx: name_field(origin, &tokens[0])?,
                emailbx: name_field(origin, &tokens[1])?,
            }
        }
        RecordType::RP => {
            need!(2);
            D::RP { mbox: name_field(origin, &tokens[0])?, txt_dname: name_field(origin, &tokens[1])? }
        }
        RecordType::AFSDB => {
            need!(2);
            D::AFSDB {
                subtype: parse_u16(rtype, "subtype", &tokens[0])?,
                hostname: name_field(origin, &tokens[1])?,
            }
        }
        RecordType::RT => {
            need!(2);
            D::RT {
                preference: parse_u16(rtype, "preference", &tokens[0])?,
                intermediate: name_field(origin, &tokens[1])?,
            }
        }
        RecordType::KX => {
            need!(2);
            D::KX {
                preference: parse_u16(rtype, "preference", &tokens[0])?,
                exchanger: name_field(origin, &tokens[1])?,
            }
        }
        RecordType::SRV => {
            need!(4);
            D::SRV {
                priority: parse_u16(rtype, "priority", &tokens[0])?,
                weight: parse_u16(rtype, "weight", &tokens[1])?,
                port: parse_u16(rtype, "port", &tokens[2])?,
                target: name_field(origin, &tokens[3])?,
            }
        }
        RecordType::NAPTR => {
            need!(6);
            D::NAPTR {
                order: parse_u16(rtype, "order", &tokens[0])?,
                preference: parse_u16(rtype, "preference", &tokens[1])?,
                flags: unquote(&tokens[2]),
                services: unquote(&tokens[3]),
                regexp: unquote(&tokens[4]),
                replacement: name_field(origin, &tokens[5])?,
            }
        }
        RecordType::DS | RecordType::CDS => {
            need!(4);
            let key_tag = parse_u16(rtype, "key_tag", &tokens[0])?;
            let algorithm = parse_u8(rtype, "algorithm", &tokens[1])?;
            let digest_type = parse_u8(rtype, "digest_type", &tokens[2])?;
            let digest = from_hex(&tokens[3]).ok_or(Error::BadField { rtype, field: "digest" })?;
            if rtype == RecordType::DS {
                D::DS { key_tag, algorithm, digest_type, digest }
            } else {
                D::CDS { key_tag, algorithm, digest_type, digest }
            }
        }
        RecordType::SSHFP => {
            need!(3);
            D::SSHFP {
                algorithm: parse_u8(rtype, "algorithm", &tokens[0])?,
                fp_type: parse_u8(rtype, "fp_type", &tokens[1])?,
                fingerprint: from_hex(&tokens[2]).ok_or(Error::BadField { rtype, field: "fingerprint" })?,
            }
        }
        RecordType::TLSA | RecordType::SMIMEA => {
            need!(4);
            let usage = parse_u8(rtype, "usage", &tokens[0])?;
            let selector = parse_u8(rtype, "selector", &tokens[1])?;
            let matching_type = parse_u8(rtype, "matching_type", &tokens[2])?;
            let data = from_hex(&tokens[3]).ok_or(Error::BadField { rtype, field: "data" })?;
            if rtype == RecordType::TLSA {
                D::TLSA { usage, selector, matching_type, data }
            } else {
                D::SMIMEA { usage, selector, matching_type, data }
            }
        }
        RecordType::DNSKEY | RecordType::KEY | RecordType::CDNSKEY => {
            let flags = parse_u16(rtype, "flags", &tokens[0])?;
            let protocol = parse_u8(rtype, "protocol", &tokens[1])?;
            let algorithm = parse_u8(rtype, "algorithm", &tokens[2])?;
            let public_key =
                from_base64(&tokens[3..].concat()).ok_or(Error::BadField { rtype, field: "public_key" })?;
            let key = Key { flags, protocol, algorithm, public_key };
            match rtype {
                RecordType::DNSKEY => D::DNSKEY(key),
                RecordType::KEY => D::KEY(key),
                _ => D::CDNSKEY(key),
            }
        }
        RecordType::RRSIG | RecordType::SIG => {
            if n < 9 {
                return Err(Error::WrongFieldCount { rtype, expected: 9, got: n });
            }
            let sig = Sig {
                type_covered: RecordType::from_str(&tokens[0]).map_err(|_| Error::BadField { rtype, field: "type_covered" })?,
                algorithm: parse_u8(rtype, "algorithm", &tokens[1])?,
                labels: parse_u8(rtype, "labels", &tokens[2])?,
                original_ttl: parse_u32(rtype, "original_ttl", &tokens[3])?,
                expiration: parse_dns_time(&tokens[4]).ok_or(Error::BadField { rtype, field: "expiration" })?,
                inception: parse_dns_time(&tokens[5]).ok_or(Error::BadField { rtype, field: "inception" })?,
                key_tag: parse_u16(rtype, "key_tag", &tokens[6])?,
                signer_name: name_field(origin, &tokens[7])?,
                signature: from_base64(&tokens[8..].concat()).ok_or(Error::BadField { rtype, field: "signature" })?,
            };
            if rtype == RecordType::RRSIG { D::RRSIG(sig) } else { D::SIG(sig) }
        }
        RecordType::NSEC => {
            if tokens.is_empty() {
                return Err(Error::WrongFieldCount { rtype, expected: 1, got: 0 });
            }
            D::NSEC {
                next_domain_name: name_field(origin, &tokens[0])?,
                types: types_from_mnemonics(&tokens[1..]),
            }
        }
        RecordType::NSEC3PARAM => {
            need!(4);
            D::NSEC3PARAM(parse_nsec3param(rtype, &tokens[0..4])?)
        }
        RecordType::NSEC3 => {
            if n < 5 {
                return Err(Error::WrongFieldCount { rtype, expected: 5, got: n });
            }
            let params = parse_nsec3param(rtype, &tokens[0..4])?;
            let next_hashed_owner_name = data_encoding::BASE32HEX_NOPAD
                .decode(tokens[4].to_ascii_uppercase().as_bytes())
                .map_err(|_| Error::BadField { rtype, field: "next_hashed_owner_name" })?;
            D::NSEC3 {
                params,
                next_hashed_owner_name,
                types: types_from_mnemonics(&tokens[5..]),
            }
        }
        RecordType::CAA => {
            need!(3);
            D::CAA {
                flag: parse_u8(rtype, "flag", &tokens[0])?,
                tag: tokens[1].as_bytes().to_vec(),
                value: unquote(&tokens[2]),
            }
        }
        RecordType::URI => {
            need!(3);
            D::URI {
                priority: parse_u16(rtype, "priority", &tokens[0])?,
                weight: parse_u16(rtype, "weight", &tokens[1])?,
                target: unquote(&tokens[2]),
            }
        }
        RecordType::DHCID => D::DHCID {
            digest: from_base64(&tokens.concat()).ok_or(Error::BadField { rtype, field: "digest" })?,
        },
        RecordType::OPENPGPKEY => D::OPENPGPKEY {
            key: from_base64(&tokens.concat()).ok_or(Error::BadField { rtype, field: "key" })?,
        },
        other => return Err(Error::UnsupportedForPresentation(other)),
    })
}

fn parse_nsec3param(rtype: RecordType, tokens: &[String]) -> Result<Nsec3Param, Error> {
    Ok(Nsec3Param {
        hash_algorithm: parse_u8(rtype, "hash_algorithm", &tokens[0])?,
        flags: parse_u8(rtype, "flags", &tokens[1])?,
        iterations: parse_u16(rtype, "iterations", &tokens[2])?,
        salt: if tokens[3] == "-" {
            Vec::new()
        } else {
            from_hex(&tokens[3]).ok_or(Error::BadField { rtype, field: "salt" })?
        },
    })
}

/// `YYYYMMDDhhmmss`, the DNSSEC presentation form for RRSIG
/// inception/expiration times (RFC 4034 section 3.2).
fn parse_dns_time(s: &str) -> Option<u32> {
    if s.len() == 14 && s.bytes().all(|b| b.is_ascii_digit()) {
        // Kept as a pure calendar->epoch conversion with no library
        // dependency beyond what's already pulled in; leap seconds are
        // not modelled, matching every other DNS implementation.
        let year: i64 = s[0..4].parse().ok()?;
        let month: i64 = s[4..6].parse().ok()?;
        let day: i64 = s[6..8].parse().ok()?;
        let hour: i64 = s[8..10].parse().ok()?;
        let min: i64 = s[10..12].parse().ok()?;
        let sec: i64 = s[12..14].parse().ok()?;
        let days = days_from_civil(year, month, day);
        let epoch = days * 86400 + hour * 3600 + min * 60 + sec;
        u32::try_from(epoch).ok()
    } else {
        s.parse().ok()
    }
}

/// Howard Hinnant's days-from-civil algorithm, the usual
/// dependency-free way to turn a Gregorian date into a day count.
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (m + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

pub fn format_dns_time(epoch: u32) -> String {
    let (y, m, d, hh, mm, ss) = civil_from_epoch(i64::from(epoch));
    format!("{y:04}{m:02}{d:02}{hh:02}{mm:02}{ss:02}")
}

fn civil_from_epoch(epoch: i64) -> (i64, i64, i64, i64, i64, i64) {
    let days = epoch.div_euclid(86400);
    let secs_of_day = epoch.rem_euclid(86400);
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d, secs_of_day / 3600, (secs_of_day % 3600) / 60, secs_of_day % 60)
}

fn parse_u8(rtype: RecordType, field: &'static str, s: &str) -> Result<u8, Error> {
    s.parse().map_err(|_| Error::BadField { rtype, field })
}

fn parse_u16(rtype: RecordType, field: &'static str, s: &str) -> Result<u16, Error> {
    s.parse().map_err(|_| Error::BadField { rtype, field })
}

fn parse_u32(rtype: RecordType, field: &'static str, s: &str) -> Result<u32, Error> {
    s.parse().map_err(|_| Error::BadField { rtype, field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn a_round_trips_through_presentation() {
        let origin = Name::root();
        let data = D::A { address: "192.0.2.1".parse().unwrap() };
        let text = format_rdata(&data);
        assert_eq!(text, "192.0.2.1");
        let tokens: Vec<String> = text.split_whitespace().map(String::from).collect();
        assert_eq!(parse_rdata(RecordType::A, &origin, &tokens).unwrap(), data);
    }

    #[test]
    fn dns_time_round_trips() {
        let t = 1_700_000_000u32;
        let s = format_dns_time(t);
        assert_eq!(parse_dns_time(&s), Some(t));
    }

    #[test]
    fn soa_round_trips_through_presentation() {
        let origin = Name::from_str("example.com.").unwrap();
        let data = D::SOA {
            mname: Name::from_str("ns1.example.com.").unwrap(),
            rname: Name::from_str("hostmaster.example.com.").unwrap(),
            serial: 2024010100,
            refresh: 3600,
            retry: 900,
            expire: 604800,
            minimum: 86400,
        };
        let text = format_rdata(&data);
        let tokens: Vec<String> = text.split_whitespace().map(String::from).collect();
        assert_eq!(parse_rdata(RecordType::SOA, &origin, &tokens).unwrap(), data);
    }

    #[test]
    fn unknown_type_parses_rfc3597_form() {
        let origin = Name::root();
        let tokens: Vec<String> = vec!["\\#".into(), "4".into(), "DEADBEEF".into()];
        let parsed = parse_rdata(RecordType::from(1234), &origin, &tokens).unwrap();
        assert_eq!(
            parsed,
            D::Unknown { tag: crate::rr::codes::RecordTypeUnknown(1234), octets: vec![0xDE, 0xAD, 0xBE, 0xEF] }
        );
    }
}
