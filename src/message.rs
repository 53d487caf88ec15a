//! The full DNS message: header, question, and the three RR sections,
//! plus EDNS(0) (RFC 6891) pseudo-record handling and the UDP
//! truncation policy.

use std::fmt;

use crate::name::Name;
use crate::primitive::{self, Reader, Writer};
use crate::rr::{QueryClass, QueryType, RecordClass, RecordType, RecordTypeWithData, ResourceRecord};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    Primitive(primitive::Error),
    Name(crate::name::Error),
    Data(crate::rr::data::Error),
    RdlengthMismatch,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Primitive(e) => write!(f, "{e}"),
            Error::Name(e) => write!(f, "{e}"),
            Error::Data(e) => write!(f, "{e}"),
            Error::RdlengthMismatch => write!(f, "rdata did not consume exactly rdlength bytes"),
        }
    }
}

impl std::error::Error for Error {}

impl From<primitive::Error> for Error {
    fn from(e: primitive::Error) -> Self {
        Error::Primitive(e)
    }
}
impl From<crate::name::Error> for Error {
    fn from(e: crate::name::Error) -> Self {
        Error::Name(e)
    }
}
impl From<crate::rr::data::Error> for Error {
    fn from(e: crate::rr::data::Error) -> Self {
        Error::Data(e)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Opcode {
    Query,
    IQuery,
    Status,
    Notify,
    Update,
    Reserved(u8),
}

impl From<u8> for Opcode {
    fn from(v: u8) -> Self {
        match v & 0x0F {
            0 => Opcode::Query,
            1 => Opcode::IQuery,
            2 => Opcode::Status,
            4 => Opcode::Notify,
            5 => Opcode::Update,
            other => Opcode::Reserved(other),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(v: Opcode) -> Self {
        match v {
            Opcode::Query => 0,
            Opcode::IQuery => 1,
            Opcode::Status => 2,
            Opcode::Notify => 4,
            Opcode::Update => 5,
            Opcode::Reserved(v) => v,
        }
    }
}

/// The low 4 bits of rcode as carried in the header; the high 8 bits
/// (when EDNS is present) live in the OPT record (RFC 6891 section
/// 6.1.3) and are combined by [`Message::full_rcode`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Rcode(pub u16);

impl Rcode {
    pub const NO_ERROR: Rcode = Rcode(0);
    pub const FORMAT_ERROR: Rcode = Rcode(1);
    pub const SERVER_FAILURE: Rcode = Rcode(2);
    pub const NAME_ERROR: Rcode = Rcode(3);
    pub const NOT_IMPLEMENTED: Rcode = Rcode(4);
    pub const REFUSED: Rcode = Rcode(5);
    pub const YXDOMAIN: Rcode = Rcode(6);
    pub const YXRRSET: Rcode = Rcode(7);
    pub const NXRRSET: Rcode = Rcode(8);
    pub const NOTAUTH: Rcode = Rcode(9);
    pub const NOTZONE: Rcode = Rcode(10);
    pub const BADSIG: Rcode = Rcode(16);
    pub const BADKEY: Rcode = Rcode(17);
    pub const BADTIME: Rcode = Rcode(18);
    pub const BADMODE: Rcode = Rcode(19);
    pub const BADNAME: Rcode = Rcode(20);
    pub const BADALG: Rcode = Rcode(21);
    pub const BADTRUNC: Rcode = Rcode(22);
    pub const BADCOOKIE: Rcode = Rcode(23);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Header {
    pub id: u16,
    pub is_response: bool,
    pub opcode: Opcode,
    pub is_authoritative: bool,
    pub is_truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub z: bool,
    pub authentic_data: bool,
    pub checking_disabled: bool,
    pub rcode_low: u8,
}

impl Header {
    fn flags(&self) -> u16 {
        let mut flags = 0u16;
        if self.is_response {
            flags |= 0x8000;
        }
        flags |= (u16::from(u8::from(self.opcode)) & 0x0F) << 11;
        if self.is_authoritative {
            flags |= 0x0400;
        }
        if self.is_truncated {
            flags |= 0x0200;
        }
        if self.recursion_desired {
            flags |= 0x0100;
        }
        if self.recursion_available {
            flags |= 0x0080;
        }
        if self.z {
            flags |= 0x0040;
        }
        if self.authentic_data {
            flags |= 0x0020;
        }
        if self.checking_disabled {
            flags |= 0x0010;
        }
        flags |= u16::from(self.rcode_low & 0x0F);
        flags
    }

    fn from_flags(flags: u16) -> Header {
        Header {
            id: 0,
            is_response: flags & 0x8000 != 0,
            opcode: Opcode::from(((flags >> 11) & 0x0F) as u8),
            is_authoritative: flags & 0x0400 != 0,
            is_truncated: flags & 0x0200 != 0,
            recursion_desired: flags & 0x0100 != 0,
            recursion_available: flags & 0x0080 != 0,
            z: flags & 0x0040 != 0,
            authentic_data: flags & 0x0020 != 0,
            checking_disabled: flags & 0x0010 != 0,
            rcode_low: (flags & 0x0F) as u8,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Question {
    pub name: Name,
    pub qtype: QueryType,
    pub qclass: QueryClass,
}

/// EDNS(0) (RFC 6891) options, once unpacked from the OPT pseudo-record.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Edns {
    pub udp_payload_size: u16,
    pub extended_rcode: u8,
    pub version: u8,
    pub dnssec_ok: bool,
    pub options: Vec<(u16, Vec<u8>)>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

impl Message {
    pub fn query(id: u16, question: Question) -> Message {
        Message {
            header: Header {
                id,
                is_response: false,
                opcode: Opcode::Query,
                is_authoritative: false,
                is_truncated: false,
                recursion_desired: true,
                recursion_available: false,
                z: false,
                authentic_data: false,
                checking_disabled: false,
                rcode_low: 0,
            },
            questions: vec![question],
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// Find and unpack the EDNS OPT pseudo-record, if present.
    pub fn edns(&self) -> Option<Edns> {
        let opt = self
            .additional
            .iter()
            .find(|rr| rr.rtype() == RecordType::OPT)?;
        let RecordTypeWithData::Unknown { octets, .. } = &opt.rtype_with_data else {
            return None;
        };
        let class: u16 = opt.rclass.into();
        let ttl = opt.ttl;
        let extended_rcode = (ttl >> 24) as u8;
        let version = ((ttl >> 16) & 0xFF) as u8;
        let dnssec_ok = ttl & 0x8000 != 0;

        let mut options = Vec::new();
        let mut r = Reader::new(octets);
        while !r.is_empty() {
            let Ok(code) = r.read_u16() else { break };
            let Ok(len) = r.read_u16() else { break };
            let Ok(value) = r.read_bytes(usize::from(len)) else { break };
            options.push((code, value.to_vec()));
        }

        Some(Edns { udp_payload_size: class, extended_rcode, version, dnssec_ok, options })
    }

    /// Combine the header's low rcode nibble with EDNS's extended rcode
    /// byte, per RFC 6891 section 6.1.3.
    pub fn full_rcode(&self) -> u16 {
        let high = self.edns().map_or(0, |e| u16::from(e.extended_rcode));
        (high << 4) | u16::from(self.header.rcode_low)
    }

    /// Replace (or insert) the OPT pseudo-record reflecting `edns`.
    pub fn set_edns(&mut self, edns: Edns) {
        self.additional.retain(|rr| rr.rtype() != RecordType::OPT);
        let mut opt_data = Vec::new();
        for (code, value) in &edns.options {
            opt_data.extend_from_slice(&code.to_be_bytes());
            opt_data.extend_from_slice(&(value.len() as u16).to_be_bytes());
            opt_data.extend_from_slice(value);
        }
        let mut ttl = (u32::from(edns.extended_rcode)) << 24 | (u32::from(edns.version)) << 16;
        if edns.dnssec_ok {
            ttl |= 0x8000;
        }
        self.additional.push(ResourceRecord {
            name: Name::root(),
            rtype_with_data: RecordTypeWithData::Unknown {
                tag: crate::rr::RecordTypeUnknown(RecordType::OPT.into()),
                octets: opt_data,
            },
            rclass: RecordClass::from(edns.udp_payload_size),
            ttl,
        });
    }

    /// Encode the full message with name compression, unconditionally
    /// (no truncation budget).
    pub fn to_octets(&self) -> Vec<u8> {
        self.encode_with_budget(None).0
    }

    /// Encode, dropping records greedily from the end of
    /// answer/authority/additional (in that priority order) to fit
    /// within `max_len` bytes, setting `TC` if the answer+authority
    /// content had to be cut. Additional records may be silently
    /// dropped without setting `TC` (standard behaviour).
    pub fn to_octets_truncated(&self, max_len: usize) -> Vec<u8> {
        self.encode_with_budget(Some(max_len)).0
    }

    fn encode_with_budget(&self, max_len: Option<usize>) -> (Vec<u8>, bool) {
        let mut w = Writer::new();
        // Header is fixed-size; reserve it and patch counts at the end.
        w.write_u16(self.header.id);
        w.write_u16(self.header.flags());
        w.write_u16(0); // qdcount
        w.write_u16(0); // ancount
        w.write_u16(0); // nscount
        w.write_u16(0); // arcount

        for q in &self.questions {
            w.write_name(&q.name, true);
            w.write_u16(q.qtype.into());
            w.write_u16(q.qclass.into());
        }
        let qdcount = self.questions.len() as u16;

        // `truncated` covers answer/authority overflow only: that's what
        // sets TC. Additional-section overflow is tracked separately and
        // drops records silently, per RFC 1035 section 4.1.1 / section 4.4.
        let mut truncated = false;
        let ancount = write_section_budgeted(&mut w, &self.answers, max_len, &mut truncated);
        let nscount = if truncated {
            0
        } else {
            write_section_budgeted(&mut w, &self.authority, max_len, &mut truncated)
        };
        let arcount = if truncated {
            // Additional records are dropped silently when TC is set.
            0
        } else {
            let mut additional_truncated = false;
            write_section_budgeted(&mut w, &self.additional, max_len, &mut additional_truncated)
        };

        if truncated {
            let flags_with_tc = (self.header.flags()) | 0x0200;
            w.buf[2..4].copy_from_slice(&flags_with_tc.to_be_bytes());
        }
        w.buf[4..6].copy_from_slice(&qdcount.to_be_bytes());
        w.buf[6..8].copy_from_slice(&ancount.to_be_bytes());
        w.buf[8..10].copy_from_slice(&nscount.to_be_bytes());
        w.buf[10..12].copy_from_slice(&arcount.to_be_bytes());

        (w.buf, truncated)
    }

    pub fn from_octets(buf: &[u8]) -> Result<Message, Error> {
        let mut r = Reader::new(buf);
        let id = r.read_u16()?;
        let flags = r.read_u16()?;
        let mut header = Header::from_flags(flags);
        header.id = id;
        let qdcount = r.read_u16()?;
        let ancount = r.read_u16()?;
        let nscount = r.read_u16()?;
        let arcount = r.read_u16()?;

        let mut questions = Vec::with_capacity(qdcount as usize);
        for _ in 0..qdcount {
            if r.is_empty() {
                // Tolerant of truncation: stop cleanly.
                return Ok(Message { header, questions, answers: vec![], authority: vec![], additional: vec![] });
            }
            let name = r.read_name()?;
            let qtype = QueryType::from(r.read_u16()?);
            let qclass = QueryClass::from(r.read_u16()?);
            questions.push(Question { name, qtype, qclass });
        }

        let answers = read_section(&mut r, ancount)?;
        let authority = read_section(&mut r, nscount)?;
        let additional = read_section(&mut r, arcount)?;

        Ok(Message { header, questions, answers, authority, additional })
    }
}

fn write_section_budgeted(
    w: &mut Writer,
    records: &[ResourceRecord],
    max_len: Option<usize>,
    truncated: &mut bool,
) -> u16 {
    let mut count = 0u16;
    for rr in records {
        if *truncated {
            break;
        }
        let before = w.buf.len();
        let before_compression = w.compression.clone();
        write_rr(w, rr);
        if let Some(max) = max_len {
            if w.buf.len() > max {
                w.buf.truncate(before);
                w.compression = before_compression;
                *truncated = true;
                break;
            }
        }
        count += 1;
    }
    count
}

fn write_rr(w: &mut Writer, rr: &ResourceRecord) {
    w.write_name(&rr.name, true);
    w.write_u16(rr.rtype().into());
    w.write_u16(rr.rclass.into());
    w.write_u32(rr.ttl);
    let _ = w.write_length_prefixed::<std::convert::Infallible>(|w| {
        rr.rtype_with_data.encode(w, true);
        Ok(())
    });
}

fn read_section(r: &mut Reader<'_>, count: u16) -> Result<Vec<ResourceRecord>, Error> {
    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        if r.is_empty() {
            break;
        }
        let name = r.read_name()?;
        let rtype = RecordType::from(r.read_u16()?);
        let rclass = RecordClass::from(r.read_u16()?);
        let ttl = r.read_u32()?;
        let rdlength = usize::from(r.read_u16()?);
        // rdlength discipline: scope a sub-reader so a short/malformed
        // rdlength can never make a variant's decoder read into the
        // next record.
        let mut sub = r.sub_reader(rdlength)?;
        let data = RecordTypeWithData::decode(rtype, &mut sub)?;
        records.push(ResourceRecord { name, rtype_with_data: data, rclass, ttl });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::test_util::a_record;
    use std::str::FromStr;

    #[test]
    fn query_round_trips() {
        let q = Question {
            name: Name::from_str("example.com.").unwrap(),
            qtype: QueryType::Record(RecordType::A),
            qclass: QueryClass::Record(RecordClass::IN),
        };
        let m = Message::query(42, q);
        let bytes = m.to_octets();
        let decoded = Message::from_octets(&bytes).unwrap();
        assert_eq!(decoded.header.id, 42);
        assert_eq!(decoded.questions.len(), 1);
    }

    #[test]
    fn name_compression_reduces_size() {
        let q = Question {
            name: Name::from_str("www.example.com.").unwrap(),
            qtype: QueryType::Record(RecordType::A),
            qclass: QueryClass::Record(RecordClass::IN),
        };
        let mut m = Message::query(1, q);
        m.answers.push(a_record("www.example.com.", "192.0.2.1".parse().unwrap()));
        m.answers.push(a_record("www.example.com.", "192.0.2.2".parse().unwrap()));
        let bytes = m.to_octets();
        let decoded = Message::from_octets(&bytes).unwrap();
        assert_eq!(decoded.answers.len(), 2);
    }

    #[test]
    fn truncation_sets_tc_and_drops_records() {
        let q = Question {
            name: Name::from_str("example.com.").unwrap(),
            qtype: QueryType::Record(RecordType::A),
            qclass: QueryClass::Record(RecordClass::IN),
        };
        let mut m = Message::query(1, q);
        for i in 0..200u8 {
            m.answers.push(a_record("example.com.", std::net::Ipv4Addr::new(10, 0, 0, i)));
        }
        let bytes = m.to_octets_truncated(200);
        let decoded = Message::from_octets(&bytes).unwrap();
        assert!(decoded.header.is_truncated);
        assert!(decoded.answers.len() < 200);
    }

    #[test]
    fn edns_round_trips() {
        let q = Question {
            name: Name::root(),
            qtype: QueryType::Record(RecordType::A),
            qclass: QueryClass::Record(RecordClass::IN),
        };
        let mut m = Message::query(1, q);
        m.set_edns(Edns {
            udp_payload_size: 4096,
            extended_rcode: 0,
            version: 0,
            dnssec_ok: true,
            options: vec![(10, vec![1, 2, 3, 4])],
        });
        let bytes = m.to_octets();
        let decoded = Message::from_octets(&bytes).unwrap();
        let edns = decoded.edns().unwrap();
        assert_eq!(edns.udp_payload_size, 4096);
        assert!(edns.dnssec_ok);
        assert_eq!(edns.options, vec![(10, vec![1, 2, 3, 4])]);
    }
}
