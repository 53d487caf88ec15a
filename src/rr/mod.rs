//! The resource record registry: numeric code tables ([`codes`]),
//! per-type rdata ([`data`]), and the zone-file/presentation text form
//! ([`presentation`]).

pub mod codes;
pub mod data;
pub mod presentation;

pub use codes::{QueryClass, QueryType, RecordClass, RecordClassUnknown, RecordType, RecordTypeUnknown};
pub use data::RecordTypeWithData;

use crate::name::Name;

/// A single resource record: owner name, type-tagged data, class, ttl.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResourceRecord {
    pub name: Name,
    pub rtype_with_data: RecordTypeWithData,
    pub rclass: RecordClass,
    pub ttl: u32,
}

impl ResourceRecord {
    pub fn rtype(&self) -> RecordType {
        self.rtype_with_data.rtype()
    }

    pub fn is_unknown(&self) -> bool {
        self.rtype_with_data.is_unknown() || self.rclass.is_unknown()
    }

    pub fn matches_question(&self, qtype: QueryType, qclass: QueryClass) -> bool {
        let type_matches = matches!(qtype, QueryType::Wildcard)
            || matches!(qtype, QueryType::Record(rt) if rt == self.rtype());
        let class_matches = matches!(qclass, QueryClass::Wildcard)
            || matches!(qclass, QueryClass::Record(rc) if rc == self.rclass);
        type_matches && class_matches
    }

    /// True iff `self` and `other` share `(name, type, class)`, i.e.
    /// belong to the same RRset.
    pub fn same_rrset(&self, other: &ResourceRecord) -> bool {
        self.name.eq_ignore_case(&other.name)
            && self.rtype() == other.rtype()
            && self.rclass == other.rclass
    }
}

#[cfg(any(feature = "test-util", test))]
pub mod test_util {
    use super::*;
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    pub fn domain(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    pub fn a_record(name: &str, address: Ipv4Addr) -> ResourceRecord {
        ResourceRecord {
            name: domain(name),
            rtype_with_data: RecordTypeWithData::A { address },
            rclass: RecordClass::IN,
            ttl: 300,
        }
    }

    pub fn ns_record(name: &str, nsdname: &str) -> ResourceRecord {
        ResourceRecord {
            name: domain(name),
            rtype_with_data: RecordTypeWithData::NS { nsdname: domain(nsdname) },
            rclass: RecordClass::IN,
            ttl: 300,
        }
    }
}
