//! Numeric code tables: record types, classes, query pseudo-types, and
//! opcodes/rcodes. Each follows the teacher's `From<u16> for X` /
//! `From<X> for u16` round-trip pattern with an `Unknown(n)` fallback so
//! the closed IANA code space is total.

use std::fmt;

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $unknown:ident, $repr:ty {
            $( $variant:ident = $value:expr, $text:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub enum $name {
            $( $variant, )*
            Unknown($unknown),
        }

        #[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $unknown(pub $repr);

        impl $name {
            pub fn is_unknown(&self) -> bool {
                matches!(self, $name::Unknown(_))
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                match value {
                    $( $value => $name::$variant, )*
                    other => $name::Unknown($unknown(other)),
                }
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> Self {
                match value {
                    $( $name::$variant => $value, )*
                    $name::Unknown($unknown(v)) => v,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( $name::$variant => write!(f, $text), )*
                    $name::Unknown($unknown(v)) => write!(f, "{v}"),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ();
            fn from_str(s: &str) -> Result<Self, ()> {
                Ok(match s.to_ascii_uppercase().as_str() {
                    $( $text => $name::$variant, )*
                    other => {
                        if let Ok(n) = other.parse::<$repr>() {
                            $name::Unknown($unknown(n))
                        } else {
                            return Err(());
                        }
                    }
                })
            }
        }

        #[cfg(any(feature = "test-util", test))]
        impl<'a> arbitrary::Arbitrary<'a> for $name {
            fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
                Ok(Self::from(u.arbitrary::<$repr>()?))
            }
        }
    };
}

code_enum!(
    /// Resource record (and zone-file) type codes.
    RecordType, RecordTypeUnknown, u16 {
        A = 1, "A",
        NS = 2, "NS",
        MD = 3, "MD",
        MF = 4, "MF",
        CNAME = 5, "CNAME",
        SOA = 6, "SOA",
        MB = 7, "MB",
        MG = 8, "MG",
        MR = 9, "MR",
        NULL = 10, "NULL",
        WKS = 11, "WKS",
        PTR = 12, "PTR",
        HINFO = 13, "HINFO",
        MINFO = 14, "MINFO",
        MX = 15, "MX",
        TXT = 16, "TXT",
        RP = 17, "RP",
        AFSDB = 18, "AFSDB",
        RT = 21, "RT",
        SIG = 24, "SIG",
        KEY = 25, "KEY",
        AAAA = 28, "AAAA",
        LOC = 29, "LOC",
        SRV = 33, "SRV",
        NAPTR = 35, "NAPTR",
        KX = 36, "KX",
        CERT = 37, "CERT",
        DNAME = 39, "DNAME",
        OPT = 41, "OPT",
        DS = 43, "DS",
        SSHFP = 44, "SSHFP",
        IPSECKEY = 45, "IPSECKEY",
        RRSIG = 46, "RRSIG",
        NSEC = 47, "NSEC",
        DNSKEY = 48, "DNSKEY",
        DHCID = 49, "DHCID",
        NSEC3 = 50, "NSEC3",
        NSEC3PARAM = 51, "NSEC3PARAM",
        TLSA = 52, "TLSA",
        SMIMEA = 53, "SMIMEA",
        HIP = 55, "HIP",
        CDS = 59, "CDS",
        CDNSKEY = 60, "CDNSKEY",
        OPENPGPKEY = 61, "OPENPGPKEY",
        CSYNC = 62, "CSYNC",
        SVCB = 64, "SVCB",
        HTTPS = 65, "HTTPS",
        SPF = 99, "SPF",
        TKEY = 249, "TKEY",
        TSIG = 250, "TSIG",
        URI = 256, "URI",
        CAA = 257, "CAA",
        TA = 32768, "TA",
        DLV = 32769, "DLV",
    }
);

code_enum!(
    /// Record classes.
    RecordClass, RecordClassUnknown, u16 {
        IN = 1, "IN",
        CH = 3, "CH",
        HS = 4, "HS",
        NONE = 254, "NONE",
    }
);

/// Query types are a superset of record types, adding meta-query
/// pseudo-types that can never appear as an RR's actual type.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum QueryType {
    Record(RecordType),
    IXFR,
    AXFR,
    MAILB,
    MAILA,
    Wildcard,
}

impl QueryType {
    pub fn is_unknown(&self) -> bool {
        matches!(self, QueryType::Record(r) if r.is_unknown())
    }
}

impl From<u16> for QueryType {
    fn from(value: u16) -> Self {
        match value {
            251 => QueryType::IXFR,
            252 => QueryType::AXFR,
            253 => QueryType::MAILB,
            254 => QueryType::MAILA,
            255 => QueryType::Wildcard,
            _ => QueryType::Record(RecordType::from(value)),
        }
    }
}

impl From<QueryType> for u16 {
    fn from(value: QueryType) -> Self {
        match value {
            QueryType::IXFR => 251,
            QueryType::AXFR => 252,
            QueryType::MAILB => 253,
            QueryType::MAILA => 254,
            QueryType::Wildcard => 255,
            QueryType::Record(r) => r.into(),
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for QueryType {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u16>()?))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum QueryClass {
    Record(RecordClass),
    Wildcard,
}

impl QueryClass {
    pub fn is_unknown(&self) -> bool {
        matches!(self, QueryClass::Record(c) if c.is_unknown())
    }
}

impl From<u16> for QueryClass {
    fn from(value: u16) -> Self {
        match value {
            255 => QueryClass::Wildcard,
            _ => QueryClass::Record(RecordClass::from(value)),
        }
    }
}

impl From<QueryClass> for u16 {
    fn from(value: QueryClass) -> Self {
        match value {
            QueryClass::Wildcard => 255,
            QueryClass::Record(c) => c.into(),
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for QueryClass {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u16>()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_round_trip() {
        for code in [1u16, 6, 15, 28, 46, 48, 50, 257, 32768, 9999] {
            assert_eq!(u16::from(RecordType::from(code)), code);
        }
    }

    #[test]
    fn record_class_round_trip() {
        for code in [1u16, 3, 4, 254, 9999] {
            assert_eq!(u16::from(RecordClass::from(code)), code);
        }
    }

    #[test]
    fn query_type_round_trip() {
        for code in [1u16, 251, 252, 253, 254, 255, 46] {
            assert_eq!(u16::from(QueryType::from(code)), code);
        }
    }

    #[test]
    fn record_type_display_parses_back() {
        let rt = RecordType::DNSKEY;
        assert_eq!(rt.to_string().parse::<RecordType>().unwrap(), rt);
    }
}
