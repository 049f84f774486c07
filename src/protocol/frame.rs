use std::fmt::{Display, Formatter};

use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, Bytes, BytesMut};

use super::name::{Compressor, Name};
use super::rdata::RData;
use super::reader::Reader;
use crate::Error;

pub const HEADER_LENGTH: usize = 12;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RCode {
    NoError = 0,
    FormatError = 1,
    ServerFailure = 2,
    NameError = 3,
    NotImplemented = 4,
    Refused = 5,
    YXDomain = 6,
    YXRRSet = 7,
    NXRRSet = 8,
    NotAuth = 9,
    NotZone = 10,
}

impl RCode {
    pub fn parse_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::NoError),
            1 => Some(Self::FormatError),
            2 => Some(Self::ServerFailure),
            3 => Some(Self::NameError),
            4 => Some(Self::NotImplemented),
            5 => Some(Self::Refused),
            6 => Some(Self::YXDomain),
            7 => Some(Self::YXRRSet),
            8 => Some(Self::NXRRSet),
            9 => Some(Self::NotAuth),
            10 => Some(Self::NotZone),
            _ => None,
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Kind {
    /// a host address
    A = 1,
    /// an authoritative name server
    NS = 2,
    /// a mail destination
    MD = 3,
    /// a mail forwarder
    MF = 4,
    /// the canonical name for an alias
    CNAME = 5,
    /// a marks the start of a zone of authority
    SOA = 6,
    /// a mailbox domain name
    MB = 7,
    /// a mail group member
    MG = 8,
    /// a mail rename domain name
    MR = 9,
    /// a null RR
    NULL = 10,
    /// a well known service description
    WKS = 11,
    /// a domain name pointer
    PTR = 12,
    /// host information
    HINFO = 13,
    /// mailbox or mail list information
    MINFO = 14,
    /// mail exchange
    MX = 15,
    /// text strings
    TXT = 16,
    /// responsible person
    RP = 17,
    /// AFS database location
    AFSDB = 18,

    AAAA = 28,

    /// service and protocol
    SRV = 33,
    /// naming authority pointer
    NAPTR = 35,

    A6 = 38,

    /// delegation of a whole subtree
    DNAME = 39,

    SPF = 99,

    IXFR = 251,

    /// A request for a transfer of an entire zone
    AXFR = 252,
    /// A request for mailbox-related records (MB, MG or MR)
    MAILB = 253,
    /// A request for mail agent RRs
    MAILA = 254,
    /// A request for all records
    ANY = 255,
}

impl Kind {
    pub fn parse_u16(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::A),
            2 => Some(Self::NS),
            3 => Some(Self::MD),
            4 => Some(Self::MF),
            5 => Some(Self::CNAME),
            6 => Some(Self::SOA),
            7 => Some(Self::MB),
            8 => Some(Self::MG),
            9 => Some(Self::MR),
            10 => Some(Self::NULL),
            11 => Some(Self::WKS),
            12 => Some(Self::PTR),
            13 => Some(Self::HINFO),
            14 => Some(Self::MINFO),
            15 => Some(Self::MX),
            16 => Some(Self::TXT),
            17 => Some(Self::RP),
            18 => Some(Self::AFSDB),
            28 => Some(Self::AAAA),
            33 => Some(Self::SRV),
            35 => Some(Self::NAPTR),
            38 => Some(Self::A6),
            39 => Some(Self::DNAME),
            99 => Some(Self::SPF),
            251 => Some(Self::IXFR),
            252 => Some(Self::AXFR),
            253 => Some(Self::MAILB),
            254 => Some(Self::MAILA),
            255 => Some(Self::ANY),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Class {
    /// the Internet
    IN = 1,
    /// the CSNET
    CS = 2,
    /// the CHAOS, see https://en.wikipedia.org/wiki/Chaosnet
    CH = 3,
    /// Hesiod, see https://en.wikipedia.org/wiki/Hesiod_(name_service)
    HS = 4,
}

impl Class {
    pub fn parse_u16(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::IN),
            2 => Some(Self::CS),
            3 => Some(Self::CH),
            4 => Some(Self::HS),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OpCode {
    StandardQuery = 0,
    InverseQuery = 1,
    Status = 2,
    Reserved = 3,
    Notify = 4,
    Update = 5,
}

impl OpCode {
    pub fn parse_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::StandardQuery),
            1 => Some(Self::InverseQuery),
            2 => Some(Self::Status),
            3 => Some(Self::Reserved),
            4 => Some(Self::Notify),
            5 => Some(Self::Update),
            _ => None,
        }
    }
}

pub struct FlagsBuilder(u16);

impl FlagsBuilder {
    pub fn request(mut self) -> Self {
        self.0 &= 0x8000 - 1;
        self
    }

    pub fn response(mut self) -> Self {
        self.0 |= 0x8000;
        self
    }

    pub fn opcode(mut self, opcode: OpCode) -> Self {
        self.0 &= 0x87ff;
        self.0 |= (opcode as u16) << 11;
        self
    }

    pub fn rcode(mut self, c: RCode) -> Self {
        self.0 &= 0xfff0;
        self.0 |= c as u16;
        self
    }

    #[inline]
    fn bit(mut self, mask: u16, enabled: bool) -> Self {
        if enabled {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
        self
    }

    pub fn authoritative(self, enabled: bool) -> Self {
        self.bit(1 << 10, enabled)
    }

    pub fn truncated(self, enabled: bool) -> Self {
        self.bit(1 << 9, enabled)
    }

    pub fn recursive_query(self, enabled: bool) -> Self {
        self.bit(1 << 8, enabled)
    }

    pub fn recursive_available(self, enabled: bool) -> Self {
        self.bit(1 << 7, enabled)
    }

    pub fn build(self) -> Flags {
        Flags(self.0)
    }
}

/// The two flag bytes of the message header, kept as the raw 16 bits so
/// reserved bits and unassigned codes survive a decode/encode cycle.
///
///  - http://www.tcpipguide.com/free/t_DNSMessageHeaderandQuestionSectionFormat.htm
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Flags(u16);

impl Flags {
    pub fn builder() -> FlagsBuilder {
        FlagsBuilder(0)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn is_response(&self) -> bool {
        self.0 & 0x8000 != 0
    }

    /// The raw 4-bit operation code.
    pub fn opcode_bits(&self) -> u8 {
        ((self.0 >> 11) & 0x000f) as u8
    }

    pub fn opcode(&self) -> Option<OpCode> {
        OpCode::parse_u8(self.opcode_bits())
    }

    pub fn is_authoritative(&self) -> bool {
        (self.0 >> 10) & 0x01 != 0
    }

    pub fn is_message_truncated(&self) -> bool {
        (self.0 >> 9) & 0x01 != 0
    }

    pub fn is_recursive_query(&self) -> bool {
        (self.0 >> 8) & 0x01 != 0
    }

    pub fn is_recursion_available(&self) -> bool {
        (self.0 >> 7) & 0x01 != 0
    }

    pub fn reserved(&self) -> u16 {
        // 3 bits
        (self.0 >> 4) & 0x0007
    }

    /// The raw 4-bit result code.
    pub fn rcode_bits(&self) -> u8 {
        (self.0 & 0x000f) as u8
    }

    pub fn response_code(&self) -> Option<RCode> {
        RCode::parse_u8(self.rcode_bits())
    }
}

impl From<u16> for Flags {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Header {
    pub id: u16,
    pub flags: Flags,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub name: Name,
    pub kind: u16,
    pub class: u16,
}

impl Query {
    pub fn new(name: Name, kind: Kind, class: Class) -> Self {
        Self {
            name,
            kind: kind as u16,
            class: class as u16,
        }
    }

    fn decode(r: &mut Reader<'_>) -> crate::Result<Self> {
        Ok(Self {
            name: r.name()?,
            kind: r.u16()?,
            class: r.u16()?,
        })
    }

    fn encode(&self, dst: &mut BytesMut, compressor: &mut Compressor) -> crate::Result<()> {
        self.name.encode_compressed(dst, compressor)?;
        dst.put_u16(self.kind);
        dst.put_u16(self.class);
        Ok(())
    }
}

/// Resource Record
#[derive(Debug, Clone)]
pub struct Record {
    pub name: Name,
    pub kind: u16,
    pub class: u16,
    pub ttl: u32,
    /// The payload length as read from the wire, recomputed on encode.
    pub rdlength: u16,
    pub data: RData,
    /// Copied from the authoritative bit of the enclosing message.
    pub auth: bool,
}

// rdlength is derived from the payload and takes no part in the comparison
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.class == other.class
            && self.ttl == other.ttl
            && self.data == other.data
            && self.auth == other.auth
    }
}

impl Eq for Record {}

impl Record {
    /// Builds a record whose type is taken from the payload.
    pub fn new(name: Name, class: Class, ttl: u32, data: RData) -> Self {
        let kind = data.kind().map(|it| it as u16).unwrap_or_default();
        Self::with_kind(name, kind, class as u16, ttl, data)
    }

    pub fn with_kind(name: Name, kind: u16, class: u16, ttl: u32, data: RData) -> Self {
        Self {
            name,
            kind,
            class,
            ttl,
            rdlength: 0,
            data,
            auth: false,
        }
    }

    fn decode(r: &mut Reader<'_>, auth: bool, strict: bool) -> crate::Result<Self> {
        let name = r.name()?;
        let kind = r.u16()?;
        let class = r.u16()?;
        let ttl = r.u32()?;
        let rdlength = r.u16()?;

        let start = r.pos();
        let data = RData::decode(kind, rdlength, r)?;

        let consumed = r.pos() - start;
        if consumed != rdlength as usize {
            if strict {
                bail!(Error::RdataLengthMismatch {
                    offset: start,
                    declared: rdlength,
                    consumed,
                });
            }
            warn!(
                "rdata of type {} at offset {} declares {} bytes but {} were consumed, skip to the declared end",
                kind, start, rdlength, consumed
            );
            r.seek(start + rdlength as usize);
        }

        Ok(Self {
            name,
            kind,
            class,
            ttl,
            rdlength,
            data,
            auth,
        })
    }

    fn encode(&self, dst: &mut BytesMut, compressor: &mut Compressor) -> crate::Result<()> {
        self.name.encode_compressed(dst, compressor)?;
        dst.put_u16(self.kind);
        dst.put_u16(self.class);
        dst.put_u32(self.ttl);

        let pos = dst.len();
        dst.put_u16(0);
        self.data.encode_into(dst, Some(compressor))?;

        let size = dst.len() - pos - 2;
        if size > u16::MAX as usize {
            bail!(Error::StringTooLong {
                length: size,
                width: 2,
            });
        }
        BigEndian::write_u16(&mut dst[pos..], size as u16);
        Ok(())
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.\t{}\t", &self.name, self.ttl)?;
        match Class::parse_u16(self.class) {
            Some(class) => write!(f, "{:?}", class)?,
            None => write!(f, "CLASS{}", self.class)?,
        }
        write!(f, "\t{}", &self.data)
    }
}

struct Section {
    name: &'static str,
    count: u16,
}

/// DNS message, see links below:
///  - https://www.firewall.cx/networking/network-protocols/dns-protocol/protocols-dns-query.html
///  - http://www.tcpipguide.com/free/t_DNSMessagingandMessageResourceRecordandMasterFileF.htm
///
/// The section counts of the header are not stored, they always equal the
/// lengths of the section vectors.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub queries: Vec<Query>,
    pub answers: Vec<Record>,
    pub authority: Vec<Record>,
    pub additional: Vec<Record>,
}

impl Message {
    pub fn builder() -> MessageBuilder {
        Default::default()
    }

    pub fn id(&self) -> u16 {
        self.header.id
    }

    pub fn set_id(&mut self, id: u16) {
        self.header.id = id;
    }

    pub fn flags(&self) -> Flags {
        self.header.flags
    }

    #[inline]
    pub fn question_count(&self) -> u16 {
        self.queries.len() as u16
    }

    #[inline]
    pub fn answer_count(&self) -> u16 {
        self.answers.len() as u16
    }

    #[inline]
    pub fn authority_count(&self) -> u16 {
        self.authority.len() as u16
    }

    #[inline]
    pub fn additional_count(&self) -> u16 {
        self.additional.len() as u16
    }

    /// Decodes one whole message.
    ///
    /// A record whose payload does not fill exactly its declared rdlength is
    /// logged and the decoder resumes right after the declared length.
    pub fn decode(raw: &[u8]) -> crate::Result<Self> {
        Self::decode_(raw, false)
    }

    /// Like [`Message::decode`], but an rdlength mismatch fails with
    /// [`Error::RdataLengthMismatch`].
    pub fn decode_strict(raw: &[u8]) -> crate::Result<Self> {
        Self::decode_(raw, true)
    }

    fn decode_(raw: &[u8], strict: bool) -> crate::Result<Self> {
        if raw.len() < HEADER_LENGTH {
            bail!(Error::Truncated {
                offset: 0,
                wanted: HEADER_LENGTH,
            });
        }

        let mut r = Reader::new(raw);

        let id = r.u16()?;
        let flags = Flags(r.u16()?);

        let nqueries = r.u16()?;
        let sections = [
            Section {
                name: "answer",
                count: r.u16()?,
            },
            Section {
                name: "authority",
                count: r.u16()?,
            },
            Section {
                name: "additional",
                count: r.u16()?,
            },
        ];

        let mut queries = Vec::with_capacity(nqueries as usize);
        for _ in 0..nqueries {
            queries.push(Query::decode(&mut r)?);
        }

        let auth = flags.is_authoritative();
        let mut records: [Vec<Record>; 3] = Default::default();
        for (section, dst) in sections.iter().zip(records.iter_mut()) {
            dst.reserve(section.count as usize);
            for i in 0..section.count {
                let record = Record::decode(&mut r, auth, strict).map_err(|e| {
                    e.context(format!(
                        "cannot decode {} record #{} of message 0x{:04x}",
                        section.name, i, id
                    ))
                })?;
                dst.push(record);
            }
        }

        if r.remaining() > 0 {
            debug!(
                "ignore {} trailing bytes of message 0x{:04x}",
                r.remaining(),
                id
            );
        }

        let [answers, authority, additional] = records;

        Ok(Self {
            header: Header { id, flags },
            queries,
            answers,
            authority,
            additional,
        })
    }

    /// Appends the encoded message to `dst`. Section counts are taken from the
    /// section lengths and names are compressed against earlier names.
    pub fn encode(&self, dst: &mut BytesMut) -> crate::Result<()> {
        for (count, name) in [
            (self.queries.len(), "queries"),
            (self.answers.len(), "answers"),
            (self.authority.len(), "authority"),
            (self.additional.len(), "additional"),
        ] {
            if count > u16::MAX as usize {
                bail!("too many {}: {}", name, count);
            }
        }

        let mut compressor = Compressor::new(dst.len());

        dst.reserve(512);
        dst.put_u16(self.header.id);
        dst.put_u16(self.header.flags.0);
        dst.put_u16(self.question_count());
        dst.put_u16(self.answer_count());
        dst.put_u16(self.authority_count());
        dst.put_u16(self.additional_count());

        for next in self.queries.iter() {
            next.encode(dst, &mut compressor)?;
        }
        for next in self
            .answers
            .iter()
            .chain(self.authority.iter())
            .chain(self.additional.iter())
        {
            next.encode(dst, &mut compressor)?;
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> crate::Result<Bytes> {
        let mut b = BytesMut::new();
        self.encode(&mut b)?;
        Ok(b.freeze())
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            ";; id: 0x{:04x}, flags: 0x{:04x}, QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
            self.header.id,
            self.header.flags.0,
            self.question_count(),
            self.answer_count(),
            self.authority_count(),
            self.additional_count()
        )?;
        for next in self.queries.iter() {
            writeln!(f, ";{}.\t{}\t{}", &next.name, next.class, next.kind)?;
        }
        for next in self
            .answers
            .iter()
            .chain(self.authority.iter())
            .chain(self.additional.iter())
        {
            writeln!(f, "{}", next)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MessageBuilder {
    id: u16,
    flags: Flags,
    questions: Vec<(String, u16, u16)>,
    queries: Vec<Query>,
    answers: Vec<Record>,
    authority: Vec<Record>,
    additional: Vec<Record>,
}

impl MessageBuilder {
    pub fn id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Adds a question by its textual name, which is validated on `build`.
    pub fn question(mut self, name: &str, kind: Kind, class: Class) -> Self {
        self.questions.push((name.to_string(), kind as u16, class as u16));
        self
    }

    pub fn query(mut self, query: Query) -> Self {
        self.queries.push(query);
        self
    }

    pub fn answer(mut self, record: Record) -> Self {
        self.answers.push(record);
        self
    }

    pub fn authority(mut self, record: Record) -> Self {
        self.authority.push(record);
        self
    }

    pub fn additional(mut self, record: Record) -> Self {
        self.additional.push(record);
        self
    }

    pub fn build(self) -> crate::Result<Message> {
        let Self {
            id,
            flags,
            questions,
            mut queries,
            answers,
            authority,
            additional,
        } = self;

        for (name, kind, class) in questions {
            let name = name.parse::<Name>()?;
            queries.push(Query { name, kind, class });
        }

        let auth = flags.is_authoritative();
        let mark = |mut records: Vec<Record>| {
            for next in records.iter_mut() {
                next.auth = auth;
            }
            records
        };

        Ok(Message {
            header: Header { id, flags },
            queries,
            answers: mark(answers),
            authority: mark(authority),
            additional: mark(additional),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    use crate::protocol::rdata::{A6, AFSDB, HINFO, MINFO, MX, NAPTR, RP, SOA, SRV, WKS};

    fn init() {
        pretty_env_logger::try_init_timed().ok();
    }

    /// Header, one query, a compressed answer of an unknown type and one
    /// additional address record.
    const UNKNOWN_ANSWER: &str = concat!(
        "0100", // id
        "00",   // answer bit, opcode nibble, auth bit, trunc bit, recursive bit
        "00",   // recursion available, reserved bits, response code nibble
        "0001", "0001", "0000", "0001", // counts
        "03666f6f0362617200", "dead", "beef", // foo.bar type=0xdead cls=0xbeef
        "c00c", "dead", "beef", "00000101", "0008", "736f6d6564617461", // answer
        "0362617a0362616e00", "0001", "0001", "00000101", "0004", "01020304", // additional
    );

    #[test]
    fn test_decode_unknown_and_reencode() {
        init();

        let raw = hex::decode(UNKNOWN_ANSWER).unwrap();
        let msg = Message::decode(&raw[..]).unwrap();

        info!("{}", &msg);

        assert_eq!(0x0100, msg.id());
        assert_eq!(
            vec![Query {
                name: Name::from_dotted(b"foo.bar"),
                kind: 0xdead,
                class: 0xbeef,
            }],
            msg.queries
        );
        assert_eq!(
            vec![Record::with_kind(
                Name::from_dotted(b"foo.bar"),
                0xdead,
                0xbeef,
                257,
                RData::UNKNOWN(Bytes::from_static(b"somedata"))
            )],
            msg.answers
        );
        assert!(msg.authority.is_empty());
        assert_eq!(
            vec![Record::new(
                Name::from_dotted(b"baz.ban"),
                Class::IN,
                257,
                RData::A("1.2.3.4".parse().unwrap())
            )],
            msg.additional
        );
        assert_eq!(8, msg.answers[0].rdlength);

        let enc = msg.to_bytes().unwrap();
        assert_eq!(&raw[..], &enc[..]);
    }

    #[test]
    fn test_decode_empty_query() {
        init();

        let raw = hex::decode("010000000000000000000000").unwrap();
        let msg = Message::decode(&raw[..]).unwrap();
        assert_eq!(256, msg.id());
        assert!(!msg.flags().is_response());
        assert_eq!(Some(OpCode::StandardQuery), msg.flags().opcode());
        assert!(!msg.flags().is_authoritative());
        assert!(!msg.flags().is_message_truncated());
        assert!(msg.queries.is_empty());
        assert!(msg.answers.is_empty());
        assert!(msg.authority.is_empty());
        assert!(msg.additional.is_empty());
    }

    #[test]
    fn test_decode_response() {
        init();

        let raw = hex::decode("16068180000100020000000105626169647503636f6d0000010001c00c000100010000012200046ef24442c00c00010001000001220004279c420a0000290580000000000000").unwrap();
        let msg = Message::decode(&raw[..]).unwrap();

        assert_eq!(0x1606, msg.id());
        assert_eq!(2, msg.answer_count());
        assert_eq!(1, msg.additional_count());

        for (i, answer) in msg.answers.iter().enumerate() {
            info!("answer#{}: {}", i, answer);
            assert_eq!("baidu.com", &answer.name.to_string());
            assert_eq!(Some(Kind::A), Kind::parse_u16(answer.kind));
            assert_eq!(Some(Class::IN), Class::parse_u16(answer.class));
            assert_eq!(0x122, answer.ttl);
        }
        assert_eq!(RData::A("110.242.68.66".parse().unwrap()), msg.answers[0].data);
        assert_eq!(RData::A("39.156.66.10".parse().unwrap()), msg.answers[1].data);

        // the EDNS pseudo record is kept verbatim
        let opt = &msg.additional[0];
        assert!(opt.name.is_root());
        assert_eq!(41, opt.kind);
        assert_eq!(RData::UNKNOWN(Bytes::new()), opt.data);
    }

    #[test]
    fn test_decode_cname_chain() {
        init();

        let raw = hex::decode("e7ad81800001000e000000010377777707796f757475626503636f6d0000010001c00c00050001000000ab00160a796f75747562652d7569016c06676f6f676c65c018c02d00010001000000ad00048efa442ec02d00010001000000ad00048efa48eec02d00010001000000ad00048efabceec02d00010001000000ad00048efa488ec02d00010001000000ad00048efa48aec02d00010001000000ad00048efab00ec02d00010001000000ad00048efabd0ec02d00010001000000ad00048efad98ec02d00010001000000ad00048efb282ec02d00010001000000ad00048efa440ec02d00010001000000ad0004acd90c8ec02d00010001000000ad0004acd90e4ec02d00010001000000ad00048efa446e0000290200000000000000").unwrap();
        let msg = Message::decode(&raw[..]).unwrap();

        assert_eq!(14, msg.answer_count());
        assert_eq!(
            RData::CNAME(Name::from_dotted(b"youtube-ui.l.google.com")),
            msg.answers[0].data
        );
        for next in msg.answers.iter().skip(1) {
            assert!(matches!(next.data, RData::A(_)));
            assert_eq!("youtube-ui.l.google.com", &next.name.to_string());
        }

        // compression makes the re-encoded message decode to the same thing
        let enc = msg.to_bytes().unwrap();
        assert_eq!(msg, Message::decode(&enc[..]).unwrap());
    }

    #[test]
    fn test_flags() {
        init();

        let raw =
            hex::decode("6e1c818200010000000000010462696e6702636e00000100010000290580000000000000")
                .unwrap();
        let msg = Message::decode(&raw[..]).unwrap();

        let f = msg.flags();
        assert_eq!(0x8182, f.bits());
        assert!(f.is_response(), "should be response");
        assert_eq!(
            Some(OpCode::StandardQuery),
            f.opcode(),
            "should be standard query"
        );
        assert!(!f.is_authoritative());
        assert!(!f.is_message_truncated());
        assert!(f.is_recursive_query());
        assert!(f.is_recursion_available());
        assert_eq!(0, f.reserved());
        assert_eq!(Some(RCode::ServerFailure), f.response_code());
    }

    #[test]
    fn test_unassigned_codes_survive() {
        let f = Flags::from(0x7f7f);
        assert_eq!(0x0f, f.opcode_bits());
        assert_eq!(None, f.opcode());
        assert_eq!(0x0f, f.rcode_bits());
        assert_eq!(None, f.response_code());
        assert_eq!(0x7, f.reserved());

        let msg = Message {
            header: Header { id: 7, flags: f },
            ..Default::default()
        };
        let enc = msg.to_bytes().unwrap();
        assert_eq!(msg, Message::decode(&enc[..]).unwrap());
    }

    #[test]
    fn test_authoritative_marks_records() {
        init();

        for (flags, auth) in [("00", false), ("04", true)] {
            let raw = hex::decode(format!(
                "0100{}00000000010000000000000100010000000000040102030400",
                flags
            ))
            .unwrap();
            let msg = Message::decode(&raw[..]).unwrap();
            assert_eq!(1, msg.answer_count());
            assert_eq!(auth, msg.answers[0].auth);
            assert_eq!(RData::A("1.2.3.4".parse().unwrap()), msg.answers[0].data);
        }
    }

    #[test]
    fn test_rdlength_mismatch_resync() {
        init();

        // an A record declaring 5 bytes, followed by a valid A record
        let raw = hex::decode(concat!(
            "0001", "8000", "0000", "0002", "0000", "0000",
            "00", "0001", "0001", "0000000a", "0005", "0102030405",
            "00", "0001", "0001", "0000000a", "0004", "05060708",
        ))
        .unwrap();

        let msg = Message::decode(&raw[..]).unwrap();
        assert_eq!(2, msg.answer_count());
        assert_eq!(5, msg.answers[0].rdlength);
        assert_eq!(RData::A("1.2.3.4".parse().unwrap()), msg.answers[0].data);
        assert_eq!(RData::A("5.6.7.8".parse().unwrap()), msg.answers[1].data);

        let res = Message::decode_strict(&raw[..]);
        assert!(res.is_err_and(|e| matches!(
            e.downcast_ref::<Error>(),
            Some(Error::RdataLengthMismatch {
                declared: 5,
                consumed: 4,
                ..
            })
        )));
    }

    #[test]
    fn test_count_mismatch_fails() {
        init();

        // header says one answer, but the message stops after the query
        let raw = hex::decode("01000000000100010000000003666f6f00000100010000").unwrap();
        let res = Message::decode(&raw[..]);
        assert!(res.is_err_and(|e| {
            info!("decode failed: {:#}", e);
            matches!(e.downcast_ref::<Error>(), Some(Error::Truncated { .. }))
        }));

        // short header
        assert!(Message::decode(b"").is_err());
        assert!(Message::decode(&[0u8; 11]).is_err());
    }

    #[test]
    fn test_round_trip() {
        init();

        let msg = Message::builder()
            .id(0xef96)
            .flags(
                Flags::builder()
                    .response()
                    .authoritative(true)
                    .recursive_query(true)
                    .recursive_available(true)
                    .build(),
            )
            .question("example.com", Kind::MX, Class::IN)
            .answer(Record::new(
                Name::from_dotted(b"example.com"),
                Class::IN,
                300,
                RData::MX(MX {
                    preference: 10,
                    mail_exchange: Name::from_dotted(b"mail.example.com"),
                }),
            ))
            .authority(Record::new(
                Name::from_dotted(b"example.com"),
                Class::IN,
                60,
                RData::SOA(SOA {
                    primary_nameserver: Name::from_dotted(b"ns1.example.com"),
                    responsible_authority_mailbox: Name::from_dotted(b"hostmaster.example.com"),
                    serial_number: 2024010101,
                    refresh_interval: 900,
                    retry_interval: 900,
                    expire_limit: 1800,
                    minimum_ttl: 60,
                }),
            ))
            .additional(Record::new(
                Name::from_dotted(b"mail.example.com"),
                Class::IN,
                300,
                RData::AAAA("2001:db8::25".parse().unwrap()),
            ))
            .build()
            .unwrap();

        assert!(msg.answers[0].auth);

        let enc = msg.to_bytes().unwrap();
        let dec = Message::decode_strict(&enc[..]).unwrap();
        assert_eq!(msg, dec);

        // encode ignores whatever rdlength the caller left behind
        assert_eq!(enc, dec.to_bytes().unwrap());
    }

    #[test]
    fn test_round_trip_every_payload() {
        init();

        let name = |s: &str| Name::from_dotted(s.as_bytes());

        let payloads = vec![
            RData::A("1.2.3.4".parse().unwrap()),
            RData::NS(name("ns1.example.com")),
            RData::MD(name("md.example.com")),
            RData::MF(name("mf.example.com")),
            RData::CNAME(name("www.example.com")),
            RData::SOA(SOA {
                primary_nameserver: name("ns1.example.com"),
                responsible_authority_mailbox: name("hostmaster.example.com"),
                serial_number: 12,
                refresh_interval: 34,
                retry_interval: 56,
                expire_limit: 78,
                minimum_ttl: 90,
            }),
            RData::MB(name("mb.example.com")),
            RData::MG(name("mg.example.com")),
            RData::MR(name("mr.example.com")),
            RData::NULL(Bytes::from_static(b"\x00foo bar\xff")),
            RData::WKS(WKS {
                address: "1.2.3.4".parse().unwrap(),
                protocol: 6,
                bitmap: Bytes::from_static(b"\x00\x01\x80"),
            }),
            RData::PTR(name("www.example.com")),
            RData::HINFO(HINFO {
                cpu: Bytes::from_static(b"fast"),
                os: Bytes::from_static(b"great"),
            }),
            RData::MINFO(MINFO {
                rmailbx: name("admin.example.com"),
                emailbx: name("errors.example.com"),
            }),
            RData::MX(MX {
                preference: 10,
                mail_exchange: name("mail.example.com"),
            }),
            RData::TXT(vec![Bytes::from_static(b"foo"), Bytes::new()]),
            RData::RP(RP {
                mbox: name("alice.example.com"),
                txt: name("example.com"),
            }),
            RData::AFSDB(AFSDB {
                subtype: 1,
                hostname: name("afs.example.com"),
            }),
            RData::AAAA("2001:db8::25".parse().unwrap()),
            RData::SRV(SRV {
                priority: 1,
                weight: 2,
                port: 5060,
                target: name("sip.example.com"),
            }),
            RData::NAPTR(NAPTR {
                order: 100,
                preference: 10,
                flags: Bytes::from_static(b"u"),
                service: Bytes::from_static(b"sip+E2U"),
                regexp: Bytes::from_static(b"!^.*$!sip:info@example.com!"),
                replacement: Name::root(),
            }),
            RData::A6(A6::new(64, "::1:2".parse().unwrap(), Some(name("prefix.example.com")))),
            RData::A6(A6::new(0, "1234::5678".parse().unwrap(), None)),
            RData::DNAME(name("example.net")),
            RData::SPF(vec![Bytes::from_static(b"v=spf1 -all")]),
        ];

        let mut builder = Message::builder()
            .id(0x1234)
            .flags(Flags::builder().response().authoritative(true).build())
            .question("example.com", Kind::ANY, Class::IN);
        for next in payloads {
            builder = builder.answer(Record::new(name("example.com"), Class::IN, 300, next));
        }
        let msg = builder
            .additional(Record::with_kind(
                name("www.example.com"),
                0xdead,
                Class::IN as u16,
                60,
                RData::UNKNOWN(Bytes::from_static(b"somedata")),
            ))
            .build()
            .unwrap();

        let enc = msg.to_bytes().unwrap();
        let dec = Message::decode_strict(&enc[..]).unwrap();
        assert_eq!(25, dec.answer_count());
        assert_eq!(msg, dec);
        assert_eq!(enc, dec.to_bytes().unwrap());
    }

    #[test]
    fn test_message_builder() {
        init();

        // good
        {
            let domain = "google.com";
            let msg = Message::builder()
                .id(1234)
                .question(&format!("{}.", domain), Kind::A, Class::IN)
                .build();

            assert!(msg.is_ok_and(|msg| {
                assert_eq!(1234, msg.id());
                assert_eq!(1, msg.question_count());
                assert_eq!(domain, &msg.queries[0].name.to_string());
                true
            }));
        }

        // bad
        {
            let msg = Message::builder()
                .id(1234)
                .question("It's a bad domain", Kind::A, Class::IN)
                .build();
            assert!(msg.is_err());
        }
    }

    #[test]
    fn test_flags_builder() {
        let flags = Flags::builder()
            .request()
            .recursive_query(true)
            .opcode(OpCode::StandardQuery)
            .build();

        assert!(!flags.is_response());
        assert_eq!(Some(OpCode::StandardQuery), flags.opcode());
        assert!(flags.is_recursive_query());
        assert!(!flags.is_recursion_available());
        assert!(!flags.is_authoritative());
        assert!(!flags.is_message_truncated());
        assert_eq!(0, flags.reserved());
        assert_eq!(Some(RCode::NoError), flags.response_code());

        let flags = Flags::builder()
            .response()
            .opcode(OpCode::Notify)
            .rcode(RCode::Refused)
            .truncated(true)
            .build();
        assert_eq!(0xa205, flags.bits());
    }
}
