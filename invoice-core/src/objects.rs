/// Indirect object identifier. Every object in a generated invoice
/// is written with generation 0, so only the number is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjId(pub u32);

/// The subset of PDF object types (PDF 32000-1:2008 Section 7.3)
/// needed to describe a single-page invoice.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Integer(i64),
    Real(f64),
    /// PDF name object (stored without the leading `/`).
    Name(&'static str),
    /// PDF literal string, already encoded to single-byte text.
    LiteralString(Vec<u8>),
    Array(Vec<PdfObject>),
    /// Key-value pairs. Uses Vec for deterministic output order.
    Dictionary(Vec<(&'static str, PdfObject)>),
    Stream {
        dict: Vec<(&'static str, PdfObject)>,
        data: Vec<u8>,
    },
    Reference(ObjId),
}

impl PdfObject {
    pub fn name(s: &'static str) -> Self {
        PdfObject::Name(s)
    }

    /// Literal string from Rust text, encoded with the same
    /// single-byte mapping the page fonts use.
    pub fn text(s: &str) -> Self {
        PdfObject::LiteralString(crate::fonts::encode_win_ansi(s))
    }

    pub fn reference(id: ObjId) -> Self {
        PdfObject::Reference(id)
    }

    pub fn dict(entries: Vec<(&'static str, PdfObject)>) -> Self {
        PdfObject::Dictionary(entries)
    }

    pub fn stream(dict: Vec<(&'static str, PdfObject)>, data: Vec<u8>) -> Self {
        PdfObject::Stream { dict, data }
    }

    /// A `[llx lly urx ury]` rectangle anchored at the origin.
    pub fn media_box(width: f64, height: f64) -> Self {
        PdfObject::Array(vec![
            PdfObject::Integer(0),
            PdfObject::Integer(0),
            PdfObject::Real(width),
            PdfObject::Real(height),
        ])
    }
}
