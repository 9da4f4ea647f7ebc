use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::fonts::{encode_win_ansi, Font};
use crate::graphics::Color;
use crate::objects::{ObjId, PdfObject};
use crate::writer::{escape_pdf_bytes, PdfWriter};

const CATALOG_OBJ: ObjId = ObjId(1);
const PAGES_OBJ: ObjId = ObjId(2);
const PAGE_OBJ: ObjId = ObjId(3);
const CONTENT_OBJ: ObjId = ObjId(4);
const FIRST_FONT_OBJ_NUM: u32 = 5;

/// Font and size for a run of text. The color is applied as the
/// fill color inside the text object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub font_size: f64,
    pub color: Color,
}

impl TextStyle {
    pub fn regular(font_size: f64) -> Self {
        TextStyle {
            font: Font::Helvetica,
            font_size,
            color: Color::BLACK,
        }
    }

    pub fn bold(font_size: f64) -> Self {
        TextStyle {
            font: Font::HelveticaBold,
            font_size,
            color: Color::BLACK,
        }
    }

    pub fn with_color(self, color: Color) -> Self {
        TextStyle { color, ..self }
    }
}

/// A single-page PDF under construction.
///
/// Drawing calls append operators to an in-memory content stream;
/// nothing but the header reaches the writer until `finish`, which
/// writes every object and the cross-reference table in one pass.
/// Coordinates use PDF's default bottom-left origin.
pub struct PdfDocument<W: Write> {
    writer: PdfWriter<W>,
    width: f64,
    height: f64,
    content_ops: Vec<u8>,
    info: Vec<(&'static str, String)>,
    compress: bool,
}

impl<W: Write> PdfDocument<W> {
    /// Start a document with one page of the given size in points.
    /// Writes the PDF header immediately.
    pub fn new(writer: W, width: f64, height: f64) -> io::Result<Self> {
        let mut writer = PdfWriter::new(writer);
        writer.write_header()?;
        Ok(PdfDocument {
            writer,
            width,
            height,
            content_ops: Vec::new(),
            info: Vec::new(),
            compress: false,
        })
    }

    /// Set a document info entry (e.g. "Title", "Creator").
    pub fn set_info(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.info.push((key, value.to_string()));
        self
    }

    /// Flate-compress the page content stream when finishing.
    pub fn set_compression(&mut self, enabled: bool) -> &mut Self {
        self.compress = enabled;
        self
    }

    /// Place a single line of text with its baseline origin at (x, y).
    /// No wrapping or clipping is applied.
    pub fn place_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) -> &mut Self {
        let escaped = escape_pdf_bytes(&encode_win_ansi(text));
        let head = format!(
            "BT\n{} rg\n/{} {} Tf\n{} {} Td\n(",
            format_color(style.color),
            style.font.resource_name(),
            format_coord(style.font_size),
            format_coord(x),
            format_coord(y),
        );
        self.content_ops.extend_from_slice(head.as_bytes());
        self.content_ops.extend_from_slice(&escaped);
        self.content_ops.extend_from_slice(b") Tj\nET\n");
        self
    }

    /// Fill an axis-aligned rectangle whose lower-left corner is (x, y).
    /// The fill color is scoped to this call.
    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) -> &mut Self {
        let ops = format!(
            "q\n{} rg\n{} {} {} {} re\nf\nQ\n",
            format_color(color),
            format_coord(x),
            format_coord(y),
            format_coord(width),
            format_coord(height),
        );
        self.content_ops.extend_from_slice(ops.as_bytes());
        self
    }

    /// Write the fonts, content stream, page, page tree, catalog,
    /// info dictionary and trailer. Consumes the document and
    /// returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        let mut font_entries = Vec::new();
        for (i, font) in Font::ALL.iter().enumerate() {
            let id = ObjId(FIRST_FONT_OBJ_NUM + i as u32);
            let dict = PdfObject::dict(vec![
                ("Type", PdfObject::name("Font")),
                ("Subtype", PdfObject::name("Type1")),
                ("BaseFont", PdfObject::name(font.base_name())),
                ("Encoding", PdfObject::name("WinAnsiEncoding")),
            ]);
            self.writer.write_object(id, &dict)?;
            font_entries.push((font.resource_name(), PdfObject::reference(id)));
        }

        let content = if self.compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&self.content_ops)?;
            PdfObject::stream(
                vec![("Filter", PdfObject::name("FlateDecode"))],
                encoder.finish()?,
            )
        } else {
            PdfObject::stream(vec![], std::mem::take(&mut self.content_ops))
        };
        self.writer.write_object(CONTENT_OBJ, &content)?;

        let page = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PdfObject::reference(PAGES_OBJ)),
            ("MediaBox", PdfObject::media_box(self.width, self.height)),
            ("Contents", PdfObject::reference(CONTENT_OBJ)),
            (
                "Resources",
                PdfObject::dict(vec![("Font", PdfObject::Dictionary(font_entries))]),
            ),
        ]);
        self.writer.write_object(PAGE_OBJ, &page)?;

        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            ("Kids", PdfObject::Array(vec![PdfObject::reference(PAGE_OBJ)])),
            ("Count", PdfObject::Integer(1)),
        ]);
        self.writer.write_object(PAGES_OBJ, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::reference(PAGES_OBJ)),
        ]);
        self.writer.write_object(CATALOG_OBJ, &catalog)?;

        let info_id = if self.info.is_empty() {
            None
        } else {
            let id = ObjId(FIRST_FONT_OBJ_NUM + Font::ALL.len() as u32);
            let entries = self
                .info
                .iter()
                .map(|(k, v)| (*k, PdfObject::text(v)))
                .collect();
            self.writer.write_object(id, &PdfObject::Dictionary(entries))?;
            Some(id)
        };

        self.writer.write_xref_and_trailer(CATALOG_OBJ, info_id)?;
        Ok(self.writer.into_inner())
    }
}

/// Format a coordinate value for content streams.
pub(crate) fn format_coord(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn format_color(c: Color) -> String {
    format!(
        "{} {} {}",
        format_coord(c.r),
        format_coord(c.g),
        format_coord(c.b)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_formatting() {
        assert_eq!(format_coord(612.0), "612");
        assert_eq!(format_coord(12.5), "12.5");
        assert_eq!(format_coord(-5.0), "-5");
        assert_eq!(format_coord(0.45), "0.45");
        assert_eq!(format_coord(1.0 / 3.0), "0.3333");
    }

    #[test]
    fn accent_color_operands() {
        assert_eq!(format_color(Color::ACCENT), "0.45 0.2 0.6");
    }
}
