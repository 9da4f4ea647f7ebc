//! Single-page invoice layout.
//!
//! Everything is drawn at absolute coordinates with one cursor that
//! only moves down the page. Nothing wraps and nothing paginates:
//! long descriptions run past their column and a long item list runs
//! past the bottom margin. Both cases are logged, not corrected.

use std::io::Write;

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::document::{PdfDocument, TextStyle};
use crate::error::Result;
use crate::fonts::Font;
use crate::graphics::Color;
use crate::model::FinalizedInvoice;
use crate::totals::round_currency;

/// US Letter, in points.
pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;
const MARGIN: f64 = 50.0;

const TABLE_HEADERS: [&str; 4] = ["Description", "Qty", "Rate", "Amount"];
/// Column offsets from the left margin, and their widths.
const COLUMN_OFFSETS: [f64; 4] = [0.0, 300.0, 360.0, 440.0];
const COLUMN_WIDTHS: [f64; 4] = [300.0, 60.0, 80.0, 80.0];
const HEADER_BAR_HEIGHT: f64 = 25.0;
const STRIPE_HEIGHT: f64 = 20.0;
const ROW_PITCH: f64 = 25.0;
const TOTAL_BOX_WIDTH: f64 = 160.0;
const TOTAL_BOX_HEIGHT: f64 = 25.0;
const FOOTER_Y: f64 = 50.0;
const FOOTER_TEXT: &str = "Thank you for your business!";

/// Issuer block printed in the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Letterhead {
    pub name: String,
    /// Address and contact lines, drawn under the name in order.
    pub lines: Vec<String>,
}

impl Default for Letterhead {
    fn default() -> Self {
        Letterhead {
            name: "ACME CORPORATION".to_string(),
            lines: vec![
                "123 Business Street".to_string(),
                "Business City, BC 12345".to_string(),
                "contact@acmecorp.com | (555) 123-4567".to_string(),
            ],
        }
    }
}

/// Anything that can turn a finalized invoice into document bytes.
pub trait DocumentRenderer {
    fn render(&self, invoice: &FinalizedInvoice) -> Result<Vec<u8>>;
}

/// Draws the fixed invoice layout onto a letter-size PDF page.
#[derive(Debug, Clone, Default)]
pub struct InvoiceRenderer {
    letterhead: Letterhead,
    compress: bool,
}

impl InvoiceRenderer {
    pub fn new(letterhead: Letterhead) -> Self {
        InvoiceRenderer {
            letterhead,
            compress: false,
        }
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Render into any writer and hand it back once the trailer is written.
    pub fn render_to<W: Write>(&self, invoice: &FinalizedInvoice, writer: W) -> Result<W> {
        let mut doc = PdfDocument::new(writer, PAGE_WIDTH, PAGE_HEIGHT)?;
        doc.set_compression(self.compress);
        doc.set_info("Title", &format!("Invoice {}", invoice.invoice_number()));
        doc.set_info("Author", &self.letterhead.name);
        doc.set_info("Creator", concat!("invoice-core ", env!("CARGO_PKG_VERSION")));

        let mut page = Page {
            doc: &mut doc,
            y: PAGE_HEIGHT - MARGIN,
        };
        page.letterhead(&self.letterhead);
        page.title(invoice);
        page.bill_to(invoice);
        page.items_table(invoice);
        page.totals(invoice);
        page.notes(invoice.notes());
        page.footer();
        debug!(
            "laid out invoice {} with {} items, cursor ended at y={}",
            invoice.invoice_number(),
            invoice.items().len(),
            page.y
        );

        Ok(doc.finish()?)
    }
}

impl DocumentRenderer for InvoiceRenderer {
    fn render(&self, invoice: &FinalizedInvoice) -> Result<Vec<u8>> {
        let bytes = self.render_to(invoice, Vec::new())?;
        debug!(
            "serialized invoice {} to {} bytes",
            invoice.invoice_number(),
            bytes.len()
        );
        Ok(bytes)
    }
}

/// `$` and exactly two decimals, no grouping: `$1234.50`.
pub fn format_currency(amount: Decimal) -> String {
    format!("${:.2}", round_currency(amount))
}

/// Layout cursor over an open page.
struct Page<'a, W: Write> {
    doc: &'a mut PdfDocument<W>,
    y: f64,
}

impl<W: Write> Page<'_, W> {
    fn text(&mut self, text: &str, x: f64, y: f64, style: TextStyle) {
        self.doc.place_text(text, x, y, &style);
    }

    fn letterhead(&mut self, letterhead: &Letterhead) {
        let name_style = TextStyle::bold(24.0).with_color(Color::ACCENT);
        self.text(&letterhead.name, MARGIN, self.y, name_style);

        let line_style = TextStyle::regular(12.0).with_color(Color::MUTED);
        for (i, line) in letterhead.lines.iter().enumerate() {
            self.y -= if i == 0 { 25.0 } else { 15.0 };
            self.text(line, MARGIN, self.y, line_style);
        }
    }

    fn title(&mut self, invoice: &FinalizedInvoice) {
        self.y -= 50.0;
        let title_style = TextStyle::bold(28.0).with_color(Color::ACCENT);
        self.text("INVOICE", PAGE_WIDTH - MARGIN - 100.0, self.y + 20.0, title_style);

        let x = PAGE_WIDTH - MARGIN - 150.0;
        let number = format!("Invoice #: {}", invoice.invoice_number());
        self.text(&number, x, self.y - 5.0, TextStyle::regular(12.0));
        let date = format!("Date: {}", invoice.issue_date());
        self.text(&date, x, self.y - 20.0, TextStyle::regular(12.0));
    }

    fn bill_to(&mut self, invoice: &FinalizedInvoice) {
        self.y -= 60.0;
        self.text("Bill To:", MARGIN, self.y, TextStyle::bold(14.0));

        self.y -= 20.0;
        self.text(invoice.client_name(), MARGIN, self.y, TextStyle::regular(12.0));

        if !invoice.client_email().is_empty() {
            self.y -= 15.0;
            self.text(invoice.client_email(), MARGIN, self.y, TextStyle::regular(12.0));
        }
        if !invoice.client_address().is_empty() {
            for line in split_lines(invoice.client_address()) {
                self.y -= 15.0;
                self.text(line, MARGIN, self.y, TextStyle::regular(12.0));
            }
        }
    }

    fn items_table(&mut self, invoice: &FinalizedInvoice) {
        self.y -= 50.0;
        let table_width = PAGE_WIDTH - 2.0 * MARGIN;

        self.doc.fill_rect(
            MARGIN,
            self.y - 20.0,
            table_width,
            HEADER_BAR_HEIGHT,
            Color::ACCENT,
        );
        let header_style = TextStyle::bold(12.0).with_color(Color::WHITE);
        for (header, offset) in TABLE_HEADERS.iter().zip(COLUMN_OFFSETS) {
            self.text(header, MARGIN + offset, self.y - 10.0, header_style);
        }
        self.y -= 35.0;

        let cell_style = TextStyle::regular(10.0);
        let mut overflow_reported = false;
        for (index, item) in invoice.items().iter().enumerate() {
            if index % 2 == 0 {
                self.doc.fill_rect(
                    MARGIN,
                    self.y - 15.0,
                    table_width,
                    STRIPE_HEIGHT,
                    Color::STRIPE,
                );
            }
            if !overflow_reported && self.y - 15.0 < MARGIN {
                warn!(
                    "invoice {}: item {} and later rows fall below the page margin",
                    invoice.invoice_number(),
                    index + 1
                );
                overflow_reported = true;
            }

            let cells = [
                item.description().to_string(),
                item.quantity().to_string(),
                format_currency(item.rate()),
                format_currency(item.amount()),
            ];
            for (column, cell) in cells.iter().enumerate() {
                let width = Font::Helvetica.measure_text(cell, cell_style.font_size);
                if width > COLUMN_WIDTHS[column] {
                    warn!(
                        "invoice {}: {} cell of row {} is {:.1}pt wide, column holds {}pt",
                        invoice.invoice_number(),
                        TABLE_HEADERS[column],
                        index + 1,
                        width,
                        COLUMN_WIDTHS[column]
                    );
                }
                self.text(cell, MARGIN + COLUMN_OFFSETS[column], self.y - 5.0, cell_style);
            }
            self.y -= ROW_PITCH;
        }
    }

    fn totals(&mut self, invoice: &FinalizedInvoice) {
        let totals = invoice.totals();
        let x = PAGE_WIDTH - MARGIN - 150.0;

        self.y -= 20.0;
        let subtotal = format!("Subtotal: {}", format_currency(totals.subtotal));
        self.text(&subtotal, x, self.y, TextStyle::regular(12.0));

        self.y -= 20.0;
        let tax = format!("Tax: {}", format_currency(totals.tax));
        self.text(&tax, x, self.y, TextStyle::regular(12.0));

        self.y -= 25.0;
        self.doc.fill_rect(
            x - 10.0,
            self.y - 15.0,
            TOTAL_BOX_WIDTH,
            TOTAL_BOX_HEIGHT,
            Color::ACCENT,
        );
        let total = format!("Total: {}", format_currency(totals.total));
        let total_style = TextStyle::bold(14.0).with_color(Color::WHITE);
        self.text(&total, x, self.y - 5.0, total_style);
    }

    fn notes(&mut self, notes: &str) {
        if notes.is_empty() {
            return;
        }
        self.y -= 60.0;
        self.text("Notes:", MARGIN, self.y, TextStyle::bold(12.0));

        self.y -= 20.0;
        for line in split_lines(notes) {
            self.text(line, MARGIN, self.y, TextStyle::regular(10.0));
            self.y -= 15.0;
        }
    }

    fn footer(&mut self) {
        let style = TextStyle::regular(12.0).with_color(Color::FOOTER);
        self.text(FOOTER_TEXT, MARGIN, FOOTER_Y, style);
    }
}

/// Split on `\n`, keeping empty lines, and drop a trailing `\r`.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.trim_end_matches('\r'))
}
