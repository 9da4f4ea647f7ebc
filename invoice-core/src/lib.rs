pub mod document;
pub mod error;
pub mod fonts;
pub mod graphics;
pub mod history;
pub mod model;
pub mod objects;
pub mod render;
pub mod store;
pub mod totals;
pub mod workflow;
pub mod writer;

pub use rust_decimal::Decimal;

pub use document::{PdfDocument, TextStyle};
pub use error::{Error, Result, ValidationGap};
pub use fonts::Font;
pub use graphics::Color;
pub use history::{HistoryRepository, STORAGE_KEY};
pub use model::{FinalizedInvoice, HistoryRecord, InvoiceDraft, ItemId, LineItem};
pub use render::{DocumentRenderer, InvoiceRenderer, Letterhead, PAGE_HEIGHT, PAGE_WIDTH};
pub use store::{FileStore, KeyValueStore, MemoryStore, SqliteStore};
pub use totals::{Totals, TAX_RATE};
pub use workflow::{download, generate, Download, GeneratedInvoice};
