use std::fs;

use chrono::Utc;
use invoice_core::{generate, HistoryRepository, InvoiceDraft, InvoiceRenderer, MemoryStore};
use rust_decimal_macros::dec;

fn main() {
    let mut draft = InvoiceDraft::new();
    draft.set_client_name("Globex Inc");
    draft.set_client_email("ap@globex.test");
    draft.set_client_address("42 Industrial Way\nCypress Creek, CC 90210");
    draft.set_notes("Payment due within 30 days.\nBank transfer preferred.");

    let first = draft.items()[0].id();
    draft.set_description(first, "Consulting").unwrap();
    draft.set_quantity(first, 10).unwrap();
    draft.set_rate(first, dec!(100.00)).unwrap();
    let hosting = draft.add_item();
    draft.set_description(hosting, "Hosting (March)").unwrap();
    draft.set_rate(hosting, dec!(25.50)).unwrap();

    let mut history = HistoryRepository::new(MemoryStore::new());
    let renderer = InvoiceRenderer::default();
    let generated = generate(&draft, &renderer, &mut history, Utc::now()).unwrap();

    let path = generated.file_name();
    fs::write(&path, &generated.bytes).unwrap();
    println!("Generated: {} (total {})", path, generated.invoice.totals().total);
}
