use invoice_core::{
    DocumentRenderer, Error, FinalizedInvoice, Font, InvoiceDraft, InvoiceRenderer, ItemId,
    Letterhead,
};
use rust_decimal_macros::dec;

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn count_bytes(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

fn consulting_invoice() -> FinalizedInvoice {
    let mut draft = InvoiceDraft::new();
    draft.set_client_name("Globex Inc");
    draft.set_description(ItemId(1), "Consulting").unwrap();
    draft.set_quantity(ItemId(1), 10).unwrap();
    draft.set_rate(ItemId(1), dec!(100.00)).unwrap();
    draft.finalize("INV-1700000000000", "11/14/2023").unwrap()
}

fn render(invoice: &FinalizedInvoice) -> Vec<u8> {
    InvoiceRenderer::default().render(invoice).unwrap()
}

#[test]
fn produces_single_letter_page() {
    let bytes = render(&consulting_invoice());

    assert!(bytes.starts_with(b"%PDF-1.7\n"));
    assert!(bytes.ends_with(b"%%EOF\n"));
    assert!(contains_bytes(&bytes, b"/Count 1"));
    assert!(contains_bytes(&bytes, b"/MediaBox [0 0 612.0 792.0]"));
    assert_eq!(count_bytes(&bytes, b"/Type /Page "), 1);
}

#[test]
fn header_block_follows_cursor() {
    let bytes = render(&consulting_invoice());

    assert!(contains_bytes(&bytes, b"0.45 0.2 0.6 rg\n/F2 24 Tf\n50 742 Td\n(ACME CORPORATION) Tj"));
    assert!(contains_bytes(&bytes, b"0.4 0.4 0.4 rg\n/F1 12 Tf\n50 717 Td\n(123 Business Street) Tj"));
    assert!(contains_bytes(&bytes, b"50 702 Td\n(Business City, BC 12345) Tj"));
    assert!(contains_bytes(&bytes, b"50 687 Td\n(contact@acmecorp.com | \\(555\\) 123-4567) Tj"));
}

#[test]
fn title_number_and_date_are_right_side() {
    let bytes = render(&consulting_invoice());

    // Cursor is at 637 after the header gap.
    assert!(contains_bytes(&bytes, b"/F2 28 Tf\n462 657 Td\n(INVOICE) Tj"));
    assert!(contains_bytes(&bytes, b"412 632 Td\n(Invoice #: INV-1700000000000) Tj"));
    assert!(contains_bytes(&bytes, b"412 617 Td\n(Date: 11/14/2023) Tj"));
}

#[test]
fn bill_to_skips_empty_email_and_address() {
    let bytes = render(&consulting_invoice());

    assert!(contains_bytes(&bytes, b"/F2 14 Tf\n50 577 Td\n(Bill To:) Tj"));
    assert!(contains_bytes(&bytes, b"50 557 Td\n(Globex Inc) Tj"));
    // Table header bar sits 50 below the client name.
    assert!(contains_bytes(&bytes, b"0.45 0.2 0.6 rg\n50 487 512 25 re\nf\n"));
}

#[test]
fn bill_to_draws_email_and_each_address_line() {
    let mut draft = InvoiceDraft::new();
    draft.set_client_name("Globex Inc");
    draft.set_client_email("ap@globex.test");
    draft.set_client_address("1 Main St\nSpringfield");
    let invoice = draft.finalize("INV-2", "1/2/2024").unwrap();
    let bytes = render(&invoice);

    assert!(contains_bytes(&bytes, b"50 542 Td\n(ap@globex.test) Tj"));
    assert!(contains_bytes(&bytes, b"50 527 Td\n(1 Main St) Tj"));
    assert!(contains_bytes(&bytes, b"50 512 Td\n(Springfield) Tj"));
    assert!(contains_bytes(&bytes, b"50 442 512 25 re"));
}

#[test]
fn table_header_labels_are_white_bold() {
    let bytes = render(&consulting_invoice());

    for (x, label) in [(50, "Description"), (350, "Qty"), (410, "Rate"), (490, "Amount")] {
        let expected = format!("1 1 1 rg\n/F2 12 Tf\n{} 497 Td\n({}) Tj", x, label);
        assert!(contains_bytes(&bytes, expected.as_bytes()), "missing {}", label);
    }
}

#[test]
fn item_cells_are_formatted() {
    let bytes = render(&consulting_invoice());

    assert!(contains_bytes(&bytes, b"/F1 10 Tf\n50 467 Td\n(Consulting) Tj"));
    assert!(contains_bytes(&bytes, b"350 467 Td\n(10) Tj"));
    assert!(contains_bytes(&bytes, b"410 467 Td\n($100.00) Tj"));
    assert!(contains_bytes(&bytes, b"490 467 Td\n($1000.00) Tj"));
}

#[test]
fn long_description_runs_past_its_column_unwrapped() {
    let description = "Quarterly infrastructure review, migration planning and on-call support hours";
    assert!(Font::Helvetica.measure_text(description, 10.0) > 300.0);

    let mut draft = InvoiceDraft::new();
    draft.set_client_name("Globex Inc");
    draft.set_description(ItemId(1), description).unwrap();
    draft.set_quantity(ItemId(1), 2).unwrap();
    let bytes = render(&draft.finalize("INV-4", "1/2/2024").unwrap());

    let expected = format!("/F1 10 Tf\n50 467 Td\n({}) Tj", description);
    assert!(contains_bytes(&bytes, expected.as_bytes()));
    assert!(contains_bytes(&bytes, b"350 467 Td\n(2) Tj"));
    assert_eq!(count_bytes(&bytes, b" 467 Td\n"), 4);
}

#[test]
fn even_rows_are_striped_in_input_order() {
    let mut draft = InvoiceDraft::new();
    draft.set_client_name("Globex Inc");
    draft.set_description(ItemId(1), "First").unwrap();
    for name in ["Second", "Third"] {
        let id = draft.add_item();
        draft.set_description(id, name).unwrap();
    }
    let bytes = render(&draft.finalize("INV-3", "1/2/2024").unwrap());

    assert_eq!(count_bytes(&bytes, b"0.98 0.98 0.98 rg"), 2);
    assert!(contains_bytes(&bytes, b"50 457 512 20 re"));
    assert!(!contains_bytes(&bytes, b"50 432 512 20 re"));
    assert!(contains_bytes(&bytes, b"50 407 512 20 re"));

    let first = bytes.windows(7).position(|w| w == b"(First)").unwrap();
    let second = bytes.windows(8).position(|w| w == b"(Second)").unwrap();
    let third = bytes.windows(7).position(|w| w == b"(Third)").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn totals_block_with_highlighted_total() {
    let bytes = render(&consulting_invoice());

    assert!(contains_bytes(&bytes, b"412 427 Td\n(Subtotal: $1000.00) Tj"));
    assert!(contains_bytes(&bytes, b"412 407 Td\n(Tax: $100.00) Tj"));
    assert!(contains_bytes(&bytes, b"0.45 0.2 0.6 rg\n402 367 160 25 re"));
    assert!(contains_bytes(&bytes, b"1 1 1 rg\n/F2 14 Tf\n412 377 Td\n(Total: $1100.00) Tj"));
}

#[test]
fn notes_are_drawn_line_by_line() {
    let mut draft = InvoiceDraft::new();
    draft.set_client_name("Globex Inc");
    draft.set_notes("Net 30\nThanks again");
    let bytes = render(&draft.finalize("INV-4", "1/2/2024").unwrap());

    assert!(contains_bytes(&bytes, b"/F2 12 Tf\n50 322 Td\n(Notes:) Tj"));
    assert!(contains_bytes(&bytes, b"/F1 10 Tf\n50 302 Td\n(Net 30) Tj"));
    assert!(contains_bytes(&bytes, b"/F1 10 Tf\n50 287 Td\n(Thanks again) Tj"));
}

#[test]
fn notes_label_absent_without_notes() {
    let bytes = render(&consulting_invoice());
    assert!(!contains_bytes(&bytes, b"(Notes:)"));
}

#[test]
fn footer_is_fixed_near_bottom() {
    let bytes = render(&consulting_invoice());
    assert!(contains_bytes(
        &bytes,
        b"0.5 0.5 0.5 rg\n/F1 12 Tf\n50 50 Td\n(Thank you for your business!) Tj"
    ));
}

#[test]
fn many_items_overflow_instead_of_paginating() {
    let mut draft = InvoiceDraft::new();
    draft.set_client_name("Globex Inc");
    for _ in 0..40 {
        draft.add_item();
    }
    let bytes = render(&draft.finalize("INV-5", "1/2/2024").unwrap());

    assert!(contains_bytes(&bytes, b"/Count 1"));
    assert_eq!(count_bytes(&bytes, b"/Type /Page "), 1);
    // Last row sits well below the page origin.
    assert!(contains_bytes(&bytes, b"50 -533 Td\n() Tj"));
}

#[test]
fn custom_letterhead_and_metadata() {
    let letterhead = Letterhead {
        name: "Initech".to_string(),
        lines: vec!["4120 Freidrich Ln".to_string()],
    };
    let bytes = InvoiceRenderer::new(letterhead)
        .render(&consulting_invoice())
        .unwrap();

    assert!(contains_bytes(&bytes, b"50 742 Td\n(Initech) Tj"));
    assert!(contains_bytes(&bytes, b"50 717 Td\n(4120 Freidrich Ln) Tj"));
    assert!(contains_bytes(&bytes, b"/Title (Invoice INV-1700000000000)"));
    assert!(contains_bytes(&bytes, b"/Author (Initech)"));
}

#[test]
fn compressed_render_hides_operators() {
    let bytes = InvoiceRenderer::default()
        .with_compression(true)
        .render(&consulting_invoice())
        .unwrap();
    assert!(contains_bytes(&bytes, b"/Filter /FlateDecode"));
    assert!(!contains_bytes(&bytes, b"(INVOICE) Tj"));
}

#[test]
fn rendering_is_deterministic() {
    let invoice = consulting_invoice();
    assert_eq!(render(&invoice), render(&invoice));
}

#[test]
fn failing_writer_is_a_render_error() {
    struct Full;
    impl std::io::Write for Full {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no space"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let err = InvoiceRenderer::default()
        .render_to(&consulting_invoice(), Full)
        .err()
        .unwrap();
    assert!(matches!(err, Error::Render(_)));
}
