//! Invoice data: editable drafts, finalized invoices and history records.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ValidationGap};
use crate::totals::{self, Totals};

/// Identifies a line item within one draft. Not unique across invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One billable row. `amount` has no setter: it is recomputed by
/// every change to `quantity` or `rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    id: ItemId,
    description: String,
    quantity: u32,
    rate: Decimal,
    amount: Decimal,
}

impl LineItem {
    /// A new row with an empty description, quantity 1 and rate 0.
    pub fn blank(id: ItemId) -> Self {
        LineItem {
            id,
            description: String::new(),
            quantity: 1,
            rate: Decimal::ZERO,
            amount: Decimal::ZERO,
        }
    }

    pub fn new(id: ItemId, description: &str, quantity: u32, rate: Decimal) -> Result<Self> {
        let mut item = LineItem::blank(id);
        item.description = description.to_string();
        item.quantity = quantity;
        item.set_rate(rate)?;
        Ok(item)
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    fn set_quantity(&mut self, quantity: u32) -> Result<()> {
        self.amount = totals::line_amount(quantity, self.rate)?;
        self.quantity = quantity;
        Ok(())
    }

    fn set_rate(&mut self, rate: Decimal) -> Result<()> {
        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(Error::NegativeRate(rate));
        }
        self.amount = totals::line_amount(self.quantity, rate)?;
        self.rate = rate;
        Ok(())
    }
}

/// The invoice being edited. Always holds at least one item, and
/// `totals` always reflects the current items.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    client_name: String,
    client_email: String,
    client_address: String,
    items: Vec<LineItem>,
    notes: String,
    totals: Totals,
    next_item_id: u64,
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        InvoiceDraft {
            client_name: String::new(),
            client_email: String::new(),
            client_address: String::new(),
            items: vec![LineItem::blank(ItemId(1))],
            notes: String::new(),
            totals: Totals::default(),
            next_item_id: 2,
        }
    }
}

impl InvoiceDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard everything and start over with one blank item.
    pub fn reset(&mut self) {
        *self = InvoiceDraft::default();
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn client_address(&self) -> &str {
        &self.client_address
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn set_client_name(&mut self, name: &str) {
        self.client_name = name.to_string();
    }

    pub fn set_client_email(&mut self, email: &str) {
        self.client_email = email.to_string();
    }

    /// Multi-line; each line is drawn on its own row.
    pub fn set_client_address(&mut self, address: &str) {
        self.client_address = address.to_string();
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.notes = notes.to_string();
    }

    /// Append a blank item and return its id.
    pub fn add_item(&mut self) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        // A blank item has amount 0, so the totals stay as they are.
        self.items.push(LineItem::blank(id));
        id
    }

    /// Remove an item. The last remaining item cannot be removed.
    pub fn remove_item(&mut self, id: ItemId) -> Result<()> {
        let index = self.index_of(id)?;
        if self.items.len() == 1 {
            return Err(Error::LastItem);
        }
        let removed = self.items.remove(index);
        match totals::recompute(&self.items) {
            Ok(totals) => {
                self.totals = totals;
                Ok(())
            }
            Err(err) => {
                self.items.insert(index, removed);
                Err(err)
            }
        }
    }

    pub fn set_description(&mut self, id: ItemId, description: &str) -> Result<()> {
        let index = self.index_of(id)?;
        self.items[index].description = description.to_string();
        Ok(())
    }

    pub fn set_quantity(&mut self, id: ItemId, quantity: u32) -> Result<()> {
        let index = self.index_of(id)?;
        let mut item = self.items[index].clone();
        item.set_quantity(quantity)?;
        self.commit_item(index, item)
    }

    /// Rejects negative rates. A rate whose amount or totals would
    /// overflow is rejected with `AmountOverflow`; the draft keeps its
    /// previous values in both cases.
    pub fn set_rate(&mut self, id: ItemId, rate: Decimal) -> Result<()> {
        let index = self.index_of(id)?;
        let mut item = self.items[index].clone();
        item.set_rate(rate)?;
        self.commit_item(index, item)
    }

    /// Whether [`finalize`](Self::finalize) would succeed.
    pub fn can_generate(&self) -> bool {
        self.validate().is_ok()
    }

    fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty() {
            return Err(Error::Validation(ValidationGap::MissingClientName));
        }
        if self.items.is_empty() {
            return Err(Error::Validation(ValidationGap::NoItems));
        }
        Ok(())
    }

    /// Snapshot the draft with its assigned number and issue date.
    pub fn finalize(&self, invoice_number: &str, issue_date: &str) -> Result<FinalizedInvoice> {
        self.validate()?;
        Ok(FinalizedInvoice {
            invoice_number: invoice_number.to_string(),
            issue_date: issue_date.to_string(),
            client_name: self.client_name.clone(),
            client_email: self.client_email.clone(),
            client_address: self.client_address.clone(),
            items: self.items.clone(),
            notes: self.notes.clone(),
            totals: self.totals,
        })
    }

    fn index_of(&self, id: ItemId) -> Result<usize> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(Error::ItemNotFound(id))
    }

    /// Swap in an edited item, keeping the old one if the totals overflow.
    fn commit_item(&mut self, index: usize, item: LineItem) -> Result<()> {
        let previous = std::mem::replace(&mut self.items[index], item);
        match totals::recompute(&self.items) {
            Ok(totals) => {
                self.totals = totals;
                Ok(())
            }
            Err(err) => {
                self.items[index] = previous;
                Err(err)
            }
        }
    }
}

/// A draft frozen at generation time. Read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedInvoice {
    invoice_number: String,
    issue_date: String,
    client_name: String,
    client_email: String,
    client_address: String,
    items: Vec<LineItem>,
    notes: String,
    totals: Totals,
}

impl FinalizedInvoice {
    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn issue_date(&self) -> &str {
        &self.issue_date
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn client_address(&self) -> &str {
        &self.client_address
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Name of the downloaded file, e.g. `INV-1700000000000.pdf`.
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.invoice_number)
    }
}

/// `INV-` followed by the Unix time in milliseconds.
pub fn invoice_number(now: DateTime<Utc>) -> String {
    format!("INV-{}", now.timestamp_millis())
}

/// Short numeric date as printed on the document, e.g. `1/5/2024`.
pub fn issue_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Persisted summary of one generated invoice.
///
/// Field names follow the stored JSON layout (`clientName`, `pdfData`)
/// so existing histories stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub client_name: String,
    pub total: Decimal,
    #[serde(with = "rfc3339_millis")]
    pub date: DateTime<Utc>,
    /// Empty for seeded sample entries.
    #[serde(rename = "pdfData", default)]
    pub document_bytes: Vec<u8>,
}

impl HistoryRecord {
    pub fn from_invoice(invoice: &FinalizedInvoice, date: DateTime<Utc>, bytes: Vec<u8>) -> Self {
        HistoryRecord {
            id: invoice.invoice_number().to_string(),
            client_name: invoice.client_name().to_string(),
            total: invoice.totals().total,
            date,
            document_bytes: bytes,
        }
    }

    pub fn is_sample(&self) -> bool {
        self.document_bytes.is_empty()
    }

    /// The stored PDF, or `SampleUnavailable` for sample entries.
    pub fn document(&self) -> Result<&[u8]> {
        if self.is_sample() {
            return Err(Error::SampleUnavailable(self.id.clone()));
        }
        Ok(&self.document_bytes)
    }

    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.id)
    }
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
mod rfc3339_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn new_draft_has_one_blank_item() {
        let draft = InvoiceDraft::new();
        assert_eq!(draft.items().len(), 1);
        assert_eq!(draft.items()[0].id(), ItemId(1));
        assert_eq!(draft.items()[0].quantity(), 1);
        assert_eq!(draft.totals(), Totals::default());
    }

    #[test]
    fn item_ids_keep_increasing_after_removal() {
        let mut draft = InvoiceDraft::new();
        let a = draft.add_item();
        draft.remove_item(a).unwrap();
        let b = draft.add_item();
        assert_ne!(a, b);
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut draft = InvoiceDraft::new();
        let err = draft.set_rate(ItemId(1), dec!(-1)).unwrap_err();
        assert!(matches!(err, Error::NegativeRate(_)));
        assert_eq!(draft.items()[0].rate(), Decimal::ZERO);
    }

    #[test]
    fn issue_date_is_not_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(issue_date(date), "1/5/2024");
    }

    #[test]
    fn invoice_number_uses_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(invoice_number(now), "INV-1700000000123");
    }

    #[test]
    fn history_record_json_layout() {
        let record = HistoryRecord {
            id: "INV-1".to_string(),
            client_name: "Acme".to_string(),
            total: dec!(1100.00),
            date: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            document_bytes: vec![37, 80],
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"clientName\":\"Acme\""));
        assert!(json.contains("\"total\":\"1100.00\""));
        assert!(json.contains("\"date\":\"2024-01-15T10:00:00.000Z\""));
        assert!(json.contains("\"pdfData\":[37,80]"));
    }

    #[test]
    fn sample_record_has_no_document() {
        let record = HistoryRecord {
            id: "INV-2024001".to_string(),
            client_name: "Acme Corporation".to_string(),
            total: dec!(2450.00),
            date: Utc::now(),
            document_bytes: Vec::new(),
        };
        assert!(matches!(record.document(), Err(Error::SampleUnavailable(id)) if id == "INV-2024001"));
    }
}
