//! Generate & download: the steps run when the user submits a draft
//! or picks a record from the history.

use chrono::{DateTime, Local, SubsecRound, Utc};
use log::{error, info};

use crate::error::Result;
use crate::history::HistoryRepository;
use crate::model::{self, FinalizedInvoice, HistoryRecord, InvoiceDraft};
use crate::render::DocumentRenderer;
use crate::store::KeyValueStore;

/// Output of a successful generation.
#[derive(Debug, Clone)]
pub struct GeneratedInvoice {
    pub invoice: FinalizedInvoice,
    pub bytes: Vec<u8>,
}

impl GeneratedInvoice {
    pub fn file_name(&self) -> String {
        self.invoice.file_name()
    }
}

/// A document ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download<'a> {
    pub file_name: String,
    pub bytes: &'a [u8],
}

/// Finalize the draft, render it and record it in the history.
///
/// The history write is best effort. If validation or rendering fails
/// nothing is saved and the error is returned; the draft is never
/// modified either way, so callers decide when to reset it.
pub fn generate<R, S>(
    draft: &InvoiceDraft,
    renderer: &R,
    history: &mut HistoryRepository<S>,
    now: DateTime<Utc>,
) -> Result<GeneratedInvoice>
where
    R: DocumentRenderer + ?Sized,
    S: KeyValueStore,
{
    let now = now.trunc_subsecs(3);
    let number = model::invoice_number(now);
    let date = model::issue_date(now.with_timezone(&Local).date_naive());
    let invoice = draft.finalize(&number, &date)?;

    let bytes = renderer.render(&invoice).inspect_err(|e| {
        error!("Error generating PDF for {}: {}", number, e);
    })?;

    history.save(HistoryRecord::from_invoice(&invoice, now, bytes.clone()));
    info!(
        "generated {} for {} ({} bytes, total {})",
        number,
        invoice.client_name(),
        bytes.len(),
        invoice.totals().total
    );
    Ok(GeneratedInvoice { invoice, bytes })
}

/// The stored document of a history record, named `<id>.pdf`.
/// Sample records report `SampleUnavailable` instead of an empty file.
pub fn download(record: &HistoryRecord) -> Result<Download<'_>> {
    let bytes = record.document()?;
    Ok(Download {
        file_name: record.file_name(),
        bytes,
    })
}
