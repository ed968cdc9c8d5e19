use std::io::Write;

use csv::QuoteStyle;
use thiserror::Error;

use kassa_core::Transaction;

use crate::format::{format_amount, format_date};

/// Column layout of the report. `Kategorie` is intentionally left empty and
/// the classification result goes into `Unterkonto`; the downstream
/// accounting import depends on this exact arrangement.
pub const HEADER: [&str; 7] = [
    "Datum",
    "Betreff",
    "Betrag",
    "Buchungsnummer",
    "Semester",
    "Kategorie",
    "Unterkonto",
];

#[derive(Debug, Error)]
pub enum ReportError<E> {
    /// Failure of the transaction source feeding the report.
    #[error(transparent)]
    Source(E),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes the complete report: header row first, then one row per
/// transaction, every field quoted so embedded newlines round-trip.
///
/// The source is consumed lazily; its first error stops the export and is
/// returned unchanged. Zero transactions still produce the header row.
pub fn write_report<W, E, I>(out: W, transactions: I) -> Result<(), ReportError<E>>
where
    W: Write,
    I: IntoIterator<Item = Result<Transaction, E>>,
{
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(out);

    wtr.write_record(HEADER)?;
    for result in transactions {
        let tx = result.map_err(ReportError::Source)?;
        let date = format_date(tx.date());
        let amount = format_amount(tx.amount());
        wtr.write_record([
            date.as_str(),
            tx.subject(),
            amount.as_str(),
            "",
            "",
            "",
            tx.category(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}
