use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;
use rust_decimal::Decimal;
use std::io::BufRead;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("XML error: {0}")]
    Xml(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("unknown credit/debit indicator '{0}'")]
    InvalidIndicator(String),
    #[error("statement entry is missing {0}")]
    MissingField(&'static str),
}

/// One transaction entry as a camt.053 document presents it, before
/// normalization into a bookkeeping record.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementEntry {
    /// The opposite party of the movement: the creditor for debit entries,
    /// the debtor for credit entries. Absent when the bank omits the name.
    pub counterparty: Option<String>,
    /// Unstructured remittance lines (`Ustrd`), in document order.
    pub purpose: Vec<String>,
    pub booking_date: NaiveDate,
    /// Signed amount: debit entries are negative.
    pub amount: Decimal,
    /// Currency code from `Amt/@Ccy`.
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Credit,
    Debit,
}

/// Accumulates one `Ntry` while the reader walks through it.
#[derive(Default)]
struct BuildingEntry {
    debtor: Option<String>,
    creditor: Option<String>,
    purpose: Vec<String>,
    booking_date: Option<NaiveDate>,
    value_date: Option<NaiveDate>,
    amount: Option<Decimal>,
    currency: Option<String>,
    direction: Option<Direction>,
}

impl BuildingEntry {
    fn finish(self) -> Result<StatementEntry, DecodeError> {
        let amount = self.amount.ok_or(DecodeError::MissingField("Amt"))?;
        let currency = self.currency.ok_or(DecodeError::MissingField("Amt/@Ccy"))?;
        let direction = self
            .direction
            .ok_or(DecodeError::MissingField("CdtDbtInd"))?;
        // Booking date, with the value date as fallback for statements
        // that omit it.
        let booking_date = self
            .booking_date
            .or(self.value_date)
            .ok_or(DecodeError::MissingField("BookgDt"))?;

        let (amount, counterparty) = match direction {
            Direction::Credit => (amount, self.debtor),
            Direction::Debit => (-amount, self.creditor),
        };

        Ok(StatementEntry {
            counterparty,
            purpose: self.purpose,
            booking_date,
            amount,
            currency,
        })
    }
}

/// Decodes a camt.053 document into its statement entries, in document
/// order. Any malformed construct is a hard error; entries are never
/// silently skipped.
pub fn read_document<R: BufRead>(r: R) -> Result<Vec<StatementEntry>, DecodeError> {
    let mut reader = Reader::from_reader(r);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut pending: Option<BuildingEntry> = None;

    // Cursor flags for the elements whose text we care about.
    let mut in_amt = false;
    let mut amt_ccy: Option<String> = None;
    let mut in_cdt_dbt = false;
    let mut in_bookg_dt = false;
    let mut in_val_dt = false;
    let mut in_dt = false;
    let mut in_rltd_pties = false;
    let mut in_dbtr = false;
    let mut in_cdtr = false;
    let mut in_nm = false;
    let mut in_ustrd = false;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"Ntry" => pending = Some(BuildingEntry::default()),
                b"Amt" => {
                    in_amt = true;
                    amt_ccy = None;
                    for a in e.attributes().flatten() {
                        if a.key.as_ref() == b"Ccy" {
                            if let Ok(v) = String::from_utf8(a.value.into_owned()) {
                                amt_ccy = Some(v);
                            }
                        }
                    }
                }
                b"CdtDbtInd" => in_cdt_dbt = true,
                b"BookgDt" => in_bookg_dt = true,
                b"ValDt" => in_val_dt = true,
                b"Dt" | b"DtTm" => in_dt = true,
                b"RltdPties" => in_rltd_pties = true,
                b"Dbtr" => in_dbtr = in_rltd_pties,
                b"Cdtr" => in_cdtr = in_rltd_pties,
                b"Nm" => in_nm = true,
                b"Ustrd" => in_ustrd = true,
                _ => {}
            },
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| DecodeError::Xml(e.to_string()))?
                    .to_string();

                if let Some(ref mut entry) = pending {
                    if in_amt {
                        // Only the entry-level <Amt>; nested transaction
                        // detail amounts are ignored.
                        if entry.amount.is_none() {
                            entry.amount = Some(parse_amount(&text)?);
                            entry.currency = amt_ccy.take();
                        }
                    } else if in_cdt_dbt {
                        if entry.direction.is_none() {
                            entry.direction = Some(parse_indicator(&text)?);
                        }
                    } else if in_bookg_dt && in_dt {
                        entry.booking_date = Some(parse_iso_date(&text)?);
                    } else if in_val_dt && in_dt {
                        entry.value_date = Some(parse_iso_date(&text)?);
                    } else if in_nm && in_dbtr {
                        if entry.debtor.is_none() {
                            entry.debtor = Some(text);
                        }
                    } else if in_nm && in_cdtr {
                        if entry.creditor.is_none() {
                            entry.creditor = Some(text);
                        }
                    } else if in_ustrd {
                        entry.purpose.push(text);
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"Ntry" => {
                    if let Some(entry) = pending.take() {
                        entries.push(entry.finish()?);
                    }
                }
                b"Amt" => in_amt = false,
                b"CdtDbtInd" => in_cdt_dbt = false,
                b"BookgDt" => in_bookg_dt = false,
                b"ValDt" => in_val_dt = false,
                b"Dt" | b"DtTm" => in_dt = false,
                b"RltdPties" => in_rltd_pties = false,
                b"Dbtr" => in_dbtr = false,
                b"Cdtr" => in_cdtr = false,
                b"Nm" => in_nm = false,
                b"Ustrd" => in_ustrd = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DecodeError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

pub fn read_str(xml: &str) -> Result<Vec<StatementEntry>, DecodeError> {
    read_document(xml.as_bytes())
}

fn parse_amount(s: &str) -> Result<Decimal, DecodeError> {
    Decimal::from_str_exact(s)
        .or_else(|_| s.parse())
        .map_err(|_| DecodeError::InvalidAmount(s.to_string()))
}

fn parse_indicator(s: &str) -> Result<Direction, DecodeError> {
    match s {
        "CRDT" => Ok(Direction::Credit),
        "DBIT" => Ok(Direction::Debit),
        other => Err(DecodeError::InvalidIndicator(other.to_string())),
    }
}

/// Accepts both `Dt` (plain date) and `DtTm` (timestamp) content.
fn parse_iso_date(s: &str) -> Result<NaiveDate, DecodeError> {
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| DecodeError::InvalidDate(s.to_string()))
}
