use kassa_camt::StatementEntry;
use kassa_core::{Amount, CurrencyMismatch, RuleSet, Transaction};

/// Normalizes one decoded statement entry into a classified transaction.
///
/// The currency guard lives here: an entry in anything but EUR aborts the
/// whole run instead of being skipped.
pub fn build_transaction(
    entry: &StatementEntry,
    rules: &RuleSet,
) -> Result<Transaction, CurrencyMismatch> {
    let amount = Amount::in_eur(entry.amount, &entry.currency)?;
    Ok(Transaction::build(
        entry.booking_date,
        entry.counterparty.as_deref(),
        &entry.purpose,
        amount,
        rules,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn entry(currency: &str) -> StatementEntry {
        StatementEntry {
            counterparty: Some("Erika Musterfrau".to_string()),
            purpose: vec!["Reisebeitrag 2024".to_string(), "Mitglied 42".to_string()],
            booking_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            amount: Decimal::from_str_exact("75.00").unwrap(),
            currency: currency.to_string(),
        }
    }

    #[test]
    fn builds_a_classified_transaction() {
        let rules = RuleSet::default_rules();
        let tx = build_transaction(&entry("EUR"), &rules).unwrap();
        assert_eq!(tx.subject(), "Erika Musterfrau\nReisebeitrag 2024");
        assert_eq!(tx.category(), "Chorreise");
        assert_eq!(tx.date(), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }

    #[test]
    fn foreign_currency_is_fatal() {
        let rules = RuleSet::default_rules();
        let err = build_transaction(&entry("USD"), &rules).unwrap_err();
        assert_eq!(err, CurrencyMismatch("USD".to_string()));
    }
}
