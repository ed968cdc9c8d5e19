use chrono::NaiveDate;
use kassa_core::Amount;

/// Renders an amount in the report's decimal-comma convention: `1234.5`
/// becomes `1234,5`, `-0.01` becomes `-0,01`. Plain digits, no grouping,
/// independent of whatever locale the host process runs under.
pub fn format_amount(amount: Amount) -> String {
    amount.value().to_string().replace('.', ",")
}

/// Renders a booking date as `DD.MM.YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}
