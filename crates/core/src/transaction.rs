use chrono::NaiveDate;

use super::money::Amount;
use super::rules::RuleSet;

/// One classified financial movement. Immutable after construction: no
/// later component may recategorize it or alter any field.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    date: NaiveDate,
    subject: String,
    amount: Amount,
    category: String,
}

impl Transaction {
    /// Builds a transaction from the fields of one decoded statement entry.
    ///
    /// The subject is the counterparty name (if non-empty) and the first
    /// purpose line (if any), joined by a single newline: name first,
    /// purpose second, later purpose lines dropped. The category is
    /// assigned here, exactly once.
    pub fn build(
        date: NaiveDate,
        counterparty: Option<&str>,
        purpose: &[String],
        amount: Amount,
        rules: &RuleSet,
    ) -> Self {
        let mut parts: Vec<&str> = Vec::with_capacity(2);
        if let Some(name) = counterparty {
            if !name.is_empty() {
                parts.push(name);
            }
        }
        if let Some(first) = purpose.first() {
            parts.push(first);
        }
        let subject = parts.join("\n");
        let category = rules.classify(&subject).to_string();

        Transaction {
            date,
            subject,
            amount,
            category,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn eur(s: &str) -> Amount {
        Amount::in_eur(Decimal::from_str_exact(s).unwrap(), "EUR").unwrap()
    }

    fn lines(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn subject_joins_name_and_first_purpose_line() {
        let rules = RuleSet::default_rules();
        let tx = Transaction::build(
            date(),
            Some("Acme"),
            &lines(&["first", "second"]),
            eur("10.00"),
            &rules,
        );
        assert_eq!(tx.subject(), "Acme\nfirst");
    }

    #[test]
    fn subject_without_name() {
        let rules = RuleSet::default_rules();
        let tx = Transaction::build(date(), None, &lines(&["only"]), eur("10.00"), &rules);
        assert_eq!(tx.subject(), "only");
    }

    #[test]
    fn subject_empty_when_both_absent() {
        let rules = RuleSet::default_rules();
        let tx = Transaction::build(date(), None, &[], eur("10.00"), &rules);
        assert_eq!(tx.subject(), "");
        assert_eq!(tx.category(), rules.fallback());
    }

    #[test]
    fn empty_name_is_treated_as_absent() {
        let rules = RuleSet::default_rules();
        let tx = Transaction::build(date(), Some(""), &lines(&["only"]), eur("10.00"), &rules);
        assert_eq!(tx.subject(), "only");
    }

    #[test]
    fn category_comes_from_the_assembled_subject() {
        let rules = RuleSet::default_rules();
        let tx = Transaction::build(
            date(),
            Some("Erika Musterfrau"),
            &lines(&["Reisebeitrag 2024"]),
            eur("75.00"),
            &rules,
        );
        assert_eq!(tx.category(), "Chorreise");
    }

    #[test]
    fn name_alone_can_classify() {
        // The counterparty name is part of the searched subject.
        let rules = RuleSet::default_rules();
        let tx = Transaction::build(
            date(),
            Some("Jugendherberge Ochsenhausen"),
            &[],
            eur("-150.00"),
            &rules,
        );
        assert_eq!(tx.category(), "Probenwochenende");
    }
}
