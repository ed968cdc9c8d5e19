use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern '{pattern}': {source}")]
    BadPattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("failed to parse rule file: {0}")]
    RuleFile(#[from] toml::de::Error),
}

/// One classification rule: a regex searched against the transaction subject
/// and the category assigned on a hit. Keyword-style patterns carry `\b`
/// anchors so an acronym buried in a longer token does not match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub pattern: String,
    #[serde(default)]
    pub case_insensitive: bool,
    pub category: String,
}

#[derive(Debug)]
struct CompiledRule {
    rule: Rule,
    regex: Regex,
}

/// Ordered rule list with first-match-wins semantics and a fallback label.
///
/// Rules are evaluated top to bottom, so overlapping rules must be listed
/// most-specific first. Patterns are compiled once at construction; the set
/// is read-only afterwards and shared by reference across the run.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    fallback: String,
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    fallback: String,
    #[serde(default)]
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>, fallback: impl Into<String>) -> Result<Self, RuleError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let regex = RegexBuilder::new(&rule.pattern)
                .case_insensitive(rule.case_insensitive)
                .build()
                .map_err(|source| RuleError::BadPattern {
                    pattern: rule.pattern.clone(),
                    source,
                })?;
            compiled.push(CompiledRule { rule, regex });
        }
        Ok(RuleSet {
            rules: compiled,
            fallback: fallback.into(),
        })
    }

    /// The built-in rule set for the choir treasury: weekend-retreat
    /// synonyms, the bare PWE acronym, and trip-fee synonyms. Everything
    /// else is day-to-day business.
    pub fn default_rules() -> Self {
        let rules = vec![
            Rule {
                pattern: r"\b(PWE|Probenwochenende|Proben-WE|Ochsenhausen|vegetarisch)\b".into(),
                case_insensitive: true,
                category: "Probenwochenende".into(),
            },
            Rule {
                pattern: r"PWE\b".into(),
                case_insensitive: false,
                category: "Probenwochenende".into(),
            },
            Rule {
                pattern: r"\b(Chorreise|Reisebeitrag|Chorreisebeitrag)\b".into(),
                case_insensitive: true,
                category: "Chorreise".into(),
            },
        ];
        Self::new(rules, "Tagesgeschäft").expect("built-in rules compile")
    }

    /// Loads an alternate rule set from a TOML document declaring
    /// `fallback` and `[[rules]]` entries.
    pub fn from_toml(content: &str) -> Result<Self, RuleError> {
        let file: RuleFile = toml::from_str(content)?;
        Self::new(file.rules, file.fallback)
    }

    /// Returns the category of the first rule whose pattern is found
    /// anywhere in `subject`, or the fallback label if none matches.
    /// Total: every subject yields exactly one label, the empty string too.
    pub fn classify(&self, subject: &str) -> &str {
        self.rules
            .iter()
            .find(|cr| cr.regex.is_match(subject))
            .map(|cr| cr.rule.category.as_str())
            .unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
