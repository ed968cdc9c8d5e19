use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use kassa_core::RuleSet;
use kassa_import::TransactionStream;
use kassa_report::write_report;

/// Convert CAMT statement archives into a categorized bookkeeping CSV.
#[derive(Debug, Parser)]
#[command(name = "kassa", version, about)]
pub struct Cli {
    /// Statement archives (.zip) or single statement files (.xml),
    /// optionally followed by the output file. A single archive derives
    /// its output name by swapping the extension for `.csv`.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// TOML file with category rules replacing the built-in set.
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,
}

pub fn run(args: Cli) -> anyhow::Result<PathBuf> {
    let (inputs, output) = split_paths(&args.paths);

    let rules = match &args.rules {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read rule file '{}'", path.display()))?;
            RuleSet::from_toml(&content)
                .with_context(|| format!("failed to load rule file '{}'", path.display()))?
        }
        None => RuleSet::default_rules(),
    };

    write_output(&inputs, &output, &rules)?;
    Ok(output)
}

/// Splits the positional paths into the input list and the output path:
/// a single path converts in place (derived `.csv` name), two or more
/// paths mean the last one names the output.
fn split_paths(paths: &[PathBuf]) -> (Vec<PathBuf>, PathBuf) {
    match paths {
        [single] => (vec![single.clone()], single.with_extension("csv")),
        [inputs @ .., output] => (inputs.to_vec(), output.clone()),
        [] => unreachable!("clap requires at least one path"),
    }
}

/// Streams the report into a temp file next to the destination and persists
/// it only after the whole input list was consumed, so a failed run never
/// leaves a partial report that looks complete.
fn write_output(inputs: &[PathBuf], output: &Path, rules: &RuleSet) -> anyhow::Result<()> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".kassa-")
        .suffix(".csv")
        .tempfile_in(dir)
        .context("failed to create temporary report file")?;

    let stream = TransactionStream::new(inputs.iter().cloned(), rules);
    write_report(tmp.as_file_mut(), stream).context("conversion failed")?;

    tmp.persist(output)
        .with_context(|| format!("failed to write '{}'", output.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    #[test]
    fn single_archive_derives_the_output_name() {
        let (inputs, output) = split_paths(&[PathBuf::from("statements/2024-03.zip")]);
        assert_eq!(inputs, vec![PathBuf::from("statements/2024-03.zip")]);
        assert_eq!(output, PathBuf::from("statements/2024-03.csv"));
    }

    #[test]
    fn last_path_is_the_output() {
        let paths = [
            PathBuf::from("a.zip"),
            PathBuf::from("b.zip"),
            PathBuf::from("report.csv"),
        ];
        let (inputs, output) = split_paths(&paths);
        assert_eq!(inputs, vec![PathBuf::from("a.zip"), PathBuf::from("b.zip")]);
        assert_eq!(output, PathBuf::from("report.csv"));
    }

    const STATEMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:camt.053.001.02">
 <BkToCstmrStmt><Stmt>
  <Ntry>
   <Amt Ccy="EUR">75.00</Amt>
   <CdtDbtInd>CRDT</CdtDbtInd>
   <BookgDt><Dt>2024-03-04</Dt></BookgDt>
   <NtryDtls><TxDtls>
    <RltdPties><Dbtr><Nm>Erika Musterfrau</Nm></Dbtr></RltdPties>
    <RmtInf><Ustrd>Reisebeitrag 2024</Ustrd></RmtInf>
   </TxDtls></NtryDtls>
  </Ntry>
 </Stmt></BkToCstmrStmt>
</Document>"#;

    fn write_zip(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("statement.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(STATEMENT.as_bytes()).unwrap();
        zip.finish().unwrap();
        path
    }

    #[test]
    fn converts_an_archive_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let zip = write_zip(dir.path(), "march.zip");

        let output = run(Cli {
            paths: vec![zip],
            rules: None,
        })
        .unwrap();

        assert_eq!(output, dir.path().join("march.csv"));
        let content = fs::read_to_string(&output).unwrap();
        assert!(content.starts_with(
            "\"Datum\",\"Betreff\",\"Betrag\",\"Buchungsnummer\",\"Semester\",\"Kategorie\",\"Unterkonto\"\n"
        ));
        assert!(content.contains("\"04.03.2024\",\"Erika Musterfrau\nReisebeitrag 2024\",\"75,00\""));
        assert!(content.contains("\"Chorreise\""));
    }

    #[test]
    fn failed_run_leaves_no_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let zip = write_zip(dir.path(), "good.zip");
        let bad = dir.path().join("notes.txt");
        fs::write(&bad, "not a statement").unwrap();
        let output = dir.path().join("report.csv");

        let err = run(Cli {
            paths: vec![zip, bad, output.clone()],
            rules: None,
        })
        .unwrap_err();

        assert!(err.to_string().contains("conversion failed"));
        assert!(!output.exists(), "partial report must not be left behind");
    }

    #[test]
    fn custom_rule_file_replaces_the_default_set() {
        let dir = tempfile::tempdir().unwrap();
        let zip = write_zip(dir.path(), "march.zip");
        let rules = dir.path().join("rules.toml");
        fs::write(
            &rules,
            r#"
                fallback = "Sonstiges"

                [[rules]]
                pattern = '\bReisebeitrag\b'
                case_insensitive = true
                category = "Fahrtkosten"
            "#,
        )
        .unwrap();
        let output = dir.path().join("report.csv");

        run(Cli {
            paths: vec![zip, output.clone()],
            rules: Some(rules),
        })
        .unwrap();

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains("\"Fahrtkosten\""));
    }
}
