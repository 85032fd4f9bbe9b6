//! Dataset file readers.
//!
//! Two external formats are supported: line-delimited JSON records
//! (optionally gzipped, detected by magic bytes) and the plain-text
//! columnar `char label` format used by BMES-tagged corpora.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::example::{InputExample, RawRecord};

/// Read raw JSONL records from a plain or gzipped file.
pub fn read_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let content = read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut records = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: RawRecord = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid record", path.display(), line_no + 1))?;
        records.push(record);
    }
    info!("read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Convert raw records into examples, tagging guids `{set_type}-{index}`.
///
/// A malformed record is fatal for the whole set: silently dropping it
/// would corrupt downstream training data.
pub fn examples_from_records(set_type: &str, records: &[RawRecord]) -> Result<Vec<InputExample>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| InputExample::from_record(format!("{set_type}-{i}"), record))
        .collect()
}

/// Read a columnar `char label` file: one token per line, blank lines
/// separate sentences, `-DOCSTART-` headers are skipped. BMES tags are
/// normalized to BIOS (`M-` and `E-` both become `I-`).
pub fn read_columnar<P: AsRef<Path>>(path: P) -> Result<Vec<(Vec<String>, Vec<String>)>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut sentences = Vec::new();
    let mut chars = Vec::new();
    let mut labels = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.starts_with("-DOCSTART-") || line.trim().is_empty() {
            if !chars.is_empty() {
                sentences.push((std::mem::take(&mut chars), std::mem::take(&mut labels)));
            }
            continue;
        }
        let mut parts = line.split_whitespace();
        let token = match parts.next() {
            Some(t) => t.to_string(),
            None => continue,
        };
        let label = parts.next().unwrap_or("O");
        chars.push(token);
        labels.push(normalize_bmes(label));
    }
    if !chars.is_empty() {
        sentences.push((chars, labels));
    }

    info!("read {} sentences from {}", sentences.len(), path.display());
    Ok(sentences)
}

fn normalize_bmes(label: &str) -> String {
    if let Some(rest) = label.strip_prefix("M-") {
        format!("I-{rest}")
    } else if let Some(rest) = label.strip_prefix("E-") {
        format!("I-{rest}")
    } else {
        label.to_string()
    }
}

/// Read a file into a string, transparently decompressing gzip.
fn read_to_string(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let gzipped = match file.read_exact(&mut magic) {
        Ok(()) => magic == [0x1f, 0x8b],
        Err(_) => false,
    };

    let file = File::open(path)?;
    let mut content = String::new();
    if gzipped {
        let mut reader = BufReader::new(GzDecoder::new(file));
        reader.read_to_string(&mut content)?;
    } else {
        let mut reader = BufReader::new(file);
        reader.read_to_string(&mut content)?;
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    const RECORD: &str = r#"{"text":"浙商银行企业","label":{"company":{"浙商银行":[[0,3]]}},"lexicons":["浙商银行","企业"],"heads":[0,1]}"#;

    #[test]
    fn test_read_jsonl_plain() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.json");
        std::fs::write(&path, format!("{RECORD}\n\n{RECORD}\n")).unwrap();

        let records = read_jsonl(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "浙商银行企业");
        assert_eq!(records[0].heads.as_deref(), Some(&[0, 1][..]));
    }

    #[test]
    fn test_read_jsonl_gzipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.json.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(RECORD.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let records = read_jsonl(&path).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_invalid_record_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.json");
        std::fs::write(&path, "not json\n").unwrap();
        assert!(read_jsonl(&path).is_err());
    }

    #[test]
    fn test_examples_from_records() {
        let record: RawRecord = serde_json::from_str(RECORD).unwrap();
        let examples = examples_from_records("train", &[record]).unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].guid, "train-0");
        assert_eq!(examples[0].labels[0], "B-company");
    }

    #[test]
    fn test_read_columnar_bmes_normalization() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.char.bmes");
        std::fs::write(
            &path,
            "-DOCSTART-\n叶 B-NAME\n老 M-NAME\n桂 E-NAME\n\n某 O\n",
        )
        .unwrap();

        let sentences = read_columnar(&path).unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].0, vec!["叶", "老", "桂"]);
        assert_eq!(sentences[0].1, vec!["B-NAME", "I-NAME", "I-NAME"]);
        assert_eq!(sentences[1].1, vec!["O"]);
    }
}
