use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use synmask::data::{read_jsonl, InputExample, LabelVocabulary};
use synmask::features::{encode_examples, CharTokenizer, EncoderConfig};

#[derive(Parser, Debug)]
#[command(name = "feature_builder")]
#[command(about = "Build syntax-aware NER training features from pre-parsed records")]
#[command(version)]
struct Args {
    /// Input JSONL dataset (plain or gzipped), one record per line with
    /// embedded lexicons and heads
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSONL file for encoded features
    #[arg(short, long)]
    output: PathBuf,

    /// Token vocabulary file (one token per line)
    #[arg(long)]
    vocab: PathBuf,

    /// Label set to encode against
    #[arg(long, default_value = "cluener")]
    labels: LabelSet,

    /// Maximum sequence length, including the two placeholder tokens
    #[arg(long, default_value_t = 128)]
    max_seq_length: usize,

    /// Dataset split name used in example guids
    #[arg(long, default_value = "train")]
    set_type: String,

    /// Lowercase characters before vocabulary lookup
    #[arg(long)]
    do_lower_case: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, ValueEnum)]
enum LabelSet {
    Cluener,
    Cner,
}

#[derive(Debug, Default)]
struct BuildStats {
    total_records: usize,
    built_examples: usize,
    failed_examples: usize,
    total_chars: usize,
    total_units: usize,
}

impl BuildStats {
    fn print(&self, elapsed: std::time::Duration) {
        println!("\n=== Feature Building Statistics ===");
        println!("Total records: {}", self.total_records);
        println!("Examples built: {}", self.built_examples);
        println!("Failed examples: {}", self.failed_examples);
        println!("Total characters: {}", self.total_chars);
        println!("Total lexical units: {}", self.total_units);
        println!("Total time: {:.2?}", elapsed);
        if self.total_records > 0 {
            let rate = (self.built_examples as f64 / self.total_records as f64) * 100.0;
            println!("Success rate: {:.1}%", rate);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("info"),
        )
        .init();
    } else {
        env_logger::init();
    }

    if args.max_seq_length < 3 {
        return Err(anyhow!("--max-seq-length must be at least 3"));
    }

    println!("Feature Builder for synmask");
    println!("===========================");
    println!("Input: {}", args.input.display());
    println!("Output: {}", args.output.display());
    println!("Max sequence length: {}", args.max_seq_length);
    println!();

    let start = std::time::Instant::now();
    let mut stats = BuildStats::default();

    let labels = match args.labels {
        LabelSet::Cluener => LabelVocabulary::cluener(),
        LabelSet::Cner => LabelVocabulary::cner(),
    };
    let tokenizer = CharTokenizer::from_file(&args.vocab, args.do_lower_case)?;
    let config = EncoderConfig::new(args.max_seq_length);

    let records = read_jsonl(&args.input)?;
    stats.total_records = records.len();

    let progress = ProgressBar::new(records.len() as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .expect("valid progress template")
        .progress_chars("#>-");
    progress.set_style(style);
    progress.set_message("Building examples...");

    // A malformed tree or mislabeled entity is fatal for its example; it
    // is reported and counted, never silently emitted.
    let mut examples = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let guid = format!("{}-{}", args.set_type, i);
        match InputExample::from_record(&guid, record) {
            Ok(example) => {
                stats.built_examples += 1;
                stats.total_chars += example.chars.len();
                stats.total_units += example.coverage_spans.len();
                examples.push(example);
            }
            Err(e) => {
                stats.failed_examples += 1;
                error!("failed to build {guid}: {e:#}");
            }
        }
        progress.inc(1);
    }
    progress.finish_with_message("Examples built");

    info!("encoding features for {} examples", examples.len());
    let features = encode_examples(&examples, &labels, &tokenizer, &config)?;

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    for feature in &features {
        serde_json::to_writer(&mut writer, feature)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    stats.print(start.elapsed());
    println!("\nWrote {} features to {}", features.len(), args.output.display());
    Ok(())
}
