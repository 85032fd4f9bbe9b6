//! Character-level tokenizer.
//!
//! For character-level NER each input character is its own token; the
//! tokenizer only resolves characters against a fixed vocabulary file
//! (one token per line, BERT-style) and falls back to `[UNK]`.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const UNK_TOKEN: &str = "[UNK]";

#[derive(Debug, Clone)]
pub struct CharTokenizer {
    vocab: HashMap<String, usize>,
    do_lower_case: bool,
}

impl CharTokenizer {
    /// Load a vocabulary file: one token per line, ids follow line order.
    pub fn from_file<P: AsRef<Path>>(path: P, do_lower_case: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open vocab file {}", path.display()))?;
        let mut vocab = HashMap::new();
        for line in BufReader::new(file).lines() {
            let token = line?.trim().to_string();
            if token.is_empty() {
                continue;
            }
            let id = vocab.len();
            vocab.entry(token).or_insert(id);
        }
        Self::from_vocab(vocab, do_lower_case)
    }

    /// Build from an ordered token list, mostly for tests.
    pub fn from_tokens<S: Into<String>>(
        tokens: impl IntoIterator<Item = S>,
        do_lower_case: bool,
    ) -> Result<Self> {
        let mut vocab = HashMap::new();
        for token in tokens {
            let id = vocab.len();
            vocab.entry(token.into()).or_insert(id);
        }
        Self::from_vocab(vocab, do_lower_case)
    }

    fn from_vocab(vocab: HashMap<String, usize>, do_lower_case: bool) -> Result<Self> {
        if !vocab.contains_key(UNK_TOKEN) {
            return Err(anyhow!("vocabulary has no {UNK_TOKEN} token"));
        }
        Ok(Self {
            vocab,
            do_lower_case,
        })
    }

    /// Map each character to itself if in vocabulary, `[UNK]` otherwise.
    pub fn tokenize(&self, chars: &[String]) -> Vec<String> {
        chars
            .iter()
            .map(|c| {
                let c = if self.do_lower_case {
                    c.to_lowercase()
                } else {
                    c.clone()
                };
                if self.vocab.contains_key(&c) {
                    c
                } else {
                    UNK_TOKEN.to_string()
                }
            })
            .collect()
    }

    pub fn token_id(&self, token: &str) -> Option<usize> {
        self.vocab.get(token).copied()
    }

    /// Resolve tokens to ids. Unknown tokens use the `[UNK]` id, so this
    /// only fails on a broken vocabulary.
    pub fn convert_tokens_to_ids(&self, tokens: &[String]) -> Result<Vec<usize>> {
        let unk = self
            .token_id(UNK_TOKEN)
            .ok_or_else(|| anyhow!("vocabulary has no {UNK_TOKEN} token"))?;
        Ok(tokens
            .iter()
            .map(|t| self.token_id(t).unwrap_or(unk))
            .collect())
    }
}
