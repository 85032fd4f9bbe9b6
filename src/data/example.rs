//! Dataset records and example construction.
//!
//! A raw record carries text, optional entity annotations and the
//! dependency parse (embedded, or supplied by a [`DependencyParser`]).
//! Example construction runs the tree pipeline once and stores its
//! node-level output; the character-level expansion happens later during
//! feature encoding.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::mask::LexiconSpans;
use crate::parse::{DependencyParser, Parse};
use crate::tree::{coverage_spans, leaf_sets, CoverageSpan, DependencyTree};

/// Entity annotations: type -> entity text -> closed 0-indexed
/// `[start, end]` character spans.
pub type EntityAnnotations = HashMap<String, HashMap<String, Vec<(usize, usize)>>>;

/// One line of a raw JSONL dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub text: String,
    #[serde(default)]
    pub label: Option<EntityAnnotations>,
    /// Embedded parser output; present when the parser ran offline.
    #[serde(default)]
    pub lexicons: Option<Vec<String>>,
    #[serde(default)]
    pub heads: Option<Vec<usize>>,
}

/// A single training/test example with its syntactic features attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputExample {
    pub guid: String,
    /// The characters of the sequence.
    pub chars: Vec<String>,
    /// Per-character tags (`O` everywhere for unlabeled examples).
    pub labels: Vec<String>,
    /// Unit id -> character interval mapping.
    pub lexicon_spans: LexiconSpans,
    /// Per-unit coverage spans, indexed by `unit_id - 1`.
    pub coverage_spans: Vec<CoverageSpan>,
    /// Per-unit leaf sets, indexed by `unit_id - 1`.
    pub leaf_sets: Vec<Vec<usize>>,
}

impl InputExample {
    /// Build an example from a record whose parse is embedded.
    pub fn from_record(guid: impl Into<String>, record: &RawRecord) -> Result<Self> {
        let lexicons = record
            .lexicons
            .clone()
            .ok_or_else(|| anyhow!("record has no embedded lexicons"))?;
        let heads = record
            .heads
            .clone()
            .ok_or_else(|| anyhow!("record has no embedded heads"))?;
        let parse = Parse::new(lexicons, heads)?;
        Self::from_parts(guid, &record.text, record.label.as_ref(), &parse)
    }

    /// Build an example by calling a live parser on the text.
    pub fn from_text(
        guid: impl Into<String>,
        text: &str,
        entities: Option<&EntityAnnotations>,
        parser: &dyn DependencyParser,
    ) -> Result<Self> {
        let parse = parser.parse(text)?;
        Self::from_parts(guid, text, entities, &parse)
    }

    /// Shared constructor: runs the tree pipeline and projects labels.
    pub fn from_parts(
        guid: impl Into<String>,
        text: &str,
        entities: Option<&EntityAnnotations>,
        parse: &Parse,
    ) -> Result<Self> {
        let guid = guid.into();
        let chars: Vec<String> = text.chars().map(|c| c.to_string()).collect();

        let tree = DependencyTree::from_heads(&parse.heads)
            .with_context(|| format!("example {guid}: malformed dependency tree"))?;
        let coverage = coverage_spans(&tree);
        let leaves = leaf_sets(&tree);

        let lexicon_spans = LexiconSpans::from_lexicons(&parse.lexicons);
        lexicon_spans
            .check_char_count(chars.len())
            .with_context(|| format!("example {guid}: parse does not cover the text"))?;

        let labels = match entities {
            Some(entities) => project_labels(&chars, entities)
                .with_context(|| format!("example {guid}: label projection failed"))?,
            None => vec!["O".to_string(); chars.len()],
        };

        Ok(Self {
            guid,
            chars,
            labels,
            lexicon_spans,
            coverage_spans: coverage,
            leaf_sets: leaves,
        })
    }
}

/// Project entity span annotations onto per-character BIOS tags.
///
/// A mismatch between the recorded entity text and the literal character
/// substring is a data-integrity fault: the example is aborted rather
/// than emitted with silently wrong labels.
fn project_labels(chars: &[String], entities: &EntityAnnotations) -> Result<Vec<String>> {
    let mut labels = vec!["O".to_string(); chars.len()];

    for (entity_type, mentions) in entities {
        for (name, spans) in mentions {
            for &(start, end) in spans {
                if end >= chars.len() || start > end {
                    return Err(anyhow!(
                        "entity '{}' span [{}, {}] out of bounds (text has {} chars)",
                        name,
                        start,
                        end,
                        chars.len()
                    ));
                }
                let literal: String = chars[start..=end].concat();
                if literal != *name {
                    return Err(anyhow!(
                        "entity '{}' does not match text span [{}, {}] ('{}')",
                        name,
                        start,
                        end,
                        literal
                    ));
                }
                if start == end {
                    labels[start] = format!("S-{entity_type}");
                } else {
                    labels[start] = format!("B-{entity_type}");
                    for label in labels.iter_mut().take(end + 1).skip(start + 1) {
                        *label = format!("I-{entity_type}");
                    }
                }
            }
        }
    }
    Ok(labels)
}
