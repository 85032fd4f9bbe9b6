//! Entity extraction from predicted tag sequences.
//!
//! Supports the BIO and BIOS encodings. Decoding works on label strings;
//! resolve predicted ids through [`crate::data::LabelVocabulary`] first.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// A decoded entity mention: closed 0-indexed character interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

impl Entity {
    pub fn new(label: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }
}

/// Tagging scheme of a label sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Bio,
    Bios,
}

impl std::str::FromStr for Markup {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bio" => Ok(Self::Bio),
            "bios" => Ok(Self::Bios),
            other => Err(anyhow!("unknown markup '{}'", other)),
        }
    }
}

/// Decode a tag sequence into entity mentions.
pub fn decode_entities(tags: &[&str], markup: Markup) -> Vec<Entity> {
    match markup {
        Markup::Bio => decode_bio(tags),
        Markup::Bios => decode_bios(tags),
    }
}

/// BIOS decoding: `S-` tags are single-character entities.
pub fn decode_bios(tags: &[&str]) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut open: Option<Entity> = None;

    for (idx, tag) in tags.iter().enumerate() {
        if let Some(label) = tag.strip_prefix("S-") {
            if let Some(entity) = open.take() {
                entities.push(entity);
            }
            entities.push(Entity::new(label, idx, idx));
        } else if let Some(label) = tag.strip_prefix("B-") {
            if let Some(entity) = open.take() {
                entities.push(entity);
            }
            open = Some(Entity::new(label, idx, idx));
        } else if let Some(label) = tag.strip_prefix("I-") {
            match open.as_mut() {
                Some(entity) if entity.label == label => entity.end = idx,
                // Stray continuation: close whatever was open.
                _ => {
                    if let Some(entity) = open.take() {
                        entities.push(entity);
                    }
                }
            }
        } else if let Some(entity) = open.take() {
            entities.push(entity);
        }
    }
    if let Some(entity) = open {
        entities.push(entity);
    }
    entities
}

/// BIO decoding.
pub fn decode_bio(tags: &[&str]) -> Vec<Entity> {
    decode_bios(tags)
        .into_iter()
        .filter(|e| !tags[e.start].starts_with("S-"))
        .collect()
}
