//! External dependency parser interface.
//!
//! Parsing itself is an external collaborator; this crate only consumes
//! its output. A parse pairs each lexical unit with the 1-based index of
//! its parent unit (0 for the virtual root).

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Output of a dependency parser for one text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parse {
    /// Word-like segments in sentence order.
    pub lexicons: Vec<String>,
    /// `heads[i]` is the parent unit index of `lexicons[i]`, or 0.
    pub heads: Vec<usize>,
}

impl Parse {
    pub fn new(lexicons: Vec<String>, heads: Vec<usize>) -> Result<Self> {
        if lexicons.len() != heads.len() {
            return Err(anyhow!(
                "parse has {} lexicons but {} heads",
                lexicons.len(),
                heads.len()
            ));
        }
        Ok(Self { lexicons, heads })
    }

    pub fn len(&self) -> usize {
        self.lexicons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicons.is_empty()
    }
}

/// A dependency parser service.
///
/// Implementations typically wrap an external process or a remote
/// service; the crate treats them as black boxes.
pub trait DependencyParser {
    fn parse(&self, text: &str) -> Result<Parse>;
}
