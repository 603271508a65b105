//! # Name Grammar
//!
//! A bindable name is `label.parent`: a non-empty first label, a dot, and a
//! non-empty remainder that names a node the caller already owns. Anything
//! else is rejected before we go anywhere near a registry.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::namehash::{child_node, labelhash, namehash, Node};

/// Errors produced while parsing a dotted name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The input was the empty string.
    #[error("name is empty")]
    Empty,

    /// The input contains no `.`, so there is no parent to bind under.
    #[error("name '{0}' has no parent (missing '.')")]
    MissingSeparator(String),

    /// Nothing before the first dot.
    #[error("name '{0}' has an empty label")]
    EmptyLabel(String),

    /// Nothing after the first dot.
    #[error("name '{0}' has an empty parent")]
    EmptyParent(String),
}

/// Split a full name at its first dot into `(label, parent)`.
///
/// ```
/// use ensbind_protocol::name::split_name;
///
/// assert_eq!(split_name("app.domain.eth").unwrap(), ("app", "domain.eth"));
/// assert!(split_name("eth").is_err());
/// ```
pub fn split_name(full: &str) -> Result<(&str, &str), NameError> {
    if full.is_empty() {
        return Err(NameError::Empty);
    }
    let (label, parent) = full
        .split_once('.')
        .ok_or_else(|| NameError::MissingSeparator(full.to_string()))?;
    if label.is_empty() {
        return Err(NameError::EmptyLabel(full.to_string()));
    }
    if parent.is_empty() {
        return Err(NameError::EmptyParent(full.to_string()));
    }
    Ok((label, parent))
}

/// A name split into tree coordinates.
///
/// Built once per operation. Every writer reads `node` and `parent_node`
/// from here rather than hashing the name again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedName {
    /// The full dotted name, as given.
    pub full: String,
    /// Everything before the first dot.
    pub label: String,
    /// Everything after the first dot.
    pub parent: String,
    /// `keccak256(label)`
    pub label_hash: B256,
    /// `namehash(parent)`
    pub parent_node: Node,
    /// `keccak256(parent_node || label_hash)`
    pub node: Node,
}

impl ParsedName {
    /// Parse and hash a full name.
    ///
    /// # Errors
    ///
    /// Returns a [`NameError`] if `full` is not of the form `label.parent`.
    pub fn parse(full: &str) -> Result<Self, NameError> {
        let (label, parent) = split_name(full)?;
        let label_hash = labelhash(label);
        let parent_node = namehash(parent);
        let node = child_node(&parent_node, &label_hash);
        Ok(Self {
            full: full.to_string(),
            label: label.to_string(),
            parent: parent.to_string(),
            label_hash,
            parent_node,
            node,
        })
    }
}

impl std::fmt::Display for ParsedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full)
    }
}
