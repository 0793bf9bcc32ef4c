//! Identifier aliasing shared across one datapoint's token streams.

use std::collections::HashMap;

use crate::token::Token;

/// Maps identifier text to position-stable `VAR-<n>` aliases.
///
/// One index is created per datapoint and threaded through the file context,
/// the target lines and every diagnostic message so the same identifier gets
/// the same alias everywhere.
#[derive(Debug, Default, Clone)]
pub struct VariableIndex {
    aliases: HashMap<String, String>,
}

impl VariableIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Alias for `name`, assigning the next free one on first sight.
    pub fn alias(&mut self, name: &str) -> &str {
        let next = self.aliases.len();
        self.aliases
            .entry(name.to_string())
            .or_insert_with(|| format!("VAR-{next}"))
    }

    /// Replace the text of every identifier token with its alias.
    ///
    /// Only token text changes; kinds and the token count are untouched.
    pub fn apply(&mut self, tokens: &mut [Token]) {
        for token in tokens.iter_mut().filter(|t| t.kind.is_identifier()) {
            token.text = self.alias(&token.text).to_string();
        }
    }
}
