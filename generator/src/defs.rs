// defs.rs — Definition table for named token lists
//
// `def <name> : <tokens>` directives register named token lists referenced
// elsewhere as `$name`. References are expanded eagerly at definition time,
// so every stored list is flat: it contains only literal tokens, never
// another reference. A reference to a name that has not been defined yet is
// a fatal error, which rules out forward and cyclic references outright.
//
// Side effects: none.

use std::collections::HashMap;
use std::fmt;

/// A `$name` token referenced a name with no prior definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedReference {
    pub name: String,
}

impl fmt::Display for UndefinedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reference to undefined name '${}'", self.name)
    }
}

impl std::error::Error for UndefinedReference {}

/// Named token lists, keyed by definition name.
#[derive(Debug, Clone, Default)]
pub struct DefTable {
    entries: HashMap<String, Vec<String>>,
}

impl DefTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. `tokens` must already be expanded (the parser
    /// expands before defining). Redefinition replaces the previous list;
    /// earlier expansions keep the value they were resolved against.
    pub fn define(&mut self, name: impl Into<String>, tokens: Vec<String>) {
        self.entries.insert(name.into(), tokens);
    }

    /// Expand one token. A `$name` token becomes the referenced list,
    /// expanded recursively; any other token passes through as itself.
    pub fn expand(&self, token: &str) -> Result<Vec<String>, UndefinedReference> {
        match token.strip_prefix('$') {
            Some(name) => {
                let values = self.entries.get(name).ok_or_else(|| UndefinedReference {
                    name: name.to_string(),
                })?;
                let mut out = Vec::new();
                for value in values {
                    out.extend(self.expand(value)?);
                }
                Ok(out)
            }
            None => Ok(vec![token.to_string()]),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
