//! Generated Stan program fragments
//!
//! Fragments are emitted in dependency order: a fragment may only call
//! functions defined by fragments before it.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Program block a fragment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StanBlock {
    /// `functions { ... }`
    Functions,
}

/// A named piece of Stan source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StanFragment {
    /// Name of the function the fragment defines
    pub name: String,
    /// Target block
    pub block: StanBlock,
    /// Source text
    pub code: String,
}

impl StanFragment {
    /// Fragment for the `functions` block.
    pub fn function(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            block: StanBlock::Functions,
            code: code.into(),
        }
    }
}

/// Ordered fragments plus the version marker they were generated with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StanCode {
    /// Version marker comment
    pub version: String,
    /// Fragments in dependency order
    pub fragments: Vec<StanFragment>,
}

impl StanCode {
    /// Stamp `fragments` with the current version marker.
    pub fn new(fragments: Vec<StanFragment>) -> Self {
        Self {
            version: version_marker(),
            fragments,
        }
    }

    /// Fragment names in order.
    pub fn names(&self) -> Vec<&str> {
        self.fragments.iter().map(|f| f.name.as_str()).collect()
    }

    /// Fragment defining `name`, if any.
    pub fn fragment(&self, name: &str) -> Option<&StanFragment> {
        self.fragments.iter().find(|f| f.name == name)
    }

    /// Render the version marker followed by a `functions` block.
    pub fn functions_block(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.version);
        out.push_str("functions {\n");
        for fragment in self
            .fragments
            .iter()
            .filter(|f| f.block == StanBlock::Functions)
        {
            for line in fragment.code.trim_end().lines() {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    let _ = writeln!(out, "  {line}");
                }
            }
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }

    /// Check that every fragment only calls functions defined before it.
    ///
    /// Returns the first `(fragment, callee)` pair that breaks the ordering.
    pub fn ordering_violation(&self) -> Option<(&str, &str)> {
        for (i, fragment) in self.fragments.iter().enumerate() {
            for later in &self.fragments[i + 1..] {
                if calls(&fragment.code, &later.name) {
                    return Some((fragment.name.as_str(), later.name.as_str()));
                }
            }
        }
        None
    }
}

/// Whether `code` contains a call to `function`.
fn calls(code: &str, function: &str) -> bool {
    let needle = format!("{function}(");
    code.match_indices(&needle).any(|(at, _)| {
        code[..at]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'))
    })
}

/// Comment stamped at the top of every generated program.
pub fn version_marker() -> String {
    format!("// epiconv version: {}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StanCode {
        StanCode::new(vec![
            StanFragment::function("inner", "real inner(real x) {\n  return x;\n}"),
            StanFragment::function("outer", "real outer(real x) {\n  return inner(x);\n}"),
        ])
    }

    #[test]
    fn test_version_marker() {
        let code = sample();
        assert!(code.version.starts_with("// epiconv version: "));
        assert!(code.version.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_functions_block_keeps_order() {
        let block = sample().functions_block();
        let inner = block.find("real inner").unwrap();
        let outer = block.find("real outer").unwrap();
        assert!(block.starts_with("// epiconv version"));
        assert!(block.contains("functions {\n"));
        assert!(inner < outer);
        assert!(block.trim_end().ends_with('}'));
    }

    #[test]
    fn test_ordering_violation() {
        assert!(sample().ordering_violation().is_none());

        let mut reversed = sample();
        reversed.fragments.reverse();
        assert_eq!(reversed.ordering_violation(), Some(("outer", "inner")));
    }

    #[test]
    fn test_calls_matches_whole_names() {
        assert!(calls("x = calc_pmf(a);", "calc_pmf"));
        assert!(!calls("x = calc_pmfs(a);", "calc_pmf"));
        assert!(!calls("x = my_calc_pmf(a);", "calc_pmf"));
    }
}
