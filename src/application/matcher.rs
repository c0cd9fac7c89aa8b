//! Regex-based tip predicate

use clap::ValueEnum;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::TreeNode;

/// How a pattern has to match a tip name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Pattern may match anywhere in the name
    #[default]
    Search,
    /// Pattern must match the whole name
    Full,
}

impl std::str::FromStr for MatchMode {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Ok(Self::Search),
            "full" => Ok(Self::Full),
            other => Err(ApplicationError::Config {
                message: format!("unknown match mode '{other}' (expected 'search' or 'full')"),
            }),
        }
    }
}

/// Compiled tip-name pattern.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    pub fn new(pattern: &str, mode: MatchMode, ignore_case: bool) -> ApplicationResult<Self> {
        let source = match mode {
            MatchMode::Search => pattern.to_string(),
            MatchMode::Full => format!("^(?:{pattern})$"),
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|source| ApplicationError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Predicate form accepted by the tip selector.
    pub fn matches(&self, node: &TreeNode) -> Result<bool, ApplicationError> {
        Ok(self.is_match(node.name()))
    }
}
