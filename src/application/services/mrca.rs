//! MRCA lookup service
//!
//! Loads a Newick tree, selects tips by regex and resolves their most recent
//! common ancestor.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::application::matcher::{MatchMode, PatternMatcher};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    label_mrca, resolve_mrca, select_tips, DomainError, MrcaLabel, NodeId, TipSet, Tree,
};
use crate::infrastructure::traits::FileSystem;
use crate::parser::parse_newick;

/// Pattern options shared by all lookups of one service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    pub mode: MatchMode,
    pub ignore_case: bool,
}

/// Result of resolving one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MrcaOutput {
    /// Pattern the tips were selected with
    pub pattern: String,
    /// Number of tips the pattern selected
    pub selected: usize,
    pub node: NodeId,
    pub label: MrcaLabel,
    /// Names of all tips below the MRCA
    pub tips: Vec<String>,
}

impl MrcaOutput {
    /// Text to print for this result; an unnamed root is shown as `root_label`.
    pub fn display_name<'a>(&'a self, root_label: &'a str) -> &'a str {
        match &self.label {
            MrcaLabel::Named(name) => name.as_str(),
            MrcaLabel::Root => root_label,
        }
    }
}

/// Service for MRCA lookups.
pub struct MrcaService {
    fs: Arc<dyn FileSystem>,
    options: MatchOptions,
}

impl MrcaService {
    /// Create a new MRCA service.
    pub fn new(fs: Arc<dyn FileSystem>, options: MatchOptions) -> Self {
        Self { fs, options }
    }

    /// Read and parse a Newick tree file.
    #[instrument(level = "debug", skip(self))]
    pub fn load_tree(&self, path: &Path) -> ApplicationResult<Tree> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::TreeNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read tree", path)?;
        let tree = parse_newick(&content).map_err(|source| ApplicationError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "loaded {} nodes, {} tips from {}",
            tree.len(),
            tree.tips().len(),
            path.display()
        );
        Ok(tree)
    }

    /// Compile `pattern` with this service's options.
    pub fn matcher(&self, pattern: &str) -> ApplicationResult<PatternMatcher> {
        PatternMatcher::new(pattern, self.options.mode, self.options.ignore_case)
    }

    /// Tips whose names match `pattern`. May be empty.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn select(&self, tree: &Tree, pattern: &str) -> ApplicationResult<TipSet> {
        let matcher = self.matcher(pattern)?;
        select_tips(tree, &tree.tips(), |node| matcher.matches(node))
    }

    /// Resolve the MRCA of the tips matching `pattern`.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn find(&self, tree: &Tree, pattern: &str) -> ApplicationResult<MrcaOutput> {
        ensure_rooted(tree)?;
        let selection = self.select(tree, pattern)?;
        if selection.is_empty() {
            return Err(DomainError::EmptySelection.into());
        }
        let mrca = resolve_mrca(tree, &selection)?;
        let label = label_mrca(tree, mrca.node)?;
        debug!(?label, tips = mrca.descendants.len(), "resolved");

        Ok(MrcaOutput {
            pattern: pattern.to_string(),
            selected: selection.len(),
            node: mrca.node,
            label,
            tips: mrca
                .descendants
                .iter()
                .filter_map(|&tip| tree.name(tip).map(str::to_string))
                .collect(),
        })
    }

    /// Resolve several patterns against the same tree in parallel.
    ///
    /// Results keep the order of `patterns`. If any pattern fails, the first
    /// failure in that order is returned.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn find_many(
        &self,
        tree: &Tree,
        patterns: &[String],
    ) -> ApplicationResult<Vec<MrcaOutput>> {
        ensure_rooted(tree)?;
        let results: Vec<_> = patterns
            .par_iter()
            .map(|pattern| self.find(tree, pattern))
            .collect();
        results.into_iter().collect()
    }
}

/// Rejects trees the resolver cannot work on, before any selection happens.
pub fn ensure_rooted(tree: &Tree) -> ApplicationResult<()> {
    let root = tree.root().ok_or(DomainError::EmptyTree)?;
    if !tree.is_rooted() {
        return Err(DomainError::NotRooted {
            degree: tree.neighbors(root).len(),
        }
        .into());
    }
    Ok(())
}
