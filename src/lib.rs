//! Most recent common ancestor lookup for rooted Newick trees.
//!
//! The [`domain`] layer holds the tree model and the MRCA resolver; the
//! [`parser`] reads Newick text into it. [`application`] wires both to regex
//! tip selection, and [`cli`] is the `mrca` command line.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod parser;
pub mod util;
