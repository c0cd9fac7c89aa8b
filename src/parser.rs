//! Newick reader.
//!
//! Tokens are lexed with nom; the tree itself is assembled with an explicit
//! stack of open groups, so nesting depth is not limited by the call stack.

use std::borrow::Cow;

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_until, take_while1};
use nom::character::complete::{char, multispace1};
use nom::combinator::{map, value};
use nom::multi::{many0, many0_count};
use nom::number::complete::double;
use nom::sequence::{delimited, preceded};
use nom::IResult;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{NodeData, NodeId, Tree};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid Newick at byte {offset}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    fn at(input: &str, rest: &str, message: impl Into<String>) -> Self {
        Self {
            offset: input.len() - rest.len(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Open,
    Close,
    Comma,
    End,
    Label(Cow<'a, str>),
    Length(f64),
}

fn is_label_char(c: char) -> bool {
    !c.is_whitespace() && !"()[]':;,".contains(c)
}

/// Skips whitespace and `[...]` comments.
fn skip(input: &str) -> IResult<&str, usize> {
    many0_count(alt((
        multispace1,
        delimited(char('['), take_until("]"), char(']')),
    )))(input)
}

/// Single-quoted label; `''` stands for one quote.
fn quoted(input: &str) -> IResult<&str, Cow<'_, str>> {
    let (rest, parts) = delimited(
        char('\''),
        many0(alt((is_not("'"), value("'", tag("''"))))),
        char('\''),
    )(input)?;
    Ok((rest, Cow::Owned(parts.concat())))
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        value(Token::Open, char('(')),
        value(Token::Close, char(')')),
        value(Token::Comma, char(',')),
        value(Token::End, char(';')),
        map(preceded(char(':'), preceded(skip, double)), Token::Length),
        map(quoted, Token::Label),
        map(take_while1(is_label_char), |s: &str| {
            Token::Label(Cow::Borrowed(s))
        }),
    ))(input)
}

/// What the node currently being filled in has already received.
#[derive(Debug, Default, Clone, Copy)]
struct Slot {
    closed: bool,
    named: bool,
    has_length: bool,
}

impl Slot {
    fn is_fresh(&self) -> bool {
        !self.closed && !self.named && !self.has_length
    }
}

/// Parses a single Newick tree terminated by `;`.
#[instrument(level = "debug", skip(input), fields(len = input.len()))]
pub fn parse_newick(input: &str) -> Result<Tree, ParseError> {
    let mut tree = Tree::new();
    let root = tree.add_root(NodeData::default());
    let mut current = root;
    let mut slot = Slot::default();
    let mut open: Vec<NodeId> = Vec::new();
    let mut rest = input;
    let mut seen_token = false;

    loop {
        let (start, _) = skip(rest).map_err(|_| ParseError::at(input, rest, "unreadable input"))?;
        if start.is_empty() {
            let message = if seen_token {
                "missing ';' at end of tree"
            } else {
                "empty input"
            };
            return Err(ParseError::at(input, start, message));
        }

        let (after, tok) = token(start).map_err(|_| {
            let found = start.chars().next().unwrap_or_default();
            ParseError::at(input, start, format!("unexpected character '{found}'"))
        })?;
        seen_token = true;

        match tok {
            Token::Open => {
                if !slot.is_fresh() {
                    return Err(ParseError::at(input, start, "unexpected '('"));
                }
                open.push(current);
                current = new_child(&mut tree, current, input, start)?;
                slot = Slot::default();
            }
            Token::Comma => {
                let parent = *open
                    .last()
                    .ok_or_else(|| ParseError::at(input, start, "',' outside of parentheses"))?;
                current = new_child(&mut tree, parent, input, start)?;
                slot = Slot::default();
            }
            Token::Close => {
                current = open
                    .pop()
                    .ok_or_else(|| ParseError::at(input, start, "unbalanced ')'"))?;
                slot = Slot {
                    closed: true,
                    ..Slot::default()
                };
            }
            Token::Label(label) => {
                if slot.named || slot.has_length {
                    return Err(ParseError::at(input, start, "unexpected label"));
                }
                if let Some(node) = tree.get_mut(current) {
                    node.data.name = label.into_owned();
                }
                slot.named = true;
            }
            Token::Length(length) => {
                if slot.has_length {
                    return Err(ParseError::at(input, start, "duplicate branch length"));
                }
                if let Some(node) = tree.get_mut(current) {
                    node.data.branch_length = Some(length);
                }
                slot.has_length = true;
            }
            Token::End => {
                if !open.is_empty() {
                    return Err(ParseError::at(input, start, "unbalanced '('"));
                }
                let (trailing, _) =
                    skip(after).map_err(|_| ParseError::at(input, after, "unreadable input"))?;
                if !trailing.is_empty() {
                    return Err(ParseError::at(input, trailing, "unexpected text after ';'"));
                }
                debug!("parsed tree with {} nodes", tree.len());
                return Ok(tree);
            }
        }
        rest = after;
    }
}

fn new_child(tree: &mut Tree, parent: NodeId, input: &str, at: &str) -> Result<NodeId, ParseError> {
    tree.add_child(parent, NodeData::default())
        .ok_or_else(|| ParseError::at(input, at, "dangling parent node"))
}
