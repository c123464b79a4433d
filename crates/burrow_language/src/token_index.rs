//! The token index: the parser's view of its input.
//!
//! Tokens live in an arena of [`IndexNode`]s addressed by [`NodeId`]. The
//! chain is built once per input and never changes shape afterwards; the
//! only mutable part is the packrat [`MemoTable`] that travels with it.
//!
//! Memo entries are only meaningful for the grammar that wrote them, so an
//! index is bound to the first grammar that parses it.

use std::collections::HashMap;

use burrow_foundation::{Error, Result, SourcePosition, Token};

use crate::grammar::{GrammarId, RuleId};
use crate::memo::MemoTable;
use crate::vm::ParseOutcome;

/// Index of a node in a [`TokenIndex`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The first node of every index.
    pub const START: Self = Self(0);

    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One input token together with where it sits in the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexNode {
    /// The token itself.
    pub token: Token,
    /// Offset, line, and column of the token.
    pub position: SourcePosition,
}

/// Immutable token chain plus lazily-populated memo storage.
#[derive(Debug)]
pub struct TokenIndex {
    nodes: Vec<IndexNode>,
    memo: MemoTable,
    /// The grammar whose results the memo holds.
    grammar: Option<GrammarId>,
    /// Outcomes of completed parses, by start rule.
    finished: HashMap<RuleId, ParseOutcome>,
}

impl TokenIndex {
    /// Builds an index from a token sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](burrow_foundation::ErrorKind::InvalidInput)
    /// if the sequence is empty, does not end with the end-of-stream marker,
    /// or contains the marker anywhere before the end.
    pub fn new(tokens: Vec<Token>) -> Result<Self> {
        match tokens.last() {
            None => return Err(Error::invalid_input("token sequence is empty")),
            Some(last) if !last.is_end() => {
                return Err(Error::invalid_input(
                    "token sequence does not end with the end-of-stream marker",
                ));
            }
            Some(_) => {}
        }
        if let Some(early) = tokens[..tokens.len() - 1].iter().find(|t| t.is_end()) {
            return Err(Error::invalid_input(format!(
                "end-of-stream marker at offset {} before the last token",
                early.offset
            )));
        }

        let mut position = SourcePosition::at_start();
        let nodes = tokens
            .into_iter()
            .map(|token| {
                let node = IndexNode {
                    position: SourcePosition {
                        offset: token.offset,
                        ..position
                    },
                    token,
                };
                position = position.advance(&node.token.text);
                node
            })
            .collect();

        Ok(Self {
            nodes,
            memo: MemoTable::new(),
            grammar: None,
            finished: HashMap::new(),
        })
    }

    /// Tokenizes `source` one character per token and indexes the result.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        let mut position = SourcePosition::at_start();
        let nodes = burrow_foundation::tokenize(source)
            .into_iter()
            .map(|token| {
                let node = IndexNode { token, position };
                position = position.advance(&node.token.text);
                node
            })
            .collect();

        Self {
            nodes,
            memo: MemoTable::new(),
            grammar: None,
            finished: HashMap::new(),
        }
    }

    /// Returns the number of nodes, including the end marker.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the index holds no nodes. Never true for a built index.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this index.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &IndexNode {
        &self.nodes[id.0]
    }

    /// Returns the token at `id`.
    #[must_use]
    pub fn token(&self, id: NodeId) -> &Token {
        &self.node(id).token
    }

    /// Returns the source position of `id`.
    #[must_use]
    pub fn position(&self, id: NodeId) -> SourcePosition {
        self.node(id).position
    }

    /// Returns the node after `id`, or `None` at the end of the stream.
    #[must_use]
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        let next = id.0 + 1;
        (next < self.nodes.len()).then_some(NodeId(next))
    }

    /// Returns the end-of-stream node.
    #[must_use]
    pub fn end(&self) -> NodeId {
        NodeId(self.nodes.len().saturating_sub(1))
    }

    /// Returns the memo table.
    #[must_use]
    pub fn memo(&self) -> &MemoTable {
        &self.memo
    }

    /// Returns the memo table for updating.
    pub fn memo_mut(&mut self) -> &mut MemoTable {
        &mut self.memo
    }

    /// Returns the grammar this index is bound to, if it has been parsed.
    #[must_use]
    pub fn grammar(&self) -> Option<GrammarId> {
        self.grammar
    }

    /// Binds the index to `grammar`, or checks that it already is.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](burrow_foundation::ErrorKind::InvalidInput)
    /// if the index holds results of a different grammar.
    pub fn bind_grammar(&mut self, grammar: GrammarId) -> Result<()> {
        match self.grammar {
            None => {
                self.grammar = Some(grammar);
                Ok(())
            }
            Some(bound) if bound == grammar => Ok(()),
            Some(bound) => Err(Error::invalid_input(format!(
                "token index already holds results of {bound}, cannot parse it with {grammar}"
            ))),
        }
    }

    /// Returns the outcome of a completed parse from `rule`.
    #[must_use]
    pub fn finished(&self, rule: RuleId) -> Option<&ParseOutcome> {
        self.finished.get(&rule)
    }

    /// Records the outcome of a completed parse from `rule`.
    pub fn record_finished(&mut self, rule: RuleId, outcome: ParseOutcome) {
        self.finished.insert(rule, outcome);
    }

    /// Iterates over all nodes in order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &IndexNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}
