//! Grammar model: rules, named parsers, and the shared parser registry.
//!
//! A [`Grammar`] owns every [`NamedParser`]; parsers reach each other through
//! import aliases that map to registry indices. Rules are compiled once and
//! their instruction arrays are never modified afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use burrow_foundation::Result;

use crate::opcode::{Instruction, RulePath};
use crate::resolver;

/// Identity of a rule within a [`Grammar`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId {
    /// Index of the parser in the registry.
    pub parser: usize,
    /// Index of the rule within its parser.
    pub rule: usize,
}

impl RuleId {
    /// Creates a rule id.
    #[must_use]
    pub const fn new(parser: usize, rule: usize) -> Self {
        Self { parser, rule }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.parser, self.rule)
    }
}

/// A compiled rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    name: Arc<str>,
    qualified_name: String,
    code: Box<[Instruction]>,
    /// Reserved for the left-recursion grow algorithm; never read.
    grow_index: Option<usize>,
}

impl Rule {
    /// Creates a rule from already-assembled instructions.
    #[must_use]
    pub fn from_instructions(name: impl Into<Arc<str>>, code: Vec<Instruction>) -> Self {
        let name = name.into();
        Self {
            qualified_name: name.to_string(),
            name,
            code: code.into_boxed_slice(),
            grow_index: None,
        }
    }

    /// The rule's own name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name qualified by its parser, e.g. `calc.Number`.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// The instruction array.
    #[must_use]
    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    /// The instruction at `ip`, if in range.
    #[must_use]
    pub fn instruction(&self, ip: usize) -> Option<&Instruction> {
        self.code.get(ip)
    }

    /// The reserved grow slot.
    #[must_use]
    pub fn grow_index(&self) -> Option<usize> {
        self.grow_index
    }

    fn qualify(&mut self, parser: &str) {
        self.qualified_name = format!("{parser}.{}", self.name);
    }
}

/// A named, ordered set of rules plus its imports.
#[derive(Clone, Debug)]
pub struct NamedParser {
    name: Arc<str>,
    rules: Vec<Rule>,
    imports: HashMap<Arc<str>, usize>,
}

impl NamedParser {
    /// Creates a parser, qualifying each rule's name with the parser's.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, rules: Vec<Rule>) -> Self {
        let name = name.into();
        let mut rules = rules;
        for rule in &mut rules {
            rule.qualify(&name);
        }
        Self {
            name,
            rules,
            imports: HashMap::new(),
        }
    }

    /// Adds an import alias pointing at another parser's registry index.
    #[must_use]
    pub fn with_import(mut self, alias: impl Into<Arc<str>>, parser: usize) -> Self {
        self.imports.insert(alias.into(), parser);
        self
    }

    /// The parser's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All rules, in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The registry index behind an import alias.
    #[must_use]
    pub fn import(&self, alias: &str) -> Option<usize> {
        self.imports.get(alias).copied()
    }

    /// The index of the first rule with the given name.
    #[must_use]
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name() == name)
    }
}

/// Identity of a [`Grammar`]'s current set of parsers.
///
/// A fresh id is drawn whenever a parser is registered; clones share it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GrammarId(u64);

impl GrammarId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for GrammarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grammar#{}", self.0)
    }
}

/// The shared parser registry.
#[derive(Clone, Debug)]
pub struct Grammar {
    parsers: Vec<NamedParser>,
    id: GrammarId,
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            parsers: Vec::new(),
            id: GrammarId::next(),
        }
    }
}

impl Grammar {
    /// Creates an empty grammar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a grammar holding a single parser.
    #[must_use]
    pub fn single(parser: NamedParser) -> Self {
        let mut grammar = Self::new();
        grammar.add_parser(parser);
        grammar
    }

    /// Registers a parser and returns its index.
    pub fn add_parser(&mut self, parser: NamedParser) -> usize {
        self.parsers.push(parser);
        self.id = GrammarId::next();
        self.parsers.len() - 1
    }

    /// The grammar's identity, as recorded by the token indexes it parses.
    #[must_use]
    pub const fn id(&self) -> GrammarId {
        self.id
    }

    /// All registered parsers.
    #[must_use]
    pub fn parsers(&self) -> &[NamedParser] {
        &self.parsers
    }

    /// The parser at `index`.
    #[must_use]
    pub fn parser(&self, index: usize) -> Option<&NamedParser> {
        self.parsers.get(index)
    }

    /// The rule with the given id.
    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.parsers.get(id.parser)?.rules.get(id.rule)
    }

    /// Iterates over every rule with its id.
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.parsers.iter().enumerate().flat_map(|(p, parser)| {
            parser
                .rules
                .iter()
                .enumerate()
                .map(move |(r, rule)| (RuleId::new(p, r), rule))
        })
    }

    /// Resolves an entry path starting from the first registered parser.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the path does not name a rule.
    pub fn entry(&self, path: &RulePath) -> Result<RuleId> {
        resolver::resolve_from_parser(self, 0, path, "<entry>")
    }

    /// Resolves every call site in the grammar, caching the results.
    ///
    /// Grammars are expected to be statically well-formed; this surfaces
    /// bad paths before any input is parsed.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error found.
    pub fn validate(&self) -> Result<()> {
        for (id, rule) in self.rules() {
            for op in rule.code() {
                if let Instruction::CallRule(site) = op {
                    site.resolve_with(|path| resolver::resolve_rule_path(self, id, path))?;
                }
            }
        }
        Ok(())
    }

    /// Renders every rule's instructions.
    #[must_use]
    pub fn disassemble(&self) -> String {
        self.rules()
            .map(|(_, rule)| rule.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
