//! Resolution of dotted rule paths across parsers.
//!
//! Every segment but the last is looked up in the current parser's import
//! table to move to another parser; the last segment is matched by name
//! against that parser's rules. All failures are fatal: grammars are built
//! ahead of time, so a bad path is a grammar bug rather than bad input.

use burrow_foundation::{Error, ResolutionFault, Result};

use crate::grammar::{Grammar, RuleId};
use crate::opcode::RulePath;

/// Resolves `path` as written inside the rule `from`.
///
/// # Errors
///
/// Returns a resolution error for an empty path, an unknown import alias,
/// an import pointing outside the registry, or an unknown rule name.
pub fn resolve_rule_path(grammar: &Grammar, from: RuleId, path: &RulePath) -> Result<RuleId> {
    let from_name = grammar
        .rule(from)
        .map_or_else(|| from.to_string(), |r| r.qualified_name().to_string());
    resolve_from_parser(grammar, from.parser, path, &from_name)
}

/// Resolves `path` starting at the parser with index `start`.
///
/// `from` names the caller in error messages.
///
/// # Errors
///
/// See [`resolve_rule_path`].
pub fn resolve_from_parser(
    grammar: &Grammar,
    start: usize,
    path: &RulePath,
    from: &str,
) -> Result<RuleId> {
    let Some((last, aliases)) = path.segments().split_last() else {
        return Err(Error::resolution(ResolutionFault::EmptyPath {
            from: from.to_string(),
        }));
    };

    let out_of_range = |index: usize| {
        Error::resolution(ResolutionFault::ParserIndexOutOfRange {
            index,
            len: grammar.parsers().len(),
        })
    };

    let mut current = start;
    let mut parser = grammar.parser(current).ok_or_else(|| out_of_range(current))?;

    for alias in aliases {
        let Some(next) = parser.import(alias) else {
            return Err(Error::resolution(ResolutionFault::UnknownImport {
                alias: alias.to_string(),
                path: path.to_string(),
                from: from.to_string(),
            }));
        };
        current = next;
        parser = grammar.parser(current).ok_or_else(|| out_of_range(current))?;
    }

    let rule = parser.rule_index(last).ok_or_else(|| {
        Error::resolution(ResolutionFault::UnknownRule {
            path: path.to_string(),
            from: from.to_string(),
        })
    })?;

    Ok(RuleId::new(current, rule))
}
