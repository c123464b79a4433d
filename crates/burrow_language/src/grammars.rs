//! Ready-made grammars.
//!
//! ```text
//! Expression               -> '=' AdditionOrSubtraction $
//! AdditionOrSubtraction    -> MultiplicationOrDivision (('+' | '-') MultiplicationOrDivision)*
//! MultiplicationOrDivision -> Numeric (('*' | '/' | '%') Numeric)*
//! Numeric                  -> Number | ParenGroup
//! Number                   -> Float | Integer
//! Integer                  -> Digit+
//! Float                    -> Digit+ '.' Digit+
//! ParenGroup               -> '(' AdditionOrSubtraction ')'
//! ```
//!
//! `Float` is tried before `Integer`: when it fails on `12` the failed call
//! consumes nothing and `Integer` starts again from the first digit.

use crate::compiler::{
    Combinator, call, choose, end, literal, one_of, one_or_more, rule, sequence, zero_or_more,
};
use crate::grammar::{Grammar, NamedParser};

/// Start rule of [`arithmetic`].
pub const ARITHMETIC_START: &str = "Expression";

const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

fn digits() -> Combinator {
    one_or_more(one_of(DIGITS))
}

/// The arithmetic expression parser, e.g. `=1+2*(3.5-4)`.
#[must_use]
pub fn arithmetic_parser() -> NamedParser {
    NamedParser::new(
        "arithmetic",
        vec![
            rule(
                "Expression",
                [literal("="), call("AdditionOrSubtraction"), end()],
            ),
            rule(
                "AdditionOrSubtraction",
                [
                    call("MultiplicationOrDivision"),
                    zero_or_more(sequence([
                        one_of(["+", "-"]),
                        call("MultiplicationOrDivision"),
                    ])),
                ],
            ),
            rule(
                "MultiplicationOrDivision",
                [
                    call("Numeric"),
                    zero_or_more(sequence([one_of(["*", "/", "%"]), call("Numeric")])),
                ],
            ),
            rule("Numeric", [choose([call("Number"), call("ParenGroup")])]),
            rule("Number", [choose([call("Float"), call("Integer")])]),
            rule("Integer", [digits()]),
            rule("Float", [digits(), literal("."), digits()]),
            rule(
                "ParenGroup",
                [literal("("), call("AdditionOrSubtraction"), literal(")")],
            ),
        ],
    )
}

/// A grammar holding only [`arithmetic_parser`].
#[must_use]
pub fn arithmetic() -> Grammar {
    Grammar::single(arithmetic_parser())
}
