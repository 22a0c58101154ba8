//! Condition expression parser.
//!
//! Supports the flat subset of the Sigma condition language that maps onto a
//! single Wazuh rule (or a fan-out of sibling rules): one chain of selection
//! references joined exclusively by `and` or exclusively by `or`, each
//! reference optionally prefixed with `not`. Mixed connectives, parentheses
//! and `1 of` / `all of` quantifiers are rejected rather than guessed at.

use pest::Parser;
use pest_derive::Parser;

use crate::ast::{ConditionExpr, SelectionRef};
use crate::error::{LoadError, Result};

#[derive(Parser)]
#[grammar = "src/condition.pest"]
struct ConditionParser;

/// Parse a condition string into a [`ConditionExpr`].
///
/// # Errors
///
/// Returns [`LoadError::Condition`] when the input is not a flat chain of
/// references, and [`LoadError::UnsupportedExpression`] when the chain mixes
/// `and` with `or`.
pub fn parse_condition(input: &str) -> Result<ConditionExpr> {
    let mut pairs = ConditionParser::parse(Rule::condition, input)
        .map_err(|e| LoadError::Condition(e.to_string()))?;

    // condition is the single top-level pair; grammar guarantees it exists.
    let condition = pairs.next().unwrap_or_else(|| unreachable!());

    let mut refs: Vec<SelectionRef> = Vec::new();
    let mut saw_and = false;
    let mut saw_or = false;

    for pair in condition.into_inner() {
        match pair.as_rule() {
            Rule::term => {
                let mut negated = false;
                let mut name = String::new();
                for inner in pair.into_inner() {
                    match inner.as_rule() {
                        Rule::not_op => negated = true,
                        Rule::ident => name = inner.as_str().to_string(),
                        _ => unreachable!("unexpected rule inside term"),
                    }
                }
                refs.push(SelectionRef { name, negated });
            }
            Rule::and_op => saw_and = true,
            Rule::or_op => saw_or = true,
            Rule::EOI => {}
            _ => unreachable!("unexpected rule inside condition"),
        }
    }

    if saw_and && saw_or {
        return Err(LoadError::UnsupportedExpression(input.trim().to_string()));
    }

    if refs.len() == 1 {
        let r = refs.pop().unwrap_or_else(|| unreachable!());
        Ok(ConditionExpr::Reference(r))
    } else if saw_or {
        Ok(ConditionExpr::Disjunction(refs))
    } else {
        Ok(ConditionExpr::Conjunction(refs))
    }
}
