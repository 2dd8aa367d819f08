//! Expression text handling: glyph normalisation, parsing and complex evaluation.

pub mod eval;
pub mod parser;
pub mod scanner;

use std::collections::BTreeSet;
use std::fmt;

use num_complex::Complex64;

use crate::error::{ArithmeticError, ParseError};
use parser::{Function, Node, SystemConstant};

/// Normalise display glyphs into the ASCII syntax the scanner accepts.
pub fn preprocess(raw: &str) -> Result<String, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        match ch {
            '×' | '·' | '∙' => out.push('*'),
            '÷' => out.push('/'),
            '−' | '–' => out.push('-'),
            '√' => out.push_str("sqrt"),
            'π' => out.push_str("pi"),
            '²' => out.push_str("^2"),
            '³' => out.push_str("^3"),
            _ => out.push(ch),
        }
    }
    Ok(out)
}

/// A parsed expression. Immutable and shareable across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let source = preprocess(text)?;
        let root = parser::parse(&source)?;
        Ok(Self { source, root })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Identifiers that are neither functions nor system constants, sorted.
    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut names = Vec::new();
        self.root.visit_variables(&mut names);
        names.into_iter().map(str::to_string).collect()
    }

    pub fn evaluate(&self, variable: &Variable, value: f64) -> Result<Complex64, ArithmeticError> {
        eval::evaluate(&self.root, variable.name(), value)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// The free variable a plot is drawn over.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    name: String,
}

impl Variable {
    pub fn new(name: &str) -> Result<Self, ParseError> {
        let name = name.trim();
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false);
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_start
            || !valid_rest
            || SystemConstant::lookup(name).is_some()
            || Function::lookup(name).is_some()
        {
            return Err(ParseError::InvalidVariable(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_normalises_glyphs() {
        assert_eq!(preprocess(" 2×π÷x ").unwrap(), "2*pi/x");
        assert_eq!(preprocess("√(x)−x²").unwrap(), "sqrt(x)-x^2");
        assert_eq!(preprocess("  "), Err(ParseError::Empty));
    }

    #[test]
    fn free_variables_skip_constants() {
        let expr = Expression::parse("a*sin(x) + pi + e*i + a").unwrap();
        let vars: Vec<String> = expr.free_variables().into_iter().collect();
        assert_eq!(vars, vec!["a".to_string(), "x".to_string()]);
    }

    #[test]
    fn variable_names_are_validated() {
        assert!(Variable::new("x").is_ok());
        assert!(Variable::new("t_1").is_ok());
        assert!(Variable::new("1x").is_err());
        assert!(Variable::new("pi").is_err());
        assert!(Variable::new("sin").is_err());
        assert!(Variable::new("").is_err());
    }

    #[test]
    fn evaluates_with_bound_variable() {
        let expr = Expression::parse("x² + 1").unwrap();
        let x = Variable::new("x").unwrap();
        assert_eq!(expr.evaluate(&x, 2.0).unwrap(), Complex64::new(5.0, 0.0));
    }
}
