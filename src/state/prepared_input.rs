use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::display::{self, DisplayState};
use crate::error::{ParseError, PlotError};
use crate::expr::{Expression, Variable};

/// Raw text the user asked to plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotInput {
    pub expression: String,
    pub variable_name: String,
}

impl PlotInput {
    pub fn new(expression: impl Into<String>, variable_name: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            variable_name: variable_name.into(),
        }
    }
}

/// A parsed plot input. Replaced wholesale whenever the source text changes.
#[derive(Debug, Clone)]
pub struct PreparedInput {
    input: Option<PlotInput>,
    expression: Option<Arc<Expression>>,
    variable: Option<Variable>,
    from_explicit_args: bool,
}

impl PreparedInput {
    /// Parse `input`. Every free identifier of the expression must be the
    /// plot variable.
    pub fn prepare(input: PlotInput, from_explicit_args: bool) -> Result<Self, ParseError> {
        let expression = Expression::parse(&input.expression)?;
        let variable = Variable::new(&input.variable_name)?;
        if let Some(name) = expression
            .free_variables()
            .into_iter()
            .find(|name| name != variable.name())
        {
            return Err(ParseError::UnboundIdentifier {
                name,
                variable: variable.name().to_string(),
            });
        }
        Ok(Self {
            input: Some(input),
            expression: Some(Arc::new(expression)),
            variable: Some(variable),
            from_explicit_args,
        })
    }

    pub fn error(from_explicit_args: bool) -> Self {
        Self {
            input: None,
            expression: None,
            variable: None,
            from_explicit_args,
        }
    }

    /// Build the input from whatever the calculator display shows. Anything
    /// that cannot be plotted yields the error instance.
    pub fn from_display(state: &DisplayState) -> Self {
        let text = match (&state.result, state.valid) {
            (Some(text), true) => text,
            _ => return Self::error(false),
        };
        let expression = match Expression::parse(text) {
            Ok(expression) => expression,
            Err(e) => {
                tracing::debug!("Display result '{text}' is not an expression: {e}");
                return Self::error(false);
            }
        };
        if !display::is_plot_possible(&expression, state.operation) {
            return Self::error(false);
        }
        match display::plot_variable(&expression) {
            Some(variable) => {
                let input = PlotInput::new(text.clone(), variable.name());
                match Self::prepare(input, false) {
                    Ok(prepared) => prepared,
                    Err(e) => {
                        tracing::error!("Failed to prepare display result '{text}': {e}");
                        Self::error(false)
                    }
                }
            }
            None => Self::error(false),
        }
    }

    pub fn is_error(&self) -> bool {
        self.input.is_none() || self.expression.is_none() || self.variable.is_none()
    }

    pub fn is_from_explicit_args(&self) -> bool {
        self.from_explicit_args
    }

    pub fn input(&self) -> Option<&PlotInput> {
        self.input.as_ref()
    }

    pub fn expression(&self) -> Option<&Arc<Expression>> {
        self.expression.as_ref()
    }

    pub fn variable(&self) -> Option<&Variable> {
        self.variable.as_ref()
    }

    /// The expression and variable to sample.
    pub fn plottable(&self) -> Result<(&Arc<Expression>, &Variable), PlotError> {
        match (&self.expression, &self.variable) {
            (Some(expression), Some(variable)) => Ok((expression, variable)),
            _ => Err(PlotError::NotPlottable),
        }
    }
}
