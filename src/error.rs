use thiserror::Error;

/// Failure to turn user text into an evaluable expression or variable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expression is empty")]
    Empty,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("invalid number '{text}' at position {pos}")]
    InvalidNumber { text: String, pos: usize },
    #[error("unexpected '{found}' at position {pos}")]
    UnexpectedToken { found: String, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expression is nested too deeply at position {pos}")]
    TooDeep { pos: usize },
    #[error("function '{name}' takes {expected} argument(s), got {found}")]
    WrongArity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("'{0}' is not a valid variable name")]
    InvalidVariable(String),
    #[error("'{name}' is not bound (plot variable is '{variable}')")]
    UnboundIdentifier { name: String, variable: String },
}

/// Per-sample evaluation failure. Recovered by skipping the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("{0} is undefined")]
    Domain(&'static str),
    #[error("result is not finite")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("no sample in [{x_min}, {x_max}] could be evaluated ({failed} failed)")]
    EmptySeries { x_min: f64, x_max: f64, failed: usize },
    #[error("invalid domain [{x_min}, {x_max}]")]
    InvalidDomain { x_min: f64, x_max: f64 },
    #[error("invalid y range [{y_min}, {y_max}]")]
    InvalidRange { y_min: f64, y_max: f64 },
    #[error("step count must be positive")]
    InvalidSteps,
    #[error("plot is not possible")]
    NotPlottable,
    #[error("failed to start sampling threads: {0}")]
    WorkerSpawn(String),
}
