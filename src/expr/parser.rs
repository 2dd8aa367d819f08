use crate::error::ParseError;
use crate::expr::scanner::{tokenize, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Constants every expression may use without binding them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemConstant {
    Pi,
    E,
    I,
}

impl SystemConstant {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(SystemConstant::Pi),
            "e" => Some(SystemConstant::E),
            "i" => Some(SystemConstant::I),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Cot,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log,
    Sqrt,
    Abs,
}

impl Function {
    pub fn lookup(name: &str) -> Option<Self> {
        let f = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "cot" => Function::Cot,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "exp" => Function::Exp,
            "ln" => Function::Ln,
            "log" => Function::Log,
            "sqrt" => Function::Sqrt,
            "abs" => Function::Abs,
            _ => return None,
        };
        Some(f)
    }

    pub fn arity(&self) -> usize {
        1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    Constant(SystemConstant),
    Variable(String),
    Neg(Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Call(Function, Vec<Node>),
}

impl Node {
    /// Collect every free identifier in the tree.
    pub fn visit_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Number(_) | Node::Constant(_) => {}
            Node::Variable(name) => out.push(name),
            Node::Neg(inner) => inner.visit_variables(out),
            Node::Binary(_, lhs, rhs) => {
                lhs.visit_variables(out);
                rhs.visit_variables(out);
            }
            Node::Call(_, args) => {
                for arg in args {
                    arg.visit_variables(out);
                }
            }
        }
    }
}

/// Deepest parenthesis, sign or exponent nesting the parser descends into.
pub const MAX_NESTING: usize = 256;

/// Tallest tree accepted. Evaluation recurses once per level.
pub const MAX_HEIGHT: usize = 1024;

/// Parse preprocessed text into a syntax tree.
pub fn parse(input: &str) -> Result<Node, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        nesting: 0,
    };
    let parsed = parser.parse_sum()?;
    if let Some(token) = parser.peek() {
        return Err(unexpected(token));
    }
    Ok(parsed.node)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    nesting: usize,
}

/// A subtree together with its height.
struct Parsed {
    node: Node,
    height: usize,
}

impl Parsed {
    fn leaf(node: Node) -> Self {
        Self { node, height: 1 }
    }
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::UnexpectedToken {
        found: token.kind.describe(),
        pos: token.pos,
    }
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        match self.peek() {
            Some(t) if &t.kind == kind => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        match self.next() {
            Some(t) if &t.kind == kind => Ok(()),
            Some(t) => Err(unexpected(t)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    /// Position of the token about to be read, or of the last one.
    fn current_pos(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.pos)
    }

    fn too_deep(&self) -> ParseError {
        ParseError::TooDeep {
            pos: self.current_pos(),
        }
    }

    /// Wrap `children` under a new node, enforcing [`MAX_HEIGHT`].
    fn branch(&self, node: Node, children: &[usize]) -> Result<Parsed, ParseError> {
        let height = children.iter().copied().max().unwrap_or(0) + 1;
        if height > MAX_HEIGHT {
            return Err(self.too_deep());
        }
        Ok(Parsed { node, height })
    }

    fn binary(&self, op: BinaryOp, lhs: Parsed, rhs: Parsed) -> Result<Parsed, ParseError> {
        let heights = [lhs.height, rhs.height];
        self.branch(Node::Binary(op, Box::new(lhs.node), Box::new(rhs.node)), &heights)
    }

    fn parse_sum(&mut self) -> Result<Parsed, ParseError> {
        let mut lhs = self.parse_product()?;
        loop {
            let op = if self.eat(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.eat(&TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let rhs = self.parse_product()?;
            lhs = self.binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn parse_product(&mut self) -> Result<Parsed, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = if self.eat(&TokenKind::Star) {
                BinaryOp::Mul
            } else if self.eat(&TokenKind::Slash) {
                BinaryOp::Div
            } else if self.starts_operand() {
                // Implicit multiplication: `2x`, `3(x + 1)`, `x sin(x)`.
                BinaryOp::Mul
            } else {
                break;
            };
            let rhs = self.parse_unary()?;
            lhs = self.binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn starts_operand(&self) -> bool {
        matches!(
            self.peek().map(|t| &t.kind),
            Some(TokenKind::Number(_)) | Some(TokenKind::Ident(_)) | Some(TokenKind::LParen)
        )
    }

    /// Every recursive path of the grammar passes through here.
    fn parse_unary(&mut self) -> Result<Parsed, ParseError> {
        if self.nesting >= MAX_NESTING {
            return Err(self.too_deep());
        }
        self.nesting += 1;
        let parsed = self.parse_signed();
        self.nesting -= 1;
        parsed
    }

    fn parse_signed(&mut self) -> Result<Parsed, ParseError> {
        if self.eat(&TokenKind::Minus) {
            let inner = self.parse_unary()?;
            let height = inner.height;
            return self.branch(Node::Neg(Box::new(inner.node)), &[height]);
        }
        if self.eat(&TokenKind::Plus) {
            return self.parse_unary();
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Parsed, ParseError> {
        let base = self.parse_primary()?;
        if self.eat(&TokenKind::Caret) {
            // Right associative, and binds a leading sign: 2^-x.
            let exponent = self.parse_unary()?;
            return self.binary(BinaryOp::Pow, base, exponent);
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Parsed, ParseError> {
        let token = self.next().ok_or(ParseError::UnexpectedEnd)?;
        match &token.kind {
            TokenKind::Number(v) => Ok(Parsed::leaf(Node::Number(*v))),
            TokenKind::LParen => {
                let inner = self.parse_sum()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                if let Some(function) = Function::lookup(name) {
                    if self.peek().map(|t| &t.kind) == Some(&TokenKind::LParen) {
                        return self.parse_call(name, function);
                    }
                    // A bare function name without an argument list.
                    return Err(self
                        .peek()
                        .map(unexpected)
                        .unwrap_or(ParseError::UnexpectedEnd));
                }
                // Anything else before `(` is a factor: `x(x + 1)`, `pi(x)`.
                if let Some(constant) = SystemConstant::lookup(name) {
                    return Ok(Parsed::leaf(Node::Constant(constant)));
                }
                Ok(Parsed::leaf(Node::Variable(name.clone())))
            }
            _ => Err(unexpected(token)),
        }
    }

    fn parse_call(&mut self, name: &str, function: Function) -> Result<Parsed, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                args.push(self.parse_sum()?);
                if self.eat(&TokenKind::Comma) {
                    continue;
                }
                self.expect(&TokenKind::RParen)?;
                break;
            }
        }
        if args.len() != function.arity() {
            return Err(ParseError::WrongArity {
                name: name.to_string(),
                expected: function.arity(),
                found: args.len(),
            });
        }
        let heights: Vec<usize> = args.iter().map(|a| a.height).collect();
        let args = args.into_iter().map(|a| a.node).collect();
        self.branch(Node::Call(function, args), &heights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Box<Node> {
        Box::new(Node::Variable(name.to_string()))
    }

    fn num(v: f64) -> Box<Node> {
        Box::new(Node::Number(v))
    }

    #[test]
    fn precedence_and_associativity() {
        // 1 + 2 * x ^ 3 ^ 2  ==  1 + (2 * (x ^ (3 ^ 2)))
        let node = parse("1 + 2 * x ^ 3 ^ 2").unwrap();
        let expected = Node::Binary(
            BinaryOp::Add,
            num(1.0),
            Box::new(Node::Binary(
                BinaryOp::Mul,
                num(2.0),
                Box::new(Node::Binary(
                    BinaryOp::Pow,
                    var("x"),
                    Box::new(Node::Binary(BinaryOp::Pow, num(3.0), num(2.0))),
                )),
            )),
        );
        assert_eq!(node, expected);
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        let node = parse("-x^2").unwrap();
        assert_eq!(
            node,
            Node::Neg(Box::new(Node::Binary(BinaryOp::Pow, var("x"), num(2.0))))
        );
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(
            parse("2x").unwrap(),
            Node::Binary(BinaryOp::Mul, num(2.0), var("x"))
        );
        assert_eq!(
            parse("3(x+1)").unwrap(),
            Node::Binary(
                BinaryOp::Mul,
                num(3.0),
                Box::new(Node::Binary(BinaryOp::Add, var("x"), num(1.0)))
            )
        );
    }

    #[test]
    fn non_function_before_paren_multiplies() {
        assert_eq!(
            parse("x(x+1)").unwrap(),
            Node::Binary(
                BinaryOp::Mul,
                var("x"),
                Box::new(Node::Binary(BinaryOp::Add, var("x"), num(1.0)))
            )
        );
        assert_eq!(
            parse("foo(x)").unwrap(),
            Node::Binary(BinaryOp::Mul, var("foo"), var("x"))
        );
        assert_eq!(
            parse("pi(2)").unwrap(),
            Node::Binary(BinaryOp::Mul, Box::new(Node::Constant(SystemConstant::Pi)), num(2.0))
        );
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let parens = format!("{}x", "(".repeat(10_000));
        assert!(matches!(parse(&parens), Err(ParseError::TooDeep { .. })));

        let signs = format!("{}x", "-".repeat(200_000));
        assert!(matches!(parse(&signs), Err(ParseError::TooDeep { .. })));

        let powers = vec!["x"; 5_000].join("^");
        assert!(matches!(parse(&powers), Err(ParseError::TooDeep { .. })));

        let long_sum = vec!["x"; 5_000].join("+");
        assert!(matches!(parse(&long_sum), Err(ParseError::TooDeep { .. })));
    }

    #[test]
    fn moderate_nesting_is_fine() {
        let nested = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse(&nested).unwrap(), Node::Variable("x".to_string()));
        let sum = vec!["x"; 500].join("+");
        assert!(parse(&sum).is_ok());
    }

    #[test]
    fn constants_and_calls() {
        assert_eq!(
            parse("sin(pi)").unwrap(),
            Node::Call(Function::Sin, vec![Node::Constant(SystemConstant::Pi)])
        );
    }

    #[test]
    fn reports_errors() {
        assert_eq!(parse("(x + 1"), Err(ParseError::UnexpectedEnd));
        assert!(matches!(
            parse("sin(x, 2)"),
            Err(ParseError::WrongArity { expected: 1, found: 2, .. })
        ));
        assert!(matches!(
            parse("x + * 2"),
            Err(ParseError::UnexpectedToken { pos: 4, .. })
        ));
        assert!(matches!(parse("sqrt + 1"), Err(ParseError::UnexpectedToken { .. })));
        assert_eq!(parse("   "), Err(ParseError::Empty));
    }
}
