use num_complex::Complex64;

use crate::error::ArithmeticError;
use crate::expr::parser::{BinaryOp, Function, Node, SystemConstant};

/// Evaluate `node` with `name` bound to the real value `value`.
pub fn evaluate(node: &Node, name: &str, value: f64) -> Result<Complex64, ArithmeticError> {
    let z = match node {
        Node::Number(v) => Complex64::new(*v, 0.0),
        Node::Constant(SystemConstant::Pi) => Complex64::new(std::f64::consts::PI, 0.0),
        Node::Constant(SystemConstant::E) => Complex64::new(std::f64::consts::E, 0.0),
        Node::Constant(SystemConstant::I) => Complex64::i(),
        Node::Variable(var) if var == name => Complex64::new(value, 0.0),
        // Unbound identifiers are rejected when the input is prepared.
        Node::Variable(_) => return Err(ArithmeticError::Domain("unbound identifier")),
        Node::Neg(inner) => -evaluate(inner, name, value)?,
        Node::Binary(op, lhs, rhs) => {
            let a = evaluate(lhs, name, value)?;
            let b = evaluate(rhs, name, value)?;
            binary(*op, a, b)?
        }
        Node::Call(function, args) => {
            let arg = match args.as_slice() {
                [arg] => evaluate(arg, name, value)?,
                _ => return Err(ArithmeticError::Domain("function call")),
            };
            call(*function, arg)?
        }
    };
    finite(z)
}

fn finite(z: Complex64) -> Result<Complex64, ArithmeticError> {
    if z.re.is_finite() && z.im.is_finite() {
        Ok(z)
    } else {
        Err(ArithmeticError::Overflow)
    }
}

fn is_zero(z: Complex64) -> bool {
    z.re == 0.0 && z.im == 0.0
}

fn binary(op: BinaryOp, a: Complex64, b: Complex64) -> Result<Complex64, ArithmeticError> {
    match op {
        BinaryOp::Add => Ok(a + b),
        BinaryOp::Sub => Ok(a - b),
        BinaryOp::Mul => Ok(a * b),
        BinaryOp::Div => {
            if is_zero(b) {
                Err(ArithmeticError::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }
        BinaryOp::Pow => power(a, b),
    }
}

fn power(base: Complex64, exponent: Complex64) -> Result<Complex64, ArithmeticError> {
    if is_zero(base) {
        if exponent.im != 0.0 {
            return Err(ArithmeticError::Domain("complex power of zero"));
        }
        return if exponent.re > 0.0 {
            Ok(Complex64::new(0.0, 0.0))
        } else if exponent.re == 0.0 {
            Ok(Complex64::new(1.0, 0.0))
        } else {
            Err(ArithmeticError::DivisionByZero)
        };
    }
    if exponent.im == 0.0 {
        let e = exponent.re;
        // Integer powers stay exact so (-2)^2 has no imaginary residue.
        if e.fract() == 0.0 && e.abs() <= i32::MAX as f64 {
            return Ok(base.powi(e as i32));
        }
        if base.im == 0.0 && base.re > 0.0 {
            return Ok(Complex64::new(base.re.powf(e), 0.0));
        }
    }
    Ok(base.powc(exponent))
}

fn call(function: Function, z: Complex64) -> Result<Complex64, ArithmeticError> {
    let result = match function {
        Function::Sin => z.sin(),
        Function::Cos => z.cos(),
        Function::Tan => z.tan(),
        Function::Cot => {
            let t = z.tan();
            if is_zero(t) {
                return Err(ArithmeticError::DivisionByZero);
            }
            t.inv()
        }
        Function::Asin => z.asin(),
        Function::Acos => z.acos(),
        Function::Atan => z.atan(),
        Function::Sinh => z.sinh(),
        Function::Cosh => z.cosh(),
        Function::Tanh => z.tanh(),
        Function::Exp => z.exp(),
        Function::Ln => {
            if is_zero(z) {
                return Err(ArithmeticError::Domain("logarithm of zero"));
            }
            z.ln()
        }
        Function::Log => {
            if is_zero(z) {
                return Err(ArithmeticError::Domain("logarithm of zero"));
            }
            z.log10()
        }
        Function::Sqrt => z.sqrt(),
        Function::Abs => Complex64::new(z.norm(), 0.0),
    };
    Ok(result)
}
