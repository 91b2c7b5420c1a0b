//! Body compiler using bidirectional type checking.
//!
//! - `infer()` synthesizes the type of an expression bottom-up
//! - `check()` verifies an expression against an expected type, inserting
//!   implicit conversions
//!
//! Every expression lowers to an [`Invoker`] closure over the argument list of
//! the body being compiled, so the result can be installed directly as a
//! member body.

mod binary;
mod conversion;
mod identifiers;
mod member;
mod unary;

use quill_core::{
    CompilationError, CompiledBody, DataType, DelegateShape, ExpressionCompiler, Invoker,
    SymbolEnv, TypeHash, TypeRef, Value, invoker,
};
use tracing::trace;

use crate::ast::Expr;

type Result<T> = std::result::Result<T, CompilationError>;

/// The reference [`ExpressionCompiler`]: compiles [`Expr`] trees to closures.
///
/// ```
/// use quill_core::{DataType, DelegateShape, ExpressionCompiler, SymbolEnv, Value};
/// use quill_expr::{Expr, ExprCompiler};
///
/// let shape = DelegateShape::new(vec![DataType::Int32], DataType::Int64);
/// let body = ExprCompiler
///     .compile(&Expr::add(Expr::param(0), Expr::long(1)), &SymbolEnv::new(), &shape)
///     .unwrap();
/// assert_eq!(body.call(&[Value::Int32(41)]).unwrap(), Value::Int64(42));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ExprCompiler;

impl ExpressionCompiler for ExprCompiler {
    type Expr = Expr;

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn compile(
        &self,
        expr: &Expr,
        env: &SymbolEnv,
        shape: &DelegateShape,
    ) -> Result<CompiledBody> {
        let body = BodyCompiler::new(env, shape);
        let typed = body.check(expr, &shape.return_type, "return value")?;
        trace!(%shape, "compiled expression body");
        Ok(CompiledBody {
            shape: shape.clone(),
            invoker: typed.eval,
        })
    }
}

/// A lowered value expression.
#[derive(Clone)]
pub(crate) struct Typed {
    pub data_type: DataType,
    /// The null literal: convertible to any reference type.
    pub is_null: bool,
    pub eval: Invoker,
}

impl Typed {
    pub fn new(data_type: DataType, eval: Invoker) -> Self {
        Self {
            data_type,
            is_null: false,
            eval,
        }
    }

    pub fn evaluate(&self, args: &[Value]) -> std::result::Result<Value, quill_core::RuntimeError> {
        (self.eval)(args)
    }
}

/// Result of inference: a value, or a type used as the target of static access.
pub(crate) enum Operand {
    Value(Typed),
    Type(TypeRef),
}

/// Compilation state for one body.
pub(crate) struct BodyCompiler<'a> {
    env: &'a SymbolEnv,
    shape: &'a DelegateShape,
}

impl<'a> BodyCompiler<'a> {
    pub fn new(env: &'a SymbolEnv, shape: &'a DelegateShape) -> Self {
        Self { env, shape }
    }

    pub fn env(&self) -> &'a SymbolEnv {
        self.env
    }

    pub fn shape(&self) -> &'a DelegateShape {
        self.shape
    }

    /// Synthesize the type of `expr`.
    pub fn infer(&self, expr: &Expr) -> Result<Operand> {
        match expr {
            Expr::Const(value) => Ok(Operand::Value(identifiers::compile_const(value))),
            Expr::Param(index) => identifiers::compile_param(self, *index).map(Operand::Value),
            Expr::This => identifiers::compile_this(self).map(Operand::Value),
            Expr::Symbol(name) => identifiers::compile_symbol(self, name),
            Expr::Member(target, name) => member::compile_member(self, target, name).map(Operand::Value),
            Expr::Call(target, name, args) => {
                member::compile_call(self, target, name, args).map(Operand::Value)
            }
            Expr::New(type_name, args) => member::compile_new(self, type_name, args).map(Operand::Value),
            Expr::Assign(target, name, value) => {
                member::compile_assign(self, target, name, value).map(Operand::Value)
            }
            Expr::Binary(op, lhs, rhs) => binary::compile_binary(self, *op, lhs, rhs).map(Operand::Value),
            Expr::Unary(op, operand) => unary::compile_unary(self, *op, operand).map(Operand::Value),
            Expr::Conditional(cond, then, otherwise) => {
                self.compile_conditional(cond, then, otherwise).map(Operand::Value)
            }
            Expr::Sequence(exprs) => self.compile_sequence(exprs).map(Operand::Value),
        }
    }

    /// Infer `expr`, which must denote a value.
    pub fn infer_value(&self, expr: &Expr) -> Result<Typed> {
        match self.infer(expr)? {
            Operand::Value(typed) => Ok(typed),
            Operand::Type(ty) => Err(CompilationError::InvalidOperation {
                message: format!("type '{}' cannot be used as a value", ty.name()),
            }),
        }
    }

    /// Check `expr` against `expected`. A `void` expectation discards the value.
    pub fn check(&self, expr: &Expr, expected: &DataType, context: &str) -> Result<Typed> {
        let typed = self.infer_value(expr)?;
        if expected.is_void() {
            let eval = typed.eval;
            return Ok(Typed::new(
                DataType::Void,
                invoker(move |args| {
                    eval(args)?;
                    Ok(Value::Void)
                }),
            ));
        }
        self.coerce(typed, expected, context)
    }

    /// Convert an already lowered value to `expected`.
    pub fn coerce(&self, typed: Typed, expected: &DataType, context: &str) -> Result<Typed> {
        match conversion::find_conversion(self, &typed, expected) {
            Some(conversion) => Ok(conversion.apply(typed, *expected)),
            None => Err(CompilationError::TypeMismatch {
                context: context.to_string(),
                expected: self.type_name(expected),
                found: self.describe(&typed),
            }),
        }
    }

    /// Resolve an object type bound in the environment.
    pub fn lookup_type(&self, hash: TypeHash) -> Result<TypeRef> {
        self.env
            .find_type(hash)
            .cloned()
            .ok_or_else(|| CompilationError::InvalidOperation {
                message: format!("type {hash} is not bound in the environment"),
            })
    }

    /// Readable name of a type, using bound type names for objects.
    pub fn type_name(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Object(hash) if *hash != TypeHash::OBJECT => self
                .env
                .find_type(*hash)
                .map(|ty| ty.name().to_string())
                .unwrap_or_else(|| data_type.to_string()),
            _ => data_type.to_string(),
        }
    }

    pub fn describe(&self, typed: &Typed) -> String {
        if typed.is_null {
            "null".to_string()
        } else {
            self.type_name(&typed.data_type)
        }
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn compile_conditional(&self, cond: &Expr, then: &Expr, otherwise: &Expr) -> Result<Typed> {
        let cond = self.check(cond, &DataType::Bool, "condition")?;
        let then = self.infer_value(then)?;
        let otherwise = self.infer_value(otherwise)?;
        let result_type = conversion::unify(self, &then, &otherwise).ok_or_else(|| {
            CompilationError::TypeMismatch {
                context: "conditional branches".to_string(),
                expected: self.describe(&then),
                found: self.describe(&otherwise),
            }
        })?;
        let then = self.coerce(then, &result_type, "conditional branch")?;
        let otherwise = self.coerce(otherwise, &result_type, "conditional branch")?;

        Ok(Typed::new(
            result_type,
            invoker(move |args| {
                if cond.evaluate(args)?.as_bool() == Some(true) {
                    then.evaluate(args)
                } else {
                    otherwise.evaluate(args)
                }
            }),
        ))
    }

    fn compile_sequence(&self, exprs: &[Expr]) -> Result<Typed> {
        let parts = exprs
            .iter()
            .map(|expr| self.infer_value(expr))
            .collect::<Result<Vec<_>>>()?;
        let data_type = parts.last().map_or(DataType::Void, |last| last.data_type);
        Ok(Typed::new(
            data_type,
            invoker(move |args| {
                let mut result = Value::Void;
                for part in &parts {
                    result = part.evaluate(args)?;
                }
                Ok(result)
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, UnaryOp};

    fn run(expr: Expr, params: Vec<DataType>, ret: DataType, args: &[Value]) -> std::result::Result<Value, quill_core::RuntimeError> {
        let shape = DelegateShape::new(params, ret);
        let body = ExprCompiler.compile(&expr, &SymbolEnv::new(), &shape).unwrap();
        body.call(args)
    }

    fn compile_error(expr: Expr, params: Vec<DataType>, ret: DataType) -> CompilationError {
        let shape = DelegateShape::new(params, ret);
        match ExprCompiler.compile(&expr, &SymbolEnv::new(), &shape) {
            Err(err) => err,
            Ok(_) => panic!("expected a compilation error"),
        }
    }

    #[test]
    fn arithmetic_promotes_operands() {
        let expr = Expr::add(Expr::param(0), Expr::float(0.5));
        assert_eq!(
            run(expr, vec![DataType::Int32], DataType::Float64, &[Value::Int32(2)]).unwrap(),
            Value::Float64(2.5)
        );
    }

    #[test]
    fn integer_division_by_zero_fails_at_runtime() {
        let expr = Expr::binary(BinaryOp::Div, Expr::int(1), Expr::param(0));
        assert!(matches!(
            run(expr, vec![DataType::Int32], DataType::Int32, &[Value::Int32(0)]),
            Err(quill_core::RuntimeError::DivisionByZero)
        ));
    }

    #[test]
    fn integer_overflow_wraps() {
        let expr = Expr::add(Expr::int(i32::MAX), Expr::int(1));
        assert_eq!(run(expr, vec![], DataType::Int32, &[]).unwrap(), Value::Int32(i32::MIN));
    }

    #[test]
    fn string_concatenation_formats_other_operand() {
        let expr = Expr::add(Expr::string("n="), Expr::param(0));
        assert_eq!(
            run(expr, vec![DataType::Int32], DataType::String, &[Value::Int32(7)]).unwrap(),
            Value::string("n=7")
        );
    }

    #[test]
    fn string_length() {
        let expr = Expr::string("héllo").member("Length");
        assert_eq!(run(expr, vec![], DataType::Int32, &[]).unwrap(), Value::Int32(5));
    }

    #[test]
    fn logical_operators_short_circuit() {
        // The right operand would divide by zero if evaluated.
        let explode = Expr::binary(
            BinaryOp::Equal,
            Expr::binary(BinaryOp::Div, Expr::int(1), Expr::int(0)),
            Expr::int(0),
        );
        let or = Expr::binary(BinaryOp::Or, Expr::bool(true), explode.clone());
        assert_eq!(run(or, vec![], DataType::Bool, &[]).unwrap(), Value::Bool(true));
        let and = Expr::binary(BinaryOp::And, Expr::bool(false), explode);
        assert_eq!(run(and, vec![], DataType::Bool, &[]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn comparisons_and_equality() {
        let less = Expr::binary(BinaryOp::Less, Expr::param(0), Expr::long(10));
        assert_eq!(
            run(less, vec![DataType::Int32], DataType::Bool, &[Value::Int32(3)]).unwrap(),
            Value::Bool(true)
        );
        let ne = Expr::binary(BinaryOp::NotEqual, Expr::string("a"), Expr::string("b"));
        assert_eq!(run(ne, vec![], DataType::Bool, &[]).unwrap(), Value::Bool(true));
        let null_eq = Expr::binary(BinaryOp::Equal, Expr::param(0), Expr::null());
        assert_eq!(
            run(null_eq, vec![DataType::String], DataType::Bool, &[Value::Null]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn unary_operators() {
        let neg = Expr::unary(UnaryOp::Neg, Expr::param(0));
        assert_eq!(
            run(neg, vec![DataType::Int64], DataType::Int64, &[Value::Int64(4)]).unwrap(),
            Value::Int64(-4)
        );
        let not = Expr::unary(UnaryOp::Not, Expr::bool(false));
        assert_eq!(run(not, vec![], DataType::Bool, &[]).unwrap(), Value::Bool(true));
        assert!(matches!(
            compile_error(Expr::unary(UnaryOp::Neg, Expr::string("x")), vec![], DataType::String),
            CompilationError::InvalidOperation { .. }
        ));
    }

    #[test]
    fn conditional_unifies_branches() {
        let expr = Expr::conditional(Expr::param(0), Expr::int(1), Expr::float(2.5));
        assert_eq!(
            run(expr, vec![DataType::Bool], DataType::Float64, &[Value::Bool(true)]).unwrap(),
            Value::Float64(1.0)
        );
    }

    #[test]
    fn sequence_yields_last_value() {
        let expr = Expr::sequence(vec![Expr::int(1), Expr::string("last")]);
        assert_eq!(run(expr, vec![], DataType::String, &[]).unwrap(), Value::string("last"));
    }

    #[test]
    fn void_return_discards_value() {
        assert_eq!(run(Expr::int(3), vec![], DataType::Void, &[]).unwrap(), Value::Void);
    }

    #[test]
    fn return_type_mismatch_is_reported() {
        assert!(matches!(
            compile_error(Expr::string("x"), vec![], DataType::Int32),
            CompilationError::TypeMismatch { .. }
        ));
        // Narrowing is never implicit.
        assert!(matches!(
            compile_error(Expr::long(1), vec![], DataType::Int32),
            CompilationError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn parameters_are_bounds_checked() {
        assert!(matches!(
            compile_error(Expr::param(1), vec![DataType::Int32], DataType::Int32),
            CompilationError::ParameterOutOfRange { index: 1, arity: 1 }
        ));
    }

    #[test]
    fn this_requires_a_bound_type() {
        assert!(matches!(
            compile_error(Expr::this(), vec![DataType::OBJECT], DataType::OBJECT),
            CompilationError::ThisUnavailable
        ));
    }

    #[test]
    fn unbound_symbols_are_rejected() {
        assert!(matches!(
            compile_error(Expr::symbol("missing"), vec![], DataType::Int32),
            CompilationError::UndefinedSymbol { name } if name == "missing"
        ));
    }

    #[test]
    fn symbols_bound_to_values_are_constants() {
        let env = SymbolEnv::new().child("limit", quill_core::Binding::Value(Value::Int32(9)));
        let shape = DelegateShape::new(vec![], DataType::Int32);
        let body = ExprCompiler.compile(&Expr::symbol("limit"), &env, &shape).unwrap();
        assert_eq!(body.call(&[]).unwrap(), Value::Int32(9));
    }
}
