//! Condition expressions.
//!
//! Rule conditions are written as JSON-logic style trees: literals, lists,
//! or single-key `{operator: operand}` mappings. They are compiled once at
//! load time into [`Expr`], so operator and arity mistakes surface as load
//! errors instead of per-evaluation failures.

use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

use super::value::{compare, loose_eq, truthy, type_name};

/// Flat fact mapping that expressions are evaluated against.
pub type Context = BTreeMap<String, Value>;

/// Errors raised while compiling or evaluating an expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("operator mapping must have exactly one key, found {0}")]
    OperatorCount(usize),

    #[error("unsupported operator: {0}")]
    UnknownOperator(String),

    #[error("operator '{op}' expects {expected}, found {found}")]
    InvalidOperand {
        op: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("operator '{op}' cannot compare {left} with {right}")]
    Incomparable {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("operator 'in' needs a list, string or mapping haystack, found {0}")]
    NotAContainer(&'static str),
}

/// Compiled condition expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Number, string, boolean or null, returned unchanged
    Literal(Value),
    /// Sequence evaluated element-wise
    List(Vec<Expr>),
    /// Context lookup; missing keys evaluate to null
    Var(String),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    /// Membership test: haystack, needle
    In(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Neq(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Gte(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Lte(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Compile a raw expression tree.
    pub fn compile(raw: &Value) -> Result<Expr, ExprError> {
        match raw {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                Ok(Expr::Literal(raw.clone()))
            }
            Value::Array(items) => Ok(Expr::List(compile_all(items)?)),
            Value::Object(map) => {
                if map.len() != 1 {
                    return Err(ExprError::OperatorCount(map.len()));
                }
                let (op, operand) = map.iter().next().ok_or(ExprError::OperatorCount(0))?;
                compile_operator(op, operand)
            }
        }
    }

    /// Evaluate against a context.
    pub fn evaluate(&self, ctx: &Context) -> Result<Value, ExprError> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::List(items) => items
                .iter()
                .map(|item| item.evaluate(ctx))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Expr::Var(key) => Ok(ctx.get(key).cloned().unwrap_or(Value::Null)),
            Expr::And(items) => {
                for item in items {
                    if !truthy(&item.evaluate(ctx)?) {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Expr::Or(items) => {
                for item in items {
                    if truthy(&item.evaluate(ctx)?) {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Expr::Not(inner) => Ok(Value::Bool(!truthy(&inner.evaluate(ctx)?))),
            Expr::In(haystack, needle) => {
                let haystack = haystack.evaluate(ctx)?;
                let needle = needle.evaluate(ctx)?;
                contains(&haystack, &needle).map(Value::Bool)
            }
            Expr::Eq(a, b) => Ok(Value::Bool(loose_eq(&a.evaluate(ctx)?, &b.evaluate(ctx)?))),
            Expr::Neq(a, b) => Ok(Value::Bool(!loose_eq(&a.evaluate(ctx)?, &b.evaluate(ctx)?))),
            Expr::Gt(a, b) => ordered("gt", a, b, ctx, |o| o == Ordering::Greater),
            Expr::Gte(a, b) => ordered("gte", a, b, ctx, |o| o != Ordering::Less),
            Expr::Lt(a, b) => ordered("lt", a, b, ctx, |o| o == Ordering::Less),
            Expr::Lte(a, b) => ordered("lte", a, b, ctx, |o| o != Ordering::Greater),
        }
    }

    /// Evaluate and reduce the result to its truthiness.
    #[inline]
    pub fn matches(&self, ctx: &Context) -> Result<bool, ExprError> {
        self.evaluate(ctx).map(|value| truthy(&value))
    }
}

fn compile_all(items: &[Value]) -> Result<Vec<Expr>, ExprError> {
    items.iter().map(Expr::compile).collect()
}

fn compile_operator(op: &str, operand: &Value) -> Result<Expr, ExprError> {
    match op {
        "var" => match operand {
            Value::String(key) => Ok(Expr::Var(key.clone())),
            other => Err(invalid_operand("var", "a key string", other)),
        },
        "and" => Ok(Expr::And(compile_list("and", operand)?)),
        "or" => Ok(Expr::Or(compile_list("or", operand)?)),
        "not" => Ok(Expr::Not(Box::new(Expr::compile(operand)?))),
        "in" => compile_pair("in", operand).map(|(a, b)| Expr::In(a, b)),
        "eq" => compile_pair("eq", operand).map(|(a, b)| Expr::Eq(a, b)),
        "neq" => compile_pair("neq", operand).map(|(a, b)| Expr::Neq(a, b)),
        "gt" => compile_pair("gt", operand).map(|(a, b)| Expr::Gt(a, b)),
        "gte" => compile_pair("gte", operand).map(|(a, b)| Expr::Gte(a, b)),
        "lt" => compile_pair("lt", operand).map(|(a, b)| Expr::Lt(a, b)),
        "lte" => compile_pair("lte", operand).map(|(a, b)| Expr::Lte(a, b)),
        unknown => Err(ExprError::UnknownOperator(unknown.to_string())),
    }
}

fn compile_list(op: &'static str, operand: &Value) -> Result<Vec<Expr>, ExprError> {
    match operand {
        Value::Array(items) => compile_all(items),
        other => Err(invalid_operand(op, "a list of expressions", other)),
    }
}

fn compile_pair(op: &'static str, operand: &Value) -> Result<(Box<Expr>, Box<Expr>), ExprError> {
    match operand {
        Value::Array(items) if items.len() == 2 => Ok((
            Box::new(Expr::compile(&items[0])?),
            Box::new(Expr::compile(&items[1])?),
        )),
        other => Err(invalid_operand(op, "a list of exactly 2 expressions", other)),
    }
}

fn invalid_operand(op: &'static str, expected: &'static str, found: &Value) -> ExprError {
    let found = match found {
        Value::Array(items) => format!("a list of {} elements", items.len()),
        other => type_name(other).to_string(),
    };
    ExprError::InvalidOperand {
        op,
        expected,
        found,
    }
}

fn contains(haystack: &Value, needle: &Value) -> Result<bool, ExprError> {
    match (haystack, needle) {
        (Value::Null, _) => Ok(false),
        (Value::Array(items), needle) => Ok(items.iter().any(|item| loose_eq(item, needle))),
        (Value::String(text), Value::String(part)) => Ok(text.contains(part.as_str())),
        (Value::String(_), other) => Err(ExprError::Incomparable {
            op: "in",
            left: "string",
            right: type_name(other),
        }),
        (Value::Object(map), Value::String(key)) => Ok(map.contains_key(key)),
        (Value::Object(_), _) => Ok(false),
        (other, _) => Err(ExprError::NotAContainer(type_name(other))),
    }
}

fn ordered(
    op: &'static str,
    a: &Expr,
    b: &Expr,
    ctx: &Context,
    accept: impl Fn(Ordering) -> bool,
) -> Result<Value, ExprError> {
    let left = a.evaluate(ctx)?;
    let right = b.evaluate(ctx)?;

    match compare(&left, &right) {
        Some(ordering) => Ok(Value::Bool(accept(ordering))),
        None => Err(ExprError::Incomparable {
            op,
            left: type_name(&left),
            right: type_name(&right),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Context {
        Context::from([
            ("italian_birth_anchor".to_string(), json!(true)),
            ("pre1948_maternal_link".to_string(), json!(false)),
            ("lineage_length".to_string(), json!(3)),
            ("process_type".to_string(), json!("ADMIN")),
            ("country_of_filing".to_string(), json!(null)),
            ("parent_citizenship_status".to_string(), json!("INTACT")),
        ])
    }

    fn eval(raw: Value) -> Value {
        Expr::compile(&raw).unwrap().evaluate(&ctx()).unwrap()
    }

    #[test]
    fn test_literals_pass_through() {
        assert_eq!(eval(json!(42)), json!(42));
        assert_eq!(eval(json!("text")), json!("text"));
        assert_eq!(eval(json!(null)), json!(null));
        assert_eq!(eval(json!(false)), json!(false));
    }

    #[test]
    fn test_list_evaluated_element_wise() {
        assert_eq!(
            eval(json!([{"var": "lineage_length"}, "x", {"not": true}])),
            json!([3, "x", false])
        );
    }

    #[test]
    fn test_var_lookup() {
        assert_eq!(eval(json!({"var": "process_type"})), json!("ADMIN"));
        assert_eq!(eval(json!({"var": "missing_fact"})), json!(null));
    }

    #[test]
    fn test_boolean_operators() {
        assert_eq!(
            eval(json!({"and": [{"var": "italian_birth_anchor"}, {"var": "pre1948_maternal_link"}]})),
            json!(false)
        );
        assert_eq!(
            eval(json!({"or": [{"var": "italian_birth_anchor"}, {"var": "pre1948_maternal_link"}]})),
            json!(true)
        );
        assert_eq!(eval(json!({"and": []})), json!(true));
        assert_eq!(eval(json!({"or": []})), json!(false));
        assert_eq!(eval(json!({"not": {"var": "missing_fact"}})), json!(true));
    }

    #[test]
    fn test_not_of_list_negates_list_truthiness() {
        // A one-element list is a non-empty (truthy) value.
        assert_eq!(eval(json!({"not": [{"var": "pre1948_maternal_link"}]})), json!(false));
    }

    #[test]
    fn test_in_operator() {
        assert_eq!(eval(json!({"in": [["ADMIN", "COURT"], {"var": "process_type"}]})), json!(true));
        assert_eq!(eval(json!({"in": [["COURT"], {"var": "process_type"}]})), json!(false));
        assert_eq!(eval(json!({"in": [{"var": "country_of_filing"}, "Italy"]})), json!(false));
        assert_eq!(eval(json!({"in": ["ADMINISTRATIVE", {"var": "process_type"}]})), json!(true));
    }

    #[test]
    fn test_in_rejects_scalar_haystack() {
        let expr = Expr::compile(&json!({"in": [{"var": "lineage_length"}, 3]})).unwrap();
        assert_eq!(expr.evaluate(&ctx()), Err(ExprError::NotAContainer("number")));
    }

    #[test]
    fn test_equality() {
        assert_eq!(
            eval(json!({"eq": [{"var": "parent_citizenship_status"}, "INTACT"]})),
            json!(true)
        );
        assert_eq!(eval(json!({"neq": [{"var": "process_type"}, "COURT"]})), json!(true));
        assert_eq!(eval(json!({"eq": [{"var": "lineage_length"}, 3.0]})), json!(true));
        assert_eq!(eval(json!({"eq": [{"var": "missing_fact"}, null]})), json!(true));
        assert_eq!(eval(json!({"eq": [1, true]})), json!(true));
        assert_eq!(eval(json!({"in": [[true], 1]})), json!(true));
    }

    #[test]
    fn test_ordered_comparisons() {
        assert_eq!(eval(json!({"gt": [{"var": "lineage_length"}, 2]})), json!(true));
        assert_eq!(eval(json!({"gte": [{"var": "lineage_length"}, 3]})), json!(true));
        assert_eq!(eval(json!({"lt": [{"var": "lineage_length"}, 3]})), json!(false));
        assert_eq!(eval(json!({"lte": [{"var": "lineage_length"}, 3]})), json!(true));
        assert_eq!(eval(json!({"lt": ["ADMIN", "COURT"]})), json!(true));
    }

    #[test]
    fn test_ordered_comparison_of_null_fails() {
        let expr = Expr::compile(&json!({"gt": [{"var": "missing_fact"}, 1]})).unwrap();
        assert_eq!(
            expr.evaluate(&ctx()),
            Err(ExprError::Incomparable {
                op: "gt",
                left: "null",
                right: "number"
            })
        );
    }

    #[test]
    fn test_multi_key_mapping_rejected() {
        let err = Expr::compile(&json!({"var": "a", "not": true})).unwrap_err();
        assert_eq!(err, ExprError::OperatorCount(2));

        let err = Expr::compile(&json!({})).unwrap_err();
        assert_eq!(err, ExprError::OperatorCount(0));
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let err = Expr::compile(&json!({"xor": [true, false]})).unwrap_err();
        assert_eq!(err, ExprError::UnknownOperator("xor".to_string()));
    }

    #[test]
    fn test_nested_errors_surface_at_compile_time() {
        let err = Expr::compile(&json!({"and": [true, {"eq": [1, 2, 3]}]})).unwrap_err();
        assert!(matches!(err, ExprError::InvalidOperand { op: "eq", .. }));
        assert!(err.to_string().contains("a list of 3 elements"));
    }

    #[test]
    fn test_operand_shapes() {
        assert!(matches!(
            Expr::compile(&json!({"var": ["a"]})),
            Err(ExprError::InvalidOperand { op: "var", .. })
        ));
        assert!(matches!(
            Expr::compile(&json!({"and": {"var": "a"}})),
            Err(ExprError::InvalidOperand { op: "and", .. })
        ));
        assert!(matches!(
            Expr::compile(&json!({"gt": 3})),
            Err(ExprError::InvalidOperand { op: "gt", .. })
        ));
    }

    #[test]
    fn test_compiled_tree_shape() {
        let expr = Expr::compile(&json!({"not": {"var": "italian_birth_anchor"}})).unwrap();
        assert_eq!(
            expr,
            Expr::Not(Box::new(Expr::Var("italian_birth_anchor".to_string())))
        );
        assert!(!expr.matches(&ctx()).unwrap());
    }
}
