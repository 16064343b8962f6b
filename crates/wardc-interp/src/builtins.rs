//! The minimal built-in surface (SPEC_FULL.md §3): integer and float
//! arithmetic and comparison, string concatenation, boolean negation, and
//! printing. Dispatched by name prefix (`__builtin_*`) from
//! [`crate::interp::Interpreter::eval_apply`] without ever pushing a
//! frame — these are primitive operations, not Ward-level functions, the
//! same distinction `examples/H1ghBre4k3r-y-lang/src/interpreter/mod.rs`
//! draws between `run_intrinsic` and a real call.

use crate::error::InterpError;
use crate::value::Value;

pub fn is_builtin(name: &str) -> bool {
    name.starts_with("__builtin_")
}

pub fn call(name: &str, args: &[Value]) -> Result<Value, InterpError> {
    match name {
        "__builtin_add" => arith(name, args, |a, b| a + b, |a, b| a + b, Some(concat)),
        "__builtin_sub" => arith(name, args, |a, b| a - b, |a, b| a - b, None),
        "__builtin_mul" => arith(name, args, |a, b| a * b, |a, b| a * b, None),
        "__builtin_div" => arith(name, args, |a, b| a / b, |a, b| a / b, None),
        "__builtin_eq" => {
            let (a, b) = binary(name, args)?;
            Ok(Value::Bool(a == b))
        }
        "__builtin_ne" => compare(name, args, |o| o != std::cmp::Ordering::Equal),
        "__builtin_lt" => compare(name, args, |o| o == std::cmp::Ordering::Less),
        "__builtin_le" => compare(name, args, |o| o != std::cmp::Ordering::Greater),
        "__builtin_gt" => compare(name, args, |o| o == std::cmp::Ordering::Greater),
        "__builtin_ge" => compare(name, args, |o| o != std::cmp::Ordering::Less),
        "__builtin_not" => {
            let [Value::Bool(b)] = args else { return Err(InterpError::BuiltinTypeMismatch(name.to_string())) };
            Ok(Value::Bool(!b))
        }
        "__builtin_print" => {
            let [v] = args else { return Err(InterpError::BuiltinArity(name.to_string(), 1, args.len())) };
            println!("{v}");
            Ok(Value::Null)
        }
        other => Err(InterpError::UnknownBuiltin(other.to_string())),
    }
}

fn concat(args: &[Value]) -> Option<Value> {
    let [Value::Str(a), Value::Str(b)] = args else { return None };
    Some(Value::Str(format!("{a}{b}").into()))
}

fn arith(
    name: &str,
    args: &[Value],
    on_int: impl Fn(i64, i64) -> i64,
    on_float: impl Fn(f64, f64) -> f64,
    string_case: Option<fn(&[Value]) -> Option<Value>>,
) -> Result<Value, InterpError> {
    if args.len() != 2 {
        return Err(InterpError::BuiltinArity(name.to_string(), 2, args.len()));
    }
    match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(on_int(*a, *b))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(on_float(*a, *b))),
        _ => {
            if let Some(f) = string_case {
                if let Some(v) = f(args) {
                    return Ok(v);
                }
            }
            Err(InterpError::BuiltinTypeMismatch(name.to_string()))
        }
    }
}

fn binary(name: &str, args: &[Value]) -> Result<(Value, Value), InterpError> {
    if args.len() != 2 {
        return Err(InterpError::BuiltinArity(name.to_string(), 2, args.len()));
    }
    Ok((args[0].clone(), args[1].clone()))
}

fn compare(name: &str, args: &[Value], accept: impl Fn(std::cmp::Ordering) -> bool) -> Result<Value, InterpError> {
    if args.len() != 2 {
        return Err(InterpError::BuiltinArity(name.to_string(), 2, args.len()));
    }
    let ordering = match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => {
            a.partial_cmp(b).ok_or_else(|| InterpError::BuiltinTypeMismatch(name.to_string()))?
        }
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        _ => return Err(InterpError::BuiltinTypeMismatch(name.to_string())),
    };
    Ok(Value::Bool(accept(ordering)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_ints() {
        assert_eq!(call("__builtin_add", &[Value::Int(1), Value::Int(2)]).unwrap(), Value::Int(3));
    }

    #[test]
    fn add_concatenates_strings() {
        let result = call("__builtin_add", &[Value::Str("foo".into()), Value::Str("bar".into())]).unwrap();
        assert_eq!(result, Value::Str("foobar".into()));
    }

    #[test]
    fn lt_orders_ints() {
        assert_eq!(call("__builtin_lt", &[Value::Int(1), Value::Int(2)]).unwrap(), Value::Bool(true));
        assert_eq!(call("__builtin_lt", &[Value::Int(2), Value::Int(1)]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn mismatched_types_error() {
        assert!(call("__builtin_add", &[Value::Int(1), Value::Bool(true)]).is_err());
    }
}
