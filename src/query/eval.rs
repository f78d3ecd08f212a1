//! Expression evaluation against a dataset.
//!
//! Evaluation is a pure function of the expression and the dataset; the
//! dataset is never mutated. Null cells compare as false under every
//! comparison operator and propagate through arithmetic.

use super::QueryResult;
use super::parser::{BinOp, Expr, Func, UnaryOp};
use crate::dataset::{ColumnType, Dataset};
use crate::error::{EdaError, Result};
use crate::stats;
use polars::prelude::*;

/// Intermediate value of a sub-expression. Column variants are row-aligned
/// with the dataset; a named column came straight from the frame, an unnamed
/// one was computed.
#[derive(Debug, Clone)]
enum Value {
    Num(f64),
    Str(String),
    Bool(bool),
    NumCol(Option<String>, Vec<Option<f64>>),
    StrCol(Option<String>, Vec<Option<String>>),
    /// Row mask. Null boolean cells enter as false, and comparisons never
    /// produce nulls, so no Option here.
    BoolCol(Vec<bool>),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Self::Num(_) | Self::NumCol(_, _) => "numeric",
            Self::Str(_) | Self::StrCol(_, _) => "string",
            Self::Bool(_) | Self::BoolCol(_) => "boolean",
        }
    }
}

pub(super) fn evaluate(expr: &Expr, dataset: &Dataset) -> Result<QueryResult> {
    match eval(expr, dataset)? {
        Value::Num(n) => Ok(QueryResult::Scalar(n)),
        Value::Bool(b) => Ok(QueryResult::Bool(b)),
        Value::Str(s) => Ok(QueryResult::Text(s)),
        Value::BoolCol(mask) => Ok(QueryResult::Table(dataset.filter_rows(&mask)?)),
        Value::NumCol(Some(name), _) => Ok(QueryResult::Table(dataset.select(&[name.as_str()])?)),
        Value::StrCol(Some(name), _) => Ok(QueryResult::Table(dataset.select(&[name.as_str()])?)),
        Value::NumCol(None, values) => {
            let frame = DataFrame::new(vec![Series::new("result".into(), values).into()])?;
            Ok(QueryResult::Table(Dataset::from_frame(frame)?))
        }
        Value::StrCol(None, values) => {
            let frame = DataFrame::new(vec![Series::new("result".into(), values).into()])?;
            Ok(QueryResult::Table(Dataset::from_frame(frame)?))
        }
    }
}

fn eval(expr: &Expr, dataset: &Dataset) -> Result<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::Num(*n)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Column(name) => column_value(name, dataset),
        Expr::Unary(op, inner) => {
            let value = eval(inner, dataset)?;
            apply_unary(*op, value)
        }
        Expr::Binary(op, lhs, rhs) => {
            let left = eval(lhs, dataset)?;
            let right = eval(rhs, dataset)?;
            apply_binary(*op, left, right)
        }
        Expr::Call(func, arg) => {
            let value = eval(arg, dataset)?;
            apply_call(*func, value)
        }
    }
}

/// Materialize a column reference by its type tag.
fn column_value(name: &str, dataset: &Dataset) -> Result<Value> {
    let Some(column_type) = dataset.column_type(name) else {
        return Err(EdaError::ColumnNotFound(name.to_string()));
    };
    let series = dataset.series(name)?;

    match column_type {
        ColumnType::Numeric => Ok(Value::NumCol(
            Some(name.to_string()),
            stats::numeric_values(series)?,
        )),
        ColumnType::Temporal => {
            // Compared on the underlying epoch representation.
            let cast = series.cast(&DataType::Int64)?.cast(&DataType::Float64)?;
            Ok(Value::NumCol(
                Some(name.to_string()),
                cast.f64()?.into_iter().collect(),
            ))
        }
        ColumnType::Boolean => {
            let chunked = series
                .bool()
                .map_err(|_| EdaError::Query(format!("column '{}' is not boolean", name)))?;
            Ok(Value::BoolCol(
                chunked.into_iter().map(|v| v.unwrap_or(false)).collect(),
            ))
        }
        ColumnType::Categorical => {
            let cast = series.cast(&DataType::String)?;
            let values = cast
                .str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect();
            Ok(Value::StrCol(Some(name.to_string()), values))
        }
    }
}

fn apply_unary(op: UnaryOp, value: Value) -> Result<Value> {
    match (op, value) {
        (UnaryOp::Neg, Value::Num(n)) => Ok(Value::Num(-n)),
        (UnaryOp::Neg, Value::NumCol(_, values)) => Ok(Value::NumCol(
            None,
            values.into_iter().map(|v| v.map(|n| -n)).collect(),
        )),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Not, Value::BoolCol(values)) => {
            Ok(Value::BoolCol(values.into_iter().map(|v| !v).collect()))
        }
        (op, value) => Err(EdaError::Query(format!(
            "operator {:?} does not apply to a {} value",
            op,
            value.kind()
        ))),
    }
}

fn apply_binary(op: BinOp, left: Value, right: Value) -> Result<Value> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => arithmetic(op, left, right),
        BinOp::And | BinOp::Or => logical(op, left, right),
        _ => comparison(op, left, right),
    }
}

fn arith_apply(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        _ => unreachable!("not an arithmetic operator"),
    }
}

fn arithmetic(op: BinOp, left: Value, right: Value) -> Result<Value> {
    match (left, right) {
        (Value::Num(a), Value::Num(b)) => Ok(Value::Num(arith_apply(op, a, b))),
        (Value::NumCol(_, xs), Value::Num(b)) => Ok(Value::NumCol(
            None,
            xs.into_iter()
                .map(|x| x.map(|a| arith_apply(op, a, b)))
                .collect(),
        )),
        (Value::Num(a), Value::NumCol(_, ys)) => Ok(Value::NumCol(
            None,
            ys.into_iter()
                .map(|y| y.map(|b| arith_apply(op, a, b)))
                .collect(),
        )),
        (Value::NumCol(_, xs), Value::NumCol(_, ys)) => Ok(Value::NumCol(
            None,
            xs.into_iter()
                .zip(ys)
                .map(|(x, y)| match (x, y) {
                    (Some(a), Some(b)) => Some(arith_apply(op, a, b)),
                    _ => None,
                })
                .collect(),
        )),
        (left, right) => Err(EdaError::Query(format!(
            "operator {:?} needs numeric operands, found {} and {}",
            op,
            left.kind(),
            right.kind()
        ))),
    }
}

fn cmp_num(op: BinOp, a: f64, b: f64) -> bool {
    match op {
        BinOp::Eq => a == b,
        BinOp::Ne => a != b,
        BinOp::Lt => a < b,
        BinOp::Le => a <= b,
        BinOp::Gt => a > b,
        BinOp::Ge => a >= b,
        _ => unreachable!("not a comparison operator"),
    }
}

fn cmp_str(op: BinOp, a: &str, b: &str) -> bool {
    match op {
        BinOp::Eq => a == b,
        BinOp::Ne => a != b,
        BinOp::Lt => a < b,
        BinOp::Le => a <= b,
        BinOp::Gt => a > b,
        BinOp::Ge => a >= b,
        _ => unreachable!("not a comparison operator"),
    }
}

fn comparison(op: BinOp, left: Value, right: Value) -> Result<Value> {
    match (left, right) {
        (Value::Num(a), Value::Num(b)) => Ok(Value::Bool(cmp_num(op, a, b))),
        (Value::Str(a), Value::Str(b)) => Ok(Value::Bool(cmp_str(op, &a, &b))),
        // Null cells compare as false.
        (Value::NumCol(_, xs), Value::Num(b)) => Ok(Value::BoolCol(
            xs.into_iter()
                .map(|x| x.map(|a| cmp_num(op, a, b)).unwrap_or(false))
                .collect(),
        )),
        (Value::Num(a), Value::NumCol(_, ys)) => Ok(Value::BoolCol(
            ys.into_iter()
                .map(|y| y.map(|b| cmp_num(op, a, b)).unwrap_or(false))
                .collect(),
        )),
        (Value::NumCol(_, xs), Value::NumCol(_, ys)) => Ok(Value::BoolCol(
            xs.into_iter()
                .zip(ys)
                .map(|(x, y)| match (x, y) {
                    (Some(a), Some(b)) => cmp_num(op, a, b),
                    _ => false,
                })
                .collect(),
        )),
        (Value::StrCol(_, xs), Value::Str(b)) => Ok(Value::BoolCol(
            xs.into_iter()
                .map(|x| x.map(|a| cmp_str(op, &a, &b)).unwrap_or(false))
                .collect(),
        )),
        (Value::Str(a), Value::StrCol(_, ys)) => Ok(Value::BoolCol(
            ys.into_iter()
                .map(|y| y.map(|b| cmp_str(op, &a, &b)).unwrap_or(false))
                .collect(),
        )),
        (Value::StrCol(_, xs), Value::StrCol(_, ys)) => Ok(Value::BoolCol(
            xs.into_iter()
                .zip(ys)
                .map(|(x, y)| match (x, y) {
                    (Some(a), Some(b)) => cmp_str(op, &a, &b),
                    _ => false,
                })
                .collect(),
        )),
        (Value::Bool(a), Value::Bool(b)) if matches!(op, BinOp::Eq | BinOp::Ne) => {
            Ok(Value::Bool(if op == BinOp::Eq { a == b } else { a != b }))
        }
        (Value::BoolCol(xs), Value::Bool(b)) if matches!(op, BinOp::Eq | BinOp::Ne) => {
            Ok(Value::BoolCol(
                xs.into_iter()
                    .map(|a| if op == BinOp::Eq { a == b } else { a != b })
                    .collect(),
            ))
        }
        (Value::Bool(a), Value::BoolCol(ys)) if matches!(op, BinOp::Eq | BinOp::Ne) => {
            Ok(Value::BoolCol(
                ys.into_iter()
                    .map(|b| if op == BinOp::Eq { a == b } else { a != b })
                    .collect(),
            ))
        }
        (left, right) => Err(EdaError::Query(format!(
            "cannot compare {} with {} using {:?}",
            left.kind(),
            right.kind(),
            op
        ))),
    }
}

fn logical(op: BinOp, left: Value, right: Value) -> Result<Value> {
    let apply = |a: bool, b: bool| match op {
        BinOp::And => a && b,
        BinOp::Or => a || b,
        _ => unreachable!("not a logical operator"),
    };
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(apply(a, b))),
        (Value::BoolCol(xs), Value::Bool(b)) => {
            Ok(Value::BoolCol(xs.into_iter().map(|a| apply(a, b)).collect()))
        }
        (Value::Bool(a), Value::BoolCol(ys)) => {
            Ok(Value::BoolCol(ys.into_iter().map(|b| apply(a, b)).collect()))
        }
        (Value::BoolCol(xs), Value::BoolCol(ys)) => Ok(Value::BoolCol(
            xs.into_iter().zip(ys).map(|(a, b)| apply(a, b)).collect(),
        )),
        (left, right) => Err(EdaError::Query(format!(
            "operator {:?} needs boolean operands, found {} and {}",
            op,
            left.kind(),
            right.kind()
        ))),
    }
}

fn apply_call(func: Func, value: Value) -> Result<Value> {
    match func {
        Func::Filter => match value {
            Value::BoolCol(mask) => Ok(Value::BoolCol(mask)),
            other => Err(EdaError::Query(format!(
                "filter() needs a row-wise condition, found a {} value",
                other.kind()
            ))),
        },
        Func::Count => match value {
            Value::NumCol(_, values) => {
                Ok(Value::Num(values.iter().flatten().count() as f64))
            }
            Value::StrCol(_, values) => {
                Ok(Value::Num(values.iter().flatten().count() as f64))
            }
            // Counting a condition counts the matching rows.
            Value::BoolCol(mask) => Ok(Value::Num(mask.iter().filter(|&&b| b).count() as f64)),
            other => Err(EdaError::Query(format!(
                "count() does not apply to a scalar {} value",
                other.kind()
            ))),
        },
        Func::Mean | Func::Median | Func::Min | Func::Max | Func::Sum => {
            let values: Vec<f64> = match value {
                Value::Num(n) => vec![n],
                Value::NumCol(_, values) => values.into_iter().flatten().collect(),
                other => {
                    return Err(EdaError::Query(format!(
                        "{:?} needs a numeric argument, found a {} value",
                        func,
                        other.kind()
                    )));
                }
            };
            if values.is_empty() {
                return Err(EdaError::Query(format!(
                    "{:?} over a column with no non-null values",
                    func
                )));
            }
            Ok(Value::Num(aggregate(func, values)))
        }
    }
}

fn aggregate(func: Func, mut values: Vec<f64>) -> f64 {
    match func {
        Func::Sum => values.iter().sum(),
        Func::Mean => values.iter().sum::<f64>() / values.len() as f64,
        Func::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
        Func::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        Func::Median => {
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let n = values.len();
            if n % 2 == 0 {
                (values[n / 2 - 1] + values[n / 2]) / 2.0
            } else {
                values[n / 2]
            }
        }
        _ => unreachable!("not an aggregate"),
    }
}
