//! Shared test fixtures: a minimal arithmetic evaluator standing in for
//! the real expression-language interpreter, plus measurement helpers.

use prowl::core::{Entity, Measurement, ProfileName, Result, WindowDuration, WindowUnit};
use prowl::expression::{EvalContext, ExprValue, ExpressionEvaluator};
use prowl::ProwlError;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Installs a fmt subscriber once per test binary so mapper events show
/// up in failing test output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt().with_test_writer().try_init().ok();
    });
}

/// Evaluates `a + b` over numeric literals, bare literals, and bound
/// variables. Arithmetic results are doubles, matching the contract of
/// the production interpreter.
pub struct ArithmeticStubEvaluator;

impl ExpressionEvaluator for ArithmeticStubEvaluator {
    fn evaluate(&self, expression: &str, context: &EvalContext) -> Result<ExprValue> {
        let expr = expression.trim();

        if let Some(value) = context.get(expr) {
            return Ok(value.clone());
        }

        if let Some((lhs, rhs)) = expr.split_once('+') {
            let lhs = operand(lhs.trim(), context)?;
            let rhs = operand(rhs.trim(), context)?;
            return Ok(ExprValue::Float(lhs + rhs));
        }

        if let Ok(n) = expr.parse::<f64>() {
            return Ok(ExprValue::Float(n));
        }

        Err(ProwlError::expression(format!("cannot evaluate '{}'", expression)))
    }
}

fn operand(text: &str, context: &EvalContext) -> Result<f64> {
    if let Ok(n) = text.parse::<f64>() {
        return Ok(n);
    }
    match context.get(text) {
        Some(ExprValue::Float(f)) => Ok(*f),
        Some(ExprValue::Int(i)) => Ok(*i as f64),
        Some(other) => Err(ProwlError::expression(format!(
            "operand '{}' is not numeric: {}",
            text,
            other.type_name()
        ))),
        None => Err(ProwlError::expression(format!("unbound variable '{}'", text))),
    }
}

/// A 15-minute measurement in the shape the upstream aggregator emits
pub fn sample_measurement(period_start: u64) -> Measurement {
    Measurement::builder()
        .profile_name(ProfileName::new("profile".to_string()).unwrap())
        .entity(Entity::new("entity".to_string()).unwrap())
        .period_start(period_start)
        .period(WindowDuration::new(15, WindowUnit::Minutes).unwrap())
        .value(ExprValue::Int(22))
        .build()
        .unwrap()
}
