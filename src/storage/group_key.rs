//! Dimensional grouping of measurements.
//!
//! Evaluates a profile definition's group-by expressions against one
//! measurement, producing the ordered dimension values that follow the
//! time window inside the row key.

use crate::core::{Measurement, ProfileDefinition, Result};
use crate::expression::{EvalContext, ExprValue, ExpressionEvaluator};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;

/// Ordered dimension values for one measurement. Most profiles group by
/// zero or a handful of dimensions, so values stay on the stack.
pub type ResolvedKey = SmallVec<[ExprValue; 4]>;

/// Resolves a measurement's group dimension values.
///
/// The evaluator is shared across records; each call builds a fresh
/// evaluation context so expressions that bind intermediate variables
/// cannot leak state between records.
pub struct GroupKeyResolver {
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl GroupKeyResolver {
    /// Creates a resolver backed by the given evaluator
    pub fn new(evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        GroupKeyResolver { evaluator }
    }

    /// Evaluates `definition.group_by` in declared order.
    ///
    /// Order is significant: it defines left-to-right dimension
    /// significance inside the final key, so expressions are never
    /// reordered or deduplicated. An empty list yields an empty result.
    pub fn resolve(
        &self,
        definition: &ProfileDefinition,
        measurement: &Measurement,
    ) -> Result<ResolvedKey> {
        if definition.group_by.is_empty() {
            return Ok(ResolvedKey::new());
        }

        let mut context = EvalContext::new();
        Self::bind_measurement(&mut context, measurement);

        let mut values = ResolvedKey::with_capacity(definition.group_by.len());
        for expression in &definition.group_by {
            let value = self.evaluator.evaluate(expression, &context)?;
            trace!(
                profile = %measurement.profile_name,
                expression = %expression,
                value_type = value.type_name(),
                "resolved group dimension"
            );
            values.push(value);
        }

        Ok(values)
    }

    /// Exposes the measurement's fields as bound variables. Expressions
    /// most commonly reference `end`, the window's closing timestamp.
    fn bind_measurement(context: &mut EvalContext, measurement: &Measurement) {
        context.bind("profile", ExprValue::Str(measurement.profile_name.as_str().to_string()));
        context.bind("entity", ExprValue::Str(measurement.entity.as_str().to_string()));
        context.bind("start", ExprValue::Int(measurement.period_start as i64));
        context.bind("end", ExprValue::Int(measurement.period_end() as i64));
        context.bind("duration", ExprValue::Int(measurement.period.as_millis() as i64));
        context.bind("value", measurement.value.clone());
    }
}
