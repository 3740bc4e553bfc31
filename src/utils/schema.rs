//! JSON Schema validation for structured-output responses, grounded on the
//! teacher's `schema::validate_json` helper. Used wherever a provider call
//! binds `OutputBinding::JsonSchema` — the core compiles the same schema it
//! sent the provider and checks the provider's answer against it before
//! deserializing, since a provider's "strict" schema adherence is a
//! best-effort contract, not a guarantee.

use serde_json::Value;

use crate::error::CoreError;

/// Validate `instance` against `schema`, collecting up to 3 error messages.
pub fn validate_json(schema: &Value, instance: &Value, agent: &str) -> Result<(), CoreError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| CoreError::Internal(format!(
        "schema compile failed: {e}"
    )))?;

    if validator.is_valid(instance) {
        return Ok(());
    }

    let mut messages = Vec::new();
    for err in validator.iter_errors(instance) {
        messages.push(format!("{err} at {}", err.instance_path));
        if messages.len() >= 3 {
            break;
        }
    }

    Err(CoreError::AgentParseError {
        agent: agent.to_string(),
        reason: messages.join("; "),
    })
}
