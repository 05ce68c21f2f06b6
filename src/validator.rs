//! Structural validation of condition documents before they reach the SDK.

use crate::condition::{
    ConditionDocument, ConditionType, Operator, RpcCondition, StandardContractType,
    TimeCondition, is_supported_chain,
};
use crate::error::ValidationError;
use serde_json::{Map, Value};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Checks a typed document, recursing into compound operands.
    pub fn validate(&self, document: &ConditionDocument) -> Result<(), ValidationError> {
        match document {
            ConditionDocument::Compound(c) => {
                if c.operands.is_empty() {
                    return Err(ValidationError::EmptyOperands);
                }
                if c.operator == Operator::Not && c.operands.len() != 1 {
                    return Err(ValidationError::NotArity(c.operands.len()));
                }
                c.operands.iter().try_for_each(|o| self.validate(o))
            }
            ConditionDocument::Time(c) => {
                check_chain(c.chain)?;
                if c.method != TimeCondition::METHOD {
                    return Err(ValidationError::InvalidTimeMethod(c.method.clone()));
                }
                Ok(())
            }
            ConditionDocument::Contract(c) => {
                check_chain(c.chain)?;
                if c.contract_address.trim().is_empty() {
                    return Err(missing("contract", "contractAddress"));
                }
                if c.method.trim().is_empty() {
                    return Err(missing("contract", "method"));
                }
                Ok(())
            }
            ConditionDocument::Rpc(c) => {
                check_chain(c.chain)?;
                if c.method != RpcCondition::METHOD {
                    return Err(ValidationError::InvalidRpcMethod(c.method.clone()));
                }
                if c.parameters != RpcCondition::default_parameters() {
                    return Err(ValidationError::InvalidRpcParameters);
                }
                Ok(())
            }
            ConditionDocument::JsonRpc(c) => {
                if c.endpoint.trim().is_empty() {
                    return Err(missing("json-rpc", "endpoint"));
                }
                if c.method.trim().is_empty() {
                    return Err(missing("json-rpc", "method"));
                }
                Ok(())
            }
        }
    }

    /// Logs and swallows the reason; for gating UI actions.
    pub fn is_valid(&self, document: &ConditionDocument) -> bool {
        match self.validate(document) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "condition failed validation");
                false
            }
        }
    }

    /// Validates untyped JSON and returns the normalized typed document.
    ///
    /// An unrecognised `standardContractType` is dropped rather than rejected.
    pub fn validate_json(&self, value: &Value) -> Result<ConditionDocument, ValidationError> {
        let normalized = normalize(value)?;
        let document: ConditionDocument = serde_json::from_value(normalized)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        self.validate(&document)?;
        Ok(document)
    }

    pub fn validate_str(&self, json: &str) -> Result<ConditionDocument, ValidationError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        self.validate_json(&value)
    }
}

fn missing(condition: &'static str, field: &'static str) -> ValidationError {
    ValidationError::MissingField { condition, field }
}

fn check_chain(chain: u64) -> Result<(), ValidationError> {
    if is_supported_chain(chain) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedChain(chain))
    }
}

/// Required top-level keys per condition type, checked before typed decoding.
fn required_fields(condition_type: ConditionType) -> (&'static str, &'static [&'static str]) {
    match condition_type {
        ConditionType::Time => ("time", &["chain", "returnValueTest"]),
        ConditionType::Contract => (
            "contract",
            &["chain", "contractAddress", "method", "returnValueTest"],
        ),
        ConditionType::Rpc => ("rpc", &["chain", "method", "parameters", "returnValueTest"]),
        ConditionType::JsonRpc => ("json-rpc", &["endpoint", "method", "returnValueTest"]),
        ConditionType::Compound => ("compound", &["operator", "operands"]),
    }
}

fn normalize(value: &Value) -> Result<Value, ValidationError> {
    let object = value.as_object().ok_or(ValidationError::NotAnObject)?;
    let tag = object
        .get("conditionType")
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingField {
            condition: "condition",
            field: "conditionType",
        })?;
    let condition_type = ConditionType::from_name(tag)
        .ok_or_else(|| ValidationError::UnknownConditionType(tag.to_string()))?;

    let (name, fields) = required_fields(condition_type);
    if let Some(field) = fields
        .iter()
        .find(|f| object.get(**f).is_none_or(Value::is_null))
    {
        return Err(missing(name, *field));
    }

    // json-rpc has no typed `chain`, so the raw key is checked here.
    if condition_type != ConditionType::Compound {
        if let Some(chain) = object.get("chain") {
            let chain = chain.as_u64().ok_or_else(|| {
                ValidationError::Malformed(format!("chain must be an unsigned integer, got {}", chain))
            })?;
            check_chain(chain)?;
        }
    }

    let mut out: Map<String, Value> = object.clone();
    match condition_type {
        ConditionType::Contract => {
            let unknown = out
                .get("standardContractType")
                .is_some_and(|t| t.as_str().and_then(StandardContractType::from_name).is_none());
            if unknown {
                debug!(value = ?out.get("standardContractType"), "dropping unknown standardContractType");
                out.remove("standardContractType");
            }
        }
        ConditionType::Compound => {
            let operands = out
                .get("operands")
                .and_then(Value::as_array)
                .ok_or_else(|| ValidationError::Malformed("operands must be an array".into()))?
                .iter()
                .map(normalize)
                .collect::<Result<Vec<_>, _>>()?;
            if operands.is_empty() {
                return Err(ValidationError::EmptyOperands);
            }
            out.insert("operands".to_string(), Value::Array(operands));
        }
        _ => {}
    }
    Ok(Value::Object(out))
}
