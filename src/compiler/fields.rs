//! Slot overlay: turns a condition block's slots into a `ConditionDraft`.

use super::parsing::ConditionDraft;
use crate::block::{Block, ConditionProperties, Slot};
use crate::condition::{
    Comparator, ConditionType, FunctionAbi, ReturnValueTest, TOKEN_ID, checksum_parameter,
    parse_chain, to_checksum_address,
};
use crate::error::CompileError;
use crate::graph::BlockGraph;
use serde_json::{Number, Value};
use tracing::{debug, warn};

/// Which document field a slot feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotField {
    Chain,
    ContractAddress,
    Threshold,
    TokenId,
    Method,
    Parameters,
    FunctionAbi,
    Endpoint,
    Query,
    AuthorizationToken,
    ExpectedValue,
    Param(usize),
    Unknown,
}

impl SlotField {
    fn from_slot_id(id: &str) -> Self {
        match id {
            "chain" => SlotField::Chain,
            "contractAddress" => SlotField::ContractAddress,
            "minBalance" | "tokenAmount" | "minTimestamp" => SlotField::Threshold,
            "tokenId" => SlotField::TokenId,
            "method" => SlotField::Method,
            "parameters" => SlotField::Parameters,
            "abi" | "functionAbi" => SlotField::FunctionAbi,
            "endpoint" => SlotField::Endpoint,
            "query" => SlotField::Query,
            "authorizationToken" => SlotField::AuthorizationToken,
            "expectedValue" => SlotField::ExpectedValue,
            other => other
                .strip_prefix("param_")
                .and_then(|n| n.parse().ok())
                .map_or(SlotField::Unknown, SlotField::Param),
        }
    }
}

/// Comparator used when neither the slot nor the block's defaults name one.
pub(crate) fn default_comparator(condition_type: ConditionType) -> Comparator {
    match condition_type {
        ConditionType::Contract => Comparator::GreaterThan,
        _ => Comparator::GreaterThanOrEqual,
    }
}

/// The effective input of a slot: its inline literal, else the raw value
/// of the attached value block. Blank text counts as absent.
pub(crate) fn slot_input<'g>(graph: &'g BlockGraph, slot: &'g Slot) -> Option<&'g str> {
    let literal = slot.literal.as_deref().filter(|s| !s.trim().is_empty());
    literal.or_else(|| {
        slot.attached()
            .and_then(|id| graph.get(id))
            .and_then(Block::raw_value)
            .filter(|s| !s.trim().is_empty())
    })
}

/// Parses numeric text: integers stay integers, digit strings too large for
/// `u64` stay exact as strings, anything else must be a finite float.
pub fn parse_number(raw: &str) -> Option<Value> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(n) = text.parse::<u64>() {
        return Some(Value::from(n));
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::from(n));
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return Some(Value::String(text.to_string()));
    }
    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Parses text as JSON when possible, otherwise keeps it as a string.
pub fn parse_loose(raw: &str) -> Value {
    let text = raw.trim();
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn parse_token_id(raw: &str) -> Option<Value> {
    let text = raw.trim();
    match text.parse::<u64>() {
        Ok(n) => Some(Value::from(n)),
        Err(_) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
            Some(Value::String(text.to_string()))
        }
        Err(_) => None,
    }
}

fn parse_parameters(block: &Block, slot: &Slot, raw: &str) -> Result<Vec<Value>, CompileError> {
    let error = |message: String| CompileError::ParameterParse {
        block_id: block.id.clone(),
        slot_id: slot.id.clone(),
        message,
    };
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(other) => Err(error(format!("expected a JSON array, found {}", other))),
        Err(e) => Err(error(e.to_string())),
    }
}

/// Builds the draft for one condition block from its properties and slots.
pub(crate) fn overlay(
    graph: &BlockGraph,
    block: &Block,
    properties: &ConditionProperties,
) -> ConditionDraft {
    let mut draft = ConditionDraft::from_properties(&block.id, properties);
    let mut token_id = None;
    let mut params = Vec::new();

    for slot in &block.slots {
        let Some(raw) = slot_input(graph, slot) else {
            continue;
        };
        let comparator = || {
            slot.comparator
                .or_else(|| properties.return_value_test.as_ref().map(|t| t.comparator))
                .unwrap_or_else(|| default_comparator(properties.condition_type))
        };

        match SlotField::from_slot_id(&slot.id) {
            SlotField::Chain => {
                draft.chain = parse_chain(raw);
                if draft.chain.is_none() {
                    debug!(block = %block.id, raw, "chain is not a supported id");
                }
            }
            SlotField::ContractAddress => match to_checksum_address(raw) {
                Ok(address) => draft.contract_address = Some(address),
                Err(e) => debug!(block = %block.id, error = %e, "ignoring contract address"),
            },
            SlotField::Threshold => match parse_number(raw) {
                Some(value) => {
                    draft.return_value_test = Some(ReturnValueTest::new(comparator(), value));
                }
                None => debug!(block = %block.id, slot = %slot.id, raw, "not a number"),
            },
            SlotField::TokenId => token_id = parse_token_id(raw),
            SlotField::Method => draft.method = Some(raw.trim().to_string()),
            SlotField::Parameters => match parse_parameters(block, slot, raw) {
                Ok(values) => draft.parameters = Some(values),
                Err(e) => warn!(error = %e, "ignoring parameters"),
            },
            SlotField::FunctionAbi => match serde_json::from_str::<FunctionAbi>(raw.trim()) {
                Ok(abi) => draft.function_abi = Some(abi),
                Err(e) => warn!(block = %block.id, error = %e, "ignoring function ABI"),
            },
            SlotField::Endpoint => draft.endpoint = Some(raw.trim().to_string()),
            SlotField::Query => draft.query = Some(raw.trim().to_string()),
            SlotField::AuthorizationToken => {
                draft.authorization_token = Some(raw.trim().to_string())
            }
            SlotField::ExpectedValue => {
                draft.return_value_test = Some(ReturnValueTest::new(comparator(), parse_loose(raw)));
            }
            SlotField::Param(n) => params.push((n, Value::String(raw.to_string()))),
            SlotField::Unknown => debug!(block = %block.id, slot = %slot.id, "unmapped slot"),
        }
    }

    params.sort_by_key(|(n, _)| *n);
    draft.params = params.into_iter().map(|(_, v)| v).collect();

    match draft.parameters.as_mut() {
        Some(parameters) => {
            for parameter in parameters.iter_mut() {
                if parameter.as_str() == Some(TOKEN_ID) {
                    if let Some(id) = &token_id {
                        *parameter = id.clone();
                    }
                } else {
                    checksum_parameter(parameter);
                }
            }
        }
        None => draft.parameters = token_id.map(|id| vec![id]),
    }

    draft
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("5"), Some(Value::from(5u64)));
        assert_eq!(parse_number(" 0 "), Some(Value::from(0u64)));
        assert_eq!(parse_number("-3"), Some(Value::from(-3i64)));
        assert_eq!(parse_number("1.5"), Some(Value::from(1.5)));
        assert_eq!(
            parse_number("1000000000000000000000"),
            Some(Value::String("1000000000000000000000".into()))
        );
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("   "), None);
    }

    #[test]
    fn test_parse_loose() {
        assert_eq!(parse_loose("42"), Value::from(42));
        assert_eq!(parse_loose("true"), Value::Bool(true));
        assert_eq!(parse_loose("ok"), Value::String("ok".into()));
    }

    #[test]
    fn test_slot_field_mapping() {
        assert_eq!(SlotField::from_slot_id("param_3"), SlotField::Param(3));
        assert_eq!(SlotField::from_slot_id("param_x"), SlotField::Unknown);
        assert_eq!(SlotField::from_slot_id("abi"), SlotField::FunctionAbi);
        assert_eq!(SlotField::from_slot_id("minTimestamp"), SlotField::Threshold);
    }
}
