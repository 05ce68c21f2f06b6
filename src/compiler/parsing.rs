use crate::block::ConditionProperties;
use crate::condition::{
    CompoundCondition, ConditionDocument, ConditionType, ContractCondition, FunctionAbi,
    JsonRpcCondition, Operator, ReturnValueTest, RpcCondition, StandardContractType, TOKEN_ID,
    TimeCondition,
};
use crate::error::CompileError;
use ahash::AHashMap;
use serde_json::Value;

/// Fields gathered for one condition block before it becomes a document.
///
/// Starts from the block's static properties; slot inputs are layered on top.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionDraft {
    pub block_id: String,
    pub condition_type: ConditionType,
    pub chain: Option<u64>,
    pub contract_address: Option<String>,
    pub standard_contract_type: Option<StandardContractType>,
    pub method: Option<String>,
    pub parameters: Option<Vec<Value>>,
    pub function_abi: Option<FunctionAbi>,
    pub return_value_test: Option<ReturnValueTest>,
    pub endpoint: Option<String>,
    pub query: Option<String>,
    pub authorization_token: Option<String>,
    pub params: Vec<Value>,
}

impl ConditionDraft {
    pub fn from_properties(block_id: &str, properties: &ConditionProperties) -> Self {
        Self {
            block_id: block_id.to_string(),
            condition_type: properties.condition_type,
            chain: properties.chain,
            contract_address: None,
            standard_contract_type: properties.standard_contract_type,
            method: properties.method.clone(),
            parameters: properties.parameters.clone(),
            function_abi: None,
            return_value_test: properties.return_value_test.clone(),
            endpoint: None,
            query: None,
            authorization_token: None,
            params: Vec::new(),
        }
    }

    /// Unwraps a required field or reports the branch as incomplete.
    pub fn require<T>(&self, value: Option<T>, field: &'static str) -> Result<T, CompileError> {
        value.ok_or_else(|| CompileError::Incomplete {
            block_id: self.block_id.clone(),
            field,
        })
    }
}

/// Turns a condition draft of one `conditionType` into a document.
pub trait ConditionParser: Send + Sync {
    fn condition_type(&self) -> ConditionType;
    fn parse(&self, draft: ConditionDraft) -> Result<ConditionDocument, CompileError>;
}

struct TimeParser;
impl ConditionParser for TimeParser {
    fn condition_type(&self) -> ConditionType {
        ConditionType::Time
    }
    fn parse(&self, draft: ConditionDraft) -> Result<ConditionDocument, CompileError> {
        let chain = draft.require(draft.chain, "chain")?;
        let test = draft.require(draft.return_value_test.clone(), "returnValueTest")?;
        Ok(ConditionDocument::Time(TimeCondition::new(chain, test)))
    }
}

struct ContractParser;
impl ConditionParser for ContractParser {
    fn condition_type(&self) -> ConditionType {
        ConditionType::Contract
    }
    fn parse(&self, draft: ConditionDraft) -> Result<ConditionDocument, CompileError> {
        let chain = draft.require(draft.chain, "chain")?;
        let contract_address = draft.require(draft.contract_address.clone(), "contractAddress")?;
        let method = draft.require(
            draft.method.clone().filter(|m| !m.is_empty()),
            "method",
        )?;
        let return_value_test =
            draft.require(draft.return_value_test.clone(), "returnValueTest")?;
        let parameters = draft.parameters.clone().unwrap_or_default();
        if parameters.iter().any(|p| p.as_str() == Some(TOKEN_ID)) {
            return Err(CompileError::Incomplete {
                block_id: draft.block_id,
                field: "tokenId",
            });
        }
        Ok(ConditionDocument::Contract(ContractCondition {
            chain,
            contract_address,
            standard_contract_type: draft.standard_contract_type,
            method,
            parameters,
            function_abi: draft.function_abi,
            return_value_test,
        }))
    }
}

struct RpcParser;
impl ConditionParser for RpcParser {
    fn condition_type(&self) -> ConditionType {
        ConditionType::Rpc
    }
    fn parse(&self, draft: ConditionDraft) -> Result<ConditionDocument, CompileError> {
        let chain = draft.require(draft.chain, "chain")?;
        let return_value_test =
            draft.require(draft.return_value_test.clone(), "returnValueTest")?;
        Ok(ConditionDocument::Rpc(RpcCondition {
            chain,
            method: RpcCondition::METHOD.to_string(),
            parameters: draft
                .parameters
                .unwrap_or_else(RpcCondition::default_parameters),
            return_value_test,
        }))
    }
}

struct JsonRpcParser;
impl ConditionParser for JsonRpcParser {
    fn condition_type(&self) -> ConditionType {
        ConditionType::JsonRpc
    }
    fn parse(&self, draft: ConditionDraft) -> Result<ConditionDocument, CompileError> {
        let endpoint = draft.require(draft.endpoint.clone(), "endpoint")?;
        let method = draft.require(draft.method.clone(), "method")?;
        let return_value_test =
            draft.require(draft.return_value_test.clone(), "returnValueTest")?;
        Ok(ConditionDocument::JsonRpc(JsonRpcCondition {
            endpoint,
            method,
            params: (!draft.params.is_empty()).then_some(draft.params),
            query: draft.query,
            authorization_token: draft.authorization_token.filter(|t| !t.is_empty()),
            return_value_test,
        }))
    }
}

pub(super) fn register_default_parsers(
    registry: &mut AHashMap<ConditionType, Box<dyn ConditionParser>>,
) {
    registry.insert(ConditionType::Time, Box::new(TimeParser));
    registry.insert(ConditionType::Contract, Box::new(ContractParser));
    registry.insert(ConditionType::Rpc, Box::new(RpcParser));
    registry.insert(ConditionType::JsonRpc, Box::new(JsonRpcParser));
}

/// Combines compiled operands under one boolean operator.
pub trait OperatorParser: Send + Sync {
    fn operator(&self) -> Operator;
    fn parse(
        &self,
        block_id: &str,
        attached: usize,
        operands: Vec<ConditionDocument>,
    ) -> Result<ConditionDocument, CompileError>;
}

/// Checks that exactly `count` operands are attached and all of them compiled.
fn require_operands(
    block_id: &str,
    operator: Operator,
    attached: usize,
    operands: Vec<ConditionDocument>,
    count: usize,
) -> Result<Vec<ConditionDocument>, CompileError> {
    if attached != count || operands.len() != count {
        let found = if attached != count {
            attached
        } else {
            operands.len()
        };
        Err(CompileError::OperatorArity {
            block_id: block_id.to_string(),
            operator: operator.to_string(),
            expected: count,
            found,
        })
    } else {
        Ok(operands)
    }
}

/// Defines the operator parsers and the lookup used by the document builder.
macro_rules! define_operator_parsers {
    ( $( ($struct_name:ident, $operator:path, Variadic) ),* $(,)? ; $( ($fixed_name:ident, $fixed_operator:path, Exactly($count:expr)) ),* $(,)? ) => {
        $(
            struct $struct_name;
            impl OperatorParser for $struct_name {
                fn operator(&self) -> Operator { $operator }
                fn parse(&self, block_id: &str, _attached: usize, operands: Vec<ConditionDocument>) -> Result<ConditionDocument, CompileError> {
                    if operands.is_empty() {
                        return Err(CompileError::NoOperands(block_id.to_string()));
                    }
                    Ok(ConditionDocument::Compound(CompoundCondition { operator: $operator, operands }))
                }
            }
        )*
        $(
            struct $fixed_name;
            impl OperatorParser for $fixed_name {
                fn operator(&self) -> Operator { $fixed_operator }
                fn parse(&self, block_id: &str, attached: usize, operands: Vec<ConditionDocument>) -> Result<ConditionDocument, CompileError> {
                    if operands.is_empty() {
                        return Err(CompileError::NoOperands(block_id.to_string()));
                    }
                    require_operands(block_id, $fixed_operator, attached, operands, $count)
                        .map(|operands| ConditionDocument::Compound(CompoundCondition { operator: $fixed_operator, operands }))
                }
            }
        )*

        pub(super) fn operator_parser(operator: Operator) -> &'static dyn OperatorParser {
            match operator {
                $( $operator => &$struct_name, )*
                $( $fixed_operator => &$fixed_name, )*
            }
        }
    };
}

define_operator_parsers! {
    (AndParser, Operator::And, Variadic),
    (OrParser, Operator::Or, Variadic),
    ;
    (NotParser, Operator::Not, Exactly(1)),
}
