use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Comparison applied by the condition evaluator to a call's return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    SmallerThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<=")]
    SmallerThanOrEqual,
    #[serde(rename = "!=")]
    NotEqual,
}

impl Comparator {
    pub const ALL: [Comparator; 6] = [
        Comparator::Equal,
        Comparator::GreaterThan,
        Comparator::SmallerThan,
        Comparator::GreaterThanOrEqual,
        Comparator::SmallerThanOrEqual,
        Comparator::NotEqual,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equal => "==",
            Comparator::GreaterThan => ">",
            Comparator::SmallerThan => "<",
            Comparator::GreaterThanOrEqual => ">=",
            Comparator::SmallerThanOrEqual => "<=",
            Comparator::NotEqual => "!=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.symbol() == symbol.trim())
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The test applied to the value returned by a condition's call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnValueTest {
    pub comparator: Comparator,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl ReturnValueTest {
    pub fn new(comparator: Comparator, value: impl Into<Value>) -> Self {
        Self {
            comparator,
            value: value.into(),
            index: None,
        }
    }
}

/// Token standards the evaluator knows how to call without an explicit ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardContractType {
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC1155")]
    Erc1155,
}

impl StandardContractType {
    pub fn as_str(self) -> &'static str {
        match self {
            StandardContractType::Erc20 => "ERC20",
            StandardContractType::Erc721 => "ERC721",
            StandardContractType::Erc1155 => "ERC1155",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ERC20" => Some(StandardContractType::Erc20),
            "ERC721" => Some(StandardContractType::Erc721),
            "ERC1155" => Some(StandardContractType::Erc1155),
            _ => None,
        }
    }
}

/// Boolean combinators for compound conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    And,
    Or,
    Not,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
        }
    }

    /// Upper bound on operands; `None` means unbounded.
    pub fn max_operands(self) -> Option<usize> {
        match self {
            Operator::Not => Some(1),
            Operator::And | Operator::Or => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `conditionType` tag of a condition document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "contract")]
    Contract,
    #[serde(rename = "rpc")]
    Rpc,
    #[serde(rename = "json-rpc")]
    JsonRpc,
    #[serde(rename = "compound")]
    Compound,
}

impl ConditionType {
    pub const ALL: [ConditionType; 5] = [
        ConditionType::Time,
        ConditionType::Contract,
        ConditionType::Rpc,
        ConditionType::JsonRpc,
        ConditionType::Compound,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConditionType::Time => "time",
            ConditionType::Contract => "contract",
            ConditionType::Rpc => "rpc",
            ConditionType::JsonRpc => "json-rpc",
            ConditionType::Compound => "compound",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single input or output entry of a function ABI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
}

/// The ABI of a custom contract method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionAbi {
    pub name: String,
    #[serde(rename = "type", default = "default_abi_kind")]
    pub kind: String,
    #[serde(default)]
    pub inputs: Vec<AbiParameter>,
    #[serde(default)]
    pub outputs: Vec<AbiParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
}

fn default_abi_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeCondition {
    pub chain: u64,
    pub method: String,
    pub return_value_test: ReturnValueTest,
}

impl TimeCondition {
    pub const METHOD: &'static str = "blocktime";

    pub fn new(chain: u64, return_value_test: ReturnValueTest) -> Self {
        Self {
            chain,
            method: Self::METHOD.to_string(),
            return_value_test,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCondition {
    pub chain: u64,
    pub contract_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_contract_type: Option<StandardContractType>,
    pub method: String,
    #[serde(default)]
    pub parameters: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_abi: Option<FunctionAbi>,
    pub return_value_test: ReturnValueTest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcCondition {
    pub chain: u64,
    pub method: String,
    pub parameters: Vec<Value>,
    pub return_value_test: ReturnValueTest,
}

impl RpcCondition {
    pub const METHOD: &'static str = "eth_getBalance";

    pub fn default_parameters() -> Vec<Value> {
        vec![
            Value::String(USER_ADDRESS.to_string()),
            Value::String("latest".to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRpcCondition {
    pub endpoint: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_token: Option<String>,
    pub return_value_test: ReturnValueTest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundCondition {
    pub operator: Operator,
    pub operands: Vec<ConditionDocument>,
}

/// Context placeholder resolved to the decrypting user's address.
pub const USER_ADDRESS: &str = ":userAddress";
/// Template placeholder replaced by the block's token id at compile time.
pub const TOKEN_ID: &str = ":tokenId";

/// The compiled condition handed to the encryption SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "conditionType")]
pub enum ConditionDocument {
    #[serde(rename = "time")]
    Time(TimeCondition),
    #[serde(rename = "contract")]
    Contract(ContractCondition),
    #[serde(rename = "rpc")]
    Rpc(RpcCondition),
    #[serde(rename = "json-rpc")]
    JsonRpc(JsonRpcCondition),
    #[serde(rename = "compound")]
    Compound(CompoundCondition),
}

impl ConditionDocument {
    pub fn condition_type(&self) -> ConditionType {
        match self {
            ConditionDocument::Time(_) => ConditionType::Time,
            ConditionDocument::Contract(_) => ConditionType::Contract,
            ConditionDocument::Rpc(_) => ConditionType::Rpc,
            ConditionDocument::JsonRpc(_) => ConditionType::JsonRpc,
            ConditionDocument::Compound(_) => ConditionType::Compound,
        }
    }

    /// The chain this condition is evaluated on, if it is chain-scoped.
    pub fn chain(&self) -> Option<u64> {
        match self {
            ConditionDocument::Time(c) => Some(c.chain),
            ConditionDocument::Contract(c) => Some(c.chain),
            ConditionDocument::Rpc(c) => Some(c.chain),
            ConditionDocument::JsonRpc(_) | ConditionDocument::Compound(_) => None,
        }
    }

    pub fn compound(operator: Operator, operands: Vec<ConditionDocument>) -> Self {
        ConditionDocument::Compound(CompoundCondition { operator, operands })
    }

    /// Collects every `:`-prefixed context placeholder referenced anywhere in the tree.
    pub fn context_parameters(&self, found: &mut std::collections::BTreeSet<String>) {
        fn collect(value: &Value, found: &mut std::collections::BTreeSet<String>) {
            match value {
                Value::String(s) if s.starts_with(':') => {
                    found.insert(s.clone());
                }
                Value::Array(items) => items.iter().for_each(|v| collect(v, found)),
                _ => {}
            }
        }

        match self {
            ConditionDocument::Time(c) => collect(&c.return_value_test.value, found),
            ConditionDocument::Contract(c) => {
                c.parameters.iter().for_each(|p| collect(p, found));
                collect(&c.return_value_test.value, found);
            }
            ConditionDocument::Rpc(c) => {
                c.parameters.iter().for_each(|p| collect(p, found));
                collect(&c.return_value_test.value, found);
            }
            ConditionDocument::JsonRpc(c) => {
                c.params.iter().flatten().for_each(|p| collect(p, found));
                collect(&c.return_value_test.value, found);
            }
            ConditionDocument::Compound(c) => {
                c.operands.iter().for_each(|o| o.context_parameters(found));
            }
        }
    }

    /// Compact serialization used to detect whether a recompile changed anything.
    pub fn to_canonical_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Indented serialization for the user-facing preview.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Formats an optional document for the preview pane; no document renders empty.
pub fn format_document(document: Option<&ConditionDocument>) -> String {
    document.map(ConditionDocument::to_pretty_json).unwrap_or_default()
}
