//! The canonical set of block templates offered to the user.

use super::{
    Block, BlockPayload, Category, ConditionProperties, InputType, OperatorProperties, Slot,
};
use crate::condition::chain::{ETHEREUM_MAINNET, POLYGON_AMOY, POLYGON_MAINNET, SEPOLIA};
use crate::condition::{
    Comparator, ConditionType, Operator, ReturnValueTest, RpcCondition, StandardContractType,
    TOKEN_ID, USER_ADDRESS,
};
use serde_json::Value;

const CHAIN_PLACEHOLDER: &str = "Enter 1, 137, 80002, or 11155111";
/// Sample token contract offered as a value preset.
pub const SAMPLE_CONTRACT_ADDRESS: &str = "0x8a6d59c1c0449ccf26d87bd52be029ec4a5afa5c";

/// Every template, in palette order.
pub fn palette() -> Vec<Block> {
    vec![
        operator_template("and-operator", "AND", Operator::And),
        operator_template("or-operator", "OR", Operator::Or),
        operator_template("not-operator", "NOT", Operator::Not),
        chain_value("chain-amoy", "Amoy Chain ID (80002)", POLYGON_AMOY),
        chain_value("chain-mainnet", "Ethereum Chain ID (1)", ETHEREUM_MAINNET),
        chain_value("chain-polygon", "Polygon Chain ID (137)", POLYGON_MAINNET),
        chain_value("chain-sepolia", "Sepolia Chain ID (11155111)", SEPOLIA),
        value_template(
            "contract-address",
            "Contract Address (0x8a6d...fa5c)",
            SAMPLE_CONTRACT_ADDRESS,
            InputType::Text,
        ),
        text_value(),
        number_value(),
        time_lock(),
        erc20_balance(),
        erc721_balance(),
        erc721_ownership(),
        erc1155_balance(),
        eth_balance(),
        custom_contract(),
        json_rpc(),
    ]
}

/// Looks up a template by its palette id.
pub fn template(id: &str) -> Option<Block> {
    palette().into_iter().find(|b| b.id == id)
}

/// Templates of one palette section, in palette order.
pub fn by_category(category: Category) -> Vec<Block> {
    palette()
        .into_iter()
        .filter(|b| b.category == category)
        .collect()
}

pub fn and_operator() -> Block {
    operator_template("and-operator", "AND", Operator::And)
}

pub fn or_operator() -> Block {
    operator_template("or-operator", "OR", Operator::Or)
}

pub fn not_operator() -> Block {
    operator_template("not-operator", "NOT", Operator::Not)
}

pub fn text_value() -> Block {
    value_template("text-value", "Text", "", InputType::Text)
}

pub fn number_value() -> Block {
    value_template("number-value", "Number", "", InputType::Number)
}

pub fn time_lock() -> Block {
    condition_template(
        "timestamp",
        "Time Lock",
        vec![
            chain_slot(),
            Slot::value("minTimestamp", "Minimum Timestamp")
                .numeric()
                .with_placeholder("Unix timestamp in seconds")
                .with_comparator(Comparator::GreaterThanOrEqual),
        ],
        ConditionProperties {
            method: Some("blocktime".to_string()),
            ..ConditionProperties::new(ConditionType::Time)
        },
    )
}

pub fn eth_balance() -> Block {
    condition_template(
        "eth-balance",
        "ETH Balance",
        vec![
            chain_slot(),
            Slot::value("minBalance", "Min Balance (Wei)")
                .numeric()
                .with_comparator(Comparator::GreaterThanOrEqual),
        ],
        ConditionProperties {
            method: Some(RpcCondition::METHOD.to_string()),
            parameters: Some(RpcCondition::default_parameters()),
            ..ConditionProperties::new(ConditionType::Rpc)
        },
    )
}

pub fn erc20_balance() -> Block {
    token_balance(
        "erc20-balance",
        "ERC20 Balance",
        "Token Address",
        StandardContractType::Erc20,
    )
}

pub fn erc721_balance() -> Block {
    token_balance(
        "erc721-balance",
        "ERC721 Balance",
        "Contract Address",
        StandardContractType::Erc721,
    )
}

pub fn erc721_ownership() -> Block {
    condition_template(
        "erc721-ownership",
        "ERC721 Ownership",
        vec![
            Slot::value("contractAddress", "Contract Address"),
            Slot::value("tokenId", "Token ID").numeric(),
            chain_slot(),
        ],
        ConditionProperties {
            method: Some("ownerOf".to_string()),
            parameters: Some(vec![Value::String(TOKEN_ID.to_string())]),
            standard_contract_type: Some(StandardContractType::Erc721),
            return_value_test: Some(ReturnValueTest::new(Comparator::Equal, USER_ADDRESS)),
            ..ConditionProperties::new(ConditionType::Contract)
        },
    )
}

pub fn erc1155_balance() -> Block {
    condition_template(
        "erc1155-balance",
        "ERC1155 Balance",
        vec![
            Slot::value("contractAddress", "Contract Address"),
            Slot::value("tokenId", "Token ID").numeric(),
            chain_slot(),
            Slot::value("tokenAmount", "Min Balance")
                .numeric()
                .with_comparator(Comparator::GreaterThan),
        ],
        ConditionProperties {
            method: Some("balanceOf".to_string()),
            parameters: Some(vec![
                Value::String(USER_ADDRESS.to_string()),
                Value::String(TOKEN_ID.to_string()),
            ]),
            standard_contract_type: Some(StandardContractType::Erc1155),
            return_value_test: Some(ReturnValueTest::new(Comparator::GreaterThan, 0)),
            ..ConditionProperties::new(ConditionType::Contract)
        },
    )
}

pub fn custom_contract() -> Block {
    condition_template(
        "custom-contract",
        "Custom Contract Call",
        vec![
            Slot::value("contractAddress", "Contract Address"),
            Slot::value("method", "Method Name"),
            chain_slot(),
            Slot::value("parameters", "Parameters (JSON)").with_placeholder("[\":userAddress\"]"),
            Slot::value("abi", "Function ABI (JSON)"),
            Slot::value("expectedValue", "Expected Value")
                .with_comparator(Comparator::GreaterThan),
        ],
        ConditionProperties {
            return_value_test: Some(ReturnValueTest::new(Comparator::GreaterThan, 0)),
            ..ConditionProperties::new(ConditionType::Contract)
        },
    )
}

pub fn json_rpc() -> Block {
    condition_template(
        "json-rpc",
        "JSON RPC",
        vec![
            Slot::value("endpoint", "Endpoint URI"),
            Slot::value("method", "Method Name"),
            Slot::value("param_0", "Parameter 1"),
            Slot::value("authorizationToken", "Authorization Token"),
            Slot::value("query", "JSON Path Query"),
            Slot::value("expectedValue", "Expected Value")
                .with_comparator(Comparator::GreaterThanOrEqual),
        ],
        ConditionProperties {
            return_value_test: Some(ReturnValueTest::new(Comparator::GreaterThanOrEqual, 0)),
            ..ConditionProperties::new(ConditionType::JsonRpc)
        },
    )
}

/// Canned multi-block arrangements dropped in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preset {
    /// A time lock that opens at `now` on `chain`.
    TimelockNow { chain: u64, now: u64 },
}

fn token_balance(
    id: &str,
    label: &str,
    address_label: &str,
    standard: StandardContractType,
) -> Block {
    condition_template(
        id,
        label,
        vec![
            Slot::value("contractAddress", address_label),
            chain_slot(),
            Slot::value("tokenAmount", "Min Balance")
                .numeric()
                .with_comparator(Comparator::GreaterThan),
        ],
        ConditionProperties {
            method: Some("balanceOf".to_string()),
            parameters: Some(vec![Value::String(USER_ADDRESS.to_string())]),
            standard_contract_type: Some(standard),
            return_value_test: Some(ReturnValueTest::new(Comparator::GreaterThan, 0)),
            ..ConditionProperties::new(ConditionType::Contract)
        },
    )
}

fn chain_slot() -> Slot {
    Slot::value("chain", "Chain ID")
        .numeric()
        .with_placeholder(CHAIN_PLACEHOLDER)
}

fn chain_value(id: &str, label: &str, chain: u64) -> Block {
    value_template(id, label, &chain.to_string(), InputType::Number)
}

fn value_template(id: &str, label: &str, raw: &str, input_type: InputType) -> Block {
    Block {
        id: id.to_string(),
        template: true,
        category: Category::Values,
        label: label.to_string(),
        slots: Vec::new(),
        payload: BlockPayload::Value {
            raw: raw.to_string(),
            input_type,
        },
    }
}

fn condition_template(
    id: &str,
    label: &str,
    slots: Vec<Slot>,
    properties: ConditionProperties,
) -> Block {
    Block {
        id: id.to_string(),
        template: true,
        category: Category::Conditions,
        label: label.to_string(),
        slots,
        payload: BlockPayload::Condition(properties),
    }
}

fn operator_template(id: &str, label: &str, operator: Operator) -> Block {
    let slot_label = match operator {
        Operator::Not => "Condition to Negate",
        Operator::And | Operator::Or => "Add Condition",
    };
    Block {
        id: id.to_string(),
        template: true,
        category: Category::Operators,
        label: label.to_string(),
        slots: vec![Slot::operand("condition-1", slot_label)],
        payload: BlockPayload::Operator(OperatorProperties {
            operator,
            max_operands: operator.max_operands(),
        }),
    }
}
