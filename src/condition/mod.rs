//! The condition document: the JSON value handed to the encryption SDK.

pub mod address;
pub mod chain;
mod document;

pub use address::{checksum_parameter, is_address_like, to_checksum_address};
pub use chain::{SUPPORTED_CHAINS, SupportedChain, chain_name, is_supported_chain, parse_chain};
pub use document::{
    AbiParameter, Comparator, CompoundCondition, ConditionDocument, ConditionType,
    ContractCondition, FunctionAbi, JsonRpcCondition, Operator, ReturnValueTest, RpcCondition,
    StandardContractType, TOKEN_ID, TimeCondition, USER_ADDRESS, format_document,
};
