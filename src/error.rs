use crate::block::BlockKind;
use thiserror::Error;

/// Errors raised while editing the block graph.
///
/// All of these are recovered inside the editor: the mutation is not applied
/// and the graph is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Slot '{slot_id}' on block '{block_id}' does not accept {kind} blocks")]
    SlotKindMismatch {
        block_id: String,
        slot_id: String,
        kind: BlockKind,
    },

    #[error("Slot '{slot_id}' on block '{block_id}' already holds '{occupant}'")]
    SlotOccupied {
        block_id: String,
        slot_id: String,
        occupant: String,
    },

    #[error("Please use an operator block to combine multiple conditions")]
    TopLevelConflict { existing_root: String },

    #[error("Block '{0}' not found in the graph")]
    BlockNotFound(String),

    #[error("Block '{block_id}' has no slot named '{slot_id}'")]
    SlotNotFound { block_id: String, slot_id: String },

    #[error("Block '{0}' is a value block and cannot receive other blocks")]
    NotADropTarget(String),

    #[error("Block '{0}' is not a value block")]
    NotAValueBlock(String),

    #[error("Block '{0}' is not a JSON-RPC condition")]
    NotAJsonRpcBlock(String),

    #[error("Attaching '{source_id}' under '{target_id}' would make a block its own descendant")]
    CycleDetected { source_id: String, target_id: String },

    #[error("Root index {index} is out of range for {len} root blocks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Block '{0}' is a palette template; drop it instead of moving it")]
    TemplateNotInGraph(String),

    #[error("Nested tree is invalid: {0}")]
    InvalidTree(String),
}

/// Reasons a single branch of the graph failed to compile.
///
/// These never escape `Compiler::compile`; a failing branch compiles to
/// `None` and the reason is logged. `Compiler::compile_block` exposes them
/// for diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Block '{block_id}' is missing required field '{field}'")]
    Incomplete {
        block_id: String,
        field: &'static str,
    },

    #[error("Operator '{block_id}' ({operator}) requires exactly {expected} operand(s), found {found}")]
    OperatorArity {
        block_id: String,
        operator: String,
        expected: usize,
        found: usize,
    },

    #[error("Operator '{0}' has no operand that compiles")]
    NoOperands(String),

    #[error("Block '{block_id}' of kind {kind} cannot be compiled into a condition")]
    UnsupportedBlock { block_id: String, kind: BlockKind },

    #[error("No parser registered for condition type '{0}'")]
    NoParser(String),

    #[error("Failed to parse '{slot_id}' on block '{block_id}': {message}")]
    ParameterParse {
        block_id: String,
        slot_id: String,
        message: String,
    },

    #[error("Block '{0}' not found in the graph")]
    BlockNotFound(String),
}

/// Structural problems found by the validator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Condition is not a JSON object")]
    NotAnObject,

    #[error("Unknown condition type: '{0}'")]
    UnknownConditionType(String),

    #[error("Compound condition has no operands")]
    EmptyOperands,

    #[error("'not' condition requires exactly one operand, found {0}")]
    NotArity(usize),

    #[error("Unsupported chain ID: {0}")]
    UnsupportedChain(u64),

    #[error("{condition} condition is missing required field '{field}'")]
    MissingField {
        condition: &'static str,
        field: &'static str,
    },

    #[error("Time condition method must be 'blocktime', found '{0}'")]
    InvalidTimeMethod(String),

    #[error("RPC condition method must be 'eth_getBalance', found '{0}'")]
    InvalidRpcMethod(String),

    #[error("RPC condition parameters must be [\":userAddress\", \"latest\"]")]
    InvalidRpcParameters,

    #[error("Malformed condition: {0}")]
    Malformed(String),
}

/// Errors from EIP-55 address handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("'{0}' is not a 20-byte hex address")]
    InvalidAddress(String),
}

/// Errors when loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {key}")]
    InvalidOverride { key: &'static str, value: String },

    #[error("Unsupported expected chain ID: {0}")]
    UnsupportedChain(u64),
}

/// Errors reported by the wallet collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("No wallet extension is installed")]
    Unavailable,

    #[error("No accounts found")]
    NoAccounts,

    #[error("Wrong network: expected chain {expected}, wallet is on chain {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Wallet request failed: {0}")]
    RequestFailed(String),
}

/// A failure raised by the external encrypt/decrypt SDK.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SdkError {
    pub message: String,
}

impl SdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors decoding a pasted ciphertext into a message kit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CiphertextError {
    #[error("Invalid ciphertext format")]
    InvalidFormat,

    #[error("Failed to encode message kit: {0}")]
    Encode(String),
}

/// Errors surfaced by an encrypt or decrypt session.
///
/// All of them are recoverable: the graph and the user's inputs are left
/// intact so the action can be retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Nothing to encrypt: a message and a valid condition are both required")]
    NothingToEncrypt,

    #[error("No message kit loaded")]
    NoMessageKit,

    #[error("A request is already in flight")]
    Busy,

    #[error("Condition failed validation: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("{}", .0.summary)]
    SdkCallFailed(crate::sdk::SdkFailure),

    #[error(transparent)]
    Ciphertext(#[from] CiphertextError),
}
