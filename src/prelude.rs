//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! taco-blocks crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use taco_blocks::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let settings = Settings::load("taco-blocks.toml")?;
//! let mut store = ConditionStore::new(&settings);
//! store.subscribe(|snapshot| println!("{}", snapshot.json));
//! # Ok(())
//! # }
//! ```

// Blocks and the graph
pub use crate::block::{Block, BlockId, BlockKind, Preset, Slot};
pub use crate::graph::{BlockGraph, BlockTree, DisplayGraph, DropTarget, GraphEditor, SlotRef};

// Compilation and validation
pub use crate::compiler::Compiler;
pub use crate::condition::{Comparator, ConditionDocument, ConditionType, Operator};
pub use crate::validator::Validator;

// Session state
pub use crate::config::{Domain, Settings};
pub use crate::store::{ConditionSnapshot, ConditionStore};
pub use crate::sdk::{DecryptPanel, EncryptPanel, MessageKit, ThresholdClient, WalletProvider};

// Error types
pub use crate::error::{
    CiphertextError, CompileError, ConfigError, EditorError, SessionError, ValidationError,
    WalletError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
