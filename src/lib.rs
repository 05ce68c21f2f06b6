//! # taco-blocks - Block-Graph Condition Compiler
//!
//! **taco-blocks** turns a user-assembled graph of blocks into the condition
//! document a threshold encryption network evaluates before releasing a
//! decryption share. Blocks are dragged from a palette, dropped onto a canvas
//! or into slots of other blocks, and every edit recompiles the graph.
//!
//! ## Core Workflow
//!
//! 1.  **Edit**: A `GraphEditor` owns the block graph. Templates from the
//!     `palette` are instantiated on drop; slots accept only the block kinds
//!     they declare, and a block is attached in at most one place.
//! 2.  **Compile**: A `Compiler` walks the graph and builds a
//!     `ConditionDocument`. Incomplete branches compile to nothing and are
//!     dropped, so a half-built graph still yields its finished parts.
//! 3.  **Validate**: The `Validator` checks the document's structure before it
//!     is handed to the encryption SDK.
//! 4.  **Encrypt / Decrypt**: The `sdk` module drives a wallet and a
//!     threshold client, both injected behind traits.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taco_blocks::prelude::*;
//! use taco_blocks::block::palette;
//!
//! fn main() -> Result<()> {
//!     let mut editor = GraphEditor::new();
//!
//!     // Drop a time lock on the canvas and fill its slots.
//!     let lock = editor.attach(&palette::time_lock(), DropTarget::Canvas)?;
//!     let chain = editor.attach(&palette::number_value(), DropTarget::slot(&lock, "chain"))?;
//!     editor.set_value(&chain, "11155111")?;
//!     let timestamp = editor.attach(
//!         &palette::number_value(),
//!         DropTarget::slot(&lock, "minTimestamp"),
//!     )?;
//!     editor.set_value(&timestamp, "1750000000")?;
//!
//!     let compiler = Compiler::builder().build();
//!     if let Some(document) = compiler.compile(editor.graph()) {
//!         Validator::new().validate(&document)?;
//!         println!("{}", document.to_pretty_json());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod block;
pub mod compiler;
pub mod condition;
pub mod config;
pub mod error;
pub mod graph;
pub mod notice;
pub mod prelude;
pub mod sdk;
pub mod store;
pub mod validator;
