//! Boundary with the wallet and the threshold encryption SDK.
//!
//! Both are collaborators behind traits; this crate only prepares their
//! inputs and interprets their failures.

pub mod client;
pub mod error_parser;
pub mod message_kit;
pub mod session;
pub mod wallet;

pub use client::{ConditionContext, DecryptRequest, EncryptRequest, ThresholdClient};
pub use error_parser::{NodeError, SdkFailure, group_by_message, parse_threshold_error};
pub use message_kit::MessageKit;
pub use session::{DecryptPanel, EncryptPanel, EncryptedMessage, Trigger};
pub use wallet::{ConnectedWallet, NetworkCheck, Signer, WalletProvider, connect};
