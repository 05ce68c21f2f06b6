//! Common test utilities: graph fixtures and mock collaborators.
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use taco_blocks::block::{Block, BlockId, palette};
use taco_blocks::error::{SdkError, WalletError};
use taco_blocks::graph::{DropTarget, GraphEditor};
use taco_blocks::sdk::{
    DecryptRequest, EncryptRequest, MessageKit, Signer, ThresholdClient, WalletProvider,
};

pub const USER: &str = "0x1234567890abcdef1234567890abcdef12345678";

/// Routes library logs to the test harness; honours `RUST_LOG`.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Drops a value template into a slot and sets its text.
#[allow(dead_code)]
pub fn drop_value(
    editor: &mut GraphEditor,
    template: &Block,
    block_id: &str,
    slot_id: &str,
    raw: &str,
) -> BlockId {
    let id = editor
        .attach(template, DropTarget::slot(block_id, slot_id))
        .expect("value attaches");
    editor.set_value(&id, raw).expect("value is set");
    id
}

/// A time lock on the canvas with chain and timestamp filled in.
#[allow(dead_code)]
pub fn time_lock_on_canvas(editor: &mut GraphEditor, chain: &str, timestamp: &str) -> BlockId {
    let lock = editor
        .attach(&palette::time_lock(), DropTarget::Canvas)
        .expect("time lock attaches");
    drop_value(editor, &palette::number_value(), &lock, "chain", chain);
    drop_value(editor, &palette::number_value(), &lock, "minTimestamp", timestamp);
    lock
}

/// An ERC-20 balance condition in `slot_id` of `operator`, using the sample
/// token contract and the given chain text.
#[allow(dead_code)]
pub fn erc20_in(editor: &mut GraphEditor, operator: &str, slot_id: &str, chain: &str) -> BlockId {
    let block = editor
        .attach(&palette::erc20_balance(), DropTarget::slot(operator, slot_id))
        .expect("erc20 attaches");
    editor
        .attach(
            &palette::template("contract-address").expect("sample address template"),
            DropTarget::slot(&block, "contractAddress"),
        )
        .expect("address attaches");
    drop_value(editor, &palette::number_value(), &block, "chain", chain);
    block
}

#[allow(dead_code)]
pub struct MockSigner {
    pub address: String,
}

#[async_trait]
impl Signer for MockSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletError> {
        Ok(message.iter().rev().copied().collect())
    }
}

#[allow(dead_code)]
pub struct MockWallet {
    pub available: bool,
    pub accounts: Vec<String>,
    pub chain_id: AtomicU64,
}

#[allow(dead_code)]
impl MockWallet {
    pub fn on_chain(chain_id: u64) -> Self {
        Self {
            available: true,
            accounts: vec![USER.to_string()],
            chain_id: AtomicU64::new(chain_id),
        }
    }

    pub fn missing() -> Self {
        Self {
            available: false,
            ..Self::on_chain(80002)
        }
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        Ok(self.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.chain_id.store(chain_id, Ordering::SeqCst);
        Ok(())
    }

    fn signer(&self, account: &str) -> Arc<dyn Signer> {
        Arc::new(MockSigner {
            address: account.to_string(),
        })
    }
}

/// Stores the plaintext as the ciphertext; decrypt hands it back once every
/// context parameter has a signer.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockClient {
    pub failure: Option<String>,
    pub encrypt_calls: AtomicUsize,
    pub decrypt_calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockClient {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ThresholdClient for MockClient {
    async fn encrypt(&self, request: EncryptRequest<'_>) -> Result<MessageKit, SdkError> {
        self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(SdkError::new(message.clone()));
        }
        Ok(MessageKit::new(
            request.ritual_id.to_be_bytes().to_vec(),
            request.plaintext.to_vec(),
            request.conditions,
        ))
    }

    async fn decrypt(&self, request: DecryptRequest<'_>) -> Result<Vec<u8>, SdkError> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(SdkError::new(message.clone()));
        }
        let missing = request.context.missing_parameters();
        if !missing.is_empty() {
            return Err(SdkError::new(format!("missing auth for {:?}", missing)));
        }
        Ok(request.message_kit.ciphertext.clone())
    }
}
