use crate::condition::chain_name;
use crate::config::Settings;
use crate::error::WalletError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Signs on behalf of one wallet account.
#[async_trait]
pub trait Signer: Send + Sync {
    fn address(&self) -> &str;
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletError>;
}

/// The injected browser wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// False when no wallet extension is present at all.
    fn is_available(&self) -> bool {
        true
    }
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;
    async fn chain_id(&self) -> Result<u64, WalletError>;
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;
    fn signer(&self, account: &str) -> Arc<dyn Signer>;
}

#[derive(Clone)]
pub struct ConnectedWallet {
    pub account: String,
    pub chain_id: u64,
    pub signer: Arc<dyn Signer>,
}

impl fmt::Debug for ConnectedWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectedWallet")
            .field("account", &self.account)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

/// Requests account access and picks the first account.
pub async fn connect(wallet: &dyn WalletProvider) -> Result<ConnectedWallet, WalletError> {
    if !wallet.is_available() {
        return Err(WalletError::Unavailable);
    }
    let account = wallet
        .request_accounts()
        .await?
        .into_iter()
        .next()
        .ok_or(WalletError::NoAccounts)?;
    let chain_id = wallet.chain_id().await?;
    let signer = wallet.signer(&account);
    info!(%account, chain_id, "wallet connected");
    Ok(ConnectedWallet {
        account,
        chain_id,
        signer,
    })
}

/// Compares the wallet's active chain with the configured one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkCheck {
    expected: u64,
}

impl NetworkCheck {
    pub fn new(expected: u64) -> Self {
        Self { expected }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.expected_chain_id)
    }

    pub fn expected(&self) -> u64 {
        self.expected
    }

    pub fn expected_name(&self) -> &'static str {
        chain_name(self.expected).unwrap_or("Unknown network")
    }

    pub fn verify(&self, actual: u64) -> Result<(), WalletError> {
        if actual == self.expected {
            Ok(())
        } else {
            Err(WalletError::WrongNetwork {
                expected: self.expected,
                actual,
            })
        }
    }

    pub async fn check(&self, wallet: &dyn WalletProvider) -> Result<(), WalletError> {
        let actual = wallet.chain_id().await?;
        self.verify(actual).inspect_err(|e| warn!(error = %e, "wallet on wrong network"))
    }

    /// Asks the wallet to switch to the expected chain, then re-checks.
    pub async fn switch(&self, wallet: &dyn WalletProvider) -> Result<(), WalletError> {
        wallet.switch_chain(self.expected).await?;
        self.check(wallet).await
    }
}
