//! Encrypt and decrypt flows driven by the user.

use super::client::{ConditionContext, DecryptRequest, EncryptRequest, ThresholdClient};
use super::error_parser::SdkFailure;
use super::message_kit::MessageKit;
use super::wallet::{WalletProvider, connect};
use crate::condition::{ConditionDocument, USER_ADDRESS};
use crate::config::Settings;
use crate::error::SessionError;
use crate::validator::Validator;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Rejects a second submission while one is in flight.
#[derive(Debug, Default)]
pub struct Trigger {
    busy: AtomicBool,
}

pub struct TriggerGuard<'a> {
    trigger: &'a Trigger,
}

impl Trigger {
    pub fn try_acquire(&self) -> Result<TriggerGuard<'_>, SessionError> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(SessionError::Busy);
        }
        Ok(TriggerGuard { trigger: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for TriggerGuard<'_> {
    fn drop(&mut self) {
        self.trigger.busy.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    pub message_kit: MessageKit,
    /// Base64 of the binary kit, for sharing.
    pub ciphertext: String,
}

#[derive(Debug, Default)]
pub struct EncryptPanel {
    trigger: Trigger,
    validator: Validator,
}

impl EncryptPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Needs a message and a compiled condition that passes validation.
    pub fn can_encrypt(&self, plaintext: &str, document: Option<&ConditionDocument>) -> bool {
        !plaintext.is_empty()
            && document.is_some_and(|doc| self.validator.validate(doc).is_ok())
            && !self.trigger.is_busy()
    }

    /// Validates, connects the wallet and encrypts.
    pub async fn encrypt(
        &self,
        client: &dyn ThresholdClient,
        wallet: &dyn WalletProvider,
        settings: &Settings,
        plaintext: &str,
        document: Option<&ConditionDocument>,
    ) -> Result<EncryptedMessage, SessionError> {
        let _guard = self.trigger.try_acquire()?;
        let document = match document {
            Some(document) if !plaintext.is_empty() => document,
            _ => return Err(SessionError::NothingToEncrypt),
        };
        self.validator.validate(document)?;

        let wallet = connect(wallet).await?;
        let message_kit = client
            .encrypt(EncryptRequest {
                domain: settings.domain,
                porter_url: settings.porter_url.as_deref(),
                ritual_id: settings.ritual_id(),
                plaintext: plaintext.as_bytes(),
                conditions: document,
                signer: wallet.signer.as_ref(),
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "encryption failed");
                SessionError::SdkCallFailed(SdkFailure::from(e))
            })?;
        let ciphertext = message_kit.to_base64()?;
        info!(
            domain = settings.domain.as_str(),
            ritual_id = settings.ritual_id(),
            bytes = ciphertext.len(),
            "encrypted message"
        );
        Ok(EncryptedMessage {
            message_kit,
            ciphertext,
        })
    }
}

/// Holds the pasted ciphertext and the kit decoded from it.
#[derive(Debug, Default)]
pub struct DecryptPanel {
    input: String,
    message_kit: Option<MessageKit>,
    status: Option<String>,
    trigger: Trigger,
}

impl DecryptPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes pasted text. Failures clear the kit and set a status; they
    /// never propagate.
    pub fn set_ciphertext(&mut self, text: &str) {
        self.input = text.to_string();
        if text.trim().is_empty() {
            self.message_kit = None;
            self.status = None;
            return;
        }
        match MessageKit::from_base64(text) {
            Ok(kit) => {
                self.message_kit = Some(kit);
                self.status = None;
            }
            Err(e) => {
                debug!(error = %e, "rejected pasted ciphertext");
                self.message_kit = None;
                self.status = Some(e.to_string());
            }
        }
    }

    /// Loads a kit produced in this session.
    pub fn load(&mut self, message_kit: MessageKit, ciphertext: &str) {
        self.input = ciphertext.to_string();
        self.message_kit = Some(message_kit);
        self.status = None;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn message_kit(&self) -> Option<&MessageKit> {
        self.message_kit.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Conditions embedded in the loaded kit, for display.
    pub fn conditions(&self) -> Option<ConditionDocument> {
        self.message_kit.as_ref().and_then(|k| k.conditions().ok())
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn can_decrypt(&self) -> bool {
        self.message_kit.is_some() && !self.trigger.is_busy()
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.message_kit = None;
        self.status = None;
    }

    /// Connects the wallet, authenticates the user and decrypts.
    pub async fn decrypt(
        &self,
        client: &dyn ThresholdClient,
        wallet: &dyn WalletProvider,
        settings: &Settings,
    ) -> Result<String, SessionError> {
        let _guard = self.trigger.try_acquire()?;
        let message_kit = self.message_kit.as_ref().ok_or(SessionError::NoMessageKit)?;

        let wallet = connect(wallet).await?;
        let mut context = ConditionContext::from_message_kit(message_kit)?;
        context.add_auth_provider(USER_ADDRESS, wallet.signer.clone());

        let plaintext = client
            .decrypt(DecryptRequest {
                domain: settings.domain,
                porter_url: settings.porter_url.as_deref(),
                message_kit,
                context: &context,
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "decryption failed");
                SessionError::SdkCallFailed(SdkFailure::from(e))
            })?;
        info!(bytes = plaintext.len(), "decrypted message");
        Ok(String::from_utf8_lossy(&plaintext).into_owned())
    }
}
