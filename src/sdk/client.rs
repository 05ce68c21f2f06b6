use super::message_kit::MessageKit;
use super::wallet::Signer;
use crate::condition::ConditionDocument;
use crate::config::Domain;
use crate::error::{CiphertextError, SdkError};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

pub struct EncryptRequest<'a> {
    pub domain: Domain,
    pub porter_url: Option<&'a str>,
    pub ritual_id: u32,
    pub plaintext: &'a [u8],
    pub conditions: &'a ConditionDocument,
    pub signer: &'a dyn Signer,
}

pub struct DecryptRequest<'a> {
    pub domain: Domain,
    pub porter_url: Option<&'a str>,
    pub message_kit: &'a MessageKit,
    pub context: &'a ConditionContext,
}

/// The threshold encryption SDK.
#[async_trait]
pub trait ThresholdClient: Send + Sync {
    async fn encrypt(&self, request: EncryptRequest<'_>) -> Result<MessageKit, SdkError>;
    async fn decrypt(&self, request: DecryptRequest<'_>) -> Result<Vec<u8>, SdkError>;
}

/// Conditions of a message kit plus the signers that satisfy its
/// context parameters.
#[derive(Clone)]
pub struct ConditionContext {
    conditions: ConditionDocument,
    auth_providers: BTreeMap<String, Arc<dyn Signer>>,
}

impl fmt::Debug for ConditionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionContext")
            .field("conditions", &self.conditions)
            .field("auth_providers", &self.auth_providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ConditionContext {
    pub fn from_message_kit(kit: &MessageKit) -> Result<Self, CiphertextError> {
        Ok(Self {
            conditions: kit.conditions()?,
            auth_providers: BTreeMap::new(),
        })
    }

    pub fn conditions(&self) -> &ConditionDocument {
        &self.conditions
    }

    pub fn add_auth_provider(&mut self, parameter: &str, signer: Arc<dyn Signer>) {
        self.auth_providers.insert(parameter.to_string(), signer);
    }

    pub fn auth_provider(&self, parameter: &str) -> Option<&Arc<dyn Signer>> {
        self.auth_providers.get(parameter)
    }

    /// Every context placeholder the conditions reference.
    pub fn required_parameters(&self) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        self.conditions.context_parameters(&mut found);
        found
    }

    /// Placeholders with no signer registered for them.
    pub fn missing_parameters(&self) -> BTreeSet<String> {
        self.required_parameters()
            .into_iter()
            .filter(|p| !self.auth_providers.contains_key(p))
            .collect()
    }
}
