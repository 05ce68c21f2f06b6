use crate::condition::ConditionDocument;
use crate::error::CiphertextError;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use bincode::config::Config;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Upper bound on a decoded kit, so garbage input cannot request huge buffers.
const MAX_KIT_BYTES: usize = 16 * 1024 * 1024;

fn wire_config() -> impl Config {
    bincode::config::standard().with_limit::<MAX_KIT_BYTES>()
}

/// Encrypted payload plus the conditions that gate its decryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageKit {
    pub capsule: Vec<u8>,
    pub ciphertext: Vec<u8>,
    conditions: String,
}

/// Alternate JSON encoding with the conditions embedded as an object.
#[derive(Deserialize)]
struct JsonMessageKit {
    capsule: Vec<u8>,
    ciphertext: Vec<u8>,
    conditions: Value,
}

impl MessageKit {
    pub fn new(capsule: Vec<u8>, ciphertext: Vec<u8>, conditions: &ConditionDocument) -> Self {
        Self {
            capsule,
            ciphertext,
            conditions: conditions.to_canonical_json(),
        }
    }

    pub fn conditions_json(&self) -> &str {
        &self.conditions
    }

    pub fn conditions(&self) -> Result<ConditionDocument, CiphertextError> {
        ConditionDocument::from_json(&self.conditions).map_err(|_| CiphertextError::InvalidFormat)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CiphertextError> {
        bincode::serde::encode_to_vec(self, wire_config())
            .map_err(|e| CiphertextError::Encode(e.to_string()))
    }

    /// Decodes the binary form, falling back to the JSON form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CiphertextError> {
        if let Ok((kit, read)) =
            bincode::serde::decode_from_slice::<MessageKit, _>(bytes, wire_config())
        {
            if read == bytes.len() && kit.conditions().is_ok() {
                return Ok(kit);
            }
        }
        let kit = Self::from_json_bytes(bytes)?;
        kit.conditions()?;
        Ok(kit)
    }

    fn from_json_bytes(bytes: &[u8]) -> Result<Self, CiphertextError> {
        let kit: JsonMessageKit = serde_json::from_slice(bytes).map_err(|e| {
            debug!(error = %e, "ciphertext is neither a binary nor a JSON kit");
            CiphertextError::InvalidFormat
        })?;
        let conditions = match kit.conditions {
            Value::String(text) => text,
            other => other.to_string(),
        };
        Ok(Self {
            capsule: kit.capsule,
            ciphertext: kit.ciphertext,
            conditions,
        })
    }

    pub fn to_base64(&self) -> Result<String, CiphertextError> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }

    pub fn from_base64(text: &str) -> Result<Self, CiphertextError> {
        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|_| CiphertextError::InvalidFormat)?;
        Self::from_bytes(&bytes)
    }
}
