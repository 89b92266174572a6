use crate::utils::IsTransient;

// ============================================================================
// Store Errors
// ============================================================================
//
// A missing key is never an error: lookups return `Ok(None)` so callers can
// treat a key that vanished between scan and read as a benign race.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store backend unavailable: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("Record under {key} could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record under {key} could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Malformed payloads will not fix themselves on the next tick.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, StoreError::Decode { .. } | StoreError::Encode { .. })
    }
}

impl IsTransient for StoreError {
    fn is_transient(&self) -> bool {
        match self {
            StoreError::Backend(e) => {
                e.is_io_error() || e.is_timeout() || e.is_connection_dropped() || e.is_connection_refusal()
            }
            StoreError::Decode { .. } | StoreError::Encode { .. } => false,
        }
    }
}

pub(crate) fn encode<T: serde::Serialize>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })
}
