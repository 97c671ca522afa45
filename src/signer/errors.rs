use thiserror::Error;

/// Errors raised while loading the signing key
#[derive(Debug, Error)]
pub enum SignerError {
    /// Invalid private key format
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// The keystore file could not be read
    #[error("Failed to read keystore {path}: {reason}")]
    KeystoreUnreadable {
        /// Keystore location
        path: String,
        /// Underlying I/O or JSON error
        reason: String,
    },

    /// The keystore uses a format this loader does not handle
    #[error("Unsupported keystore: {0}")]
    UnsupportedKeystore(String),

    /// MAC check failed
    #[error("MAC verification failed: wrong password or corrupted keystore")]
    MacMismatch,
}
