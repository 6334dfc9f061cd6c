//! Uploader identity.
//!
//! Every catalog record is attributed to the identity that performed the
//! write. The daemon holds one Ed25519 keypair on disk; its public key,
//! rendered as `ed25519p/<hex>`, is the `author` field of every record it
//! writes, and the same key signs per-request upload credentials for the
//! content store.

use std::fs;
use std::path::{Path, PathBuf};

use ed25519_dalek::{Signer, SigningKey, SECRET_KEY_LENGTH};
use thiserror::Error;

/// Identity errors.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no identity key at {0}. Run 'curator init' first.")]
    NoKey(PathBuf),

    #[error("invalid identity key: expected {expected} bytes, got {actual}")]
    InvalidKey { expected: usize, actual: usize },

    #[error("identity key already exists at {0}. Delete it first to regenerate.")]
    KeyExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Credentials authorizing a single store upload.
///
/// The signature covers `"{timestamp}:UPLOAD"`, the format the content
/// store's write endpoint verifies.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Public key in `ed25519p/<hex>` format.
    pub pubkey: String,
    /// Unix timestamp the signature was created at.
    pub timestamp: u64,
    /// Hex-encoded signature over `"{timestamp}:UPLOAD"`.
    pub signature: String,
}

/// The node's signing identity.
#[derive(Clone)]
pub struct Identity {
    signing_key: SigningKey,
}

impl Identity {
    /// Load the keypair from disk.
    pub fn load(path: &Path) -> Result<Self, IdentityError> {
        if !path.exists() {
            return Err(IdentityError::NoKey(path.to_path_buf()));
        }

        let key_bytes = fs::read(path)?;
        if key_bytes.len() != SECRET_KEY_LENGTH {
            return Err(IdentityError::InvalidKey {
                expected: SECRET_KEY_LENGTH,
                actual: key_bytes.len(),
            });
        }

        let mut secret = [0u8; SECRET_KEY_LENGTH];
        secret.copy_from_slice(&key_bytes);
        Ok(Self {
            signing_key: SigningKey::from_bytes(&secret),
        })
    }

    /// Generate a fresh keypair and write it to disk.
    pub fn init(path: &Path) -> Result<Self, IdentityError> {
        if path.exists() {
            return Err(IdentityError::KeyExists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut csprng = rand::rngs::OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        fs::write(path, signing_key.to_bytes())?;

        // Key material is secret; owner-only on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(Self { signing_key })
    }

    /// The public identity string, `ed25519p/<hex>`.
    ///
    /// This is the `author` value attributed to every record this node
    /// writes.
    pub fn public_key(&self) -> String {
        let verifying_key = self.signing_key.verifying_key();
        format!("ed25519p/{}", hex::encode(verifying_key.to_bytes()))
    }

    /// Sign fresh upload credentials for the content store.
    pub fn credentials(&self) -> Credentials {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let message = format!("{timestamp}:UPLOAD");
        let signature = self.signing_key.sign(message.as_bytes());

        Credentials {
            pubkey: self.public_key(),
            timestamp,
            signature: hex::encode(signature.to_bytes()),
        }
    }
}

/// Default key location within a data directory.
pub fn key_path(data_dir: &Path) -> PathBuf {
    data_dir.join("identity.key")
}
