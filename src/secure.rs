//! Scoped secure memory for ephemeral key material
//!
//! Sensitive byte buffers are zeroed with volatile writes when released, so
//! session key material never outlives its credential in process memory.

use crate::{Result, SdkError};
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};
use std::sync::atomic::{compiler_fence, Ordering};

/// Byte buffer that is overwritten with zeroes on drop.
pub struct SecureBuffer {
    data: Vec<u8>,
}

impl SecureBuffer {
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Overwrite the buffer with zeroes. Called automatically on drop.
    pub fn zeroize(&mut self) {
        for byte in &mut self.data {
            // Volatile write so the wipe is not optimized away.
            unsafe {
                std::ptr::write_volatile(byte, 0);
            }
        }
        compiler_fence(Ordering::SeqCst);
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureBuffer")
            .field("len", &self.data.len())
            .field("data", &"[REDACTED]")
            .finish()
    }
}

/// Ephemeral signing keypair whose secret bytes live only in secure memory.
///
/// The public identity is kept in the clear; the 64-byte keypair encoding is
/// wiped when the owning credential is dropped. A transient [`Keypair`] is
/// rebuilt for each signing operation.
pub struct SecureKeypair {
    secret: SecureBuffer,
    pubkey: Pubkey,
}

impl SecureKeypair {
    /// Generate a fresh ephemeral keypair.
    pub fn generate() -> Self {
        let keypair = Keypair::new();
        let pubkey = keypair.pubkey();
        Self {
            secret: SecureBuffer::from_slice(&keypair.to_bytes()),
            pubkey,
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.pubkey
    }

    /// Rebuild the signing keypair from secure memory.
    pub fn signer(&self) -> Result<Keypair> {
        Keypair::from_bytes(self.secret.as_slice())
            .map_err(|_| SdkError::Validation("corrupt session key material".to_string()))
    }
}

impl std::fmt::Debug for SecureKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureKeypair")
            .field("pubkey", &self.pubkey)
            .finish()
    }
}
