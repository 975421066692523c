//! Wallet signing capability
//!
//! Every wallet shape (local keypair, remote or hardware signer) adapts to
//! the same explicit capability: expose a public identity and sign a whole
//! transaction. The SDK never probes wallets for optional methods.

use crate::{Result, SdkError};
use async_trait::async_trait;
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer, transaction::Transaction};

/// Polymorphic signing capability over wallet shapes.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Public identity of the wallet.
    fn public_identity(&self) -> Pubkey;

    /// Sign the transaction and return it. The transaction's fee payer and
    /// recent blockhash are already set by the caller.
    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction>;
}

/// Local keypair wallet; signs in-process.
pub struct KeypairWallet {
    keypair: Keypair,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl TransactionSigner for KeypairWallet {
    fn public_identity(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction> {
        let blockhash = tx.message.recent_blockhash;
        tx.try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| SdkError::Validation(format!("failed to sign transaction: {e}")))?;
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{system_instruction, hash::Hash};

    #[tokio::test]
    async fn test_keypair_wallet_signs_as_fee_payer() {
        let keypair = Keypair::new();
        let payer = keypair.pubkey();
        let wallet = KeypairWallet::new(keypair);

        let ix = system_instruction::transfer(&payer, &Pubkey::new_unique(), 1_000);
        let mut tx = Transaction::new_with_payer(&[ix], Some(&payer));
        tx.message.recent_blockhash = Hash::new_unique();

        let signed = wallet.sign_transaction(tx).await.unwrap();
        assert!(signed.is_signed());
        signed.verify().unwrap();
    }

    // External-signer shape: any adapter implementing the capability works,
    // no keypair required on this side of the seam.
    struct RecordingSigner {
        identity: Pubkey,
    }

    #[async_trait]
    impl TransactionSigner for RecordingSigner {
        fn public_identity(&self) -> Pubkey {
            self.identity
        }

        async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction> {
            Ok(tx)
        }
    }

    #[tokio::test]
    async fn test_external_signer_shape() {
        let signer = RecordingSigner {
            identity: Pubkey::new_unique(),
        };
        let boxed: std::sync::Arc<dyn TransactionSigner> = std::sync::Arc::new(signer);

        let tx = Transaction::new_with_payer(&[], Some(&boxed.public_identity()));
        let returned = boxed.sign_transaction(tx).await.unwrap();
        assert_eq!(
            returned.message.account_keys[0],
            boxed.public_identity()
        );
    }
}
