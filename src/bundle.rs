//! Bundle construction: grouping, compute budget and tip decoration
//!
//! Grouping is simple contiguous chunking, not cost-optimal bin packing:
//! instruction order is preserved and every chunk except possibly the last
//! has exactly the requested size.

use serde::Serialize;
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction, hash::Hash, instruction::Instruction,
    pubkey::Pubkey, signature::Keypair, system_instruction, transaction::Transaction,
};

/// Compute unit limit attached to every bundled transaction.
pub const COMPUTE_UNIT_LIMIT: u32 = 200_000;

/// Compute unit price (priority fee) used when a transaction sets none.
pub const DEFAULT_PRIORITY_FEE: u64 = 1_000;

/// Base ledger fee per transaction, lamports.
pub const BASE_FEE_PER_TX: u64 = 5_000;

/// Network average priority fee assumed when the fee query fails.
pub const FALLBACK_AVERAGE_FEE: u64 = 1_000;

/// Minimum recommended tip, lamports.
pub const MIN_TIP_LAMPORTS: u64 = 10_000;

/// One member of a bundle before preparation: the instructions it will carry,
/// any extra per-transaction signers, and an optional priority fee override.
pub struct BundleTransaction {
    pub instructions: Vec<Instruction>,
    pub signers: Vec<Keypair>,
    pub priority_fee: Option<u64>,
}

impl BundleTransaction {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            signers: Vec::new(),
            priority_fee: None,
        }
    }
}

/// Lifecycle state of a submitted bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleStatus {
    Pending,
    Confirmed,
    Failed,
    Timeout,
}

impl std::fmt::Display for BundleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BundleStatus::Pending => write!(f, "pending"),
            BundleStatus::Confirmed => write!(f, "confirmed"),
            BundleStatus::Failed => write!(f, "failed"),
            BundleStatus::Timeout => write!(f, "timeout"),
        }
    }
}

/// Tracking record for one submitted bundle. Lives in the pending table until
/// a terminal status is reached, then moves to history under that status.
#[derive(Debug, Clone, Serialize)]
pub struct BundleRecord {
    pub bundle_id: String,
    pub transactions: Vec<String>,
    pub status: BundleStatus,
    pub submitted_at: i64,
    pub confirmation_time: Option<f64>,
    pub block_height: Option<u64>,
}

/// Aggregate outcome counters over bundle history.
#[derive(Debug, Clone, Default)]
pub struct BundleStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
}

/// Snapshot returned by `BundleRelayClient::statistics`.
#[derive(Debug, Clone, Serialize)]
pub struct BundleStatistics {
    pub total_bundles: u64,
    pub successful_bundles: u64,
    pub failed_bundles: u64,
    pub success_rate: f64,
    pub average_confirmation_time: f64,
    pub pending_bundles: usize,
    pub recent_bundles: usize,
    pub last_updated: i64,
}

/// Fee estimate breakdown. Advisory only: producing one never fails, a
/// degraded estimate carries the underlying error instead.
#[derive(Debug, Clone, Serialize)]
pub struct FeeEstimate {
    pub base_fee: u64,
    pub priority_fee: u64,
    pub recommended_tip: u64,
    pub total_estimated: u64,
    pub priority_level: String,
    pub transaction_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Multiplier for a named priority level; unrecognized levels fall back to
/// medium.
pub fn priority_multiplier(level: &str) -> f64 {
    match level {
        "low" => 1.0,
        "medium" => 2.0,
        "high" => 5.0,
        _ => 2.0,
    }
}

/// Partition instructions into contiguous chunks of at most
/// `max_per_transaction`, preserving relative order.
pub fn group_instructions(
    instructions: Vec<Instruction>,
    max_per_transaction: usize,
) -> Vec<Vec<Instruction>> {
    let chunk = max_per_transaction.max(1);
    let mut groups = Vec::with_capacity(instructions.len().div_ceil(chunk));
    let mut current = Vec::with_capacity(chunk);

    for instruction in instructions {
        current.push(instruction);
        if current.len() == chunk {
            groups.push(std::mem::replace(&mut current, Vec::with_capacity(chunk)));
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Assemble one prepared (still unsigned) bundle member: compute budget
/// instructions first, then the member's own instructions, then the tip
/// transfer when this is the last transaction of the bundle.
pub fn decorate_transaction(
    member: &BundleTransaction,
    fee_payer: &Pubkey,
    recent_blockhash: Hash,
    tip: Option<(Pubkey, u64)>,
) -> Transaction {
    let mut instructions = vec![
        ComputeBudgetInstruction::set_compute_unit_limit(COMPUTE_UNIT_LIMIT),
        ComputeBudgetInstruction::set_compute_unit_price(
            member.priority_fee.unwrap_or(DEFAULT_PRIORITY_FEE),
        ),
    ];
    instructions.extend(member.instructions.iter().cloned());

    if let Some((tip_account, lamports)) = tip {
        instructions.push(system_instruction::transfer(
            fee_payer,
            &tip_account,
            lamports,
        ));
    }

    let mut tx = Transaction::new_with_payer(&instructions, Some(fee_payer));
    tx.message.recent_blockhash = recent_blockhash;
    tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use solana_sdk::compute_budget;

    fn noop_instruction(tag: u8) -> Instruction {
        Instruction {
            program_id: Pubkey::new_unique(),
            accounts: vec![],
            data: vec![tag],
        }
    }

    #[test]
    fn test_grouping_chunk_sizes() {
        let instructions: Vec<_> = (0..7).map(noop_instruction).collect();
        let groups = group_instructions(instructions, 3);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[1].len(), 3);
        assert_eq!(groups[2].len(), 1);
    }

    #[test]
    fn test_grouping_empty_input() {
        assert!(group_instructions(vec![], 3).is_empty());
    }

    #[test]
    fn test_grouping_zero_chunk_treated_as_one() {
        let groups = group_instructions(vec![noop_instruction(0), noop_instruction(1)], 0);
        assert_eq!(groups.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_grouping_preserves_order_and_bounds(len in 0usize..40, chunk in 1usize..8) {
            let instructions: Vec<_> = (0..len).map(|i| noop_instruction(i as u8)).collect();
            let groups = group_instructions(instructions.clone(), chunk);

            prop_assert_eq!(groups.len(), len.div_ceil(chunk));

            let flattened: Vec<u8> = groups
                .iter()
                .flatten()
                .map(|ix| ix.data[0])
                .collect();
            let original: Vec<u8> = instructions.iter().map(|ix| ix.data[0]).collect();
            prop_assert_eq!(flattened, original);

            for (i, group) in groups.iter().enumerate() {
                if i + 1 < groups.len() {
                    prop_assert_eq!(group.len(), chunk);
                } else {
                    prop_assert!(group.len() <= chunk);
                }
            }
        }
    }

    #[test]
    fn test_priority_multipliers() {
        assert_eq!(priority_multiplier("low"), 1.0);
        assert_eq!(priority_multiplier("medium"), 2.0);
        assert_eq!(priority_multiplier("high"), 5.0);
        assert_eq!(priority_multiplier("turbo"), 2.0);
    }

    #[test]
    fn test_decoration_prepends_compute_budget() {
        let payer = Pubkey::new_unique();
        let member = BundleTransaction::new(vec![noop_instruction(7)]);
        let tx = decorate_transaction(&member, &payer, Hash::new_unique(), None);

        assert_eq!(tx.message.instructions.len(), 3);
        let keys = &tx.message.account_keys;
        assert_eq!(*tx.message.instructions[0].program_id(keys), compute_budget::ID);
        assert_eq!(*tx.message.instructions[1].program_id(keys), compute_budget::ID);
        assert_eq!(tx.message.account_keys[0], payer);
    }

    #[test]
    fn test_decoration_appends_tip_last() {
        let payer = Pubkey::new_unique();
        let tip_account = Pubkey::new_unique();
        let member = BundleTransaction::new(vec![noop_instruction(1), noop_instruction(2)]);
        let tx = decorate_transaction(
            &member,
            &payer,
            Hash::new_unique(),
            Some((tip_account, 10_000)),
        );

        // cu limit + cu price + 2 member instructions + tip transfer
        assert_eq!(tx.message.instructions.len(), 5);
        let keys = &tx.message.account_keys;
        let last = tx.message.instructions.last().unwrap();
        assert_eq!(*last.program_id(keys), solana_sdk::system_program::ID);
        assert!(keys.contains(&tip_account));
    }

    #[test]
    fn test_priority_fee_override() {
        let payer = Pubkey::new_unique();
        let mut member = BundleTransaction::new(vec![]);
        member.priority_fee = Some(9_999);
        let tx = decorate_transaction(&member, &payer, Hash::new_unique(), None);

        let expected = ComputeBudgetInstruction::set_compute_unit_price(9_999);
        assert_eq!(tx.message.instructions[1].data, expected.data);
    }
}
