//! Property tests for fee arithmetic: builder totals, fee-bump totals and
//! re-assembly never double-counting a resource fee.

use proptest::prelude::*;

use lumen_sdk::rpc::{assemble_transaction, SimulateTransactionResponse};
use lumen_sdk::transaction::soroban;
use lumen_sdk::xdr::{Limits, WriteXdr};
use lumen_sdk::{
    Account, FeeBumpTransaction, Keypair, Network, Operation, Transaction, TransactionBuilder,
    ValidationError,
};

fn build(base_fee: u32, ops: usize) -> Result<Transaction, ValidationError> {
    let source = Keypair::from_raw_seed(&[21u8; 32]);
    let account = Account::new(&source.account_id(), 1).unwrap();
    TransactionBuilder::new(&account, &Network::testnet())
        .base_fee(base_fee)
        .add_operations((0..ops).map(|i| Operation::bump_sequence(i as i64)))
        .build()
}

fn restore_tx(base_fee: u32) -> Transaction {
    let source = Keypair::from_raw_seed(&[22u8; 32]);
    let account = Account::new(&source.account_id(), 1).unwrap();
    TransactionBuilder::new(&account, &Network::testnet())
        .base_fee(base_fee)
        .add_operation(Operation::restore_footprint())
        .build()
        .unwrap()
}

fn simulation(resource_fee: i64) -> SimulateTransactionResponse {
    SimulateTransactionResponse {
        min_resource_fee: Some(resource_fee),
        transaction_data: Some(
            soroban::transaction_data(soroban::resources(0, 0, 0), resource_fee)
                .to_xdr_base64(Limits::none())
                .unwrap(),
        ),
        ..Default::default()
    }
}

fn fee_source() -> String {
    Keypair::from_raw_seed(&[23u8; 32]).account_id()
}

proptest! {
    #[test]
    fn built_fee_is_base_times_operations(base_fee in 100u32..1_000_000, ops in 1usize..=100) {
        let tx = build(base_fee, ops).unwrap();
        prop_assert_eq!(u64::from(tx.fee()), u64::from(base_fee) * ops as u64);
    }

    #[test]
    fn oversized_totals_are_rejected(base_fee in 50_000_000u32..=u32::MAX, ops in 90usize..=100) {
        let result = build(base_fee, ops);
        prop_assert!(matches!(result, Err(ValidationError::FeeOverflow(_))), "{:?}", result);
    }

    #[test]
    fn fee_bump_total(inner_base in 100u32..10_000, extra in 0i64..10_000, ops in 1usize..=100) {
        let inner = build(inner_base, ops).unwrap();
        let base_fee = i64::from(inner_base) + extra;
        let bump = FeeBumpTransaction::with_base_fee(&fee_source(), base_fee, inner).unwrap();
        prop_assert_eq!(bump.fee(), base_fee * (ops as i64 + 1));
    }

    #[test]
    fn fee_bump_below_inner_rate_fails(inner_base in 200u32..10_000, cut in 1u32..100) {
        let inner = build(inner_base, 3).unwrap();
        let base_fee = i64::from(inner_base - cut);
        let result = FeeBumpTransaction::with_base_fee(&fee_source(), base_fee, inner);
        let is_below_rate = matches!(result, Err(ValidationError::BaseFeeBelowInnerRate { .. }));
        prop_assert!(is_below_rate);
    }

    #[test]
    fn reassembly_counts_only_latest_resource_fee(
        base_fee in 100u32..10_000,
        r1 in 0i64..1_000_000,
        r2 in 0i64..1_000_000,
    ) {
        let tx = restore_tx(base_fee);
        let once = assemble_transaction(&tx, &simulation(r1)).unwrap();
        let twice = assemble_transaction(&once, &simulation(r2)).unwrap();
        prop_assert_eq!(i64::from(once.fee()), i64::from(base_fee) + r1);
        prop_assert_eq!(i64::from(twice.fee()), i64::from(base_fee) + r2);
    }
}
