//! End-to-end tests for the Lumen SDK's offline path.
//!
//! These exercise the full life of a transaction short of the network:
//! key handling, building, signing (single and multi-party), fee bumping,
//! and the envelope round trip a wallet or RPC node would see.
//!
//! Each test stands alone with its own keys. No shared state.

use lumen_sdk::transaction::{
    asset, parse_signer_key, sign_transaction, Memo, TransactionEnvelope,
};
use lumen_sdk::{
    Account, Envelope, Error, FeeBumpTransaction, Keypair, Network, Operation, Transaction,
    TransactionBuilder, ValidationError,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const SEQUENCE: i64 = 2_908_908_335_136_768;

fn payment_tx(source: &Keypair, sequence: i64) -> Transaction {
    let dest = Keypair::from_raw_seed(&[42u8; 32]);
    let account = Account::new(&source.account_id(), sequence).unwrap();
    TransactionBuilder::new(&account, &Network::testnet())
        .add_operation(Operation::payment(&dest.account_id(), asset::native(), 10_000_000).unwrap())
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// 1. Build and Sign
// ---------------------------------------------------------------------------

#[test]
fn single_payment_build_and_sign() {
    let source = Keypair::random();
    let mut tx = payment_tx(&source, SEQUENCE);

    assert_eq!(tx.fee(), 100);
    assert_eq!(tx.sequence_number(), SEQUENCE + 1);
    assert!(!tx.is_signed());

    sign_transaction(&mut tx, &source).unwrap();

    assert_eq!(tx.signatures().len(), 1);
    let pk = source.public_key();
    assert_eq!(&tx.signatures()[0].hint.0[..], &pk.as_bytes()[28..]);
    assert_eq!(tx.fee(), 100);
    assert_eq!(tx.sequence_number(), SEQUENCE + 1);
}

#[test]
fn signature_verifies_against_hash() {
    let source = Keypair::random();
    let mut tx = payment_tx(&source, SEQUENCE);
    tx.sign(&source).unwrap();

    let sig = lumen_sdk::crypto::Signature::try_from_slice(&tx.signatures()[0].signature.0).unwrap();
    assert!(source.public_key().verify(&tx.hash().unwrap(), &sig));
}

// ---------------------------------------------------------------------------
// 2. Fee Bump
// ---------------------------------------------------------------------------

#[test]
fn fee_bump_over_signed_payment() {
    let source = Keypair::random();
    let payer = Keypair::random();
    let mut tx = payment_tx(&source, SEQUENCE);
    tx.sign(&source).unwrap();
    let inner_hash = tx.hash().unwrap();

    let mut bump = FeeBumpTransaction::with_base_fee(&payer.account_id(), 200, tx).unwrap();
    assert_eq!(bump.fee(), 400);

    bump.sign(&payer).unwrap();
    assert_eq!(bump.signatures().len(), 1);
    assert_eq!(bump.inner_transaction().signatures().len(), 1);
    assert_eq!(bump.inner_transaction().hash().unwrap(), inner_hash);
    assert_eq!(bump.fee_source().account_id(), payer.account_id());
}

#[test]
fn fee_bump_rejects_undercutting_base_fee() {
    let source = Keypair::random();
    let account = Account::new(&source.account_id(), 1).unwrap();
    let dest = Keypair::random().account_id();
    let tx = TransactionBuilder::new(&account, &Network::testnet())
        .base_fee(1_000)
        .add_operation(Operation::payment(&dest, asset::native(), 1).unwrap())
        .build()
        .unwrap();

    let err = FeeBumpTransaction::with_base_fee(&Keypair::random().account_id(), 500, tx)
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::BaseFeeBelowInnerRate {
            base_fee: 500,
            inner_rate: 1_000
        }
    );
}

// ---------------------------------------------------------------------------
// 3. Multi-party Signing
// ---------------------------------------------------------------------------

#[test]
fn multisig_with_external_signature() {
    let source = Keypair::random();
    let cosigner = Keypair::random();
    let mut tx = payment_tx(&source, 500);

    tx.sign(&source).unwrap();

    // The cosigner signs the hash on another machine and sends back raw bytes.
    let remote_sig = cosigner.sign(&tx.hash().unwrap());
    tx.add_signature(&cosigner.account_id(), remote_sig.as_bytes())
        .unwrap();

    assert_eq!(tx.signatures().len(), 2);
    assert_eq!(tx.signatures()[1].hint.0, cosigner.signature_hint());

    // A signature over something else is refused.
    let wrong = cosigner.sign(b"not the transaction");
    assert!(matches!(
        tx.add_signature(&cosigner.account_id(), wrong.as_bytes()),
        Err(Error::Validation(ValidationError::InvalidSignature { .. }))
    ));
    assert_eq!(tx.signatures().len(), 2);
}

#[test]
fn signature_cap_enforced() {
    let source = Keypair::random();
    let mut tx = payment_tx(&source, 500);
    for i in 0..20u8 {
        tx.sign(&Keypair::from_raw_seed(&[i; 32])).unwrap();
    }
    assert!(matches!(
        tx.sign(&source),
        Err(Error::Validation(ValidationError::TooManySignatures { max: 20 }))
    ));
}

// ---------------------------------------------------------------------------
// 4. Envelope Round Trip
// ---------------------------------------------------------------------------

#[test]
fn envelope_round_trip_keeps_hash_and_signatures() {
    let source = Keypair::random();
    let dest = Keypair::random();
    let account = Account::new(&source.account_id(), 77).unwrap();
    let mut tx = TransactionBuilder::new(&account, &Network::testnet())
        .add_operation(Operation::create_account(&dest.account_id(), 50_000_000).unwrap())
        .add_operation(Operation::manage_data("greeting", Some(&b"hello"[..])).unwrap())
        .memo(Memo::text("lumen e2e").unwrap())
        .time_bounds(0, 1_900_000_000)
        .ledger_bounds(10, 0)
        .add_extra_signer(parse_signer_key(&dest.account_id()).unwrap())
        .build()
        .unwrap();
    assert_eq!(tx.fee(), 200);
    tx.sign(&source).unwrap();

    let b64 = tx.to_envelope_xdr_base64().unwrap();
    let decoded = TransactionEnvelope::from_xdr_base64(&b64, &Network::testnet()).unwrap();

    assert!(!decoded.is_fee_bump());
    assert_eq!(decoded.hash().unwrap(), tx.hash().unwrap());
    assert_eq!(decoded.signatures(), tx.signatures());
    assert_eq!(decoded.transaction(), &tx);
    assert_eq!(decoded.to_envelope_xdr_base64().unwrap(), b64);
}

#[test]
fn fee_bump_envelope_round_trip() {
    let source = Keypair::random();
    let payer = Keypair::random();
    let mut tx = payment_tx(&source, SEQUENCE);
    tx.sign(&source).unwrap();
    let mut bump = FeeBumpTransaction::with_base_fee(&payer.account_id(), 200, tx).unwrap();
    bump.sign(&payer).unwrap();

    let decoded =
        TransactionEnvelope::from_xdr_base64(&bump.to_envelope_xdr_base64().unwrap(), &Network::testnet())
            .unwrap();
    assert!(decoded.is_fee_bump());
    assert_eq!(decoded.hash().unwrap(), bump.hash().unwrap());
    assert_eq!(decoded, TransactionEnvelope::FeeBump(bump));
}

// ---------------------------------------------------------------------------
// 5. Build-time Rejections
// ---------------------------------------------------------------------------

#[test]
fn build_rejects_before_network() {
    let source = Keypair::random();
    let account = Account::new(&source.account_id(), 1).unwrap();

    let empty = TransactionBuilder::new(&account, &Network::testnet()).build();
    assert!(matches!(
        empty,
        Err(ValidationError::OperationCount { count: 0, .. })
    ));

    let too_many = TransactionBuilder::new(&account, &Network::testnet())
        .add_operations((0..101).map(Operation::bump_sequence))
        .build();
    assert!(matches!(
        too_many,
        Err(ValidationError::OperationCount { count: 101, .. })
    ));

    assert!(matches!(
        Memo::text("this memo is definitely longer than 28 bytes"),
        Err(ValidationError::MemoTooLong { .. })
    ));

    assert!(matches!(
        Account::new("GNOTANADDRESS", 1),
        Err(ValidationError::InvalidAddress { .. })
    ));
}

#[test]
fn decode_rejects_what_build_would() {
    let source = Keypair::random();
    let tx = payment_tx(&source, SEQUENCE);
    let mut v1 = tx.to_v1_envelope().unwrap();
    v1.tx.operations = Default::default();

    let b64 = {
        use lumen_sdk::xdr::{Limits, TransactionEnvelope as WireEnvelope, WriteXdr};
        WireEnvelope::Tx(v1).to_xdr_base64(Limits::none()).unwrap()
    };
    assert!(matches!(
        TransactionEnvelope::from_xdr_base64(&b64, &Network::testnet()),
        Err(Error::Validation(ValidationError::OperationCount { count: 0, .. }))
    ));
}
