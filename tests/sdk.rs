//! Tests for the encrypt/decrypt sessions against mock collaborators.
mod common;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use common::*;
use std::sync::atomic::Ordering;
use taco_blocks::condition::{ReturnValueTest, TimeCondition, USER_ADDRESS};
use taco_blocks::prelude::*;
use taco_blocks::sdk::{ConditionContext, NetworkCheck, connect};
use tokio_test::block_on;

const THRESHOLD_FAILURE: &str = r#"Threshold of responses not met; TACo decryption failed with errors: {"0xNodeA": "ThresholdDecryptionRequestFailed('Node 0xNodeA raised Decryption conditions not satisfied') <class 'nucypher.policy.conditions.exceptions.ConditionsNotSatisfied'>", "0xNodeB": "ThresholdDecryptionRequestFailed('Node 0xNodeB raised Decryption conditions not satisfied') <class 'nucypher.policy.conditions.exceptions.ConditionsNotSatisfied'>"}"#;

fn time_lock(chain: u64) -> ConditionDocument {
    ConditionDocument::Time(TimeCondition::new(
        chain,
        ReturnValueTest::new(Comparator::GreaterThanOrEqual, 1_750_000_000u64),
    ))
}

#[test]
fn test_encrypt_then_decrypt() {
    init_tracing();
    let client = MockClient::default();
    let wallet = MockWallet::on_chain(80002);
    let settings = Settings::default();
    let document = time_lock(80002);

    let encrypted = block_on(EncryptPanel::new().encrypt(
        &client,
        &wallet,
        &settings,
        "hello threshold",
        Some(&document),
    ))
    .expect("encrypts");
    assert_eq!(encrypted.message_kit.capsule, 6u32.to_be_bytes().to_vec());
    assert_eq!(encrypted.message_kit.conditions().expect("conditions"), document);

    let mut panel = DecryptPanel::new();
    panel.set_ciphertext(&encrypted.ciphertext);
    assert!(panel.can_decrypt());
    assert_eq!(panel.status(), None);
    assert_eq!(panel.conditions(), Some(document));

    let plaintext = block_on(panel.decrypt(&client, &wallet, &settings)).expect("decrypts");
    assert_eq!(plaintext, "hello threshold");
    assert_eq!(client.decrypt_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_malformed_ciphertext_disables_decrypt() {
    let mut panel = DecryptPanel::new();
    let kit = MessageKit::new(vec![1], vec![2], &time_lock(1));
    panel.load(kit, "previous");
    assert!(panel.can_decrypt());

    let not_a_kit = STANDARD.encode("not json either");
    for input in ["%%% not base64 %%%", not_a_kit.as_str()] {
        panel.set_ciphertext(input);
        assert!(panel.message_kit().is_none());
        assert!(!panel.can_decrypt());
        assert_eq!(panel.status(), Some("Invalid ciphertext format"));
        assert_eq!(panel.input(), input);
    }

    let client = MockClient::default();
    let result = block_on(panel.decrypt(
        &client,
        &MockWallet::on_chain(80002),
        &Settings::default(),
    ));
    assert_eq!(result, Err(SessionError::NoMessageKit));
    assert_eq!(client.decrypt_calls.load(Ordering::SeqCst), 0);

    panel.set_ciphertext("   ");
    assert_eq!(panel.status(), None);
    panel.clear();
    assert!(panel.input().is_empty());
}

#[test]
fn test_encrypt_requires_message_and_condition() {
    let panel = EncryptPanel::new();
    let client = MockClient::default();
    let wallet = MockWallet::on_chain(80002);
    let settings = Settings::default();
    let document = time_lock(1);

    assert!(!panel.can_encrypt("", Some(&document)));
    assert!(!panel.can_encrypt("hi", None));
    assert!(panel.can_encrypt("hi", Some(&document)));

    for (plaintext, doc) in [("", Some(&document)), ("hi", None)] {
        assert_eq!(
            block_on(panel.encrypt(&client, &wallet, &settings, plaintext, doc)),
            Err(SessionError::NothingToEncrypt)
        );
    }
    assert_eq!(client.encrypt_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_invalid_condition_blocks_encrypt() {
    let client = MockClient::default();
    let panel = EncryptPanel::new();
    let empty_or = ConditionDocument::compound(Operator::Or, vec![]);
    assert!(!panel.can_encrypt("secret", Some(&empty_or)));
    assert!(!panel.can_encrypt("secret", Some(&time_lock(999))));

    let result = block_on(panel.encrypt(
        &client,
        &MockWallet::on_chain(80002),
        &Settings::default(),
        "secret",
        Some(&empty_or),
    ));
    assert_eq!(
        result,
        Err(SessionError::ValidationFailed(ValidationError::EmptyOperands))
    );
    assert_eq!(client.encrypt_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_second_submission_is_rejected_while_busy() {
    let panel = EncryptPanel::new();
    let document = time_lock(1);
    let guard = panel.trigger().try_acquire().expect("trigger is free");
    assert!(!panel.can_encrypt("hi", Some(&document)));

    let result = block_on(panel.encrypt(
        &MockClient::default(),
        &MockWallet::on_chain(80002),
        &Settings::default(),
        "hi",
        Some(&document),
    ));
    assert_eq!(result, Err(SessionError::Busy));

    drop(guard);
    assert!(!panel.trigger().is_busy());
    assert!(panel.can_encrypt("hi", Some(&document)));
}

#[test]
fn test_wallet_failures_surface() {
    let client = MockClient::default();
    let settings = Settings::default();
    let document = time_lock(1);
    let panel = EncryptPanel::new();

    let result = block_on(panel.encrypt(
        &client,
        &MockWallet::missing(),
        &settings,
        "hi",
        Some(&document),
    ));
    assert_eq!(result, Err(SessionError::Wallet(WalletError::Unavailable)));

    let empty = MockWallet {
        accounts: Vec::new(),
        ..MockWallet::on_chain(80002)
    };
    assert!(matches!(
        block_on(connect(&empty)),
        Err(WalletError::NoAccounts)
    ));
    assert!(!panel.trigger().is_busy());
}

#[test]
fn test_network_check_and_switch() {
    let wallet = MockWallet::on_chain(1);
    let check = NetworkCheck::from_settings(&Settings::default());
    assert_eq!(check.expected_name(), "Polygon Amoy");

    assert_eq!(
        block_on(check.check(&wallet)),
        Err(WalletError::WrongNetwork {
            expected: 80002,
            actual: 1
        })
    );
    block_on(check.switch(&wallet)).expect("wallet switches");
    assert_eq!(block_on(check.check(&wallet)), Ok(()));
}

#[test]
fn test_threshold_failure_is_summarized() {
    init_tracing();
    let client = MockClient::failing(THRESHOLD_FAILURE);
    let kit = MessageKit::new(vec![1], b"data".to_vec(), &time_lock(1));
    let mut panel = DecryptPanel::new();
    panel.set_ciphertext(&kit.to_base64().expect("kit encodes"));

    let err = block_on(panel.decrypt(
        &client,
        &MockWallet::on_chain(80002),
        &Settings::default(),
    ))
    .expect_err("decrypt fails");
    assert_eq!(
        err.to_string(),
        "Decryption failed: threshold of responses not met\n- Decryption conditions not satisfied: 0xNodeA, 0xNodeB"
    );
    match err {
        SessionError::SdkCallFailed(failure) => {
            assert_eq!(failure.node_errors.len(), 2);
            assert_eq!(failure.node_errors[1].error_type, "ConditionsNotSatisfied");
        }
        other => panic!("expected SdkCallFailed, got {:?}", other),
    }

    let plain = MockClient::failing("user rejected the request");
    let err = block_on(EncryptPanel::new().encrypt(
        &plain,
        &MockWallet::on_chain(80002),
        &Settings::default(),
        "hi",
        Some(&time_lock(1)),
    ))
    .expect_err("encrypt fails");
    assert_eq!(err.to_string(), "user rejected the request");
}

#[test]
fn test_condition_context_parameters() {
    let document = ConditionDocument::compound(
        Operator::And,
        vec![
            time_lock(1),
            ConditionDocument::from_json(
                r#"{"conditionType":"rpc","chain":1,"method":"eth_getBalance","parameters":[":userAddress","latest"],"returnValueTest":{"comparator":">=","value":0}}"#,
            )
            .expect("rpc parses"),
        ],
    );
    let kit = MessageKit::new(Vec::new(), Vec::new(), &document);
    let mut context = ConditionContext::from_message_kit(&kit).expect("context builds");
    assert_eq!(
        context.required_parameters().into_iter().collect::<Vec<_>>(),
        vec![USER_ADDRESS.to_string()]
    );
    assert_eq!(context.missing_parameters().len(), 1);

    let wallet = MockWallet::on_chain(1);
    let connected = block_on(connect(&wallet)).expect("wallet connects");
    assert_eq!(connected.account, USER);
    context.add_auth_provider(USER_ADDRESS, connected.signer.clone());
    assert!(context.missing_parameters().is_empty());
    assert_eq!(
        context.auth_provider(USER_ADDRESS).map(|s| s.address().to_string()),
        Some(USER.to_string())
    );
}

#[test]
fn test_domain_selects_ritual() {
    let client = MockClient::default();
    let settings = Settings::default().with_domain(Domain::Devnet);
    let encrypted = block_on(EncryptPanel::new().encrypt(
        &client,
        &MockWallet::on_chain(80002),
        &settings,
        "hi",
        Some(&time_lock(80002)),
    ))
    .expect("encrypts");
    assert_eq!(encrypted.message_kit.capsule, 27u32.to_be_bytes().to_vec());
}
