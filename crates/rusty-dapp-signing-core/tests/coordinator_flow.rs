mod common;

use rusty_dapp_signing_core::{
    BatchStatus, ChainMismatchPolicy, CoordinatorConfig, CoordinatorState, DappStore,
    NetworkConfig, ProviderType, SigningCoordinator, StoreAction, StoreEvent, TransactionBatch,
    CHAIN_CHANGED_MESSAGE, MISSING_SIGNER_MESSAGE, WALLET_SIGN_SESSION,
};

use common::{logged_in_store, transfer, FakeApi, FixedClock, RecordingProvider};

fn queue(store: &mut DappStore, session_id: &str, count: usize, chain: &str) -> Vec<StoreEvent> {
    store.dispatch(StoreAction::EnqueueBatch(TransactionBatch {
        session_id: session_id.to_owned(),
        transactions: (0..count).map(|i| transfer(chain, i as u64 + 1)).collect(),
        callback_route: "/dashboard".to_owned(),
        status: BatchStatus::Pending,
    }))
}

fn coordinator() -> SigningCoordinator {
    SigningCoordinator::new(CoordinatorConfig {
        origin: "https://dapp.io".to_owned(),
        ..CoordinatorConfig::default()
    })
}

#[test]
fn nonces_start_at_the_larger_of_chain_and_local_counters() {
    let provider = RecordingProvider::new(ProviderType::Extension);
    let mut store = logged_in_store(provider.clone(), 7);
    let api = FakeApi::with_nonce(5);
    let mut coord = coordinator();

    for event in queue(&mut store, "s-1", 3, "D") {
        coord.process_event(&mut store, &event, &api);
    }

    let batch = store.transactions_to_sign().expect("batch still pending");
    let nonces: Vec<u64> = batch.transactions.iter().map(|t| t.nonce).collect();
    assert_eq!(nonces, vec![7, 8, 9]);
    let values: Vec<String> = batch.transactions.iter().map(|t| t.value.to_string()).collect();
    assert_eq!(values, vec!["1", "2", "3"]);
    assert!(coord.modal_visible(&store));
    assert_eq!(coord.state(), CoordinatorState::AwaitingSignature);
    assert_eq!(coord.summaries().len(), 3);
    assert!(provider.calls().is_empty(), "modal providers sign on user action");
}

#[test]
fn missing_signer_shows_fixed_message_without_signing() {
    let mut store = DappStore::new(NetworkConfig::devnet());
    let api = FakeApi::with_nonce(0);
    let mut coord = coordinator();

    for event in queue(&mut store, "abc", 1, "D") {
        coord.process_event(&mut store, &event, &api);
    }

    assert!(coord.modal_visible(&store));
    assert_eq!(coord.error(), Some(MISSING_SIGNER_MESSAGE));
    assert_eq!(coord.state(), CoordinatorState::AwaitingSignature);
    assert_eq!(coord.sign_props().session_id, "abc");
    assert_eq!(coord.sign_props().provider_type, None);
    assert!(api.account_calls.lock().expect("calls").is_empty());
    assert_eq!(store.batch_status("abc"), Some(BatchStatus::Pending));
}

#[test]
fn web_wallet_redirects_with_encoded_session_callback() {
    let provider = RecordingProvider::new(ProviderType::Wallet);
    let mut store = logged_in_store(provider.clone(), 0);
    let api = FakeApi::with_nonce(3);
    let mut coord = coordinator();

    for event in queue(&mut store, "1700000000000", 2, "D") {
        coord.process_event(&mut store, &event, &api);
    }

    assert!(!coord.modal_visible(&store));
    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    let callback = calls[0].options.callback_url.clone().expect("callback url");
    assert_eq!(
        callback,
        urlencoding::encode("https://dapp.io/dashboard?signSession=1700000000000").into_owned()
    );
    assert!(callback.contains(&format!("{WALLET_SIGN_SESSION}%3D1700000000000")));
    assert_eq!(
        calls[0].transactions.iter().map(|t| t.nonce).collect::<Vec<_>>(),
        vec![3, 4]
    );
    assert!(coord.last_redirect().is_some());
    assert_eq!(store.batch_status("1700000000000"), Some(BatchStatus::Pending));
}

#[test]
fn closing_clears_local_state_and_pending_batch() {
    let provider = RecordingProvider::new(ProviderType::Ledger);
    let mut store = logged_in_store(provider, 0);
    let events = store.subscribe();
    let api = FakeApi::with_nonce(0);
    let mut coord = coordinator();

    let queued = queue(&mut store, "abc", 1, "D");
    for event in &queued {
        coord.process_event(&mut store, event, &api);
    }
    coord.set_error(Some("device locked".to_owned()));
    coord.close(&mut store);

    assert!(store.transactions_to_sign().is_none());
    assert!(!coord.modal_visible(&store));
    assert_eq!(coord.error(), None);
    assert_eq!(coord.callback_route(), "");
    assert_eq!(coord.state(), CoordinatorState::Idle);

    let cleared: Vec<StoreEvent> = events.try_iter().collect();
    assert!(cleared.contains(&StoreEvent::PendingBatchCleared {
        session_id: Some("abc".to_owned())
    }));

    // Replaying the old event without a fresh batch does nothing.
    let calls_before = api.account_calls.lock().expect("calls").len();
    for event in &queued {
        coord.process_event(&mut store, event, &api);
    }
    assert_eq!(api.account_calls.lock().expect("calls").len(), calls_before);
    assert!(!coord.modal_visible(&store));

    // A fresh batch under the same id is handled again.
    for event in queue(&mut store, "abc", 1, "D") {
        coord.process_event(&mut store, &event, &api);
    }
    assert!(coord.modal_visible(&store));
}

#[test]
fn nonce_fetch_failure_cancels_batch_and_surfaces_message() {
    let provider = RecordingProvider::new(ProviderType::Wallet);
    let mut store = logged_in_store(provider.clone(), 0);
    let api = FakeApi::failing("gateway timeout");
    let mut coord = coordinator();

    for event in queue(&mut store, "s-err", 2, "D") {
        coord.process_event(&mut store, &event, &api);
    }

    assert_eq!(store.batch_status("s-err"), Some(BatchStatus::Cancelled));
    assert!(coord.error().expect("error shown").contains("gateway timeout"));
    assert!(coord.modal_visible(&store));
    assert_eq!(coord.state(), CoordinatorState::Cancelled);
    assert!(provider.calls().is_empty());
}

#[test]
fn nonce_overflow_cancels_batch_instead_of_panicking() {
    let provider = RecordingProvider::new(ProviderType::Extension);
    let mut store = logged_in_store(provider.clone(), 0);
    let api = FakeApi::with_nonce(u64::MAX);
    let mut coord = coordinator();

    for event in queue(&mut store, "s-max", 2, "D") {
        coord.process_event(&mut store, &event, &api);
    }

    assert_eq!(store.batch_status("s-max"), Some(BatchStatus::Cancelled));
    assert!(coord.error().expect("error shown").contains("nonce overflow"));
    assert_eq!(coord.state(), CoordinatorState::Cancelled);
    assert!(provider.calls().is_empty());
}

#[test]
fn chain_mismatch_halts_by_default() {
    let provider = RecordingProvider::new(ProviderType::Wallet);
    let mut store = logged_in_store(provider.clone(), 0);
    let api = FakeApi::with_nonce(0);
    let mut coord = coordinator();

    for event in queue(&mut store, "s-net", 2, "1") {
        coord.process_event(&mut store, &event, &api);
    }

    assert_eq!(coord.error(), Some(CHAIN_CHANGED_MESSAGE));
    assert_eq!(store.batch_status("s-net"), Some(BatchStatus::Cancelled));
    assert!(api.account_calls.lock().expect("calls").is_empty());
    assert!(provider.calls().is_empty());
}

#[test]
fn chain_mismatch_warns_and_continues_when_configured() {
    let provider = RecordingProvider::new(ProviderType::Extension);
    let mut store = logged_in_store(provider, 4);
    let api = FakeApi::with_nonce(0);
    let mut coord = SigningCoordinator::new(CoordinatorConfig {
        chain_mismatch: ChainMismatchPolicy::Warn,
        ..CoordinatorConfig::default()
    });

    for event in queue(&mut store, "s-warn", 1, "T") {
        coord.process_event(&mut store, &event, &api);
    }

    assert_eq!(coord.error(), Some(CHAIN_CHANGED_MESSAGE));
    assert_eq!(store.batch_status("s-warn"), Some(BatchStatus::Pending));
    let batch = store.transactions_to_sign().expect("pending");
    assert_eq!(batch.transactions[0].nonce, 4);
}

#[test]
fn duplicate_queue_event_is_ignored_while_in_flight() {
    let provider = RecordingProvider::new(ProviderType::Extension);
    let mut store = logged_in_store(provider, 0);
    let api = FakeApi::with_nonce(0);
    let mut coord = coordinator();

    let events = queue(&mut store, "dup", 1, "D");
    let job = coord
        .on_event(&mut store, &events[0])
        .expect("first event starts a job");
    assert!(coord.on_event(&mut store, &events[0]).is_none());
    let outcome = job.run(&api);
    coord.finish(&mut store, outcome);
    assert_eq!(coord.in_flight(), Some("dup"));
}

#[test]
fn outcome_for_closed_batch_is_dropped() {
    let provider = RecordingProvider::new(ProviderType::Extension);
    let mut store = logged_in_store(provider, 0);
    let api = FakeApi::with_nonce(0);
    let mut coord = coordinator();

    let events = queue(&mut store, "late", 1, "D");
    let job = coord.on_event(&mut store, &events[0]).expect("job");
    coord.close(&mut store);
    let outcome = job.run(&api);
    coord.finish(&mut store, outcome);

    assert!(!coord.modal_visible(&store));
    assert!(coord.steps().is_none());
}

#[test]
fn send_transactions_uses_clock_session_id() {
    let provider = RecordingProvider::new(ProviderType::Wallet);
    let mut store = logged_in_store(provider, 0);
    let clock = FixedClock::at(1_700_000_000_000);

    let session = store
        .send_transactions(&clock, vec![transfer("D", 1)], "/home")
        .expect("send");
    assert_eq!(session, "1700000000000");
    let batch = store.transactions_to_sign().expect("pending");
    assert_eq!(batch.session_id, session);
    assert_eq!(batch.callback_route, "/home");
}
