use std::sync::Arc;

use zkperp_engine::{
    Address, EngineConfig, MemoryClosedPositionStore, MockChainReader, MockWalletClient,
    PositionScanner,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn owner() -> Address {
    Address::new("aleo1owner".to_string())
}

fn plaintext(id: &str, size: u64) -> String {
    format!(
        "{{\n  owner: aleo1owner.private,\n  position_id: {}.private,\n  is_long: true,\n  size_usdc: {}u64.private,\n  collateral_usdc: 4950000u64.private,\n  entry_price: 10000000000000u64.private,\n  open_block: 1u32.private\n}}",
        id, size
    )
}

fn ciphertexts(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn scanner(wallet: MockWalletClient, reader: MockChainReader) -> PositionScanner {
    PositionScanner::new(
        Arc::new(wallet),
        Arc::new(reader),
        Arc::new(MemoryClosedPositionStore::new()),
        EngineConfig::default(),
    )
}

#[tokio::test]
async fn test_scan_decodes_records_in_input_order() {
    init_tracing();
    let wallet = MockWalletClient::new()
        .with_record("record1a", &plaintext("111field", 50_000_000))
        .with_record("record1b", &plaintext("222field", 60_000_000));

    let scanner = scanner(wallet, MockChainReader::new());
    let positions = scanner
        .scan(&owner(), &ciphertexts(&["record1a", "record1b"]))
        .await
        .unwrap();

    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].id.as_str(), "111field");
    assert_eq!(positions[1].id.as_str(), "222field");
    assert_eq!(positions[0].size, 50_000_000);
    assert!(positions[0].plaintext.is_some());
}

#[tokio::test]
async fn test_one_bad_record_does_not_abort_the_batch() {
    init_tracing();
    // record1undecryptable is unknown to the wallet; record1garbage
    // decrypts to something that is not a Position record.
    let wallet = MockWalletClient::new()
        .with_record("record1a", &plaintext("111field", 50_000_000))
        .with_record("record1garbage", "{ amount: 5u64 }")
        .with_record("record1c", &plaintext("333field", 70_000_000));

    let scanner = scanner(wallet, MockChainReader::new());
    let positions = scanner
        .scan(
            &owner(),
            &ciphertexts(&["record1a", "record1undecryptable", "record1garbage", "record1c"]),
        )
        .await
        .unwrap();

    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].id.as_str(), "111field");
    assert_eq!(positions[1].id.as_str(), "333field");
}

#[tokio::test]
async fn test_dust_positions_are_dropped() {
    let wallet = MockWalletClient::new()
        .with_record("record1dust", &plaintext("111field", 9_999))
        .with_record("record1real", &plaintext("222field", 10_000));

    let scanner = scanner(wallet, MockChainReader::new());
    let positions = scanner
        .scan(&owner(), &ciphertexts(&["record1dust", "record1real"]))
        .await
        .unwrap();

    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].id.as_str(), "222field");
}

#[tokio::test]
async fn test_locally_closed_positions_are_suppressed() {
    let wallet = MockWalletClient::new()
        .with_record("record1a", &plaintext("111field", 50_000_000))
        .with_record("record1b", &plaintext("222field", 50_000_000));
    let store = Arc::new(MemoryClosedPositionStore::new().with_id("111field"));

    let scanner = PositionScanner::new(
        Arc::new(wallet),
        Arc::new(MockChainReader::new()),
        store,
        EngineConfig::default(),
    );
    let positions = scanner
        .scan(&owner(), &ciphertexts(&["record1a", "record1b"]))
        .await
        .unwrap();

    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].id.as_str(), "222field");
}

#[tokio::test]
async fn test_on_chain_closed_positions_are_learned() {
    let wallet = MockWalletClient::new()
        .with_record("record1a", &plaintext("111field", 50_000_000))
        .with_record("record1b", &plaintext("222field", 50_000_000));
    let reader = MockChainReader::new().with_entry("closed_positions", "111field", "true");
    let store = Arc::new(MemoryClosedPositionStore::new());

    let scanner = PositionScanner::new(
        Arc::new(wallet),
        Arc::new(reader),
        store.clone(),
        EngineConfig::default(),
    );
    let positions = scanner
        .scan(&owner(), &ciphertexts(&["record1a", "record1b"]))
        .await
        .unwrap();

    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].id.as_str(), "222field");
    // The on-chain verdict was appended to the local store.
    use zkperp_engine::ClosedPositionStore;
    assert!(store.contains("111field").await.unwrap());
}

#[tokio::test]
async fn test_chain_reader_failure_does_not_hide_positions() {
    let wallet =
        MockWalletClient::new().with_record("record1a", &plaintext("111field", 50_000_000));
    let reader = MockChainReader::new().with_failure();

    let scanner = scanner(wallet, reader);
    let positions = scanner
        .scan(&owner(), &ciphertexts(&["record1a"]))
        .await
        .unwrap();

    assert_eq!(positions.len(), 1);
}

#[tokio::test]
async fn test_scan_of_empty_batch() {
    let scanner = scanner(MockWalletClient::new(), MockChainReader::new());
    let positions = scanner.scan(&owner(), &[]).await.unwrap();
    assert!(positions.is_empty());
}
