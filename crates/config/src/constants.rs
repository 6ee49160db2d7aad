/// Derivation path of the funding account inside the test mnemonic.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";
/// Mnemonic funded by the local development chain.
pub const DEFAULT_TEST_MNEMONIC: &str =
    "test test test test test test test test test test test junk";
pub const DEFAULT_L1_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_L2_REST_URL: &str = "http://127.0.0.1:3001/api/v0.2";
/// Receipts are polled quickly against a local node.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_SLEEP_MS: u64 = 10_000;
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_COMPOSE_SERVICES: [&str; 5] = [
    "postgres",
    "redis",
    "geth",
    "dev-ticker",
    "dev-liquidity-token-watcher",
];
