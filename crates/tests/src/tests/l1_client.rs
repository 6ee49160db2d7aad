use mr_config::ActorConfig;
use mr_rpc_client::L2Ops;
use mr_types::U256;

use crate::testing_tool::{
    common::{ether, setup, units},
    mock_network::gas_fee,
};

#[tokio::test(flavor = "multi_thread")]
async fn test_load_wallet_funds_random_actor() {
    let mut setup = setup();
    let actor = ActorConfig {
        fund: Some("2000.0".to_string()),
        ..ActorConfig::named("Alice")
    };
    let alice = setup.eth_client.load_wallet(&actor, None).await.unwrap();

    assert_eq!(setup.eth_client.get_balance(alice.address()).await.unwrap(), ether("2000"));
    assert_eq!(setup.eth_client.running_fee(), gas_fee());

    // an explicit amount wins over the actor's
    let bob = setup
        .eth_client
        .load_wallet(&ActorConfig::named("Bob"), Some("1.5"))
        .await
        .unwrap();
    assert_eq!(setup.eth_client.get_balance(bob.address()).await.unwrap(), ether("1.5"));
    assert_eq!(setup.eth_client.running_fee(), gas_fee() * 2);

    setup.eth_client.reset_running_fee();
    assert_eq!(setup.eth_client.running_fee(), U256::zero());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_load_wallet_with_key_is_not_funded() {
    let mut setup = setup();
    let actor = ActorConfig {
        private_key: Some(format!("0x{}", "11".repeat(32))),
        fund: Some("10.0".to_string()),
        ..ActorConfig::named("Carol")
    };
    let first = setup.eth_client.load_wallet(&actor, None).await.unwrap();
    let second = setup.eth_client.load_wallet(&actor, None).await.unwrap();

    assert_eq!(first.address(), second.address());
    assert_eq!(setup.eth_client.get_balance(first.address()).await.unwrap(), U256::zero());
    assert_eq!(setup.eth_client.running_fee(), U256::zero());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_random_wallet() {
    let mut setup = setup();
    let unfunded = setup.eth_client.create_random_wallet(None).await.unwrap();
    let funded = setup
        .eth_client
        .create_random_wallet(Some("3.25"))
        .await
        .unwrap();

    assert_ne!(unfunded.address(), funded.address());
    assert_eq!(setup.eth_client.get_balance(unfunded.address()).await.unwrap(), U256::zero());
    assert_eq!(setup.eth_client.get_balance(funded.address()).await.unwrap(), ether("3.25"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_erc20_balance_and_contract_cache() {
    let mut setup = setup();
    let owner = setup.eth_client.create_random_wallet(None).await.unwrap();
    setup
        .network
        .mint_l1(owner.address(), "wBTC", units("12.5", 8))
        .unwrap();

    assert!(setup.eth_client.cached_contract("wBTC").is_none());
    let balance = setup
        .eth_client
        .get_erc20_balance(owner.address(), "wBTC")
        .await
        .unwrap();
    assert_eq!(balance, units("12.5", 8));

    let token_address = setup
        .l2_client
        .provider()
        .token_set()
        .get(&"wBTC".into())
        .unwrap()
        .address;
    let cached = setup.eth_client.cached_contract("wBTC").cloned().unwrap();
    assert_eq!(cached.address, token_address);

    // resolved once, the second lookup is served from the cache
    let again = setup.eth_client.erc20_contract("wBTC").unwrap().clone();
    assert_eq!(again, cached);
    assert!(setup.eth_client.cached_contract("DAI").is_none());

    let err = setup
        .eth_client
        .get_erc20_balance(owner.address(), "USDT")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not supported"));
}
