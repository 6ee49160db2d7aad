use mr_config::DemoConfig;
use mr_tools::demo::Scenario;
use mr_types::U256;

use crate::testing_tool::common::{ether, setup_demo, units};

fn demo_config() -> DemoConfig {
    DemoConfig {
        sleep_ms: 0,
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_actors_are_funded() {
    let (network, demo) = setup_demo(demo_config()).await;

    assert_eq!(
        network.l1_token_balance(demo.alice().address(), "ETH").unwrap(),
        ether("2000")
    );
    assert_eq!(
        network.l1_token_balance(demo.bob().address(), "ETH").unwrap(),
        ether("1")
    );
    assert_eq!(demo.alice().l2.address(), demo.alice().address());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_seeded_scenario() {
    let (network, mut demo) = setup_demo(demo_config()).await;
    demo.run(Scenario::Seeded).await.unwrap();

    let alice = demo.alice().address();
    let bob = demo.bob().address();
    for token in ["ETH", "DAI", "wBTC"] {
        assert_eq!(network.l2_balance(alice, token), U256::zero(), "{}", token);
        assert_eq!(network.l2_balance(bob, token), U256::zero(), "{}", token);
        assert_eq!(network.pending_balance(alice, token).unwrap(), U256::zero());
        assert_eq!(network.pending_balance(bob, token).unwrap(), U256::zero());
    }

    // 1000 deposited, 250 sent to Bob plus the transfer fee
    assert_eq!(
        network.l1_token_balance(alice, "DAI").unwrap(),
        ether("749.999")
    );
    // 100 withdrawn with the fast withdraw fee, the rest by full exit
    assert_eq!(network.l1_token_balance(bob, "DAI").unwrap(), ether("249.995"));
    assert_eq!(
        network.l1_token_balance(bob, "wBTC").unwrap(),
        units("249.995", 8)
    );
    assert!(demo.l2_client().running_fee() > U256::zero());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_demo_scenario_needs_seeded_accounts() {
    let (_, mut demo) = setup_demo(demo_config()).await;
    let err = demo.run(Scenario::Demo).await.unwrap_err();
    assert!(err.to_string().contains("not found on the rollup"), "{}", err);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_demo_scenario_after_init_data() {
    let (network, mut demo) = setup_demo(demo_config()).await;
    demo.init_eth_data().await.unwrap();
    demo.init_erc20_data().await.unwrap();

    let bob = demo.bob().address();
    assert_eq!(network.l2_balance(bob, "wBTC"), units("250", 8));

    demo.run(Scenario::Demo).await.unwrap();
    assert_eq!(network.l2_balance(bob, "ETH"), U256::zero());
    assert!(network.l1_token_balance(bob, "ETH").unwrap() > ether("249"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_batch_scenario() {
    let config = DemoConfig {
        batch_size: 4,
        deposit_amount: "100".to_string(),
        ..demo_config()
    };
    let (network, mut demo) = setup_demo(config).await;
    demo.run(Scenario::Batch).await.unwrap();

    // four deposits of 25, half of each sent to Bob
    assert_eq!(network.l2_balance(demo.bob().address(), "ETH"), ether("50"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_log_scenarios() {
    let (_, mut demo) = setup_demo(demo_config()).await;
    demo.run(Scenario::L1Log).await.unwrap();
    demo.run(Scenario::L2Log).await.unwrap();
}
