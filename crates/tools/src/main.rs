use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use mr_config::Config;
use mr_tools::{
    command::{self, Layer},
    demo::{self, Scenario},
    helper::AccountInfoKind,
    trace, up,
};

const COMMAND_DEMO: &str = "demo";
const COMMAND_UP: &str = "up";
const COMMAND_EXAMPLE_CONFIG: &str = "generate-example-config";
const COMMAND_DEPOSIT: &str = "deposit";
const COMMAND_TRANSFER: &str = "transfer";
const COMMAND_WITHDRAW: &str = "withdraw";
const COMMAND_FULL_EXIT: &str = "full-exit";
const COMMAND_GET_BALANCE: &str = "get-balance";
const COMMAND_ACCOUNT_INFO: &str = "account-info";
const ARG_CONFIG: &str = "config";
const ARG_OUTPUT_PATH: &str = "output-path";
const ARG_SCENARIO: &str = "scenario";
const ARG_PRIVKEY: &str = "privkey";
const ARG_ADDRESS: &str = "address";
const ARG_TO: &str = "to";
const ARG_TOKEN: &str = "token";
const ARG_AMOUNT: &str = "amount";
const ARG_APPROVE: &str = "approve";
const ARG_FAST: &str = "fast";
const ARG_LAYER: &str = "layer";
const ARG_KIND: &str = "kind";
const ARG_ACCOUNT_ID: &str = "account-id";

fn read_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        log::warn!(
            "config file {} not found, use default config",
            path.to_string_lossy()
        );
        return Ok(Config::default());
    }
    let content = fs::read(path)
        .with_context(|| format!("read config file from {}", path.to_string_lossy()))?;
    let config = toml::from_slice(&content).with_context(|| "parse config file")?;
    Ok(config)
}

fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = Config::default();
    let content = toml::to_string_pretty(&config)?;
    fs::write(path, content)?;
    Ok(())
}

fn value_of<'a>(m: &'a ArgMatches, name: &str) -> Result<&'a str> {
    m.value_of(name)
        .ok_or_else(|| anyhow!("missing argument {}", name))
}

fn arg_config() -> Arg<'static> {
    Arg::new(ARG_CONFIG)
        .short('c')
        .takes_value(true)
        .required(true)
        .default_value("./config.toml")
        .help("The config file path")
}

fn arg_privkey() -> Arg<'static> {
    Arg::new(ARG_PRIVKEY)
        .short('k')
        .long("privkey")
        .takes_value(true)
        .required(true)
        .help("The private key of the L1 wallet, hex encoded")
}

fn arg_token() -> Arg<'static> {
    Arg::new(ARG_TOKEN)
        .short('t')
        .long("token")
        .takes_value(true)
        .default_value("ETH")
        .help("Token symbol")
}

fn arg_amount() -> Arg<'static> {
    Arg::new(ARG_AMOUNT)
        .short('m')
        .long("amount")
        .takes_value(true)
        .required(true)
        .help("Amount in token units, e.g. 100 or 0.5")
}

fn arg_address() -> Arg<'static> {
    Arg::new(ARG_ADDRESS)
        .short('a')
        .long("address")
        .takes_value(true)
        .required(true)
        .help("The account address")
}

async fn run_cli() -> Result<()> {
    let app = Command::new("mr-tools")
        .about("Massbit rollup demo and integration tools")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(
            Command::new(COMMAND_DEMO)
                .about("Run a demo scenario with two actors")
                .arg(arg_config())
                .arg(
                    Arg::new(ARG_SCENARIO)
                        .short('s')
                        .long("scenario")
                        .takes_value(true)
                        .default_value("demo")
                        .possible_values(["demo", "seeded", "batch", "l1-log", "l2-log"])
                        .help("The scenario to run"),
                )
                .display_order(0),
        )
        .subcommand(
            Command::new(COMMAND_UP)
                .about("Start the local development services")
                .arg(arg_config())
                .display_order(1),
        )
        .subcommand(
            Command::new(COMMAND_EXAMPLE_CONFIG)
                .about("Generate an example config file")
                .arg(
                    Arg::new(ARG_OUTPUT_PATH)
                        .short('o')
                        .takes_value(true)
                        .required(true)
                        .default_value("./config.example.toml")
                        .help("The path of the example config file"),
                )
                .display_order(2),
        )
        .subcommand(
            Command::new(COMMAND_DEPOSIT)
                .about("Deposit from the funding wallet to a rollup account")
                .arg(arg_config())
                .arg(
                    Arg::new(ARG_TO)
                        .long("to")
                        .takes_value(true)
                        .required(true)
                        .help("The receiver address"),
                )
                .arg(arg_token())
                .arg(arg_amount())
                .arg(
                    Arg::new(ARG_APPROVE)
                        .long("approve")
                        .takes_value(false)
                        .help("Approve the ERC-20 amount before depositing"),
                )
                .display_order(3),
        )
        .subcommand(
            Command::new(COMMAND_TRANSFER)
                .about("Transfer on the rollup")
                .arg(arg_config())
                .arg(arg_privkey())
                .arg(
                    Arg::new(ARG_TO)
                        .long("to")
                        .takes_value(true)
                        .required(true)
                        .help("The receiver address"),
                )
                .arg(arg_token())
                .arg(arg_amount())
                .display_order(4),
        )
        .subcommand(
            Command::new(COMMAND_WITHDRAW)
                .about("Withdraw from the rollup to the wallet's L1 address")
                .arg(arg_config())
                .arg(arg_privkey())
                .arg(arg_token())
                .arg(arg_amount())
                .arg(
                    Arg::new(ARG_FAST)
                        .long("fast")
                        .takes_value(false)
                        .help("Request fast processing"),
                )
                .display_order(5),
        )
        .subcommand(
            Command::new(COMMAND_FULL_EXIT)
                .about("Exit a token through L1 and claim the pending balance")
                .arg(arg_config())
                .arg(arg_privkey())
                .arg(arg_token())
                .arg(
                    Arg::new(ARG_ACCOUNT_ID)
                        .long("account-id")
                        .takes_value(true)
                        .help("Rollup account id to exit, the wallet's own account by default"),
                )
                .display_order(6),
        )
        .subcommand(
            Command::new(COMMAND_GET_BALANCE)
                .about("Get the balance of an address")
                .arg(arg_config())
                .arg(arg_address())
                .arg(arg_token())
                .arg(
                    Arg::new(ARG_LAYER)
                        .short('l')
                        .long("layer")
                        .takes_value(true)
                        .default_value("l2")
                        .possible_values(["l1", "l2"])
                        .help("Query L1 or the rollup"),
                )
                .display_order(7),
        )
        .subcommand(
            Command::new(COMMAND_ACCOUNT_INFO)
                .about("Print rollup account info")
                .arg(arg_config())
                .arg(arg_address())
                .arg(
                    Arg::new(ARG_KIND)
                        .long("kind")
                        .takes_value(true)
                        .possible_values(["committed", "finalized", "full"])
                        .help("The account view, all three when omitted"),
                )
                .display_order(8),
        );

    let matches = app.get_matches();
    match matches.subcommand() {
        Some((COMMAND_DEMO, m)) => {
            let config = read_config(value_of(m, ARG_CONFIG)?)?;
            let scenario: Scenario = value_of(m, ARG_SCENARIO)?.parse()?;
            demo::run(&config, scenario).await?;
        }
        Some((COMMAND_UP, m)) => {
            let config = read_config(value_of(m, ARG_CONFIG)?)?;
            up::up(&config.up)?;
        }
        Some((COMMAND_EXAMPLE_CONFIG, m)) => {
            let path = value_of(m, ARG_OUTPUT_PATH)?;
            generate_example_config(path)?;
        }
        Some((COMMAND_DEPOSIT, m)) => {
            let config = read_config(value_of(m, ARG_CONFIG)?)?;
            let to = command::parse_address(value_of(m, ARG_TO)?)?;
            command::deposit(
                &config,
                to,
                value_of(m, ARG_TOKEN)?,
                value_of(m, ARG_AMOUNT)?,
                m.is_present(ARG_APPROVE),
            )
            .await?;
        }
        Some((COMMAND_TRANSFER, m)) => {
            let config = read_config(value_of(m, ARG_CONFIG)?)?;
            let to = command::parse_address(value_of(m, ARG_TO)?)?;
            command::transfer(
                &config,
                value_of(m, ARG_PRIVKEY)?,
                to,
                value_of(m, ARG_TOKEN)?,
                value_of(m, ARG_AMOUNT)?,
            )
            .await?;
        }
        Some((COMMAND_WITHDRAW, m)) => {
            let config = read_config(value_of(m, ARG_CONFIG)?)?;
            command::withdraw(
                &config,
                value_of(m, ARG_PRIVKEY)?,
                value_of(m, ARG_TOKEN)?,
                value_of(m, ARG_AMOUNT)?,
                m.is_present(ARG_FAST),
            )
            .await?;
        }
        Some((COMMAND_FULL_EXIT, m)) => {
            let config = read_config(value_of(m, ARG_CONFIG)?)?;
            let account_id = m
                .value_of(ARG_ACCOUNT_ID)
                .map(|id| {
                    id.parse::<u32>()
                        .with_context(|| format!("invalid account id {}", id))
                })
                .transpose()?;
            command::full_exit(
                &config,
                value_of(m, ARG_PRIVKEY)?,
                value_of(m, ARG_TOKEN)?,
                account_id,
            )
            .await?;
        }
        Some((COMMAND_GET_BALANCE, m)) => {
            let config = read_config(value_of(m, ARG_CONFIG)?)?;
            let address = command::parse_address(value_of(m, ARG_ADDRESS)?)?;
            let layer: Layer = value_of(m, ARG_LAYER)?.parse()?;
            command::get_balance(&config, address, value_of(m, ARG_TOKEN)?, layer).await?;
        }
        Some((COMMAND_ACCOUNT_INFO, m)) => {
            let config = read_config(value_of(m, ARG_CONFIG)?)?;
            let address = command::parse_address(value_of(m, ARG_ADDRESS)?)?;
            let kind: Option<AccountInfoKind> = m.value_of(ARG_KIND).map(str::parse).transpose()?;
            command::account_info(&config, address, kind).await?;
        }
        _ => {
            // default command: run the demo scenario
            let config = read_config("./config.toml")?;
            demo::run(&config, Scenario::default()).await?;
        }
    };
    Ok(())
}

fn main() {
    if let Err(err) = trace::init() {
        eprintln!("init tracing: {}", err);
    }
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            log::error!("build runtime: {}", err);
            std::process::exit(-1);
        }
    };
    if let Err(err) = rt.block_on(run_cli()) {
        log::error!("{:#}", err);
        std::process::exit(-1);
    }
}
