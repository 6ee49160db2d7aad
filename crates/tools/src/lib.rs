pub mod command;
pub mod demo;
pub mod erc20;
pub mod helper;
pub mod l1_client;
pub mod l2_client;
pub mod trace;
pub mod up;
pub mod utils;
