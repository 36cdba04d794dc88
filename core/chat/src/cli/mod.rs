//! コマンドライン解析

mod args;
pub mod present;

#[allow(unused_imports)]
pub use args::parse_args_from;
pub use args::{config_to_command, parse_args, print_completion, Config, ParseOutcome};
