//! The listener is configured through the environment, so the command line only offers help and a view of the
//! current settings.
use std::env::{self, VarError};

const HELP: &str = include_str!("./cli-help.txt");

/// Settings shown by `--env`. Anything not listed here is never printed.
const SHOWN_SETTINGS: [&str; 12] = [
    "RUST_LOG",
    "IPN_HOST",
    "IPN_PORT",
    "IPN_DATABASE_URL",
    "IPN_MERCHANT_ID",
    "IPN_STORE_ID",
    "IPN_PAID_STATUS",
    "IPN_GATEWAY_TIMEOUT",
    "IPN_GATEWAY_IP_WHITELIST",
    "IPN_USE_X_FORWARDED_FOR",
    "IPN_USE_FORWARDED",
    "IPN_RUN_MIGRATIONS",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Serve,
    ShowHelp,
    ShowSettings,
    Unrecognised(String),
}

impl CliAction {
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        match args.into_iter().next().as_deref() {
            None => CliAction::Serve,
            Some("-h" | "--help") => CliAction::ShowHelp,
            Some("--env") => CliAction::ShowSettings,
            Some(other) => CliAction::Unrecognised(other.to_string()),
        }
    }
}

/// Handles any command line arguments. Returns `true` if the process should exit instead of starting the server.
pub fn handle_command_line_args() -> bool {
    match CliAction::from_args(env::args().skip(1)) {
        CliAction::Serve => false,
        CliAction::ShowHelp => {
            println!("\n{HELP}\n");
            true
        },
        CliAction::ShowSettings => {
            print_settings();
            true
        },
        CliAction::Unrecognised(arg) => {
            eprintln!("Unrecognised argument: {arg}");
            println!("\n{HELP}\n");
            true
        },
    }
}

fn print_settings() {
    println!("Current IPN settings:");
    for name in SHOWN_SETTINGS {
        let value = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "(not set)".into(),
            Err(VarError::NotUnicode(s)) => format!("(invalid) {}", s.to_string_lossy()),
        };
        println!("  {name:<28} {value}");
    }
}
