use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::relay::TransactionEncoding;

#[derive(Parser)]
#[command(name = "bundle-relay")]
#[command(about = "Command line client for a block-engine bundle relay", long_about = None)]
pub struct Cli {
    #[arg(
        short,
        long,
        global = true,
        help = "Path to the configuration file",
        default_value = "config/config.toml"
    )]
    pub config: PathBuf,
    #[command(flatten)]
    pub relay: RelayArgs,
    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the relay connection, applied on top of the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct RelayArgs {
    #[arg(short = 'u', long, global = true, help = "The base URL of the relay API")]
    pub base_url: Option<String>,
    #[arg(long, global = true, help = "Authentication uuid sent as a query parameter")]
    pub uuid: Option<String>,
    #[arg(long, global = true, help = "Log every request and raw response at debug level")]
    pub diagnostics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfirmArgs {
    #[arg(help = "Id of the bundle to confirm")]
    pub bundle_id: String,
    #[arg(short, long, help = "Give up after this many milliseconds")]
    pub timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the accounts the relay accepts tips on
    TipAccounts {
        #[arg(short, long, help = "Print a single, uniformly chosen account")]
        random: bool,
    },
    /// Submit a bundle of signed, serialized transactions
    SendBundle {
        #[arg(required = true, num_args = 1.., help = "Serialized transactions, in bundle order")]
        transactions: Vec<String>,
        #[arg(short, long, help = "Encoding of the transactions (base58 or base64)")]
        encoding: Option<TransactionEncoding>,
    },
    /// Submit a single signed, serialized transaction
    SendTransaction {
        #[arg(help = "Serialized transaction")]
        transaction: String,
        #[arg(long, help = "Only forward the transaction as part of a bundle")]
        bundle_only: bool,
        #[arg(short, long, help = "Encoding of the transaction (base58 or base64)")]
        encoding: Option<TransactionEncoding>,
    },
    /// Query the fast-path status of up to five bundles
    InflightStatus {
        #[arg(required = true, num_args = 1.., help = "Bundle ids")]
        bundle_ids: Vec<String>,
    },
    /// Query the detailed status of up to five landed bundles
    BundleStatus {
        #[arg(required = true, num_args = 1.., help = "Bundle ids")]
        bundle_ids: Vec<String>,
    },
    /// Poll until a bundle lands, fails or the timeout passes. Ctrl+C cancels.
    Confirm(ConfirmArgs),
}

/// Layers command line arguments over a loaded configuration.
pub trait ApplyArgs {
    fn apply_relay(&mut self, args: &RelayArgs);
    fn apply_confirm(&mut self, args: &ConfirmArgs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "bundle-relay",
            "send-transaction",
            "AbCd",
            "--bundle-only",
            "--encoding",
            "base64",
            "--uuid",
            "token",
        ])
        .unwrap();

        assert_eq!(cli.relay.uuid.as_deref(), Some("token"));
        assert_eq!(cli.config, PathBuf::from("config/config.toml"));
        match cli.command {
            Commands::SendTransaction {
                transaction,
                bundle_only,
                encoding,
            } => {
                assert_eq!(transaction, "AbCd");
                assert!(bundle_only);
                assert_eq!(encoding, Some(TransactionEncoding::Base64));
            },
            _ => panic!("expected send-transaction"),
        }
    }

    #[test]
    fn send_bundle_requires_transactions() {
        assert!(Cli::try_parse_from(["bundle-relay", "send-bundle"]).is_err());
    }

    #[test]
    fn confirm_takes_optional_timeout() {
        let cli = Cli::try_parse_from(["bundle-relay", "confirm", "abc123", "--timeout-ms", "5000"]).unwrap();
        match cli.command {
            Commands::Confirm(args) => {
                assert_eq!(args.bundle_id, "abc123");
                assert_eq!(args.timeout_ms, Some(5000));
            },
            _ => panic!("expected confirm"),
        }
    }
}
