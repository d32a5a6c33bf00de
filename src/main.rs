use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::{debug, info, warn};
use serde::Serialize;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use bundle_relay::cli::{ApplyArgs, Cli, Commands};
use bundle_relay::config::load_configuration;
use bundle_relay::log::init_logging;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_logging()?;

    let cli = Cli::parse();

    let mut config = load_configuration(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    config.apply_relay(&cli.relay);

    let client = config.build_client()?;
    info!(relay:% = client.get_address(); "Relay client ready");

    let exit_code = match cli.command {
        Commands::TipAccounts { random } => {
            if random {
                print_json(&client.get_random_tip_account().await?)?;
            } else {
                print_json(&client.get_tip_accounts().await?)?;
            }
            ExitCode::SUCCESS
        },
        Commands::SendBundle { transactions, encoding } => {
            print_json(&client.send_bundle(transactions, encoding).await?)?;
            ExitCode::SUCCESS
        },
        Commands::SendTransaction {
            transaction,
            bundle_only,
            encoding,
        } => {
            print_json(&client.send_transaction(transaction, encoding, bundle_only).await?)?;
            ExitCode::SUCCESS
        },
        Commands::InflightStatus { bundle_ids } => {
            print_json(&client.get_inflight_bundle_statuses(bundle_ids).await?)?;
            ExitCode::SUCCESS
        },
        Commands::BundleStatus { bundle_ids } => {
            print_json(&client.get_bundle_statuses(bundle_ids).await?)?;
            ExitCode::SUCCESS
        },
        Commands::Confirm(args) => {
            config.apply_confirm(&args);

            let cancel = CancellationToken::new();
            let ctrl_c_token = cancel.clone();
            tokio::spawn(async move {
                if signal::ctrl_c().await.is_ok() {
                    warn!("Ctrl+C received, cancelling confirmation");
                    ctrl_c_token.cancel();
                }
            });

            let result = client
                .confirm_inflight_bundle_with_cancel(&args.bundle_id, config.confirmation_timeout(), &cancel)
                .await;
            print_json(&result)?;

            if result.is_landed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        },
    };

    if let Some(latency) = client.get_last_request_latency().await {
        debug!(latency_ms = latency.as_millis() as u64; "Last relay round trip");
    }

    Ok(exit_code)
}
