use safe_roles_onboarding::chain::{ChainContext, RpcChainClient};
use safe_roles_onboarding::cli::Cli;
use safe_roles_onboarding::onboarding::{OnboardingClient, OnboardingObserver, TracingObserver};
use safe_roles_onboarding::output::{self, ConsoleObserver};

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Main entry point for one onboarding run
#[tokio::main]
async fn main() -> eyre::Result<()> {
    // A .env file is optional; real environment variables take precedence
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json, cli.json);

    let signer = cli.load_signer()?;
    let account = signer.address();
    let client = cli.client.unwrap_or(account);
    let config = cli.onboarding_config();

    if !cli.json {
        output::print_banner(&cli.rpc_url, &account, &client);
        output::print_config(&config);
    }

    let rpc = Arc::new(RpcChainClient::connect(&cli.rpc_url, signer)?);
    let ctx = ChainContext::new(rpc.clone(), rpc);

    let observer: Arc<dyn OnboardingObserver> =
        if cli.json { Arc::new(TracingObserver) } else { Arc::new(ConsoleObserver::default()) };
    let onboarding = OnboardingClient::new(ctx, config)?.with_observer(observer);

    match onboarding.onboard_client(Some(client)).await {
        Ok(result) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::print_result(&result);
            }
            Ok(())
        }
        Err(failure) => {
            if !cli.json {
                output::print_failure(&failure);
            }
            Err(failure.into())
        }
    }
}

/// Logs go to stderr so stdout only carries the human output or the JSON record.
fn init_tracing(log_json: bool, quiet_console: bool) {
    // The console observer already reports progress, so human mode only logs warnings
    let default_level = if log_json || quiet_console { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    if log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}
