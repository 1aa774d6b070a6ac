use clap::Parser;
use hostcheck::cli::Cli;
use hostcheck::error::CliError;
use hostcheck::{logging, output};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());

    match run(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            let code = match err.downcast_ref::<CliError>() {
                Some(cli_err) if cli_err.is_interrupt() => {
                    output::print_warning(&cli_err.to_string());
                    cli_err.exit_code()
                }
                Some(cli_err) => {
                    output::print_error(&cli_err.to_string());
                    cli_err.exit_code()
                }
                None => {
                    output::print_error(&format!("{err:#}"));
                    1
                }
            };
            ExitCode::from(code)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<u8> {
    let cancel = CancellationToken::new();

    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received");
            token.cancel();
        }
    });

    Ok(cli.execute(cancel).await?)
}
