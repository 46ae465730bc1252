use std::io::IsTerminal;

use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;
use tracing::{info, warn};

use crate::app::{
    RunOptions, export_json, render_completion, render_run_header, render_summary, run_load_test,
};
use crate::args::{Prompter, TesterArgs};
use crate::config::{apply_config, collect_config, load_config};
use crate::domain::TestConfig;
use crate::error::AppResult;
use crate::http::ClientTimeouts;
use crate::rate::TierPlan;
use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};

/// Binary entry point: arguments, config, one run, report.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, a failed client
/// build, or a failed JSON export.
pub fn run() -> AppResult<()> {
    let Some(mut args) = parse_args()? else {
        return Ok(());
    };

    crate::logger::init_logging(args.verbose, args.no_color);

    if let Some(file) = load_config(args.config.as_deref())? {
        apply_config(&mut args, file)?;
    }

    let interactive = !args.no_prompt && std::io::stdin().is_terminal();
    let config = {
        let stdin = std::io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
        collect_config(&args, interactive.then_some(&mut prompter))?
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(&args, &config))
}

fn parse_args() -> AppResult<Option<TesterArgs>> {
    match TesterArgs::try_parse() {
        Ok(args) => Ok(Some(args)),
        Err(err)
            if matches!(
                err.kind(),
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
            ) =>
        {
            err.print()?;
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_async(args: &TesterArgs, config: &TestConfig) -> AppResult<()> {
    let plan = TierPlan::for_rate(config.target_rps);
    println!("{}", render_run_header(config, &plan));

    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
    let options = RunOptions {
        progress: !args.no_progress,
        no_color: args.no_color,
        timeouts: ClientTimeouts::default(),
    };

    let result = run_load_test(config, &shutdown_tx, options).await;
    drop(shutdown_tx.send(()));
    if let Err(err) = signal_handle.await {
        warn!("Signal handler failed: {}", err);
    }
    let report = result?;

    println!("{}", render_completion(&report.completion));
    println!();
    println!(
        "{}",
        render_summary(&report.summary, report.completion.cancelled)
    );

    if let Some(path) = args.output.as_deref() {
        export_json(path, &report.summary, &report.completion).await?;
        info!("Summary written to {}", path);
    }
    Ok(())
}
