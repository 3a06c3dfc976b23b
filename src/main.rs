//! loc-prodifier - Staging to Production Merge
//!
//! ステージングテーブルの新規行を本番テーブルへ重複なしでマージ

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::{error, warn};
use tokio_util::sync::CancellationToken;

use gcputils::driver::{exit_code, load_config, Args, MergeSettings, MergeWorkflow};

#[cfg_attr(coverage_nightly, coverage(off))]
async fn run(args: Args, cancel: &CancellationToken) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    // Create workflow with injected settings
    let workflow = MergeWorkflow::new(MergeSettings::resolve(&args, config));

    workflow.execute(cancel).await?;
    Ok(())
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // Ctrl-C cancels the wait and the running job
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling...");
            on_interrupt.cancel();
        }
    });

    match run(args, &cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(u8::try_from(exit_code(&e)).unwrap_or(1))
        }
    }
}
