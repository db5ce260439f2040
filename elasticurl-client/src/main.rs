use anyhow::Context;
use clap::Parser;
use std::ffi::OsString;
use elasticurl_core::RunnerConfig;
use elasticurl_runner::{build_command_with, CommandExecutor};
use tracing::info;

/// Runs the Java elasticurl integration test through Maven.
///
/// Every argument is forwarded to elasticurl untouched, including ones that
/// look like flags and a leading `--`, so this binary has no `--help` or
/// `--version` of its own.
#[derive(Parser, Debug)]
#[command(name = "java-elasticurl")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Arguments passed through to elasticurl
    #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl Cli {
    /// Arguments after the program name, exactly as given.
    fn forwarded_args(argv: Vec<OsString>) -> Result<Vec<String>, clap::Error> {
        let leading_separator = argv.get(1).is_some_and(|arg| arg.as_os_str() == "--");
        let mut args = Cli::try_parse_from(argv)?.args;

        // clap swallows a leading `--` as its own separator
        if leading_separator {
            args.insert(0, "--".to_string());
        }

        Ok(args)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::forwarded_args(std::env::args_os().collect()).unwrap_or_else(|e| e.exit());
    let config = RunnerConfig::default();

    let invocation = build_command_with(&config.build_tool, &args)?;
    let executor = CommandExecutor::with_config(config);

    let report = executor
        .run_command(&invocation)
        .await
        .context("elasticurl integration test failed")?;

    info!(
        run_id = %report.id,
        duration_ms = report.duration_ms,
        "elasticurl integration test passed"
    );

    Ok(())
}
