use anyhow::Context;
use clap::Parser;
use oaslint::{
    cli::{Cli, Commands},
    commands, telemetry,
};
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    telemetry::init_telemetry();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lint {
            files,
            ruleset,
            format,
            fail_on,
        } => {
            let failed = commands::execute_lint(&files, ruleset.as_deref(), format, fail_on.into())
                .context("lint failed")?;
            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Rules { ruleset } => {
            commands::execute_rules(ruleset.as_deref()).context("could not list rules")?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
