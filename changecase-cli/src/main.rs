// ABOUTME: Main entry point for the change case management CLI
// ABOUTME: Wires auth, settings, and the progress file into the command handlers

use anyhow::Result;
use clap::Parser;

use changecase_sdk::{ChangeCaseError, SfClient, org_auth_from_env};
use changecase_cli::cli::{Cli, Commands};
use changecase_cli::commands;
use changecase_cli::config::Settings;
use changecase_cli::progress::ProgressFile;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if cli.bypass {
        println!(
            "Change case management command was skipped because SF_CHANGE_CASE_BYPASS was set."
        );
        return;
    }

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        if let Some(help) = err
            .downcast_ref::<ChangeCaseError>()
            .and_then(ChangeCaseError::help_text)
        {
            eprintln!();
            eprintln!("{help}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let auth = org_auth_from_env().await?;
    let client = SfClient::new(auth)?;
    let settings = Settings::from_env();
    let progress_file = ProgressFile::in_project();

    match cli.command {
        Commands::Check { selector } => {
            let result = commands::check::run(&client, &settings, &selector.to_selector()?).await?;
            print_result(&result)?;
        }
        Commands::Create {
            template_id,
            release,
            location,
        } => {
            let opts = commands::create::CreateOptions {
                template_id,
                release,
                location: location.map(|url| url.to_string()),
                dry_run: cli.dry_run,
            };
            let result = commands::create::run(&client, &settings, &progress_file, opts).await?;
            print_result(&result)?;
        }
        Commands::Close { selector, status } => {
            let opts = commands::close::CloseOptions {
                change_case_id: selector.change_case_id,
                release: selector.release,
                location: selector.location.map(|url| url.to_string()),
                status: status.as_str(),
                dry_run: cli.dry_run,
            };
            let result = commands::close::run(&client, &progress_file, opts).await?;
            print_result(&result)?;
        }
        Commands::Update {
            change_case_id,
            status,
        } => {
            if cli.dry_run {
                println!("Command dryrun - skipping command execution.");
                return Ok(());
            }
            let result = commands::update::run(&client, &change_case_id, status.as_str()).await?;
            print_result(&result)?;
        }
        Commands::UpdateScheduledBuild {
            work_item_id,
            scheduled_build,
        } => {
            if cli.dry_run {
                println!("Command dryrun - skipping command execution.");
                return Ok(());
            }
            let result =
                commands::scheduled_build::run(&client, &work_item_id, &scheduled_build).await?;
            print_result(&result)?;
        }
    }

    Ok(())
}

fn print_result<T: serde::Serialize>(result: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
