mod cli;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

use cli::{Cli, Command};
use tfa::config::load_env_file;
use tfa::format::{render_state_table, render_tool_table};
use tfa::mcp::resources::read_resource;
use tfa::{Assistant, AssistantError, Config, McpServer};

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    // stdout carries the MCP stream, so logs never go there.
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let file_layer = match log_file {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

async fn print_check(assistant: &Assistant, problems: &[AssistantError]) {
    println!("{}\n", assistant.check_access().text);
    for problem in problems {
        println!("Problem: {}", problem);
    }
    if !problems.is_empty() {
        println!();
    }
    println!("{}", render_tool_table(assistant.tool_status().await));
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Real environment variables take precedence over .env entries.
    let env_file = load_env_file(None);

    let cli = Cli::parse();
    init_tracing(cli.global.log_file().as_deref())?;

    match env_file {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "loaded .env"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env file"),
    }

    let config: Config = cli.global.to_config()?;
    let command = cli.command.unwrap_or(Command::Serve);

    // Diagnostics must still report when the workspace or terraform is broken.
    if let Command::Check = command {
        let (assistant, problems) = config.diagnostic_assistant().await;
        print_check(&assistant, &problems).await;
        return Ok(());
    }

    let assistant = config.build_assistant().await?;

    match command {
        Command::Serve => {
            McpServer::new(assistant).run_stdio().await?;
        }
        Command::Ask(args) => {
            let reply = assistant.handle_query(&args.query()).await;
            println!("{}", reply.text);
            if reply.is_error {
                std::process::exit(1);
            }
        }
        Command::Resource(args) => match read_resource(&assistant, &args.uri).await {
            Some(text) => println!("{}", text),
            None => bail!("unknown resource: {}", args.uri),
        },
        Command::State => {
            let resources = assistant.runner().state_list().await?;
            if resources.is_empty() {
                println!("No resources found in the current state.");
            } else {
                println!("{}", render_state_table(&resources));
            }
        }
        Command::Check => print_check(&assistant, &[]).await,
    }

    Ok(())
}
