use anyhow::Result;
use clap::Parser;
use log::debug;

use aws_eks_get_token::cli::{Cli, filter_eks_get_token_args};
use aws_eks_get_token::commands::get_token_command;
use aws_eks_get_token::config::{self, ProcessEnv};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries the credential, so logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = filter_eks_get_token_args(std::env::args());
    let cli = Cli::parse_from(args);
    debug!("Parsed arguments: {:?}", cli);

    let request = config::resolve(cli.into(), &ProcessEnv)?;
    let output = get_token_command(&request).await?;
    println!("{}", output);
    Ok(())
}
