//! mqprobe CLI binary

use clap::Parser;
use mqprobe::StoreClient;
use mqprobe::cli::{Cli, handle_cli_command};

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let base_url = match cli.resolve_base_url() {
        Ok(base_url) => base_url,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    let client = StoreClient::new(base_url);
    if !handle_cli_command(&client, cli.command).await {
        std::process::exit(1);
    }
}
