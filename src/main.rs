use clap::Parser;
use std::process;
use wavefront_sender::app::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = app::cli::run(cli).await {
        eprintln!("wavefront-sender: {e:#}");
        process::exit(1);
    }
}
