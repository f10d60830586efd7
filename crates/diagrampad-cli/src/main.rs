//! diagrampad CLI - keep, edit and preview Mermaid diagrams

mod cli;
mod colorizer;
mod config;
mod prompt;
mod shell;

use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli_args = cli::Cli::parse();
    let app = cli::DiagrampadApp::new(config::Config::resolve(&cli_args));

    if let Err(e) = app.run(cli_args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
