use clap::Parser;
use impearl_api_rust::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so the CLI sees JWT_SECRET and friends.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = impearl_api_rust::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
