use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::auth::{issue_token, Claims};

#[derive(Parser)]
#[command(name = "impearl")]
#[command(about = "IMPEARL CLI - development helpers for the marketplace API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication token helpers")]
    Auth {
        #[command(subcommand)]
        cmd: AuthCommands,
    },

    #[command(about = "Running server helpers")]
    Server {
        #[command(subcommand)]
        cmd: ServerCommands,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Mint a JWT for a user id and role, signed with the configured secret")]
    Token {
        #[arg(help = "User id (UUID)")]
        user_id: Uuid,

        #[arg(long, default_value = "freelancer", help = "Role claim")]
        role: String,
    },
}

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check a running server's health endpoint")]
    Health {
        #[arg(long, default_value = "http://localhost:5000", help = "Server base URL")]
        url: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Auth { cmd } => match cmd {
            AuthCommands::Token { user_id, role } => {
                let token = issue_token(&Claims::new(user_id, role))?;
                println!("{}", token);
                Ok(())
            }
        },
        Commands::Server { cmd } => match cmd {
            ServerCommands::Health { url } => {
                let response =
                    reqwest::get(format!("{}/health", url.trim_end_matches('/'))).await?;
                let status = response.status();
                let body: serde_json::Value = response.json().await?;
                println!("{}", serde_json::to_string_pretty(&body)?);
                anyhow::ensure!(status.is_success(), "health check failed with HTTP {}", status);
                Ok(())
            }
        },
    }
}
