//! CLI tool for working with return path tokens.
//!
//! Useful when debugging feedback links by hand or building them in other
//! services.
//!
//! # Usage
//!
//! ```bash
//! # Encode a token
//! cargo run --bin return-path -- encode --base-url /app-name --path /some-page --url /app-name/some-page
//!
//! # Decode a token taken from a feedback link
//! cargo run --bin return-path -- decode eyJiYXNlVXJsIjoiL2FwcC1uYW1lIn0
//!
//! # Build a complete feedback link
//! cargo run --bin return-path -- attach /app-name/feedback --base-url /app-name --path /some-page --url /app-name/some-page
//! ```

use feedback_return::domain::{RETURN_PATH_PARAM, ReturnPathToken, UrlValue};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;

/// CLI tool for return path tokens.
#[derive(Parser)]
#[command(name = "return-path")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token for a return path
    Encode {
        #[command(flatten)]
        fields: TokenFields,
    },

    /// Print the return path carried by a token
    Decode {
        /// Token value, as found in the `f_t` query parameter
        token: String,
    },

    /// Print a feedback link carrying a return path
    Attach {
        /// Feedback link, relative or absolute
        feedback_url: String,

        #[command(flatten)]
        fields: TokenFields,
    },
}

/// The three optional return path fields.
#[derive(Args)]
struct TokenFields {
    /// Mount path of the form application
    #[arg(short, long)]
    base_url: Option<String>,

    /// Page path below the mount
    #[arg(short, long)]
    path: Option<String>,

    /// Full path and query to return to
    #[arg(short, long)]
    url: Option<String>,
}

impl TokenFields {
    fn token(&self) -> Result<ReturnPathToken> {
        let token = ReturnPathToken::new(
            self.base_url.as_deref(),
            self.path.as_deref(),
            self.url.as_deref(),
        )?;
        if token.is_empty() {
            anyhow::bail!("At least one of --base-url, --path or --url is required");
        }
        Ok(token)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { fields } => {
            println!("{}", fields.token()?.encode());
        }
        Commands::Decode { token } => decode(&token)?,
        Commands::Attach {
            feedback_url,
            fields,
        } => {
            let token = fields.token()?;
            let mut link = UrlValue::parse(&feedback_url)?;
            link.set_param(RETURN_PATH_PARAM, &token.encode());
            println!("{}", link);
        }
    }

    Ok(())
}

/// Prints each present field, or the reason the token is unusable.
fn decode(raw: &str) -> Result<()> {
    let token = match ReturnPathToken::decode(Some(raw)) {
        Ok(Some(token)) => token,
        Ok(None) => {
            println!("{}", "Empty token, no return path".yellow());
            return Ok(());
        }
        Err(e) => {
            eprintln!("{} {}", "Unusable token:".red().bold(), e);
            std::process::exit(1);
        }
    };

    println!("{}", "Return path".bright_blue().bold());
    let fields = [
        ("baseUrl", token.base_url()),
        ("path", token.path()),
        ("url", token.url()),
    ];
    for (name, value) in fields {
        match value {
            Some(v) => println!("  {:8} {}", name.bright_white(), v.cyan()),
            None => println!("  {:8} {}", name.bright_white(), "(absent)".dimmed()),
        }
    }

    let json = serde_json::to_string(&token).context("Failed to serialize token")?;
    println!();
    println!("{}", json);

    Ok(())
}
