//! Rocket Shoes CLI - Cart management from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rs-cart show
//!
//! # Add one unit of product 1
//! rs-cart add 1
//!
//! # Set product 1 to three units
//! rs-cart update 1 3
//!
//! # Remove product 1
//! rs-cart remove 1
//! ```
//!
//! # Commands
//!
//! - `show` - Print cart lines, item count and subtotal
//! - `add` - Add one unit of a product
//! - `remove` - Remove a product's line
//! - `update` - Set a product's line to an exact amount
//!
//! Configuration is read from the environment (see `rocket_shoes_cart::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocket_shoes_core::ProductId;

mod commands;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "Rocket Shoes cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the amount of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New amount (at least 1)
        amount: u32,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocket_shoes_cart=info,rocket_shoes_cli=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Show => commands::cart::show()?,
        Commands::Add { product_id } => commands::cart::add(product_id).await?,
        Commands::Remove { product_id } => commands::cart::remove(product_id)?,
        Commands::Update { product_id, amount } => {
            commands::cart::update(product_id, amount).await?;
        }
    }
    Ok(())
}
