//! Casualwear CLI - Inspect the remote product catalog.
//!
//! # Usage
//!
//! ```bash
//! # List products (optionally only the first N)
//! cw-cli products list --limit 4
//!
//! # Show one product
//! cw-cli products show 12
//!
//! # Filter the catalog the same way the category page does
//! cw-cli products filter --q shirt --gender Men --sort price_asc
//!
//! # Show distinct categories, brands, genders and colors
//! cw-cli products facets
//! ```
//!
//! # Commands
//!
//! - `products list` - List products
//! - `products show` - Show a single product
//! - `products filter` - Filter, sort and list products
//! - `products facets` - Distinct filter values

#![cfg_attr(not(test), forbid(unsafe_code))]

use casualwear_core::ProductId;
use clap::{Parser, Subcommand};

mod commands;

use commands::products::FilterArgs;

#[derive(Parser)]
#[command(name = "cw-cli")]
#[command(author, version, about = "Casualwear CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the remote product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Only show the first N products
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show a single product
    Show {
        /// Product ID
        id: ProductId,
    },
    /// Filter, sort and list products
    Filter(FilterArgs),
    /// Show distinct filter values across the catalog
    Facets,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List { limit } => commands::products::list(limit).await?,
            ProductsAction::Show { id } => commands::products::show(id).await?,
            ProductsAction::Filter(args) => commands::products::filter(&args).await?,
            ProductsAction::Facets => commands::products::facets().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_filter_with_repeated_flags() {
        let cli = Cli::try_parse_from([
            "cw-cli", "products", "filter", "--color", "black", "--color", "white", "--max-price",
            "50", "--sort", "price_asc",
        ])
        .unwrap();

        let Commands::Products {
            action: ProductsAction::Filter(args),
        } = cli.command
        else {
            panic!("expected products filter");
        };
        assert_eq!(args.colors, vec!["black", "white"]);
        assert_eq!(args.max_price.as_deref(), Some("50"));
        assert_eq!(args.sort, "price_asc");
    }

    #[test]
    fn test_parse_show_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["cw-cli", "products", "show", "abc"]).is_err());

        let cli = Cli::try_parse_from(["cw-cli", "products", "show", "12"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Products {
                action: ProductsAction::Show { id }
            } if id == ProductId::new(12)
        ));
    }
}
