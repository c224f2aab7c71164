//! India Bazzar CLI - Developer tools for the marketplace.
//!
//! # Usage
//!
//! ```bash
//! # Check registration numbers
//! bazaar-cli validate gstin 27AAPFU0939F1ZV
//! bazaar-cli validate fssai 12345678901234
//!
//! # Resolve a pincode to district and state
//! bazaar-cli pincode 411001
//!
//! # Reverse geocode a position
//! bazaar-cli geocode 18.5204 73.8567
//!
//! # Render Razorpay widget options for a buy-now checkout
//! bazaar-cli checkout-options --name "Basmati Rice" --price 40
//! ```
//!
//! # Commands
//!
//! - `validate` - Check a GSTIN or FSSAI number offline
//! - `pincode` - Postal pincode lookup
//! - `geocode` - Reverse geocoding lookup
//! - `checkout-options` - Print the checkout widget options as JSON

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "bazaar-cli")]
#[command(author, version, about = "India Bazzar developer tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a business registration number
    Validate {
        #[command(subcommand)]
        kind: ValidateKind,
    },
    /// Look up the district and state for a pincode
    Pincode {
        /// Six-digit Indian postal code
        pincode: String,
    },
    /// Look up the address at a position
    Geocode {
        /// Latitude in degrees
        #[arg(allow_hyphen_values = true)]
        latitude: f64,

        /// Longitude in degrees
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },
    /// Print Razorpay checkout options for a product
    CheckoutOptions {
        /// Product name
        #[arg(short, long)]
        name: String,

        /// Price in rupees
        #[arg(short, long)]
        price: String,

        /// Product id
        #[arg(long)]
        product_id: Option<String>,
    },
}

#[derive(Subcommand)]
enum ValidateKind {
    /// 15-character GST identification number
    Gstin { value: String },
    /// 14-digit FSSAI licence number
    Fssai { value: String },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_cli=info,bazaar_marketplace=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result: Result<(), commands::CommandError> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Validate { kind } => match kind {
            ValidateKind::Gstin { value } => commands::validate::gstin(&value)?,
            ValidateKind::Fssai { value } => commands::validate::fssai(&value)?,
        },
        Commands::Pincode { pincode } => commands::lookup::pincode(&pincode).await?,
        Commands::Geocode {
            latitude,
            longitude,
        } => commands::lookup::geocode(latitude, longitude).await?,
        Commands::CheckoutOptions {
            name,
            price,
            product_id,
        } => commands::checkout::options(&name, &price, product_id)?,
    }
    Ok(())
}
