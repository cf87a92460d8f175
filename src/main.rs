//! shop-locator CLI entry point
//!
//! Resolve a location and rank vendors by driving distance

use shop_locator::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
