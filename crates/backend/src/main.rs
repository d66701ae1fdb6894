//! # Harvest Backend - Main Entry Point
//!
//! Image classification server for the Harvest service.

use clap::Parser;
use harvest_backend::BackendCliOptions;
use harvest_shared::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = BackendCliOptions::parse();
    cli.logging.init_logging();
    cli.run().await
}
