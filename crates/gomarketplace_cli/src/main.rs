//! CLI probe for the cart core.
//!
//! # Responsibility
//! - Verify `gomarketplace_core` linkage without the Flutter runtime.
//! - Print the persisted cart for local inspection.
//!
//! Usage: `gomarketplace_cli [db_path]`. Without an argument the path comes
//! from `GOMARKETPLACE_DB_PATH` or the temp directory.

use gomarketplace_core::{CartConfig, CartProvider, LoadOutcome};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("gomarketplace_core ping={}", gomarketplace_core::ping());
    println!(
        "gomarketplace_core version={}",
        gomarketplace_core::core_version()
    );

    let config = std::env::args()
        .nth(1)
        .map_or_else(CartConfig::from_env, CartConfig::new);
    println!("cart db={}", config.db_path.display());

    let provider = CartProvider::new();
    let outcome = match provider.mount(&config) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("cart mount failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let LoadOutcome::Recovered { reason } = &outcome {
        eprintln!("saved cart unreadable: {reason}");
    }

    let listed = provider.with_cart(|cart| {
        let products = cart.products();
        for item in products {
            println!("{}\tqty={}\tprice={:.2}", item.id, item.quantity, item.price);
        }
        println!(
            "items={} units={} total={:.2}",
            products.len(),
            products.total_quantity(),
            products.total_price()
        );
    });
    if let Err(err) = listed {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
