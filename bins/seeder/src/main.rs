//! Database seeder for Payflow development and testing.
//!
//! Creates a pair of funded USD wallets and prints their ids for use with
//! the transfer and interest endpoints. Each run creates fresh wallets.
//!
//! Usage: cargo run --bin seeder

use payflow_db::repositories::wallet::WalletRepository;
use payflow_shared::config::DatabaseConfig;

/// Opening balance for seeded wallets: 1,000.00 in minor units.
const OPENING_BALANCE: i64 = 100_000;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let config = DatabaseConfig {
        url: database_url,
        max_connections: 5,
        min_connections: 1,
    };

    println!("Connecting to database...");
    let db = payflow_db::connect(&config)
        .await
        .expect("Failed to connect to database");

    let repo = WalletRepository::new(db);

    println!("Seeding wallets...");
    for _ in 0..2 {
        let wallet = repo
            .create("USD", OPENING_BALANCE)
            .await
            .expect("Failed to create wallet");
        println!(
            "  Created wallet {} ({} {} minor units)",
            wallet.id, wallet.balance, wallet.currency
        );
    }

    println!("Seeding complete!");
}
