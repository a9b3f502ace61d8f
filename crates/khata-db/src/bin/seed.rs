//! # Seed Data Generator
//!
//! Populates the database with a demo restaurant and served orders so the
//! billing flow can be exercised locally.
//!
//! ## Usage
//! ```bash
//! # Demo restaurant with 5 tables (default)
//! cargo run -p khata-db --bin seed
//!
//! # More tables
//! cargo run -p khata-db --bin seed -- --tables 12
//!
//! # Specify database path (otherwise $KHATA_DATABASE_PATH or ./khata.db)
//! cargo run -p khata-db --bin seed -- --db ./data/khata.db
//! ```
//!
//! ## Generated Data
//! - Restaurant `rest-demo`, regular GST at 5%, service charge off,
//!   packaging ₹20 for takeaway/delivery, prefix `DEMO`
//! - Per table: one or two orders in `served` status, drawn from a small menu
//! - Every third table gets an extra `preparing` order (not billable yet)

use chrono::Utc;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use khata_core::{Money, Order, OrderLine, OrderStatus, OrderType, Rate, TaxConfig};
use khata_db::{Database, DbConfig, Restaurant};

/// Demo restaurant id.
const RESTAURANT_ID: &str = "rest-demo";

/// Menu: (item id, name, price in paise)
const MENU: &[(&str, &str, i64)] = &[
    ("paneer-tikka", "Paneer Tikka", 24000),
    ("dal-makhani", "Dal Makhani", 19000),
    ("butter-naan", "Butter Naan", 4500),
    ("jeera-rice", "Jeera Rice", 14000),
    ("masala-chai", "Masala Chai", 3000),
    ("sweet-lassi", "Sweet Lassi", 6000),
    ("gulab-jamun", "Gulab Jamun", 8000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut tables: usize = 5;
    let mut config = DbConfig::from_env();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tables" | "-t" => {
                if i + 1 < args.len() {
                    tables = args[i + 1].parse().unwrap_or(5);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Khata Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -t, --tables <N>   Number of tables with served orders (default: 5)");
                println!("  -d, --db <PATH>    Database file path (default: $KHATA_DATABASE_PATH or ./khata.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %config.database_path.display(), tables, "Seeding database");

    let db = Database::new(config).await?;

    let tax_config = TaxConfig {
        packaging_enabled: true,
        default_packaging_charge: Money::from_rupees(20),
        service_charge_rate: Rate::from_percent(10),
        bill_prefix: "DEMO".to_string(),
        ..TaxConfig::default()
    };
    let mut restaurant = Restaurant::new(RESTAURANT_ID, "Khata Demo Dhaba").with_tax_config(tax_config);
    restaurant.gstin = Some("27AAPFU0939F1ZV".to_string());
    db.restaurants().upsert(&restaurant).await?;
    info!(restaurant_id = RESTAURANT_ID, "Restaurant ready");

    let mut created = 0;
    for table in 1..=tables {
        let table_number = format!("T{table}");

        let existing = db
            .orders()
            .list_unbilled_for_table(RESTAURANT_ID, &table_number)
            .await?;
        if !existing.is_empty() {
            info!(table = %table_number, count = existing.len(), "Table already has orders, skipping");
            continue;
        }

        let mut orders = vec![demo_order(&table_number, table, OrderStatus::Served)];
        if table % 2 == 0 {
            orders.push(demo_order(&table_number, table + 3, OrderStatus::Completed));
        }
        if table % 3 == 0 {
            orders.push(demo_order(&table_number, table + 5, OrderStatus::Preparing));
        }

        for order in &orders {
            db.orders().insert(order).await?;
            created += 1;
        }
    }

    info!(created, "Seed complete");
    db.close().await;

    Ok(())
}

/// Builds a dine-in order with two or three menu lines picked from `seed`.
fn demo_order(table_number: &str, seed: usize, status: OrderStatus) -> Order {
    let now = Utc::now();
    let line_count = 2 + seed % 2;

    let items = (0..line_count)
        .map(|n| {
            let (item_id, name, price) = MENU[(seed * 3 + n * 2) % MENU.len()];
            OrderLine {
                item_id: item_id.to_string(),
                name: name.to_string(),
                quantity: 1 + ((seed + n) % 3) as i64,
                unit_price: Money::from_paise(price),
            }
        })
        .collect();

    Order {
        id: Uuid::new_v4().to_string(),
        restaurant_id: RESTAURANT_ID.to_string(),
        table_number: table_number.to_string(),
        order_type: OrderType::DineIn,
        status,
        items,
        bill_id: None,
        created_at: now,
        updated_at: now,
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show repository calls
/// - Default: `info,khata=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,khata=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
