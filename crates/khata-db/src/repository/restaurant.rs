//! # Restaurant Repository
//!
//! Reads and stores the per-restaurant tax configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::bill::{parse_enum, rate};
use khata_core::{Money, TaxConfig};

/// A restaurant and its billing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    /// The restaurant's own GSTIN, printed on invoices.
    pub gstin: Option<String>,
    pub tax_config: TaxConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Restaurant {
    /// New restaurant with the default tax configuration.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Restaurant {
            id: id.into(),
            name: name.into(),
            gstin: None,
            tax_config: TaxConfig::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the tax configuration.
    pub fn with_tax_config(mut self, tax_config: TaxConfig) -> Self {
        self.tax_config = tax_config;
        self
    }
}

/// Repository for restaurant database operations.
#[derive(Debug, Clone)]
pub struct RestaurantRepository {
    pool: SqlitePool,
}

impl RestaurantRepository {
    /// Creates a new RestaurantRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RestaurantRepository { pool }
    }

    /// Gets a restaurant by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Restaurant>> {
        let row: Option<RestaurantRow> = sqlx::query_as("SELECT * FROM restaurants WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Restaurant::try_from).transpose()
    }

    /// Gets the tax configuration, failing with `NotFound` for unknown restaurants.
    pub async fn get_tax_config(&self, id: &str) -> DbResult<TaxConfig> {
        self.get(id)
            .await?
            .map(|r| r.tax_config)
            .ok_or_else(|| DbError::not_found("Restaurant", id))
    }

    /// Inserts or replaces a restaurant's configuration.
    ///
    /// `created_at` is kept from the first insert.
    pub async fn upsert(&self, restaurant: &Restaurant) -> DbResult<()> {
        debug!(id = %restaurant.id, prefix = %restaurant.tax_config.bill_prefix, "Upserting restaurant");

        let config = &restaurant.tax_config;
        sqlx::query(
            r#"
            INSERT INTO restaurants (
                id, name, gstin, gst_scheme, gst_rate_bps,
                service_charge_enabled, service_charge_rate_bps,
                round_off_enabled, packaging_enabled, default_packaging_paise,
                bill_prefix, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                gstin = excluded.gstin,
                gst_scheme = excluded.gst_scheme,
                gst_rate_bps = excluded.gst_rate_bps,
                service_charge_enabled = excluded.service_charge_enabled,
                service_charge_rate_bps = excluded.service_charge_rate_bps,
                round_off_enabled = excluded.round_off_enabled,
                packaging_enabled = excluded.packaging_enabled,
                default_packaging_paise = excluded.default_packaging_paise,
                bill_prefix = excluded.bill_prefix,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&restaurant.id)
        .bind(&restaurant.name)
        .bind(&restaurant.gstin)
        .bind(config.gst_scheme.as_str())
        .bind(config.gst_rate.bps() as i64)
        .bind(config.service_charge_enabled)
        .bind(config.service_charge_rate.bps() as i64)
        .bind(config.round_off_enabled)
        .bind(config.packaging_enabled)
        .bind(config.default_packaging_charge.paise())
        .bind(&config.bill_prefix)
        .bind(restaurant.created_at)
        .bind(restaurant.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RestaurantRow {
    id: String,
    name: String,
    gstin: Option<String>,
    gst_scheme: String,
    gst_rate_bps: i64,
    service_charge_enabled: bool,
    service_charge_rate_bps: i64,
    round_off_enabled: bool,
    packaging_enabled: bool,
    default_packaging_paise: i64,
    bill_prefix: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RestaurantRow> for Restaurant {
    type Error = DbError;

    fn try_from(row: RestaurantRow) -> DbResult<Self> {
        Ok(Restaurant {
            id: row.id,
            name: row.name,
            gstin: row.gstin,
            tax_config: TaxConfig {
                gst_scheme: parse_enum("restaurants.gst_scheme", &row.gst_scheme)?,
                gst_rate: rate("restaurants.gst_rate_bps", row.gst_rate_bps)?,
                service_charge_enabled: row.service_charge_enabled,
                service_charge_rate: rate(
                    "restaurants.service_charge_rate_bps",
                    row.service_charge_rate_bps,
                )?,
                round_off_enabled: row.round_off_enabled,
                packaging_enabled: row.packaging_enabled,
                default_packaging_charge: Money::from_paise(row.default_packaging_paise),
                bill_prefix: row.bill_prefix,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
