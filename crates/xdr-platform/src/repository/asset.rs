//! Asset Repository

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::parse_column;
use crate::domain::{Asset, AssetStatus};
use crate::error::Result;

const COLUMNS: &str =
    "id, name, asset_type, os, ip, status, last_seen, owner, department, risk_score";

#[derive(Clone)]
pub struct AssetRepository {
    pool: SqlitePool,
}

impl AssetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self, status: Option<AssetStatus>) -> Result<Vec<Asset>> {
        let rows = match status {
            Some(status) => {
                let sql = format!("SELECT {} FROM assets WHERE status = ? ORDER BY id", COLUMNS);
                sqlx::query(&sql)
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {} FROM assets ORDER BY id", COLUMNS);
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };
        rows.iter().map(row_to_asset).collect()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Asset>> {
        let sql = format!("SELECT {} FROM assets WHERE id = ?", COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_asset).transpose()
    }

    pub async fn insert_if_absent(&self, asset: &Asset) -> Result<bool> {
        let sql = format!(
            "INSERT OR IGNORE INTO assets ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        );
        let result = sqlx::query(&sql)
            .bind(&asset.id)
            .bind(&asset.name)
            .bind(&asset.asset_type)
            .bind(&asset.os)
            .bind(&asset.ip)
            .bind(asset.status.as_str())
            .bind(asset.last_seen)
            .bind(&asset.owner)
            .bind(&asset.department)
            .bind(asset.risk_score)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_asset(row: &SqliteRow) -> Result<Asset> {
    let status: String = row.try_get("status")?;
    Ok(Asset {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        asset_type: row.try_get("asset_type")?,
        os: row.try_get("os")?,
        ip: row.try_get("ip")?,
        status: parse_column(&status, "assets.status")?,
        last_seen: row.try_get("last_seen")?,
        owner: row.try_get("owner")?,
        department: row.try_get("department")?,
        risk_score: row.try_get("risk_score")?,
    })
}
