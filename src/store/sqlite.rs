use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

use super::RecordStore;
use crate::error::{InventoryError, Result};
use crate::models::{
    CategoryDetails, InventoryItem, InventoryRecord, InventoryUpdate, IssuanceRequest,
    IssuanceStatus, MaintenanceRequest, MaintenanceStatus, NewInventoryItem, NewUser, User,
};

/// SQLite-backed record store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL {database_url}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        info!("Connecting to database at {}", database_url);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {database_url}"))?;

        Ok(Self { pool })
    }

    /// Private in-memory database with the schema applied. The pool is pinned
    /// to one connection that never expires, since each SQLite memory
    /// connection is its own database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Database migrations failed")?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Close database connections gracefully
    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

fn parse_column<T>(row: &SqliteRow, column: &str) -> std::result::Result<T, sqlx::Error>
where
    T: FromStr<Err = InventoryError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: InventoryError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn user_from_row(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        gov_id: row.try_get("gov_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        role: parse_column(row, "role")?,
        location: row.try_get("location")?,
        created_at: row.try_get("created_at")?,
    })
}

fn item_from_row(row: &SqliteRow) -> std::result::Result<InventoryItem, sqlx::Error> {
    Ok(InventoryItem {
        item_id: row.try_get("item_id")?,
        category: parse_column(row, "category")?,
        item_type: row.try_get("item_type")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        location: row.try_get("location")?,
        condition: row.try_get("item_condition")?,
        acquisition_date: row.try_get("acquisition_date")?,
        expiry_date: row.try_get("expiry_date")?,
        return_date: row.try_get("return_date")?,
        last_inspection_date: row.try_get("last_inspection_date")?,
        price: row.try_get("price")?,
        supplier: row.try_get("supplier")?,
        maintenance_schedule: row.try_get("maintenance_schedule")?,
        maintenance_charge: row.try_get("maintenance_charge")?,
        assigned_to: row.try_get("assigned_to")?,
        issued_to: row.try_get("issued_to")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn issuance_from_row(row: &SqliteRow) -> std::result::Result<IssuanceRequest, sqlx::Error> {
    Ok(IssuanceRequest {
        id: row.try_get("id")?,
        requester_id: row.try_get("requester_id")?,
        incharge_id: row.try_get("incharge_id")?,
        name: row.try_get("name")?,
        category: parse_column(row, "category")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        expected_delivery_date: row.try_get("expected_delivery_date")?,
        purpose: row.try_get("purpose")?,
        expected_usage_duration: row.try_get("expected_usage_duration")?,
        approval_needed_by: row.try_get("approval_needed_by")?,
        priority_level: parse_column(row, "priority_level")?,
        is_damaged: row.try_get("is_damaged")?,
        status: parse_column(row, "status")?,
        decision_note: row.try_get("decision_note")?,
        decided_at: row.try_get("decided_at")?,
        created_at: row.try_get("created_at")?,
    })
}

fn maintenance_from_row(row: &SqliteRow) -> std::result::Result<MaintenanceRequest, sqlx::Error> {
    Ok(MaintenanceRequest {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        item_id: row.try_get("item_id")?,
        issue_description: row.try_get("issue_description")?,
        status: parse_column(row, "status")?,
        technician_id: row.try_get("technician_id")?,
        resolution_details: row.try_get("resolution_details")?,
        discard_reason: row.try_get("discard_reason")?,
        approval_date: row.try_get("approval_date")?,
        completion_date: row.try_get("completion_date")?,
        created_at: row.try_get("created_at")?,
    })
}

async fn insert_extension(
    conn: &mut SqliteConnection,
    item_id: &str,
    details: &CategoryDetails,
) -> std::result::Result<(), sqlx::Error> {
    let columns = details.columns();
    let placeholders: Vec<String> = (2..=columns.len() + 1).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {} (item_id, {}) VALUES (?1, {})",
        details.category().table(),
        columns.join(", "),
        placeholders.join(", ")
    );

    let mut query = sqlx::query(&sql).bind(item_id);
    for value in details.values() {
        query = query.bind(value);
    }
    query.execute(&mut *conn).await?;
    Ok(())
}

async fn update_extension(
    conn: &mut SqliteConnection,
    item_id: &str,
    details: &CategoryDetails,
) -> std::result::Result<(), sqlx::Error> {
    let assignments: Vec<String> = details
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ?{}", i + 2))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE item_id = ?1",
        details.category().table(),
        assignments.join(", ")
    );

    let mut query = sqlx::query(&sql).bind(item_id);
    for value in details.values() {
        query = query.bind(value);
    }
    query.execute(&mut *conn).await?;
    Ok(())
}

/// Load the extension record of `item`. A missing row means the item was
/// written outside this store and is reported as a store error.
async fn load_extension(
    conn: &mut SqliteConnection,
    item: &InventoryItem,
) -> std::result::Result<CategoryDetails, sqlx::Error> {
    let columns = CategoryDetails::columns_of(item.category);
    let sql = format!(
        "SELECT {} FROM {} WHERE item_id = ?1",
        columns.join(", "),
        item.category.table()
    );
    let row = sqlx::query(&sql)
        .bind(&item.item_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    CategoryDetails::from_columns(item.category, |column| row.try_get::<Option<String>, _>(column))
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            gov_id: user.gov_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role,
            location: user.location.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, gov_id, name, email, phone, role, location, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.gov_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.location)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        debug!(user_id = %user.id, role = %user.role, "User stored");
        Ok(user)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_user_by_gov_id(&self, gov_id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE gov_id = ?1")
            .bind(gov_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_incharge_at(&self, location: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM users
            WHERE location = ?1 AND role = 'incharge'
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(location)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn insert_inventory_item(&self, item: &NewInventoryItem, owner_id: &str) -> Result<InventoryRecord> {
        let (item, extension) = item.clone().into_item(owner_id, Utc::now());

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO inventory_items (
                item_id, category, item_type, description, quantity, location, item_condition,
                acquisition_date, expiry_date, return_date, last_inspection_date, price, supplier,
                maintenance_schedule, maintenance_charge, assigned_to, issued_to, user_id, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
        )
        .bind(&item.item_id)
        .bind(item.category.as_str())
        .bind(&item.item_type)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(&item.location)
        .bind(&item.condition)
        .bind(item.acquisition_date)
        .bind(item.expiry_date)
        .bind(item.return_date)
        .bind(item.last_inspection_date)
        .bind(item.price)
        .bind(&item.supplier)
        .bind(&item.maintenance_schedule)
        .bind(item.maintenance_charge)
        .bind(&item.assigned_to)
        .bind(&item.issued_to)
        .bind(&item.user_id)
        .bind(item.created_at)
        .execute(&mut *tx)
        .await?;

        insert_extension(&mut *tx, &item.item_id, &extension).await?;

        tx.commit().await?;

        debug!(item_id = %item.item_id, category = %item.category, "Inventory item stored");
        Ok(InventoryRecord { item, extension })
    }

    async fn find_inventory_item(&self, item_id: &str) -> Result<Option<InventoryRecord>> {
        let mut conn = self.pool.acquire().await?;

        let Some(row) = sqlx::query("SELECT * FROM inventory_items WHERE item_id = ?1")
            .bind(item_id)
            .fetch_optional(&mut *conn)
            .await?
        else {
            return Ok(None);
        };

        let item = item_from_row(&row)?;
        let extension = load_extension(&mut *conn, &item).await?;
        Ok(Some(InventoryRecord { item, extension }))
    }

    async fn list_inventory_items(&self) -> Result<Vec<InventoryItem>> {
        let rows = sqlx::query("SELECT * FROM inventory_items ORDER BY item_id ASC")
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(item_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    async fn update_inventory_item(&self, item_id: &str, update: &InventoryUpdate) -> Result<Option<InventoryRecord>> {
        let mut tx = self.pool.begin().await?;

        // Write first so the transaction holds the write lock before it reads.
        // A deferred read cannot be upgraded while another writer is active.
        let locked = sqlx::query("UPDATE inventory_items SET quantity = quantity WHERE item_id = ?1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
        if locked.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query("SELECT * FROM inventory_items WHERE item_id = ?1")
            .bind(item_id)
            .fetch_one(&mut *tx)
            .await?;

        let mut item = item_from_row(&row)?;
        let mut extension = load_extension(&mut *tx, &item).await?;

        if !update.fields.is_empty() {
            item.apply_patch(&update.fields);
            sqlx::query(
                r#"
                UPDATE inventory_items SET
                    item_type = ?2, description = ?3, quantity = ?4, location = ?5,
                    item_condition = ?6, acquisition_date = ?7, expiry_date = ?8,
                    return_date = ?9, last_inspection_date = ?10, price = ?11, supplier = ?12,
                    maintenance_schedule = ?13, maintenance_charge = ?14, assigned_to = ?15,
                    issued_to = ?16
                WHERE item_id = ?1
                "#,
            )
            .bind(&item.item_id)
            .bind(&item.item_type)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(&item.location)
            .bind(&item.condition)
            .bind(item.acquisition_date)
            .bind(item.expiry_date)
            .bind(item.return_date)
            .bind(item.last_inspection_date)
            .bind(item.price)
            .bind(&item.supplier)
            .bind(&item.maintenance_schedule)
            .bind(item.maintenance_charge)
            .bind(&item.assigned_to)
            .bind(&item.issued_to)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(patch) = &update.extension {
            // A mismatched relation drops the transaction, rolling back the column patch.
            extension.merge(patch)?;
            update_extension(&mut *tx, &item.item_id, &extension).await?;
        }

        tx.commit().await?;
        Ok(Some(InventoryRecord { item, extension }))
    }

    async fn delete_inventory_item(&self, item_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE item_id = ?1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_issuance_request(&self, request: &IssuanceRequest) -> Result<IssuanceRequest> {
        sqlx::query(
            r#"
            INSERT INTO issuance_requests (
                id, requester_id, incharge_id, name, category, description, quantity,
                expected_delivery_date, purpose, expected_usage_duration, approval_needed_by,
                priority_level, is_damaged, status, decision_note, decided_at, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
        )
        .bind(&request.id)
        .bind(&request.requester_id)
        .bind(&request.incharge_id)
        .bind(&request.name)
        .bind(request.category.as_str())
        .bind(&request.description)
        .bind(request.quantity)
        .bind(request.expected_delivery_date)
        .bind(&request.purpose)
        .bind(&request.expected_usage_duration)
        .bind(request.approval_needed_by)
        .bind(request.priority_level.as_str())
        .bind(request.is_damaged)
        .bind(request.status.as_str())
        .bind(&request.decision_note)
        .bind(request.decided_at)
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;

        Ok(request.clone())
    }

    async fn find_issuance_request(&self, id: &str) -> Result<Option<IssuanceRequest>> {
        let row = sqlx::query("SELECT * FROM issuance_requests WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(issuance_from_row).transpose()?)
    }

    async fn list_issuance_requests_for_incharge(&self, incharge_id: &str) -> Result<Vec<IssuanceRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM issuance_requests
            WHERE incharge_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(incharge_id)
        .fetch_all(&self.pool)
        .await?;

        let requests = rows
            .iter()
            .map(issuance_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(requests)
    }

    async fn save_issuance_decision(&self, request: &IssuanceRequest, expected: IssuanceStatus) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE issuance_requests
            SET status = ?2, decision_note = ?3, decided_at = ?4
            WHERE id = ?1 AND status = ?5
            "#,
        )
        .bind(&request.id)
        .bind(request.status.as_str())
        .bind(&request.decision_note)
        .bind(request.decided_at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_maintenance_request(&self, request: &MaintenanceRequest) -> Result<MaintenanceRequest> {
        sqlx::query(
            r#"
            INSERT INTO maintenance_requests (
                id, user_id, item_id, issue_description, status, technician_id,
                resolution_details, discard_reason, approval_date, completion_date, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&request.id)
        .bind(&request.user_id)
        .bind(&request.item_id)
        .bind(&request.issue_description)
        .bind(request.status.as_str())
        .bind(&request.technician_id)
        .bind(&request.resolution_details)
        .bind(&request.discard_reason)
        .bind(request.approval_date)
        .bind(request.completion_date)
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;

        Ok(request.clone())
    }

    async fn find_maintenance_request(&self, id: &str) -> Result<Option<MaintenanceRequest>> {
        let row = sqlx::query("SELECT * FROM maintenance_requests WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(maintenance_from_row).transpose()?)
    }

    async fn list_maintenance_requests(&self) -> Result<Vec<MaintenanceRequest>> {
        let rows = sqlx::query("SELECT * FROM maintenance_requests ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;

        let requests = rows
            .iter()
            .map(maintenance_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(requests)
    }

    async fn save_maintenance_transition(&self, request: &MaintenanceRequest, expected: MaintenanceStatus) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE maintenance_requests
            SET status = ?2, technician_id = ?3, resolution_details = ?4,
                discard_reason = ?5, approval_date = ?6, completion_date = ?7
            WHERE id = ?1 AND status = ?8
            "#,
        )
        .bind(&request.id)
        .bind(request.status.as_str())
        .bind(&request.technician_id)
        .bind(&request.resolution_details)
        .bind(&request.discard_reason)
        .bind(request.approval_date)
        .bind(request.completion_date)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
