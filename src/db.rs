use crate::error::AppError;
use prometheus::IntCounter;
use sqlx::{AnyConnection, Connection};
use std::ops::{Deref, DerefMut};
use tracing::{debug, error, info, warn};

const MYSQL_SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        description VARCHAR(1024) NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        department VARCHAR(50) NOT NULL,
        salary DOUBLE NOT NULL
    )
    "#,
];

const SQLITE_SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        department TEXT NOT NULL,
        salary REAL NOT NULL
    )
    "#,
];

/// Opens one connection per request. No pool, no retry.
#[derive(Clone)]
pub struct Database {
    url: String,
    connect_errors: Option<IntCounter>,
}

impl Database {
    pub fn new(url: impl Into<String>, connect_errors: Option<IntCounter>) -> Self {
        sqlx::any::install_default_drivers();

        Self {
            url: url.into(),
            connect_errors,
        }
    }

    pub async fn acquire(&self) -> Result<DbConn, AppError> {
        match AnyConnection::connect(&self.url).await {
            Ok(conn) => Ok(DbConn { conn }),
            Err(e) => {
                if let Some(counter) = &self.connect_errors {
                    counter.inc();
                }
                error!(error = %e, "Database connection failed");
                Err(AppError::StoreUnavailable)
            }
        }
    }

    /// Creates the `items` and `employees` tables if they are missing.
    pub async fn init_schema(&self) -> Result<(), AppError> {
        let mut conn = self.acquire().await?;
        let result = create_tables(&mut conn).await;
        conn.release().await;
        result?;

        info!("Tables 'items' and 'employees' initialized");
        Ok(())
    }
}

fn is_sqlite(conn: &AnyConnection) -> bool {
    conn.backend_name().eq_ignore_ascii_case("sqlite")
}

/// Id generated by the last INSERT on this connection.
///
/// The Any driver does not report it for SQLite, so it is read back with SQL on both backends.
pub async fn last_insert_id(conn: &mut AnyConnection) -> Result<i64, AppError> {
    let sql = if is_sqlite(conn) {
        "SELECT last_insert_rowid()"
    } else {
        "SELECT CAST(LAST_INSERT_ID() AS SIGNED)"
    };

    let id: i64 = sqlx::query_scalar(sql).fetch_one(&mut *conn).await?;
    Ok(id)
}

async fn create_tables(conn: &mut AnyConnection) -> Result<(), AppError> {
    let statements = if is_sqlite(conn) {
        SQLITE_SCHEMA
    } else {
        MYSQL_SCHEMA
    };

    for sql in statements {
        sqlx::query(sql).execute(&mut *conn).await?;
    }
    Ok(())
}

/// A connection scoped to one request.
///
/// `release` closes it gracefully; dropping the guard on an early return
/// closes the underlying socket, so the connection never outlives the request.
pub struct DbConn {
    conn: AnyConnection,
}

impl DbConn {
    pub async fn release(self) {
        if let Err(e) = self.conn.close().await {
            warn!(error = %e, "Closing database connection failed");
        } else {
            debug!("Database connection released");
        }
    }
}

impl Deref for DbConn {
    type Target = AnyConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for DbConn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDb;

    #[actix_web::test]
    async fn init_schema_is_idempotent() {
        let test_db = TestDb::new().await;
        test_db.db.init_schema().await.unwrap();

        let mut conn = test_db.db.acquire().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        conn.release().await;

        assert_eq!(count, 0);
    }

    #[actix_web::test]
    async fn last_insert_id_follows_the_insert() {
        let test_db = TestDb::new().await;
        let mut conn = test_db.db.acquire().await.unwrap();

        let mut ids = Vec::new();
        for name in ["a", "b"] {
            sqlx::query("INSERT INTO items (name) VALUES (?)")
                .bind(name)
                .execute(&mut *conn)
                .await
                .unwrap();
            ids.push(last_insert_id(&mut conn).await.unwrap());
        }
        conn.release().await;

        assert!(ids[0] > 0);
        assert!(ids[1] > ids[0]);
    }

    #[actix_web::test]
    async fn unreachable_store_is_reported_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("missing").join("nested").join("db.sqlite").display()
        );
        let counter = IntCounter::new("test_connection_errors_total", "test").unwrap();
        let db = Database::new(url, Some(counter.clone()));

        let err = db.acquire().await.err().unwrap();

        assert!(matches!(err, AppError::StoreUnavailable));
        assert_eq!(counter.get(), 1);
    }
}
