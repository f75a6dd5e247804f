use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let pool = Database::connect(options).await?;
    log::info!("Connected to database");
    Ok(pool)
}

/// 为每个服务生成一个指向同一 sqlx 连接池的句柄
pub fn share_pool(pool: &DbPool) -> AppResult<DbPool> {
    match pool {
        DatabaseConnection::SqlxPostgresPoolConnection(conn) => {
            Ok(DatabaseConnection::SqlxPostgresPoolConnection(conn.clone()))
        }
        _ => Err(AppError::ConfigError(
            "Only PostgreSQL connection pools can be shared".to_string(),
        )),
    }
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_share_pool_rejects_non_postgres_connection() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        assert!(matches!(share_pool(&db), Err(AppError::ConfigError(_))));
    }
}
