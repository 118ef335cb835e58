//! Postgres/PostGIS repository implementation using Diesel.
//!
//! The spatial queries are composed by [`crate::db::query`] and executed
//! through `sql_query` with typed positional binds. The reference listings use
//! the Diesel DSL over the tables in `schema.rs`.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Optional migration of the schema contract for local provisioning
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_RUN_MIGRATIONS`: Apply the embedded schema migration on startup (default: false)

use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Double, Integer, Text};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;
use tracing::{debug, info};

use crate::api::{
    District, NearbyFilter, NearbySchool, Program, SchoolDetail, SchoolId, SchoolProgram,
};
use crate::db::models::{SchoolProgramRow, SchoolRow};
use crate::db::query::{
    compose_nearby, describe_filter, BindValue, SCHOOL_DETAIL_SQL, SCHOOL_PROGRAMS_SQL,
};
use crate::db::repository::{
    ErrorContext, ReferenceRepository, RepositoryError, RepositoryResult, SchoolRepository,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Apply the embedded schema migration when the pool is created
    pub run_migrations: bool,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            run_migrations: false,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
    /// - `PG_POOL_MAX`: Maximum pool size (default: 10)
    /// - `PG_POOL_MIN`: Minimum pool size (default: 1)
    /// - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
    /// - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
    /// - `PG_RUN_MIGRATIONS`: `true` to apply the schema migration (default: false)
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let run_migrations = std::env::var("PG_RUN_MIGRATIONS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
            run_migrations,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres with PostGIS.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Create a new repository backed by a connection pool.
    ///
    /// # Arguments
    /// * `config` - Database configuration
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if the pool cannot be built or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        if config.run_migrations {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
            info!("Schema migrations applied");
        }

        Ok(Self { pool })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Lease one pooled connection for the duration of `f`.
    ///
    /// Runs on the blocking pool. The lease is returned to the pool when `f`
    /// finishes, whether it succeeded or not. Failures are not retried.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| RepositoryError::from(e).with_operation(operation))?;
            f(&mut conn).map_err(|e| e.with_operation(operation))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

/// Attach composed binds to a boxed raw query in placeholder order.
fn bind_all(sql: String, binds: Vec<BindValue>) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    let mut query = sql_query(sql).into_boxed::<Pg>();
    for bind in binds {
        query = match bind {
            BindValue::Float(v) => query.bind::<Double, _>(v),
            BindValue::Int(v) => query.bind::<Integer, _>(v),
            BindValue::BigInt(v) => query.bind::<BigInt, _>(v),
            BindValue::Text(v) => query.bind::<Text, _>(v),
        };
    }
    query
}

fn load_school_programs(
    conn: &mut PgConnection,
    school_id: SchoolId,
) -> RepositoryResult<Vec<SchoolProgram>> {
    let rows = sql_query(SCHOOL_PROGRAMS_SQL)
        .bind::<BigInt, _>(school_id.value())
        .load::<SchoolProgramRow>(conn)
        .map_err(map_diesel_error)?;
    Ok(rows.into_iter().map(SchoolProgram::from).collect())
}

#[async_trait]
impl SchoolRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn nearby_schools(&self, filter: &NearbyFilter) -> RepositoryResult<Vec<NearbySchool>> {
        let composed = compose_nearby(filter);
        debug!(
            filter = %describe_filter(filter),
            binds = composed.placeholder_count(),
            "Executing nearby schools query"
        );

        self.with_conn("nearby_schools", move |conn| {
            let rows = bind_all(composed.sql, composed.binds)
                .load::<SchoolRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(SchoolRow::into_nearby).collect())
        })
        .await
    }

    async fn get_school(&self, school_id: SchoolId) -> RepositoryResult<SchoolDetail> {
        self.with_conn("get_school", move |conn| {
            let row = sql_query(SCHOOL_DETAIL_SQL)
                .bind::<BigInt, _>(school_id.value())
                .load::<SchoolRow>(conn)
                .map_err(map_diesel_error)?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        "School not found",
                        ErrorContext::new("get_school")
                            .with_entity("school")
                            .with_entity_id(school_id),
                    )
                })?;

            let programs = load_school_programs(conn, school_id)?;
            Ok(row.into_detail(programs))
        })
        .await
    }

    async fn fetch_school_programs(
        &self,
        school_id: SchoolId,
    ) -> RepositoryResult<Vec<SchoolProgram>> {
        self.with_conn("fetch_school_programs", move |conn| {
            load_school_programs(conn, school_id)
        })
        .await
    }
}

#[async_trait]
impl ReferenceRepository for PostgresRepository {
    async fn list_districts(&self) -> RepositoryResult<Vec<District>> {
        self.with_conn("list_districts", |conn| {
            let rows = districts::table
                .select(DistrictRow::as_select())
                .order((districts::name.asc(), districts::district_id.asc()))
                .load::<DistrictRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(District::from).collect())
        })
        .await
    }

    async fn list_programs(&self) -> RepositoryResult<Vec<Program>> {
        self.with_conn("list_programs", |conn| {
            let rows = programs::table
                .select(ProgramRow::as_select())
                .order((programs::name.asc(), programs::program_id.asc()))
                .load::<ProgramRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Program::from).collect())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PostgresConfig::default();
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.min_pool_size, 1);
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_with_url() {
        let config = PostgresConfig::with_url("postgres://localhost/schools");
        assert_eq!(config.database_url, "postgres://localhost/schools");
        assert_eq!(config.connection_timeout_sec, 30);
    }
}
