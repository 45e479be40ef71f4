use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use dotenvy::dotenv;
use std::env;

pub type Pool = diesel_async::pooled_connection::bb8::Pool<diesel_async::AsyncPgConnection>;

/// Build the shared Postgres connection pool from `DATABASE_URL`.
///
/// `DATABASE_POOL_SIZE` caps the pool (default 10). Connections are checked
/// on checkout so a recycled dead connection never reaches a handler.
pub async fn create_pool() -> Pool {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let max_size: u32 = env::var("DATABASE_POOL_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);

    let config = AsyncDieselConnectionManager::<diesel_async::AsyncPgConnection>::new(database_url);
    Pool::builder()
        .test_on_check_out(true)
        .max_size(max_size)
        .build(config)
        .await
        .expect("failed to build database pool")
}
