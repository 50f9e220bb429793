//! Database Module
//!
//! 嵌入式 SurrealDB 存储 (RocksDB 引擎；测试用内存引擎)

pub mod models;
pub mod repository;

use shared::error::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

/// 打开数据库并初始化 schema
pub async fn connect(db_path: &str) -> Result<Surreal<Db>, AppError> {
    let db = Surreal::new::<RocksDb>(db_path)
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;
    db.use_ns("forchetta")
        .use_db("booking")
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

    define_schema(&db).await?;
    tracing::info!("Database ready at {}", db_path);

    Ok(db)
}

/// 内存数据库 - 测试专用
pub async fn connect_memory() -> Result<Surreal<Db>, AppError> {
    let db = Surreal::new::<Mem>(())
        .await
        .map_err(|e| AppError::database(format!("Failed to open in-memory database: {}", e)))?;
    db.use_ns("forchetta")
        .use_db("booking")
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

    define_schema(&db).await?;
    Ok(db)
}

/// 定义表和二级索引
///
/// 重叠查询走 (table_id, start_at) 索引。
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS reservation SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS idx_reservation_table_start
            ON TABLE reservation COLUMNS table_id, start_at;
        DEFINE INDEX IF NOT EXISTS idx_reservation_customer
            ON TABLE reservation COLUMNS customer_id;
        DEFINE INDEX IF NOT EXISTS idx_reservation_restaurant_status
            ON TABLE reservation COLUMNS restaurant_id, status;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {}", e)))?
    .check()
    .map_err(|e| AppError::database(format!("Failed to define schema: {}", e)))?;

    Ok(())
}
