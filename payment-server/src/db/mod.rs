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
        .use_db("payment")
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
        .use_db("payment")
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

    define_schema(&db).await?;
    Ok(db)
}

/// 定义表和二级索引
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS payment SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS idx_payment_order
            ON TABLE payment COLUMNS order_id;
        DEFINE INDEX IF NOT EXISTS idx_payment_customer
            ON TABLE payment COLUMNS customer_id;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {}", e)))?
    .check()
    .map_err(|e| AppError::database(format!("Failed to define schema: {}", e)))?;

    Ok(())
}
