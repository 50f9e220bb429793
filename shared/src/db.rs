//! Repository 基础设施 (feature = "db")
//!
//! 各服务的 db 层共用的底座：错误类型、BaseRepository 和
//! RecordId 的 serde 辅助。具体的表模型和查询归各服务自己所有。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::error::AppError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// 存储层排他约束命中 (如预订时间窗冲突)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(m) => AppError::NotFound(m),
            RepoError::Duplicate(m) => AppError::Duplicate(m),
            // 输掉存储层排他竞争 = 容量错误，不是系统错误
            RepoError::Conflict(m) => AppError::Capacity(m),
            RepoError::Database(m) => AppError::Database(m),
            RepoError::Validation(m) => AppError::Validation(m),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Common serde helpers for handling record IDs
///
/// 支持两种 RecordId 格式的反序列化：
/// - 字符串格式 "table:id" (来自 API JSON)
/// - SurrealDB 原生格式 (来自数据库)
pub mod serde_helpers {
    use serde::{Deserialize, Deserializer, Serializer};
    use surrealdb::RecordId;

    /// 内部辅助：同时支持字符串和原生 RecordId 格式
    #[derive(Debug, Clone)]
    struct FlexibleRecordId(RecordId);

    impl<'de> Deserialize<'de> for FlexibleRecordId {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            use serde::de::{self, Visitor};
            use std::fmt;

            struct FlexibleVisitor;

            impl<'de> Visitor<'de> for FlexibleVisitor {
                type Value = FlexibleRecordId;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("a string 'table:id' or RecordId")
                }

                fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
                where
                    E: de::Error,
                {
                    value
                        .parse::<RecordId>()
                        .map(FlexibleRecordId)
                        .map_err(|_| de::Error::custom(format!("invalid RecordId: {}", value)))
                }

                fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
                where
                    M: de::MapAccess<'de>,
                {
                    // 委托给 RecordId 原生反序列化
                    RecordId::deserialize(de::value::MapAccessDeserializer::new(map))
                        .map(FlexibleRecordId)
                }
            }

            deserializer.deserialize_any(FlexibleVisitor)
        }
    }

    /// Option<RecordId> serialization as "table:id" string
    pub mod option_record_id {
        use super::*;

        pub fn serialize<S>(id: &Option<RecordId>, s: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match id {
                Some(id) => s.serialize_some(&id.to_string()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(d: D) -> Result<Option<RecordId>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<FlexibleRecordId>::deserialize(d).map(|opt| opt.map(|f| f.0))
        }
    }
}
