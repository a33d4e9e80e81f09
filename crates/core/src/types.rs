/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Tasks are identified by an opaque UUID handed back to the caller.
pub type TaskId = uuid::Uuid;
