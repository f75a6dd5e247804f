//! Human-readable sequential identifiers (`CAN2026007`, `JOB/2026/012`,
//! `PAC003`, `Enq05`) backed by an atomic counter row per key.

use crate::error::{AppError, AppResult};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

const NEXT_VALUE_SQL: &str = "INSERT INTO id_sequences (name, value) VALUES ($1, 1) \
     ON CONFLICT (name) DO UPDATE SET value = id_sequences.value + 1 \
     RETURNING value";

/// 原子递增并返回计数器的新值，并发创建不会得到相同编号
pub async fn next_sequence_value<C: ConnectionTrait>(db: &C, key: &str) -> AppResult<i64> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        NEXT_VALUE_SQL,
        [key.into()],
    );
    let row = db
        .query_one(stmt)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Sequence {key} returned no row")))?;
    Ok(row.try_get::<i64>("", "value")?)
}

pub fn candidate_sequence_key(year: i32) -> String {
    format!("candidate:{year}")
}

pub fn job_sequence_key(year: i32) -> String {
    format!("job:{year}")
}

pub const PACKAGE_SEQUENCE_KEY: &str = "package";
pub const ENQUIRY_SEQUENCE_KEY: &str = "enquiry";

pub fn format_candidate_id(year: i32, seq: i64) -> String {
    format!("CAN{year}{seq:03}")
}

pub fn format_job_id(year: i32, seq: i64) -> String {
    format!("JOB/{year}/{seq:03}")
}

pub fn format_package_id(seq: i64) -> String {
    format!("PAC{seq:03}")
}

pub fn format_enquiry_no(seq: i64) -> String {
    format!("Enq{seq:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{MockDatabase, Value};
    use std::collections::BTreeMap;

    #[test]
    fn test_identifier_formats() {
        assert_eq!(format_candidate_id(2026, 7), "CAN2026007");
        assert_eq!(format_job_id(2026, 12), "JOB/2026/012");
        assert_eq!(format_package_id(3), "PAC003");
        assert_eq!(format_enquiry_no(5), "Enq05");
    }

    #[test]
    fn test_identifiers_grow_past_padding() {
        assert_eq!(format_candidate_id(2026, 1234), "CAN20261234");
        assert_eq!(format_package_id(1000), "PAC1000");
        assert_eq!(format_enquiry_no(123), "Enq123");
    }

    #[tokio::test]
    async fn test_next_sequence_value_reads_returned_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "value",
                Value::BigInt(Some(8)),
            )])]])
            .into_connection();

        let value = next_sequence_value(&db, &candidate_sequence_key(2026))
            .await
            .unwrap();
        assert_eq!(value, 8);
    }
}
