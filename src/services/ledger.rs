use chrono::NaiveDateTime;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::model::attendance::{
    AttendanceRecord, AttendanceRow, AttendanceStatus, NOT_RECORDED, ScanAction,
};
use crate::model::student::Student;

const ROW_COLUMNS: &str = "id, barcode, name, section, class, date, in_time, out_time, status";

/// Toggles the barcode between walk-in and walk-out.
///
/// An open `In Library` row is closed; otherwise a new row is opened. The
/// lookup and the write run inside one `BEGIN IMMEDIATE` transaction, so
/// concurrent scans of one barcode queue on the write lock instead of both
/// seeing the same open row.
pub async fn record_scan(
    pool: &SqlitePool,
    barcode: &str,
    student: Option<&Student>,
    class_label: &str,
    now: NaiveDateTime,
) -> Result<(AttendanceRecord, ScanAction), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

    let outcome = match toggle(&mut conn, barcode, student, class_label, now).await {
        Ok(outcome) => sqlx::query("COMMIT")
            .execute(&mut *conn)
            .await
            .map(|_| outcome),
        Err(e) => Err(e),
    };

    if outcome.is_err() {
        if let Err(e) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
            warn!(error = %e, barcode, "Rollback failed");
        }
    }
    outcome
}

async fn toggle(
    conn: &mut SqliteConnection,
    barcode: &str,
    student: Option<&Student>,
    class_label: &str,
    now: NaiveDateTime,
) -> Result<(AttendanceRecord, ScanAction), sqlx::Error> {
    let open_id: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM attendance WHERE barcode = ? AND status = ? ORDER BY id DESC LIMIT 1",
    )
    .bind(barcode)
    .bind(AttendanceStatus::InLibrary.as_ref())
    .fetch_optional(&mut *conn)
    .await?;

    let time = now.format("%H:%M:%S").to_string();
    let mut record = AttendanceRecord {
        roll: barcode.to_string(),
        barcode: barcode.to_string(),
        name: student
            .and_then(Student::name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Student {barcode}")),
        section: student
            .and_then(Student::section)
            .unwrap_or(NOT_RECORDED)
            .to_string(),
        class_name: class_label.to_string(),
        date: now.format("%Y-%m-%d").to_string(),
        in_time: String::new(),
        out_time: NOT_RECORDED.to_string(),
        status: AttendanceStatus::InLibrary.to_string(),
    };

    if let Some(id) = open_id {
        debug!(record_id = id, barcode, "Walk-out");
        sqlx::query("UPDATE attendance SET out_time = ?, status = ? WHERE id = ?")
            .bind(&time)
            .bind(AttendanceStatus::Completed.as_ref())
            .bind(id)
            .execute(&mut *conn)
            .await?;

        record.out_time = time;
        record.status = AttendanceStatus::Completed.to_string();
        return Ok((record, ScanAction::WalkOut));
    }

    debug!(barcode, "Walk-in");
    sqlx::query(
        r#"
        INSERT INTO attendance (barcode, name, section, class, date, in_time, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(barcode)
    .bind(&record.name)
    .bind(&record.section)
    .bind(class_label)
    .bind(&record.date)
    .bind(&time)
    .bind(AttendanceStatus::InLibrary.as_ref())
    .execute(&mut *conn)
    .await?;

    record.in_time = time;
    Ok((record, ScanAction::WalkIn))
}

/// The newest `limit` rows, oldest first.
pub async fn list_recent(pool: &SqlitePool, limit: u32) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
        "SELECT {ROW_COLUMNS} FROM attendance ORDER BY id DESC LIMIT ?"
    ))
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().rev().map(AttendanceRecord::from).collect())
}

/// Every row, oldest first.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
        "SELECT {ROW_COLUMNS} FROM attendance ORDER BY id ASC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AttendanceRecord::from).collect())
}

pub async fn clear(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM attendance").execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[actix_web::test]
    async fn scans_alternate_between_walk_in_and_walk_out() {
        let pool = test_pool().await;

        let (first, action) = record_scan(&pool, "R1", None, "BCA", at(9, 0)).await.unwrap();
        assert_eq!(action, ScanAction::WalkIn);
        assert_eq!(first.name, "Student R1");
        assert_eq!(first.section, NOT_RECORDED);
        assert_eq!(first.in_time, "09:00:00");
        assert_eq!(first.out_time, NOT_RECORDED);
        assert!(first.is_in_library());

        let (second, action) = record_scan(&pool, "R1", None, "BCA", at(11, 30)).await.unwrap();
        assert_eq!(action, ScanAction::WalkOut);
        assert_eq!(second.out_time, "11:30:00");
        assert_eq!(second.in_time, "");
        assert_eq!(second.status, "Completed");

        let (_, action) = record_scan(&pool, "R1", None, "BCA", at(14, 0)).await.unwrap();
        assert_eq!(action, ScanAction::WalkIn);

        let rows = list_recent(&pool, 100).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].in_time, "09:00:00");
        assert_eq!(rows[0].out_time, "11:30:00");
        assert_eq!(rows[0].status, "Completed");
        assert_eq!(rows[1].status, "In Library");
    }

    #[actix_web::test]
    async fn known_student_fills_name_and_section() {
        let pool = test_pool().await;
        let student = Student::new(
            json!({"student_name": "Asha Rai", "dept": "B"})
                .as_object()
                .cloned()
                .unwrap(),
        );

        let (record, _) = record_scan(&pool, "23BCA041", Some(&student), "MCA", at(10, 5))
            .await
            .unwrap();
        assert_eq!(record.name, "Asha Rai");
        assert_eq!(record.section, "B");
        assert_eq!(record.class_name, "MCA");
        assert_eq!(record.date, "2026-03-14");
    }

    #[actix_web::test]
    async fn list_is_capped_and_oldest_first() {
        let pool = test_pool().await;
        for (i, code) in ["A", "B", "C", "D"].iter().enumerate() {
            record_scan(&pool, code, None, "BCA", at(8, i as u32)).await.unwrap();
        }

        let rows = list_recent(&pool, 3).await.unwrap();
        let rolls: Vec<_> = rows.iter().map(|r| r.roll.as_str()).collect();
        assert_eq!(rolls, ["B", "C", "D"]);
    }

    #[actix_web::test]
    async fn clear_removes_every_row() {
        let pool = test_pool().await;
        record_scan(&pool, "A", None, "BCA", at(8, 0)).await.unwrap();
        record_scan(&pool, "B", None, "BCA", at(8, 1)).await.unwrap();

        assert_eq!(clear(&pool).await.unwrap(), 2);
        assert!(list_recent(&pool, 10).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn walk_out_after_midnight_reports_the_scan_date() {
        let pool = test_pool().await;
        let student = Student::new(json!({"name": "Asha Rai"}).as_object().cloned().unwrap());
        record_scan(&pool, "R9", None, "BCA", at(23, 50)).await.unwrap();

        let next_day = NaiveDate::from_ymd_opt(2026, 3, 15)
            .unwrap()
            .and_hms_opt(0, 10, 0)
            .unwrap();
        let (record, action) = record_scan(&pool, "R9", Some(&student), "BCA", next_day)
            .await
            .unwrap();

        assert_eq!(action, ScanAction::WalkOut);
        assert_eq!(record.date, "2026-03-15");
        assert_eq!(record.name, "Asha Rai");
        assert_eq!(list_recent(&pool, 10).await.unwrap()[0].date, "2026-03-14");
    }

    #[actix_web::test]
    async fn concurrent_scans_of_one_barcode_serialize() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("desk.db").display());
        let pool = crate::db::init_db(&url).await.unwrap();

        for round in 0..20 {
            let (a, b) = tokio::join!(
                record_scan(&pool, "R1", None, "BCA", at(9, round)),
                record_scan(&pool, "R1", None, "BCA", at(9, round)),
            );
            let mut actions = vec![a.unwrap().1, b.unwrap().1];
            actions.sort_by_key(|a| a.to_string());
            assert_eq!(actions, [ScanAction::WalkIn, ScanAction::WalkOut]);
        }

        let rows = list_all(&pool).await.unwrap();
        assert_eq!(rows.len(), 20);
        assert!(rows.iter().all(|r| r.status == "Completed"));
    }

    #[actix_web::test]
    async fn list_all_is_oldest_first_without_cap() {
        let pool = test_pool().await;
        for (i, code) in ["A", "B", "C"].iter().enumerate() {
            record_scan(&pool, code, None, "BCA", at(8, i as u32)).await.unwrap();
        }
        let rolls: Vec<_> = list_all(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.roll)
            .collect();
        assert_eq!(rolls, ["A", "B", "C"]);
    }
}
