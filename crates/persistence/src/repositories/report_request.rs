//! Report request repository for database operations.

use domain::models::{ReportRequest, RequestFields, RequestStatus};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    DateRangeTypeDb, FileFormatDb, OutputTypeDb, PriorityDb, ReportRequestEntity,
    RequestStatusDb, SourceSystemDb,
};
use crate::metrics::QueryTimer;

const REQUEST_COLUMNS: &str = "id, title, description, output_type, file_format, \
     date_range_type, start_date, end_date, fiscal_year_start, fiscal_year_end, \
     priority, expected_deadline, source_system, data_source, additional_notes, \
     requested_by, assigned_to, status, rejection_reason, created_at, updated_at";

/// Filters for listing report requests.
#[derive(Debug, Clone, Default)]
pub struct RequestListFilter {
    /// Restrict to requests owned by this user. Admin listings leave it unset.
    pub requested_by: Option<Uuid>,
    pub status: Option<RequestStatus>,
    /// Case-insensitive substring match on title and description.
    pub search: Option<String>,
    pub assigned_to: Option<Uuid>,
    /// Requester department, matched through the users table.
    pub department: Option<String>,
    pub created_from: Option<chrono::DateTime<chrono::Utc>>,
    pub created_to: Option<chrono::DateTime<chrono::Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Number of requests carrying one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: RequestStatus,
    pub count: i64,
}

/// Number of requests owned by one department. Null groups requests whose
/// owner has no department on record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentCount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub count: i64,
}

/// Aggregate counts backing the dashboard views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestStats {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
    pub by_department: Vec<DepartmentCount>,
}

/// Zero-filled status breakdown: every status appears in the dashboard even
/// when no request currently carries it.
fn status_breakdown(rows: &[(RequestStatusDb, i64)]) -> Vec<StatusCount> {
    const ALL_STATUSES: [RequestStatus; 5] = [
        RequestStatus::Pending,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Rejected,
        RequestStatus::Cancelled,
    ];

    ALL_STATUSES
        .iter()
        .map(|&status| StatusCount {
            status,
            count: rows
                .iter()
                .find(|(s, _)| RequestStatus::from(*s) == status)
                .map_or(0, |(_, count)| *count),
        })
        .collect()
}

/// Helper for building dynamic WHERE clauses from list filters.
struct RequestFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl RequestFilterBuilder {
    fn build(filter: &RequestListFilter) -> Self {
        let mut conditions = vec!["TRUE".to_string()];
        let mut param_count = 0;

        if filter.requested_by.is_some() {
            param_count += 1;
            conditions.push(format!("requested_by = ${}", param_count));
        }

        if filter.status.is_some() {
            param_count += 1;
            conditions.push(format!("status = ${}", param_count));
        }

        if filter.search.is_some() {
            param_count += 1;
            conditions.push(format!(
                "(title ILIKE ${p} OR description ILIKE ${p})",
                p = param_count
            ));
        }

        if filter.assigned_to.is_some() {
            param_count += 1;
            conditions.push(format!("assigned_to = ${}", param_count));
        }

        if filter.department.is_some() {
            param_count += 1;
            conditions.push(format!(
                "requested_by IN (SELECT id FROM users WHERE department = ${})",
                param_count
            ));
        }

        if filter.created_from.is_some() {
            param_count += 1;
            conditions.push(format!("created_at >= ${}", param_count));
        }

        if filter.created_to.is_some() {
            param_count += 1;
            conditions.push(format!("created_at <= ${}", param_count));
        }

        Self { conditions, param_count }
    }

    fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    fn param_count(&self) -> i32 {
        self.param_count
    }
}

/// Macro to bind list filter parameters to a SQLx builder.
macro_rules! bind_list_filters {
    ($builder:expr, $filter:expr) => {{
        let mut b = $builder;
        if let Some(requested_by) = $filter.requested_by {
            b = b.bind(requested_by);
        }
        if let Some(status) = $filter.status {
            b = b.bind(RequestStatusDb::from(status));
        }
        if let Some(ref search) = $filter.search {
            b = b.bind(format!("%{}%", search));
        }
        if let Some(assigned_to) = $filter.assigned_to {
            b = b.bind(assigned_to);
        }
        if let Some(ref department) = $filter.department {
            b = b.bind(department);
        }
        if let Some(created_from) = $filter.created_from {
            b = b.bind(created_from);
        }
        if let Some(created_to) = $filter.created_to {
            b = b.bind(created_to);
        }
        b
    }};
}

/// Repository for report request database operations.
#[derive(Clone)]
pub struct ReportRequestRepository {
    pool: PgPool,
}

impl ReportRequestRepository {
    /// Creates a new ReportRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new request. Status starts as pending.
    pub async fn insert(
        &self,
        fields: &RequestFields,
        requested_by: Uuid,
    ) -> Result<ReportRequest, sqlx::Error> {
        let timer = QueryTimer::new("insert_request");
        let entity = sqlx::query_as::<_, ReportRequestEntity>(&format!(
            r#"
            INSERT INTO report_requests (
                title, description, output_type, file_format, date_range_type,
                start_date, end_date, fiscal_year_start, fiscal_year_end,
                priority, expected_deadline, source_system, data_source,
                additional_notes, requested_by, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(OutputTypeDb::from(fields.output_type))
        .bind(fields.file_format.map(FileFormatDb::from))
        .bind(DateRangeTypeDb::from(fields.date_range_type))
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(&fields.fiscal_year_start)
        .bind(&fields.fiscal_year_end)
        .bind(PriorityDb::from(fields.priority))
        .bind(fields.expected_deadline)
        .bind(SourceSystemDb::from(fields.source_system))
        .bind(&fields.data_source)
        .bind(&fields.additional_notes)
        .bind(requested_by)
        .bind(RequestStatusDb::Pending)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        entity.map(ReportRequest::from)
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ReportRequest>, sqlx::Error> {
        let timer = QueryTimer::new("find_request_by_id");
        let entity = sqlx::query_as::<_, ReportRequestEntity>(&format!(
            "SELECT {} FROM report_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(ReportRequest::from))
    }

    /// Overwrite the content fields of a request.
    pub async fn update_fields(
        &self,
        id: Uuid,
        fields: &RequestFields,
    ) -> Result<Option<ReportRequest>, sqlx::Error> {
        let timer = QueryTimer::new("update_request_fields");
        let entity = sqlx::query_as::<_, ReportRequestEntity>(&format!(
            r#"
            UPDATE report_requests
            SET title = $2, description = $3, output_type = $4, file_format = $5,
                date_range_type = $6, start_date = $7, end_date = $8,
                fiscal_year_start = $9, fiscal_year_end = $10, priority = $11,
                expected_deadline = $12, source_system = $13, data_source = $14,
                additional_notes = $15, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(OutputTypeDb::from(fields.output_type))
        .bind(fields.file_format.map(FileFormatDb::from))
        .bind(DateRangeTypeDb::from(fields.date_range_type))
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(&fields.fiscal_year_start)
        .bind(&fields.fiscal_year_end)
        .bind(PriorityDb::from(fields.priority))
        .bind(fields.expected_deadline)
        .bind(SourceSystemDb::from(fields.source_system))
        .bind(&fields.data_source)
        .bind(&fields.additional_notes)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(ReportRequest::from))
    }

    /// Set the status of a request. The rejection reason is stored when the
    /// new status is rejected and cleared otherwise.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: RequestStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<ReportRequest>, sqlx::Error> {
        let reason = match status {
            RequestStatus::Rejected => rejection_reason,
            _ => None,
        };
        let timer = QueryTimer::new("set_request_status");
        let entity = sqlx::query_as::<_, ReportRequestEntity>(&format!(
            r#"
            UPDATE report_requests
            SET status = $2, rejection_reason = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(RequestStatusDb::from(status))
        .bind(reason)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(ReportRequest::from))
    }

    /// Set the status of several requests at once. Returns the updated rows;
    /// unknown IDs are silently skipped.
    pub async fn set_status_bulk(
        &self,
        ids: &[Uuid],
        status: RequestStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Vec<ReportRequest>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let reason = match status {
            RequestStatus::Rejected => rejection_reason,
            _ => None,
        };
        let timer = QueryTimer::new("set_request_status_bulk");
        let entities = sqlx::query_as::<_, ReportRequestEntity>(&format!(
            r#"
            UPDATE report_requests
            SET status = $2, rejection_reason = $3, updated_at = NOW()
            WHERE id = ANY($1)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(ids)
        .bind(RequestStatusDb::from(status))
        .bind(reason)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(entities?.into_iter().map(ReportRequest::from).collect())
    }

    /// Assign or unassign a request.
    pub async fn assign(
        &self,
        id: Uuid,
        assigned_to: Option<Uuid>,
    ) -> Result<Option<ReportRequest>, sqlx::Error> {
        let timer = QueryTimer::new("assign_request");
        let entity = sqlx::query_as::<_, ReportRequestEntity>(&format!(
            r#"
            UPDATE report_requests
            SET assigned_to = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(assigned_to)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(ReportRequest::from))
    }

    /// Delete a request together with its comments, attachments, view markers
    /// and notification log rows, in one transaction. Returns whether the
    /// request existed.
    pub async fn delete_cascade(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_request_cascade");
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM attachments WHERE request_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM comments WHERE request_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM request_views WHERE request_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM notification_logs WHERE request_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM report_requests WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Aggregate counts for the dashboard: totals by status (zero-filled) and
    /// by requester department, largest departments first.
    pub async fn stats(&self) -> Result<RequestStats, sqlx::Error> {
        let timer = QueryTimer::new("request_stats");

        let status_rows: Vec<(RequestStatusDb, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM report_requests GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        let department_rows: Vec<(Option<String>, i64)> = sqlx::query_as(
            r#"
            SELECT u.department, COUNT(*)
            FROM report_requests r
            JOIN users u ON r.requested_by = u.id
            GROUP BY u.department
            ORDER BY COUNT(*) DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        let by_status = status_breakdown(&status_rows);
        let total = by_status.iter().map(|c| c.count).sum();
        let by_department = department_rows
            .into_iter()
            .map(|(department, count)| DepartmentCount { department, count })
            .collect();

        Ok(RequestStats {
            total,
            by_status,
            by_department,
        })
    }

    /// List requests with filtering and pagination, newest first. Returns the
    /// page and the total matching count.
    pub async fn list(
        &self,
        filter: &RequestListFilter,
    ) -> Result<(Vec<ReportRequest>, i64), sqlx::Error> {
        let page = filter.page.unwrap_or(1);
        let per_page = filter.per_page.unwrap_or(20).clamp(1, 100);
        let offset = crate::repositories::page_offset(page, per_page);

        let builder = RequestFilterBuilder::build(filter);
        let where_clause = builder.where_clause();
        let param_count = builder.param_count();

        let timer = QueryTimer::new("list_requests");

        let count_query = format!(
            "SELECT COUNT(*) FROM report_requests WHERE {}",
            where_clause
        );
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_list_filters!(count_builder, filter);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            r#"
            SELECT {}
            FROM report_requests
            WHERE {}
            ORDER BY created_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            REQUEST_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let list_builder = sqlx::query_as::<_, ReportRequestEntity>(&list_query);
        let list_builder = bind_list_filters!(list_builder, filter);
        let entities = list_builder
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        timer.record();
        Ok((entities.into_iter().map(ReportRequest::from).collect(), total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_breakdown_zero_fills_missing_statuses() {
        let rows = vec![
            (RequestStatusDb::Pending, 4),
            (RequestStatusDb::Completed, 2),
        ];
        let breakdown = status_breakdown(&rows);
        assert_eq!(breakdown.len(), 5);
        assert_eq!(
            breakdown[0],
            StatusCount {
                status: RequestStatus::Pending,
                count: 4
            }
        );
        assert_eq!(breakdown[1].count, 0);
        assert_eq!(breakdown[2].count, 2);
        assert_eq!(breakdown[3].count, 0);
        assert_eq!(breakdown[4].count, 0);
    }

    #[test]
    fn test_status_breakdown_empty_table() {
        let breakdown = status_breakdown(&[]);
        assert_eq!(breakdown.len(), 5);
        assert!(breakdown.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_filter_builder_no_filters() {
        let filter = RequestListFilter::default();
        let builder = RequestFilterBuilder::build(&filter);
        assert_eq!(builder.where_clause(), "TRUE");
        assert_eq!(builder.param_count(), 0);
    }

    #[test]
    fn test_filter_builder_all_filters() {
        let filter = RequestListFilter {
            requested_by: Some(Uuid::new_v4()),
            status: Some(RequestStatus::Pending),
            search: Some("opd".into()),
            assigned_to: Some(Uuid::new_v4()),
            department: Some("Informatics".into()),
            created_from: Some(chrono::Utc::now()),
            created_to: Some(chrono::Utc::now()),
            page: None,
            per_page: None,
        };
        let builder = RequestFilterBuilder::build(&filter);
        assert_eq!(builder.param_count(), 7);
        let clause = builder.where_clause();
        assert!(clause.contains("requested_by = $1"));
        assert!(clause.contains("status = $2"));
        assert!(clause.contains("title ILIKE $3"));
        assert!(clause.contains("assigned_to = $4"));
        assert!(clause.contains("department = $5"));
        assert!(clause.contains("created_at >= $6"));
        assert!(clause.contains("created_at <= $7"));
    }
}
