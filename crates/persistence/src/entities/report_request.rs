//! Report request entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{
    DateRangeType, FileFormat, OutputType, Priority, ReportRequest, RequestStatus, SourceSystem,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
pub enum RequestStatusDb {
    Pending,
    InProgress,
    Completed,
    Rejected,
    Cancelled,
}

impl From<RequestStatusDb> for RequestStatus {
    fn from(status: RequestStatusDb) -> Self {
        match status {
            RequestStatusDb::Pending => RequestStatus::Pending,
            RequestStatusDb::InProgress => RequestStatus::InProgress,
            RequestStatusDb::Completed => RequestStatus::Completed,
            RequestStatusDb::Rejected => RequestStatus::Rejected,
            RequestStatusDb::Cancelled => RequestStatus::Cancelled,
        }
    }
}

impl From<RequestStatus> for RequestStatusDb {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => RequestStatusDb::Pending,
            RequestStatus::InProgress => RequestStatusDb::InProgress,
            RequestStatus::Completed => RequestStatusDb::Completed,
            RequestStatus::Rejected => RequestStatusDb::Rejected,
            RequestStatus::Cancelled => RequestStatusDb::Cancelled,
        }
    }
}

/// Database enum for output type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "output_type", rename_all = "snake_case")]
pub enum OutputTypeDb {
    File,
    HosxpReport,
    Dashboard,
    Other,
}

impl From<OutputTypeDb> for OutputType {
    fn from(value: OutputTypeDb) -> Self {
        match value {
            OutputTypeDb::File => OutputType::File,
            OutputTypeDb::HosxpReport => OutputType::HosxpReport,
            OutputTypeDb::Dashboard => OutputType::Dashboard,
            OutputTypeDb::Other => OutputType::Other,
        }
    }
}

impl From<OutputType> for OutputTypeDb {
    fn from(value: OutputType) -> Self {
        match value {
            OutputType::File => OutputTypeDb::File,
            OutputType::HosxpReport => OutputTypeDb::HosxpReport,
            OutputType::Dashboard => OutputTypeDb::Dashboard,
            OutputType::Other => OutputTypeDb::Other,
        }
    }
}

/// Database enum for file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "file_format", rename_all = "snake_case")]
pub enum FileFormatDb {
    Excel,
    Pdf,
    Csv,
    Word,
}

impl From<FileFormatDb> for FileFormat {
    fn from(value: FileFormatDb) -> Self {
        match value {
            FileFormatDb::Excel => FileFormat::Excel,
            FileFormatDb::Pdf => FileFormat::Pdf,
            FileFormatDb::Csv => FileFormat::Csv,
            FileFormatDb::Word => FileFormat::Word,
        }
    }
}

impl From<FileFormat> for FileFormatDb {
    fn from(value: FileFormat) -> Self {
        match value {
            FileFormat::Excel => FileFormatDb::Excel,
            FileFormat::Pdf => FileFormatDb::Pdf,
            FileFormat::Csv => FileFormatDb::Csv,
            FileFormat::Word => FileFormatDb::Word,
        }
    }
}

/// Database enum for date range type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "date_range_type", rename_all = "snake_case")]
pub enum DateRangeTypeDb {
    Specific,
    FiscalYear,
    Custom,
}

impl From<DateRangeTypeDb> for DateRangeType {
    fn from(value: DateRangeTypeDb) -> Self {
        match value {
            DateRangeTypeDb::Specific => DateRangeType::Specific,
            DateRangeTypeDb::FiscalYear => DateRangeType::FiscalYear,
            DateRangeTypeDb::Custom => DateRangeType::Custom,
        }
    }
}

impl From<DateRangeType> for DateRangeTypeDb {
    fn from(value: DateRangeType) -> Self {
        match value {
            DateRangeType::Specific => DateRangeTypeDb::Specific,
            DateRangeType::FiscalYear => DateRangeTypeDb::FiscalYear,
            DateRangeType::Custom => DateRangeTypeDb::Custom,
        }
    }
}

/// Database enum for priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "priority", rename_all = "snake_case")]
pub enum PriorityDb {
    Low,
    Medium,
    High,
    Urgent,
}

impl From<PriorityDb> for Priority {
    fn from(value: PriorityDb) -> Self {
        match value {
            PriorityDb::Low => Priority::Low,
            PriorityDb::Medium => Priority::Medium,
            PriorityDb::High => Priority::High,
            PriorityDb::Urgent => Priority::Urgent,
        }
    }
}

impl From<Priority> for PriorityDb {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Low => PriorityDb::Low,
            Priority::Medium => PriorityDb::Medium,
            Priority::High => PriorityDb::High,
            Priority::Urgent => PriorityDb::Urgent,
        }
    }
}

/// Database enum for source system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "source_system", rename_all = "snake_case")]
pub enum SourceSystemDb {
    Hosxp,
    Hosoffice,
    Php,
    Other,
}

impl From<SourceSystemDb> for SourceSystem {
    fn from(value: SourceSystemDb) -> Self {
        match value {
            SourceSystemDb::Hosxp => SourceSystem::Hosxp,
            SourceSystemDb::Hosoffice => SourceSystem::Hosoffice,
            SourceSystemDb::Php => SourceSystem::Php,
            SourceSystemDb::Other => SourceSystem::Other,
        }
    }
}

impl From<SourceSystem> for SourceSystemDb {
    fn from(value: SourceSystem) -> Self {
        match value {
            SourceSystem::Hosxp => SourceSystemDb::Hosxp,
            SourceSystem::Hosoffice => SourceSystemDb::Hosoffice,
            SourceSystem::Php => SourceSystemDb::Php,
            SourceSystem::Other => SourceSystemDb::Other,
        }
    }
}

/// Database row mapping for the report_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct ReportRequestEntity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub output_type: OutputTypeDb,
    pub file_format: Option<FileFormatDb>,
    pub date_range_type: DateRangeTypeDb,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub fiscal_year_start: Option<String>,
    pub fiscal_year_end: Option<String>,
    pub priority: PriorityDb,
    pub expected_deadline: Option<NaiveDate>,
    pub source_system: SourceSystemDb,
    pub data_source: Option<String>,
    pub additional_notes: Option<String>,
    pub requested_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub status: RequestStatusDb,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReportRequestEntity> for ReportRequest {
    fn from(entity: ReportRequestEntity) -> Self {
        ReportRequest {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            output_type: entity.output_type.into(),
            file_format: entity.file_format.map(Into::into),
            date_range_type: entity.date_range_type.into(),
            start_date: entity.start_date,
            end_date: entity.end_date,
            fiscal_year_start: entity.fiscal_year_start,
            fiscal_year_end: entity.fiscal_year_end,
            priority: entity.priority.into(),
            expected_deadline: entity.expected_deadline,
            source_system: entity.source_system.into(),
            data_source: entity.data_source,
            additional_notes: entity.additional_notes,
            requested_by: entity.requested_by,
            assigned_to: entity.assigned_to,
            status: entity.status.into(),
            rejection_reason: entity.rejection_reason,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_db_conversion_roundtrip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
        ] {
            let db: RequestStatusDb = status.into();
            let back: RequestStatus = db.into();
            assert_eq!(back, status);
        }
    }
}
