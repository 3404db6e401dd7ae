//! Report request domain models and field validation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Title prefix applied when a request is duplicated.
pub const COPY_PREFIX: &str = "[Copy] ";

/// Status of a report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    /// Terminal states cannot be left by user-initiated transitions. An admin
    /// may still move a terminal request elsewhere via a direct status update.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Completed | RequestStatus::Rejected | RequestStatus::Cancelled
        )
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::InProgress => write!(f, "in_progress"),
            RequestStatus::Completed => write!(f, "completed"),
            RequestStatus::Rejected => write!(f, "rejected"),
            RequestStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "in_progress" => Ok(RequestStatus::InProgress),
            "completed" => Ok(RequestStatus::Completed),
            "rejected" => Ok(RequestStatus::Rejected),
            "cancelled" => Ok(RequestStatus::Cancelled),
            _ => Err(format!("Unknown request status: {}", s)),
        }
    }
}

/// What the requester wants delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    File,
    HosxpReport,
    Dashboard,
    Other,
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputType::File => write!(f, "file"),
            OutputType::HosxpReport => write!(f, "hosxp_report"),
            OutputType::Dashboard => write!(f, "dashboard"),
            OutputType::Other => write!(f, "other"),
        }
    }
}

/// File format for `OutputType::File` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Excel,
    Pdf,
    Csv,
    Word,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Excel => write!(f, "excel"),
            FileFormat::Pdf => write!(f, "pdf"),
            FileFormat::Csv => write!(f, "csv"),
            FileFormat::Word => write!(f, "word"),
        }
    }
}

/// How the requested date range is described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangeType {
    Specific,
    FiscalYear,
    Custom,
}

impl std::fmt::Display for DateRangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateRangeType::Specific => write!(f, "specific"),
            DateRangeType::FiscalYear => write!(f, "fiscal_year"),
            DateRangeType::Custom => write!(f, "custom"),
        }
    }
}

/// Request priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Urgent => write!(f, "urgent"),
        }
    }
}

/// Origin system the data should come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSystem {
    Hosxp,
    Hosoffice,
    Php,
    Other,
}

impl std::fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceSystem::Hosxp => write!(f, "hosxp"),
            SourceSystem::Hosoffice => write!(f, "hosoffice"),
            SourceSystem::Php => write!(f, "php"),
            SourceSystem::Other => write!(f, "other"),
        }
    }
}

/// A report request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportRequest {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub output_type: OutputType,
    /// Non-null iff `output_type == File`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_format: Option<FileFormat>,
    pub date_range_type: DateRangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year_end: Option<String>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_deadline: Option<NaiveDate>,
    pub source_system: SourceSystem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    /// Owner. Immutable after creation.
    pub requested_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
    pub status: RequestStatus,
    /// Non-null iff `status == Rejected`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content fields accepted by create and update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RequestFields {
    #[validate(custom(function = "shared::validation::validate_title"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_output_type")]
    pub output_type: OutputType,
    #[serde(default)]
    pub file_format: Option<FileFormat>,
    #[serde(default = "default_date_range_type")]
    pub date_range_type: DateRangeType,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub fiscal_year_start: Option<String>,
    #[serde(default)]
    pub fiscal_year_end: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub expected_deadline: Option<NaiveDate>,
    #[serde(default = "default_source_system")]
    pub source_system: SourceSystem,
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

fn default_output_type() -> OutputType {
    OutputType::File
}

fn default_date_range_type() -> DateRangeType {
    DateRangeType::Specific
}

fn default_priority() -> Priority {
    Priority::Medium
}

fn default_source_system() -> SourceSystem {
    SourceSystem::Hosxp
}

fn field_error(code: &'static str, message: &str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.to_string().into());
    err
}

impl RequestFields {
    /// Validates the fields and normalizes the conditional ones.
    ///
    /// Invariants enforced:
    /// - `file_format` is populated iff `output_type == File`
    /// - exactly one of {start/end dates, fiscal-year labels} is populated,
    ///   matching `date_range_type`; `Custom` carries neither
    pub fn validated(mut self) -> Result<RequestFields, ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        match self.output_type {
            OutputType::File => {
                if self.file_format.is_none() {
                    errors.add(
                        "file_format",
                        field_error("file_format_required", "File format is required for file output"),
                    );
                }
            }
            _ => self.file_format = None,
        }

        match self.date_range_type {
            DateRangeType::Specific => {
                match (self.start_date, self.end_date) {
                    (Some(start), Some(end)) => {
                        if end < start {
                            errors.add(
                                "end_date",
                                field_error("date_order", "End date must not be before start date"),
                            );
                        }
                    }
                    _ => {
                        errors.add(
                            "start_date",
                            field_error("dates_required", "Start and end dates are required for a specific range"),
                        );
                    }
                }
                self.fiscal_year_start = None;
                self.fiscal_year_end = None;
            }
            DateRangeType::FiscalYear => {
                match (&self.fiscal_year_start, &self.fiscal_year_end) {
                    (Some(start), Some(end)) => {
                        if let Err(err) = shared::validation::validate_fiscal_year_label(start) {
                            errors.add("fiscal_year_start", err);
                        }
                        if let Err(err) = shared::validation::validate_fiscal_year_label(end) {
                            errors.add("fiscal_year_end", err);
                        }
                    }
                    _ => {
                        errors.add(
                            "fiscal_year_start",
                            field_error(
                                "fiscal_years_required",
                                "Fiscal year labels are required for a fiscal-year range",
                            ),
                        );
                    }
                }
                self.start_date = None;
                self.end_date = None;
            }
            DateRangeType::Custom => {
                self.start_date = None;
                self.end_date = None;
                self.fiscal_year_start = None;
                self.fiscal_year_end = None;
            }
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(errors)
        }
    }

    /// Names of fields whose values differ from the stored request. Used for
    /// the update audit entry.
    pub fn changed_fields(&self, existing: &ReportRequest) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.title != existing.title {
            changed.push("title");
        }
        if self.description != existing.description {
            changed.push("description");
        }
        if self.output_type != existing.output_type {
            changed.push("output_type");
        }
        if self.file_format != existing.file_format {
            changed.push("file_format");
        }
        if self.date_range_type != existing.date_range_type {
            changed.push("date_range_type");
        }
        if self.start_date != existing.start_date {
            changed.push("start_date");
        }
        if self.end_date != existing.end_date {
            changed.push("end_date");
        }
        if self.fiscal_year_start != existing.fiscal_year_start {
            changed.push("fiscal_year_start");
        }
        if self.fiscal_year_end != existing.fiscal_year_end {
            changed.push("fiscal_year_end");
        }
        if self.priority != existing.priority {
            changed.push("priority");
        }
        if self.expected_deadline != existing.expected_deadline {
            changed.push("expected_deadline");
        }
        if self.source_system != existing.source_system {
            changed.push("source_system");
        }
        if self.data_source != existing.data_source {
            changed.push("data_source");
        }
        if self.additional_notes != existing.additional_notes {
            changed.push("additional_notes");
        }
        changed
    }

    /// Content fields copied from an existing request for duplication. Status,
    /// assignment and identity are not carried over; the title is prefixed.
    pub fn copy_of(original: &ReportRequest) -> RequestFields {
        RequestFields {
            title: format!("{}{}", COPY_PREFIX, original.title),
            description: original.description.clone(),
            output_type: original.output_type,
            file_format: original.file_format,
            date_range_type: original.date_range_type,
            start_date: original.start_date,
            end_date: original.end_date,
            fiscal_year_start: original.fiscal_year_start.clone(),
            fiscal_year_end: original.fiscal_year_end.clone(),
            priority: original.priority,
            expected_deadline: original.expected_deadline,
            source_system: original.source_system,
            data_source: original.data_source.clone(),
            additional_notes: original.additional_notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn fields() -> RequestFields {
        RequestFields {
            title: "Monthly OPD visits".into(),
            description: None,
            output_type: OutputType::File,
            file_format: Some(FileFormat::Excel),
            date_range_type: DateRangeType::Specific,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            fiscal_year_start: None,
            fiscal_year_end: None,
            priority: Priority::Medium,
            expected_deadline: None,
            source_system: SourceSystem::Hosxp,
            data_source: None,
            additional_notes: None,
        }
    }

    fn request_from(fields: &RequestFields) -> ReportRequest {
        ReportRequest {
            id: Uuid::new_v4(),
            title: fields.title.clone(),
            description: fields.description.clone(),
            output_type: fields.output_type,
            file_format: fields.file_format,
            date_range_type: fields.date_range_type,
            start_date: fields.start_date,
            end_date: fields.end_date,
            fiscal_year_start: fields.fiscal_year_start.clone(),
            fiscal_year_end: fields.fiscal_year_end.clone(),
            priority: fields.priority,
            expected_deadline: fields.expected_deadline,
            source_system: fields.source_system,
            data_source: fields.data_source.clone(),
            additional_notes: fields.additional_notes.clone(),
            requested_by: Uuid::new_v4(),
            assigned_to: None,
            status: RequestStatus::Pending,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_display_roundtrip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
        ] {
            assert_eq!(RequestStatus::from_str(&status.to_string()).unwrap(), status);
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(!RequestStatus::InProgress.is_terminal());
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_validated_accepts_specific_file_request() {
        let validated = fields().validated().unwrap();
        assert_eq!(validated.file_format, Some(FileFormat::Excel));
        assert!(validated.fiscal_year_start.is_none());
    }

    #[test]
    fn test_validated_rejects_short_title() {
        let mut f = fields();
        f.title = "ab".into();
        let errors = f.validated().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_file_format_required_for_file_output() {
        let mut f = fields();
        f.file_format = None;
        let errors = f.validated().unwrap_err();
        assert!(errors.field_errors().contains_key("file_format"));
    }

    #[test]
    fn test_file_format_cleared_for_other_output() {
        let mut f = fields();
        f.output_type = OutputType::Dashboard;
        let validated = f.validated().unwrap();
        assert!(validated.file_format.is_none());
    }

    #[test]
    fn test_specific_range_requires_dates() {
        let mut f = fields();
        f.start_date = None;
        let errors = f.validated().unwrap_err();
        assert!(errors.field_errors().contains_key("start_date"));
    }

    #[test]
    fn test_specific_range_rejects_inverted_dates() {
        let mut f = fields();
        f.start_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        f.end_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        let errors = f.validated().unwrap_err();
        assert!(errors.field_errors().contains_key("end_date"));
    }

    #[test]
    fn test_fiscal_year_range_clears_dates() {
        let mut f = fields();
        f.date_range_type = DateRangeType::FiscalYear;
        f.fiscal_year_start = Some("2567".into());
        f.fiscal_year_end = Some("2568".into());
        let validated = f.validated().unwrap();
        assert!(validated.start_date.is_none());
        assert!(validated.end_date.is_none());
        assert_eq!(validated.fiscal_year_start.as_deref(), Some("2567"));
    }

    #[test]
    fn test_fiscal_year_range_requires_labels() {
        let mut f = fields();
        f.date_range_type = DateRangeType::FiscalYear;
        let errors = f.validated().unwrap_err();
        assert!(errors.field_errors().contains_key("fiscal_year_start"));
    }

    #[test]
    fn test_custom_range_clears_everything() {
        let mut f = fields();
        f.date_range_type = DateRangeType::Custom;
        f.fiscal_year_start = Some("2567".into());
        let validated = f.validated().unwrap();
        assert!(validated.start_date.is_none());
        assert!(validated.end_date.is_none());
        assert!(validated.fiscal_year_start.is_none());
    }

    #[test]
    fn test_changed_fields_diff() {
        let f = fields();
        let existing = request_from(&f);
        let mut updated = f.clone();
        updated.title = "Quarterly OPD visits".into();
        updated.priority = Priority::High;
        let changed = updated.changed_fields(&existing);
        assert_eq!(changed, vec!["title", "priority"]);
    }

    #[test]
    fn test_copy_of_prefixes_title_and_keeps_content() {
        let f = fields();
        let original = request_from(&f);
        let copy = RequestFields::copy_of(&original);
        assert_eq!(copy.title, format!("[Copy] {}", original.title));
        assert_eq!(copy.file_format, original.file_format);
        assert_eq!(copy.start_date, original.start_date);
    }
}
