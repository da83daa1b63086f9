use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Type};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "snake_case")]
pub enum BugType {
    #[default]
    Bug,
    FeatureRequest,
    Improvement,
    Question,
}

impl fmt::Display for BugType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BugType::Bug => write!(f, "bug"),
            BugType::FeatureRequest => write!(f, "feature_request"),
            BugType::Improvement => write!(f, "improvement"),
            BugType::Question => write!(f, "question"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "snake_case")]
pub enum BugPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for BugPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BugPriority::Low => write!(f, "low"),
            BugPriority::Medium => write!(f, "medium"),
            BugPriority::High => write!(f, "high"),
            BugPriority::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "snake_case")]
pub enum BugStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
    Reopened,
}

impl fmt::Display for BugStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BugStatus::Open => write!(f, "open"),
            BugStatus::InProgress => write!(f, "in_progress"),
            BugStatus::Resolved => write!(f, "resolved"),
            BugStatus::Closed => write!(f, "closed"),
            BugStatus::Reopened => write!(f, "reopened"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct BugReport {
    pub bug_report_id: Uuid,
    pub title: String,
    pub description: String,
    pub bug_type: BugType,
    pub priority: BugPriority,
    pub status: BugStatus,
    pub reporter_email: String,
    pub reporter_name: String,
    pub steps_to_reproduce: String,
    pub expected_behavior: String,
    pub actual_behavior: String,
    pub environment: String,
    pub browser_info: String,
    pub device_info: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BugReportInput {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub bug_type: BugType,
    #[serde(default)]
    pub priority: BugPriority,
    #[serde(default)]
    pub reporter_email: String,
    #[serde(default)]
    pub reporter_name: String,
    #[serde(default)]
    pub steps_to_reproduce: String,
    #[serde(default)]
    pub expected_behavior: String,
    #[serde(default)]
    pub actual_behavior: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub browser_info: String,
    #[serde(default)]
    pub device_info: String,
}

const BUG_REPORT_COLUMNS: &str = "
    bug_report_id,
    title,
    description,
    bug_type,
    priority,
    status,
    reporter_email,
    reporter_name,
    steps_to_reproduce,
    expected_behavior,
    actual_behavior,
    environment,
    browser_info,
    device_info,
    created_at,
    updated_at
";

impl BugReport {
    pub async fn create(pool: &PgPool, input: &BugReportInput) -> Result<Self> {
        let report = sqlx::query_as::<_, BugReport>(&format!(
            "
            INSERT INTO bug_reports (
                title, description, bug_type, priority, reporter_email, reporter_name,
                steps_to_reproduce, expected_behavior, actual_behavior, environment,
                browser_info, device_info
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {BUG_REPORT_COLUMNS}
            "
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.bug_type)
        .bind(input.priority)
        .bind(&input.reporter_email)
        .bind(&input.reporter_name)
        .bind(&input.steps_to_reproduce)
        .bind(&input.expected_behavior)
        .bind(&input.actual_behavior)
        .bind(&input.environment)
        .bind(&input.browser_info)
        .bind(&input.device_info)
        .fetch_one(pool)
        .await?;

        Ok(report)
    }

    /// Newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let reports = sqlx::query_as::<_, BugReport>(&format!(
            "
            SELECT {BUG_REPORT_COLUMNS}
            FROM bug_reports
            ORDER BY created_at DESC
            "
        ))
        .fetch_all(pool)
        .await?;

        Ok(reports)
    }

    pub async fn get_by_id(pool: &PgPool, bug_report_id: Uuid) -> Result<Option<Self>> {
        let report = sqlx::query_as::<_, BugReport>(&format!(
            "
            SELECT {BUG_REPORT_COLUMNS}
            FROM bug_reports
            WHERE bug_report_id = $1
            "
        ))
        .bind(bug_report_id)
        .fetch_optional(pool)
        .await?;

        Ok(report)
    }

    pub async fn update_status(
        pool: &PgPool,
        bug_report_id: Uuid,
        status: BugStatus,
    ) -> Result<Option<Self>> {
        let report = sqlx::query_as::<_, BugReport>(&format!(
            "
            UPDATE bug_reports
            SET status = $2, updated_at = NOW()
            WHERE bug_report_id = $1
            RETURNING {BUG_REPORT_COLUMNS}
            "
        ))
        .bind(bug_report_id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(report)
    }

    /// Comments go with the report.
    pub async fn delete(pool: &PgPool, bug_report_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bug_reports WHERE bug_report_id = $1")
            .bind(bug_report_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct BugComment {
    pub bug_comment_id: Uuid,
    pub bug_report_id: Uuid,
    pub author_email: String,
    pub author_name: String,
    pub comment: String,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BugCommentInput {
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub author_name: String,
    pub comment: String,
    #[serde(default)]
    pub is_internal: bool,
}

const BUG_COMMENT_COLUMNS: &str =
    "bug_comment_id, bug_report_id, author_email, author_name, comment, is_internal, created_at";

impl BugComment {
    pub async fn create(
        pool: &PgPool,
        bug_report_id: Uuid,
        input: &BugCommentInput,
    ) -> Result<Self> {
        let comment = sqlx::query_as::<_, BugComment>(&format!(
            "
            INSERT INTO bug_comments (bug_report_id, author_email, author_name, comment, is_internal)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {BUG_COMMENT_COLUMNS}
            "
        ))
        .bind(bug_report_id)
        .bind(&input.author_email)
        .bind(&input.author_name)
        .bind(&input.comment)
        .bind(input.is_internal)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Oldest first. Internal comments are left out unless `include_internal` is set.
    pub async fn list_for_report(
        pool: &PgPool,
        bug_report_id: Uuid,
        include_internal: bool,
    ) -> Result<Vec<Self>> {
        let comments = sqlx::query_as::<_, BugComment>(&format!(
            "
            SELECT {BUG_COMMENT_COLUMNS}
            FROM bug_comments
            WHERE bug_report_id = $1
                AND ($2 OR NOT is_internal)
            ORDER BY created_at
            "
        ))
        .bind(bug_report_id)
        .bind(include_internal)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }
}
