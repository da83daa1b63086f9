use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use color_eyre::eyre::eyre;
use db::bugs::{BugComment, BugCommentInput, BugReport, BugReportInput, BugStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    http_server::{auth::AdminUser, errors::ServerError, ResponseResult},
    jobs::{
        bug_notifications::{BugUpdate, NotifyBugReported, NotifyBugUpdated},
        Job,
    },
    AppState,
};

use super::{
    extract::{Json, Path},
    Message,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bugs).post(create_bug))
        .route("/{id}", get(get_bug).delete(delete_bug))
        .route("/{id}/comments", post(add_comment))
        .route("/{id}/status", put(update_status))
}

#[derive(Debug, Serialize)]
struct BugWithComments {
    #[serde(flatten)]
    bug: BugReport,
    comments: Vec<BugComment>,
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: BugStatus,
}

/// Queues an email. The request has already succeeded, so a failure here is only logged.
async fn notify(state: &AppState, job: impl Job, context: &str) {
    if let Err(e) = job.enqueue(state, context.to_string()).await {
        tracing::error!(error = %e, context, "Failed to enqueue bug notification");
    }
}

#[axum_macros::debug_handler]
async fn create_bug(
    State(state): State<AppState>,
    Json(input): Json<BugReportInput>,
) -> ResponseResult<Json<BugReport>> {
    if input.title.trim().is_empty() || input.description.trim().is_empty() {
        return Err(ServerError::bad_request(
            "Title and description must not be empty",
        ));
    }

    let bug = BugReport::create(state.db(), &input).await?;
    tracing::info!(bug_report_id = %bug.bug_report_id, priority = %bug.priority, "Bug reported");

    notify(
        &state,
        NotifyBugReported {
            bug_report_id: bug.bug_report_id,
        },
        "Bug reported",
    )
    .await;

    Ok(Json(bug))
}

#[axum_macros::debug_handler]
async fn list_bugs(State(state): State<AppState>) -> ResponseResult<Json<Vec<BugReport>>> {
    Ok(Json(BugReport::list(state.db()).await?))
}

#[axum_macros::debug_handler]
async fn get_bug(
    State(state): State<AppState>,
    admin: Option<AdminUser>,
    Path(id): Path<Uuid>,
) -> ResponseResult<Json<BugWithComments>> {
    let bug = BugReport::get_by_id(state.db(), id)
        .await?
        .ok_or_else(|| ServerError::not_found("Bug report"))?;
    let comments = BugComment::list_for_report(state.db(), id, admin.is_some()).await?;

    Ok(Json(BugWithComments { bug, comments }))
}

#[axum_macros::debug_handler]
async fn add_comment(
    State(state): State<AppState>,
    admin: Option<AdminUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<BugCommentInput>,
) -> ResponseResult<Json<BugComment>> {
    if input.comment.trim().is_empty() {
        return Err(ServerError::bad_request("Comment must not be empty"));
    }
    if input.is_internal && admin.is_none() {
        return Err(ServerError(
            eyre!("Internal comments require an admin token"),
            StatusCode::UNAUTHORIZED,
        ));
    }

    if BugReport::get_by_id(state.db(), id).await?.is_none() {
        return Err(ServerError::not_found("Bug report"));
    }

    let comment = BugComment::create(state.db(), id, &input).await?;

    if admin.is_some() && !comment.is_internal {
        notify(
            &state,
            NotifyBugUpdated {
                bug_report_id: id,
                update: BugUpdate::Commented {
                    comment: comment.comment.clone(),
                },
            },
            "Admin commented on bug",
        )
        .await;
    }

    Ok(Json(comment))
}

#[axum_macros::debug_handler]
async fn update_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> ResponseResult<Json<BugReport>> {
    let bug = BugReport::update_status(state.db(), id, update.status)
        .await?
        .ok_or_else(|| ServerError::not_found("Bug report"))?;
    tracing::info!(bug_report_id = %bug.bug_report_id, status = %bug.status, "Bug status changed");

    notify(
        &state,
        NotifyBugUpdated {
            bug_report_id: id,
            update: BugUpdate::StatusChanged,
        },
        "Bug status changed",
    )
    .await;

    Ok(Json(bug))
}

#[axum_macros::debug_handler]
async fn delete_bug(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ResponseResult<Json<Message>> {
    if BugReport::delete(state.db(), id).await? {
        Ok(Message::json("Bug report deleted successfully"))
    } else {
        Err(ServerError::not_found("Bug report"))
    }
}
