use crate::Dashboard;
use crate::error::{DashboardError, DashboardErrorExt};
use crate::support::{Change, body, paging, patch_document, query};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use brgy_database::Query as RowQuery;
use brgy_domain::constants::{ANNOUNCEMENTS, DASHBOARD_TAG};
use brgy_domain::records::{Announcement, AnnouncementPriority};
use brgy_domain::roles::Capabilities;
use brgy_identity::Caller;
use brgy_kernel::safe_nanoid;
use brgy_kernel::security::resource::ResourceGuard;
use brgy_kernel::server::{ApiError, ErrorBody, Slice};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnnouncementQuery {
    pub published: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub priority: Option<AnnouncementPriority>,
    #[serde(default)]
    pub published: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AnnouncementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<AnnouncementPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

fn required_text(field: &str, value: &str) -> Result<String, DashboardError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DashboardError::validation(format!("Field '{field}' must not be blank")));
    }
    Ok(trimmed.to_owned())
}

#[utoipa::path(
    get,
    path = "/announcements",
    params(AnnouncementQuery),
    responses(
        (status = OK, description = "Announcements, newest first", body = [Announcement]),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn list_announcements(
    _caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    params: Result<Query<AnnouncementQuery>, QueryRejection>,
) -> Result<Json<Vec<Announcement>>, ApiError> {
    let params = query(params)?;
    let page = paging(params.limit, params.offset);

    let mut rows = RowQuery::new().limit(page.limit()).offset(page.offset());
    if let Some(published) = params.published {
        rows = rows.filter("published", published);
    }

    let announcements =
        dashboard.db.select_all(ANNOUNCEMENTS, &rows).await.context("Listing announcements")?;
    Ok(Json(announcements))
}

#[utoipa::path(
    post,
    path = "/announcements",
    request_body = NewAnnouncement,
    responses(
        (status = CREATED, description = "The created announcement", body = Announcement),
        (status = BAD_REQUEST, description = "Blank title or content", body = ErrorBody),
        (status = FORBIDDEN, description = "Role cannot manage announcements", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn create_announcement(
    caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    payload: Result<Json<NewAnnouncement>, JsonRejection>,
) -> Result<(StatusCode, Json<Announcement>), ApiError> {
    caller.require(Capabilities::MANAGE_ANNOUNCEMENTS)?;
    let request = body(payload)?;

    let now = Utc::now();
    let announcement = Announcement {
        id: safe_nanoid!(),
        title: required_text("title", &request.title)?,
        content: required_text("content", &request.content)?,
        priority: request.priority.unwrap_or_default(),
        published: request.published.unwrap_or(false),
        author_id: Some(caller.admin.id.clone()),
        created_at: now,
        updated_at: now,
    };
    dashboard
        .db
        .create(ANNOUNCEMENTS, &announcement.id, &announcement)
        .await
        .context("Creating announcement")?;

    dashboard
        .announce(
            &caller,
            Change::inserted(ANNOUNCEMENTS, &announcement.id, &announcement),
            "announcement.created",
            Some(announcement.title.clone()),
        )
        .await;
    Ok((StatusCode::CREATED, Json(announcement)))
}

#[utoipa::path(
    patch,
    path = "/announcements/{id}",
    params(("id" = String, Path, description = "Announcement id")),
    request_body = AnnouncementPatch,
    responses(
        (status = OK, description = "The updated announcement", body = Announcement),
        (status = BAD_REQUEST, description = "Empty patch or blank text", body = ErrorBody),
        (status = FORBIDDEN, description = "Role cannot manage announcements", body = ErrorBody),
        (status = NOT_FOUND, description = "No such announcement", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn update_announcement(
    caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    Path(id): Path<String>,
    payload: Result<Json<AnnouncementPatch>, JsonRejection>,
) -> Result<Json<Announcement>, ApiError> {
    caller.require(Capabilities::MANAGE_ANNOUNCEMENTS)?;
    let id = ResourceGuard::verify(id, ANNOUNCEMENTS)?;
    let mut patch = body(payload)?;
    patch.title = patch.title.as_deref().map(|t| required_text("title", t)).transpose()?;
    patch.content = patch.content.as_deref().map(|c| required_text("content", c)).transpose()?;

    let document = patch_document(&patch, true)?;
    let announcement: Announcement = dashboard.apply_patch(ANNOUNCEMENTS, &id, document).await?;
    dashboard
        .announce(
            &caller,
            Change::updated(ANNOUNCEMENTS, &id, &announcement),
            "announcement.updated",
            None,
        )
        .await;
    Ok(Json(announcement))
}

#[utoipa::path(
    delete,
    path = "/announcements/{id}",
    params(("id" = String, Path, description = "Announcement id")),
    responses(
        (status = NO_CONTENT, description = "Announcement deleted"),
        (status = FORBIDDEN, description = "Role cannot manage announcements", body = ErrorBody),
        (status = NOT_FOUND, description = "No such announcement", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn delete_announcement(
    caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    caller.require(Capabilities::MANAGE_ANNOUNCEMENTS)?;
    let id = ResourceGuard::verify(id, ANNOUNCEMENTS)?;

    let existed = dashboard.db.delete(ANNOUNCEMENTS, &id).await.context("Deleting announcement")?;
    if !existed {
        return Err(DashboardError::not_found(ANNOUNCEMENTS, &id).into());
    }

    dashboard
        .announce::<Announcement>(&caller, Change::deleted(ANNOUNCEMENTS, &id), "announcement.deleted", None)
        .await;
    Ok(StatusCode::NO_CONTENT)
}
