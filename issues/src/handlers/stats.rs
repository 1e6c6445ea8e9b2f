use actix_web::{get, web::Json};

use common::{context::Context, entities::stats::IssueStats, error};

use crate::service::issue::IssueService;

#[utoipa::path(
    responses(
        (status = 200, description = "Dashboard counters", body = IssueStats)
    )
)]
#[get("/api/stats")]
pub async fn get_stats(context: Context) -> error::Result<Json<IssueStats>> {
    Ok(Json(IssueService::new(context).stats().await?))
}
