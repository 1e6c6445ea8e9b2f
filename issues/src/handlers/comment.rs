use actix_web::{
    post,
    web::{self, Json},
    HttpResponse,
};

use common::{context::Context, entities::comment::Comment, error};

use crate::service::comment::{CommentService, CreateComment};

#[utoipa::path(
    params(
        ("id" = String, Path, description = "Issue id"),
    ),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Created comment", body = Comment),
        (status = 400, description = "Invalid comment"),
        (status = 404, description = "Unknown issue")
    )
)]
#[post("/api/issues/{id}/comments")]
pub async fn post_comment(
    context: Context,
    id: web::Path<String>,
    Json(data): Json<CreateComment>,
) -> error::Result<HttpResponse> {
    let comment = CommentService::new(context).create(&id, data).await?;
    Ok(HttpResponse::Created().json(comment))
}
