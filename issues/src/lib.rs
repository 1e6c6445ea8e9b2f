pub mod filter;
pub mod handlers;
pub mod service;
pub mod validation;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::{JsonPayloadError, QueryPayloadError},
    middleware, web, App, HttpRequest,
};
use anyhow::anyhow;
use common::{
    context::ServiceState,
    entities::{
        comment::Comment,
        issue::{Issue, IssueChange, IssueDetails, Priority, Status},
        stats::IssueStats,
    },
    error::AddCode,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::service::{comment::CreateComment, issue::CreateIssue};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::issue::get_issues,
        handlers::issue::get_customer_issues,
        handlers::issue::get_issue,
        handlers::issue::post_issue,
        handlers::issue::patch_issue,
        handlers::comment::post_comment,
        handlers::stats::get_stats,
    ),
    components(schemas(
        Issue,
        IssueDetails,
        IssueChange,
        Comment,
        IssueStats,
        Status,
        Priority,
        CreateIssue,
        CreateComment,
    ))
)]
pub struct ApiDoc;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    anyhow!("Invalid request body: {}", err).code(400).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    anyhow!("Invalid query: {}", err).code(400).into()
}

pub fn create_app(
    state: Arc<ServiceState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    let cors = Cors::permissive();

    #[allow(clippy::let_and_return)]
    let app = App::new()
        .wrap(cors)
        .wrap(middleware::Logger::default())
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(handlers::issue::get_issues)
        .service(handlers::issue::get_customer_issues)
        .service(handlers::issue::get_issue)
        .service(handlers::issue::post_issue)
        .service(handlers::issue::patch_issue)
        .service(handlers::comment::post_comment)
        .service(handlers::stats::get_stats)
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
        );
    app
}
