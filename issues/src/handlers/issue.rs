use actix_web::{
    get, patch, post,
    web::{self, Json},
    HttpResponse,
};

use common::{
    context::Context,
    entities::issue::{Issue, IssueChange, IssueDetails},
    error,
};

use crate::{
    filter::IssueFilter,
    service::issue::{CreateIssue, IssueService},
};

#[utoipa::path(
    params(IssueFilter),
    responses(
        (status = 200, description = "Issues, newest first", body = [Issue]),
        (status = 400, description = "Unknown status or priority in the filter")
    )
)]
#[get("/api/issues")]
pub async fn get_issues(
    context: Context,
    filter: web::Query<IssueFilter>,
) -> error::Result<Json<Vec<Issue>>> {
    Ok(Json(
        IssueService::new(context).list(filter.into_inner()).await?,
    ))
}

#[utoipa::path(
    params(
        ("email" = String, Path, description = "Customer email, matched exactly"),
    ),
    responses(
        (status = 200, description = "The customer's issues, newest first", body = [Issue])
    )
)]
#[get("/api/issues/customer/{email}")]
pub async fn get_customer_issues(
    context: Context,
    email: web::Path<String>,
) -> error::Result<Json<Vec<Issue>>> {
    Ok(Json(IssueService::new(context).by_customer(&email).await?))
}

#[utoipa::path(
    params(
        ("id" = String, Path, description = "Issue id"),
    ),
    responses(
        (status = 200, description = "Issue with its comments, oldest first", body = IssueDetails),
        (status = 404, description = "Unknown issue")
    )
)]
#[get("/api/issues/{id}")]
pub async fn get_issue(
    context: Context,
    id: web::Path<String>,
) -> error::Result<Json<IssueDetails>> {
    Ok(Json(IssueService::new(context).find(&id).await?))
}

#[utoipa::path(
    request_body = CreateIssue,
    responses(
        (status = 201, description = "Created issue", body = Issue),
        (status = 400, description = "Invalid submission")
    )
)]
#[post("/api/issues")]
pub async fn post_issue(
    context: Context,
    Json(data): Json<CreateIssue>,
) -> error::Result<HttpResponse> {
    let issue = IssueService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(issue))
}

#[utoipa::path(
    params(
        ("id" = String, Path, description = "Issue id"),
    ),
    request_body = IssueChange,
    responses(
        (status = 200, description = "Updated issue", body = Issue),
        (status = 400, description = "Invalid change"),
        (status = 404, description = "Unknown issue")
    )
)]
#[patch("/api/issues/{id}")]
pub async fn patch_issue(
    context: Context,
    id: web::Path<String>,
    Json(data): Json<IssueChange>,
) -> error::Result<Json<Issue>> {
    Ok(Json(IssueService::new(context).change(&id, data).await?))
}

#[cfg(test)]
mod tests {
    use actix_web::{
        http::StatusCode,
        test::{self, init_service},
    };
    use common::entities::issue::{Priority, Status};
    use serde_json::json;
    use uuid::Uuid;

    use crate::{create_app, test_utils::memory_state};

    use super::*;

    fn submission(title: &str, email: &str) -> serde_json::Value {
        json!({
            "title": title,
            "description": "It broke",
            "customerName": "Robin Customer",
            "customerEmail": email,
        })
    }

    #[actix_web::test]
    async fn test_post_issue() {
        let app = init_service(create_app(memory_state())).await;

        let mut body = submission("Printer jam", "robin@example.com");
        body["status"] = json!("resolved");
        body["priority"] = json!("high");

        let req = test::TestRequest::post()
            .uri("/api/issues")
            .set_json(&body)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let issue: Issue = test::read_body_json(res).await;
        assert_eq!(issue.title, "Printer jam");
        assert_eq!(issue.status, Status::Open);
        assert_eq!(issue.priority, Priority::High);
    }

    #[actix_web::test]
    async fn test_post_issue_rejects_invalid() {
        let app = init_service(create_app(memory_state())).await;

        for body in [
            submission("", "robin@example.com"),
            submission("Printer jam", "not an email"),
            json!({ "title": "Missing everything else" }),
            {
                let mut body = submission("Printer jam", "robin@example.com");
                body["priority"] = json!("critical");
                body
            },
        ] {
            let req = test::TestRequest::post()
                .uri("/api/issues")
                .set_json(&body)
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", body);

            let error: serde_json::Value = test::read_body_json(res).await;
            assert!(error["message"].is_string());
        }

        let issues: Vec<Issue> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/issues").to_request(),
        )
        .await;
        assert!(issues.is_empty());
    }

    #[actix_web::test]
    async fn test_get_issue_with_comments() {
        let app = init_service(create_app(memory_state())).await;

        let created: Issue = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/issues")
                .set_json(&submission("VPN drops", "vpn@example.com"))
                .to_request(),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/issues/{}/comments", created.id))
            .set_json(&json!({ "authorName": "Sam", "content": "Looking into it" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let details: IssueDetails = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/issues/{}", created.id))
                .to_request(),
        )
        .await;
        assert_eq!(details.issue, created);
        assert_eq!(details.comments.len(), 1);
        assert_eq!(details.comments[0].content, "Looking into it");
    }

    #[actix_web::test]
    async fn test_get_unknown_issue() {
        let app = init_service(create_app(memory_state())).await;

        for id in [Uuid::new_v4().to_string(), "42".to_string()] {
            let req = test::TestRequest::get()
                .uri(&format!("/api/issues/{}", id))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND);
        }
    }

    #[actix_web::test]
    async fn test_patch_issue() {
        let app = init_service(create_app(memory_state())).await;

        let created: Issue = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/issues")
                .set_json(&submission("Billing", "bill@example.com"))
                .to_request(),
        )
        .await;

        let updated: Issue = test::call_and_read_body_json(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/issues/{}", created.id))
                .set_json(&json!({ "status": "in-progress", "assignedTo": "Sam" }))
                .to_request(),
        )
        .await;
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.assigned_to.as_deref(), Some("Sam"));
        assert_eq!(updated.title, "Billing");
        assert!(updated.updated_at >= created.created_at);

        let cleared: Issue = test::call_and_read_body_json(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/issues/{}", created.id))
                .set_json(&json!({ "assignedTo": null }))
                .to_request(),
        )
        .await;
        assert_eq!(cleared.assigned_to, None);
        assert_eq!(cleared.status, Status::InProgress);
    }

    #[actix_web::test]
    async fn test_patch_unknown_issue() {
        let app = init_service(create_app(memory_state())).await;

        let req = test::TestRequest::patch()
            .uri(&format!("/api/issues/{}", Uuid::new_v4()))
            .set_json(&json!({ "status": "resolved" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let issues: Vec<Issue> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/issues").to_request(),
        )
        .await;
        assert!(issues.is_empty());
    }

    #[actix_web::test]
    async fn test_patch_issue_rejects_invalid() {
        let app = init_service(create_app(memory_state())).await;

        let created: Issue = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/issues")
                .set_json(&submission("Billing", "bill@example.com"))
                .to_request(),
        )
        .await;

        for body in [
            json!({ "status": "closed" }),
            json!({ "priority": "critical" }),
            json!({ "title": "  " }),
            json!({ "customerEmail": "nope" }),
            json!({ "status": "resolved", "customerEmail": "nope" }),
        ] {
            let req = test::TestRequest::patch()
                .uri(&format!("/api/issues/{}", created.id))
                .set_json(&body)
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", body);

            let error: serde_json::Value = test::read_body_json(res).await;
            assert!(error["message"].is_string());
        }

        let details: IssueDetails = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/issues/{}", created.id))
                .to_request(),
        )
        .await;
        assert_eq!(details.issue, created);
        assert_eq!(details.issue.updated_at, created.updated_at);
    }

    #[actix_web::test]
    async fn test_customer_issues() {
        let app = init_service(create_app(memory_state())).await;

        for (title, email) in [
            ("One", "ann@example.com"),
            ("Two", "bob@example.com"),
            ("Three", "ann@example.com"),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/issues")
                .set_json(&submission(title, email))
                .to_request();
            test::call_service(&app, req).await;
        }

        let issues: Vec<Issue> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/issues/customer/ann@example.com")
                .to_request(),
        )
        .await;
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.customer_email == "ann@example.com"));
        assert!(issues[0].created_at >= issues[1].created_at);
    }

    #[actix_web::test]
    async fn test_filtered_issues() {
        let app = init_service(create_app(memory_state())).await;

        for (title, priority) in [("Login broken", "urgent"), ("Login slow", "low")] {
            let mut body = submission(title, "ann@example.com");
            body["priority"] = json!(priority);
            let req = test::TestRequest::post()
                .uri("/api/issues")
                .set_json(&body)
                .to_request();
            test::call_service(&app, req).await;
        }

        let issues: Vec<Issue> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/issues?search=login&priority=urgent&status=open")
                .to_request(),
        )
        .await;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].title, "Login broken");

        let req = test::TestRequest::get()
            .uri("/api/issues?status=closed")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
