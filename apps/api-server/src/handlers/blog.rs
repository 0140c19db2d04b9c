//! Blog handlers.

use actix_web::{
    HttpRequest, HttpResponse,
    http::header::{self, HeaderValue},
    web,
};

use lingua_core::domain::{NewPost, PostPatch, PostStatus, RenderedPost, SearchQuery};
use lingua_shared::dto::{
    CreatePostRequest, DeleteResponse, FacetListResponse, PostDetailResponse, PostEnvelope,
    PostListResponse, PreviewRequest, PreviewResponse, PublishRequest, SearchParams,
    UpdatePostRequest,
};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/blog
///
/// Visitors only ever see published posts, whatever `status` they ask for.
pub async fn list_posts(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    params: web::Query<SearchParams>,
) -> AppResult<HttpResponse> {
    let mut query = SearchQuery::try_from(params.into_inner())?;
    if !identity.context().is_admin() {
        query.status = Some(PostStatus::Published);
    }

    let result = state.blog.search_posts(&query).await?;
    Ok(HttpResponse::Ok().json(PostListResponse::from(result)))
}

/// GET /api/blog/categories
pub async fn list_categories(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let facets: FacetListResponse = state.blog.categories(&identity.context()).await?;
    Ok(HttpResponse::Ok().json(facets))
}

/// GET /api/blog/tags
pub async fn list_tags(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let facets: FacetListResponse = state.blog.tags(&identity.context()).await?;
    Ok(HttpResponse::Ok().json(facets))
}

/// GET /api/blog/{slug}
pub async fn get_post(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let post = state.blog.get_post(&slug).await?;

    if !post.post.is_published() && !identity.context().is_admin() {
        return Err(AppError::NotFound(format!("Post '{}' not found", slug)));
    }

    let seo = state.blog.seo(&post, &state.site.url, &state.site.name);
    Ok(with_etag(HttpResponse::Ok(), &post).json(PostDetailResponse { post, seo }))
}

/// POST /api/blog
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let input = NewPost::try_from(body.into_inner())?;
    let post = state.blog.create_post(input, &identity.context()).await?;

    Ok(with_etag(HttpResponse::Created(), &post).json(PostEnvelope { post }))
}

/// PUT /api/blog/{slug}
///
/// `If-Match` wins over a `version` field in the body.
pub async fn update_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let mut patch = PostPatch::try_from(body.into_inner())?;
    if let Some(version) = if_match(&req)? {
        patch.expected_version = Some(version);
    }

    let post = state
        .blog
        .update_post(&path.into_inner(), patch, &identity.context())
        .await?;

    Ok(with_etag(HttpResponse::Ok(), &post).json(PostEnvelope { post }))
}

/// POST /api/blog/{slug}/publish
pub async fn publish_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: Option<web::Json<PublishRequest>>,
) -> AppResult<HttpResponse> {
    let expected = match if_match(&req)? {
        Some(version) => Some(version),
        None => body.and_then(|b| b.into_inner().version),
    };

    let post = state
        .blog
        .publish_post(&path.into_inner(), expected, &identity.context())
        .await?;

    Ok(with_etag(HttpResponse::Ok(), &post).json(PostEnvelope { post }))
}

/// DELETE /api/blog/{slug}
pub async fn delete_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state
        .blog
        .delete_post(&path.into_inner(), if_match(&req)?, &identity.context())
        .await?;

    Ok(HttpResponse::Ok().json(DeleteResponse { success: true }))
}

/// POST /api/blog/preview
pub async fn preview(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PreviewRequest>,
) -> AppResult<HttpResponse> {
    let html = state
        .blog
        .preview_content(&body.content, &identity.context())
        .await?;

    Ok(HttpResponse::Ok().json(PreviewResponse { html }))
}

/// Version from `If-Match`. Accepts `3`, `"3"` and `W/"3"`; `*` means any version.
fn if_match(req: &HttpRequest) -> AppResult<Option<u64>> {
    let Some(value) = req.headers().get(header::IF_MATCH) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| AppError::BadRequest("If-Match must be ASCII".to_string()))?
        .trim();
    if raw == "*" {
        return Ok(None);
    }

    let tag = raw.strip_prefix("W/").unwrap_or(raw).trim_matches('"');
    tag.parse()
        .map(Some)
        .map_err(|_| {
            AppError::BadRequest(format!("If-Match must carry a post version, got {}", raw))
        })
}

fn with_etag(
    mut builder: actix_web::HttpResponseBuilder,
    post: &RenderedPost,
) -> actix_web::HttpResponseBuilder {
    if let Ok(value) = HeaderValue::from_str(&format!("\"{}\"", post.post.version)) {
        builder.insert_header((header::ETAG, value));
    }
    builder
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};

    use crate::handlers::configure_routes;
    use crate::state::{AppState, testing};

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    async fn seed(state: &AppState, title: &str, published: bool) -> String {
        let body = json!({
            "title": title,
            "content": format!("# {}\n\nBody", title),
            "categories": ["Norwegian"],
            "status": if published { "published" } else { "draft" },
        });
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/api/blog")
            .insert_header(("Authorization", testing::admin_bearer(state)))
            .set_json(body)
            .to_request();
        let res: Value = test::call_and_read_body_json(&app, req).await;
        res["post"]["slug"].as_str().unwrap().to_string()
    }

    #[actix_web::test]
    async fn test_create_requires_token() {
        let state = testing::state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/blog")
            .set_json(json!({"title": "Nope", "content": "x"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_create_returns_created_post() {
        let state = testing::state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/blog")
            .insert_header(("Authorization", testing::admin_bearer(&state)))
            .set_json(json!({"title": "Hello, World!", "content": "# Hi"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers().get("etag").unwrap(), "\"1\"");

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["post"]["slug"], "hello-world");
        assert_eq!(body["post"]["status"], "draft");
        assert!(body["post"]["html"].as_str().unwrap().contains("<h1>Hi</h1>"));
    }

    #[actix_web::test]
    async fn test_drafts_are_hidden_from_visitors() {
        let state = testing::state();
        let draft = seed(&state, "Secret draft", false).await;
        seed(&state, "Public post", true).await;
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri(&format!("/api/blog/{}", draft))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = test::TestRequest::get()
            .uri(&format!("/api/blog/{}", draft))
            .insert_header(("Authorization", testing::admin_bearer(&state)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/blog?status=draft")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["posts"][0]["slug"], "public-post");
    }

    #[actix_web::test]
    async fn test_get_includes_seo() {
        let state = testing::state();
        let slug = seed(&state, "Norwegian verbs", true).await;
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri(&format!("/api/blog/{}", slug))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["post"]["title"], "Norwegian verbs");
        assert_eq!(
            body["seo"]["canonicalUrl"],
            "https://lingua.test/blog/norwegian-verbs"
        );
        assert_eq!(body["seo"]["jsonLd"]["@type"], "BlogPosting");
    }

    #[actix_web::test]
    async fn test_malformed_query_is_bad_request() {
        let state = testing::state();
        let app = app!(state);

        for uri in ["/api/blog?page=0", "/api/blog?limit=500", "/api/blog?sortBy=views"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", uri);

            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["status"], 400);
        }
    }

    #[actix_web::test]
    async fn test_stale_if_match_is_conflict() {
        let state = testing::state();
        let slug = seed(&state, "Versioned", false).await;
        let app = app!(state);
        let auth = testing::admin_bearer(&state);

        let req = test::TestRequest::put()
            .uri(&format!("/api/blog/{}", slug))
            .insert_header(("Authorization", auth.clone()))
            .insert_header(("If-Match", "\"1\""))
            .set_json(json!({"content": "second"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get("etag").unwrap(), "\"2\"");

        let req = test::TestRequest::put()
            .uri(&format!("/api/blog/{}", slug))
            .insert_header(("Authorization", auth.clone()))
            .insert_header(("If-Match", "\"1\""))
            .set_json(json!({"content": "third"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CONFLICT
        );

        let req = test::TestRequest::put()
            .uri(&format!("/api/blog/{}", slug))
            .insert_header(("Authorization", auth.clone()))
            .insert_header(("If-Match", "latest"))
            .set_json(json!({"content": "fourth"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = test::TestRequest::put()
            .uri(&format!("/api/blog/{}", slug))
            .insert_header(("Authorization", auth))
            .set_json(json!({"version": 2}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn test_publish_then_delete() {
        let state = testing::state();
        let slug = seed(&state, "Launch day", false).await;
        let app = app!(state);
        let auth = testing::admin_bearer(&state);

        let req = test::TestRequest::post()
            .uri(&format!("/api/blog/{}/publish", slug))
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["post"]["status"], "published");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/blog/{}", slug))
            .insert_header(("Authorization", auth))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"success": true}));

        let req = test::TestRequest::get()
            .uri(&format!("/api/blog/{}", slug))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn test_preview_and_facets() {
        let state = testing::state();
        seed(&state, "One", true).await;
        seed(&state, "Two", true).await;
        seed(&state, "Three", false).await;
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/blog/preview")
            .insert_header(("Authorization", testing::admin_bearer(&state)))
            .set_json(json!({"content": "**bold** <script>x()</script>"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let html = body["html"].as_str().unwrap();
        assert!(html.contains("<strong>bold</strong>"));
        assert!(!html.contains("<script>"));

        let req = test::TestRequest::get()
            .uri("/api/blog/categories")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([{"name": "Norwegian", "count": 2}]));
    }
}
