use std::sync::Arc;

use lingua_core::domain::{AuthContext, NewPost, PostPatch, PostStatus, SearchQuery};
use lingua_core::{BlogService, DomainError};
use lingua_infra::{InMemoryPostRepository, MarkdownRenderer};

fn service() -> BlogService {
    BlogService::new(
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(MarkdownRenderer::new()),
    )
}

fn admin() -> AuthContext {
    AuthContext::admin("admin@lingua.test")
}

fn categorized(title: &str, category: &str) -> NewPost {
    NewPost {
        categories: vec![category.to_string()],
        status: Some(PostStatus::Published),
        ..NewPost::new(title, "Some body text")
    }
}

#[tokio::test]
async fn test_create_then_get_renders_markdown() {
    let blog = service();

    let created = blog
        .create_post(NewPost::new("First", "# Hi"), &admin())
        .await
        .unwrap();
    let fetched = blog.get_post(&created.post.slug).await.unwrap();

    assert_eq!(fetched.post.slug, "first");
    assert_eq!(fetched.post.status, PostStatus::Draft);
    assert!(fetched.html.contains("<h1>Hi</h1>"));
    assert_eq!(fetched.post.author, "admin@lingua.test");
    assert_eq!(fetched.post.excerpt, "Hi");
}

#[tokio::test]
async fn test_duplicate_titles_get_distinct_slugs() {
    let blog = service();

    let first = blog
        .create_post(NewPost::new("Hello, World!", "one"), &admin())
        .await
        .unwrap();
    let second = blog
        .create_post(NewPost::new("Hello, World!", "two"), &admin())
        .await
        .unwrap();

    assert_eq!(first.post.slug, "hello-world");
    assert_eq!(second.post.slug, "hello-world-2");
    assert_ne!(first.post.id, second.post.id);
}

#[tokio::test]
async fn test_explicit_slug_collision_is_a_conflict() {
    let blog = service();
    let input = NewPost {
        slug: Some("fixed".to_string()),
        ..NewPost::new("A", "a")
    };

    blog.create_post(input.clone(), &admin()).await.unwrap();
    let err = blog.create_post(input, &admin()).await.unwrap_err();

    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn test_category_filter_paginates() {
    let blog = service();
    for i in 0..12 {
        blog.create_post(categorized(&format!("Norsk {}", i), "Norwegian"), &admin())
            .await
            .unwrap();
    }
    for i in 0..3 {
        blog.create_post(categorized(&format!("Svenska {}", i), "Swedish"), &admin())
            .await
            .unwrap();
    }

    let page1 = blog
        .search_posts(&SearchQuery::default().category("Norwegian").page(1, 9))
        .await
        .unwrap();
    let page2 = blog
        .search_posts(&SearchQuery::default().category("Norwegian").page(2, 9))
        .await
        .unwrap();

    assert_eq!(page1.total, 12);
    assert_eq!(page1.items.len(), 9);
    assert_eq!(page2.total, 12);
    assert_eq!(page2.items.len(), 3);
    assert!(
        page1
            .items
            .iter()
            .chain(page2.items.iter())
            .all(|p| p.post.categories == ["Norwegian"])
    );

    let facets = blog.categories(&AuthContext::anonymous()).await.unwrap();
    assert_eq!(facets.len(), 2);
    assert_eq!(facets[0].name, "Norwegian");
    assert_eq!(facets[0].count, 12);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let blog = service();
    let created = blog
        .create_post(NewPost::new("Gone soon", "bye"), &admin())
        .await
        .unwrap();

    blog.delete_post(&created.post.slug, None, &admin())
        .await
        .unwrap();

    assert!(matches!(
        blog.get_post("gone-soon").await.unwrap_err(),
        DomainError::NotFound { .. }
    ));
    assert!(matches!(
        blog.delete_post("gone-soon", None, &admin()).await.unwrap_err(),
        DomainError::NotFound { .. }
    ));
}

#[tokio::test]
async fn test_non_admin_cannot_mutate() {
    let blog = service();
    let reader = AuthContext::new("reader@lingua.test", vec!["reader".to_string()]);

    let err = blog
        .create_post(NewPost::new("Sneaky", "x"), &reader)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized));

    let err = blog
        .create_post(NewPost::new("Sneaky", "x"), &AuthContext::anonymous())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized));

    let all = blog.search_posts(&SearchQuery::default()).await.unwrap();
    assert_eq!(all.total, 0);
}

#[tokio::test]
async fn test_preview_is_pure() {
    let blog = service();
    let markdown = "## Draft\n\n<script>alert(1)</script>*soon*";

    let first = blog.preview_content(markdown, &admin()).await.unwrap();
    let second = blog.preview_content(markdown, &admin()).await.unwrap();

    assert_eq!(first, second);
    assert!(first.contains("<h2>Draft</h2>"));
    assert!(!first.contains("<script>"));
    assert_eq!(
        blog.search_posts(&SearchQuery::default()).await.unwrap().total,
        0
    );
    assert!(matches!(
        blog.preview_content(markdown, &AuthContext::anonymous())
            .await
            .unwrap_err(),
        DomainError::Unauthorized
    ));
    let reader = AuthContext::new("reader@lingua.test", vec!["reader".to_string()]);
    assert!(matches!(
        blog.preview_content(markdown, &reader).await.unwrap_err(),
        DomainError::Unauthorized
    ));
}

#[tokio::test]
async fn test_stale_version_is_rejected() {
    let blog = service();
    let created = blog
        .create_post(NewPost::new("Versioned", "v1"), &admin())
        .await
        .unwrap();
    assert_eq!(created.post.version, 1);

    let updated = blog
        .update_post(
            "versioned",
            PostPatch {
                content: Some("v2".to_string()),
                expected_version: Some(1),
                ..PostPatch::default()
            },
            &admin(),
        )
        .await
        .unwrap();
    assert_eq!(updated.post.version, 2);

    let err = blog
        .update_post(
            "versioned",
            PostPatch {
                content: Some("v3".to_string()),
                expected_version: Some(1),
                ..PostPatch::default()
            },
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
    assert_eq!(blog.get_post("versioned").await.unwrap().post.content, "v2");
}

#[tokio::test]
async fn test_publish_and_refuse_unpublish() {
    let blog = service();
    blog.create_post(NewPost::new("Launch", "text"), &admin())
        .await
        .unwrap();

    let published = blog.publish_post("launch", None, &admin()).await.unwrap();
    assert_eq!(published.post.status, PostStatus::Published);
    assert!(published.post.published_at.is_some());

    let again = blog.publish_post("launch", None, &admin()).await.unwrap();
    assert_eq!(again.post.version, published.post.version);

    let err = blog
        .update_post(
            "launch",
            PostPatch {
                status: Some(PostStatus::Draft),
                ..PostPatch::default()
            },
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_status_filter_hides_drafts() {
    let blog = service();
    blog.create_post(NewPost::new("Draft one", "d"), &admin())
        .await
        .unwrap();
    blog.create_post(categorized("Live one", "News"), &admin())
        .await
        .unwrap();

    let live = blog
        .search_posts(&SearchQuery::default().status(PostStatus::Published))
        .await
        .unwrap();

    assert_eq!(live.total, 1);
    assert_eq!(live.items[0].post.slug, "live-one");
}
