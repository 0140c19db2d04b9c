//! PostgreSQL post repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use lingua_core::domain::Post;
use lingua_core::error::RepoError;
use lingua_core::ports::PostRepository;

use super::entity::post::{self, Entity as PostEntity};

/// Posts stored in the `posts` table. Version checks are part of the
/// `WHERE` clause, so they hold across server processes.
pub struct SeaOrmPostRepository {
    db: DbConn,
}

impl SeaOrmPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Tell a missing row apart from a stale one after a conditional write touched nothing.
    async fn miss(&self, slug: &str, expected: Option<u64>) -> RepoError {
        match self.find_by_slug(slug).await {
            Ok(Some(_)) => match expected {
                Some(expected) => RepoError::StaleVersion { expected },
                None => RepoError::Query(format!("write to post '{}' had no effect", slug)),
            },
            Ok(None) => RepoError::NotFound,
            Err(e) => e,
        }
    }
}

fn query_error(e: DbErr) -> RepoError {
    match e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(e.to_string()),
        _ => RepoError::Query(e.to_string()),
    }
}

#[async_trait]
impl PostRepository for SeaOrmPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .order_by_desc(post::Column::Date)
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        rows.into_iter().map(Post::try_from).collect()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        tracing::debug!(slug, "Finding post by slug");

        let row = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        row.map(Post::try_from).transpose()
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        let active_model: post::ActiveModel = entity.into();
        let model = active_model.insert(&self.db).await.map_err(|e| {
            let err_str = e.to_string();
            if err_str.contains("duplicate") || err_str.contains("unique") {
                RepoError::Constraint("slug is already in use".to_string())
            } else {
                query_error(e)
            }
        })?;

        Post::try_from(model)
    }

    async fn update(&self, entity: Post, expected_version: u64) -> Result<Post, RepoError> {
        let slug = entity.slug.clone();
        let active_model: post::ActiveModel = entity.clone().into();

        let result = PostEntity::update_many()
            .set(active_model)
            .filter(post::Column::Slug.eq(slug.as_str()))
            .filter(post::Column::Version.eq(expected_version as i64))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(self.miss(&slug, Some(expected_version)).await);
        }
        Ok(entity)
    }

    async fn delete(&self, slug: &str, expected_version: Option<u64>) -> Result<(), RepoError> {
        let mut stmt = PostEntity::delete_many().filter(post::Column::Slug.eq(slug));
        if let Some(expected) = expected_version {
            stmt = stmt.filter(post::Column::Version.eq(expected as i64));
        }

        let result = stmt.exec(&self.db).await.map_err(query_error)?;
        if result.rows_affected == 0 {
            return Err(self.miss(slug, expected_version).await);
        }
        Ok(())
    }
}
