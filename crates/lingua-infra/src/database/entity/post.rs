//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use lingua_core::domain::{Post, PostStatus};
use lingua_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub excerpt: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author: String,
    pub cover_image: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub categories: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub status: String,
    pub date: DateTimeWithTimeZone,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub updated_at: DateTimeWithTimeZone,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn labels(value: Json, column: &str) -> Result<Vec<String>, RepoError> {
    serde_json::from_value(value)
        .map_err(|e| RepoError::Serialization(format!("posts.{}: {}", column, e)))
}

/// Conversion from SeaORM Model to Domain Post.
impl TryFrom<Model> for Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status: PostStatus = model
            .status
            .parse()
            .map_err(|e| RepoError::Serialization(format!("posts.status: {}", e)))?;

        let date: DateTimeUtc = model.date.into();
        // Rows written outside the app may be published without a publish time
        let published_at = match status {
            PostStatus::Published => model.published_at.map(Into::into).or(Some(date)),
            PostStatus::Draft => model.published_at.map(Into::into),
        };

        Ok(Self {
            id: model.id,
            slug: model.slug,
            title: model.title,
            excerpt: model.excerpt,
            content: model.content,
            author: model.author,
            cover_image: model.cover_image,
            categories: labels(model.categories, "categories")?,
            tags: labels(model.tags, "tags")?,
            status,
            date,
            published_at,
            updated_at: model.updated_at.into(),
            version: model.version as u64,
        })
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            slug: Set(post.slug),
            title: Set(post.title),
            excerpt: Set(post.excerpt),
            content: Set(post.content),
            author: Set(post.author),
            cover_image: Set(post.cover_image),
            categories: Set(Json::from(post.categories)),
            tags: Set(Json::from(post.tags)),
            status: Set(post.status.as_str().to_string()),
            date: Set(post.date.into()),
            published_at: Set(post.published_at.map(Into::into)),
            updated_at: Set(post.updated_at.into()),
            version: Set(post.version as i64),
        }
    }
}
