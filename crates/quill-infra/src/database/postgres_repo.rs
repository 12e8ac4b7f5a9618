//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ColumnTrait, DbConn, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select, Set,
};
use uuid::Uuid;

use quill_core::domain::{Comment, FollowEntry, Post, User};
use quill_core::error::RepoError;
use quill_core::page::{Page, PageRequest};
use quill_core::ports::{CommentRepository, FollowRepository, PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Run a select through the paginator and package one page of results.
async fn paginate_select<E>(
    select: Select<E>,
    db: &DbConn,
    page: PageRequest,
) -> Result<Page<E::Model>, RepoError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let paginator = select.paginate(db, page.per_page());
    let totals = paginator.num_items_and_pages().await.map_err(map_db_err)?;
    let items = paginator
        .fetch_page(page.zero_based())
        .await
        .map_err(map_db_err)?;

    Ok(Page::new(
        items,
        page,
        totals.number_of_items,
        totals.number_of_pages,
    ))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = mask_email(email);
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn touch_last_seen(&self, id: Uuid) -> Result<(), RepoError> {
        // Fire-and-forget freshness update; a vanished user is not an error.
        UserEntity::update_many()
            .col_expr(user::Column::LastSeen, Expr::value(chrono::Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }
}

fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            if local.len() > 1 {
                format!("{}***{}", &local[..1], domain)
            } else {
                format!("***{domain}")
            }
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn page_recent(&self, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let select = PostEntity::find().order_by_desc(post::Column::CreatedAt);
        let models = paginate_select(select, &self.db, page).await?;
        Ok(models.map(Into::into))
    }

    async fn page_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let select = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt);
        let models = paginate_select(select, &self.db, page).await?;
        Ok(models.map(Into::into))
    }

    async fn page_followed(
        &self,
        follower_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let followed_authors = Query::select()
            .column(follow::Column::FollowedId)
            .from(FollowEntity)
            .and_where(Expr::col(follow::Column::FollowerId).eq(follower_id))
            .to_owned();

        let select = PostEntity::find()
            .filter(post::Column::AuthorId.in_subquery(followed_authors))
            .order_by_desc(post::Column::CreatedAt);
        let models = paginate_select(select, &self.db, page).await?;
        Ok(models.map(Into::into))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn page_for_post(
        &self,
        post_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, RepoError> {
        let select = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt);
        let models = paginate_select(select, &self.db, page).await?;
        Ok(models.map(Into::into))
    }

    async fn page_all(&self, page: PageRequest) -> Result<Page<Comment>, RepoError> {
        let select = CommentEntity::find().order_by_desc(comment::Column::CreatedAt);
        let models = paginate_select(select, &self.db, page).await?;
        Ok(models.map(Into::into))
    }

    async fn set_disabled(&self, id: Uuid, disabled: bool) -> Result<(), RepoError> {
        let result = CommentEntity::update_many()
            .col_expr(comment::Column::Disabled, Expr::value(disabled))
            .filter(comment::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}

/// PostgreSQL follow repository. The composite key keeps this off the
/// generic base repository.
pub struct PostgresFollowRepository {
    db: DbConn,
}

impl PostgresFollowRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn page_entries(
        &self,
        filter: sea_orm::sea_query::SimpleExpr,
        relation: follow::Relation,
        page: PageRequest,
    ) -> Result<Page<FollowEntry>, RepoError> {
        let select = FollowEntity::find()
            .filter(filter)
            .join(JoinType::InnerJoin, relation.def())
            .select_also(UserEntity)
            .order_by_desc(follow::Column::CreatedAt);

        let paginator = select.paginate(&self.db, page.per_page());
        let totals = paginator.num_items_and_pages().await.map_err(map_db_err)?;
        let rows = paginator
            .fetch_page(page.zero_based())
            .await
            .map_err(map_db_err)?;

        let items = rows
            .into_iter()
            .filter_map(|(f, u)| {
                u.map(|u| FollowEntry {
                    user: u.into(),
                    since: f.created_at.into(),
                })
            })
            .collect();

        Ok(Page::new(
            items,
            page,
            totals.number_of_items,
            totals.number_of_pages,
        ))
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn insert(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), RepoError> {
        let model = follow::ActiveModel {
            follower_id: Set(follower_id),
            followed_id: Set(followed_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        FollowEntity::insert(model)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn remove(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), RepoError> {
        let result = FollowEntity::delete_by_id((follower_id, followed_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn exists(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool, RepoError> {
        let count = FollowEntity::find_by_id((follower_id, followed_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }

    async fn page_followers(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<FollowEntry>, RepoError> {
        self.page_entries(
            follow::Column::FollowedId.eq(user_id),
            follow::Relation::Follower,
            page,
        )
        .await
    }

    async fn page_following(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<FollowEntry>, RepoError> {
        self.page_entries(
            follow::Column::FollowerId.eq(user_id),
            follow::Relation::Followed,
            page,
        )
        .await
    }

    async fn follower_count(&self, user_id: Uuid) -> Result<u64, RepoError> {
        FollowEntity::find()
            .filter(follow::Column::FollowedId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn following_count(&self, user_id: Uuid) -> Result<u64, RepoError> {
        FollowEntity::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_masking_hides_local_part() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
