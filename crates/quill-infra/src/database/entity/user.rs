//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::Role;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub location: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub about_me: Option<String>,
    pub role: String,
    pub confirmed: bool,
    pub member_since: DateTimeWithTimeZone,
    pub last_seen: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
///
/// An unknown role string in the database degrades to Member rather than
/// failing the whole query.
impl From<Model> for quill_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            password_hash: model.password_hash,
            location: model.location,
            about_me: model.about_me,
            role: model.role.parse().unwrap_or(Role::Member),
            confirmed: model.confirmed,
            member_since: model.member_since.into(),
            last_seen: model.last_seen.into(),
        }
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<quill_core::domain::User> for ActiveModel {
    fn from(user: quill_core::domain::User) -> Self {
        Self {
            id: Set(user.id),
            email: Set(user.email),
            username: Set(user.username),
            password_hash: Set(user.password_hash),
            location: Set(user.location),
            about_me: Set(user.about_me),
            role: Set(user.role.as_str().to_owned()),
            confirmed: Set(user.confirmed),
            member_since: Set(user.member_since.into()),
            last_seen: Set(user.last_seen.into()),
        }
    }
}
