//! Database connection management and PostgreSQL repositories.

mod connections;
pub mod entity;
mod postgres_base;
mod postgres_repo;

pub use connections::{DatabaseConfig, connect};
pub use postgres_base::PostgresBaseRepository;
pub use postgres_repo::{
    PostgresCommentRepository, PostgresFollowRepository, PostgresPostRepository,
    PostgresUserRepository,
};

#[cfg(test)]
mod tests;
