use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    Set,
};

use crate::domain::{DomainError, DomainResult, User, UserRole};
use crate::infrastructure::database::entities::user;

pub struct UserRepository<'a, C> {
    conn: &'a C,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
}

fn model_to_domain(m: user::Model) -> DomainResult<User> {
    Ok(User {
        id: m.id,
        email: m.email,
        full_name: m.full_name,
        phone: m.phone,
        password_hash: m.password_hash,
        role: m.role.parse()?,
        is_active: m.status == "ACTIVE",
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find(&self, id: i32) -> DomainResult<Option<User>> {
        user::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn get(&self, id: i32) -> DomainResult<User> {
        self.find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    pub async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn insert(&self, new: NewUser) -> DomainResult<User> {
        let now = Utc::now();
        let model = user::ActiveModel {
            id: NotSet,
            email: Set(new.email.trim().to_lowercase()),
            full_name: Set(new.full_name),
            phone: Set(new.phone),
            password_hash: Set(new.password_hash),
            role: Set(new.role.as_str().to_string()),
            status: Set("ACTIVE".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;
        model_to_domain(model)
    }
}
