//! Account registration and login
//!
//! HTTP handlers stay thin and delegate to `AuthService`.

use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::domain::{DomainError, DomainResult, User, UserRole};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password_with_cost, verify_password};
use crate::infrastructure::database::repositories::user_repository::NewUser;
use crate::infrastructure::database::Repositories;

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

/// Account created on first start when no user holds its email
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

pub struct AuthService {
    db: DatabaseConnection,
    jwt_config: JwtConfig,
    password_cost: u32,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, jwt_config: JwtConfig) -> Self {
        Self {
            db,
            jwt_config,
            password_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Lower the bcrypt cost, for tests.
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    // ── Authentication ──────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let user = Repositories::new(&self.db).users().find_by_email(email).await?;
        let Some(user) = user else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        if !user.is_active {
            return Err(DomainError::Unauthorized("Account is disabled".into()));
        }

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        info!(user_id = user.id, "User logged in");
        self.issue_token(user)
    }

    /// Sign a fresh token for an already authenticated user.
    pub fn issue_token(&self, user: User) -> DomainResult<AuthResult> {
        let token = create_token(user.id, &user.email, user.role, &self.jwt_config)
            .map_err(|e| DomainError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }

    pub async fn me(&self, user_id: i32) -> DomainResult<User> {
        Repositories::new(&self.db).users().get(user_id).await
    }

    // ── Registration ────────────────────────────────────────────

    /// Self-service sign-up. Always creates a driver.
    pub async fn register(&self, registration: Registration) -> DomainResult<User> {
        self.create_user(registration, UserRole::Driver).await
    }

    /// Admin creates an account with any role.
    pub async fn create_user(
        &self,
        registration: Registration,
        role: UserRole,
    ) -> DomainResult<User> {
        if registration.password.len() < 8 {
            return Err(DomainError::bad_request(
                "Password must be at least 8 characters",
            ));
        }
        if !registration.email.contains('@') {
            return Err(DomainError::bad_request("Invalid email address"));
        }

        let repos = Repositories::new(&self.db);
        if repos.users().find_by_email(&registration.email).await?.is_some() {
            return Err(DomainError::Conflict("Email already exists".into()));
        }

        let password_hash = hash_password_with_cost(&registration.password, self.password_cost)
            .map_err(|e| DomainError::Internal(format!("Failed to hash password: {}", e)))?;
        let user = repos
            .users()
            .insert(NewUser {
                email: registration.email,
                full_name: registration.full_name,
                phone: registration.phone,
                password_hash,
                role,
            })
            .await?;

        info!(user_id = user.id, role = %user.role, "New user registered");
        Ok(user)
    }

    /// Create the configured admin unless the email is taken.
    /// Returns whether an account was created.
    pub async fn ensure_default_admin(&self, admin: &AdminAccount) -> DomainResult<bool> {
        let repos = Repositories::new(&self.db);
        if let Some(existing) = repos.users().find_by_email(&admin.email).await? {
            if existing.role != UserRole::Admin {
                warn!(
                    email = %admin.email,
                    role = %existing.role,
                    "Default admin email belongs to a non-admin account"
                );
            }
            return Ok(false);
        }

        self.create_user(
            Registration {
                email: admin.email.clone(),
                password: admin.password.clone(),
                full_name: admin.full_name.clone(),
                phone: None,
            },
            UserRole::Admin,
        )
        .await?;
        info!(email = %admin.email, "Default admin account created");
        Ok(true)
    }
}
