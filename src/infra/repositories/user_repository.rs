//! User repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::ROLE_USER;
use crate::domain::{AdminUpdate, NewUser, PasswordReset, User};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User store contract.
///
/// Writes that must be atomic with respect to concurrent requests
/// (`consume_reset_token`) are single conditional statements.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Lookup by normalized email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// User holding `token`, provided it expires strictly after `now`
    async fn find_by_reset_token(&self, token: &str, now: DateTime<Utc>)
        -> AppResult<Option<User>>;

    /// Insert a new account with zero balance and the default role
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Persist profile fields and credential hash.
    ///
    /// Balance, flags and reset state are left untouched.
    async fn update(&self, user: &User) -> AppResult<User>;

    /// Store a reset grant, replacing any previous one
    async fn set_reset_token(&self, id: Uuid, reset: PasswordReset) -> AppResult<()>;

    /// Swap the credential and clear the grant in one conditional write.
    ///
    /// Returns `None` when no live grant matches `token` at `now`.
    async fn consume_reset_token(
        &self,
        token: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>>;

    /// Apply an administrative edit. `NotFound` if the id is unknown.
    async fn apply_admin_update(&self, id: Uuid, update: AdminUpdate) -> AppResult<User>;

    /// Hard delete, returning the removed account. `NotFound` if unknown.
    async fn delete(&self, id: Uuid) -> AppResult<User>;

    /// Page through all accounts, oldest first, with the total count
    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<User>, u64)>;
}

/// SeaORM-backed user store.
///
/// Emails are stored already normalized, so lookups compare exactly.
/// The reset grant lives in two nullable columns that are always written
/// and cleared together.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        if token.is_empty() {
            return Ok(None);
        }

        let result = UserEntity::find()
            .filter(user::Column::ResetPasswordToken.eq(token))
            .filter(user::Column::ResetPasswordExpires.gt(now))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            phone_number: Set(new_user.phone_number),
            role: Set(ROLE_USER.to_string()),
            balance: Set(Decimal::ZERO),
            is_frozen: Set(false),
            auto_update_balance: Set(false),
            reset_password_token: Set(None),
            reset_password_expires: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(User::from(model))
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let existing = UserEntity::find_by_id(user.id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.email = Set(user.email.clone());
        active.password_hash = Set(user.password_hash.clone());
        active.first_name = Set(user.first_name.clone());
        active.last_name = Set(user.last_name.clone());
        active.phone_number = Set(user.phone_number.clone());
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn set_reset_token(&self, id: Uuid, reset: PasswordReset) -> AppResult<()> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::ResetPasswordToken, Expr::value(reset.token))
            .col_expr(user::Column::ResetPasswordExpires, Expr::value(reset.expires_at))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::UserNotFound);
        }

        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        if token.is_empty() {
            return Ok(None);
        }

        let models = UserEntity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::ResetPasswordToken, Expr::value(Option::<String>::None))
            .col_expr(
                user::Column::ResetPasswordExpires,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::ResetPasswordToken.eq(token))
            .filter(user::Column::ResetPasswordExpires.gt(now))
            .exec_with_returning(&self.db)
            .await?;

        Ok(models.into_iter().next().map(User::from))
    }

    async fn apply_admin_update(&self, id: Uuid, update: AdminUpdate) -> AppResult<User> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        if let Some(balance) = update.balance {
            active.balance = Set(balance);
        }
        if let Some(is_frozen) = update.is_frozen {
            active.is_frozen = Set(is_frozen);
        }
        if let Some(auto_update_balance) = update.auto_update_balance {
            active.auto_update_balance = Set(auto_update_balance);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<User> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(User::from(existing))
    }

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<User>, u64)> {
        let paginator = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page_index()).await?;

        Ok((models.into_iter().map(User::from).collect(), total))
    }
}
