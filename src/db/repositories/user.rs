use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{WriteOutcome, is_unique_violation, now_rfc3339};
use crate::domain::Role;
use crate::entities::{comments, confirmation_codes, prelude::*, reviews, users};

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
    pub is_superuser: bool,
}

impl NewUser {
    /// A self-registered account: plain user, unconfirmed.
    #[must_use]
    pub fn registrant(username: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

/// How a `(username, email)` registration resolved against existing accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created(users::Model),
    /// Exactly this pair already exists.
    Existing(users::Model),
    /// The username or the email belongs to a different account.
    Mismatch,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<users::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Users::find()
            .filter(users::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to query users by IDs")
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<users::Model>, u64)> {
        let mut query = Users::find();
        if let Some(term) = search {
            query = query.filter(users::Column::Username.contains(term));
        }

        let total = query.clone().count(&self.conn).await?;
        let users = query
            .order_by_asc(users::Column::Username)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok((users, total))
    }

    pub async fn create(&self, new_user: NewUser) -> Result<WriteOutcome<users::Model>> {
        match insert_user(&self.conn, new_user).await {
            Ok(model) => Ok(WriteOutcome::Written(model)),
            Err(e) if is_unique_violation(&e) => Ok(WriteOutcome::Duplicate),
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }

    /// Resolves a signup against existing accounts in one transaction.
    pub async fn register(&self, username: &str, email: &str) -> Result<Registration> {
        let txn = self.conn.begin().await?;

        let by_username = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&txn)
            .await?;
        let by_email = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&txn)
            .await?;

        let registration = match (by_username, by_email) {
            (None, None) => match insert_user(&txn, NewUser::registrant(username, email)).await {
                Ok(model) => Registration::Created(model),
                // Lost a race against a concurrent signup.
                Err(e) if is_unique_violation(&e) => Registration::Mismatch,
                Err(e) => return Err(e).context("Failed to insert registrant"),
            },
            (Some(a), Some(b)) if a.id == b.id => Registration::Existing(a),
            _ => Registration::Mismatch,
        };

        txn.commit().await?;
        Ok(registration)
    }

    pub async fn update(
        &self,
        user: users::Model,
        changes: UserChanges,
    ) -> Result<WriteOutcome<users::Model>> {
        let mut active: users::ActiveModel = user.into();
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(bio);
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }
        active.updated_at = Set(now_rfc3339());

        match active.update(&self.conn).await {
            Ok(model) => Ok(WriteOutcome::Written(model)),
            Err(e) if is_unique_violation(&e) => Ok(WriteOutcome::Duplicate),
            Err(e) => Err(e).context("Failed to update user"),
        }
    }

    pub async fn mark_confirmed(&self, id: i32) -> Result<()> {
        Users::update_many()
            .col_expr(users::Column::IsConfirmed, Expr::value(true))
            .col_expr(users::Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to mark user confirmed")?;
        Ok(())
    }

    /// Removes the account together with everything it authored and every
    /// comment left on its reviews.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let review_ids: Vec<i32> = Reviews::find()
            .select_only()
            .column(reviews::Column::Id)
            .filter(reviews::Column::AuthorId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        Comments::delete_many()
            .filter(
                Condition::any()
                    .add(comments::Column::AuthorId.eq(id))
                    .add(comments::Column::ReviewId.is_in(review_ids)),
            )
            .exec(&txn)
            .await?;

        Reviews::delete_many()
            .filter(reviews::Column::AuthorId.eq(id))
            .exec(&txn)
            .await?;

        ConfirmationCodes::delete_many()
            .filter(confirmation_codes::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        let result = Users::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// Creates an admin superuser, or promotes the existing account with this
    /// username.
    pub async fn upsert_superuser(
        &self,
        username: &str,
        email: &str,
    ) -> Result<WriteOutcome<users::Model>> {
        if let Some(existing) = self.get_by_username(username).await? {
            let mut active: users::ActiveModel = existing.into();
            active.role = Set(Role::Admin);
            active.is_superuser = Set(true);
            active.updated_at = Set(now_rfc3339());
            let model = active
                .update(&self.conn)
                .await
                .context("Failed to promote user")?;
            return Ok(WriteOutcome::Written(model));
        }

        self.create(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            role: Role::Admin,
            is_superuser: true,
            ..Default::default()
        })
        .await
    }
}

async fn insert_user<C: ConnectionTrait>(
    db: &C,
    new_user: NewUser,
) -> Result<users::Model, sea_orm::DbErr> {
    let now = now_rfc3339();
    users::ActiveModel {
        username: Set(new_user.username),
        email: Set(new_user.email),
        first_name: Set(new_user.first_name),
        last_name: Set(new_user.last_name),
        bio: Set(new_user.bio),
        role: Set(new_user.role),
        is_superuser: Set(new_user.is_superuser),
        is_confirmed: Set(false),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}
