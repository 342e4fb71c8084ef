use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::entities::{confirmation_codes, prelude::*};

pub struct ConfirmationRepository {
    conn: DatabaseConnection,
}

impl ConfirmationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Stores a fresh code for the user, discarding any previous one.
    pub async fn replace(
        &self,
        user_id: i32,
        code_hash: String,
        issued_at: String,
        expires_at: String,
    ) -> Result<confirmation_codes::Model> {
        let txn = self.conn.begin().await?;

        ConfirmationCodes::delete_many()
            .filter(confirmation_codes::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let model = confirmation_codes::ActiveModel {
            user_id: Set(user_id),
            code_hash: Set(code_hash),
            issued_at: Set(issued_at),
            expires_at: Set(expires_at),
            consumed_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to store confirmation code")?;

        txn.commit().await?;
        Ok(model)
    }

    pub async fn get_for_user(&self, user_id: i32) -> Result<Option<confirmation_codes::Model>> {
        ConfirmationCodes::find()
            .filter(confirmation_codes::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query confirmation code")
    }

    /// Marks the code consumed. Returns `false` if it was already consumed,
    /// so concurrent redemptions of the same code cannot both succeed.
    pub async fn consume(&self, id: i32, consumed_at: String) -> Result<bool> {
        let result = ConfirmationCodes::update_many()
            .col_expr(
                confirmation_codes::Column::ConsumedAt,
                Expr::value(Some(consumed_at)),
            )
            .filter(confirmation_codes::Column::Id.eq(id))
            .filter(confirmation_codes::Column::ConsumedAt.is_null())
            .exec(&self.conn)
            .await
            .context("Failed to consume confirmation code")?;

        Ok(result.rows_affected == 1)
    }
}
