use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, ExpenseStatus, ExpenseUpdate, GroupDetail, Money, ResultEngine, expenses,
    util::{normalize_optional_text, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Records an expense paid by the member behind `payer_email`.
    ///
    /// The payer must resolve to a known user (`NotFound`) that is a current
    /// member of the group (`NotAMember`); the amount must be strictly
    /// positive (`InvalidAmount`, never clamped). Returns the post-mutation
    /// detail view.
    pub async fn add_expense(
        &self,
        group_id: &str,
        payer_email: &str,
        amount: Money,
        note: Option<&str>,
        status: ExpenseStatus,
    ) -> ResultEngine<GroupDetail> {
        let group_id = parse_uuid(group_id, "group")?;
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        let note = normalize_optional_text(note, "note", 255)?;

        let lock = self.group_lock(group_id);
        let _guard = lock.lock().await;

        let detail = with_tx!(self, |db_tx| {
            async {
                self.require_group(&db_tx, group_id).await?;
                let payer = self.require_user_by_email(&db_tx, payer_email).await?;
                self.require_member(&db_tx, group_id, &payer).await?;

                expenses::active_model(group_id, &payer.id, amount, note, status)
                    .insert(&db_tx)
                    .await?;

                let model = self.require_group(&db_tx, group_id).await?;
                self.load_group_detail(&db_tx, model).await
            }
            .await
        })?;

        tracing::debug!(group_id = %group_id, amount = %amount, "expense recorded");
        Ok(detail)
    }

    /// Applies a partial edit to an expense.
    ///
    /// Only supplied fields change; a new payer is re-validated against the
    /// current membership. The whole edit happens inside one transaction, so
    /// a failed validation leaves the stored expense and every derived
    /// balance exactly as they were.
    pub async fn update_expense(
        &self,
        group_id: &str,
        expense_id: &str,
        update: ExpenseUpdate,
    ) -> ResultEngine<GroupDetail> {
        let group_id = parse_uuid(group_id, "group")?;
        let expense_id = parse_uuid(expense_id, "expense")?;
        if let Some(amount) = update.amount
            && !amount.is_positive()
        {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        let note = normalize_optional_text(update.note.as_deref(), "note", 255)?;

        let lock = self.group_lock(group_id);
        let _guard = lock.lock().await;

        with_tx!(self, |db_tx| {
            async {
                self.require_group(&db_tx, group_id).await?;
                let model = self.require_expense(&db_tx, group_id, expense_id).await?;

                let mut active = expenses::ActiveModel {
                    id: ActiveValue::Set(model.id),
                    ..Default::default()
                };
                let mut changed = false;
                if let Some(email) = update.payer_email.as_deref() {
                    let payer = self.require_user_by_email(&db_tx, email).await?;
                    self.require_member(&db_tx, group_id, &payer).await?;
                    active.payer_id = ActiveValue::Set(payer.id);
                    changed = true;
                }
                if let Some(amount) = update.amount {
                    active.amount_minor = ActiveValue::Set(amount.minor());
                    changed = true;
                }
                if let Some(note) = note {
                    active.note = ActiveValue::Set(Some(note));
                    changed = true;
                }
                if let Some(status) = update.status {
                    active.status = ActiveValue::Set(status.as_str().to_string());
                    changed = true;
                }
                // An empty edit is a no-op rather than an error.
                if changed {
                    active.update(&db_tx).await?;
                }

                let model = self.require_group(&db_tx, group_id).await?;
                self.load_group_detail(&db_tx, model).await
            }
            .await
        })
    }

    /// Removes an expense from the group's ledger and returns the
    /// post-mutation detail view.
    pub async fn delete_expense(
        &self,
        group_id: &str,
        expense_id: &str,
    ) -> ResultEngine<GroupDetail> {
        let group_id = parse_uuid(group_id, "group")?;
        let expense_id = parse_uuid(expense_id, "expense")?;

        let lock = self.group_lock(group_id);
        let _guard = lock.lock().await;

        with_tx!(self, |db_tx| {
            async {
                self.require_group(&db_tx, group_id).await?;
                let model = self.require_expense(&db_tx, group_id, expense_id).await?;
                expenses::Entity::delete_by_id(model.id).exec(&db_tx).await?;

                let model = self.require_group(&db_tx, group_id).await?;
                self.load_group_detail(&db_tx, model).await
            }
            .await
        })
    }

    async fn require_expense(
        &self,
        db: &sea_orm::DatabaseTransaction,
        group_id: uuid::Uuid,
        expense_id: uuid::Uuid,
    ) -> ResultEngine<expenses::Model> {
        expenses::Entity::find_by_id(expense_id.to_string())
            .filter(expenses::Column::GroupId.eq(group_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("expense not exists".to_string()))
    }
}
