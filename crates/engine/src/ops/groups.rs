use sea_orm::{
    DatabaseTransaction, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, Group, GroupDetail, GroupSummary, Member, ResultEngine, balance, expenses,
    groups, memberships, users,
    util::{normalize_name, normalize_optional_text, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a group owned by `owner_id` and seeds its membership with the
    /// owner at position 0. Returns the detail view with zero balances.
    ///
    /// Group names are unique per owner (case-insensitive over the
    /// normalized form) to keep overview pages unambiguous.
    pub async fn new_group(
        &self,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> ResultEngine<GroupDetail> {
        let name = normalize_name(name, "group", 100)?;
        let description = normalize_optional_text(description, "description", 255)?;

        let detail = with_tx!(self, |db_tx| {
            async {
                self.require_user(&db_tx, owner_id).await?;

                let exists = groups::Entity::find()
                    .filter(groups::Column::OwnerId.eq(owner_id.to_string()))
                    .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if exists {
                    return Err(EngineError::AlreadyExists(name));
                }

                let group = Group::new(name, description, owner_id);
                let group_id = group.id;
                groups::ActiveModel::from(&group).insert(&db_tx).await?;
                memberships::active_model(group_id, owner_id, 0)
                    .insert(&db_tx)
                    .await?;

                let model = self.require_group(&db_tx, group_id).await?;
                self.load_group_detail(&db_tx, model).await
            }
            .await
        })?;

        tracing::info!(group_id = %detail.group.id, owner_id, "group created");
        Ok(detail)
    }

    /// Returns the group view computed against the current committed state.
    pub async fn group_detail(&self, group_id: &str) -> ResultEngine<GroupDetail> {
        let group_id = parse_uuid(group_id, "group")?;
        with_tx!(self, |db_tx| {
            async {
                let model = self.require_group(&db_tx, group_id).await?;
                self.load_group_detail(&db_tx, model).await
            }
            .await
        })
    }

    /// Lists the groups `user_id` belongs to, ordered by name, with member
    /// counts.
    pub async fn list_user_groups(&self, user_id: &str) -> ResultEngine<Vec<GroupSummary>> {
        with_tx!(self, |db_tx| {
            async {
                self.require_user(&db_tx, user_id).await?;

                let models = groups::Entity::find()
                    .join(JoinType::InnerJoin, groups::Relation::Memberships.def())
                    .filter(memberships::Column::UserId.eq(user_id.to_string()))
                    .order_by_asc(groups::Column::Name)
                    .all(&db_tx)
                    .await?;

                let mut summaries = Vec::with_capacity(models.len());
                for model in models {
                    let member_count = memberships::Entity::find()
                        .filter(memberships::Column::GroupId.eq(model.id.clone()))
                        .count(&db_tx)
                        .await?;
                    summaries.push(GroupSummary {
                        group: Group::try_from(model)?,
                        member_count,
                    });
                }
                Ok(summaries)
            }
            .await
        })
    }

    /// Assembles the full [`GroupDetail`] from the transaction's snapshot:
    /// members in join order, expenses newest first, balances recomputed
    /// from the expense set just read.
    pub(super) async fn load_group_detail(
        &self,
        db: &DatabaseTransaction,
        model: groups::Model,
    ) -> ResultEngine<GroupDetail> {
        let group = Group::try_from(model)?;

        let member_rows = memberships::Entity::find()
            .filter(memberships::Column::GroupId.eq(group.id.to_string()))
            .order_by_asc(memberships::Column::Position)
            .find_also_related(users::Entity)
            .all(db)
            .await?;
        let mut members = Vec::with_capacity(member_rows.len());
        for (membership, user) in member_rows {
            let user =
                user.ok_or_else(|| EngineError::NotFound("user not exists".to_string()))?;
            members.push(Member::from_models(membership, user));
        }

        let expense_rows = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group.id.to_string()))
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_asc(expenses::Column::Id)
            .find_also_related(users::Entity)
            .all(db)
            .await?;
        let mut expense_list = Vec::with_capacity(expense_rows.len());
        for (expense, payer) in expense_rows {
            let payer =
                payer.ok_or_else(|| EngineError::NotFound("user not exists".to_string()))?;
            expense_list.push(crate::Expense::from_models(expense, payer)?);
        }

        let (total_expense, balances) = balance::compute(&members, &expense_list);
        Ok(GroupDetail {
            group,
            members,
            expenses: expense_list,
            total_expense,
            balances,
        })
    }
}
