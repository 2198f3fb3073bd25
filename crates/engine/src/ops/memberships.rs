use sea_orm::{PaginatorTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, GroupDetail, ResultEngine, memberships, util::parse_uuid};

use super::{Engine, with_tx};

impl Engine {
    /// Adds the user behind `member_email` to the group (owner-only).
    ///
    /// Adding an existing member fails with [`EngineError::AlreadyMember`]
    /// rather than silently succeeding, so clients can surface a clear
    /// message. Returns the post-mutation detail view.
    pub async fn add_member(
        &self,
        group_id: &str,
        requester_id: &str,
        member_email: &str,
    ) -> ResultEngine<GroupDetail> {
        let group_id = parse_uuid(group_id, "group")?;
        let lock = self.group_lock(group_id);
        let _guard = lock.lock().await;

        let detail = with_tx!(self, |db_tx| {
            async {
                self.require_group_owner(&db_tx, group_id, requester_id)
                    .await?;
                let user = self.require_user_by_email(&db_tx, member_email).await?;
                if self.is_member(&db_tx, group_id, &user.id).await? {
                    return Err(EngineError::AlreadyMember(user.email));
                }

                // Positions are dense (members are never removed), so the
                // row count is the next free slot.
                let position = memberships::Entity::find()
                    .filter(memberships::Column::GroupId.eq(group_id.to_string()))
                    .count(&db_tx)
                    .await?;
                memberships::active_model(group_id, &user.id, position as i32)
                    .insert(&db_tx)
                    .await?;

                let model = self.require_group(&db_tx, group_id).await?;
                self.load_group_detail(&db_tx, model).await
            }
            .await
        })?;

        tracing::debug!(group_id = %group_id, member_email, "member added");
        Ok(detail)
    }
}
