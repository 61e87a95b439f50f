use diesel::prelude::*;

use uc_core::ports::errors::{CoreError, ErrorKind};
use uc_core::ports::group_repository::GroupRepositoryPort;
use uc_core::sync::GroupMembership;

use crate::db::executor::DbExecutor;
use crate::db::models::GroupMembershipRow;
use crate::db::schema::group_membership;

pub struct SqliteGroupRepository<E> {
    executor: E,
}

impl<E> SqliteGroupRepository<E>
where
    E: DbExecutor,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

#[async_trait::async_trait]
impl<E> GroupRepositoryPort for SqliteGroupRepository<E>
where
    E: DbExecutor,
{
    async fn load(&self) -> Result<GroupMembership, CoreError> {
        self.executor
            .run(|conn| {
                let rows = group_membership::table
                    .load::<GroupMembershipRow>(conn)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("group load failed: {e}")))?;
                let mut membership = GroupMembership::default();
                for row in rows {
                    membership.join(row.group_name);
                }
                Ok(membership)
            })
            .await
    }

    async fn join(&self, group: &str) -> Result<(), CoreError> {
        let group = group.to_string();
        self.executor
            .run(move |conn| {
                diesel::insert_or_ignore_into(group_membership::table)
                    .values(GroupMembershipRow { group_name: group })
                    .execute(conn)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("group join failed: {e}")))?;
                Ok(())
            })
            .await
    }

    async fn leave(&self, group: &str) -> Result<(), CoreError> {
        let group = group.to_string();
        self.executor
            .run(move |conn| {
                diesel::delete(group_membership::table.find(&group))
                    .execute(conn)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("group leave failed: {e}")))?;
                Ok(())
            })
            .await
    }
}
