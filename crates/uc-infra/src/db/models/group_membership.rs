use diesel::prelude::*;

use crate::db::schema::group_membership;

#[derive(Debug, Clone, Queryable, Identifiable, Insertable)]
#[diesel(table_name = group_membership)]
#[diesel(primary_key(group_name))]
pub struct GroupMembershipRow {
    pub group_name: String,
}
