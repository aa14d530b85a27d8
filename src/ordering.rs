//! Automatic position assignment for ordered rows.
//!
//! Modules keep an insertion order within their course and content slots
//! within their module. A new row with no explicit position takes
//! `max(position) + 1` over its sibling group, or 0 when the group is empty.
//! An explicitly assigned position is stored untouched, so callers may leave
//! gaps or create duplicates on purpose. Listings always sort by
//! `(position, id)` to stay deterministic either way.
//!
//! The max lookup and the insert are separate statements. Two concurrent
//! inserts into the same group can read the same max and end up with equal
//! positions; the id tie-break keeps listings stable when that happens.

use sea_orm::sea_query::SimpleExpr;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, Value};

/// Entities that maintain an insertion order within a parent scope.
pub trait Positioned: EntityTrait {
    /// Column holding the row's place within its sibling group.
    fn position_column() -> Self::Column;
}

/// Next position for a new row in the sibling group matched by `scope`.
pub async fn next_position<E, C>(db: &C, scope: SimpleExpr) -> Result<i32, DbErr>
where
    E: Positioned,
    C: ConnectionTrait,
{
    let max: Option<Option<i32>> = E::find()
        .select_only()
        .column_as(E::position_column().max(), "max_position")
        .filter(scope)
        .into_tuple()
        .one(db)
        .await?;

    Ok(max.flatten().map_or(0, |p| p + 1))
}

/// Reads a scope column off an active model, failing when the parent
/// relation has not been assigned yet.
pub fn scope_value<V>(value: &ActiveValue<V>, field: &str) -> Result<V, DbErr>
where
    V: Into<Value> + Clone,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Ok(v.clone()),
        ActiveValue::NotSet => Err(DbErr::Custom(format!(
            "cannot assign a position before {} is set",
            field
        ))),
    }
}
