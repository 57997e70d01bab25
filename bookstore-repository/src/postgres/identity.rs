//! Sequential id assignment for new rows.

use std::fmt;
use std::str::FromStr;

use bookstore_shared::{next_sequential_id, EntityKind};
use tracing::debug;

use crate::errors::CatalogRepositoryError;

/// How concurrent creators of the same entity type are coordinated while the
/// next sequential id is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequentialIdPolicy {
    /// Take a transaction-scoped advisory lock per entity type before reading
    /// the current maximum. Creators of the same type queue behind each other
    /// until the holder commits, so no two of them observe the same maximum.
    #[default]
    Serialized,
    /// Read the maximum without coordination. Two concurrent creators can be
    /// assigned the same id.
    Unguarded,
}

impl FromStr for SequentialIdPolicy {
    type Err = CatalogRepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "serialized" | "serialised" | "locked" => Ok(Self::Serialized),
            "unguarded" | "legacy" => Ok(Self::Unguarded),
            other => Err(CatalogRepositoryError::validation(format!(
                "Unknown sequential id policy: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for SequentialIdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialized => f.write_str("serialized"),
            Self::Unguarded => f.write_str("unguarded"),
        }
    }
}

/// Computes the sequential id for a new row of `kind` inside `tx`.
///
/// Reads `MAX(id)` of the entity's table and returns one more, or `1` for an
/// empty table. The caller inserts the row with the returned id in the same
/// transaction. Under `SequentialIdPolicy::Serialized` the advisory lock taken
/// here is held until `tx` commits or rolls back.
///
/// # Arguments
///
/// * `kind` - Entity type whose table is read
/// * `tx` - Active transaction the new row will be inserted in
/// * `policy` - Coordination policy for concurrent creators
pub async fn assign_sequential_id(
    kind: EntityKind,
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    policy: SequentialIdPolicy,
) -> Result<i32, CatalogRepositoryError> {
    if policy == SequentialIdPolicy::Serialized {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(kind.lock_key())
            .execute(&mut **tx)
            .await?;
    }

    let sql = format!("SELECT MAX(id) FROM {}", kind.table_name());
    let current_max: Option<i32> = sqlx::query_scalar(&sql).fetch_one(&mut **tx).await?;
    let id = next_sequential_id(current_max);

    debug!(kind = %kind, current_max = ?current_max, id = id, policy = %policy, "Assigned sequential id");
    Ok(id)
}
