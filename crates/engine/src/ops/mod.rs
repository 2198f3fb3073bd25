//! Orchestration: the `Engine` and its operations.
//!
//! Every mutation follows the same shape: acquire the target group's
//! serialization scope, then validate, mutate and re-read the snapshot
//! inside one DB transaction, then run the pure balance computation and
//! return the post-mutation [`crate::GroupDetail`]. The lock guard is RAII,
//! so the scope is released on success, on validation failure and when the
//! caller abandons the request (future drop).

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use sea_orm::DatabaseConnection;
use uuid::Uuid;

mod access;
mod expenses;
mod groups;
mod memberships;

/// Run a block inside a DB transaction, committing on success and rolling
/// back (by drop) on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    /// One async mutex per group, created on first use.
    ///
    /// Mutations on the same group are strictly ordered through this lock;
    /// mutations on different groups never contend. Groups are never removed
    /// from the registry (group deletion is not part of this API), so a lock
    /// handle stays valid for the engine's lifetime.
    group_locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Handle to `group_id`'s serialization scope.
    fn group_lock(&self, group_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .group_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(group_id).or_default().clone()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
            group_locks: Mutex::new(HashMap::new()),
        }
    }
}
