use crate::adapter::LocalStore;
use crate::model::SchemaRegistry;
use crate::session::SessionManager;

/// Everything an RPC operates on: the running datastore, its schema and
/// the session table
///
/// Holds no interior locking; the RPC front keeps one agent behind a
/// mutex so each RPC runs to completion before the next begins.
#[derive(Debug)]
pub struct NetconfAgent {
    pub(crate) store: LocalStore,
    pub(crate) schema: SchemaRegistry,
    pub(crate) sessions: SessionManager,
}

impl NetconfAgent {
    pub fn new(schema: SchemaRegistry, store: LocalStore, sessions: SessionManager) -> Self {
        Self {
            store,
            schema,
            sessions,
        }
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Direct access for seeding and mounting; bypasses locks
    pub fn store_mut(&mut self) -> &mut LocalStore {
        &mut self.store
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }
}
