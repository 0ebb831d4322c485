use sqlx::PgConnection;

/// A live database connection lease which can be borrowed to issue queries.
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Capability to reach the external systems the app depends on. Business logic
/// receives this rather than concrete clients so driven adapters can be swapped
/// out for fakes in tests.
pub trait ExternalConnectivity {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    /// Acquires a database connection from the underlying source
    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// Capability to open a database transaction, producing a [TransactionHandle]
/// which exposes the same connectivity as its parent but scoped to the transaction.
/// Dropping the handle without committing rolls the transaction back.
pub trait Transactable {
    type Handle: TransactionHandle;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

/// An in-progress database transaction. Queries issued through its connectivity
/// only become durable once [TransactionHandle::commit] is invoked.
pub trait TransactionHandle: ExternalConnectivity {
    async fn commit(self) -> Result<(), anyhow::Error>;
}

#[cfg(test)]
pub mod test_util {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Stand-in connectivity for unit tests. In-memory driven port fakes never
    /// touch a real database, so actually asking for a connection fails the test.
    pub struct FakeExternalConnectivity {
        is_transacting: bool,
        downstream_commit_happened: Arc<AtomicBool>,
    }

    impl FakeExternalConnectivity {
        pub fn new() -> Self {
            FakeExternalConnectivity {
                is_transacting: false,
                downstream_commit_happened: Arc::new(AtomicBool::new(false)),
            }
        }

        pub fn is_transacting(&self) -> bool {
            self.is_transacting
        }

        /// True once a transaction spawned from this connectivity has committed
        pub fn did_transaction_commit(&self) -> bool {
            self.downstream_commit_happened.load(Ordering::SeqCst)
        }
    }

    pub struct NoDatabaseConnection;

    impl ConnectionHandle for NoDatabaseConnection {
        fn borrow_connection(&mut self) -> &mut PgConnection {
            panic!("Tried to borrow a real database connection in a unit test!")
        }
    }

    impl ExternalConnectivity for FakeExternalConnectivity {
        type DbHandle<'cxn_borrow> = NoDatabaseConnection;

        async fn database_cxn(&mut self) -> Result<NoDatabaseConnection, anyhow::Error> {
            panic!("Tried to open a real database connection in a unit test!")
        }
    }

    impl Transactable for FakeExternalConnectivity {
        type Handle = FakeExternalConnectivity;

        async fn start_transaction(&self) -> Result<FakeExternalConnectivity, anyhow::Error> {
            Ok(FakeExternalConnectivity {
                is_transacting: true,
                downstream_commit_happened: Arc::clone(&self.downstream_commit_happened),
            })
        }
    }

    impl TransactionHandle for FakeExternalConnectivity {
        async fn commit(self) -> Result<(), anyhow::Error> {
            assert!(
                self.is_transacting,
                "committed a FakeExternalConnectivity which never started a transaction"
            );
            self.downstream_commit_happened.store(true, Ordering::SeqCst);
            Ok(())
        }
    }
}
