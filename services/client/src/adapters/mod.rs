pub mod memory;
pub mod pg;
pub mod session;

pub use memory::InMemoryStore;
pub use pg::PgDocumentStore;
pub use session::LocalSessionProvider;
