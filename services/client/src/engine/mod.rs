pub mod clock;
pub mod responder;
pub mod seed;
pub mod subscriptions;
pub mod view;
pub mod writes;

pub use clock::Clock;
pub use responder::Responder;
pub use seed::{SeedClaim, SeedGuard, SeedOutcome};
pub use subscriptions::{SnapshotHook, SubscriptionKey, SubscriptionManager, SubscriptionState};
pub use view::{LiveView, OrderedView, ViewStatus};
pub use writes::WriteQueue;
