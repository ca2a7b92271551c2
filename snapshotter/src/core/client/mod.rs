pub mod chain;
pub mod collector;
pub mod notification;
pub mod storage;

pub use chain::AnchorChainClient;
pub use collector::CollectorConnector;
pub use notification::NotificationSink;
pub use storage::{ArchiveStore, ContentStore};
