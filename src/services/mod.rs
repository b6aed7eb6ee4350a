pub mod authenticator;
pub mod lister;
pub mod payload_builder;
pub mod scheduler;
pub mod warmup;

pub use authenticator::Authenticator;
pub use lister::Lister;
pub use payload_builder::PayloadBuilder;
pub use scheduler::{DelayWindow, SubmissionScheduler};
pub use warmup::warmup;
