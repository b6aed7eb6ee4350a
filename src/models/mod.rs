pub mod credentials;
pub mod pending_item;
pub mod questionnaire;
pub mod report;

pub use credentials::{Credentials, Password};
pub use pending_item::PendingItem;
pub use questionnaire::{encode_sequence, QuestionKind, QuestionRecord, QuestionnairePayload};
pub use report::{ItemOutcome, RunReport, SubmissionResult};
