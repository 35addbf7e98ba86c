pub mod call_config;
pub mod content;
pub mod course;
pub mod validation_result;

pub use call_config::{override_config, CallConfig, FetchInit, HttpMethod, QueryValue, RequestBody};
pub use content::{Assignment, Content, ContentLookup, ContentRecord, Discussion, Page, Quiz};
pub use course::Course;
pub use validation_result::{MessageKind, MessageResult, ValidationResult, ValidationStatus};
