//! # Quill Shared
//!
//! Types exchanged with the browser: submitted forms and the error page model.

pub mod forms;
pub mod response;

pub use forms::FormErrors;
pub use response::ErrorResponse;
