//! External side-effect integrations for the amber-relay platform.
//!
//! The execution engine performs side effects through two narrow seams:
//!
//! - [`Mailer`]: send a notification email
//! - [`SheetReader`]: read rows from a spreadsheet range
//!
//! Both are async traits so runs can be tested against in-process fakes,
//! with reqwest-backed implementations for production.

pub mod email;
pub mod error;
pub mod sheets;

pub use email::{Mailer, WebhookMailer};
pub use error::IntegrationError;
pub use sheets::{GoogleSheetsReader, SheetReader};
