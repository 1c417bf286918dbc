//! External collaborators consumed by the core

pub mod mail;

pub use mail::{MailTransport, SmtpMailer};
