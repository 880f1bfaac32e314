//! External collaborator seams
//!
//! The lifecycle core consumes, never owns, these concerns: template
//! rendering, static resource deployment and localized message lookup.
//! Each is a trait with a simple default implementation used by the demo
//! binary and the tests.

mod deploy;
mod messages;
mod templates;

pub use deploy::{FileResourceDeployer, ResourceDeployer};
pub use messages::{InMemoryMessageSource, MessageSource};
pub(crate) use messages::format_message;
pub use templates::{InMemoryTemplateRenderer, TemplateRenderer};
