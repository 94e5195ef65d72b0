//! The restricted channel between the UI and the host
//!
//! Request/response channels and push channels are both closed sets. Names
//! are validated once at the boundary and dispatched as enums from there on.

pub mod dispatcher;
pub mod events;
pub mod registrar;
pub mod request;
pub mod shell;

pub use dispatcher::Dispatcher;
pub use events::{subscribe, EventSink, PushChannel, PushEvent, WebviewSink};
pub use registrar::Registrar;
pub use request::{InvokeChannel, Request, Response, SaveTarget};
pub use shell::{DesktopShell, TauriShell};
