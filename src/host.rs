pub use crate::host::commands::CommandRegistry;
pub use crate::host::document::{Document, DocumentKind};
pub use crate::host::hub::{EventHub, EventKind, Handler, HostEvent, Subscription};
pub use crate::host::screen::{Location, Screen, Size};
pub use crate::host::statusbar::{Packing, StatusBar};
pub use crate::host::viewer::{Viewer, ViewerBuildConfig, UPDATE_STATUS_COMMAND};

mod commands;
mod document;
mod hub;
mod screen;
mod statusbar;
mod viewer;
