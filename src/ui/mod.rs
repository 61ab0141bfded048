// UI module
// Contains layout, sections, form buffers and reusable components

/// Reusable widgets, toasts and the activity log
pub mod components;
/// Form buffers, dialogs and UI commands
pub mod forms;
/// Login screen and main layout
pub mod layout;
/// One view per sidebar section
pub mod sections;

pub use components::{ActivityLog, Toasts};
pub use forms::{Confirm, Forms, UiCommand};
pub use layout::{render_app_layout, render_login};
