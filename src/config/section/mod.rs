//! Configuration section definitions.
//!
//! Each module corresponds to a section in `chatoc.toml`:
//!
//! | Module    | TOML Section  | Purpose                               |
//! |-----------|---------------|---------------------------------------|
//! | `sidebar` | `[sidebar]`   | Initial visibility, width, dragging   |
//! | `observe` | `[observe]`   | Mutation debounce window              |
//!
//! Extra platforms are declared as `[[platform]]` tables and deserialize
//! straight into [`crate::platform::AdapterSpec`].

mod observe;
mod sidebar;

pub use observe::{ObserveSettings, check_debounce};
pub use sidebar::SidebarSettings;
