//! Engine driver: the session that ties an adapter, the sidebar and the
//! debounce timer to one page.

mod intent;
mod session;
mod state;

pub use intent::{Command, CommandError, Intent};
pub use session::{Dispatched, Session};
pub use state::{is_shutdown, register_shutdown, setup_shutdown_handler};
