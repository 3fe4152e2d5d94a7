//! Override reconciliation
//!
//! Keeps default, computed and user-override values consistent without ever
//! silently discarding an explicit user choice:
//!
//! - Direct forecasts carry a dirty flag once the user sets them; auto-sync
//!   from building blocks never overwrites a dirty field.
//! - Building blocks and asset inputs are exported when they differ from the
//!   active default by more than the display tolerance.
//! - Loading a saved scenario marks its direct forecasts dirty.

mod dirty;
mod state;

pub use dirty::DirtyFieldSet;
pub use state::{FieldState, InputState};
