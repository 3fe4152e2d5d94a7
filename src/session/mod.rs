//! Interactive session: owned input state, debounced preview and compute

mod debounce;
mod state;

pub use debounce::{Debouncer, Generation, Ticket, COMPUTE_DEBOUNCE, PREVIEW_DEBOUNCE};
pub use state::{CmeSession, ComputeStatus};
