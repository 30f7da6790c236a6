mod dispatcher;
mod registry;

pub use dispatcher::{dispatch, from_fn, DispatchError, Dispatched, FnRoutine, RenderContext, Routine};
pub use registry::ProjectRegistry;
