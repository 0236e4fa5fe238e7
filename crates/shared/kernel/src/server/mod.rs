mod error;
mod extract;
mod health;
mod paging;
pub mod router;
mod state;

pub use error::{ApiError, ErrorBody};
pub use extract::Slice;
pub use paging::{DEFAULT_LIMIT, MAX_LIMIT, Paging};
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
