//! Registry types for vertical slices.
//!
//! Each feature crate builds its state once at startup and hands it to the
//! kernel as a type-erased [`InitializedSlice`]. Handlers look it up again by type.

use std::any::{Any, TypeId};
use std::fmt::Debug;

/// Shared, thread-safe state owned by one feature slice.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    /// Short, stable slice name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Downcast hook for the type-erased registry.
    fn as_any(&self) -> &dyn Any;
}

/// A slice that finished initialization and is ready to be registered.
#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    pub name: &'static str,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), name: state.name(), state: Box::new(state) }
    }
}
