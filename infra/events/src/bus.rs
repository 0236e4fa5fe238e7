use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Default buffer per event type; enough for bursts of dashboard writes.
pub const DEFAULT_CAPACITY: usize = 128;

/// Marker trait for types that can be sent across the [`EventBus`].
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

#[derive(Debug)]
struct ChannelState {
    capacity: usize,
    sender: Box<dyn Any + Send + Sync>,
}

/// A cloneable handle to the process-wide broadcast registry.
#[derive(Debug, Clone)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, ChannelState>>>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self { channels: Arc::default(), capacity: DEFAULT_CAPACITY }
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bus whose lazily created channels buffer `capacity` events.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, EventBusError> {
        Ok(Self { channels: Arc::default(), capacity: validate_capacity(capacity)? })
    }

    /// Subscribes to events of type `T`.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the registry is corrupted for `T`.
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        Ok(self.sender::<T>()?.subscribe())
    }

    /// Publishes an event to every current subscriber of `T`.
    ///
    /// Returns how many subscribers received it; zero is not an error.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the registry is corrupted for `T`.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Publishes an already shared event without re-wrapping it.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the registry is corrupted for `T`.
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let sender = self.sender::<T>()?;
        let delivered = sender.send(event).unwrap_or(0);
        trace!(event = std::any::type_name::<T>(), delivered, "Event dispatched");
        Ok(delivered)
    }

    /// Number of live subscribers for `T`.
    #[must_use]
    pub fn subscriber_count<T: Event>(&self) -> usize {
        self.channels
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|state| state.sender.downcast_ref::<broadcast::Sender<Arc<T>>>())
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Drops every channel; subscribers observe a closed stream.
    ///
    /// Returns the number of channels that were closed.
    #[must_use]
    pub fn shutdown(&self) -> usize {
        let mut channels = self.channels.write();
        let count = channels.len();
        channels.clear();
        count
    }

    fn sender<T: Event>(&self) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        let id = TypeId::of::<T>();

        if let Some(state) = self.channels.read().get(&id) {
            return downcast::<T>(state);
        }

        let mut channels = self.channels.write();
        let state = channels.entry(id).or_insert_with(|| {
            trace!(event = std::any::type_name::<T>(), capacity = self.capacity, "Opening channel");
            let (tx, _) = broadcast::channel::<Arc<T>>(self.capacity);
            ChannelState { capacity: self.capacity, sender: Box::new(tx) }
        });
        if state.capacity != self.capacity {
            warn!(
                event = std::any::type_name::<T>(),
                existing = state.capacity,
                requested = self.capacity,
                "Channel already opened with a different capacity"
            );
        }
        downcast::<T>(state)
    }
}

fn downcast<T: Event>(state: &ChannelState) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
    state.sender.downcast_ref::<broadcast::Sender<Arc<T>>>().cloned().ok_or_else(|| {
        EventBusError::TypeMismatch {
            message: std::any::type_name::<T>().into(),
            context: Some("Unexpected sender type".into()),
        }
    })
}

fn validate_capacity(capacity: usize) -> Result<usize, EventBusError> {
    if capacity == 0 {
        return Err(EventBusError::InvalidCapacity {
            message: "capacity must be >= 1".into(),
            context: None,
        });
    }
    Ok(capacity)
}
