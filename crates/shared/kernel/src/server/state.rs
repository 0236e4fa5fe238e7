use brgy_database::Database;
use brgy_domain::config::ApiConfig;
use brgy_domain::registry::{FeatureSlice, InitializedSlice};
use brgy_event_bus::EventBus;
use fxhash::FxHashMap;
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Feature slice not registered{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub database: Database,
    /// Carries [`RecordChange`](brgy_domain::changes::RecordChange)s to feed subscribers.
    pub events: EventBus,
    pub started_at: Instant,
    slices: FxHashMap<TypeId, InitializedSlice>,
    order: Vec<&'static str>,
}

/// Request state handed to every route: config, database, change feed and the slices.
///
/// Slices are looked up by type; handlers normally go through the
/// [`Slice`](super::Slice) extractor instead of calling [`ApiState::get_slice`].
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner
            .slices
            .get(&TypeId::of::<T>())
            .and_then(|initialized| initialized.state.as_any().downcast_ref::<T>())
    }

    /// # Errors
    /// Returns [`ApiStateError::MissingSlice`] naming `T` when it was never registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>().ok_or_else(|| ApiStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Registered slice names, in registration order.
    pub fn slice_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.order.iter().copied()
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    database: Option<Database>,
    events: Option<EventBus>,
    slices: Vec<InitializedSlice>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn db(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// Shares an existing bus; without one, a bus with the configured
    /// `realtime.channel_capacity` is created.
    #[must_use]
    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.push(slice);
        self
    }

    #[must_use]
    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        self.slices.extend(slices);
        self
    }

    /// # Errors
    /// Returns [`ApiStateError::Validation`] when the config or database is missing,
    /// the configured feed capacity is unusable, or the same slice type was registered twice.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;
        let database = self.database.ok_or_else(|| ApiStateError::Validation {
            message: "Database not provided".into(),
            context: None,
        })?;
        let events = match self.events {
            Some(events) => events,
            None => EventBus::with_capacity(config.realtime.channel_capacity).map_err(|e| {
                ApiStateError::Validation {
                    message: e.to_string().into(),
                    context: Some("realtime.channel_capacity".into()),
                }
            })?,
        };

        let mut slices = FxHashMap::default();
        let mut order = Vec::with_capacity(self.slices.len());
        for slice in self.slices {
            let name = slice.name;
            if slices.insert(slice.id, slice).is_some() {
                return Err(ApiStateError::Validation {
                    message: format!("Slice '{name}' registered twice").into(),
                    context: None,
                });
            }
            order.push(name);
        }

        Ok(ApiState {
            inner: Arc::new(ApiStateInner {
                config,
                database,
                events,
                started_at: Instant::now(),
                slices,
                order,
            }),
        })
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
