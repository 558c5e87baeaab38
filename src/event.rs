//! Events emitted by producers and consumed by the collector task.

/// One occurrence reported by the image service.
///
/// Events carry no timestamp; they are applied in the order the collector
/// receives them and dropped right after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// A skin was served from the cache.
    CacheHit,
    /// A skin lookup missed the cache.
    CacheMiss,
    /// A request of the given category was served.
    Requested(String),
    /// An upstream API request of the given category was made.
    ApiRequested(String),
    /// An error of the given kind occurred.
    Errored(String),
}

/// Metric family an event is forwarded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFamily {
    Cache,
    Error,
    Request,
    ApiRequest,
}

impl EventFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventFamily::Cache => "cache",
            EventFamily::Error => "error",
            EventFamily::Request => "request",
            EventFamily::ApiRequest => "api_request",
        }
    }
}

impl StatusEvent {
    /// Returns the metric family and label this event increments.
    pub fn family_and_label(&self) -> (EventFamily, &str) {
        match self {
            StatusEvent::CacheHit => (EventFamily::Cache, "hit"),
            StatusEvent::CacheMiss => (EventFamily::Cache, "miss"),
            StatusEvent::Requested(category) => (EventFamily::Request, category),
            StatusEvent::ApiRequested(category) => (EventFamily::ApiRequest, category),
            StatusEvent::Errored(kind) => (EventFamily::Error, kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_events_map_to_hit_and_miss() {
        assert_eq!(
            StatusEvent::CacheHit.family_and_label(),
            (EventFamily::Cache, "hit")
        );
        assert_eq!(
            StatusEvent::CacheMiss.family_and_label(),
            (EventFamily::Cache, "miss")
        );
    }

    #[test]
    fn test_labelled_events_keep_their_label() {
        let event = StatusEvent::ApiRequested("uuid".to_string());
        assert_eq!(event.family_and_label(), (EventFamily::ApiRequest, "uuid"));

        // Empty strings are a bucket of their own
        let event = StatusEvent::Errored(String::new());
        assert_eq!(event.family_and_label(), (EventFamily::Error, ""));
    }
}
