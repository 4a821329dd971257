//! Operation Context
//!
//! Request metadata attached to log events for correlation.

use uuid::Uuid;

/// Header carrying the correlation id in and out of the API.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Context for an operation, used for tracing.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Correlation ID for request tracing
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self {
            correlation_id: None,
        }
    }

    /// Build a context from an incoming header value.
    ///
    /// Values that are not UUIDs are ignored and a fresh id is generated.
    pub fn from_header(value: Option<&str>) -> Self {
        let mut context = Self::new();
        if let Some(id) = value.and_then(|v| Uuid::parse_str(v.trim()).ok()) {
            context.correlation_id = Some(id);
        }
        context.ensure_correlation_id();
        context
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}
