//! Operation Context
//!
//! Contains metadata about the current request for tracing.

use uuid::Uuid;

/// Context for an operation, used for tracing.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// Correlation ID for request tracing
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let correlation_id = Uuid::new_v4();
        let context = OperationContext::new().with_correlation_id(correlation_id);
        assert_eq!(context.correlation_id, Some(correlation_id));
    }

    #[test]
    fn test_default_has_no_correlation_id() {
        assert!(OperationContext::new().correlation_id.is_none());
    }
}
