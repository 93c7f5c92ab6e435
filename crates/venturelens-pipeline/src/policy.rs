use venturelens_core::{FlowKind, Result, VentureLensError};

/// What a flow does when completion, parsing or shape validation fails.
#[derive(Debug, Clone, PartialEq)]
pub enum FailurePolicy<T> {
    /// Surface `FlowFailed` with `message`, optionally followed by the cause
    Propagate { message: String, embed_cause: bool },
    /// Swallow the failure and return this value instead
    Fallback(T),
}

impl<T> FailurePolicy<T> {
    pub fn propagate(message: impl Into<String>) -> Self {
        FailurePolicy::Propagate {
            message: message.into(),
            embed_cause: false,
        }
    }

    pub fn propagate_with_cause(message: impl Into<String>) -> Self {
        FailurePolicy::Propagate {
            message: message.into(),
            embed_cause: true,
        }
    }

    pub fn fallback(value: T) -> Self {
        FailurePolicy::Fallback(value)
    }

    /// Errors no policy may absorb
    pub fn is_fatal(err: &VentureLensError) -> bool {
        matches!(
            err,
            VentureLensError::MissingCredential { .. }
                | VentureLensError::Cancelled
                | VentureLensError::NotEntitled { .. }
                | VentureLensError::InvalidInput(_)
        )
    }

    /// Convert a failed attempt into the flow's result.
    pub fn resolve(self, flow: FlowKind, err: VentureLensError) -> Result<T> {
        if Self::is_fatal(&err) {
            return Err(err);
        }

        match self {
            FailurePolicy::Fallback(value) => {
                tracing::warn!(flow = %flow, error = %err, "Flow failed, returning fallback value");
                Ok(value)
            }
            FailurePolicy::Propagate {
                message,
                embed_cause,
            } => {
                let message = if embed_cause {
                    format!("{}: {}", message, err)
                } else {
                    message
                };
                tracing::error!(flow = %flow, error = %err, "{}", message);
                Err(VentureLensError::FlowFailed {
                    flow,
                    message,
                    cause: Box::new(err),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn propagate_embeds_cause_when_asked() {
        let err = FailurePolicy::<()>::propagate_with_cause("Failed to validate idea")
            .resolve(
                FlowKind::Validate,
                VentureLensError::upstream("openai", "502 Bad Gateway"),
            )
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to validate idea: openai request failed: 502 Bad Gateway"
        );
        assert!(matches!(err.root_cause(), VentureLensError::Upstream { .. }));
    }

    #[test]
    fn propagate_keeps_generic_message() {
        let err = FailurePolicy::<()>::propagate("Failed to generate pivot")
            .resolve(FlowKind::Pivot, VentureLensError::EmptyResponse)
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to generate pivot");
        match err {
            VentureLensError::FlowFailed { flow, cause, .. } => {
                assert_eq!(flow, FlowKind::Pivot);
                assert!(matches!(*cause, VentureLensError::EmptyResponse));
            }
            other => panic!("expected FlowFailed, got {other:?}"),
        }
    }

    #[test]
    fn fallback_absorbs_recoverable_errors() {
        let value = FailurePolicy::fallback(false)
            .resolve(
                FlowKind::DomainCheck,
                VentureLensError::MalformedResponse("eof".to_string()),
            )
            .unwrap();
        assert!(!value);
    }

    #[test]
    fn fatal_errors_pass_through_every_policy() {
        let fallback = FailurePolicy::fallback("sorry".to_string())
            .resolve(FlowKind::Roast, VentureLensError::missing_credential("openai"));
        assert!(matches!(
            fallback,
            Err(VentureLensError::MissingCredential { .. })
        ));

        let propagate = FailurePolicy::<()>::propagate("Failed to generate roadmap")
            .resolve(FlowKind::Roadmap, VentureLensError::Cancelled);
        assert!(matches!(propagate, Err(VentureLensError::Cancelled)));
    }
}
