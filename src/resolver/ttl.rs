//! Per-operation cache lifetimes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::operation::Operation;

/// Lifetimes for one operation, depending on which tier produced the value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTtl {
    /// Lifetime of values served by the remote provider
    #[serde(with = "humantime_serde")]
    pub remote: Duration,

    /// Lifetime of values served by the local mirror; shorter so the remote
    /// is retried soon after it recovers
    #[serde(with = "humantime_serde")]
    pub fallback: Duration,
}

/// TTL policy: built-in defaults plus configured overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TtlPolicy {
    overrides: BTreeMap<Operation, OperationTtl>,
}

impl TtlPolicy {
    pub fn set(&mut self, operation: Operation, ttl: OperationTtl) {
        self.overrides.insert(operation, ttl);
    }

    pub fn for_operation(&self, operation: Operation) -> OperationTtl {
        self.overrides
            .get(&operation)
            .copied()
            .unwrap_or_else(|| operation.default_ttl())
    }

    pub fn remote(&self, operation: Operation) -> Duration {
        self.for_operation(operation).remote
    }

    /// Fallback lifetime, never longer than the remote lifetime
    pub fn fallback(&self, operation: Operation) -> Duration {
        let ttl = self.for_operation(operation);
        ttl.fallback.min(ttl.remote)
    }

    /// Problems with the configured overrides
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (operation, ttl) in &self.overrides {
            if ttl.remote.is_zero() || ttl.fallback.is_zero() {
                errors.push(format!("ttl.{} must be greater than 0", operation));
            }
            if ttl.fallback > ttl.remote {
                errors.push(format!(
                    "ttl.{}.fallback ({:?}) must not exceed ttl.{}.remote ({:?})",
                    operation, ttl.fallback, operation, ttl.remote
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_overrides() {
        let policy = TtlPolicy::default();
        assert_eq!(
            policy.for_operation(Operation::QuranAyah),
            Operation::QuranAyah.default_ttl()
        );
        assert!(policy.validate().is_empty());
    }

    #[test]
    fn test_fallback_ttl_is_clamped_to_remote() {
        let mut policy = TtlPolicy::default();
        policy.set(
            Operation::QuranJuz,
            OperationTtl {
                remote: Duration::from_secs(60),
                fallback: Duration::from_secs(3600),
            },
        );

        assert_eq!(policy.fallback(Operation::QuranJuz), Duration::from_secs(60));
        assert_eq!(policy.validate().len(), 1);
    }

    #[test]
    fn test_fallback_never_exceeds_remote_for_any_operation() {
        let policy = TtlPolicy::default();
        for op in Operation::ALL {
            assert!(policy.fallback(op) <= policy.remote(op));
        }
    }

    #[test]
    fn test_yaml_overrides_keyed_by_operation_name() {
        let policy: TtlPolicy = serde_yaml::from_str(
            r#"
hadith-search:
  remote: "10m"
  fallback: "1m"
"#,
        )
        .unwrap();

        assert_eq!(policy.remote(Operation::HadithSearch), Duration::from_secs(600));
        assert_eq!(policy.fallback(Operation::HadithSearch), Duration::from_secs(60));
    }
}
