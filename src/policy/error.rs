/* src/policy/error.rs */

/// Reasons a single policy entry is rejected.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PolicyError {
	#[error("retry policy sets both failure_policy and backup_policy")]
	ConflictingRetryPolicies,

	#[error("retry policy sets neither failure_policy nor backup_policy")]
	MissingRetryPolicy,

	#[error("invalid backoff policy: {0}")]
	InvalidBackoff(String),

	#[error("validation failed: {0}")]
	Validation(#[from] validator::ValidationErrors),
}
