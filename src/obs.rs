//! Optional observability around client operations.
//!
//! # Feature Flags
//!
//! - `tracing` (default) emits spans named `sypht_client.op` with the `op` and `stage` fields,
//!   plus events for logins, uploads, result fetches, and token cache decisions.
//! - `metrics` increments the `sypht_client_operation_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OpKind {
	Login,
	Upload,
	Result,
}
impl OpKind {
	const fn as_str(self) -> &'static str {
		match self {
			OpKind::Login => "login",
			OpKind::Upload => "upload",
			OpKind::Result => "result",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OpOutcome {
	Attempt,
	Success,
	Failure,
}
impl OpOutcome {
	const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}

/// Runs `fut` inside an operation span and records attempt + outcome counters around it.
pub(crate) async fn observe<T, Fut>(kind: OpKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	record(kind, OpOutcome::Attempt);

	#[cfg(feature = "tracing")]
	let result = {
		use tracing::Instrument;

		fut.instrument(tracing::info_span!("sypht_client.op", op = kind.as_str(), stage)).await
	};
	#[cfg(not(feature = "tracing"))]
	let result = fut.await;

	match &result {
		Ok(_) => record(kind, OpOutcome::Success),
		Err(_e) => {
			#[cfg(feature = "tracing")]
			tracing::warn!(op = kind.as_str(), stage, error = %_e, "Sypht operation failed.");

			record(kind, OpOutcome::Failure)
		},
	}

	result
}

fn record(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"sypht_client_operation_total",
		"op" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(OpKind::Login.as_str(), "login");
		assert_eq!(OpKind::Result.as_str(), "result");
		assert_eq!(OpOutcome::Failure.as_str(), "failure");
	}

	#[tokio::test]
	async fn observe_passes_value_through() {
		let value = observe(OpKind::Upload, "observe_passes_value_through", async { Ok(42) }).await;

		assert_eq!(value.expect("Value should pass through."), 42);
	}

	#[tokio::test]
	async fn observe_passes_error_through() {
		let err = observe::<(), _>(OpKind::Result, "observe_passes_error_through", async {
			Err(Error::Upload { status: 500 })
		})
		.await
		.expect_err("Error should pass through.");

		assert!(matches!(err, Error::Upload { status: 500 }));
	}
}
