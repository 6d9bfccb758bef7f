// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"registry_gate_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Publishes the number of permits left in the current window (when enabled).
pub fn record_permits_available(available: u32) {
	#[cfg(feature = "metrics")]
	{
		metrics::gauge!("registry_gate_permits_available").set(f64::from(available));
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = available;
	}
}
