// self
use crate::_prelude::*;

/// Time granularity of the replenishment window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowUnit {
	/// Nanoseconds.
	Nanoseconds,
	/// Microseconds.
	Microseconds,
	/// Milliseconds.
	Milliseconds,
	#[default]
	/// Seconds.
	Seconds,
	/// Minutes.
	Minutes,
	/// Hours.
	Hours,
	/// Days.
	Days,
}
impl WindowUnit {
	/// Returns the span covered by `count` units.
	pub fn times(self, count: u32) -> Duration {
		let count = i64::from(count);

		match self {
			WindowUnit::Nanoseconds => Duration::nanoseconds(count),
			WindowUnit::Microseconds => Duration::microseconds(count),
			WindowUnit::Milliseconds => Duration::milliseconds(count),
			WindowUnit::Seconds => Duration::seconds(count),
			WindowUnit::Minutes => Duration::minutes(count),
			WindowUnit::Hours => Duration::hours(count),
			WindowUnit::Days => Duration::days(count),
		}
	}

	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			WindowUnit::Nanoseconds => "nanoseconds",
			WindowUnit::Microseconds => "microseconds",
			WindowUnit::Milliseconds => "milliseconds",
			WindowUnit::Seconds => "seconds",
			WindowUnit::Minutes => "minutes",
			WindowUnit::Hours => "hours",
			WindowUnit::Days => "days",
		}
	}
}
impl Display for WindowUnit {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
