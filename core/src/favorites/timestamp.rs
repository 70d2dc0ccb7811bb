//! ISO-8601 timestamps for the store file.
//!
//! Written as RFC 3339 in UTC. Read leniently: stores written by older tools hold naive local
//! times such as `2024-03-01T09:15:02.123456`, which are interpreted in the local timezone.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
	if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
		return Some(ts.with_timezone(&Utc));
	}

	let naive = NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT).ok()?;
	Local
		.from_local_datetime(&naive)
		.earliest()
		.map(|ts| ts.with_timezone(&Utc))
		// Skipped by a DST transition, keep the wall clock reading as UTC
		.or_else(|| Some(Utc.from_utc_datetime(&naive)))
}

fn format(ts: &DateTime<Utc>) -> String {
	ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(super) fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
	serializer.serialize_str(&format(ts))
}

pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
	let raw = String::deserialize(deserializer)?;
	parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
}

pub(super) mod option {
	use super::*;

	pub(in super::super) fn serialize<S: Serializer>(
		ts: &Option<DateTime<Utc>>,
		serializer: S,
	) -> Result<S::Ok, S::Error> {
		match ts {
			Some(ts) => serializer.serialize_some(&format(ts)),
			None => serializer.serialize_none(),
		}
	}

	pub(in super::super) fn deserialize<'de, D: Deserializer<'de>>(
		deserializer: D,
	) -> Result<Option<DateTime<Utc>>, D::Error> {
		Option::<String>::deserialize(deserializer)?
			.map(|raw| parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'"))))
			.transpose()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use chrono::{Datelike, Timelike};

	#[test]
	fn parses_rfc3339_with_offset() {
		let ts = parse("2024-03-01T10:15:02+01:00").unwrap();
		assert_eq!(ts.hour(), 9);
		assert_eq!(ts.minute(), 15);
	}

	#[test]
	fn parses_naive_local_timestamps() {
		let ts = parse("2024-03-01T09:15:02.123456").unwrap();
		let local = ts.with_timezone(&Local);
		assert_eq!(local.year(), 2024);
		assert_eq!(local.hour(), 9);
		assert_eq!(local.nanosecond(), 123_456_000);
	}

	#[test]
	fn rejects_garbage() {
		assert!(parse("yesterday").is_none());
		assert!(parse("").is_none());
	}

	#[test]
	fn formatting_round_trips_exactly() {
		let now = Utc::now();
		assert_eq!(parse(&format(&now)), Some(now));
	}
}
