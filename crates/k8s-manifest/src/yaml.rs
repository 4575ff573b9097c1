//! Deterministic YAML output.
//!
//! `kubectl` users are used to manifests rendered by go-yaml v2, so mappings
//! are emitted with that library's key order and block layout.

use std::cmp::Ordering;

use serde_json::{Map, Value};
use tracing::instrument;

/// Rebuild every mapping in `value`, recursively, with keys in [`key_order`].
pub fn sort_keys(value: Value) -> Value {
	match value {
		Value::Object(map) => {
			let mut entries: Vec<(String, Value)> = map.into_iter().collect();
			entries.sort_by(|(a, _), (b, _)| key_order(a, b));
			Value::Object(
				entries
					.into_iter()
					.map(|(key, value)| (key, sort_keys(value)))
					.collect::<Map<_, _>>(),
			)
		}
		Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
		scalar => scalar,
	}
}

/// Key order used by go-yaml v2 when marshalling string-keyed maps.
///
/// Strings are compared up to their first differing character. Two letters
/// compare by code point, otherwise the non-letter wins. When neither is a
/// letter, the digit runs starting there are compared by numeric value, so
/// `a2` sorts before `a10`.
pub fn key_order(a: &str, b: &str) -> Ordering {
	let a: Vec<char> = a.chars().collect();
	let b: Vec<char> = b.chars().collect();

	let Some(i) = a.iter().zip(&b).position(|(x, y)| x != y) else {
		return a.len().cmp(&b.len());
	};
	let (x, y) = (a[i], b[i]);

	match (x.is_alphabetic(), y.is_alphabetic()) {
		(true, true) => return x.cmp(&y),
		(true, false) => return Ordering::Greater,
		(false, true) => return Ordering::Less,
		(false, false) => {}
	}

	// A zero in the middle of a number is not a leading zero.
	let inside_number = (x == '0' || y == '0')
		&& a[..i]
			.iter()
			.rev()
			.take_while(|c| c.is_ascii_digit())
			.any(|&c| c != '0');

	let (a_num, a_end) = digit_run(&a, i, inside_number);
	let (b_num, b_end) = digit_run(&b, i, inside_number);

	a_num
		.cmp(&b_num)
		.then(a_end.cmp(&b_end))
		.then(x.cmp(&y))
}

fn digit_run(chars: &[char], start: usize, seeded: bool) -> (i64, usize) {
	let mut value = i64::from(seeded);
	let mut end = start;
	while let Some(digit) = chars.get(end).and_then(|c| c.to_digit(10)) {
		value = value.wrapping_mul(10).wrapping_add(i64::from(digit));
		end += 1;
	}
	(value, end)
}

/// Serialize `value` as a single YAML document with sorted keys.
#[instrument(skip_all)]
pub fn to_yaml(value: Value) -> Result<String, serde_saphyr::ser_error::Error> {
	let options = serde_saphyr::SerializerOptions {
		indent_step: 2,
		indent_array: Some(0),
		prefer_block_scalars: true,
		empty_map_as_braces: true,
		empty_array_as_brackets: true,
		line_width: Some(80),
		scientific_notation_threshold: Some(1_000_000),
		scientific_notation_small_threshold: Some(0.0001),
		quote_ambiguous_keys: true,
		quote_numeric_strings: true,
		..Default::default()
	};

	let mut output = String::new();
	serde_saphyr::to_fmt_writer_with_options(&mut output, &sort_keys(value), options)?;
	Ok(output)
}
