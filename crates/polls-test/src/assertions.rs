use std::fmt::Debug;

/// Assert that text contains a substring
///
/// # Examples
///
/// ```
/// use polls_test::assert_contains;
///
/// assert_contains("No polls are available.", "No polls");
/// ```
pub fn assert_contains(text: &str, substring: &str) {
	assert!(
		text.contains(substring),
		"Expected text to contain '{}', but it didn't. Text: {}",
		substring,
		text
	);
}

/// Assert that text does not contain a substring
pub fn assert_not_contains(text: &str, substring: &str) {
	assert!(
		!text.contains(substring),
		"Expected text to not contain '{}', but it did. Text: {}",
		substring,
		text
	);
}

/// Assert two query results hold the same rows in the same order
///
/// # Examples
///
/// ```
/// use polls_test::assert_queryset_equal;
///
/// assert_queryset_equal(&[2, 1], &[2, 1]);
/// ```
pub fn assert_queryset_equal<T: PartialEq + Debug>(actual: &[T], expected: &[T]) {
	assert_eq!(
		actual.len(),
		expected.len(),
		"Expected {} rows, got {}: {:?}",
		expected.len(),
		actual.len(),
		actual
	);
	assert_eq!(actual, expected, "Rows differ");
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[should_panic(expected = "Expected 1 rows, got 0")]
	fn test_queryset_length_mismatch() {
		assert_queryset_equal::<i32>(&[], &[1]);
	}
}
