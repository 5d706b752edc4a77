//! Property-based tests for package-name functions.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::package_name::{is_valid_name, to_valid_name, MAX_PACKAGE_NAME_LENGTH};
    use proptest::prelude::*;

    // ============================================================================
    // to_valid_name property tests
    // ============================================================================

    proptest! {
        /// Property: sanitizing twice is the same as sanitizing once
        #[test]
        fn to_valid_name_is_idempotent(input in ".*") {
            let once = to_valid_name(&input);
            let twice = to_valid_name(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: output only contains the allowed alphabet
        #[test]
        fn to_valid_name_only_emits_allowed_chars(input in ".*") {
            let result = to_valid_name(&input);
            prop_assert!(
                result.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '~'),
                "unexpected character in {:?} (from {:?})",
                result,
                input
            );
        }

        /// Property: output never exceeds the package.json name limit
        #[test]
        fn to_valid_name_respects_length_limit(input in ".{0,400}") {
            prop_assert!(to_valid_name(&input).len() <= MAX_PACKAGE_NAME_LENGTH);
        }

        /// Property: non-empty sanitized names are valid package names
        #[test]
        fn to_valid_name_output_is_valid_when_non_empty(input in "[ -~]{1,64}") {
            let result = to_valid_name(&input);
            if !result.is_empty() {
                prop_assert!(is_valid_name(&result), "{:?} should be valid", result);
            }
        }
    }

    // ============================================================================
    // is_valid_name property tests
    // ============================================================================

    proptest! {
        /// Property: names matching the identifier grammar are accepted
        #[test]
        fn grammar_names_are_valid(name in "[a-z0-9~-][a-z0-9._~-]{0,40}[a-z0-9_~-]") {
            prop_assert!(is_valid_name(&name));
        }

        /// Property: scoped names built from grammar segments are accepted
        #[test]
        fn grammar_scoped_names_are_valid(
            scope in "[a-z0-9~-][a-z0-9_~-]{0,20}",
            pkg in "[a-z0-9~-][a-z0-9_~-]{0,20}",
        ) {
            let name = format!("@{}/{}", scope, pkg);
            prop_assert!(is_valid_name(&name));
        }

        /// Property: any name containing `*` is rejected
        #[test]
        fn names_with_asterisk_are_invalid(prefix in "[a-z]{0,10}", suffix in "[a-z]{0,10}") {
            let name = format!("{}*{}", prefix, suffix);
            prop_assert!(!is_valid_name(&name));
        }

        /// Property: any name ending in a dot is rejected
        #[test]
        fn names_with_trailing_dot_are_invalid(base in "[a-z0-9-]{1,20}") {
            let name = format!("{}.", base);
            prop_assert!(!is_valid_name(&name));
        }

        /// Property: any name containing an uppercase letter is rejected
        #[test]
        fn names_with_uppercase_are_invalid(
            prefix in "[a-z]{0,10}",
            upper in "[A-Z]",
            suffix in "[a-z]{0,10}",
        ) {
            let name = format!("{}{}{}", prefix, upper, suffix);
            prop_assert!(!is_valid_name(&name));
        }

        /// Property: any name containing a space is rejected
        #[test]
        fn names_with_spaces_are_invalid(prefix in "[a-z]{0,10}", suffix in "[a-z]{0,10}") {
            let name = format!("{} {}", prefix, suffix);
            prop_assert!(!is_valid_name(&name));
        }
    }
}
