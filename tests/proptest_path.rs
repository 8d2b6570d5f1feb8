//! Property-based tests for the attachment path-safety rule.
//!
//! Uses proptest to verify that:
//! - Paths drawn from the safe charset without `//` always pass
//! - Any path containing `//` is rejected
//! - Any path containing a character outside the charset is rejected
//! - Date-composed paths for safe file names always validate

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use ticketry::attachment::path::{dated_path, is_safe_path, validate_path};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..Default::default()
    })]

    /// Property: charset-only paths without `//` always pass.
    #[test]
    fn safe_paths_pass(
        path in r"[A-Za-z0-9_\-\\/.]{0,64}"
            .prop_filter("no doubled slash", |p| !p.contains("//")),
    ) {
        prop_assert!(is_safe_path(&path));
    }

    /// Property: a doubled forward slash anywhere is rejected.
    #[test]
    fn doubled_slash_is_rejected(
        prefix in r"[A-Za-z0-9_\-\\/.]{0,16}",
        suffix in r"[A-Za-z0-9_\-\\/.]{0,16}",
    ) {
        let path = format!("{prefix}//{suffix}");
        prop_assert!(!is_safe_path(&path));
        prop_assert!(validate_path(&path).is_err());
    }

    /// Property: any character outside the charset is rejected.
    #[test]
    fn foreign_characters_are_rejected(
        prefix in r"[A-Za-z0-9_\-\\/.]{0,8}",
        bad in r"[^A-Za-z0-9_\-\\/.]",
        suffix in r"[A-Za-z0-9_\-\\/.]{0,8}",
    ) {
        let path = format!("{prefix}{bad}{suffix}");
        prop_assert!(!is_safe_path(&path));
        prop_assert!(validate_path(&path).is_err());
    }

    /// Property: dated layout of a safe file name always validates.
    #[test]
    fn dated_paths_validate(
        name in r"[A-Za-z0-9_\-]{1,32}\.[a-z]{1,4}",
        secs in 0_i64..4_102_444_800, // through 2099
    ) {
        let now = Utc.timestamp_opt(secs, 0).unwrap();
        let stored = dated_path(now, &name);
        prop_assert!(validate_path(&stored).is_ok());
    }
}
