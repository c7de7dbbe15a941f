//! Property-based tests for execute option parsing

use std::time::Duration;

use proptest::prelude::*;
use shellbridge::{Error, ExecOptions};

fn bool_text() -> impl Strategy<Value = (bool, &'static str)> {
    prop_oneof![
        Just((true, "true")),
        Just((true, "1")),
        Just((true, "yes")),
        Just((true, "TRUE")),
        Just((false, "false")),
        Just((false, "0")),
        Just((false, "no")),
        Just((false, "False")),
    ]
}

proptest! {
    #[test]
    fn test_bool_options_parse(
        (allow, allow_text) in bool_text(),
        (code, code_text) in bool_text(),
        (silent, silent_text) in bool_text(),
    ) {
        let options = ExecOptions::from_pairs([
            ("allow_error", allow_text),
            ("return_exit_code", code_text),
            ("silent", silent_text),
        ])
        .unwrap();

        prop_assert_eq!(options.allow_error, allow);
        prop_assert_eq!(options.return_exit_code, code);
        prop_assert_eq!(options.silent, Some(silent));
        prop_assert_eq!(options.timeout, None);
    }

    #[test]
    fn test_timeout_seconds_parse(millis in 0u64..10_000_000) {
        let text = format!("{}.{:03}", millis / 1000, millis % 1000);
        let options = ExecOptions::from_pairs([("timeout", text.as_str())]).unwrap();

        let parsed = options.timeout.unwrap();
        let expected = Duration::from_millis(millis);
        let diff = if parsed > expected { parsed - expected } else { expected - parsed };
        prop_assert!(diff < Duration::from_micros(1));
    }

    #[test]
    fn test_unknown_keys_rejected(key in "[a-z_]{1,20}", value in "[a-z0-9]{0,5}") {
        prop_assume!(!ExecOptions::KEYS.contains(&key.as_str()));
        let result = ExecOptions::from_pairs([(key.as_str(), value.as_str())]);
        prop_assert!(
            matches!(result, Err(Error::UnknownOption { key: ref k }) if *k == key),
            "expected UnknownOption"
        );
    }

    #[test]
    fn test_bad_bool_values_rejected(value in "[a-z]{2,8}") {
        prop_assume!(!["true", "false", "yes", "no", "none"].contains(&value.as_str()));
        let result = ExecOptions::from_pairs([("allow_error", value.as_str())]);
        prop_assert!(
            matches!(result, Err(Error::InvalidOptionValue { .. })),
            "expected InvalidOptionValue"
        );
    }

    #[test]
    fn test_negative_timeout_rejected(secs in 1u32..1000) {
        let text = format!("-{}", secs);
        let result = ExecOptions::from_pairs([("timeout", text.as_str())]);
        prop_assert!(
            matches!(result, Err(Error::InvalidOptionValue { .. })),
            "expected InvalidOptionValue"
        );
    }
}
