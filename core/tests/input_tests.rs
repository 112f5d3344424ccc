/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for option validators

use cadence_core::input::*;

#[test]
fn test_cron_expression_keeps_original_text() {
    assert_eq!(cron_expression("*/2 * * * *"), Ok("*/2 * * * *".to_string()));
    assert_eq!(cron_expression("0 0 * * * *"), Ok("0 0 * * * *".to_string()));

    let err = cron_expression("*/2 * *").unwrap_err();
    assert!(err.starts_with("`*/2 * *` is not a valid cron expression"));
}

#[test]
fn test_minutes_to_cron() {
    assert_eq!(minutes_to_cron(2), "0 */2 * * * *");
    assert_eq!(minutes_to_cron(0), "0 */1 * * * *");
    assert!(parse_cron(&minutes_to_cron(15)).is_ok());
}

#[test]
fn test_normalize_cron_trims() {
    assert_eq!(normalize_cron("  */5 * * * *  "), "0 */5 * * * *");
}

#[test]
fn test_greater_than_zero_messages() {
    assert_eq!(
        greater_than_zero::<u32>("0").unwrap_err(),
        "`0` is not larger than 0"
    );
    assert_eq!(
        greater_than_zero::<i64>("ten").unwrap_err(),
        "`ten` is not a valid number"
    );
    assert_eq!(greater_than_zero::<u64>("150"), Ok(150));
}
