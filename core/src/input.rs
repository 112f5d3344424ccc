/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use cron::Schedule;
use std::str::FromStr;

pub fn greater_than_zero<
    T: std::str::FromStr + std::cmp::PartialOrd + std::fmt::Display + Default,
>(
    s: &str,
) -> Result<T, String> {
    let num: T = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid number", s))?;

    if num > T::default() {
        Ok(num)
    } else {
        Err(format!("`{}` is not larger than 0", s))
    }
}

/// Accepts classic five-field expressions by prepending a seconds field.
pub fn normalize_cron(expression: &str) -> String {
    let expression = expression.trim();

    if expression.split_whitespace().count() == 5 {
        format!("0 {}", expression)
    } else {
        expression.to_string()
    }
}

pub fn parse_cron(expression: &str) -> Result<Schedule, String> {
    Schedule::from_str(&normalize_cron(expression))
        .map_err(|e| format!("`{}` is not a valid cron expression: {}", expression, e))
}

pub fn cron_expression(s: &str) -> Result<String, String> {
    parse_cron(s).map(|_| s.to_string())
}

/// Cron expression firing every `minutes` minutes.
pub fn minutes_to_cron(minutes: u32) -> String {
    format!("0 */{} * * * *", minutes.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_five_field_expression() {
        assert_eq!(normalize_cron("*/2 * * * *"), "0 */2 * * * *");
        assert_eq!(normalize_cron("30 */2 * * * *"), "30 */2 * * * *");
    }

    #[test]
    fn test_parse_cron() {
        assert!(parse_cron("*/2 * * * *").is_ok());
        assert!(parse_cron(&minutes_to_cron(2)).is_ok());
        assert!(parse_cron("every two minutes").is_err());
    }

    #[test]
    fn test_greater_than_zero() {
        assert_eq!(greater_than_zero::<i64>("10"), Ok(10));
        assert!(greater_than_zero::<i64>("0").is_err());
        assert!(greater_than_zero::<u64>("abc").is_err());
    }
}
