use chrono::{DateTime, Duration, Utc};

/// 解析投放时间，支持：
/// - RFC3339 格式：2026-10-01T12:00:00Z
/// - 相对时间（相对 `now`）：1d, 2w, 1y, 1h30m, 2d12h
pub fn parse_schedule_time(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let offset = parse_relative_duration(input)?;
    now.checked_add_signed(offset)
        .ok_or_else(|| "计算的时间超出了有效范围".to_string())
}

fn parse_relative_duration(input: &str) -> Result<Duration, String> {
    let mut total = Duration::zero();
    let mut remaining = input;

    while !remaining.is_empty() {
        let digits = remaining
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(remaining.len());
        if digits == 0 {
            return Err(format!("无效的时间格式: '{}'", input));
        }
        let (num_str, rest) = remaining.split_at(digits);
        let num: i64 = num_str
            .parse()
            .map_err(|_| format!("无效的数字: '{}'", num_str))?;

        let unit_len = rest
            .find(|c: char| !c.is_alphabetic())
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(format!("缺少时间单位，数字 '{}' 后应跟时间单位", num));
        }
        let (unit, rest) = rest.split_at(unit_len);

        total += match unit.to_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Duration::seconds(num),
            "m" | "min" | "minute" | "minutes" => Duration::minutes(num),
            "h" | "hour" | "hours" => Duration::hours(num),
            "d" | "day" | "days" => Duration::days(num),
            "w" | "week" | "weeks" => Duration::weeks(num),
            "y" | "year" | "years" => Duration::days(num * 365),
            _ => return Err(format!("不支持的时间单位: '{}'", unit)),
        };
        remaining = rest;
    }

    if total == Duration::zero() {
        return Err("时间间隔不能为零".to_string());
    }
    Ok(total)
}
