//! Temporal field tests.
//!
//! Exact-match tests against date/datetime columns are rewritten as
//! half-open ranges `[timestamp, timestamp + span)` so that `created_at =
//! 2024-01-01` matches the whole day. The span is one minute for relative
//! "N minutes ago" literals, one day when the parsed time-of-day is zero,
//! and one hour otherwise. An unparsable literal is not an error: it
//! yields no condition at all.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scour_schema::{ColumnKind, FieldDefinition, Operator, Param, SearchDefinition, ValueKind};

use crate::error::Result;
use crate::expr::Compiler;

static MINUTES_AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*\d+\s+minutes?\s+ago\s*$").expect("static pattern"));

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s+(minute|hour|day|week)s?\s+ago\s*$").expect("static pattern")
});

pub(crate) fn test(
    c: &mut Compiler<'_>,
    field: &FieldDefinition,
    column_sql: &str,
    op: Operator,
    value: &str,
) -> Result<Option<String>> {
    let Some(timestamp) = parse(c.definition, value) else {
        return Ok(None);
    };
    let date_only = is_date_only(c, field);
    let span = if date_only {
        Duration::days(1)
    } else {
        span_for(value, timestamp)
    };

    match op {
        Operator::Eq | Operator::Ne => {
            push_bound(c, timestamp, date_only);
            push_bound(c, timestamp + span, date_only);
            let range = format!("({column_sql} >= ? AND {column_sql} < ?)");
            Ok(Some(if op == Operator::Ne {
                format!("NOT {range}")
            } else {
                range
            }))
        }
        // gt excludes every instant within the named date/hour; lte
        // includes them.
        Operator::Gt => single(c, field, column_sql, Operator::Gte, timestamp + span, date_only),
        Operator::Lte => single(c, field, column_sql, Operator::Lt, timestamp + span, date_only),
        other => single(c, field, column_sql, other, timestamp, date_only),
    }
}

fn single(
    c: &mut Compiler<'_>,
    field: &FieldDefinition,
    column_sql: &str,
    op: Operator,
    timestamp: NaiveDateTime,
    date_only: bool,
) -> Result<Option<String>> {
    let mapped = c.dialect.map_operator(op, field)?;
    push_bound(c, timestamp, date_only);
    Ok(Some(format!("{column_sql} {mapped} ?")))
}

fn push_bound(c: &mut Compiler<'_>, timestamp: NaiveDateTime, date_only: bool) {
    let parameter = if date_only {
        Param::Date(timestamp.date())
    } else {
        Param::Timestamp(timestamp)
    };
    c.ctx.push_param(parameter);
}

fn is_date_only(c: &Compiler<'_>, field: &FieldDefinition) -> bool {
    match c.entity.column(field.column()) {
        Some(info) => info.kind == ColumnKind::Date,
        None => field.kind == ValueKind::Date,
    }
}

fn span_for(raw: &str, timestamp: NaiveDateTime) -> Duration {
    if MINUTES_AGO.is_match(raw) {
        Duration::minutes(1)
    } else if timestamp.time() == NaiveTime::MIN {
        Duration::days(1)
    } else {
        Duration::hours(1)
    }
}

/// Parse a temporal literal through the definition's parser, or the
/// built-in one when none is configured.
pub(crate) fn parse(definition: &SearchDefinition, raw: &str) -> Option<NaiveDateTime> {
    match definition.temporal_parser() {
        Some(parser) => parser(raw),
        None => parse_literal(raw),
    }
}

/// Built-in temporal literal parser: common absolute formats plus a few
/// relative forms resolved against the current UTC clock.
pub fn parse_literal(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = RELATIVE.captures(s) {
        let n: i64 = caps[1].parse().ok()?;
        let delta = match caps[2].to_ascii_lowercase().as_str() {
            "minute" => Duration::minutes(n),
            "hour" => Duration::hours(n),
            "day" => Duration::days(n),
            _ => Duration::weeks(n),
        };
        return Some(Utc::now().naive_utc() - delta);
    }

    match s.to_ascii_lowercase().as_str() {
        "today" => return Utc::now().date_naive().and_hms_opt(0, 0, 0),
        "yesterday" => return (Utc::now().date_naive() - Duration::days(1)).and_hms_opt(0, 0, 0),
        _ => {}
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(s, format) {
            return Some(timestamp);
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}
