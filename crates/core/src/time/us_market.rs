use anyhow::Context;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use std::collections::HashSet;

// Eastern Standard Time. DST is ignored; the cutoff leaves room for the hour.
const ET_OFFSET_SECS: i32 = -5 * 3600;

// NYSE closes at 16:00 ET; end-of-day data settles a little later.
const CLOSE_CUTOFF_HOUR_ET: u32 = 16;
const CLOSE_CUTOFF_MINUTE_ET: u32 = 30;

pub fn resolve_as_of_date(
    as_of_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = as_of_date_arg {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --as-of-date {s:?} (expected YYYY-MM-DD)"));
    }

    let et = chrono::FixedOffset::east_opt(ET_OFFSET_SECS).context("invalid ET offset")?;
    let now_et = now_utc.with_timezone(&et);

    let cutoff_reached =
        (now_et.hour(), now_et.minute()) >= (CLOSE_CUTOFF_HOUR_ET, CLOSE_CUTOFF_MINUTE_ET);
    let mut date = now_et.date_naive();
    if !cutoff_reached {
        date -= Duration::days(1);
    }

    let holidays = configured_holidays();
    while is_weekend(date) || holidays.contains(&date) {
        date -= Duration::days(1);
    }

    Ok(date)
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
}

fn configured_holidays() -> HashSet<NaiveDate> {
    // Fixed-date NYSE holidays only. Extend via US_MARKET_HOLIDAYS="YYYY-MM-DD,YYYY-MM-DD".
    let mut out = HashSet::new();
    for y in 2024..=2030 {
        for (m, d) in [(1, 1), (6, 19), (7, 4), (12, 25)] {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                out.insert(date);
            }
        }
    }

    if let Ok(s) = std::env::var("US_MARKET_HOLIDAYS") {
        out.extend(
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .filter_map(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok()),
        );
    }

    out
}
