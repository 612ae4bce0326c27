use serde::Serialize;
use time::{Date, Month, OffsetDateTime};

/// Number of months covered by the dashboard growth series.
pub const GROWTH_MONTHS: usize = 6;

/// Ratio rounded to 2 decimals, 0.00 when there are no users so an empty
/// database never divides by zero.
pub fn per_user_rate(total: i64, users: i64) -> f64 {
    if users == 0 {
        return 0.0;
    }
    (total as f64 / users as f64 * 100.0).round() / 100.0
}

/// Per-month creation count as aggregated by the database.
#[derive(Debug, sqlx::FromRow)]
pub struct MonthCount {
    pub year: i32,
    pub month: i32,
    pub count: i64,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct MonthlyStat {
    pub month: String,
    pub users: i64,
    pub posts: i64,
}

/// The trailing `months` (year, month) buckets ending with the month of
/// `now`, oldest first.
pub fn month_buckets(now: OffsetDateTime, months: usize) -> Vec<(i32, Month)> {
    let mut year = now.year();
    let mut month = now.month();
    let mut buckets = vec![(year, month)];

    while buckets.len() < months {
        month = month.previous();
        if month == Month::December {
            year -= 1;
        }
        buckets.push((year, month));
    }

    buckets.reverse();
    buckets
}

/// First instant of the oldest bucket, the lower bound of the series query.
pub fn window_start(now: OffsetDateTime, months: usize) -> OffsetDateTime {
    let (year, month) = month_buckets(now, months)[0];
    Date::from_calendar_date(year, month, 1)
        .expect("the first day of a month always exists")
        .midnight()
        .assume_utc()
}

pub fn month_label(year: i32, month: Month) -> String {
    let name = month.to_string();
    format!("{} {}", &name[..3], year)
}

/// Zero-filled chronological series of user signups and post creations.
pub fn monthly_series(
    now: OffsetDateTime,
    months: usize,
    users: &[MonthCount],
    posts: &[MonthCount],
) -> Vec<MonthlyStat> {
    let find = |rows: &[MonthCount], year: i32, month: Month| {
        rows.iter()
            .find(|row| row.year == year && row.month == month as i32)
            .map(|row| row.count)
            .unwrap_or(0)
    };

    month_buckets(now, months)
        .into_iter()
        .map(|(year, month)| MonthlyStat {
            month: month_label(year, month),
            users: find(users, year, month),
            posts: find(posts, year, month),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn rates_are_zero_with_no_users() {
        assert_eq!(per_user_rate(10, 0), 0.0);
        assert_eq!(per_user_rate(0, 0), 0.0);
    }

    #[test]
    fn rates_round_to_two_decimals() {
        assert_eq!(per_user_rate(8, 4), 2.0);
        assert_eq!(per_user_rate(1, 3), 0.33);
        assert_eq!(per_user_rate(2, 3), 0.67);
    }

    #[test]
    fn buckets_cross_year_boundaries_oldest_first() {
        let buckets = month_buckets(datetime!(2026-02-15 12:00 UTC), 6);
        assert_eq!(
            buckets,
            vec![
                (2025, Month::September),
                (2025, Month::October),
                (2025, Month::November),
                (2025, Month::December),
                (2026, Month::January),
                (2026, Month::February),
            ]
        );
    }

    #[test]
    fn window_start_is_the_first_of_the_oldest_month() {
        let start = window_start(datetime!(2026-02-15 12:00 UTC), 6);
        assert_eq!(start, datetime!(2025-09-01 00:00 UTC));
    }

    #[test]
    fn series_is_zero_filled_and_labelled() {
        let users = vec![MonthCount {
            year: 2026,
            month: 2,
            count: 4,
        }];
        let posts = vec![MonthCount {
            year: 2026,
            month: 1,
            count: 7,
        }];
        let series = monthly_series(datetime!(2026-02-15 12:00 UTC), 3, &users, &posts);
        assert_eq!(
            series,
            vec![
                MonthlyStat {
                    month: "Dec 2025".to_string(),
                    users: 0,
                    posts: 0,
                },
                MonthlyStat {
                    month: "Jan 2026".to_string(),
                    users: 0,
                    posts: 7,
                },
                MonthlyStat {
                    month: "Feb 2026".to_string(),
                    users: 4,
                    posts: 0,
                },
            ]
        );
    }
}
