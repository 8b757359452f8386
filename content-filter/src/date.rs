//! 日期筛选：相对时间窗口或绝对年份，二者单选

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

/// 相对时间窗口
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RelativeWindow {
    LastWeek,
    LastMonth,
    #[serde(rename = "last-3-months")]
    Last3Months,
    #[serde(rename = "last-6-months")]
    Last6Months,
    LastYear,
}

impl RelativeWindow {
    pub const ALL: [RelativeWindow; 5] = [
        RelativeWindow::LastWeek,
        RelativeWindow::LastMonth,
        RelativeWindow::Last3Months,
        RelativeWindow::Last6Months,
        RelativeWindow::LastYear,
    ];

    pub fn days(self) -> i64 {
        match self {
            RelativeWindow::LastWeek => 7,
            RelativeWindow::LastMonth => 30,
            RelativeWindow::Last3Months => 90,
            RelativeWindow::Last6Months => 180,
            RelativeWindow::LastYear => 365,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelativeWindow::LastWeek => "last-week",
            RelativeWindow::LastMonth => "last-month",
            RelativeWindow::Last3Months => "last-3-months",
            RelativeWindow::Last6Months => "last-6-months",
            RelativeWindow::LastYear => "last-year",
        }
    }
}

/// 当前生效的日期筛选
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DateFilter {
    Relative(RelativeWindow),
    Year(i32),
}

impl DateFilter {
    /// 解析 UI 传来的取值；空串和 "all" 表示不筛选
    pub fn parse_optional(value: &str) -> Result<Option<DateFilter>, FilterError> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        value.parse().map(Some)
    }

    /// 判断条目日期是否落在筛选范围内
    ///
    /// 相对窗口以调用时刻的 `now` 为准；日期缺失或无法解析的条目不匹配。
    pub fn matches(&self, date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(date) = date else {
            return false;
        };
        match self {
            DateFilter::Relative(window) => date >= now - Duration::days(window.days()),
            DateFilter::Year(year) => date.year() == *year,
        }
    }
}

impl FromStr for DateFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        if let Some(window) = RelativeWindow::ALL.iter().find(|w| w.as_str() == value) {
            return Ok(DateFilter::Relative(*window));
        }
        if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(year) = value.parse() {
                return Ok(DateFilter::Year(year));
            }
        }
        Err(FilterError::InvalidDateFilter(s.to_string()))
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFilter::Relative(window) => f.write_str(window.as_str()),
            DateFilter::Year(year) => write!(f, "{:04}", year),
        }
    }
}

impl Serialize for DateFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 条目日期筛选谓词；`None` 表示没有日期筛选，任何条目都通过
pub fn date_matches(
    filter: Option<&DateFilter>,
    date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    filter.map_or(true, |filter| filter.matches(date, now))
}

/// 解析条目日期，支持 RFC 3339 和 `YYYY-MM-DD`
pub fn parse_item_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
