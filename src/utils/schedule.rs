use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc, Weekday};

use crate::config::DrawConfig;
use crate::error::{AppError, AppResult};

/// 开奖日期的展示格式 (DD.MM.YYYY)
pub const DATE_LABEL_FORMAT: &str = "%d.%m.%Y";

/// 每周开奖规则: 参考时区 + 开奖日 + 开奖时刻
///
/// 所有时区换算都在这里通过固定偏移显式完成, 不依赖宿主机的本地时区。
#[derive(Debug, Clone)]
pub struct DrawSchedule {
    offset: FixedOffset,
    weekdays: Vec<Weekday>,
    time: NaiveTime,
}

impl DrawSchedule {
    pub fn new(offset: FixedOffset, weekdays: Vec<Weekday>, time: NaiveTime) -> AppResult<Self> {
        if weekdays.is_empty() {
            return Err(AppError::ConfigError(
                "draw schedule needs at least one weekday".to_string(),
            ));
        }
        Ok(Self {
            offset,
            weekdays,
            time,
        })
    }

    pub fn from_config(config: &DrawConfig) -> AppResult<Self> {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            AppError::ConfigError(format!(
                "invalid utc offset: {} minutes",
                config.utc_offset_minutes
            ))
        })?;

        let weekdays = config
            .weekdays
            .iter()
            .map(|&d| weekday_from_sunday(d))
            .collect::<AppResult<Vec<_>>>()?;

        let time = NaiveTime::parse_from_str(&config.time, "%H:%M").map_err(|_| {
            AppError::ConfigError(format!("invalid draw time '{}', expected HH:MM", config.time))
        })?;

        Self::new(offset, weekdays, time)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// 计算严格晚于 `now` 的下一次开奖时刻
    ///
    /// 当天是开奖日且尚未到开奖时刻时返回当天; 恰好处于开奖时刻或之后则顺延到下一个开奖日。
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = self.local_date(now);

        // offset 为 7 时必然命中同一星期几, 所以循环一定有结果
        for days in 0..=7 {
            let date = today + Duration::days(days);
            if !self.weekdays.contains(&date.weekday()) {
                continue;
            }
            let candidate = self.slot_on(date);
            if candidate > now {
                return candidate;
            }
        }

        self.slot_on(today + Duration::days(7))
    }

    /// 指定参考时区日期当天的开奖时刻 (UTC)
    pub fn slot_on(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(self.time);
        let utc = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc)
    }

    /// `instant` 在参考时区下的日历日期
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    pub fn date_label(&self, instant: DateTime<Utc>) -> String {
        self.local_date(instant).format(DATE_LABEL_FORMAT).to_string()
    }

    pub fn to_reference(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }
}

/// 解析 `DD.MM.YYYY` 形式的日期标签
pub fn parse_date_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(label.trim(), DATE_LABEL_FORMAT).ok()
}

fn weekday_from_sunday(day: u32) -> AppResult<Weekday> {
    match day {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(AppError::ConfigError(format!(
            "invalid weekday {other}, expected 0 (Sunday) to 6 (Saturday)"
        ))),
    }
}
