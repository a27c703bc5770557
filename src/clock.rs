use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// 오늘 날짜를 알려주는 시계
pub trait Clock {
    fn today(&self) -> NaiveDate;

    /// 현재 시각으로, 기본 구현은 오늘 자정이다.
    fn now(&self) -> NaiveDateTime {
        self.today().and_time(NaiveTime::MIN)
    }
}

/// 로컬 시간대 기준 시스템 시계
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// 항상 같은 날짜를 반환하는 시계
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
