use chrono::NaiveDate;
use tracing::{info, warn};

/// 레저에서 일어난 주요 사건
///
/// 레저는 사건을 보고만 하고 어떤 형태로 기록할지는 [`ActivityLog`] 구현체가 정한다.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Activity {
    /// 스냅샷에서 레코드를 읽어 옴
    Loaded { location: String, count: usize },

    /// 저장된 스냅샷이 없어 빈 카탈로그로 시작함
    StartedFresh { location: String },

    /// 스냅샷을 읽거나 해석할 수 없어 빈 카탈로그로 시작함
    LoadFailed { location: String, reason: String },

    Added { key: String },

    Updated { key: String },

    Deleted { key: String },

    CheckedOut { key: String, borrower: String, due_date: NaiveDate },

    Queued { key: String, borrower: String, position: usize },

    Returned { key: String, late_days: i64, promoted: Option<String> },

    Exported { count: usize },

    Saved { location: String, count: usize },

    Failed { operation: &'static str, message: String },
}

/// 사건을 기록하는 로그 트레이트
pub trait ActivityLog {
    fn report(&mut self, activity: &Activity);
}

/// `activity` 타겟의 tracing 이벤트로 사건을 남긴다.
///
/// 시간 기록과 파일 출력은 전역 subscriber 설정을 따른다.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingActivityLog;

impl ActivityLog for TracingActivityLog {
    fn report(&mut self, activity: &Activity) {
        match activity {
            Activity::Loaded { location, count } =>
                info!(target: "activity", location = %location, count, "스냅샷을 불러왔습니다."),
            Activity::StartedFresh { location } =>
                info!(target: "activity", location = %location, "저장된 스냅샷이 없어 새로 시작합니다."),
            Activity::LoadFailed { location, reason } =>
                warn!(target: "activity", location = %location, reason = %reason, "스냅샷을 읽을 수 없어 빈 카탈로그로 시작합니다."),
            Activity::Added { key } =>
                info!(target: "activity", key = %key, "레코드를 등록했습니다."),
            Activity::Updated { key } =>
                info!(target: "activity", key = %key, "레코드를 수정했습니다."),
            Activity::Deleted { key } =>
                info!(target: "activity", key = %key, "레코드를 삭제했습니다."),
            Activity::CheckedOut { key, borrower, due_date } =>
                info!(target: "activity", key = %key, borrower = %borrower, due_date = %due_date, "대여 처리 했습니다."),
            Activity::Queued { key, borrower, position } =>
                info!(target: "activity", key = %key, borrower = %borrower, position, "대기열에 추가했습니다."),
            Activity::Returned { key, late_days, promoted } =>
                info!(target: "activity", key = %key, late_days, promoted = ?promoted, "반납 처리 했습니다."),
            Activity::Exported { count } =>
                info!(target: "activity", count, "레코드를 내보냈습니다."),
            Activity::Saved { location, count } =>
                info!(target: "activity", location = %location, count, "스냅샷을 저장했습니다."),
            Activity::Failed { operation, message } =>
                warn!(target: "activity", operation, message = %message, "요청을 처리하지 못했습니다."),
        }
    }
}

/// 사건을 메모리에 모아두는 로그
#[derive(Debug, Clone, Default)]
pub struct MemoryActivityLog {
    entries: Vec<Activity>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Activity] {
        &self.entries
    }
}

impl ActivityLog for MemoryActivityLog {
    fn report(&mut self, activity: &Activity) {
        self.entries.push(activity.clone());
    }
}
