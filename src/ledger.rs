pub mod activity;

pub use activity::{Activity, ActivityLog, MemoryActivityLog, TracingActivityLog};

use crate::catalog::{Catalog, CatalogError};
use crate::clock::Clock;
use crate::item::book::Lendable;
use crate::item::checkout::{CheckoutOutcome, NotCheckedOut, ReturnReceipt};
use crate::item::{ItemError, Record, SortKey, non_blank};
use crate::repo::snapshot::{decode, encode};
use crate::repo::{SnapshotRecord, SnapshotStore};
use std::fmt::Display;
use std::io;
use std::io::Write;

/// 시작 시 스냅샷을 읽은 결과
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LoadReport {
    /// 저장된 스냅샷이 없음
    Fresh,

    /// 스냅샷에서 레코드를 읽음
    Loaded(usize),

    /// 스냅샷 내용이 손상 되어 빈 카탈로그로 시작함
    Corrupt(String),

    /// 스냅샷을 읽지 못해 빈 카탈로그로 시작함
    Unreadable(String),
}

/// 카탈로그와 저장소, 로그를 묶은 레코드 관리 서비스
///
/// 레코드를 바꾸는 모든 연산은 카탈로그를 먼저 변경하고, 전체 스냅샷을 저장한 뒤 결과를 반환한다.
/// 저장에 실패해도 메모리의 변경은 유지되며 호출자에게 [`CatalogError::Persistence`]로 알린다.
pub struct Ledger<R: Record, S, L> {
    catalog: Catalog<R>,
    store: S,
    log: L,
    clock: Box<dyn Clock>,
}

impl<R, S, L> Ledger<R, S, L>
where
    R: Record + SnapshotRecord,
    S: SnapshotStore,
    L: ActivityLog
{
    /// 저장소에서 스냅샷을 읽어 레저를 연다. 스냅샷에 문제가 있으면 빈 카탈로그로 시작한다.
    pub fn open(scheme: R::Scheme, store: S, mut log: L, clock: Box<dyn Clock>) -> (Self, LoadReport) {
        let location = store.location();

        let (catalog, report) = match store.load_snapshot() {
            Ok(None) => (Catalog::new(scheme), LoadReport::Fresh),
            Ok(Some(contents)) => match restore::<R>(scheme, &contents) {
                Ok(catalog) => {
                    let count = catalog.len();
                    (catalog, LoadReport::Loaded(count))
                }
                Err(reason) => (Catalog::new(scheme), LoadReport::Corrupt(reason)),
            },
            Err(e) => (Catalog::new(scheme), LoadReport::Unreadable(e.to_string())),
        };

        let activity = match &report {
            LoadReport::Loaded(count) => Activity::Loaded { location, count: *count },
            LoadReport::Fresh => Activity::StartedFresh { location },
            LoadReport::Corrupt(reason) | LoadReport::Unreadable(reason) =>
                Activity::LoadFailed { location, reason: reason.clone() },
        };
        log.report(&activity);

        (Self { catalog, store, log, clock }, report)
    }

    pub fn scheme(&self) -> R::Scheme {
        self.catalog.scheme()
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.catalog.records()
    }

    pub fn parse_key(&self, raw: &str) -> Result<R::Key, CatalogError> {
        Ok(R::parse_key(raw, self.scheme())?)
    }

    pub fn find(&self, key: &R::Key) -> Option<&R> {
        self.catalog.find(key)
    }

    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a R> + use<'a, R, S, L> {
        self.catalog.search(term)
    }

    /// 카탈로그 순서를 바꾼 뒤 순회한다. 순서 변경만으로는 저장하지 않는다.
    pub fn sorted_view(&mut self, criterion: SortKey) -> impl Iterator<Item = &R> {
        self.catalog.sorted_view(criterion)
    }

    pub fn add(&mut self, draft: R::Draft) -> Result<R::Key, CatalogError> {
        let today = self.clock.today();
        let scheme = self.scheme();

        let result = R::create(draft, scheme, today)
            .map_err(CatalogError::from)
            .and_then(|record| {
                let key = record.key(scheme);
                self.catalog.insert(record).map(|_| key)
            });
        let key = self.reported("add", result)?;

        self.log.report(&Activity::Added { key: key.to_string() });
        self.persist()?;
        Ok(key)
    }

    /// 비어있는 항목은 기존 값을 유지한 채 레코드를 수정한다. 수정 후의 키를 반환한다.
    pub fn update(&mut self, key: &R::Key, patch: R::Patch) -> Result<R::Key, CatalogError> {
        let scheme = self.scheme();
        let result = self.catalog.update(key, patch).map(|record| record.key(scheme));
        let updated_key = self.reported("update", result)?;

        self.log.report(&Activity::Updated { key: updated_key.to_string() });
        self.persist()?;
        Ok(updated_key)
    }

    pub fn delete(&mut self, key: &R::Key) -> Result<R, CatalogError> {
        let result = self.catalog.delete(key);
        let removed = self.reported("delete", result)?;

        self.log.report(&Activity::Deleted { key: key.to_string() });
        self.persist()?;
        Ok(removed)
    }

    /// 현재 카탈로그 전체를 저장한다.
    pub fn save(&mut self) -> Result<(), CatalogError> {
        self.persist()
    }

    fn persist(&mut self) -> Result<(), CatalogError> {
        let result = encode(self.catalog.records())
            .and_then(|contents| self.store.save_snapshot(&contents))
            .map_err(CatalogError::from);
        self.reported("save", result)?;

        self.log.report(&Activity::Saved {
            location: self.store.location(),
            count: self.catalog.len(),
        });
        Ok(())
    }

    fn reported<T>(&mut self, operation: &'static str, result: Result<T, CatalogError>) -> Result<T, CatalogError> {
        if let Err(e) = &result {
            self.log.report(&Activity::Failed { operation, message: e.to_string() });
        }
        result
    }
}

fn restore<R>(scheme: R::Scheme, contents: &str) -> Result<Catalog<R>, String>
where
    R: Record + SnapshotRecord
{
    let records = decode::<R>(contents).map_err(|e| e.to_string())?;
    Catalog::from_records(scheme, records).map_err(|e| e.to_string())
}

impl<R, S, L> Ledger<R, S, L>
where
    R: Record + SnapshotRecord + Display,
    S: SnapshotStore,
    L: ActivityLog
{
    /// 사람이 읽을 수 있는 형태로 모든 레코드를 카탈로그 순서대로 내보낸다.
    pub fn export_to(&mut self, out: &mut dyn Write, heading: &str) -> io::Result<usize> {
        writeln!(out, "{}", heading)?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "Generated on: {}", self.clock.now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(out)?;

        let mut count = 0;
        for record in self.catalog.records() {
            writeln!(out, "{}", record)?;
            count += 1;
        }
        writeln!(out)?;
        writeln!(out, "Total Records: {}", count)?;

        self.log.report(&Activity::Exported { count });
        Ok(count)
    }
}

impl<R, S, L> Ledger<R, S, L>
where
    R: Lendable + SnapshotRecord,
    S: SnapshotStore,
    L: ActivityLog
{
    /// 대여 가능하면 빌려주고, 대여 중이면 대기열에 넣는다.
    ///
    /// 이미 대기 중이거나 현재 대여자인 경우에는 아무것도 바뀌지 않아 저장하지 않는다.
    pub fn checkout(&mut self, key: &R::Key, borrower: &str, loan_days: u32) -> Result<CheckoutOutcome, CatalogError> {
        let today = self.clock.today();
        let result = self.lend(key, borrower, loan_days, today);
        let outcome = self.reported("checkout", result)?;

        let activity = match outcome {
            CheckoutOutcome::Lent { due_date } => Activity::CheckedOut {
                key: key.to_string(),
                borrower: borrower.trim().to_owned(),
                due_date,
            },
            CheckoutOutcome::Queued { position } => Activity::Queued {
                key: key.to_string(),
                borrower: borrower.trim().to_owned(),
                position,
            },
            CheckoutOutcome::AlreadyQueued { .. } | CheckoutOutcome::AlreadyHolding { .. } => return Ok(outcome),
        };
        self.log.report(&activity);
        self.persist()?;
        Ok(outcome)
    }

    fn lend(&mut self, key: &R::Key, borrower: &str, loan_days: u32, today: chrono::NaiveDate) -> Result<CheckoutOutcome, CatalogError> {
        let borrower = non_blank(Some(borrower))
            .ok_or(ItemError::RequireArgumentMissing("borrower".to_owned()))?;
        if loan_days == 0 {
            return Err(ItemError::InvalidArgument("loan period must be at least one day".to_owned()).into());
        }

        let record = self.catalog.find_mut(key)
            .ok_or_else(|| CatalogError::NotFound(key.to_string()))?;
        Ok(record.circulation_mut().checkout(borrower, loan_days, today))
    }

    /// 반납 처리 후 대기열의 맨 앞 대여자를 알림 대상으로 돌려준다.
    pub fn return_item(&mut self, key: &R::Key) -> Result<ReturnReceipt, CatalogError> {
        let today = self.clock.today();
        let result = self.catalog.find_mut(key)
            .ok_or_else(|| CatalogError::NotFound(key.to_string()))
            .and_then(|record| {
                record.circulation_mut()
                    .return_item(today)
                    .map_err(|NotCheckedOut| CatalogError::NotCheckedOut(key.to_string()))
            });
        let receipt = self.reported("return", result)?;

        self.log.report(&Activity::Returned {
            key: key.to_string(),
            late_days: receipt.late_days(),
            promoted: receipt.promoted().map(str::to_owned),
        });
        self.persist()?;
        Ok(receipt)
    }
}
