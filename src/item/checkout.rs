use chrono::{Days, NaiveDate};
use std::collections::VecDeque;

/// 대여 가능 상태
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Availability {
    #[default]
    Available,

    /// 대여 중이며 반납 예정일을 가진다.
    CheckedOut { due_date: NaiveDate },
}

/// 대여 이력
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Loan {
    borrower: String,
    checkout_date: NaiveDate,
    due_date: NaiveDate,
}

impl Loan {
    pub fn new(borrower: &str, checkout_date: NaiveDate, due_date: NaiveDate) -> Self {
        Self {
            borrower: borrower.to_owned(),
            checkout_date,
            due_date,
        }
    }

    pub fn borrower(&self) -> &str {
        &self.borrower
    }

    pub fn checkout_date(&self) -> NaiveDate {
        self.checkout_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }
}

/// 대여 요청 결과
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CheckoutOutcome {
    /// 대여 처리 되었다.
    Lent { due_date: NaiveDate },

    /// 대여 중이라 대기열에 추가 되었다. 위치는 1부터 시작한다.
    Queued { position: usize },

    /// 이미 대기열에 있어 아무것도 바뀌지 않았다.
    AlreadyQueued { position: usize },

    /// 요청한 대여자가 이미 빌려간 상태다.
    AlreadyHolding { due_date: NaiveDate },
}

/// 반납 결과
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReturnReceipt {
    late_days: i64,
    promoted: Option<String>,
}

impl ReturnReceipt {
    pub fn late_days(&self) -> i64 {
        self.late_days
    }

    pub fn was_late(&self) -> bool {
        self.late_days > 0
    }

    /// 대기열에서 꺼낸 대여자로, 알림은 호출한 쪽의 책임이다.
    pub fn promoted(&self) -> Option<&str> {
        self.promoted.as_deref()
    }
}

/// 대여 중이 아닌 아이템을 반납하려 함
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct NotCheckedOut;

/// 아이템 한 개의 대여 상태, 대기열, 대여 이력
///
/// 대기열은 FIFO로 동작하며 같은 대여자가 두 번 들어가지 않는다.
/// 대여 중일 때만 반납 예정일이 존재하며 이는 [`Availability`]로 보장된다.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct CheckoutState {
    availability: Availability,
    waitlist: VecDeque<String>,
    history: Vec<Loan>,
}

impl CheckoutState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 상태를 그대로 복원한다. 대기열의 중복 대여자는 처음 것만 남긴다.
    pub fn restore(availability: Availability, waitlist: Vec<String>, history: Vec<Loan>) -> Self {
        let mut queue = VecDeque::with_capacity(waitlist.len());
        for borrower in waitlist {
            if !queue.contains(&borrower) {
                queue.push_back(borrower);
            }
        }

        Self {
            availability,
            waitlist: queue,
            history,
        }
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        match self.availability {
            Availability::Available => None,
            Availability::CheckedOut { due_date } => Some(due_date),
        }
    }

    pub fn waitlist(&self) -> impl ExactSizeIterator<Item = &str> {
        self.waitlist.iter().map(String::as_str)
    }

    pub fn history(&self) -> &[Loan] {
        &self.history
    }

    /// 현재 대여자로, 대여 중일 때 마지막 대여 이력의 대여자다.
    pub fn holder(&self) -> Option<&str> {
        match self.availability {
            Availability::Available => None,
            Availability::CheckedOut { .. } => self.history.last().map(Loan::borrower),
        }
    }

    pub fn checkout(&mut self, borrower: &str, loan_days: u32, today: NaiveDate) -> CheckoutOutcome {
        match self.availability {
            Availability::Available => {
                let due_date = today
                    .checked_add_days(Days::new(loan_days as u64))
                    .unwrap_or(NaiveDate::MAX);
                self.availability = Availability::CheckedOut { due_date };
                self.waitlist.retain(|b| b != borrower);
                self.history.push(Loan::new(borrower, today, due_date));
                CheckoutOutcome::Lent { due_date }
            }
            Availability::CheckedOut { due_date } => {
                if self.holder() == Some(borrower) {
                    return CheckoutOutcome::AlreadyHolding { due_date };
                }
                if let Some(index) = self.waitlist.iter().position(|b| b == borrower) {
                    return CheckoutOutcome::AlreadyQueued { position: index + 1 };
                }
                self.waitlist.push_back(borrower.to_owned());
                CheckoutOutcome::Queued { position: self.waitlist.len() }
            }
        }
    }

    pub fn return_item(&mut self, today: NaiveDate) -> Result<ReturnReceipt, NotCheckedOut> {
        let due_date = self.due_date().ok_or(NotCheckedOut)?;
        let late_days = (today - due_date).num_days().max(0);

        self.availability = Availability::Available;
        let promoted = self.waitlist.pop_front();

        Ok(ReturnReceipt {
            late_days,
            promoted,
        })
    }
}
