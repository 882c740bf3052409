use bson::oid::ObjectId;
use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::{decimal::Decimal, ids::DayId};

/// One scheduled training slot for one client.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Training {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub client: ObjectId,
    /// Midnight of the calendar day; the hour lives next to it.
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub day: DateTime<Utc>,
    pub hour: u32,
    pub program: Option<ObjectId>,
    #[serde(default)]
    pub status: TrainingStatus,
    pub attended: Option<bool>,
    /// Whether this record has already debited a block. A record debits
    /// at most once; a reversal refunds at most once.
    #[serde(default)]
    pub was_counted: bool,
    #[serde(default)]
    pub is_single_paid: bool,
    pub single_price: Option<Decimal>,
    pub single_payment_method: Option<PaymentMethod>,
    /// The block this record drew from, set on debit and cleared again
    /// on reversal. One debit refunds at most once.
    pub block: Option<ObjectId>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Training {
    pub fn new(
        client: ObjectId,
        day: DayId,
        hour: u32,
        program: Option<ObjectId>,
        single: Option<SinglePayment>,
    ) -> Training {
        Training {
            id: ObjectId::new(),
            client,
            day: day.id(),
            hour,
            program,
            status: TrainingStatus::Pending,
            attended: None,
            was_counted: false,
            is_single_paid: single.is_some(),
            single_price: single.as_ref().map(|s| s.price),
            single_payment_method: single.map(|s| s.method),
            block: None,
            created_at: Utc::now(),
            version: 0,
        }
    }

    pub fn day_id(&self) -> DayId {
        DayId::from(self.day)
    }

    pub fn start_at(&self) -> DateTime<Local> {
        self.day_id().local() + Duration::hours(self.hour as i64)
    }

    /// A record that already debited a block cannot be deleted; it has to
    /// be reversed through a status change instead.
    pub fn can_delete(&self) -> bool {
        !self.was_counted
    }

    /// Attendance-marking state machine, storage-free half.
    ///
    /// Sets `attended` and reports what the caller owes the block ledger:
    /// nothing for a repeated value, nothing for single-paid records,
    /// nothing for records that already debited once.
    pub fn apply_attendance(&mut self, attended: bool) -> AttendanceEffect {
        if self.attended == Some(attended) {
            return AttendanceEffect::NoChange;
        }
        self.attended = Some(attended);
        if self.is_single_paid || self.was_counted {
            AttendanceEffect::Marked
        } else {
            AttendanceEffect::NeedsDebit
        }
    }

    /// Binds the record to the block it drew from. Called exactly once,
    /// in the same transaction as the block counter increment.
    pub fn record_debit(&mut self, block: ObjectId) {
        self.was_counted = true;
        self.block = Some(block);
    }

    /// Status-change state machine, storage-free half.
    ///
    /// Confirmation also flips `attended`/`was_counted`: the system
    /// treats "client intends to come" as counted. Declining a record
    /// that actually debited a block reports the reversal the caller
    /// must apply to that block.
    pub fn apply_status(&mut self, status: TrainingStatus) -> StatusEffect {
        let reversal = status == TrainingStatus::Declined
            && self.was_counted
            && !self.is_single_paid;
        self.status = status;
        let confirmed = status == TrainingStatus::Confirmed;
        self.attended = Some(confirmed);
        self.was_counted = confirmed && !self.is_single_paid;
        if reversal {
            if let Some(block) = self.block.take() {
                return StatusEffect::Reversal(block);
            }
        }
        StatusEffect::Applied
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrainingStatus {
    #[default]
    Pending,
    Confirmed,
    Declined,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

#[derive(Debug, Clone, Copy)]
pub struct SinglePayment {
    pub price: Decimal,
    pub method: PaymentMethod,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AttendanceEffect {
    /// Requested value equals the current one; nothing to persist.
    NoChange,
    /// Attendance flag changed; no ledger interaction.
    Marked,
    /// Attendance flag changed and the client's active block must be
    /// debited in the same transaction.
    NeedsDebit,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StatusEffect {
    Applied,
    /// The referenced block must be refunded one session in the same
    /// transaction.
    Reversal(ObjectId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_paid() -> Training {
        Training::new(ObjectId::new(), DayId::default(), 10, None, None)
    }

    fn single_paid() -> Training {
        Training::new(
            ObjectId::new(),
            DayId::default(),
            10,
            None,
            Some(SinglePayment {
                price: Decimal::int(900),
                method: PaymentMethod::Cash,
            }),
        )
    }

    #[test]
    fn test_marking_is_idempotent() {
        let mut training = block_paid();
        assert_eq!(AttendanceEffect::NeedsDebit, training.apply_attendance(true));
        let before = training.clone();
        assert_eq!(AttendanceEffect::NoChange, training.apply_attendance(true));
        assert_eq!(before.attended, training.attended);
        assert_eq!(before.was_counted, training.was_counted);
    }

    #[test]
    fn test_single_paid_never_touches_ledger() {
        let mut training = single_paid();
        assert_eq!(AttendanceEffect::Marked, training.apply_attendance(true));
        assert_eq!(AttendanceEffect::Marked, training.apply_attendance(false));
        assert_eq!(AttendanceEffect::Marked, training.apply_attendance(true));
        assert!(!training.was_counted);
        assert!(training.block.is_none());

        assert_eq!(
            StatusEffect::Applied,
            training.apply_status(TrainingStatus::Declined)
        );
    }

    #[test]
    fn test_counted_record_debits_only_once() {
        let mut training = block_paid();
        assert_eq!(AttendanceEffect::NeedsDebit, training.apply_attendance(true));
        training.record_debit(ObjectId::new());
        // flipping the flag afterwards must not debit again
        assert_eq!(AttendanceEffect::Marked, training.apply_attendance(false));
        assert_eq!(AttendanceEffect::Marked, training.apply_attendance(true));
        assert!(training.was_counted);
    }

    #[test]
    fn test_confirm_derives_counted() {
        let mut training = block_paid();
        assert_eq!(
            StatusEffect::Applied,
            training.apply_status(TrainingStatus::Confirmed)
        );
        assert_eq!(TrainingStatus::Confirmed, training.status);
        assert_eq!(Some(true), training.attended);
        assert!(training.was_counted);
        // confirmation alone never set a block reference
        assert!(training.block.is_none());
    }

    #[test]
    fn test_decline_after_debit_reverses() {
        let mut training = block_paid();
        training.apply_attendance(true);
        let block = ObjectId::new();
        training.record_debit(block);

        assert_eq!(
            StatusEffect::Reversal(block),
            training.apply_status(TrainingStatus::Declined)
        );
        assert_eq!(Some(false), training.attended);
        assert!(!training.was_counted);
        assert!(training.block.is_none());
    }

    #[test]
    fn test_decline_without_debit_has_no_reversal() {
        let mut training = block_paid();
        training.apply_status(TrainingStatus::Confirmed);
        // counted by confirmation only, no block reference
        assert_eq!(
            StatusEffect::Applied,
            training.apply_status(TrainingStatus::Declined)
        );
        assert!(!training.was_counted);
    }

    #[test]
    fn test_reversal_happens_at_most_once() {
        let mut training = block_paid();
        training.apply_attendance(true);
        let block = ObjectId::new();
        training.record_debit(block);
        assert_eq!(
            StatusEffect::Reversal(block),
            training.apply_status(TrainingStatus::Declined)
        );
        assert_eq!(
            StatusEffect::Applied,
            training.apply_status(TrainingStatus::Declined)
        );
        // confirming again counts without a new debit, so another decline
        // must not refund a second time
        training.apply_status(TrainingStatus::Confirmed);
        assert_eq!(
            StatusEffect::Applied,
            training.apply_status(TrainingStatus::Declined)
        );
    }

    #[test]
    fn test_counted_record_cannot_be_deleted() {
        let mut training = block_paid();
        assert!(training.can_delete());
        training.apply_attendance(true);
        training.record_debit(ObjectId::new());
        assert!(!training.can_delete());
    }

    #[test]
    fn test_start_at_combines_day_and_hour() {
        let day = DayId::with_ymd(2025, 3, 10).unwrap();
        let training = Training::new(ObjectId::new(), day, 18, None, None);
        let start = training.start_at();
        assert_eq!(day, DayId::from(start));
        assert_eq!(18, chrono::Timelike::hour(&start));
    }
}
