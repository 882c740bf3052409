use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{decimal::Decimal, ids::DayId};

/// Prepaid bundle of training sessions for one client.
///
/// At most one block per client is active at a time; the Blocks service
/// deactivates the previous one in the same transaction that inserts a
/// new one.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Block {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub client: ObjectId,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub purchased_at: DateTime<Utc>,
    pub total_sessions: u32,
    pub consumed_sessions: u32,
    pub is_active: bool,
    pub price_per_session: Decimal,
    pub price_per_block: Decimal,
    #[serde(default)]
    pub version: u64,
}

impl Block {
    pub fn new(
        client: ObjectId,
        purchased_at: DateTime<Utc>,
        total_sessions: u32,
        price_per_session: Decimal,
        price_per_block: Option<Decimal>,
    ) -> Block {
        Block {
            id: ObjectId::new(),
            client,
            purchased_at,
            total_sessions,
            consumed_sessions: 0,
            is_active: true,
            price_per_session,
            price_per_block: price_per_block
                .unwrap_or(price_per_session * Decimal::from(total_sessions)),
            version: 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.total_sessions.saturating_sub(self.consumed_sessions)
    }

    pub fn is_exhausted(&self) -> bool {
        self.consumed_sessions >= self.total_sessions
    }

    /// The block cannot retroactively pay for a training scheduled before
    /// it was purchased.
    pub fn covers(&self, day: DayId) -> bool {
        DayId::from(self.purchased_at) <= day
    }

    /// Consumes one session. Deactivates the block in the same call when
    /// the last session is consumed.
    pub fn debit(&mut self) -> Result<DebitOutcome, BlockError> {
        if !self.is_active {
            return Err(BlockError::Inactive);
        }
        self.consumed_sessions += 1;
        if self.is_exhausted() {
            self.is_active = false;
            Ok(DebitOutcome::Exhausted)
        } else {
            Ok(DebitOutcome::Consumed)
        }
    }

    /// Returns one previously consumed session. Does not re-activate an
    /// exhausted block; reactivation is an explicit admin edit.
    pub fn refund(&mut self) {
        self.consumed_sessions = self.consumed_sessions.saturating_sub(1);
    }

    pub fn apply(&mut self, patch: BlockPatch) {
        let price_fields_changed =
            patch.total_sessions.is_some() || patch.price_per_session.is_some();

        if let Some(purchased_at) = patch.purchased_at {
            self.purchased_at = purchased_at;
        }
        if let Some(total_sessions) = patch.total_sessions {
            self.total_sessions = total_sessions;
        }
        if let Some(price_per_session) = patch.price_per_session {
            self.price_per_session = price_per_session;
        }
        if let Some(consumed_sessions) = patch.consumed_sessions {
            self.consumed_sessions = consumed_sessions;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        match patch.price_per_block {
            Some(price_per_block) => self.price_per_block = price_per_block,
            None if price_fields_changed => {
                self.price_per_block =
                    self.price_per_session * Decimal::from(self.total_sessions);
            }
            None => {}
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DebitOutcome {
    Consumed,
    Exhausted,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("Block is not active")]
    Inactive,
}

/// Partial admin edit of a block.
#[derive(Debug, Default, Clone)]
pub struct BlockPatch {
    pub purchased_at: Option<DateTime<Utc>>,
    pub total_sessions: Option<u32>,
    pub price_per_session: Option<Decimal>,
    pub price_per_block: Option<Decimal>,
    pub consumed_sessions: Option<u32>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(total: u32) -> Block {
        Block::new(
            ObjectId::new(),
            Utc::now(),
            total,
            Decimal::int(800),
            None,
        )
    }

    #[test]
    fn test_price_per_block_default() {
        let block = block(8);
        assert_eq!(Decimal::int(6400), block.price_per_block);

        let explicit = Block::new(
            ObjectId::new(),
            Utc::now(),
            8,
            Decimal::int(800),
            Some(Decimal::int(6000)),
        );
        assert_eq!(Decimal::int(6000), explicit.price_per_block);
    }

    #[test]
    fn test_debit_and_refund_conserve_counter() {
        let mut block = block(8);
        assert_eq!(Ok(DebitOutcome::Consumed), block.debit());
        assert_eq!(1, block.consumed_sessions);
        block.refund();
        assert_eq!(0, block.consumed_sessions);
        block.refund();
        assert_eq!(0, block.consumed_sessions);
    }

    #[test]
    fn test_exhaustion_deactivates() {
        let mut block = block(8);
        block.consumed_sessions = 7;
        assert_eq!(Ok(DebitOutcome::Exhausted), block.debit());
        assert_eq!(8, block.consumed_sessions);
        assert!(!block.is_active);
        assert_eq!(Err(BlockError::Inactive), block.debit());
    }

    #[test]
    fn test_refund_keeps_exhausted_block_inactive() {
        let mut block = block(1);
        block.debit().unwrap();
        assert!(!block.is_active);
        block.refund();
        assert_eq!(0, block.consumed_sessions);
        assert!(!block.is_active);
    }

    #[test]
    fn test_covers() {
        let purchased = DayId::with_ymd(2025, 3, 10).unwrap();
        let block = Block::new(
            ObjectId::new(),
            purchased.id(),
            8,
            Decimal::int(800),
            None,
        );
        assert!(block.covers(purchased));
        assert!(block.covers(purchased.next()));
        assert!(!block.covers(purchased.prev()));
    }

    #[test]
    fn test_patch_recomputes_block_price() {
        let mut block = block(8);
        block.apply(BlockPatch {
            total_sessions: Some(10),
            ..Default::default()
        });
        assert_eq!(Decimal::int(8000), block.price_per_block);

        block.apply(BlockPatch {
            total_sessions: Some(12),
            price_per_block: Some(Decimal::int(9000)),
            ..Default::default()
        });
        assert_eq!(Decimal::int(9000), block.price_per_block);

        // untouched price fields leave the explicit block price alone
        block.apply(BlockPatch {
            is_active: Some(false),
            ..Default::default()
        });
        assert_eq!(Decimal::int(9000), block.price_per_block);
        assert!(!block.is_active);
    }
}
