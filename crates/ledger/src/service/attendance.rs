use bson::oid::ObjectId;
use eyre::Error;
use model::{
    block::DebitOutcome,
    rights::Actor,
    session::Session,
    training::{AttendanceEffect, StatusEffect, Training, TrainingStatus},
};
use storage::{block::BlockStore, training::TrainingStore, user::UserStore};
use thiserror::Error;
use tx_macro::tx;

use super::{
    history::History,
    notifications::{Notifications, Purpose},
};

/// The accounting core: attendance marking debits the client's active
/// block, a later decline reverses the debit. Both paths mutate the
/// training record and the block inside one transaction.
#[derive(Clone)]
pub struct Attendance {
    trainings: TrainingStore,
    blocks: BlockStore,
    users: UserStore,
    logs: History,
    notifications: Notifications,
}

impl Attendance {
    pub(crate) fn new(
        trainings: TrainingStore,
        blocks: BlockStore,
        users: UserStore,
        logs: History,
        notifications: Notifications,
    ) -> Self {
        Attendance {
            trainings,
            blocks,
            users,
            logs,
            notifications,
        }
    }

    #[tx]
    pub async fn mark_attended(
        &self,
        session: &mut Session,
        id: ObjectId,
        attended: bool,
    ) -> Result<Training, MarkAttendanceError> {
        let mut training = self
            .trainings
            .get(session, id)
            .await?
            .ok_or(MarkAttendanceError::TrainingNotFound)?;

        match training.apply_attendance(attended) {
            AttendanceEffect::NoChange => return Ok(training),
            AttendanceEffect::Marked => {
                self.trainings.update(session, &mut training).await?;
                self.logs
                    .mark_attendance(session, &training, attended)
                    .await?;
            }
            AttendanceEffect::NeedsDebit => {
                let mut block = self
                    .blocks
                    .find_active(session, training.client)
                    .await?
                    .ok_or(MarkAttendanceError::NoActiveBlock)?;
                if !block.covers(training.day_id()) {
                    return Err(MarkAttendanceError::BlockPurchasedLater);
                }

                let outcome = block
                    .debit()
                    .map_err(|_| MarkAttendanceError::NoActiveBlock)?;
                training.record_debit(block.id);

                self.trainings.update(session, &mut training).await?;
                self.blocks.debit(session, block.id).await?;
                self.logs
                    .mark_attendance(session, &training, attended)
                    .await?;

                if outcome == DebitOutcome::Exhausted {
                    self.blocks.set_active(session, block.id, false).await?;
                    self.logs.block_exhausted(session, &block).await?;
                    let name = self
                        .users
                        .get(session, training.client)
                        .await?
                        .map(|u| u.name.to_string())
                        .unwrap_or_else(|| training.client.to_string());
                    self.notifications
                        .notify_admin(
                            Purpose::BlockExhausted,
                            &format!("Prepaid block of {} is exhausted", name),
                        )
                        .await;
                }
            }
        }
        Ok(training)
    }

    #[tx]
    pub async fn set_status(
        &self,
        session: &mut Session,
        id: ObjectId,
        status: TrainingStatus,
    ) -> Result<Training, SetStatusError> {
        if status == TrainingStatus::Pending {
            return Err(SetStatusError::InvalidStatus);
        }
        let mut training = self
            .trainings
            .get(session, id)
            .await?
            .ok_or(SetStatusError::TrainingNotFound)?;

        // clients may only alter their own sessions
        if let Actor::Client(actor) = session.actor() {
            if actor != training.client {
                return Err(SetStatusError::Forbidden);
            }
        }

        if let StatusEffect::Reversal(block) = training.apply_status(status) {
            self.blocks.refund(session, block).await?;
            self.logs.reverse_debit(session, training.id, block).await?;
        }
        self.trainings.update(session, &mut training).await?;
        self.logs.change_status(session, &training, status).await?;

        let text = format!(
            "Training on {} at {}:00 was {}",
            training.day_id().local().format("%d.%m.%Y"),
            training.hour,
            match status {
                TrainingStatus::Confirmed => "confirmed",
                _ => "declined",
            }
        );
        if let Some(user) = self.users.get(session, training.client).await? {
            self.notifications
                .notify(Purpose::StatusChanged, user.chat_id, &text, &[])
                .await;
        }
        self.notifications
            .notify_admin(Purpose::StatusChanged, &text)
            .await;

        Ok(training)
    }
}

#[derive(Debug, Error)]
pub enum MarkAttendanceError {
    #[error("Training not found")]
    TrainingNotFound,
    #[error("No matching active block")]
    NoActiveBlock,
    #[error("Block was purchased after the training date")]
    BlockPurchasedLater,
    #[error("Common error:{0}")]
    Common(#[from] Error),
}

#[derive(Debug, Error)]
pub enum SetStatusError {
    #[error("Training not found")]
    TrainingNotFound,
    #[error("Invalid status")]
    InvalidStatus,
    #[error("Clients may only alter their own sessions")]
    Forbidden,
    #[error("Common error:{0}")]
    Common(#[from] Error),
}
