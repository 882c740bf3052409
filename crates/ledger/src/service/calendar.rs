use bson::oid::ObjectId;
use chrono::Local;
use eyre::Error;
use model::{
    ids::DayId,
    program::next_program,
    session::Session,
    training::{SinglePayment, Training},
};
use storage::{program::ProgramStore, training::TrainingStore, user::UserStore};
use thiserror::Error;
use tx_macro::tx;

use super::{
    history::History,
    notifications::{Button, Notifications, Purpose},
};

#[derive(Clone)]
pub struct Calendar {
    trainings: TrainingStore,
    programs: ProgramStore,
    users: UserStore,
    logs: History,
    notifications: Notifications,
}

impl Calendar {
    pub(crate) fn new(
        trainings: TrainingStore,
        programs: ProgramStore,
        users: UserStore,
        logs: History,
        notifications: Notifications,
    ) -> Self {
        Calendar {
            trainings,
            programs,
            users,
            logs,
            notifications,
        }
    }

    pub async fn get_training(
        &self,
        session: &mut Session,
        id: ObjectId,
    ) -> Result<Option<Training>, Error> {
        self.trainings.get(session, id).await
    }

    pub async fn trainings_of(
        &self,
        session: &mut Session,
        client: ObjectId,
    ) -> Result<Vec<Training>, Error> {
        self.trainings.find_by_client(session, client).await
    }

    pub async fn trainings_on(
        &self,
        session: &mut Session,
        day: DayId,
    ) -> Result<Vec<Training>, Error> {
        self.trainings.find_by_day(session, day).await
    }

    #[tx]
    pub async fn schedule_training(
        &self,
        session: &mut Session,
        client: ObjectId,
        day: DayId,
        hour: u32,
        single: Option<SinglePayment>,
        program: Option<ObjectId>,
    ) -> Result<Training, ScheduleError> {
        if hour >= 24 {
            return Err(ScheduleError::InvalidHour(hour));
        }
        let user = self
            .users
            .get(session, client)
            .await?
            .ok_or(ScheduleError::ClientNotFound)?;

        let program = match program {
            Some(id) => {
                self.programs
                    .get(session, id)
                    .await?
                    .ok_or(ScheduleError::ProgramNotFound)?;
                Some(id)
            }
            None => self.rotation_program(session, client).await?,
        };

        let training = Training::new(client, day, hour, program, single);
        self.trainings.insert(session, &training).await?;
        self.logs.schedule_training(session, &training).await?;

        if training.start_at() > Local::now() {
            let text = format!(
                "New training scheduled on {} at {}:00",
                day.local().format("%d.%m.%Y"),
                hour
            );
            let buttons = [
                Button::new("Confirm", format!("confirm:{}", training.id)),
                Button::new("Decline", format!("decline:{}", training.id)),
            ];
            self.notifications
                .notify(Purpose::TrainingScheduled, user.chat_id, &text, &buttons)
                .await;
        }
        Ok(training)
    }

    /// A record that already debited a block cannot be silently erased;
    /// it has to be reversed through a status change instead.
    #[tx]
    pub async fn cancel_training(
        &self,
        session: &mut Session,
        id: ObjectId,
    ) -> Result<Training, CancelTrainingError> {
        let training = self
            .trainings
            .get(session, id)
            .await?
            .ok_or(CancelTrainingError::TrainingNotFound)?;
        if !training.can_delete() {
            return Err(CancelTrainingError::AlreadyCounted);
        }

        self.trainings.delete(session, id).await?;
        self.logs.cancel_training(session, &training).await?;

        if training.start_at() > Local::now() {
            if let Some(user) = self.users.get(session, training.client).await? {
                let text = format!(
                    "Training on {} at {}:00 was canceled",
                    training.day_id().local().format("%d.%m.%Y"),
                    training.hour
                );
                self.notifications
                    .notify(Purpose::TrainingCanceled, user.chat_id, &text, &[])
                    .await;
            }
        }
        Ok(training)
    }

    /// Round-robin over the client's active programs, anchored at the
    /// most recent program-bearing training.
    async fn rotation_program(
        &self,
        session: &mut Session,
        client: ObjectId,
    ) -> Result<Option<ObjectId>, Error> {
        let programs = self.programs.find_active(session, client).await?;
        let last = self
            .trainings
            .find_last_with_program(session, client)
            .await?;
        Ok(next_program(&programs, last.and_then(|t| t.program)).map(|p| p.id))
    }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid hour:{0}")]
    InvalidHour(u32),
    #[error("Client not found")]
    ClientNotFound,
    #[error("Program not found")]
    ProgramNotFound,
    #[error("Common error:{0}")]
    Common(#[from] Error),
}

#[derive(Debug, Error)]
pub enum CancelTrainingError {
    #[error("Training not found")]
    TrainingNotFound,
    #[error("Training has already debited a block")]
    AlreadyCounted,
    #[error("Common error:{0}")]
    Common(#[from] Error),
}
