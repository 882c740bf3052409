use std::sync::Arc;

use bson::oid::ObjectId;
use eyre::Result;
use model::{
    block::Block,
    history::{Action, HistoryRow},
    session::Session,
    training::{Training, TrainingStatus},
};
use storage::history::HistoryStore;

#[derive(Clone)]
pub struct History {
    store: Arc<HistoryStore>,
}

impl History {
    pub fn new(store: HistoryStore) -> Self {
        History {
            store: Arc::new(store),
        }
    }

    pub async fn create_user(
        &self,
        session: &mut Session,
        chat_id: i64,
        name: String,
    ) -> Result<()> {
        let entry = HistoryRow::new(session.actor(), Action::CreateUser { chat_id, name });
        self.store.store(session, entry).await
    }

    pub async fn create_block(&self, session: &mut Session, block: &Block) -> Result<()> {
        let entry = HistoryRow::with_sub_actors(
            session.actor(),
            vec![block.client],
            Action::CreateBlock {
                block: block.id,
                client: block.client,
                total_sessions: block.total_sessions,
                price_per_block: block.price_per_block,
            },
        );
        self.store.store(session, entry).await
    }

    pub async fn edit_block(&self, session: &mut Session, block: ObjectId) -> Result<()> {
        let entry = HistoryRow::new(session.actor(), Action::EditBlock { block });
        self.store.store(session, entry).await
    }

    pub async fn delete_block(&self, session: &mut Session, block: ObjectId) -> Result<()> {
        let entry = HistoryRow::new(session.actor(), Action::DeleteBlock { block });
        self.store.store(session, entry).await
    }

    pub async fn schedule_training(
        &self,
        session: &mut Session,
        training: &Training,
    ) -> Result<()> {
        let entry = HistoryRow::with_sub_actors(
            session.actor(),
            vec![training.client],
            Action::ScheduleTraining {
                training: training.id,
                client: training.client,
                start_at: training.start_at().with_timezone(&chrono::Utc),
            },
        );
        self.store.store(session, entry).await
    }

    pub async fn cancel_training(
        &self,
        session: &mut Session,
        training: &Training,
    ) -> Result<()> {
        let entry = HistoryRow::with_sub_actors(
            session.actor(),
            vec![training.client],
            Action::CancelTraining {
                training: training.id,
                client: training.client,
            },
        );
        self.store.store(session, entry).await
    }

    pub async fn mark_attendance(
        &self,
        session: &mut Session,
        training: &Training,
        attended: bool,
    ) -> Result<()> {
        let entry = HistoryRow::with_sub_actors(
            session.actor(),
            vec![training.client],
            Action::MarkAttendance {
                training: training.id,
                attended,
            },
        );
        self.store.store(session, entry).await
    }

    pub async fn change_status(
        &self,
        session: &mut Session,
        training: &Training,
        status: TrainingStatus,
    ) -> Result<()> {
        let entry = HistoryRow::with_sub_actors(
            session.actor(),
            vec![training.client],
            Action::ChangeStatus {
                training: training.id,
                status,
            },
        );
        self.store.store(session, entry).await
    }

    pub async fn reverse_debit(
        &self,
        session: &mut Session,
        training: ObjectId,
        block: ObjectId,
    ) -> Result<()> {
        let entry = HistoryRow::new(session.actor(), Action::ReverseDebit { training, block });
        self.store.store(session, entry).await
    }

    pub async fn block_exhausted(&self, session: &mut Session, block: &Block) -> Result<()> {
        let entry = HistoryRow::with_sub_actors(
            session.actor(),
            vec![block.client],
            Action::BlockExhausted {
                block: block.id,
                client: block.client,
            },
        );
        self.store.store(session, entry).await
    }

    pub async fn log_nutrition(
        &self,
        session: &mut Session,
        client: ObjectId,
        day: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        let entry = HistoryRow::with_sub_actors(
            session.actor(),
            vec![client],
            Action::LogNutrition { client, day },
        );
        self.store.store(session, entry).await
    }

    pub async fn logs(
        &self,
        session: &mut Session,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<HistoryRow>> {
        self.store.get_logs(session, limit, offset).await
    }
}
