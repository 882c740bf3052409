use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use eyre::Error;
use model::{
    block::{Block, BlockPatch},
    decimal::Decimal,
    session::Session,
};
use storage::{block::BlockStore, training::TrainingStore, user::UserStore};
use thiserror::Error;
use tx_macro::tx;

use super::history::History;

#[derive(Clone)]
pub struct Blocks {
    store: BlockStore,
    trainings: TrainingStore,
    users: UserStore,
    logs: History,
}

impl Blocks {
    pub(crate) fn new(
        store: BlockStore,
        trainings: TrainingStore,
        users: UserStore,
        logs: History,
    ) -> Self {
        Blocks {
            store,
            trainings,
            users,
            logs,
        }
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<Block>, Error> {
        self.store.get(session, id).await
    }

    pub async fn find_active(
        &self,
        session: &mut Session,
        client: ObjectId,
    ) -> Result<Option<Block>, Error> {
        self.store.find_active(session, client).await
    }

    /// Payment history of a client, newest first.
    pub async fn blocks_of(
        &self,
        session: &mut Session,
        client: ObjectId,
    ) -> Result<Vec<Block>, Error> {
        self.store.find_by_client(session, client).await
    }

    /// Registers a new prepaid block. Any previously active block of the
    /// client is deactivated in the same transaction; at most one block
    /// per client is active at any observation point.
    #[tx]
    pub async fn create_block(
        &self,
        session: &mut Session,
        client: ObjectId,
        purchased_at: DateTime<Utc>,
        total_sessions: u32,
        price_per_session: Decimal,
        price_per_block: Option<Decimal>,
    ) -> Result<Block, CreateBlockError> {
        if total_sessions == 0 {
            return Err(CreateBlockError::InvalidSessionCount);
        }
        if self.users.get(session, client).await?.is_none() {
            return Err(CreateBlockError::ClientNotFound);
        }

        self.store.deactivate_all(session, client).await?;
        let block = Block::new(
            client,
            purchased_at,
            total_sessions,
            price_per_session,
            price_per_block,
        );
        self.store.insert(session, &block).await?;
        self.logs.create_block(session, &block).await?;
        Ok(block)
    }

    #[tx]
    pub async fn edit_block(
        &self,
        session: &mut Session,
        id: ObjectId,
        patch: BlockPatch,
    ) -> Result<Block, EditBlockError> {
        let mut block = self
            .store
            .get(session, id)
            .await?
            .ok_or(EditBlockError::BlockNotFound)?;
        block.apply(patch);
        self.store.update(session, &mut block).await?;
        self.logs.edit_block(session, id).await?;
        Ok(block)
    }

    /// A block is deletable only while untouched; once any session has
    /// consumed against it, it can only be deactivated.
    #[tx]
    pub async fn delete_block(
        &self,
        session: &mut Session,
        id: ObjectId,
    ) -> Result<(), DeleteBlockError> {
        let block = self
            .store
            .get(session, id)
            .await?
            .ok_or(DeleteBlockError::BlockNotFound)?;
        if block.consumed_sessions > 0 {
            return Err(DeleteBlockError::BlockInUse);
        }
        if self.trainings.references_block(session, id).await? {
            return Err(DeleteBlockError::BlockInUse);
        }
        self.store.delete(session, id).await?;
        self.logs.delete_block(session, id).await?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum CreateBlockError {
    #[error("Client not found")]
    ClientNotFound,
    #[error("Invalid session count")]
    InvalidSessionCount,
    #[error(transparent)]
    Common(#[from] Error),
}

#[derive(Error, Debug)]
pub enum EditBlockError {
    #[error("Block not found")]
    BlockNotFound,
    #[error(transparent)]
    Common(#[from] Error),
}

#[derive(Error, Debug)]
pub enum DeleteBlockError {
    #[error("Block not found")]
    BlockNotFound,
    #[error("Block has consumed sessions")]
    BlockInUse,
    #[error(transparent)]
    Common(#[from] Error),
}
