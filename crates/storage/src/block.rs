use std::sync::Arc;

use bson::{doc, oid::ObjectId};
use eyre::Error;
use log::info;
use model::{block::Block, session::Session};
use mongodb::{Collection, IndexModel};

use crate::session::Db;

const COLLECTION: &str = "blocks";

#[derive(Clone)]
pub struct BlockStore {
    collection: Arc<Collection<Block>>,
}

impl BlockStore {
    pub(crate) async fn new(db: &Db) -> Result<Self, Error> {
        let collection = db.collection(COLLECTION);
        collection
            .create_index(IndexModel::builder().keys(doc! { "client": 1 }).build())
            .await?;
        Ok(BlockStore {
            collection: Arc::new(collection),
        })
    }

    pub async fn insert(&self, session: &mut Session, block: &Block) -> Result<(), Error> {
        info!("Inserting block: {:?}", block);
        self.collection
            .insert_one(block)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<Block>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    /// The at-most-one active block of a client.
    pub async fn find_active(
        &self,
        session: &mut Session,
        client: ObjectId,
    ) -> Result<Option<Block>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "client": client, "is_active": true })
            .session(&mut *session)
            .await?)
    }

    pub async fn find_by_client(
        &self,
        session: &mut Session,
        client: ObjectId,
    ) -> Result<Vec<Block>, Error> {
        let mut cursor = self
            .collection
            .find(doc! { "client": client })
            .sort(doc! { "purchased_at": -1 })
            .session(&mut *session)
            .await?;
        let mut blocks = Vec::new();
        while let Some(block) = cursor.next(&mut *session).await {
            blocks.push(block?);
        }
        Ok(blocks)
    }

    pub async fn deactivate_all(
        &self,
        session: &mut Session,
        client: ObjectId,
    ) -> Result<(), Error> {
        info!("Deactivating blocks of client: {}", client);
        self.collection
            .update_many(
                doc! { "client": client, "is_active": true },
                doc! { "$set": { "is_active": false }, "$inc": { "version": 1 } },
            )
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn debit(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        info!("Debiting block: {}", id);
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$inc": { "consumed_sessions": 1, "version": 1 } },
            )
            .session(&mut *session)
            .await?;
        if result.matched_count == 0 {
            return Err(eyre::eyre!("Block not found: {}", id));
        }
        Ok(())
    }

    pub async fn refund(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        info!("Refunding block: {}", id);
        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "consumed_sessions": { "$gt": 0 } },
                doc! { "$inc": { "consumed_sessions": -1, "version": 1 } },
            )
            .session(&mut *session)
            .await?;
        if result.matched_count == 0 {
            return Err(eyre::eyre!("Nothing to refund on block: {}", id));
        }
        Ok(())
    }

    pub async fn set_active(
        &self,
        session: &mut Session,
        id: ObjectId,
        is_active: bool,
    ) -> Result<(), Error> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "is_active": is_active }, "$inc": { "version": 1 } },
            )
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn update(&self, session: &mut Session, block: &mut Block) -> Result<(), Error> {
        block.version += 1;
        info!("Updating block: {:?}", block);
        self.collection
            .replace_one(doc! { "_id": block.id }, &*block)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        info!("Deleting block: {}", id);
        self.collection
            .delete_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;
        Ok(())
    }
}
