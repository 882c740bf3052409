use std::sync::Arc;

use bson::{doc, oid::ObjectId};
use eyre::Error;
use log::info;
use model::{ids::DayId, session::Session, training::Training};
use mongodb::{Collection, IndexModel};

use crate::session::Db;

const COLLECTION: &str = "trainings";

#[derive(Clone)]
pub struct TrainingStore {
    collection: Arc<Collection<Training>>,
}

impl TrainingStore {
    pub(crate) async fn new(db: &Db) -> Result<Self, Error> {
        let collection = db.collection(COLLECTION);
        collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "client": 1, "day": 1, "hour": 1 })
                    .build(),
            )
            .await?;
        collection
            .create_index(IndexModel::builder().keys(doc! { "block": 1 }).build())
            .await?;
        Ok(TrainingStore {
            collection: Arc::new(collection),
        })
    }

    pub async fn insert(&self, session: &mut Session, training: &Training) -> Result<(), Error> {
        info!("Inserting training: {:?}", training);
        self.collection
            .insert_one(training)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn get(
        &self,
        session: &mut Session,
        id: ObjectId,
    ) -> Result<Option<Training>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    pub async fn find_by_client(
        &self,
        session: &mut Session,
        client: ObjectId,
    ) -> Result<Vec<Training>, Error> {
        let mut cursor = self
            .collection
            .find(doc! { "client": client })
            .sort(doc! { "day": 1, "hour": 1 })
            .session(&mut *session)
            .await?;
        let mut trainings = Vec::new();
        while let Some(training) = cursor.next(&mut *session).await {
            trainings.push(training?);
        }
        Ok(trainings)
    }

    pub async fn find_by_day(
        &self,
        session: &mut Session,
        day: DayId,
    ) -> Result<Vec<Training>, Error> {
        let mut cursor = self
            .collection
            .find(doc! { "day": day.id() })
            .sort(doc! { "hour": 1 })
            .session(&mut *session)
            .await?;
        let mut trainings = Vec::new();
        while let Some(training) = cursor.next(&mut *session).await {
            trainings.push(training?);
        }
        Ok(trainings)
    }

    /// The rotation anchor: the client's most recent training that
    /// carried a program.
    pub async fn find_last_with_program(
        &self,
        session: &mut Session,
        client: ObjectId,
    ) -> Result<Option<Training>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "client": client, "program": { "$ne": null } })
            .sort(doc! { "day": -1, "hour": -1 })
            .session(&mut *session)
            .await?)
    }

    pub async fn references_block(
        &self,
        session: &mut Session,
        block: ObjectId,
    ) -> Result<bool, Error> {
        Ok(self
            .collection
            .find_one(doc! { "block": block })
            .session(&mut *session)
            .await?
            .is_some())
    }

    pub async fn update(
        &self,
        session: &mut Session,
        training: &mut Training,
    ) -> Result<(), Error> {
        training.version += 1;
        info!("Updating training: {:?}", training);
        self.collection
            .replace_one(doc! { "_id": training.id }, &*training)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        info!("Deleting training: {}", id);
        self.collection
            .delete_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;
        Ok(())
    }
}
