use std::sync::Arc;

use bson::{doc, oid::ObjectId};
use eyre::Error;
use log::info;
use model::{ids::DayId, nutrition::NutritionEntry, session::Session};
use mongodb::{options::IndexOptions, Collection, IndexModel};

use crate::session::Db;

const COLLECTION: &str = "nutrition";

#[derive(Clone)]
pub struct NutritionStore {
    collection: Arc<Collection<NutritionEntry>>,
}

impl NutritionStore {
    pub(crate) async fn new(db: &Db) -> Result<Self, Error> {
        let collection = db.collection(COLLECTION);
        // one entry per client per day
        collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "client": 1, "day": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;
        Ok(NutritionStore {
            collection: Arc::new(collection),
        })
    }

    pub async fn insert(
        &self,
        session: &mut Session,
        entry: &NutritionEntry,
    ) -> Result<(), Error> {
        info!("Inserting nutrition entry: {:?}", entry);
        self.collection
            .insert_one(entry)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn find_by_day(
        &self,
        session: &mut Session,
        client: ObjectId,
        day: DayId,
    ) -> Result<Option<NutritionEntry>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "client": client, "day": day.id() })
            .session(&mut *session)
            .await?)
    }

    pub async fn find_range(
        &self,
        session: &mut Session,
        client: ObjectId,
        from: DayId,
        to: DayId,
    ) -> Result<Vec<NutritionEntry>, Error> {
        let mut cursor = self
            .collection
            .find(doc! {
                "client": client,
                "day": { "$gte": from.id(), "$lt": to.id() },
            })
            .sort(doc! { "day": 1 })
            .session(&mut *session)
            .await?;
        let mut entries = Vec::new();
        while let Some(entry) = cursor.next(&mut *session).await {
            entries.push(entry?);
        }
        Ok(entries)
    }

    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        info!("Deleting nutrition entry: {}", id);
        self.collection
            .delete_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;
        Ok(())
    }
}
