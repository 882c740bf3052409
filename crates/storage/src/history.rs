use std::sync::Arc;

use bson::doc;
use eyre::Error;
use model::{history::HistoryRow, session::Session};
use mongodb::{Collection, IndexModel};

use crate::session::Db;

const COLLECTION: &str = "history";

#[derive(Clone)]
pub struct HistoryStore {
    collection: Arc<Collection<HistoryRow>>,
}

impl HistoryStore {
    pub(crate) async fn new(db: &Db) -> Result<Self, Error> {
        let collection = db.collection(COLLECTION);
        collection
            .create_index(IndexModel::builder().keys(doc! { "date_time": -1 }).build())
            .await?;
        Ok(HistoryStore {
            collection: Arc::new(collection),
        })
    }

    pub async fn store(&self, session: &mut Session, entry: HistoryRow) -> Result<(), Error> {
        self.collection
            .insert_one(entry)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn get_logs(
        &self,
        session: &mut Session,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<HistoryRow>, Error> {
        let mut cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "date_time": -1 })
            .skip(offset as u64)
            .session(&mut *session)
            .await?;
        let mut logs = Vec::with_capacity(limit);
        while let Some(row) = cursor.next(&mut *session).await {
            logs.push(row?);
            if logs.len() >= limit {
                break;
            }
        }
        Ok(logs)
    }
}
