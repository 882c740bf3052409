use std::sync::Arc;

use bson::{doc, oid::ObjectId};
use eyre::Error;
use log::info;
use model::{session::Session, user::User};
use mongodb::{options::IndexOptions, Collection, IndexModel};

use crate::session::Db;

const COLLECTION: &str = "users";

#[derive(Clone)]
pub struct UserStore {
    collection: Arc<Collection<User>>,
}

impl UserStore {
    pub(crate) async fn new(db: &Db) -> Result<Self, Error> {
        let collection = db.collection(COLLECTION);
        collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "chat_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;
        Ok(UserStore {
            collection: Arc::new(collection),
        })
    }

    pub async fn insert(&self, session: &mut Session, user: &User) -> Result<(), Error> {
        info!("Inserting user: {:?}", user);
        self.collection
            .insert_one(user)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<User>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    pub async fn get_by_chat_id(
        &self,
        session: &mut Session,
        chat_id: i64,
    ) -> Result<Option<User>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "chat_id": chat_id })
            .session(&mut *session)
            .await?)
    }

    pub async fn find_active(&self, session: &mut Session) -> Result<Vec<User>, Error> {
        let mut cursor = self
            .collection
            .find(doc! { "is_active": true })
            .session(&mut *session)
            .await?;
        let mut users = Vec::new();
        while let Some(user) = cursor.next(&mut *session).await {
            users.push(user?);
        }
        Ok(users)
    }

    pub async fn set_active(
        &self,
        session: &mut Session,
        id: ObjectId,
        is_active: bool,
    ) -> Result<(), Error> {
        info!("Set user {} active: {}", id, is_active);
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "is_active": is_active }, "$inc": { "version": 1 } },
            )
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn count(&self, session: &mut Session) -> Result<u64, Error> {
        Ok(self
            .collection
            .count_documents(doc! {})
            .session(&mut *session)
            .await?)
    }
}
