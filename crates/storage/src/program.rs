use std::sync::Arc;

use bson::{doc, oid::ObjectId};
use eyre::Error;
use log::info;
use model::{program::Program, session::Session};
use mongodb::{Collection, IndexModel};

use crate::session::Db;

const COLLECTION: &str = "programs";

#[derive(Clone)]
pub struct ProgramStore {
    collection: Arc<Collection<Program>>,
}

impl ProgramStore {
    pub(crate) async fn new(db: &Db) -> Result<Self, Error> {
        let collection = db.collection(COLLECTION);
        collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "client": 1, "sequence_number": 1 })
                    .build(),
            )
            .await?;
        Ok(ProgramStore {
            collection: Arc::new(collection),
        })
    }

    pub async fn insert(&self, session: &mut Session, program: &Program) -> Result<(), Error> {
        info!("Inserting program: {:?}", program);
        self.collection
            .insert_one(program)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn get(
        &self,
        session: &mut Session,
        id: ObjectId,
    ) -> Result<Option<Program>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    /// Active rotation of a client, ordered the way `next_program`
    /// expects it.
    pub async fn find_active(
        &self,
        session: &mut Session,
        client: ObjectId,
    ) -> Result<Vec<Program>, Error> {
        let mut cursor = self
            .collection
            .find(doc! { "client": client, "is_active": true })
            .sort(doc! { "sequence_number": 1 })
            .session(&mut *session)
            .await?;
        let mut programs = Vec::new();
        while let Some(program) = cursor.next(&mut *session).await {
            programs.push(program?);
        }
        Ok(programs)
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

    pub async fn update(
        &self,
        session: &mut Session,
        program: &mut Program,
    ) -> Result<(), Error> {
        program.version += 1;
        info!("Updating program: {:?}", program);
        self.collection
            .replace_one(doc! { "_id": program.id }, &*program)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        info!("Deleting program: {}", id);
        self.collection
            .delete_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;
        Ok(())
    }
}
