use bson::oid::ObjectId;
use eyre::Error;
use model::{
    rights::Rights,
    session::Session,
    user::{User, UserName},
};
use storage::user::UserStore;
use thiserror::Error;
use tx_macro::tx;

use super::history::History;

#[derive(Clone)]
pub struct Users {
    store: UserStore,
    logs: History,
}

impl Users {
    pub(crate) fn new(store: UserStore, logs: History) -> Self {
        Users { store, logs }
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<User>, Error> {
        self.store.get(session, id).await
    }

    pub async fn get_by_chat_id(
        &self,
        session: &mut Session,
        chat_id: i64,
    ) -> Result<Option<User>, Error> {
        self.store.get_by_chat_id(session, chat_id).await
    }

    /// Active clients only; the trainer account is excluded from sweeps
    /// and reminders.
    pub async fn active_clients(&self, session: &mut Session) -> Result<Vec<User>, Error> {
        let users = self.store.find_active(session).await?;
        Ok(users.into_iter().filter(|u| !u.rights.is_full()).collect())
    }

    #[tx]
    pub async fn create(
        &self,
        session: &mut Session,
        chat_id: i64,
        name: UserName,
        phone: Option<String>,
    ) -> Result<User, CreateUserError> {
        if self.store.get_by_chat_id(session, chat_id).await?.is_some() {
            return Err(CreateUserError::AlreadyExists);
        }
        // the first registered account becomes the trainer
        let is_first_user = self.store.count(session).await? == 0;
        let rights = if is_first_user {
            Rights::full()
        } else {
            Rights::client()
        };

        let user = User::new(chat_id, name.clone(), phone, rights);
        self.store.insert(session, &user).await?;
        self.logs
            .create_user(session, chat_id, name.to_string())
            .await?;
        Ok(user)
    }

    #[tx]
    pub async fn set_active(
        &self,
        session: &mut Session,
        id: ObjectId,
        is_active: bool,
    ) -> Result<(), Error> {
        self.store.set_active(session, id, is_active).await?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum CreateUserError {
    #[error("User with this chat id already exists")]
    AlreadyExists,
    #[error(transparent)]
    Common(#[from] Error),
}
