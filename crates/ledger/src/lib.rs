use std::sync::Arc;

use bson::oid::ObjectId;
use eyre::{eyre, Context as _, Result};
use model::{session::Session, user::User};
use service::attendance::Attendance;
use service::blocks::Blocks;
use service::calendar::Calendar;
use service::history::History;
use service::notifications::{Notifications, Notifier};
use service::nutrition::Nutrition;
use service::users::Users;
use storage::session::Db;
use storage::Storage;

pub mod service;

#[derive(Clone)]
pub struct Ledger {
    pub db: Db,
    pub users: Users,
    pub blocks: Blocks,
    pub calendar: Calendar,
    pub attendance: Attendance,
    pub nutrition: Nutrition,
    pub history: History,
    pub notifications: Notifications,
}

impl Ledger {
    pub fn new(
        storage: Storage,
        notifier: Arc<dyn Notifier>,
        admin_chat_id: Option<i64>,
    ) -> Self {
        let history = History::new(storage.history);
        let notifications = Notifications::new(notifier, admin_chat_id);
        let users = Users::new(storage.users.clone(), history.clone());
        let blocks = Blocks::new(
            storage.blocks.clone(),
            storage.trainings.clone(),
            storage.users.clone(),
            history.clone(),
        );
        let calendar = Calendar::new(
            storage.trainings.clone(),
            storage.programs,
            storage.users.clone(),
            history.clone(),
            notifications.clone(),
        );
        let attendance = Attendance::new(
            storage.trainings,
            storage.blocks,
            storage.users,
            history.clone(),
            notifications.clone(),
        );
        let nutrition = Nutrition::new(storage.nutrition, history.clone());
        Ledger {
            db: storage.db,
            users,
            blocks,
            calendar,
            attendance,
            nutrition,
            history,
            notifications,
        }
    }

    pub async fn get_user(&self, session: &mut Session, id: ObjectId) -> Result<User> {
        self.users
            .get(session, id)
            .await
            .context("get_user")?
            .ok_or_else(|| eyre!("User not found:{:?}", id))
    }
}
