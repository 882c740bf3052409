use std::sync::Arc;

use async_trait::async_trait;
use eyre::Error;
use ledger::{service::notifications::Purpose, Ledger};
use model::{ids::DayId, rights::Actor};

use crate::Task;

/// Once-daily sweep: remind every active client who has not logged
/// nutrition for the current day. Read-and-send only; it never mutates
/// accounting state.
#[derive(Clone)]
pub struct NutritionReminderBg {
    ledger: Arc<Ledger>,
}

#[async_trait]
impl Task for NutritionReminderBg {
    const NAME: &'static str = "nutrition_reminder";
    const CRON: &'static str = "every day at 8:00 pm";

    async fn process(&mut self) -> Result<(), Error> {
        let mut session = self.ledger.db.start_session(Actor::System).await?;
        let today = DayId::default();

        let clients = self.ledger.users.active_clients(&mut session).await?;
        for client in clients {
            if self
                .ledger
                .nutrition
                .has_entry_for(&mut session, client.id, today)
                .await?
            {
                continue;
            }
            self.ledger
                .notifications
                .notify(
                    Purpose::NutritionReminder,
                    client.chat_id,
                    "You have not logged your nutrition today",
                    &[],
                )
                .await;
        }
        Ok(())
    }
}

impl NutritionReminderBg {
    pub fn new(ledger: Arc<Ledger>) -> NutritionReminderBg {
        NutritionReminderBg { ledger }
    }
}
