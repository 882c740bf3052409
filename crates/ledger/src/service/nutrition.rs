use bson::oid::ObjectId;
use eyre::Error;
use model::{ids::DayId, nutrition::NutritionEntry, session::Session};
use storage::nutrition::NutritionStore;
use thiserror::Error;
use tx_macro::tx;

use super::history::History;

#[derive(Clone)]
pub struct Nutrition {
    store: NutritionStore,
    logs: History,
}

impl Nutrition {
    pub(crate) fn new(store: NutritionStore, logs: History) -> Self {
        Nutrition { store, logs }
    }

    /// One entry per client per day; a second write for the same day is
    /// rejected rather than merged.
    #[tx]
    #[allow(clippy::too_many_arguments)]
    pub async fn log_entry(
        &self,
        session: &mut Session,
        client: ObjectId,
        day: DayId,
        calories: u32,
        protein: u32,
        fat: u32,
        carbs: u32,
        comment: Option<String>,
    ) -> Result<NutritionEntry, LogNutritionError> {
        if self.store.find_by_day(session, client, day).await?.is_some() {
            return Err(LogNutritionError::AlreadyLogged);
        }
        let entry = NutritionEntry::new(client, day, calories, protein, fat, carbs, comment);
        self.store.insert(session, &entry).await?;
        self.logs.log_nutrition(session, client, day.id()).await?;
        Ok(entry)
    }

    pub async fn has_entry_for(
        &self,
        session: &mut Session,
        client: ObjectId,
        day: DayId,
    ) -> Result<bool, Error> {
        Ok(self.store.find_by_day(session, client, day).await?.is_some())
    }

    pub async fn entries_for(
        &self,
        session: &mut Session,
        client: ObjectId,
        from: DayId,
        to: DayId,
    ) -> Result<Vec<NutritionEntry>, Error> {
        self.store.find_range(session, client, from, to).await
    }
}

#[derive(Error, Debug)]
pub enum LogNutritionError {
    #[error("Nutrition already logged for this day")]
    AlreadyLogged,
    #[error(transparent)]
    Common(#[from] Error),
}
