pub mod block;
pub mod history;
pub mod nutrition;
pub mod program;
pub mod session;
pub mod training;
pub mod user;

use eyre::Result;
use session::Db;

const DB_NAME: &str = "coach_db";

#[derive(Clone)]
pub struct Storage {
    pub db: Db,
    pub users: user::UserStore,
    pub blocks: block::BlockStore,
    pub trainings: training::TrainingStore,
    pub programs: program::ProgramStore,
    pub nutrition: nutrition::NutritionStore,
    pub history: history::HistoryStore,
}

impl Storage {
    pub async fn new(uri: &str) -> Result<Self> {
        let db = Db::new(uri, DB_NAME).await?;
        let users = user::UserStore::new(&db).await?;
        let blocks = block::BlockStore::new(&db).await?;
        let trainings = training::TrainingStore::new(&db).await?;
        let programs = program::ProgramStore::new(&db).await?;
        let nutrition = nutrition::NutritionStore::new(&db).await?;
        let history = history::HistoryStore::new(&db).await?;

        Ok(Storage {
            db,
            users,
            blocks,
            trainings,
            programs,
            nutrition,
            history,
        })
    }
}
