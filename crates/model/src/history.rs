use bson::oid::ObjectId;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::{decimal::Decimal, rights::Actor, training::TrainingStatus};

#[derive(Serialize, Deserialize, Debug)]
pub struct HistoryRow {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub actor: Actor,
    pub sub_actors: Vec<ObjectId>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date_time: DateTime<Utc>,
    pub action: Action,
}

impl HistoryRow {
    pub fn new(actor: Actor, action: Action) -> Self {
        HistoryRow {
            id: ObjectId::new(),
            actor,
            sub_actors: vec![],
            date_time: Local::now().with_timezone(&Utc),
            action,
        }
    }

    pub fn with_sub_actors(actor: Actor, sub_actors: Vec<ObjectId>, action: Action) -> Self {
        HistoryRow {
            id: ObjectId::new(),
            actor,
            sub_actors,
            date_time: Local::now().with_timezone(&Utc),
            action,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub enum Action {
    CreateUser {
        chat_id: i64,
        name: String,
    },
    CreateBlock {
        block: ObjectId,
        client: ObjectId,
        total_sessions: u32,
        price_per_block: Decimal,
    },
    EditBlock {
        block: ObjectId,
    },
    DeleteBlock {
        block: ObjectId,
    },
    ScheduleTraining {
        training: ObjectId,
        client: ObjectId,
        start_at: DateTime<Utc>,
    },
    CancelTraining {
        training: ObjectId,
        client: ObjectId,
    },
    MarkAttendance {
        training: ObjectId,
        attended: bool,
    },
    ChangeStatus {
        training: ObjectId,
        status: TrainingStatus,
    },
    ReverseDebit {
        training: ObjectId,
        block: ObjectId,
    },
    BlockExhausted {
        block: ObjectId,
        client: ObjectId,
    },
    LogNutrition {
        client: ObjectId,
        day: DateTime<Utc>,
    },
}
