use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::DayId;

/// One client's nutrition log for one calendar day.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NutritionEntry {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub client: ObjectId,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub day: DateTime<Utc>,
    pub calories: u32,
    pub protein: u32,
    pub fat: u32,
    pub carbs: u32,
    pub comment: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl NutritionEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client: ObjectId,
        day: DayId,
        calories: u32,
        protein: u32,
        fat: u32,
        carbs: u32,
        comment: Option<String>,
    ) -> NutritionEntry {
        NutritionEntry {
            id: ObjectId::new(),
            client,
            day: day.id(),
            calories,
            protein,
            fat,
            carbs,
            comment,
            created_at: Utc::now(),
            version: 0,
        }
    }

    pub fn day_id(&self) -> DayId {
        DayId::from(self.day)
    }
}
