use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Accepted values for `day_operational`
pub const OPERATIONAL_DAYS: [&str; 7] = ["senin", "selasa", "rabu", "kamis", "jum'at", "sabtu", "minggu"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Operational {
    pub id: i64,
    pub groceries_id: String,
    pub day_operational: Vec<String>,
    #[serde(with = "clock")]
    pub open: NaiveTime,
    #[serde(with = "clock")]
    pub close: NaiveTime,
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewOperational {
    pub day_operational: Vec<String>,
    #[serde(with = "clock")]
    pub open: NaiveTime,
    #[serde(with = "clock")]
    pub close: NaiveTime,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// `active` is only written when present in the body
#[derive(Debug, Default, Deserialize)]
pub struct OperationalPatch {
    pub day_operational: Option<Vec<String>>,
    #[serde(default, deserialize_with = "clock::optional")]
    pub open: Option<NaiveTime>,
    #[serde(default, deserialize_with = "clock::optional")]
    pub close: Option<NaiveTime>,
    pub active: Option<bool>,
}

fn default_active() -> bool {
    true
}

/// Opening hours travel as "HH:MM" (seconds accepted on input)
mod clock {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw, "%H:%M:%S").or_else(|_| NaiveTime::parse_from_str(raw, FORMAT))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|_| D::Error::custom(format!("invalid time '{}', expected HH:MM", raw)))
    }

    pub fn optional<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid time '{}', expected HH:MM", raw))),
            None => Ok(None),
        }
    }
}
