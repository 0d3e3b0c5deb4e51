//! `YYYY-MM-DD` (de)serialization for `time::Date` fields, matching how the
//! store persists date columns.

use time::{format_description::FormatItem, macros::format_description};

pub const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub mod iso {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::ISO_DATE;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let s = date.format(ISO_DATE).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, ISO_DATE).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        use super::super::ISO_DATE;

        pub fn serialize<S: Serializer>(
            date: &Option<Date>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => {
                    let s = d.format(ISO_DATE).map_err(serde::ser::Error::custom)?;
                    serializer.serialize_some(&s)
                }
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            let s: Option<String> = Option::deserialize(deserializer)?;
            match s {
                Some(s) if !s.is_empty() => Date::parse(&s, ISO_DATE)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                _ => Ok(None),
            }
        }
    }
}
