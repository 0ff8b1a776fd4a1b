use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A shop entry from the category listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopLink {
    pub name: String,
    pub url: String,
}

/// A leaflet block as it appears on a shop page, before its dates are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TentativeLeaflet {
    pub title: String,
    pub thumbnail: Option<String>,
    pub shop_name: String,
    pub date_text: String,
}

/// An active leaflet, as written to the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaflet {
    pub title: String,
    pub thumbnail: Option<String>,
    pub shop_name: String,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: NaiveDate,
    #[serde(with = "parsed_time_format")]
    pub parsed_time: NaiveDateTime,
}

mod parsed_time_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(de::Error::custom)
    }
}
