//! Built-in example stories, compiled into the binary.

use log::warn;

use crate::schema::template::TemplateRecord;

mod data {
    pub const SPACE_ADVENTURE: &str = include_str!("../seed_data/space_adventure.json");
    pub const FAIRY_TALE: &str = include_str!("../seed_data/fairy_tale.json");
    pub const COOKING_DISASTER: &str = include_str!("../seed_data/cooking_disaster.json");
    pub const SUPERHERO_ORIGIN: &str = include_str!("../seed_data/superhero_origin.json");
    pub const VACATION_DISASTER: &str = include_str!("../seed_data/vacation_disaster.json");
    pub const HAUNTED_HOUSE: &str = include_str!("../seed_data/haunted_house.json");
    pub const JOB_INTERVIEW: &str = include_str!("../seed_data/job_interview.json");
    pub const ALIEN_ENCOUNTER: &str = include_str!("../seed_data/alien_encounter.json");
    pub const FIRST_DATE: &str = include_str!("../seed_data/first_date.json");
    pub const SPORTS_COMMENTARY: &str = include_str!("../seed_data/sports_commentary.json");
    pub const WEATHER_REPORT: &str = include_str!("../seed_data/weather_report.json");
    pub const VIDEO_GAME: &str = include_str!("../seed_data/video_game.json");
    pub const RESTAURANT_REVIEW: &str = include_str!("../seed_data/restaurant_review.json");
    pub const LOVE_LETTER: &str = include_str!("../seed_data/love_letter.json");
    pub const TECH_SUPPORT: &str = include_str!("../seed_data/tech_support.json");
}

/// Catalog ids paired with their embedded JSON, in display order.
const CATALOG: &[(&str, &str)] = &[
    ("space_adventure", data::SPACE_ADVENTURE),
    ("fairy_tale", data::FAIRY_TALE),
    ("cooking_disaster", data::COOKING_DISASTER),
    ("superhero_origin", data::SUPERHERO_ORIGIN),
    ("vacation_disaster", data::VACATION_DISASTER),
    ("haunted_house", data::HAUNTED_HOUSE),
    ("job_interview", data::JOB_INTERVIEW),
    ("alien_encounter", data::ALIEN_ENCOUNTER),
    ("first_date", data::FIRST_DATE),
    ("sports_commentary", data::SPORTS_COMMENTARY),
    ("weather_report", data::WEATHER_REPORT),
    ("video_game", data::VIDEO_GAME),
    ("restaurant_review", data::RESTAURANT_REVIEW),
    ("love_letter", data::LOVE_LETTER),
    ("tech_support", data::TECH_SUPPORT),
];

/// Number of characters shown when previewing an example.
pub const PREVIEW_CHARS: usize = 150;

/// Catalog ids in display order.
pub fn ids() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(id, _)| *id)
}

/// `space_adventure` -> `Space Adventure`.
pub fn display_name(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Load one example by id.
pub fn load(id: &str) -> Option<Result<TemplateRecord, serde_json::Error>> {
    CATALOG
        .iter()
        .find(|(candidate, _)| *candidate == id)
        .map(|(_, json)| serde_json::from_str(json))
}

/// Every example that parses, in catalog order.
pub fn all() -> Vec<TemplateRecord> {
    CATALOG
        .iter()
        .filter_map(|(id, json)| match serde_json::from_str(json) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("skipping example '{}': {}", id, e);
                None
            }
        })
        .collect()
}
