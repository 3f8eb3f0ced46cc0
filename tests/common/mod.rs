#![allow(dead_code)]

use roster_tally::config::AppConfig;
use roster_tally::model::Record;

pub const CONFIG_JSON: &str = r#"{
    "itemColumns": [
        {"role": "identity", "name": "ID", "xlsxWidth": 18.0, "fixed": true},
        {"role": "name", "name": "Full Name", "sortable": true},
        {"role": "region", "name": "Region", "sortable": true},
        {"role": "tags", "name": "Tags"}
    ],
    "statsColumns": [
        {"role": "tags", "name": "veteran"},
        {"role": "tags", "name": "volunteer", "label": "Volunteers"}
    ],
    "regions": ["north", "south"],
    "itemXlsxHeight": 24.0,
    "sheetName": "People"
}"#;

pub fn config() -> AppConfig {
    AppConfig::from_json(CONFIG_JSON).expect("test configuration parsed")
}

pub fn person(id: &str, name: &str, region: &str, tags: &str) -> Record {
    Record::new(id)
        .with_field("identity", id)
        .with_field("name", name)
        .with_field("region", region)
        .with_field("tags", tags)
}

pub fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

pub fn ids(records: &[Record]) -> Vec<&str> {
    records.iter().map(|record| record.id.as_str()).collect()
}
