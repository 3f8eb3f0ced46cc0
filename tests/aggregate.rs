mod common;

use common::person;
use roster_tally::aggregate::{recompute, stats_header};
use roster_tally::config::CategorySpec;
use roster_tally::model::Record;

fn regions(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|label| label.to_string()).collect()
}

#[test]
fn counts_single_record_in_its_region_only() {
    let records = vec![
        Record::new("A")
            .with_field("x", "cat1")
            .with_field("region", "north"),
    ];
    let categories = vec![CategorySpec::new("x", "cat1").with_label("C1")];

    let stats = recompute(&records, &regions(&["north", "south"]), &categories);

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].region, "north");
    assert_eq!(stats[0].count("C1"), Some(1));
    assert_eq!(stats[0].total, 1);
    assert_eq!(stats[1].region, "south");
    assert_eq!(stats[1].count("C1"), Some(0));
    assert_eq!(stats[1].total, 0);
}

#[test]
fn delimited_tags_match_every_category_they_contain() {
    let records = vec![
        person("1", "Ann", "north district", "veteran;volunteer"),
        person("2", "Ben", "north", "volunteer"),
        person("3", "Cid", "south", "veteran"),
        person("4", "Dee", "", "veteran"),
    ];
    let categories = vec![
        CategorySpec::new("tags", "veteran"),
        CategorySpec::new("tags", "volunteer").with_label("Volunteers"),
    ];

    let stats = recompute(&records, &regions(&["north", "south"]), &categories);

    assert_eq!(stats[0].count("veteran"), Some(1));
    assert_eq!(stats[0].count("Volunteers"), Some(2));
    assert_eq!(stats[0].count("volunteer"), None);
    assert_eq!(stats[0].total, 3);
    assert_eq!(stats[1].count("veteran"), Some(1));
    assert_eq!(stats[1].total, 1);
    for stat in &stats {
        let sum: u64 = stat.counts.iter().map(|entry| entry.count).sum();
        assert_eq!(stat.total, sum);
    }
}

#[test]
fn numeric_values_match_by_their_text_form() {
    let records = vec![
        Record::new("n")
            .with_field("level", 3.0)
            .with_field("region", "south"),
    ];
    let categories = vec![CategorySpec::new("level", "3")];

    let stats = recompute(&records, &regions(&["south"]), &categories);

    assert_eq!(stats[0].count("3"), Some(1));
}

#[test]
fn record_order_does_not_change_counts() {
    let mut records = vec![
        person("1", "Ann", "north", "veteran"),
        person("2", "Ben", "south", "volunteer"),
        person("3", "Cid", "north", "veteran volunteer"),
        person("4", "Dee", "south", "veteran"),
        person("5", "Eve", "north", ""),
    ];
    let categories = vec![
        CategorySpec::new("tags", "veteran"),
        CategorySpec::new("tags", "volunteer"),
    ];
    let region_list = regions(&["north", "south", "east"]);

    let forward = recompute(&records, &region_list, &categories);
    records.reverse();
    records.swap(0, 2);
    let shuffled = recompute(&records, &region_list, &categories);

    assert_eq!(forward, shuffled);
    assert_eq!(forward[2].total, 0);
}

#[test]
fn empty_inputs_yield_zeroed_regions() {
    let categories = vec![CategorySpec::new("tags", "veteran")];

    let stats = recompute(&[], &regions(&["north"]), &categories);
    assert_eq!(stats[0].count("veteran"), Some(0));
    assert_eq!(stats[0].total, 0);

    assert!(recompute(&[person("1", "Ann", "north", "")], &[], &categories).is_empty());
}

#[test]
fn header_lists_region_categories_and_total() {
    let categories = vec![
        CategorySpec::new("tags", "veteran"),
        CategorySpec::new("tags", "volunteer").with_label("Volunteers"),
    ];

    assert_eq!(
        stats_header(&categories),
        vec!["region", "veteran", "Volunteers", "total"]
    );
}
