use tracing::{debug, instrument};

use crate::roster::tally::config::CategorySpec;
use crate::roster::tally::model::{CategoryCount, REGION_ROLE, Record, RegionStat};

/// Label of the first column of the summary table.
pub const REGION_COLUMN: &str = "region";
/// Label of the last column of the summary table.
pub const TOTAL_COLUMN: &str = "total";

/// Rebuilds the per-region summary from scratch.
///
/// A record counts towards a category of a region when its `category.role`
/// value contains `category.name` and its region value contains the region
/// label. Matching is by substring so a single field may carry several
/// delimited tags.
#[instrument(
    level = "debug",
    skip_all,
    fields(
        record_count = records.len(),
        region_count = regions.len(),
        category_count = categories.len()
    )
)]
pub fn recompute(
    records: &[Record],
    regions: &[String],
    categories: &[CategorySpec],
) -> Vec<RegionStat> {
    let stats: Vec<RegionStat> = regions
        .iter()
        .map(|region| region_stat(records, region, categories))
        .collect();
    debug!(
        total = stats.iter().map(|stat| stat.total).sum::<u64>(),
        "summary recomputed"
    );
    stats
}

fn region_stat(records: &[Record], region: &str, categories: &[CategorySpec]) -> RegionStat {
    let in_region: Vec<&Record> = records
        .iter()
        .filter(|record| record.value(REGION_ROLE).contains(region))
        .collect();

    let counts: Vec<CategoryCount> = categories
        .iter()
        .map(|category| CategoryCount {
            label: category.display_label().to_string(),
            count: in_region
                .iter()
                .filter(|record| record.value(&category.role).contains(&category.name))
                .count() as u64,
        })
        .collect();
    let total = counts.iter().map(|entry| entry.count).sum();

    RegionStat {
        region: region.to_string(),
        counts,
        total,
    }
}

/// Column labels of the summary table: region, each category, total.
pub fn stats_header(categories: &[CategorySpec]) -> Vec<String> {
    let mut header = Vec::with_capacity(categories.len() + 2);
    header.push(REGION_COLUMN.to_string());
    header.extend(
        categories
            .iter()
            .map(|category| category.display_label().to_string()),
    );
    header.push(TOTAL_COLUMN.to_string());
    header
}
