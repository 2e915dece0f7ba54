use std::collections::{BTreeMap, HashMap, HashSet};

use crate::types::{
    AggregateView, DateTotal, FilterOptions, FilterSelection, RegionTotal, UsageRecord,
};

/// Group-and-sum that remembers the order keys were first seen.
#[derive(Default)]
struct OrderedSums {
    index: HashMap<String, usize>,
    sums: Vec<(String, f64)>,
}

impl OrderedSums {
    fn add(&mut self, key: &str, value: f64) {
        match self.index.get(key) {
            Some(&i) => self.sums[i].1 += value,
            None => {
                self.index.insert(key.to_string(), self.sums.len());
                self.sums.push((key.to_string(), value));
            }
        }
    }
}

/// Derive the filtered rows and all totals for one selection.
///
/// Pure: call again whenever the records or the selection change.
pub fn aggregate<'a>(records: &'a [UsageRecord], selection: &FilterSelection) -> AggregateView<'a> {
    let filtered: Vec<&UsageRecord> = records.iter().filter(|r| selection.matches(r)).collect();

    let mut total = 0.0;
    let mut regions = OrderedSums::default();
    let mut dates: BTreeMap<&str, f64> = BTreeMap::new();
    let mut usage_types: HashSet<Option<&str>> = HashSet::new();

    for r in &filtered {
        let cost = r.cost.or_zero();
        total += cost;
        regions.add(&r.region, cost);
        *dates.entry(r.date.as_str()).or_insert(0.0) += cost;
        usage_types.insert(r.usage_type.as_deref());
    }

    AggregateView {
        filtered,
        total,
        region_totals: regions
            .sums
            .into_iter()
            .map(|(region, cost)| RegionTotal { region, cost })
            .collect(),
        date_totals: dates
            .into_iter()
            .map(|(date, cost)| DateTotal {
                date: date.to_string(),
                cost,
            })
            .collect(),
        usage_types: usage_types.len(),
    }
}

/// Services and regions present in the full collection, in first-seen order.
pub fn filter_options(records: &[UsageRecord]) -> FilterOptions {
    let mut seen_services = HashSet::new();
    let mut seen_regions = HashSet::new();
    let mut options = FilterOptions::default();

    for r in records {
        if seen_services.insert(r.service.as_str()) {
            options.services.push(r.service.clone());
        }
        if seen_regions.insert(r.region.as_str()) {
            options.regions.push(r.region.clone());
        }
    }

    options
}
