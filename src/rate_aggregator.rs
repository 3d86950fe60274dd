use std::hash::Hash;

use indexmap::IndexMap;

/// Summary of one group: the mean of each indicator plus the group size.
#[derive(Debug, Clone, PartialEq)]
pub struct RateGroup<'a, K, const N: usize> {
    pub key: K,
    /// First non-missing label seen for the group, if a label was requested.
    pub label: Option<&'a str>,
    pub rates: [f64; N],
    pub sample_size: usize,
}

#[derive(Debug)]
struct Tally<'a, const N: usize> {
    hits: [usize; N],
    count: usize,
    label: Option<&'a str>,
}

impl<const N: usize> Tally<'_, N> {
    fn new() -> Self {
        Self {
            hits: [0; N],
            count: 0,
            label: None,
        }
    }
}

/// Groups `records` by `key` and averages each indicator per group.
///
/// Records whose key is `None` are skipped, so a missing key component never
/// forms a group. Groups smaller than `min_samples` are dropped. Output order
/// is the order in which each key was first seen.
pub fn aggregate_rates<'a, R, K, const N: usize>(
    records: impl IntoIterator<Item = &'a R>,
    key: impl Fn(&'a R) -> Option<K>,
    indicators: impl Fn(&'a R) -> [bool; N],
    min_samples: usize,
) -> Vec<RateGroup<'a, K, N>>
where
    R: 'a,
    K: Eq + Hash,
{
    aggregate_labelled_rates(records, key, |_| None, indicators, min_samples)
}

/// Same as [`aggregate_rates`], additionally keeping the first non-missing
/// `label` of each group.
pub fn aggregate_labelled_rates<'a, R, K, const N: usize>(
    records: impl IntoIterator<Item = &'a R>,
    key: impl Fn(&'a R) -> Option<K>,
    label: impl Fn(&'a R) -> Option<&'a str>,
    indicators: impl Fn(&'a R) -> [bool; N],
    min_samples: usize,
) -> Vec<RateGroup<'a, K, N>>
where
    R: 'a,
    K: Eq + Hash,
{
    let mut groups: IndexMap<K, Tally<'a, N>> = IndexMap::new();

    for record in records {
        let Some(group_key) = key(record) else {
            continue;
        };
        let flags = indicators(record);
        let tally = groups.entry(group_key).or_insert_with(Tally::new);
        tally.count += 1;
        for (hits, flag) in tally.hits.iter_mut().zip(flags) {
            if flag {
                *hits += 1;
            }
        }
        if tally.label.is_none() {
            tally.label = label(record);
        }
    }

    groups
        .into_iter()
        .filter(|(_, tally)| tally.count >= min_samples)
        .map(|(key, tally)| {
            let n = tally.count as f64;
            RateGroup {
                key,
                label: tally.label,
                rates: tally.hits.map(|hits| hits as f64 / n),
                sample_size: tally.count,
            }
        })
        .collect()
}
