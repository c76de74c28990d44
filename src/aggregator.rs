use std::collections::BTreeMap;

use crate::types::{Classification, OrgSummary};

/// Per-organization tallies for one run.
#[derive(Debug, Default, Clone)]
pub struct OrgAggregator {
    orgs: BTreeMap<u64, OrgSummary>,
}

impl OrgAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one qualifying ticket. The first name seen for an org is kept.
    pub fn record_ticket(&mut self, org_id: u64, org_name: &str, classification: Classification) {
        let summary = self
            .orgs
            .entry(org_id)
            .or_insert_with(|| OrgSummary::new(org_name));
        if classification.is_k8s() {
            summary.k8s_count += 1;
        } else {
            summary.non_k8s_count += 1;
        }
    }

    pub fn get(&self, org_id: u64) -> Option<&OrgSummary> {
        self.orgs.get(&org_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u64, &OrgSummary)> {
        self.orgs.iter()
    }

    pub fn org_count(&self) -> usize {
        self.orgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orgs.is_empty()
    }

    pub fn orgs_with_k8s(&self) -> usize {
        orgs_with_k8s(self.orgs.values())
    }

    pub fn total_k8s(&self) -> u32 {
        self.orgs.values().map(|s| s.k8s_count).sum()
    }

    pub fn total_non_k8s(&self) -> u32 {
        self.orgs.values().map(|s| s.non_k8s_count).sum()
    }

    pub fn summaries(&self) -> Vec<OrgSummary> {
        self.orgs.values().cloned().collect()
    }

    pub fn into_summaries(self) -> Vec<OrgSummary> {
        self.orgs.into_values().collect()
    }
}

pub fn orgs_with_k8s<'a, I>(items: I) -> usize
where
    I: IntoIterator<Item = &'a OrgSummary>,
{
    items.into_iter().filter(|s| s.k8s_count > 0).count()
}

/// Case-insensitive ascending by name; stable for equal names.
pub fn sort_by_name(items: &mut [OrgSummary]) {
    items.sort_by_cached_key(|s| s.org_name.to_uppercase());
}

/// Descending by k8s count; stable for equal counts.
pub fn sort_by_k8s_count(items: &mut [OrgSummary]) {
    items.sort_by(|a, b| b.k8s_count.cmp(&a.k8s_count));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, k8s: u32, non_k8s: u32) -> OrgSummary {
        OrgSummary {
            org_name: name.to_string(),
            k8s_count: k8s,
            non_k8s_count: non_k8s,
        }
    }

    #[test]
    fn test_record_ticket() {
        let mut agg = OrgAggregator::new();
        agg.record_ticket(1, "Acme", Classification::ManagedK8s);
        agg.record_ticket(1, "Acme", Classification::NotK8s);

        assert_eq!(agg.get(1), Some(&summary("Acme", 1, 1)));
        assert_eq!(agg.org_count(), 1);
    }

    #[test]
    fn test_keyword_counts_as_k8s() {
        let mut agg = OrgAggregator::new();
        agg.record_ticket(2, "Globex", Classification::KeywordK8s);
        agg.record_ticket(2, "Globex", Classification::KeywordK8s);
        assert_eq!(agg.get(2), Some(&summary("Globex", 2, 0)));
    }

    #[test]
    fn test_first_name_retained() {
        let mut agg = OrgAggregator::new();
        agg.record_ticket(3, "Initech", Classification::NotK8s);
        agg.record_ticket(3, "Initech Renamed", Classification::NotK8s);
        assert_eq!(agg.get(3).unwrap().org_name, "Initech");
    }

    #[test]
    fn test_totals() {
        let mut agg = OrgAggregator::new();
        assert!(agg.is_empty());

        agg.record_ticket(1, "A", Classification::ManagedK8s);
        agg.record_ticket(2, "B", Classification::NotK8s);
        agg.record_ticket(2, "B", Classification::NotK8s);
        agg.record_ticket(3, "C", Classification::KeywordK8s);
        agg.record_ticket(3, "C", Classification::NotK8s);

        assert_eq!(agg.org_count(), 3);
        assert_eq!(agg.orgs_with_k8s(), 2);
        assert_eq!(agg.total_k8s(), 2);
        assert_eq!(agg.total_non_k8s(), 3);
        let per_org: u32 = agg.iter().map(|(_, s)| s.total()).sum();
        assert_eq!(per_org, 5);
    }

    #[test]
    fn test_sort_by_name_case_insensitive() {
        let mut items = vec![
            summary("beta", 0, 1),
            summary("Alpha", 0, 1),
            summary("ALPHA", 1, 0),
            summary("gamma", 0, 1),
        ];
        sort_by_name(&mut items);

        let names: Vec<&str> = items.iter().map(|s| s.org_name.as_str()).collect();
        // "Alpha" stays ahead of "ALPHA"
        assert_eq!(names, vec!["Alpha", "ALPHA", "beta", "gamma"]);
    }

    #[test]
    fn test_sort_by_k8s_count_descending_stable() {
        let mut items = vec![
            summary("a", 1, 0),
            summary("b", 3, 0),
            summary("c", 1, 5),
            summary("d", 0, 2),
            summary("e", 3, 1),
        ];
        sort_by_k8s_count(&mut items);

        let names: Vec<&str> = items.iter().map(|s| s.org_name.as_str()).collect();
        assert_eq!(names, vec!["b", "e", "a", "c", "d"]);
    }

    #[test]
    fn test_orgs_with_k8s_independent_of_order() {
        let mut items = vec![summary("z", 0, 1), summary("y", 2, 0), summary("x", 1, 1)];
        let before = orgs_with_k8s(&items);
        sort_by_k8s_count(&mut items);
        assert_eq!(orgs_with_k8s(&items), before);
        sort_by_name(&mut items);
        assert_eq!(orgs_with_k8s(&items), before);
        assert_eq!(before, 2);
    }
}
