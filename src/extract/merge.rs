use std::collections::HashSet;

use tracing::debug;

use crate::app::{Result, XhsError};

/// Something with a stable unique key
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Partial result of one extraction strategy.
///
/// `None` means the strategy failed or had nothing to look at, which is
/// different from succeeding with an empty list.
#[derive(Debug)]
pub struct StrategyOutput<T> {
    pub name: &'static str,
    pub items: Option<Vec<T>>,
}

impl<T> StrategyOutput<T> {
    pub fn new(name: &'static str, items: Option<Vec<T>>) -> Self {
        Self { name, items }
    }
}

/// Merge lists by key, keeping the first occurrence of each key in
/// source order.
pub fn merge_unique<T, I>(sources: I) -> Vec<T>
where
    T: Keyed,
    I: IntoIterator<Item = Option<Vec<T>>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for item in sources.into_iter().flatten().flatten() {
        if seen.insert(item.key().to_string()) {
            merged.push(item);
        }
    }

    merged
}

/// Merge the outputs of ordered strategies.
///
/// Fails only when no strategy produced a single item.
pub fn merge_strategies<T: Keyed>(outputs: Vec<StrategyOutput<T>>) -> Result<Vec<T>> {
    for output in &outputs {
        match &output.items {
            Some(items) => debug!("Strategy {} produced {} items", output.name, items.len()),
            None => debug!("Strategy {} produced nothing", output.name),
        }
    }

    let tried: Vec<_> = outputs.iter().map(|o| o.name).collect();
    let merged = merge_unique(outputs.into_iter().map(|o| o.items));

    if merged.is_empty() {
        return Err(XhsError::Extraction(format!(
            "no items from any strategy ({})",
            tried.join(", ")
        )));
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        id: &'static str,
        source: &'static str,
    }

    impl Keyed for Entry {
        fn key(&self) -> &str {
            self.id
        }
    }

    fn entries(source: &'static str, ids: &[&'static str]) -> Vec<Entry> {
        ids.iter().map(|&id| Entry { id, source }).collect()
    }

    #[test]
    fn test_first_seen_wins() {
        let merged = merge_unique(vec![
            Some(entries("ssr", &["a", "b"])),
            None,
            Some(entries("api", &["b", "c"])),
            Some(entries("dom", &["c", "d", "a"])),
        ]);

        let ids: Vec<_> = merged.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(merged[1].source, "ssr");
        assert_eq!(merged[2].source, "api");
    }

    #[test]
    fn test_duplicates_within_one_source() {
        let merged = merge_unique(vec![Some(entries("ssr", &["a", "a", "b"]))]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_partial_failure_is_tolerated() {
        let merged = merge_strategies(vec![
            StrategyOutput::new("ssr", None),
            StrategyOutput::new("api", Some(Vec::new())),
            StrategyOutput::new("dom", Some(entries("dom", &["x"]))),
        ])
        .unwrap();
        assert_eq!(merged, entries("dom", &["x"]));
    }

    #[test]
    fn test_all_empty_is_an_error() {
        let result = merge_strategies::<Entry>(vec![
            StrategyOutput::new("ssr", None),
            StrategyOutput::new("api", Some(Vec::new())),
        ]);
        match result {
            Err(XhsError::Extraction(message)) => assert!(message.contains("ssr, api")),
            other => panic!("expected extraction error, got {:?}", other),
        }
    }
}
