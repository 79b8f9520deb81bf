//! Result types returned by the client

use std::collections::HashMap;

/// Statistics key holding the row count
pub const KEY_ROW_COUNT: &str = "row_count";

fn row_count_of(statistics: &HashMap<String, String>) -> u64 {
    statistics
        .get(KEY_ROW_COUNT)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Collection statistics returned by `get_collection_statistics`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStat {
    pub name: String,
    pub statistics: HashMap<String, String>,
}

impl CollectionStat {
    pub fn new(name: impl Into<String>, stats: Vec<(String, String)>) -> Self {
        Self {
            name: name.into(),
            statistics: stats.into_iter().collect(),
        }
    }

    /// Row count, 0 when the server did not report one
    pub fn row_count(&self) -> u64 {
        row_count_of(&self.statistics)
    }
}

/// Partition statistics returned by `get_partition_statistics`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionStat {
    pub name: String,
    pub statistics: HashMap<String, String>,
}

impl PartitionStat {
    pub fn new(name: impl Into<String>, stats: Vec<(String, String)>) -> Self {
        Self {
            name: name.into(),
            statistics: stats.into_iter().collect(),
        }
    }

    /// Row count, 0 when the server did not report one
    pub fn row_count(&self) -> u64 {
        row_count_of(&self.statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_count() {
        let stat = CollectionStat::new(
            "docs",
            vec![("row_count".to_string(), "1024".to_string())],
        );
        assert_eq!(stat.row_count(), 1024);
    }

    #[test]
    fn test_row_count_missing_or_garbage() {
        assert_eq!(PartitionStat::new("p", vec![]).row_count(), 0);

        let stat = PartitionStat::new("p", vec![("row_count".to_string(), "lots".to_string())]);
        assert_eq!(stat.row_count(), 0);
    }
}
