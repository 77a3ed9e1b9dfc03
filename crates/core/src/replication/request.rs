use super::error::RequestError;
use super::region::RegionSet;

/// Process-wide input: which tables to replicate and where to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaRequest {
    pub target_regions: RegionSet,
    /// Table names in the order they were supplied.
    pub source_tables: Vec<String>,
}

impl ReplicaRequest {
    /// Creates a request, rejecting empty inputs and repeated table names.
    pub fn new(target_regions: RegionSet, source_tables: Vec<String>) -> Result<Self, RequestError> {
        if target_regions.is_empty() {
            return Err(RequestError::NoTargetRegions);
        }
        if source_tables.is_empty() {
            return Err(RequestError::NoSourceTables);
        }

        for (i, table) in source_tables.iter().enumerate() {
            if source_tables[..i].contains(table) {
                return Err(RequestError::DuplicateTable(table.clone()));
            }
        }

        Ok(Self {
            target_regions,
            source_tables,
        })
    }

    /// Parses comma-separated region and table lists, e.g. `"us-east-1, us-east-2"`
    /// and `"Orders, Users"`.
    pub fn parse(regions: &str, tables: &str) -> Result<Self, RequestError> {
        let target_regions = RegionSet::parse_list(regions)?;
        Self::new(target_regions, split_list(tables))
    }
}

/// Splits a comma-separated list, trimming items and dropping blanks.
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let request = ReplicaRequest::parse("us-east-1, us-west-2", "Orders, Users").unwrap();
        assert_eq!(request.target_regions.len(), 2);
        assert_eq!(request.source_tables, vec!["Orders", "Users"]);
    }

    #[test]
    fn test_parse_keeps_table_order() {
        let request = ReplicaRequest::parse("us-east-1", "Zeta,Alpha,Mid").unwrap();
        assert_eq!(request.source_tables, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_empty_regions_rejected() {
        assert_eq!(
            ReplicaRequest::parse(" , ", "Orders"),
            Err(RequestError::NoTargetRegions)
        );
    }

    #[test]
    fn test_empty_tables_rejected() {
        assert_eq!(
            ReplicaRequest::parse("us-east-1", ""),
            Err(RequestError::NoSourceTables)
        );
    }

    #[test]
    fn test_duplicate_table_rejected() {
        assert_eq!(
            ReplicaRequest::parse("us-east-1", "Orders, Users, Orders"),
            Err(RequestError::DuplicateTable("Orders".to_string()))
        );
    }

    #[test]
    fn test_malformed_region_rejected() {
        assert!(matches!(
            ReplicaRequest::parse("us-east-1, Mars", "Orders"),
            Err(RequestError::Region(_))
        ));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, ,b ,"), vec!["a", "b"]);
    }
}
