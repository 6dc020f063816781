//! Partitioning a document into the page sets of a split.

use tracing::{debug, warn};

use crate::error::SelectorError;
use crate::page_range::{parse_selector, PageIndexSet};

/// How a split divides its source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// One output per page.
    All,
    /// One output per selector, in the order given.
    Ranges(Vec<String>),
}

/// Ordered page sets, each destined for one output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionPlan {
    parts: Vec<PageIndexSet>,
}

impl PartitionPlan {
    pub fn parts(&self) -> &[PageIndexSet] {
        &self.parts
    }

}

/// Plan a split of a document with `total_pages` pages.
///
/// In `Ranges` mode every selector stands on its own: one that is malformed
/// or selects nothing is skipped instead of failing the whole split.
pub fn plan_split(mode: &SplitMode, total_pages: u32) -> Result<PartitionPlan, SelectorError> {
    let parts: Vec<PageIndexSet> = match mode {
        SplitMode::All => PageIndexSet::all(total_pages)?
            .as_slice()
            .iter()
            .map(|&page| PageIndexSet::single(page))
            .collect(),
        SplitMode::Ranges(selectors) => selectors
            .iter()
            .filter_map(|selector| match parse_selector(selector, total_pages) {
                Ok(pages) => Some(pages),
                Err(err) => {
                    warn!(selector = %selector, %err, "skipping split range");
                    None
                }
            })
            .collect(),
    };

    if parts.is_empty() {
        return Err(SelectorError::EmptySelection);
    }

    debug!(parts = parts.len(), total_pages, "planned split");
    Ok(PartitionPlan { parts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn as_vecs(plan: &PartitionPlan) -> Vec<Vec<u32>> {
        plan.parts().iter().map(|p| p.as_slice().to_vec()).collect()
    }

    fn ranges(selectors: &[&str]) -> SplitMode {
        SplitMode::Ranges(selectors.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_split_all() {
        let plan = plan_split(&SplitMode::All, 4).unwrap();
        assert_eq!(as_vecs(&plan), vec![vec![1], vec![2], vec![3], vec![4]]);
    }

    #[test]
    fn test_split_all_empty_document() {
        assert_eq!(
            plan_split(&SplitMode::All, 0).unwrap_err(),
            SelectorError::EmptySelection
        );
    }

    #[test]
    fn test_split_ranges_keep_selector_order() {
        let plan = plan_split(&ranges(&["4-5", "1,3", "2"]), 5).unwrap();
        assert_eq!(as_vecs(&plan), vec![vec![4, 5], vec![1, 3], vec![2]]);
    }

    #[test]
    fn test_split_ranges_skip_invalid() {
        let plan = plan_split(&ranges(&["1-2", "oops", "9-12", "5-3", "3"]), 5).unwrap();
        assert_eq!(as_vecs(&plan), vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_split_range_running_past_u32_is_kept() {
        let plan = plan_split(&ranges(&["1", "4-99999999999"]), 5).unwrap();
        assert_eq!(as_vecs(&plan), vec![vec![1], vec![4, 5]]);
    }

    #[test]
    fn test_split_ranges_all_invalid() {
        assert_eq!(
            plan_split(&ranges(&["x", "8"]), 5).unwrap_err(),
            SelectorError::EmptySelection
        );
        assert_eq!(
            plan_split(&ranges(&[]), 5).unwrap_err(),
            SelectorError::EmptySelection
        );
    }
}
