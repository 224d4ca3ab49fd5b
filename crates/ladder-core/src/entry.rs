use serde::{Deserialize, Serialize};

/// One ranked row of the ladder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub rank: u32,
    pub name: String,
    pub class: String,
    pub level: u32,
    pub experience: u64,
}

/// Target entry with its neighbors from the same page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub target: Entry,
    pub before: Option<Entry>,
    pub after: Option<Entry>,
}

/// Find the first entry whose name matches `target_name` case-insensitively
///
/// Neighbors come from the same page only, so a match on the first or last
/// row of the page has no `before` or `after` respectively.
pub fn find_in_page(entries: &[Entry], target_name: &str) -> Option<SearchResult> {
    let index = entries
        .iter()
        .position(|entry| names_match(&entry.name, target_name))?;

    Some(SearchResult {
        target: entries[index].clone(),
        before: index.checked_sub(1).map(|i| entries[i].clone()),
        after: entries.get(index + 1).cloned(),
    })
}

fn names_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
