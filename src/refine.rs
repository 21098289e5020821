use crate::apis::Paper;

/// Client-side search over the server-returned list.
///
/// Keeps papers whose title, subject name, region name or year contains the
/// search string, case-insensitively. Source order is preserved and the result
/// is always an owned copy.
pub fn refine(papers: &[Paper], search: &str) -> Vec<Paper> {
    let needle = search.to_lowercase();
    if needle.is_empty() {
        return papers.to_vec();
    }
    papers
        .iter()
        .filter(|p| matches(p, &needle))
        .cloned()
        .collect()
}

fn matches(paper: &Paper, needle: &str) -> bool {
    paper.title.to_lowercase().contains(needle)
        || paper.subject_name.to_lowercase().contains(needle)
        || paper.region_name.to_lowercase().contains(needle)
        || paper.year.to_string().contains(needle)
}
