use super::{normalize_pages, RawPage};

/// Collapses pages into run-length ranges: `[5, 6, 7, 10]` becomes
/// `pp. 5–7, 10`, a single page becomes `p. 3`, and no pages yield `""`.
pub fn compact_ranges<I, P>(pages: I) -> String
where
    I: IntoIterator<Item = P>,
    P: Into<RawPage>,
{
    let pages = normalize_pages(pages);
    if pages.is_empty() {
        return String::new();
    }

    let label = if pages.len() == 1 { "p." } else { "pp." };
    let parts: Vec<String> = runs(&pages)
        .into_iter()
        .map(|(start, end)| {
            if end > start {
                format!("{start}\u{2013}{end}")
            } else {
                start.to_string()
            }
        })
        .collect();

    format!("{label} {}", parts.join(", "))
}

fn runs(sorted: &[u32]) -> Vec<(u32, u32)> {
    let mut runs = Vec::new();
    let mut iter = sorted.iter().copied();
    let Some(first) = iter.next() else {
        return runs;
    };

    let (mut start, mut end) = (first, first);
    for page in iter {
        if page == end + 1 {
            end = page;
        } else {
            runs.push((start, end));
            start = page;
            end = page;
        }
    }
    runs.push((start, end));
    runs
}
