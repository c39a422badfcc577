use super::ProvenanceStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Citation chips per keypath, ready for the page viewer.
pub type ClickMap = BTreeMap<String, Vec<Citation>>;

/// One clickable citation: the page and the viewer link that opens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub page: u32,
    pub href: String,
}

/// Builds `<viewer_route>?page=<p>[&doc=<id>][&extra...]` links for every
/// cited page.
///
/// Extra parameters never overwrite `page`, `doc` (when a document id is
/// given), or an earlier extra with the same name. A blank `doc_id` is
/// treated as absent.
pub fn build_click_map(
    store: &ProvenanceStore,
    viewer_route: &str,
    doc_id: Option<&str>,
    extra_params: &[(&str, &str)],
) -> ClickMap {
    let doc_id = doc_id.filter(|id| !id.is_empty());

    store
        .entries()
        .map(|(keypath, pages)| {
            let citations = pages
                .iter()
                .map(|page| Citation {
                    page: *page,
                    href: citation_href(viewer_route, *page, doc_id, extra_params),
                })
                .collect();
            (keypath.to_string(), citations)
        })
        .collect()
}

fn citation_href(
    viewer_route: &str,
    page: u32,
    doc_id: Option<&str>,
    extra_params: &[(&str, &str)],
) -> String {
    let page = page.to_string();
    let mut params: Vec<(&str, &str)> = vec![("page", page.as_str())];
    if let Some(doc_id) = doc_id {
        params.push(("doc", doc_id));
    }
    for (name, value) in extra_params {
        if params.iter().any(|(existing, _)| existing == name) {
            continue;
        }
        params.push((*name, *value));
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{viewer_route}?{query}")
}
