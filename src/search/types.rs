use serde::Deserialize;

/// Top-level body of a submissions search response.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub data: SearchPage,
}

/// One page of search results.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    pub items_per_page: u64,
    pub current_item_count: u64,
    pub items: Vec<ItemEnvelope>,
}

#[derive(Debug, Deserialize)]
pub struct ItemEnvelope {
    pub item: Submission,
}

/// Only `sample` is read; other submission fields are ignored.
#[derive(Debug, Deserialize)]
pub struct Submission {
    pub sample: String,
}

impl SearchPage {
    /// A page with fewer (or more) items than the page size ends the search.
    pub fn is_last(&self) -> bool {
        self.current_item_count != self.items_per_page
    }

    pub fn into_samples(self) -> Vec<String> {
        self.items
            .into_iter()
            .map(|envelope| envelope.item.sample)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_response_parsing() {
        let body = json!({
            "data": {
                "items_per_page": 2,
                "current_item_count": 2,
                "items": [
                    {"item": {"sample": "aaa", "score": 10}},
                    {"item": {"sample": "bbb"}}
                ]
            }
        });

        let response: SearchResponse = serde_json::from_value(body).unwrap();
        let page = response.data;

        assert!(!page.is_last());
        assert_eq!(page.into_samples(), vec!["aaa", "bbb"]);
    }

    #[test]
    fn test_short_page_is_last() {
        let page = SearchPage {
            items_per_page: 10,
            current_item_count: 4,
            items: Vec::new(),
        };
        assert!(page.is_last());
    }

    #[test]
    fn test_missing_sample_is_rejected() {
        let body = json!({
            "data": {
                "items_per_page": 1,
                "current_item_count": 1,
                "items": [{"item": {"sha256": "abc"}}]
            }
        });
        assert!(serde_json::from_value::<SearchResponse>(body).is_err());
    }
}
