use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Discriminator tag for link posts in a listing.
const POST_KIND: &str = "t3";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("received HTML instead of JSON (response starts with {prefix:?})")]
    Html { prefix: String },
    #[error("response is not valid JSON: {message} (response starts with {prefix:?})")]
    Json { message: String, prefix: String },
    #[error("listing has no data.children (top-level keys: {keys:?})")]
    Shape { keys: Vec<String> },
}

/// Normalized view of one link post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub title: String,
    pub upvote_ratio: f64,
    pub ups: i64,
    pub permalink: String,
}

/// The fields projected out of a post's `data` record. All optional;
/// absent and null both count as missing.
#[derive(Deserialize)]
struct PostFields {
    title: Option<String>,
    upvote_ratio: Option<f64>,
    ups: Option<i64>,
    permalink: Option<String>,
}

/// Extract post summaries from a raw listing response.
///
/// HTML bodies (error pages served instead of JSON) and unparseable text
/// are rejected up front; everything else goes through [`extract_value`].
pub fn extract(raw: &str) -> Result<Vec<PostSummary>, FeedError> {
    if raw.trim_start().starts_with('<') {
        return Err(FeedError::Html {
            prefix: prefix(raw, 100),
        });
    }
    let value: Value = serde_json::from_str(raw).map_err(|e| FeedError::Json {
        message: e.to_string(),
        prefix: prefix(raw, 200),
    })?;
    extract_value(&value)
}

/// Extract post summaries from an already-parsed listing.
///
/// Output order matches source order. Items of the wrong kind, with a
/// missing or null `data` record, with fields that do not decode, or with
/// an empty resolved title are silently dropped.
pub fn extract_value(value: &Value) -> Result<Vec<PostSummary>, FeedError> {
    let children = value
        .get("data")
        .and_then(|data| data.get("children"))
        .and_then(Value::as_array)
        .ok_or_else(|| FeedError::Shape {
            keys: top_level_keys(value),
        })?;

    Ok(children.iter().filter_map(summarize).collect())
}

fn summarize(child: &Value) -> Option<PostSummary> {
    if child.get("kind").and_then(Value::as_str) != Some(POST_KIND) {
        return None;
    }
    let data = child.get("data").filter(|data| !data.is_null())?;
    let fields: PostFields = serde_json::from_value(data.clone()).ok()?;

    let summary = PostSummary {
        title: fields.title.unwrap_or_default(),
        upvote_ratio: fields.upvote_ratio.unwrap_or(0.0),
        ups: fields.ups.unwrap_or(0),
        permalink: fields.permalink.unwrap_or_default(),
    };
    (!summary.title.is_empty()).then_some(summary)
}

fn top_level_keys(value: &Value) -> Vec<String> {
    value
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

/// First `max` characters of a response, for diagnostics.
pub(crate) fn prefix(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(children: Vec<Value>) -> Value {
        json!({ "kind": "Listing", "data": { "children": children } })
    }

    fn post(title: &str) -> Value {
        json!({
            "kind": "t3",
            "data": {
                "title": title,
                "upvote_ratio": 0.87,
                "ups": 1204,
                "permalink": format!("/r/all/comments/{}/", title.to_lowercase())
            }
        })
    }

    #[test]
    fn keeps_only_link_posts() {
        let input = listing(vec![
            json!({"kind": "t3", "data": {"title": "A", "ups": 5, "upvote_ratio": 0.9, "permalink": "/a"}}),
            json!({"kind": "t1", "data": {"title": "B"}}),
        ]);
        let posts = extract_value(&input).unwrap();
        assert_eq!(
            posts,
            vec![PostSummary {
                title: "A".into(),
                upvote_ratio: 0.9,
                ups: 5,
                permalink: "/a".into(),
            }]
        );
    }

    #[test]
    fn missing_fields_get_defaults() {
        let input = listing(vec![json!({"kind": "t3", "data": {"title": "Only a title"}})]);
        let posts = extract_value(&input).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].upvote_ratio, 0.0);
        assert_eq!(posts[0].ups, 0);
        assert_eq!(posts[0].permalink, "");
    }

    #[test]
    fn null_fields_default_like_missing_ones() {
        let input = listing(vec![json!({
            "kind": "t3",
            "data": {"title": "T", "upvote_ratio": null, "ups": null, "permalink": null}
        })]);
        let posts = extract_value(&input).unwrap();
        assert_eq!(posts[0].upvote_ratio, 0.0);
        assert_eq!(posts[0].ups, 0);
        assert_eq!(posts[0].permalink, "");
    }

    #[test]
    fn drops_posts_without_a_title() {
        let input = listing(vec![
            json!({"kind": "t3", "data": {"title": "", "ups": 10}}),
            json!({"kind": "t3", "data": {"ups": 10}}),
            post("Kept"),
        ]);
        let posts = extract_value(&input).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Kept");
    }

    #[test]
    fn drops_items_with_missing_or_null_data() {
        let input = listing(vec![
            json!({"kind": "t3"}),
            json!({"kind": "t3", "data": null}),
            post("Kept"),
        ]);
        assert_eq!(extract_value(&input).unwrap().len(), 1);
    }

    #[test]
    fn drops_items_that_do_not_decode() {
        let input = listing(vec![
            json!({"kind": "t3", "data": {"title": 42}}),
            json!({"kind": "t3", "data": "not a record"}),
            json!({"kind": 7, "data": {"title": "no kind"}}),
            post("Kept"),
        ]);
        assert_eq!(extract_value(&input).unwrap().len(), 1);
    }

    #[test]
    fn preserves_source_order() {
        let input = listing(vec![post("First"), post("Second"), post("Third")]);
        let titles: Vec<String> = extract_value(&input)
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, ["First", "Second", "Third"]);
    }

    #[test]
    fn rejects_html_responses() {
        let err = extract("  <html><body>Too Many Requests</body></html>").unwrap_err();
        assert!(matches!(err, FeedError::Html { .. }));
    }

    #[test]
    fn rejects_invalid_json() {
        match extract("{not json").unwrap_err() {
            FeedError::Json { prefix, .. } => assert_eq!(prefix, "{not json"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reports_top_level_keys_on_bad_shape() {
        let err = extract_value(&json!({"error": 429, "message": "Too Many Requests"})).unwrap_err();
        match err {
            FeedError::Shape { keys } => {
                assert!(keys.contains(&"error".to_string()));
                assert!(keys.contains(&"message".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_object_is_a_shape_error() {
        assert!(matches!(extract("{}").unwrap_err(), FeedError::Shape { .. }));
    }

    #[test]
    fn empty_children_yield_no_posts() {
        assert!(extract_value(&listing(vec![])).unwrap().is_empty());
    }

    #[test]
    fn text_and_parsed_inputs_agree() {
        let raw = std::fs::read_to_string("tests/fixtures/hot.json").unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(extract(&raw).unwrap(), extract_value(&value).unwrap());
    }

    #[test]
    fn fixture_listing_extracts_all_posts() {
        let raw = std::fs::read_to_string("tests/fixtures/hot.json").unwrap();
        let posts = extract(&raw).unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].title, "Ceasefire talks resume after six-week pause");
        assert!(posts.iter().all(|p| !p.title.is_empty()));
        assert!(posts.iter().all(|p| p.permalink.starts_with("/r/")));
    }

    #[test]
    fn long_diagnostic_prefixes_are_truncated() {
        let raw = format!("<{}", "x".repeat(300));
        match extract(&raw).unwrap_err() {
            FeedError::Html { prefix } => assert_eq!(prefix.chars().count(), 100),
            other => panic!("unexpected error: {other}"),
        }
    }
}
