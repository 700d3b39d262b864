//! The content slides are built from.
//!
//! Content is a JSON document with a title, some optional metadata and an ordered tree of topics
//! under `mainTopics`. Each topic is classified by its shape when loaded so the slide builder
//! only ever deals with typed nodes.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::{fs, io, path::Path};
use tracing::warn;

const TERM_LIST_KEYS: &[&str] = &["terms", "용어목록"];
const ITEM_LIST_KEYS: &[&str] = &["items", "종류", "요소", "요점", "구성요소"];
const TERM_KEYS: &[&str] = &["term", "용어"];
const DEFINITION_KEYS: &[&str] = &["definition", "개념"];

/// The content of a presentation.
#[derive(Clone, Debug, PartialEq)]
pub struct SlideContent {
    pub title: String,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub comments: Option<String>,
    pub topics: Vec<Topic>,
}

impl SlideContent {
    /// Load content from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ContentError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse content out of a JSON string.
    pub fn parse(input: &str) -> Result<Self, ContentError> {
        let raw: RawSlideContent = serde_json::from_str(input)?;
        let topics = raw.main_topics.into_iter().filter_map(|(key, value)| Topic::parse(key, value)).collect();
        Ok(Self {
            title: raw.title,
            subtitle: raw.subtitle,
            author: raw.author,
            subject: raw.subject,
            keywords: raw.keywords,
            comments: raw.comments,
            topics,
        })
    }

    /// The text shown under the title in the title slide.
    pub fn subtitle_text(&self) -> Option<&str> {
        self.subtitle.as_deref().or(self.author.as_deref())
    }
}

#[derive(Deserialize)]
struct RawSlideContent {
    title: String,

    #[serde(default)]
    subtitle: Option<String>,

    #[serde(default)]
    author: Option<String>,

    #[serde(default)]
    subject: Option<String>,

    #[serde(default)]
    keywords: Option<String>,

    #[serde(default)]
    comments: Option<String>,

    #[serde(rename = "mainTopics")]
    main_topics: Map<String, Value>,
}

/// A topic in the content tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Topic {
    /// The key this topic was defined under.
    pub key: String,

    /// The title of the slide the topic is rendered in.
    pub title: String,

    pub node: TopicNode,
}

impl Topic {
    fn parse(key: String, value: Value) -> Option<Self> {
        let title = key.clone();
        let node = match value {
            Value::Array(items) => TopicNode::Bullets(items.iter().filter_map(item_text).collect()),
            Value::Object(map) => return Some(Self::parse_mapping(key, map)),
            Value::Null => {
                warn!(topic = %key, "ignoring empty topic");
                return None;
            }
            other => TopicNode::Text(scalar_text(&other)?),
        };
        Some(Self { key, title, node })
    }

    fn parse_mapping(key: String, mut map: Map<String, Value>) -> Self {
        let title = map.get("title").and_then(scalar_text).unwrap_or_else(|| key.clone());
        if let Some(Value::Array(rows)) = take_any(&mut map, TERM_LIST_KEYS) {
            let terms = rows.iter().filter_map(Term::parse).collect();
            return Self { key, title, node: TopicNode::Terms(terms) };
        }
        if let Some(Value::Array(items)) = take_any(&mut map, ITEM_LIST_KEYS) {
            let items = items.iter().filter_map(item_text).collect();
            return Self { key, title, node: TopicNode::Bullets(items) };
        }
        if let Some(description) = map.get("description").and_then(scalar_text) {
            return Self { key, title, node: TopicNode::Text(description) };
        }
        map.shift_remove("title");
        let children = map.into_iter().filter_map(|(key, value)| Topic::parse(key, value)).collect();
        Self { key, title, node: TopicNode::Section(children) }
    }
}

/// The shape of a topic, which determines how it's rendered.
#[derive(Clone, Debug, PartialEq)]
pub enum TopicNode {
    /// A single text.
    Text(String),

    /// A list of items.
    Bullets(Vec<String>),

    /// A list of terms and their definitions.
    Terms(Vec<Term>),

    /// A section containing more topics.
    Section(Vec<Topic>),
}

/// A term along with its definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Term {
    pub term: String,
    pub definition: String,
}

impl Term {
    fn parse(row: &Value) -> Option<Self> {
        let Value::Object(row) = row else {
            return None;
        };
        let term = get_any(row, TERM_KEYS)?;
        let definition = get_any(row, DEFINITION_KEYS)?;
        Some(Self { term, definition })
    }
}

/// Turn a list item into the text it's displayed as.
///
/// Strings are used as is. Objects are displayed as `"{number}. {title}"`, `"{title}: {description}"`,
/// `"{name}: {description}"`, `"{title}"` or `"{name}"`, whichever matches first. Anything else is
/// skipped.
pub fn item_text(item: &Value) -> Option<String> {
    let item = match item {
        Value::String(text) => return Some(text.clone()),
        Value::Object(item) => item,
        _ => return None,
    };
    let field = |name: &str| item.get(name).and_then(scalar_text);
    match (field("number"), field("title"), field("name"), field("description")) {
        (Some(number), Some(title), _, _) => Some(format!("{number}. {title}")),
        (_, Some(title), _, Some(description)) => Some(format!("{title}: {description}")),
        (_, None, Some(name), Some(description)) => Some(format!("{name}: {description}")),
        (_, Some(title), _, None) => Some(title),
        (_, None, Some(name), None) => Some(name),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(value) => Some(value.to_string()),
        _ => None,
    }
}

// Removing must keep the order of the remaining keys.
fn take_any(map: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter().find_map(|key| map.shift_remove(*key))
}

fn get_any(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| map.get(*key).and_then(scalar_text))
}

/// An error loading content.
#[derive(thiserror::Error, Debug)]
pub enum ContentError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("invalid content: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn text(input: &str) -> TopicNode {
        TopicNode::Text(input.into())
    }

    fn bullets(items: &[&str]) -> TopicNode {
        TopicNode::Bullets(items.iter().map(|item| item.to_string()).collect())
    }

    #[test]
    fn minimal() {
        let content = SlideContent::parse(r#"{"title":"T","mainTopics":{"A":["x","y"]}}"#).expect("parse failed");
        assert_eq!(content.title, "T");
        assert_eq!(content.subtitle_text(), None);
        assert_eq!(content.topics, &[Topic { key: "A".into(), title: "A".into(), node: bullets(&["x", "y"]) }]);
    }

    #[rstest]
    #[case::no_title(r#"{"mainTopics":{}}"#)]
    #[case::no_topics(r#"{"title":"T"}"#)]
    #[case::title_not_string(r#"{"title":42,"mainTopics":{}}"#)]
    #[case::topics_not_mapping(r#"{"title":"T","mainTopics":[]}"#)]
    #[case::not_json("title: T")]
    fn invalid(#[case] input: &str) {
        let result = SlideContent::parse(input);
        assert!(matches!(result, Err(ContentError::Invalid(_))), "{result:?}");
    }

    #[test]
    fn topic_order_is_preserved() {
        let input = r#"{"title":"T","mainTopics":{"zeta":"z","alpha":"a","mid":"m"}}"#;
        let content = SlideContent::parse(input).expect("parse failed");
        let keys: Vec<_> = content.topics.iter().map(|topic| topic.key.as_str()).collect();
        assert_eq!(keys, &["zeta", "alpha", "mid"]);
    }

    #[test]
    fn subtitle_falls_back_to_author() {
        let input = r#"{"title":"T","author":"me","mainTopics":{}}"#;
        let content = SlideContent::parse(input).expect("parse failed");
        assert_eq!(content.subtitle_text(), Some("me"));
    }

    #[rstest]
    #[case::string(json!("hi"), Some("hi"))]
    #[case::numbered(json!({"number": 2, "title": "step", "description": "ignored"}), Some("2. step"))]
    #[case::title_description(json!({"title": "a", "description": "b"}), Some("a: b"))]
    #[case::name_description(json!({"name": "a", "description": "b"}), Some("a: b"))]
    #[case::title(json!({"title": "a"}), Some("a"))]
    #[case::name(json!({"name": "a"}), Some("a"))]
    #[case::unknown_object(json!({"other": "a"}), None)]
    #[case::number(json!(42), None)]
    #[case::list(json!(["a"]), None)]
    fn items(#[case] item: Value, #[case] expected: Option<&str>) {
        assert_eq!(item_text(&item).as_deref(), expected);
    }

    #[rstest]
    #[case::scalar(json!("hello"), "K", text("hello"))]
    #[case::number(json!(3), "K", text("3"))]
    #[case::list(json!(["a", 1, {"name": "b"}]), "K", bullets(&["a", "b"]))]
    #[case::items(json!({"title": "Items", "items": ["a"]}), "Items", bullets(&["a"]))]
    #[case::korean_items(json!({"요점": ["a"], "description": "ignored"}), "K", bullets(&["a"]))]
    #[case::description(json!({"description": "text"}), "K", text("text"))]
    fn classification(#[case] value: Value, #[case] title: &str, #[case] expected: TopicNode) {
        let topic = Topic::parse("K".into(), value).expect("topic skipped");
        assert_eq!(topic.title, title);
        assert_eq!(topic.node, expected);
    }

    #[test]
    fn terms() {
        let value = json!({
            "title": "Glossary",
            "용어목록": [
                {"용어": "a", "개념": "first"},
                {"term": "b", "definition": "second"},
                {"term": "missing definition"},
                "not a row"
            ]
        });
        let topic = Topic::parse("K".into(), value).expect("topic skipped");
        assert_eq!(topic.title, "Glossary");
        let expected = vec![
            Term { term: "a".into(), definition: "first".into() },
            Term { term: "b".into(), definition: "second".into() },
        ];
        assert_eq!(topic.node, TopicNode::Terms(expected));
    }

    #[test]
    fn sections() {
        let value = json!({"title": "Section", "first": ["a"], "second": {"description": "b"}, "empty": null});
        let topic = Topic::parse("K".into(), value).expect("topic skipped");
        assert_eq!(topic.title, "Section");
        let TopicNode::Section(children) = topic.node else { panic!("not a section") };
        let expected = vec![
            Topic { key: "first".into(), title: "first".into(), node: bullets(&["a"]) },
            Topic { key: "second".into(), title: "second".into(), node: text("b") },
        ];
        assert_eq!(children, expected);
    }

    #[test]
    fn section_order_is_preserved() {
        let input = r#"{"title": "T", "mainTopics": {"S": {"title": "Section", "c": "1", "a": "2", "b": "3"}}}"#;
        let content = SlideContent::parse(input).expect("parse failed");
        let TopicNode::Section(children) = &content.topics[0].node else { panic!("not a section") };
        let keys: Vec<_> = children.iter().map(|topic| topic.key.as_str()).collect();
        assert_eq!(keys, &["c", "a", "b"]);
    }

    #[test]
    fn comments() {
        let input = r#"{"title": "T", "comments": "draft", "mainTopics": {}}"#;
        let content = SlideContent::parse(input).expect("parse failed");
        assert_eq!(content.comments.as_deref(), Some("draft"));
    }

    #[test]
    fn load_sample() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/slide_content.json");
        let content = SlideContent::from_path(path).expect("loading sample failed");
        assert_eq!(content.topics.len(), 5);
    }
}
