//! Typed view over topic payloads
//!
//! The same endpoint returns several payload shapes. They are classified once
//! into [`TopicContent`] and read through shared accessors instead of probing
//! raw JSON at every call site.

use crate::record::markup::clean_text;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Coarse content type of a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Talk,
    Article,
    Question,
    ImageOnly,
    Unknown,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Talk => "talk",
            Self::Article => "article",
            Self::Question => "question",
            Self::ImageOnly => "image_only",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable label used in Markdown headings
    pub fn label(&self) -> &'static str {
        match self {
            Self::Talk => "Post",
            Self::Article => "Article",
            Self::Question => "Q&A",
            Self::ImageOnly => "Images",
            Self::Unknown => "Topic",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a topic, one variant per known shape
#[derive(Debug, Clone, PartialEq)]
pub enum TopicContent {
    /// Plain text post, possibly with images
    Talk {
        author: Option<String>,
        text: String,
        images: Vec<String>,
    },

    /// Long-form post linking to a separate article page
    Article {
        author: Option<String>,
        title: Option<String>,
        url: Option<String>,
        text: String,
        images: Vec<String>,
    },

    /// Question with an optional answer
    Question {
        asker: Option<String>,
        question: String,
        answerer: Option<String>,
        answer: Option<String>,
        images: Vec<String>,
    },

    /// Images without any accompanying text
    ImageOnly {
        author: Option<String>,
        images: Vec<String>,
    },

    /// Shape not recognised; `type` is kept for diagnostics
    Unknown {
        type_name: Option<String>,
        title: Option<String>,
    },
}

impl TopicContent {
    /// Classifies a raw topic payload
    pub fn from_payload(payload: &Value) -> Self {
        let type_name = payload.get("type").and_then(Value::as_str);

        if let Some(question) = payload.get("question") {
            let answer = payload.get("answer");
            let mut images = image_urls(question);
            if let Some(answer) = answer {
                images.extend(image_urls(answer));
            }
            return Self::Question {
                asker: owner_name(question),
                question: text_of(question),
                answerer: answer.and_then(owner_name),
                answer: answer.map(text_of).filter(|t| !t.is_empty()),
                images,
            };
        }

        if let Some(talk) = payload.get("talk") {
            let author = owner_name(talk);
            let text = text_of(talk);
            let images = image_urls(talk);

            if let Some(article) = talk.get("article") {
                return Self::Article {
                    author,
                    title: string_field(article, "title").or_else(|| string_field(payload, "title")),
                    url: string_field(article, "article_url")
                        .or_else(|| string_field(article, "inline_article_url")),
                    text,
                    images,
                };
            }

            if text.is_empty() && !images.is_empty() {
                return Self::ImageOnly { author, images };
            }

            return Self::Talk {
                author,
                text,
                images,
            };
        }

        Self::Unknown {
            type_name: type_name.map(str::to_string),
            title: string_field(payload, "title"),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Talk { .. } => ContentKind::Talk,
            Self::Article { .. } => ContentKind::Article,
            Self::Question { .. } => ContentKind::Question,
            Self::ImageOnly { .. } => ContentKind::ImageOnly,
            Self::Unknown { .. } => ContentKind::Unknown,
        }
    }

    /// Author of the topic; the asker for questions
    pub fn author(&self) -> Option<&str> {
        match self {
            Self::Talk { author, .. }
            | Self::Article { author, .. }
            | Self::ImageOnly { author, .. } => author.as_deref(),
            Self::Question { asker, .. } => asker.as_deref(),
            Self::Unknown { .. } => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Article { title, .. } | Self::Unknown { title, .. } => title.as_deref(),
            _ => None,
        }
    }

    /// Main body text; the question for Q&A topics
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Talk { text, .. } | Self::Article { text, .. } => {
                Some(text.as_str()).filter(|t| !t.is_empty())
            }
            Self::Question { question, .. } => Some(question.as_str()).filter(|t| !t.is_empty()),
            Self::ImageOnly { .. } | Self::Unknown { .. } => None,
        }
    }

    pub fn image_urls(&self) -> &[String] {
        match self {
            Self::Talk { images, .. }
            | Self::Article { images, .. }
            | Self::Question { images, .. }
            | Self::ImageOnly { images, .. } => images.as_slice(),
            Self::Unknown { .. } => &[],
        }
    }

    /// Body rendered for reading: cleaned text, with the answer appended for Q&A
    pub fn rendered_text(&self) -> String {
        match self {
            Self::Question {
                question,
                answerer,
                answer,
                ..
            } => {
                let mut out = format!("Q: {}", clean_text(question));
                if let Some(answer) = answer {
                    out.push_str("\n\nA");
                    if let Some(name) = answerer {
                        out.push_str(&format!(" ({})", name));
                    }
                    out.push_str(&format!(": {}", clean_text(answer)));
                }
                out
            }
            Self::Article { url, .. } => {
                let mut out = self.text().map(clean_text).unwrap_or_default();
                if let Some(url) = url {
                    if !out.is_empty() {
                        out.push_str("\n\n");
                    }
                    out.push_str(url);
                }
                out
            }
            _ => self.text().map(clean_text).unwrap_or_default(),
        }
    }
}

/// Flattened summary of a record; the "processed" checkpoint entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: String,
    pub created_at: String,
    pub kind: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image_count: usize,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub readers: u64,
}

impl TopicSummary {
    pub fn from_record(record: &Record) -> Self {
        let content = TopicContent::from_payload(&record.payload);
        let counter = |name: &str| {
            record
                .payload
                .get(name)
                .and_then(Value::as_u64)
                .unwrap_or(0)
        };

        Self {
            id: record.id.clone(),
            created_at: record.created_at.clone(),
            kind: content.kind(),
            author: content.author().map(str::to_string),
            title: content.title().map(clean_text),
            text: content.rendered_text(),
            image_count: content.image_urls().len(),
            likes: counter("likes_count"),
            comments: counter("comments_count"),
            readers: counter("readers_count").max(counter("reading_count")),
        }
    }
}

fn string_field(value: &Value, name: &str) -> Option<String> {
    value
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn owner_name(value: &Value) -> Option<String> {
    value.get("owner").and_then(|owner| string_field(owner, "name"))
}

fn text_of(value: &Value) -> String {
    string_field(value, "text").unwrap_or_default()
}

/// Collects the best available URL of every image: original, then large,
/// then thumbnail
fn image_urls(value: &Value) -> Vec<String> {
    value
        .get("images")
        .and_then(Value::as_array)
        .map(|images| {
            images
                .iter()
                .filter_map(|image| {
                    ["original", "large", "thumbnail"]
                        .iter()
                        .find_map(|size| image.get(*size).and_then(|s| string_field(s, "url")))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_talk() {
        let payload = json!({
            "type": "talk",
            "talk": {
                "owner": {"name": "alice"},
                "text": "hello <e type=\"hashtag\" title=\"%23intro%23\" />",
                "images": [{"large": {"url": "https://img/1.jpg"}}]
            }
        });
        let content = TopicContent::from_payload(&payload);
        assert_eq!(content.kind(), ContentKind::Talk);
        assert_eq!(content.author(), Some("alice"));
        assert_eq!(content.image_urls(), ["https://img/1.jpg".to_string()]);
        assert_eq!(content.rendered_text(), "hello #intro#");
    }

    #[test]
    fn test_classify_article() {
        let payload = json!({
            "type": "talk",
            "talk": {
                "owner": {"name": "bob"},
                "text": "abstract",
                "article": {"title": "Long read", "article_url": "https://articles/1"}
            }
        });
        let content = TopicContent::from_payload(&payload);
        assert_eq!(content.kind(), ContentKind::Article);
        assert_eq!(content.title(), Some("Long read"));
        assert_eq!(content.rendered_text(), "abstract\n\nhttps://articles/1");
    }

    #[test]
    fn test_classify_question() {
        let payload = json!({
            "type": "q&a",
            "question": {"owner": {"name": "carol"}, "text": "why?"},
            "answer": {"owner": {"name": "dave"}, "text": "because"}
        });
        let content = TopicContent::from_payload(&payload);
        assert_eq!(content.kind(), ContentKind::Question);
        assert_eq!(content.author(), Some("carol"));
        assert_eq!(content.text(), Some("why?"));
        assert_eq!(content.rendered_text(), "Q: why?\n\nA (dave): because");
    }

    #[test]
    fn test_classify_image_only() {
        let payload = json!({
            "talk": {
                "owner": {"name": "erin"},
                "images": [
                    {"original": {"url": "https://img/o.png"}, "thumbnail": {"url": "https://img/t.png"}},
                    {"thumbnail": {"url": "https://img/t2.png"}}
                ]
            }
        });
        let content = TopicContent::from_payload(&payload);
        assert_eq!(content.kind(), ContentKind::ImageOnly);
        assert_eq!(content.text(), None);
        assert_eq!(
            content.image_urls(),
            ["https://img/o.png".to_string(), "https://img/t2.png".to_string()]
        );
    }

    #[test]
    fn test_classify_unknown() {
        let payload = json!({"type": "task", "title": "Homework"});
        let content = TopicContent::from_payload(&payload);
        assert_eq!(content.kind(), ContentKind::Unknown);
        assert_eq!(content.title(), Some("Homework"));
        assert_eq!(content.author(), None);
    }

    #[test]
    fn test_summary_from_record() {
        let record = Record {
            id: "77".to_string(),
            created_at: "2024-03-01T09:15:42.123+0800".to_string(),
            payload: json!({
                "topic_id": 77,
                "talk": {"owner": {"name": "alice"}, "text": "hi"},
                "likes_count": 3,
                "comments_count": 1,
                "reading_count": 40
            }),
        };
        let summary = TopicSummary::from_record(&record);
        assert_eq!(summary.id, "77");
        assert_eq!(summary.kind, ContentKind::Talk);
        assert_eq!(summary.text, "hi");
        assert_eq!(summary.likes, 3);
        assert_eq!(summary.comments, 1);
        assert_eq!(summary.readers, 40);
    }
}
