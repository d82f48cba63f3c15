//! Markdown export
//!
//! This module renders processed summaries as a single readable Markdown
//! document, newest first, one section per topic.

use crate::output::OutputResult;
use crate::record::{parse_timestamp, TopicSummary};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the Markdown export of `summaries` to `output_path`
///
/// # Arguments
///
/// * `summaries` - Processed records, in crawl order
/// * `title` - Document heading
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown(
    summaries: &[TopicSummary],
    title: &str,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown(summaries, title);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats summaries as markdown
pub fn format_markdown(summaries: &[TopicSummary], title: &str) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", title));
    md.push_str(&format!("{} topics\n\n", summaries.len()));

    for summary in summaries {
        md.push_str(&format_section(summary));
    }

    md
}

fn format_section(summary: &TopicSummary) -> String {
    let mut md = String::new();

    let date = parse_timestamp(&summary.created_at)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| summary.created_at.clone());

    match &summary.title {
        Some(title) => md.push_str(&format!("## {} · {}\n\n", title, date)),
        None => md.push_str(&format!("## {} · {}\n\n", summary.kind.label(), date)),
    }

    if let Some(author) = &summary.author {
        md.push_str(&format!("- **Author**: {}\n", author));
    }
    md.push_str(&format!("- **Type**: {}\n", summary.kind.label()));
    md.push_str(&format!("- **ID**: {}\n", summary.id));
    if summary.image_count > 0 {
        md.push_str(&format!("- **Images**: {}\n", summary.image_count));
    }
    md.push_str(&format!(
        "- **Likes**: {} · **Comments**: {}\n\n",
        summary.likes, summary.comments
    ));

    if !summary.text.is_empty() {
        md.push_str(&summary.text);
        md.push_str("\n\n");
    }

    md.push_str("---\n\n");
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ContentKind;
    use tempfile::TempDir;

    fn summary() -> TopicSummary {
        TopicSummary {
            id: "42".to_string(),
            created_at: "2024-03-01T09:15:42.123+0800".to_string(),
            kind: ContentKind::Question,
            author: Some("carol".to_string()),
            title: None,
            text: "Q: why?\n\nA (dave): because".to_string(),
            image_count: 0,
            likes: 5,
            comments: 2,
            readers: 0,
        }
    }

    #[test]
    fn test_format_section() {
        let md = format_markdown(&[summary()], "Group Topics");

        assert!(md.starts_with("# Group Topics\n\n1 topics\n\n"));
        assert!(md.contains("## Q&A · 2024-03-01 09:15\n"));
        assert!(md.contains("- **Author**: carol\n"));
        assert!(md.contains("Q: why?\n\nA (dave): because\n\n---"));
        assert!(!md.contains("**Images**"));
    }

    #[test]
    fn test_title_overrides_kind_heading() {
        let mut article = summary();
        article.kind = ContentKind::Article;
        article.title = Some("Long read".to_string());

        let md = format_markdown(&[article], "T");
        assert!(md.contains("## Long read · 2024-03-01 09:15\n"));
    }

    #[test]
    fn test_generate_markdown_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export/topics.md");

        generate_markdown(&[summary()], "Topics", &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("carol"));
    }
}
