//! Plain-text chapter export.

use super::ExportChapter;

/// Title, `=` underline of the same width, blank line, paragraphs.
pub fn render_chapters_text(chapters: &[ExportChapter]) -> String {
    chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            let title = chapter.display_title(i);
            let underline = "=".repeat(title.chars().count());
            let mut block = format!("{title}\n{underline}\n");
            let paragraphs = chapter.paragraphs();
            if !paragraphs.is_empty() {
                block.push('\n');
                block.push_str(&paragraphs.join("\n\n"));
                block.push('\n');
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
