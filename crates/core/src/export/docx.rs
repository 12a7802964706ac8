//! Minimal DOCX (Office Open XML) writer.
//!
//! Produces the smallest package Word and LibreOffice open cleanly: content
//! types, package relationships, a style sheet with `Heading1`, and the main
//! document. Each chapter starts on a new page.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::ExportChapter;
use crate::error::CoreError;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="160"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="240"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style></w:styles>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_CLOSE: &str = "<w:sectPr/></w:body></w:document>";

const PAGE_BREAK: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;

/// Escape text for inclusion in an XML text node or attribute. Characters
/// XML 1.0 cannot represent are dropped.
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            // Not allowed in XML 1.0, even as character references.
            '\u{0}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

fn paragraph(text: &str, style: Option<&str>) -> String {
    let ppr = style
        .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{s}"/></w:pPr>"#))
        .unwrap_or_default();
    format!(
        r#"<w:p>{ppr}<w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        xml_escape(text)
    )
}

/// Build the `word/document.xml` body for the given chapters.
pub fn document_xml(chapters: &[ExportChapter]) -> String {
    let mut xml = String::from(DOCUMENT_OPEN);
    for (i, chapter) in chapters.iter().enumerate() {
        if i > 0 {
            xml.push_str(PAGE_BREAK);
        }
        xml.push_str(&paragraph(&chapter.display_title(i), Some("Heading1")));
        for line in chapter.paragraphs() {
            xml.push_str(&paragraph(line, None));
        }
    }
    xml.push_str(DOCUMENT_CLOSE);
    xml
}

/// Package chapters as a `.docx` file.
pub fn render_chapters_docx(chapters: &[ExportChapter]) -> Result<Vec<u8>, CoreError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, String); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", PACKAGE_RELS_XML.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
        ("word/styles.xml", STYLES_XML.to_string()),
        ("word/document.xml", document_xml(chapters)),
    ];

    for (name, body) in parts {
        zip.start_file(name, options)
            .map_err(|e| CoreError::Internal(format!("docx: cannot start {name}: {e}")))?;
        zip.write_all(body.as_bytes())
            .map_err(|e| CoreError::Internal(format!("docx: cannot write {name}: {e}")))?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| CoreError::Internal(format!("docx: cannot finish archive: {e}")))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(xml_escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn drops_characters_xml_cannot_carry() {
        assert_eq!(
            xml_escape("bell\u{7}\u{0}vt\u{B}ff\u{C}esc\u{1B}\u{FFFF}end"),
            "bellvtffescend"
        );
        assert_eq!(xml_escape("tab\tline\r\n林"), "tab\tline\r\n林");
    }

    #[test]
    fn document_has_heading_and_page_breaks() {
        let chapters = vec![
            ExportChapter {
                title: Some("One".into()),
                content: Some("Alpha\nBeta".into()),
            },
            ExportChapter {
                title: None,
                content: Some("Gamma".into()),
            },
        ];
        let xml = document_xml(&chapters);
        assert_eq!(xml.matches(r#"w:val="Heading1""#).count(), 2);
        assert_eq!(xml.matches(PAGE_BREAK).count(), 1);
        assert!(xml.contains(">Chapter 2<"));
        assert!(xml.contains(">Beta<"));
    }

    #[test]
    fn package_contains_required_parts() {
        let chapters = vec![ExportChapter {
            title: Some("Tom & Jerry".into()),
            content: Some("Line".into()),
        }];
        let bytes = render_chapters_docx(&chapters).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/document.xml",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing {part}");
        }

        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();
        assert!(document.contains("Tom &amp; Jerry"));
    }
}
