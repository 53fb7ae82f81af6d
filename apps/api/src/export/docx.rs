//! Word (.docx) rendering with docx-rs.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run, Style, StyleType};

use crate::export::{classify_line, strip_inline_markup, Block, ExportError};

/// Paragraph style ids for `# ` and `## `, with their display names and
/// sizes in half-points.
const HEADING_STYLES: [(&str, &str, usize); 2] =
    [("Heading1", "Heading 1", 32), ("Heading2", "Heading 2", 28)];
const BODY_SIZE: usize = 22;

/// `# ` and `## ` become Heading 1 / Heading 2 paragraphs, blank lines become
/// empty paragraphs, everything else is a body paragraph.
pub fn to_docx(text: &str) -> Result<Vec<u8>, ExportError> {
    let mut docx = HEADING_STYLES
        .iter()
        .fold(Docx::new(), |docx, &(id, name, size)| {
            docx.add_style(
                Style::new(id, StyleType::Paragraph)
                    .name(name)
                    .bold()
                    .size(size),
            )
        });

    for line in text.lines() {
        let paragraph = match classify_line(line) {
            Block::Blank => Paragraph::new(),
            Block::Heading(level, heading) => {
                let (style_id, _, _) = HEADING_STYLES[usize::from(level.clamp(1, 2)) - 1];
                Paragraph::new()
                    .style(style_id)
                    .add_run(Run::new().add_text(strip_inline_markup(heading)))
            }
            Block::Text(body) => Paragraph::new().add_run(
                Run::new()
                    .add_text(strip_inline_markup(body))
                    .size(BODY_SIZE),
            ),
        };
        docx = docx.add_paragraph(paragraph);
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn document_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_docx_is_a_zip_package() {
        let bytes = to_docx("# Jane Wanjiku\n\n## Experience\n- **Grew** sales 20%").unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 100);
    }

    #[test]
    fn test_headings_use_heading_paragraph_styles() {
        let bytes =
            to_docx("# Jane Wanjiku\n\n## Experience\n### KCB Bank\n- **Grew** sales 20%")
                .unwrap();
        let xml = document_xml(&bytes);

        assert_eq!(xml.matches(r#"w:pStyle w:val="Heading1""#).count(), 1);
        assert_eq!(xml.matches(r#"w:pStyle w:val="Heading2""#).count(), 1);
        assert!(!xml.contains("Heading3"));
        assert!(xml.contains("Jane Wanjiku"));
        assert!(xml.contains("Experience"));
        assert!(xml.contains("### KCB Bank"));
        assert!(xml.contains("- Grew sales 20%"));
    }

    #[test]
    fn test_heading_styles_are_registered() {
        let bytes = to_docx("# Jane Wanjiku").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut styles = String::new();
        archive
            .by_name("word/styles.xml")
            .unwrap()
            .read_to_string(&mut styles)
            .unwrap();

        assert!(styles.contains(r#"w:styleId="Heading1""#));
        assert!(styles.contains(r#"w:val="Heading 1""#));
        assert!(styles.contains(r#"w:styleId="Heading2""#));
    }

    #[test]
    fn test_empty_text_still_renders() {
        let bytes = to_docx("").unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
