use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::ops::ReadError;

/// Extract paragraph text from a modern Word document (OOXML). A `.docx`
/// is a zip archive; the body lives in `word/document.xml`.
pub fn extract_text(bytes: &[u8]) -> Result<String, ReadError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ReadError::UnsupportedFormat(format!("not a valid .docx archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| {
            ReadError::UnsupportedFormat("missing word/document.xml; not a .docx file".into())
        })?
        .read_to_string(&mut xml)
        .map_err(|e| ReadError::UnsupportedFormat(format!("unreadable document body: {e}")))?;

    Ok(paragraph_text(&xml))
}

/// Collect the text runs (`w:t`) of each paragraph (`w:p`), one paragraph
/// per line. Styling and layout markup is dropped.
fn paragraph_text(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                if let Ok(text) = t.unescape() {
                    out.push_str(&text);
                }
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"br" => out.push('\n'),
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    fn docx_with_body(body_xml: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>{body_xml}</w:body>
</w:document>"#
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn extracts_paragraphs_one_per_line() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Second paragraph</w:t></w:r></w:p>",
        );
        let text = extract_text(&bytes).unwrap();
        assert_eq!(text, "Hello world\nSecond paragraph\n");
    }

    #[test]
    fn drops_styling_markup() {
        let bytes = docx_with_body(
            "<w:p><w:pPr><w:jc w:val=\"center\"/></w:pPr>\
             <w:r><w:rPr><w:b/></w:rPr><w:t>bold text</w:t></w:r></w:p>",
        );
        assert_eq!(extract_text(&bytes).unwrap(), "bold text\n");
    }

    #[test]
    fn rejects_non_zip_bytes() {
        let err = extract_text(b"this is not a zip archive").unwrap_err();
        assert!(matches!(err, ReadError::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_zip_without_document_xml() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("unrelated.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"nope").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = extract_text(&bytes).unwrap_err();
        assert!(matches!(err, ReadError::UnsupportedFormat(_)));
    }
}
