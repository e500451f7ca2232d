use std::fs;
use std::io::Read;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use flate2::read::DeflateDecoder;
use quick_xml::events::{BytesDecl, Event};
use quick_xml::{Reader, Writer};

use super::DiagramInflater;
use crate::error::{MigrationError, Result};

fn xml_error(e: impl std::fmt::Display) -> MigrationError {
    MigrationError::Xml(e.to_string())
}

/// Inflates draw.io `mxfile` attachments into editable XML
#[derive(Debug, Default, Clone, Copy)]
pub struct DrawioInflater;

impl DiagramInflater for DrawioInflater {
    fn inflate(&self, source: &Path) -> Result<String> {
        let mxfile = fs::read_to_string(source)?;
        inflate_mxfile(&mxfile)
    }
}

/// Reverse draw.io's diagram compression: base64, raw deflate, then URL encoding.
pub fn inflate_payload(encoded: &str) -> Result<String> {
    let compact: String = encoded.split_whitespace().collect();
    let compressed = BASE64.decode(compact.as_bytes())?;

    let mut decoder = DeflateDecoder::new(&compressed[..]);
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated)?;

    let text = String::from_utf8(inflated)
        .map_err(|e| MigrationError::InvalidDiagram(format!("inflated data is not UTF-8: {}", e)))?;
    let decoded = urlencoding::decode(&text)
        .map_err(|e| MigrationError::InvalidDiagram(format!("bad URL encoding: {}", e)))?;
    Ok(decoded.into_owned())
}

/// Extract and pretty-print the first diagram of an `mxfile` document.
///
/// Handles both the compressed form (text payload inside `<diagram>`) and
/// the plain form (an `<mxGraphModel>` element inside `<diagram>`).
pub fn inflate_mxfile(mxfile: &str) -> Result<String> {
    let mut reader = Reader::from_str(mxfile);
    reader.config_mut().trim_text(true);
    let mut in_diagram = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if e.name().as_ref() == b"diagram" => in_diagram = true,
            Event::Text(e) if in_diagram => {
                let payload = e.unescape().map_err(xml_error)?;
                return pretty_print_xml(&inflate_payload(&payload)?);
            }
            Event::CData(e) if in_diagram => {
                let payload = String::from_utf8_lossy(&e).to_string();
                return pretty_print_xml(&inflate_payload(&payload)?);
            }
            Event::Start(e) if in_diagram => {
                let mut writer = Writer::new_with_indent(Vec::new(), b' ', 3);
                writer
                    .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
                    .map_err(xml_error)?;
                writer.write_event(Event::Start(e)).map_err(xml_error)?;
                let mut depth = 1usize;
                while depth > 0 {
                    let event = reader.read_event().map_err(xml_error)?;
                    match &event {
                        Event::Start(_) => depth += 1,
                        Event::End(_) => depth -= 1,
                        Event::Eof => {
                            return Err(MigrationError::InvalidDiagram(
                                "unterminated diagram model".to_string(),
                            ))
                        }
                        _ => {}
                    }
                    writer.write_event(event).map_err(xml_error)?;
                }
                return String::from_utf8(writer.into_inner()).map_err(xml_error);
            }
            Event::Empty(e) if in_diagram => {
                let mut writer = Writer::new_with_indent(Vec::new(), b' ', 3);
                writer
                    .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
                    .map_err(xml_error)?;
                writer.write_event(Event::Empty(e)).map_err(xml_error)?;
                return String::from_utf8(writer.into_inner()).map_err(xml_error);
            }
            Event::End(e) if e.name().as_ref() == b"diagram" => {
                return Err(MigrationError::InvalidDiagram("empty <diagram> element".to_string()));
            }
            Event::Eof => {
                return Err(MigrationError::InvalidDiagram("no <diagram> element".to_string()));
            }
            _ => {}
        }
    }
}

/// Re-indent an XML document with three spaces and an XML declaration
pub fn pretty_print_xml(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 3);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
        .map_err(xml_error)?;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Eof => break,
            Event::Decl(_) => {}
            event => writer.write_event(event).map_err(xml_error)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

/// Encode the way draw.io does: URL-encode, raw deflate, base64
#[cfg(test)]
pub(crate) fn compress(xml: &str) -> String {
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    let encoded = urlencoding::encode(xml);
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(encoded.as_bytes()).unwrap();
    BASE64.encode(encoder.finish().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"<mxGraphModel><root><mxCell id="0"/><mxCell id="1" parent="0"/></root></mxGraphModel>"#;

    #[test]
    fn test_inflate_payload() {
        assert_eq!(inflate_payload(&compress(MODEL)).unwrap(), MODEL);
    }

    #[test]
    fn test_inflate_compressed_mxfile() {
        let mxfile = format!(
            r#"<mxfile host="Confluence"><diagram id="abc" name="Page-1">{}</diagram></mxfile>"#,
            compress(MODEL)
        );
        let xml = inflate_mxfile(&mxfile).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\"?>"));
        assert!(xml.contains("\n   <root>"));
        assert!(xml.contains(r#"<mxCell id="1" parent="0"/>"#));
    }

    #[test]
    fn test_inflate_plain_mxfile() {
        let mxfile = format!(r#"<mxfile><diagram id="abc">{}</diagram></mxfile>"#, MODEL);
        let xml = inflate_mxfile(&mxfile).unwrap();

        assert!(xml.contains("<mxGraphModel>"));
        assert!(xml.contains("</mxGraphModel>"));
        assert!(xml.contains(r#"<mxCell id="0"/>"#));
    }

    #[test]
    fn test_missing_diagram() {
        assert!(matches!(
            inflate_mxfile("<mxfile></mxfile>"),
            Err(MigrationError::InvalidDiagram(_))
        ));
        assert!(matches!(
            inflate_mxfile(r#"<mxfile><diagram id="x"></diagram></mxfile>"#),
            Err(MigrationError::InvalidDiagram(_))
        ));
    }

    #[test]
    fn test_bad_base64() {
        assert!(matches!(inflate_payload("not base64!"), Err(MigrationError::Base64(_))));
    }
}
