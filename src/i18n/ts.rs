//! Catalog file format (Qt Linguist TS XML).
//!
//! `parse` reads a document into a [`Catalog`], `write` produces the layout
//! used by the translation tooling that maintains the shipped catalogs, so a
//! parse/write cycle over an untouched file reproduces it byte for byte.

use crate::i18n::{Catalog, Context, Location, Message, Translation, TranslationState};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading a catalog document.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        position: u64,
        source: quick_xml::Error,
    },

    #[error("expected <TS> root element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("document has no <TS> root element")]
    MissingRoot,

    #[error("message '{key}' at byte {position} has no <source>")]
    MissingSource { key: String, position: u64 },

    #[error("unknown translation type '{value}' at byte {position}")]
    UnknownState { value: String, position: u64 },

    #[error("document ended inside <{0}>")]
    UnexpectedEof(&'static str),
}

type XmlReader<'a> = Reader<&'a [u8]>;

/// Parse a catalog document.
pub fn parse(input: &str) -> Result<Catalog, CatalogError> {
    let mut reader = Reader::from_str(input);

    loop {
        match reader.read_event().map_err(|e| xml_error(&reader, e))? {
            Event::Start(e) => {
                let mut catalog = parse_header(&reader, &e)?;
                parse_body(&mut reader, &mut catalog)?;
                debug!(
                    "Parsed catalog '{}' with {} messages",
                    catalog.language,
                    catalog.len()
                );
                return Ok(catalog);
            }
            Event::Empty(e) => return parse_header(&reader, &e),
            Event::Eof => return Err(CatalogError::MissingRoot),
            // Declaration, doctype, comments and whitespace
            _ => {}
        }
    }
}

fn parse_header(reader: &XmlReader<'_>, e: &BytesStart<'_>) -> Result<Catalog, CatalogError> {
    if e.name().as_ref() != b"TS" {
        return Err(CatalogError::UnexpectedRoot(
            String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        ));
    }

    let mut catalog = Catalog::new(&attribute(reader, e, b"language")?.unwrap_or_default());
    if let Some(version) = attribute(reader, e, b"version")? {
        catalog.version = version;
    }
    catalog.source_language = attribute(reader, e, b"sourcelanguage")?;
    Ok(catalog)
}

fn parse_body(reader: &mut XmlReader<'_>, catalog: &mut Catalog) -> Result<(), CatalogError> {
    loop {
        match reader.read_event().map_err(|e| xml_error(reader, e))? {
            Event::Start(e) if e.name().as_ref() == b"context" => {
                let context = parse_context(reader)?;
                catalog.contexts.push(context);
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(CatalogError::UnexpectedEof("TS")),
            _ => {}
        }
    }
}

fn parse_context(reader: &mut XmlReader<'_>) -> Result<Context, CatalogError> {
    let mut context = Context::default();

    loop {
        match reader.read_event().map_err(|e| xml_error(reader, e))? {
            Event::Start(e) => match e.name().as_ref() {
                b"name" => context.name = read_text(reader, "name")?,
                b"message" => {
                    let message = parse_message(reader, &e)?;
                    context.messages.push(message);
                }
                _ => skip_element(reader, &e)?,
            },
            Event::End(_) => return Ok(context),
            Event::Eof => return Err(CatalogError::UnexpectedEof("context")),
            _ => {}
        }
    }
}

fn parse_message(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
) -> Result<Message, CatalogError> {
    let position = reader.buffer_position() as u64;
    let id = attribute(reader, start, b"id")?;
    let numerus = attribute(reader, start, b"numerus")?.as_deref() == Some("yes");

    let mut message = Message {
        id,
        numerus,
        ..Default::default()
    };
    let mut source = None;

    loop {
        match reader.read_event().map_err(|e| xml_error(reader, e))? {
            Event::Start(e) => match e.name().as_ref() {
                b"source" => source = Some(read_text(reader, "source")?),
                b"comment" => message.comment = Some(read_text(reader, "comment")?),
                b"extracomment" => {
                    message.extracomment = Some(read_text(reader, "extracomment")?)
                }
                b"translatorcomment" => {
                    message.translatorcomment = Some(read_text(reader, "translatorcomment")?)
                }
                b"translation" => {
                    message.state = translation_state(reader, &e)?;
                    message.translation = read_translation(reader, numerus)?;
                }
                b"location" => {
                    message.locations.push(parse_location(reader, &e)?);
                    skip_element(reader, &e)?;
                }
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"location" => message.locations.push(parse_location(reader, &e)?),
                b"source" => source = Some(String::new()),
                b"translation" => {
                    message.state = translation_state(reader, &e)?;
                    message.translation = if numerus {
                        Translation::Plural(Vec::new())
                    } else {
                        Translation::Text(String::new())
                    };
                }
                other => debug!(
                    "Ignoring empty <{}> in message",
                    String::from_utf8_lossy(other)
                ),
            },
            Event::End(_) => break,
            Event::Eof => return Err(CatalogError::UnexpectedEof("message")),
            _ => {}
        }
    }

    match source {
        Some(source) => {
            message.source = source;
            Ok(message)
        }
        None => Err(CatalogError::MissingSource {
            key: message.id.unwrap_or_default(),
            position,
        }),
    }
}

fn parse_location(
    reader: &XmlReader<'_>,
    e: &BytesStart<'_>,
) -> Result<Location, CatalogError> {
    Ok(Location {
        filename: attribute(reader, e, b"filename")?,
        line: attribute(reader, e, b"line")?,
    })
}

fn translation_state(
    reader: &XmlReader<'_>,
    e: &BytesStart<'_>,
) -> Result<TranslationState, CatalogError> {
    match attribute(reader, e, b"type")? {
        None => Ok(TranslationState::Finished),
        Some(value) => {
            TranslationState::from_attr(&value).ok_or_else(|| CatalogError::UnknownState {
                value,
                position: reader.buffer_position() as u64,
            })
        }
    }
}

fn read_translation(
    reader: &mut XmlReader<'_>,
    numerus: bool,
) -> Result<Translation, CatalogError> {
    let mut text = String::new();
    let mut forms = Vec::new();

    loop {
        match reader.read_event().map_err(|e| xml_error(reader, e))? {
            Event::Text(t) if !numerus => {
                text.push_str(&t.unescape().map_err(|e| xml_error(reader, e))?)
            }
            Event::CData(c) if !numerus => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Start(e) => match e.name().as_ref() {
                b"numerusform" => forms.push(read_text(reader, "numerusform")?),
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.name().as_ref() == b"numerusform" => forms.push(String::new()),
            Event::End(_) => break,
            Event::Eof => return Err(CatalogError::UnexpectedEof("translation")),
            _ => {}
        }
    }

    if numerus {
        Ok(Translation::Plural(forms))
    } else {
        Ok(Translation::Text(text))
    }
}

/// Collect the text content of a leaf element up to its end tag.
fn read_text(reader: &mut XmlReader<'_>, element: &'static str) -> Result<String, CatalogError> {
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(|e| xml_error(reader, e))? {
            Event::Text(t) => text.push_str(&t.unescape().map_err(|e| xml_error(reader, e))?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(_) => return Ok(text),
            Event::Eof => return Err(CatalogError::UnexpectedEof(element)),
            _ => {}
        }
    }
}

fn skip_element(reader: &mut XmlReader<'_>, e: &BytesStart<'_>) -> Result<(), CatalogError> {
    debug!("Skipping <{}>", String::from_utf8_lossy(e.name().as_ref()));
    reader
        .read_to_end(e.name())
        .map_err(|err| xml_error(reader, err))?;
    Ok(())
}

fn attribute(
    reader: &XmlReader<'_>,
    e: &BytesStart<'_>,
    name: &[u8],
) -> Result<Option<String>, CatalogError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(reader, err))?;
        if attr.key.as_ref() == name {
            let value = attr.unescape_value().map_err(|err| xml_error(reader, err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn xml_error(reader: &XmlReader<'_>, err: impl Into<quick_xml::Error>) -> CatalogError {
    CatalogError::Xml {
        position: reader.buffer_position() as u64,
        source: err.into(),
    }
}

// ==================== Writer ====================

/// Serialize a catalog in the canonical layout.
pub fn write(catalog: &Catalog) -> String {
    let mut out = String::with_capacity(128 + catalog.len() * 256);

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<!DOCTYPE TS>\n");
    out.push_str(&format!(
        "<TS version=\"{}\" language=\"{}\"",
        escape(&catalog.version),
        escape(&catalog.language)
    ));
    if let Some(source_language) = &catalog.source_language {
        out.push_str(&format!(" sourcelanguage=\"{}\"", escape(source_language)));
    }
    out.push_str(">\n");

    for context in &catalog.contexts {
        out.push_str("<context>\n");
        out.push_str(&format!("    <name>{}</name>\n", escape(&context.name)));
        for message in &context.messages {
            write_message(&mut out, message);
        }
        out.push_str("</context>\n");
    }

    out.push_str("</TS>\n");
    out
}

fn write_message(out: &mut String, message: &Message) {
    out.push_str("    <message");
    if let Some(id) = &message.id {
        out.push_str(&format!(" id=\"{}\"", escape(id)));
    }
    if message.numerus {
        out.push_str(" numerus=\"yes\"");
    }
    out.push_str(">\n");

    for location in &message.locations {
        out.push_str("        <location");
        if let Some(filename) = &location.filename {
            out.push_str(&format!(" filename=\"{}\"", escape(filename)));
        }
        if let Some(line) = &location.line {
            out.push_str(&format!(" line=\"{}\"", escape(line)));
        }
        out.push_str("/>\n");
    }

    write_leaf(out, "source", Some(&message.source));
    write_leaf(out, "comment", message.comment.as_deref());
    write_leaf(out, "extracomment", message.extracomment.as_deref());
    write_leaf(out, "translatorcomment", message.translatorcomment.as_deref());

    let state = match message.state.as_attr() {
        Some(value) => format!(" type=\"{}\"", value),
        None => String::new(),
    };
    match &message.translation {
        Translation::Missing => {}
        Translation::Text(text) => out.push_str(&format!(
            "        <translation{}>{}</translation>\n",
            state,
            escape(text)
        )),
        Translation::Plural(forms) => {
            out.push_str(&format!("        <translation{}>\n", state));
            for form in forms {
                out.push_str(&format!(
                    "            <numerusform>{}</numerusform>\n",
                    escape(form)
                ));
            }
            out.push_str("        </translation>\n");
        }
    }

    out.push_str("    </message>\n");
}

fn write_leaf(out: &mut String, element: &str, text: Option<&str>) {
    if let Some(text) = text {
        out.push_str(&format!(
            "        <{element}>{}</{element}>\n",
            escape(text)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="sv">
<context>
    <name></name>
    <message id="mybackup-app_name">
        <source>My Backup</source>
        <extracomment>Application title</extracomment>
        <translation>My Backup</translation>
    </message>
    <message id="mybackup-main_page-description">
        <source>To be added to the backup</source>
        <extracomment>Main page description</extracomment>
        <translation type="unfinished">Att läggas till i säkerhetskopian</translation>
    </message>
</context>
</TS>
"#;

    // ==================== Parser Tests ====================

    #[test]
    fn test_parse_header() {
        let catalog = parse(SAMPLE).expect("Should parse");
        assert_eq!(catalog.version, "2.1");
        assert_eq!(catalog.language, "sv");
        assert!(catalog.source_language.is_none());
        assert_eq!(catalog.contexts.len(), 1);
        assert_eq!(catalog.contexts[0].name, "");
    }

    #[test]
    fn test_parse_messages() {
        let catalog = parse(SAMPLE).expect("Should parse");
        assert_eq!(catalog.len(), 2);

        let name = catalog.get("mybackup-app_name").unwrap();
        assert_eq!(name.source, "My Backup");
        assert_eq!(name.extracomment.as_deref(), Some("Application title"));
        assert_eq!(name.translation, Translation::Text("My Backup".to_string()));
        assert_eq!(name.state, TranslationState::Finished);
    }

    #[test]
    fn test_parse_unfinished_marker() {
        let catalog = parse(SAMPLE).expect("Should parse");
        let msg = catalog.get("mybackup-main_page-description").unwrap();
        assert_eq!(msg.state, TranslationState::Unfinished);
        assert_eq!(msg.translation.text(), Some("Att läggas till i säkerhetskopian"));
    }

    #[test]
    fn test_parse_entities() {
        let doc = r#"<TS version="2.1" language="en"><context><name></name>
            <message id="x"><source>Foil &amp; Pics &lt;3&gt;</source>
            <translation>&quot;Foil&quot; &amp; &apos;Pics&apos;</translation></message>
            </context></TS>"#;
        let catalog = parse(doc).expect("Should parse");
        let msg = catalog.get("x").unwrap();
        assert_eq!(msg.source, "Foil & Pics <3>");
        assert_eq!(msg.translation.text(), Some("\"Foil\" & 'Pics'"));
    }

    #[test]
    fn test_parse_preserves_surrounding_whitespace_in_text() {
        let doc = r#"<TS version="2.1" language="en"><context><name></name>
            <message id="x"><source> padded </source><translation> padded </translation></message>
            </context></TS>"#;
        let catalog = parse(doc).expect("Should parse");
        assert_eq!(catalog.get("x").unwrap().source, " padded ");
    }

    #[test]
    fn test_parse_missing_translation_element() {
        let doc = r#"<TS version="2.1" language="en"><context><name></name>
            <message id="x"><source>Remove</source></message>
            </context></TS>"#;
        let catalog = parse(doc).expect("Should parse");
        assert_eq!(catalog.get("x").unwrap().translation, Translation::Missing);
    }

    #[test]
    fn test_parse_empty_translation_element() {
        let doc = r#"<TS version="2.1" language="ru"><context><name/>
            <message id="x"><source>Remove</source><translation type="unfinished"/></message>
            </context></TS>"#;
        let catalog = parse(doc).expect("Should parse");
        let msg = catalog.get("x").unwrap();
        assert_eq!(msg.translation, Translation::Text(String::new()));
        assert_eq!(msg.state, TranslationState::Unfinished);
    }

    #[test]
    fn test_parse_numerus_and_locations() {
        let doc = r#"<TS version="2.1" language="pl" sourcelanguage="en">
<context>
    <name>BackupPage</name>
    <message id="mybackup-files" numerus="yes">
        <location filename="../qml/BackupPage.qml" line="42"/>
        <source>%n file(s)</source>
        <comment>count</comment>
        <translatorcomment>three forms</translatorcomment>
        <translation>
            <numerusform>%n plik</numerusform>
            <numerusform>%n pliki</numerusform>
            <numerusform>%n plików</numerusform>
        </translation>
    </message>
</context>
</TS>"#;
        let catalog = parse(doc).expect("Should parse");
        assert_eq!(catalog.source_language.as_deref(), Some("en"));
        assert_eq!(catalog.contexts[0].name, "BackupPage");

        let msg = catalog.get("mybackup-files").unwrap();
        assert!(msg.numerus);
        assert_eq!(msg.comment.as_deref(), Some("count"));
        assert_eq!(msg.translatorcomment.as_deref(), Some("three forms"));
        assert_eq!(
            msg.locations,
            vec![Location {
                filename: Some("../qml/BackupPage.qml".to_string()),
                line: Some("42".to_string()),
            }]
        );
        assert_eq!(
            msg.translation,
            Translation::Plural(vec![
                "%n plik".to_string(),
                "%n pliki".to_string(),
                "%n plików".to_string(),
            ])
        );
    }

    #[test]
    fn test_parse_skips_unknown_elements() {
        let doc = r#"<TS version="2.1" language="en"><dependencies><dependency catalog="qt"/></dependencies>
            <context><name></name>
            <message id="x"><source>File</source><oldsource>Old <b>file</b></oldsource><translation>File</translation></message>
            </context></TS>"#;
        let catalog = parse(doc).expect("Should parse");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("x").unwrap().translation.text(), Some("File"));
    }

    #[test]
    fn test_parse_message_without_id_keyed_by_source() {
        let doc = r#"<TS version="2.1" language="en"><context><name>Main</name>
            <message><source>Remove</source><translation>Remove</translation></message>
            </context></TS>"#;
        let catalog = parse(doc).expect("Should parse");
        let msg = catalog.get("Remove").unwrap();
        assert!(msg.id.is_none());
    }

    // ==================== Parser Error Tests ====================

    #[test]
    fn test_parse_wrong_root() {
        let err = parse("<xliff version=\"1.2\"></xliff>").unwrap_err();
        assert!(matches!(err, CatalogError::UnexpectedRoot(ref name) if name == "xliff"));
    }

    #[test]
    fn test_parse_no_root() {
        let err = parse("<?xml version=\"1.0\"?>\n").unwrap_err();
        assert!(matches!(err, CatalogError::MissingRoot));
    }

    #[test]
    fn test_parse_missing_source() {
        let doc = r#"<TS version="2.1" language="en"><context><name></name>
            <message id="mybackup-menu-remove"><translation>Remove</translation></message>
            </context></TS>"#;
        let err = parse(doc).unwrap_err();
        assert!(
            matches!(err, CatalogError::MissingSource { ref key, .. } if key == "mybackup-menu-remove")
        );
    }

    #[test]
    fn test_parse_unknown_state() {
        let doc = r#"<TS version="2.1" language="en"><context><name></name>
            <message id="x"><source>a</source><translation type="done">a</translation></message>
            </context></TS>"#;
        let err = parse(doc).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownState { ref value, .. } if value == "done"));
    }

    #[test]
    fn test_parse_mismatched_tags() {
        let doc = r#"<TS version="2.1" language="en"><context><name></name>
            <message id="x"><source>a</translation></message></context></TS>"#;
        let err = parse(doc).unwrap_err();
        assert!(matches!(err, CatalogError::Xml { .. }));
    }

    #[test]
    fn test_parse_truncated_document() {
        let doc = r#"<TS version="2.1" language="en"><context><name></name>
            <message id="x"><source>a</source>"#;
        assert!(parse(doc).is_err());
    }

    // ==================== Writer Tests ====================

    #[test]
    fn test_write_reproduces_input() {
        let catalog = parse(SAMPLE).expect("Should parse");
        assert_eq!(write(&catalog), SAMPLE);
    }

    #[test]
    fn test_write_escapes_text() {
        let mut catalog = Catalog::new("en");
        catalog.push("", Message::new("x", "Foil & <Pics>", "\"quoted\""));

        let out = write(&catalog);
        assert!(out.contains("<source>Foil &amp; &lt;Pics&gt;</source>"));
        assert!(out.contains("<translation>&quot;quoted&quot;</translation>"));
    }

    #[test]
    fn test_write_omits_missing_translation() {
        let mut catalog = Catalog::new("en");
        let mut msg = Message::new("x", "File", "");
        msg.translation = Translation::Missing;
        catalog.push("", msg);

        let out = write(&catalog);
        assert!(!out.contains("<translation"));
        assert_eq!(parse(&out).unwrap(), catalog);
    }

    #[test]
    fn test_write_plural_round_trip() {
        let mut catalog = Catalog::new("ru");
        catalog.source_language = Some("en".to_string());
        let mut msg = Message::new("mybackup-files", "%n file(s)", "")
            .with_state(TranslationState::Unfinished);
        msg.numerus = true;
        msg.locations.push(Location {
            filename: None,
            line: Some("+3".to_string()),
        });
        msg.translation = Translation::Plural(vec![
            "%n файл".to_string(),
            "%n файла".to_string(),
            "%n файлов".to_string(),
        ]);
        catalog.push("BackupPage", msg);

        let out = write(&catalog);
        assert!(out.contains("<message id=\"mybackup-files\" numerus=\"yes\">"));
        assert!(out.contains("<location line=\"+3\"/>"));
        assert!(out.contains("<translation type=\"unfinished\">\n"));
        assert_eq!(parse(&out).unwrap(), catalog);
    }
}
