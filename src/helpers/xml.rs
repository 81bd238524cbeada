//! Thin layer over quick-xml used by the XLSX and ODS readers.

use crate::error::LdarError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Unknown XML entity '&{0};'")]
    UnknownEntity(String),

    #[error("Cannot parse attribute value '{0}'")]
    AttributeValue(String),
}

/// Pull reader that owns its event buffer.
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(source: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        // <c r="A1"/> must produce the same Start/End pair as <c r="A1"></c>
        config.expand_empty_elements = true;
        config.trim_text(false);

        XmlReader {
            reader,
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Next event, or `None` at end of document.
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, LdarError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer)? {
            Event::Eof => Ok(None),
            event => Ok(Some(event)),
        }
    }
}

pub(crate) trait XmlAttributeHelper<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, LdarError>;

    fn parse_value<T: FromStr>(&self) -> Result<T, LdarError>;
}

impl<'a> XmlAttributeHelper<'a> for Attribute<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, LdarError> {
        Ok(self.unescape_value()?)
    }

    fn parse_value<T: FromStr>(&self) -> Result<T, LdarError> {
        let value = self.get_value()?;
        value
            .parse()
            .map_err(|_| XmlError::AttributeValue(value.to_string()).into())
    }
}

pub(crate) trait XmlNodeHelper<'a> {
    /// Unescaped value of the named attribute, if present.
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, LdarError>;

    fn parse_attribute_value<T: FromStr>(&self, name: &str) -> Result<Option<T>, LdarError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, LdarError> {
        self.try_get_attribute(name)?
            .map(|attribute| attribute.get_value())
            .transpose()
    }

    fn parse_attribute_value<T: FromStr>(&self, name: &str) -> Result<Option<T>, LdarError> {
        self.try_get_attribute(name)?
            .map(|attribute| attribute.parse_value())
            .transpose()
    }
}

/// Accumulates character data from text events into a `String`.
pub(crate) trait XmlTextContextHelper {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), LdarError>;

    /// Resolves `&amp;`-style entities and `&#...;` character references.
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), LdarError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), LdarError> {
        self.push_str(&text.xml_content()?);
        Ok(())
    }

    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), LdarError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16)?,
                None => number.parse::<u32>()?,
            };
            if let Some(character) = char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::UnknownEntity(raw.to_string()))?;
        }
        Ok(())
    }
}

/// Drives an [`XmlReader`] to the end of the document, dispatching each event
/// to the given match arms. Unmatched events are ignored; `break` stops early.
#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(event) = $reader.next()? {
            match event {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::name::QName;

    fn collect_text(xml: &str) -> Result<String, LdarError> {
        let mut reader = XmlReader::new(xml.as_bytes());
        let mut text = String::new();
        match_xml_events!(reader => {
            Event::Text(event) => text.push_bytes_text(&event)?,
            Event::GeneralRef(event) => text.push_bytes_ref(&event)?,
        });
        Ok(text)
    }

    #[test]
    fn resolves_entities_and_character_references() {
        let text = collect_text("<t>A&amp;B &#65;&#x42; &lt;ok&gt;</t>").unwrap();
        assert_eq!(text, "A&B AB <ok>");
    }

    #[test]
    fn rejects_unknown_entities() {
        let error = collect_text("<t>&nope;</t>").unwrap_err();
        assert!(matches!(error, LdarError::XmlHelperError(XmlError::UnknownEntity(_))));
    }

    #[test]
    fn reads_and_parses_attributes() -> Result<(), LdarError> {
        let mut reader = XmlReader::new(r#"<row r="12" t="s&amp;x"/>"#.as_bytes());
        let mut seen = false;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == QName(b"row") => {
                assert_eq!(event.parse_attribute_value::<usize>("r").unwrap(), Some(12));
                assert_eq!(event.get_attribute_value("t").unwrap().as_deref(), Some("s&x"));
                assert_eq!(event.get_attribute_value("missing").unwrap(), None);
                assert!(event.parse_attribute_value::<usize>("t").is_err());
                seen = true;
            }
        });
        assert!(seen);
        Ok(())
    }
}
