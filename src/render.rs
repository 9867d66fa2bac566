//! Response renderer
//!
//! Serialises engine responses to OAI-PMH 2.0 XML.
//!
//! ## Document Shape
//! ```text
//! <OAI-PMH>
//!   <responseDate/>
//!   <request verb=".." ...>base url</request>
//!   <Verb> ... </Verb>            or   <error code="..">detail</error>
//! </OAI-PMH>
//! ```

use std::fmt::Display;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::dates::format_datestamp;
use crate::error::{GateError, Result};
use crate::protocol::{ErrorKind, ListResult, Payload, Response, PROTOCOL_VERSION};
use crate::translate::{MetadataRecord, OAI_DC};

const PMH_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";
const PMH_SCHEMA_LOCATION: &str =
    "http://www.openarchives.org/OAI/2.0/ http://www.openarchives.org/OAI/2.0/OAI-PMH.xsd";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

fn xml_error(e: impl Display) -> GateError {
    GateError::Serialization(format!("xml: {e}"))
}

/// Render a response as an XML document
pub fn render(response: &Response, base_url: &str) -> Result<String> {
    let mut out = XmlOut::new();

    out.decl()?;
    out.start(
        "OAI-PMH",
        &[
            ("xmlns", PMH_NAMESPACE),
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:schemaLocation", PMH_SCHEMA_LOCATION),
        ],
    )?;
    out.text_element("responseDate", &format_datestamp(&response.response_date))?;
    write_request(&mut out, response, base_url)?;

    match &response.outcome {
        Ok(payload) => write_payload(&mut out, payload, base_url)?,
        Err(err) => out.text_element_with("error", &[("code", err.kind.code())], &err.detail)?,
    }

    out.end("OAI-PMH")?;
    out.finish()
}

/// The `request` element echoes verb and arguments, except when they were
/// the problem
///
/// A ListMetadataFormats identifier is echoed in its OAI form.
fn write_request(out: &mut XmlOut, response: &Response, base_url: &str) -> Result<()> {
    let echo = match &response.outcome {
        Err(err) => !matches!(err.kind, ErrorKind::BadVerb | ErrorKind::BadArgument),
        Ok(_) => true,
    };
    let oai_identifier = match &response.outcome {
        Ok(Payload::ListMetadataFormats {
            identifier: Some(id), ..
        }) => Some(id.as_str()),
        _ => None,
    };

    let mut attrs: Vec<(&str, &str)> = Vec::new();
    if echo {
        if let Some(verb) = response.request.verb() {
            attrs.push(("verb", verb.as_str()));
            let legal = verb.legal_arguments();
            attrs.extend(
                response
                    .request
                    .params()
                    .iter()
                    .filter(|(k, _)| legal.contains(&k.as_str()))
                    .map(|(k, v)| match (k.as_str(), oai_identifier) {
                        ("identifier", Some(id)) => ("identifier", id),
                        (name, _) => (name, v.as_str()),
                    }),
            );
        }
    }

    out.text_element_with("request", &attrs, base_url)
}

fn write_payload(out: &mut XmlOut, payload: &Payload, base_url: &str) -> Result<()> {
    match payload {
        Payload::Identify(info) => {
            out.start("Identify", &[])?;
            out.text_element("repositoryName", &info.repository_name)?;
            out.text_element("baseURL", base_url)?;
            out.text_element("protocolVersion", PROTOCOL_VERSION)?;
            out.text_element("adminEmail", &info.admin_email)?;
            out.text_element("earliestDatestamp", &format_datestamp(&info.earliest_datestamp))?;
            out.text_element("deletedRecord", info.deleted_record)?;
            out.text_element("granularity", info.granularity)?;
            out.end("Identify")
        }
        Payload::ListMetadataFormats { formats, .. } => {
            out.start("ListMetadataFormats", &[])?;
            for format in formats {
                out.start("metadataFormat", &[])?;
                out.text_element("metadataPrefix", format.prefix)?;
                out.text_element("schema", format.schema)?;
                out.text_element("metadataNamespace", format.namespace)?;
                out.end("metadataFormat")?;
            }
            out.end("ListMetadataFormats")
        }
        Payload::ListSets => out.empty("ListSets", &[]),
        Payload::ListIdentifiers(list) => {
            out.start("ListIdentifiers", &[])?;
            for record in &list.records {
                write_header(out, record)?;
            }
            write_resumption(out, list)?;
            out.end("ListIdentifiers")
        }
        Payload::ListRecords(list) => {
            out.start("ListRecords", &[])?;
            for record in &list.records {
                write_record(out, record)?;
            }
            write_resumption(out, list)?;
            out.end("ListRecords")
        }
        Payload::GetRecord(record) => {
            out.start("GetRecord", &[])?;
            write_record(out, record)?;
            out.end("GetRecord")
        }
    }
}

fn write_header(out: &mut XmlOut, record: &MetadataRecord) -> Result<()> {
    out.start("header", &[])?;
    out.text_element("identifier", &record.identifier)?;
    out.text_element("datestamp", &format_datestamp(&record.datestamp))?;
    out.end("header")
}

fn write_record(out: &mut XmlOut, record: &MetadataRecord) -> Result<()> {
    out.start("record", &[])?;
    write_header(out, record)?;

    out.start("metadata", &[])?;
    let schema_location = format!("{} {}", OAI_DC.namespace, OAI_DC.schema);
    out.start(
        "oai_dc:dc",
        &[
            ("xmlns:oai_dc", OAI_DC.namespace),
            ("xmlns:dc", DC_NAMESPACE),
            ("xsi:schemaLocation", schema_location.as_str()),
        ],
    )?;
    for (element, values) in record.metadata.elements() {
        let name = format!("dc:{element}");
        for value in values {
            out.text_element(&name, value)?;
        }
    }
    out.end("oai_dc:dc")?;
    out.end("metadata")?;

    out.end("record")
}

/// More pages: a token. Last page of a resumed listing: an empty token.
/// Single-page listing: nothing.
fn write_resumption(out: &mut XmlOut, list: &ListResult) -> Result<()> {
    let cursor = list.offset.to_string();
    match &list.next {
        Some(next) => {
            let expires = format_datestamp(&next.expires_at);
            out.text_element_with(
                "resumptionToken",
                &[("expirationDate", expires.as_str()), ("cursor", cursor.as_str())],
                &next.token,
            )
        }
        None if list.resumed => out.empty("resumptionToken", &[("cursor", cursor.as_str())]),
        None => Ok(()),
    }
}

// =============================================================================
// Writer helpers
// =============================================================================

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(xml_error)
    }

    fn decl(&mut self) -> Result<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.write(Event::Start(start))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.write(Event::Empty(start))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.text_element_with(name, &[], text)
    }

    fn text_element_with(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attrs)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(xml_error)
    }
}
