use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use std::str;

use crate::models::RemoteEntry;

#[derive(Debug, Default)]
struct PropFindResponse {
    href: String,
    displayname: String,
    content_length: Option<i64>,
    last_modified: Option<String>,
    is_collection: bool,
}

impl PropFindResponse {
    fn into_entry(self) -> RemoteEntry {
        // displayname is plain text; only href segments are percent-encoded
        let display_name = if self.displayname.is_empty() {
            let segment = self.href
                .split('/')
                .filter(|segment| !segment.is_empty())
                .last()
                .unwrap_or("");
            urlencoding::decode(segment)
                .map(|name| name.into_owned())
                .unwrap_or_else(|_| segment.to_string())
        } else {
            self.displayname.clone()
        };

        RemoteEntry {
            display_name,
            path: self.href,
            size: self.content_length.unwrap_or(0),
            is_directory: self.is_collection,
            last_modified: parse_http_date(&self.last_modified.unwrap_or_default()),
        }
    }
}

/// Parses a PROPFIND multistatus body into entries, directories included.
///
/// `path` on each entry is the raw href; callers resolve it against the server.
/// Entries appear in document order.
pub fn parse_propfind_response(xml_text: &str) -> Result<Vec<RemoteEntry>> {
    let mut reader = Reader::from_str(xml_text);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current_response: Option<PropFindResponse> = None;
    let mut current_element = String::new();
    let mut in_propstat = false;
    let mut in_resourcetype = false;
    let mut status_ok = false;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = get_local_name(&e)?;

                match name.as_str() {
                    "response" => {
                        current_response = Some(PropFindResponse::default());
                        status_ok = false;
                    }
                    "propstat" => in_propstat = true,
                    "resourcetype" => in_resourcetype = true,
                    "collection" if in_resourcetype => mark_collection(&mut current_response),
                    _ => current_element = name,
                }
            }
            Ok(Event::Empty(e)) => {
                let name = get_local_name(&e)?;
                if name == "collection" && in_resourcetype {
                    mark_collection(&mut current_response);
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape()?;
                let text = text.trim();

                if text.is_empty() {
                    buf.clear();
                    continue;
                }

                if let Some(ref mut resp) = current_response {
                    match current_element.as_str() {
                        "href" => resp.href = text.to_string(),
                        "displayname" => resp.displayname = text.to_string(),
                        "getcontentlength" => resp.content_length = text.parse().ok(),
                        "getlastmodified" => resp.last_modified = Some(text.to_string()),
                        "status" if in_propstat => {
                            // Check if status is 200 OK
                            if text.contains(" 200 ") || text.ends_with(" 200") {
                                status_ok = true;
                            }
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = get_local_name_from_end(&e)?;

                match name.as_str() {
                    "response" => {
                        if let Some(resp) = current_response.take() {
                            if status_ok && !resp.href.is_empty() {
                                entries.push(resp.into_entry());
                            }
                        }
                        status_ok = false;
                    }
                    "propstat" => in_propstat = false,
                    "resourcetype" => in_resourcetype = false,
                    _ => {}
                }

                current_element.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("XML parsing error: {}", e)),
            _ => {}
        }

        buf.clear();
    }

    Ok(entries)
}

fn mark_collection(current: &mut Option<PropFindResponse>) {
    if let Some(ref mut resp) = current {
        resp.is_collection = true;
    }
}

fn get_local_name(e: &BytesStart) -> Result<String> {
    let qname = e.name();
    let local = qname.local_name();
    let name = str::from_utf8(local.as_ref())
        .map_err(|e| anyhow!("Invalid UTF-8 in element name: {}", e))?;
    Ok(name.to_string())
}

fn get_local_name_from_end(e: &BytesEnd) -> Result<String> {
    let qname = e.name();
    let local = qname.local_name();
    let name = str::from_utf8(local.as_ref())
        .map_err(|e| anyhow!("Invalid UTF-8 in element name: {}", e))?;
    Ok(name.to_string())
}

fn parse_http_date(date_str: &str) -> Option<DateTime<Utc>> {
    if date_str.is_empty() {
        return None;
    }

    // Try to parse RFC 2822 format (used by WebDAV)
    DateTime::parse_from_rfc2822(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            // Try RFC 3339 as fallback
            DateTime::parse_from_rfc3339(date_str)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(date_str, "%a, %d %b %Y %H:%M:%S GMT")
                .ok()
                .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
        })
}
