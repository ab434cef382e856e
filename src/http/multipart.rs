//! `multipart/form-data` payload scanning.
//!
//! # Design Decisions
//! - Line-oriented state machine instead of pattern matching:
//!   seeking-boundary → reading-headers → reading-body → (next part | done)
//! - A part is only kept once its closing delimiter has been seen; a payload
//!   cut short loses its last part rather than yielding a truncated value
//! - Repeated field names keep the last value
//! - The line break preceding a delimiter belongs to the delimiter

use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekingBoundary,
    ReadingHeaders,
    ReadingBody,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartKind {
    Field,
    File,
}

#[derive(Debug, Default)]
struct Part {
    name: Option<String>,
    file: bool,
    content: String,
}

impl Part {
    fn kind(&self) -> PartKind {
        if self.file {
            PartKind::File
        } else {
            PartKind::Field
        }
    }
}

/// Extract the `boundary` parameter from a `Content-Type` header value.
pub fn boundary(content_type: &str) -> Option<String> {
    let lower = content_type.to_ascii_lowercase();
    let start = lower.find("boundary=")? + "boundary=".len();
    let value = content_type[start..]
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('"');
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Split a multipart payload into `name → value` pairs.
pub fn parse(body: &str, boundary: &str) -> IndexMap<String, String> {
    let delimiter = format!("--{boundary}");
    let terminator = format!("--{boundary}--");

    let mut fields = IndexMap::new();
    let mut state = State::SeekingBoundary;
    let mut part = Part::default();

    for line in body.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\r', '\n']);
        let is_delimiter = bare.trim_end() == delimiter;
        let is_terminator = bare.trim_end() == terminator;

        state = match state {
            State::SeekingBoundary if is_terminator => State::Done,
            State::SeekingBoundary if is_delimiter => State::ReadingHeaders,
            State::SeekingBoundary => State::SeekingBoundary,

            State::ReadingHeaders if is_terminator => State::Done,
            State::ReadingHeaders if is_delimiter => {
                part = Part::default();
                State::ReadingHeaders
            }
            State::ReadingHeaders if bare.is_empty() => State::ReadingBody,
            State::ReadingHeaders => {
                read_header(bare, &mut part);
                State::ReadingHeaders
            }

            State::ReadingBody if is_delimiter || is_terminator => {
                let finished = std::mem::take(&mut part);
                store_part(finished, &mut fields);
                if is_terminator {
                    State::Done
                } else {
                    State::ReadingHeaders
                }
            }
            State::ReadingBody => {
                part.content.push_str(line);
                State::ReadingBody
            }

            State::Done => break,
        };
    }

    if state != State::Done && part.name.is_some() {
        tracing::debug!(field = ?part.name, "multipart payload not terminated, dropping last part");
    }
    fields
}

fn read_header(line: &str, part: &mut Part) {
    let Some((name, value)) = line.split_once(':') else {
        return;
    };
    let name = name.trim();
    if name.eq_ignore_ascii_case("content-disposition") {
        part.name = disposition_param(value, "name");
    } else if name.eq_ignore_ascii_case("content-type")
        && value.trim().eq_ignore_ascii_case("application/octet-stream")
    {
        part.file = true;
    }
}

fn disposition_param(value: &str, param: &str) -> Option<String> {
    value
        .split(';')
        .filter_map(|segment| segment.trim().split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(param))
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
}

fn store_part(mut part: Part, fields: &mut IndexMap<String, String>) {
    let Some(name) = part.name.take() else {
        return;
    };
    let kind = part.kind();
    let mut content = part.content;
    if content.ends_with("\r\n") {
        content.truncate(content.len() - 2);
    } else if content.ends_with('\n') {
        content.truncate(content.len() - 1);
    }
    if kind == PartKind::File {
        tracing::debug!(field = %name, size = content.len(), "multipart file part");
    }
    fields.insert(name, content);
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "----WebKitFormBoundary7MA4YWxkTrZu0gW";

    fn payload(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut out = String::new();
        for (name, ct, value) in parts {
            out.push_str(&format!("--{BOUNDARY}\r\n"));
            out.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n"));
            if let Some(ct) = ct {
                out.push_str(&format!("Content-Type: {ct}\r\n"));
            }
            out.push_str("\r\n");
            out.push_str(value);
            out.push_str("\r\n");
        }
        out.push_str(&format!("--{BOUNDARY}--\r\n"));
        out
    }

    #[test]
    fn test_boundary_extraction() {
        assert_eq!(
            boundary("multipart/form-data; boundary=abc123").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            boundary("multipart/form-data; Boundary=\"quoted\"").as_deref(),
            Some("quoted")
        );
        assert_eq!(boundary("multipart/form-data"), None);
        assert_eq!(boundary("multipart/form-data; boundary="), None);
    }

    #[test]
    fn test_plain_fields() {
        let body = payload(&[("title", None, "Hello"), ("empty", None, ""), ("multi", None, "a\r\nb")]);
        let fields = parse(&body, BOUNDARY);
        assert_eq!(fields.get("title").map(String::as_str), Some("Hello"));
        assert_eq!(fields.get("empty").map(String::as_str), Some(""));
        assert_eq!(fields.get("multi").map(String::as_str), Some("a\r\nb"));
    }

    #[test]
    fn test_file_part() {
        let body = payload(&[("upload", Some("application/octet-stream"), "\u{1}\u{2}binary")]);
        let fields = parse(&body, BOUNDARY);
        assert_eq!(fields.get("upload").map(String::as_str), Some("\u{1}\u{2}binary"));
    }

    #[test]
    fn test_repeated_name_keeps_last() {
        let body = payload(&[("a", None, "1"), ("a", None, "2")]);
        let fields = parse(&body, BOUNDARY);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("a").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_unterminated_last_part_dropped() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n\
             --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"b\"\r\n\r\n2"
        );
        let fields = parse(&body, BOUNDARY);
        assert_eq!(fields.get("a").map(String::as_str), Some("1"));
        assert!(!fields.contains_key("b"));
    }

    #[test]
    fn test_wrong_boundary_yields_nothing() {
        let body = payload(&[("a", None, "1")]);
        assert!(parse(&body, "other").is_empty());
    }
}
