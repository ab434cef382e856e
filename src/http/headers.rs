//! Header collection.
//!
//! # Responsibilities
//! - Case-insensitive, insertion-ordered header storage
//! - Multi-valued headers (`Set-Cookie` is the usual one)
//! - Cookie read/write helpers
//! - Media type and charset, both written through `Content-Type`
//!
//! # Design Decisions
//! - Keys are lowercased for lookup; the first spelling seen is kept for output
//! - `Content-Type` is re-parsed on every edit so media type and parameters
//!   never clobber each other

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    entries: IndexMap<String, HeaderEntry>,
}

/// Attributes appended to a `Set-Cookie` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieParams {
    pub expires: Option<String>,
    pub max_age: Option<i64>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<String>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `(name, value)` pairs; repeated names accumulate values.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut headers = Self::new();
        for (name, value) in pairs {
            headers.append(name.as_ref(), value);
        }
        headers
    }

    /// Overwrite every value of `name`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let key = name.trim().to_ascii_lowercase();
        let value = value.into();
        match self.entries.get_mut(&key) {
            Some(entry) => entry.values = vec![value],
            None => {
                self.entries.insert(
                    key,
                    HeaderEntry {
                        name: name.trim().to_string(),
                        values: vec![value],
                    },
                );
            }
        }
        self
    }

    /// Add a value to `name`, keeping the existing ones.
    pub fn append(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let key = name.trim().to_ascii_lowercase();
        self.entries
            .entry(key)
            .or_insert_with(|| HeaderEntry {
                name: name.trim().to_string(),
                values: Vec::new(),
            })
            .values
            .push(value.into());
        self
    }

    /// First value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.trim().to_ascii_lowercase())
            .and_then(|e| e.values.first())
            .map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .get(&name.trim().to_ascii_lowercase())
            .map(|e| e.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.trim().to_ascii_lowercase())
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.entries
            .shift_remove(&name.trim().to_ascii_lowercase())
            .map(|e| e.values)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `(name, value)` item per stored value, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.values().flat_map(|e| {
            e.values
                .iter()
                .map(move |v| (e.name.as_str(), v.as_str()))
        })
    }

    /// Name → value copy; multiple values are joined with `", "`.
    pub fn to_map(&self) -> IndexMap<String, String> {
        self.entries
            .values()
            .map(|e| (e.name.clone(), e.values.join(", ")))
            .collect()
    }

    /// Append a `Set-Cookie` entry.
    pub fn set_cookie(&mut self, name: &str, value: &str, params: Option<&CookieParams>) -> &mut Self {
        let mut cookie = format!("{name}={value}");
        if let Some(p) = params {
            if let Some(expires) = &p.expires {
                cookie.push_str(&format!("; Expires={expires}"));
            }
            if let Some(max_age) = p.max_age {
                cookie.push_str(&format!("; Max-Age={max_age}"));
            }
            if let Some(path) = &p.path {
                cookie.push_str(&format!("; Path={path}"));
            }
            if let Some(domain) = &p.domain {
                cookie.push_str(&format!("; Domain={domain}"));
            }
            if p.secure {
                cookie.push_str("; Secure");
            }
            if p.http_only {
                cookie.push_str("; HttpOnly");
            }
            if let Some(same_site) = &p.same_site {
                cookie.push_str(&format!("; SameSite={same_site}"));
            }
        }
        self.append("Set-Cookie", cookie)
    }

    /// Value of cookie `name`, from `Cookie` first, then `Set-Cookie`.
    pub fn get_cookie(&self, name: &str) -> Option<String> {
        let from_request = self
            .get_all("Cookie")
            .iter()
            .flat_map(|line| line.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| k.trim() == name)
            .map(|(_, v)| v.trim().to_string());
        if from_request.is_some() {
            return from_request;
        }
        self.get_all("Set-Cookie")
            .iter()
            .filter_map(|line| line.split(';').next())
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| k.trim() == name)
            .map(|(_, v)| v.trim().to_string())
    }

    /// Lowercased media type of `Content-Type`, without parameters.
    pub fn get_content_type(&self) -> Option<String> {
        let (media, _) = split_content_type(self.get("Content-Type")?);
        media.map(|m| m.to_ascii_lowercase())
    }

    pub fn get_charset(&self) -> Option<String> {
        let (_, params) = split_content_type(self.get("Content-Type")?);
        params
            .into_iter()
            .find(|(k, _)| k == "charset")
            .map(|(_, v)| v.trim_matches('"').to_string())
    }

    /// Replace the media type, keeping any parameters already present.
    pub fn set_content_type(&mut self, content_type: &str) -> &mut Self {
        let (mut media, mut params) = self
            .get("Content-Type")
            .map(split_content_type)
            .unwrap_or_default();
        let (new_media, new_params) = split_content_type(content_type);
        if new_media.is_some() {
            media = new_media;
        }
        for (k, v) in new_params {
            upsert_param(&mut params, k, v);
        }
        let rendered = render_content_type(media.as_deref(), &params);
        self.set("Content-Type", rendered)
    }

    /// Set the `charset` parameter, keeping the media type.
    pub fn set_charset(&mut self, charset: &str) -> &mut Self {
        let (media, mut params) = self
            .get("Content-Type")
            .map(split_content_type)
            .unwrap_or_default();
        upsert_param(&mut params, "charset".to_string(), charset.trim().to_string());
        let rendered = render_content_type(media.as_deref(), &params);
        self.set("Content-Type", rendered)
    }
}

fn split_content_type(value: &str) -> (Option<String>, Vec<(String, String)>) {
    let mut media = None;
    let mut params = Vec::new();
    for (i, segment) in value.split(';').map(str::trim).enumerate() {
        if segment.is_empty() {
            continue;
        }
        match segment.split_once('=') {
            Some((k, v)) => params.push((k.trim().to_ascii_lowercase(), v.trim().to_string())),
            None if i == 0 => media = Some(segment.to_string()),
            None => {}
        }
    }
    (media, params)
}

fn upsert_param(params: &mut Vec<(String, String)>, key: String, value: String) {
    match params.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => params.push((key, value)),
    }
}

fn render_content_type(media: Option<&str>, params: &[(String, String)]) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(params.len() + 1);
    if let Some(media) = media {
        parts.push(media.to_string());
    }
    parts.extend(params.iter().map(|(k, v)| format!("{k}={v}")));
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let mut h = HttpHeaders::new();
        h.set("X-Requested-With", "XMLHttpRequest");
        assert_eq!(h.get("x-requested-with"), Some("XMLHttpRequest"));
        assert_eq!(h.get("X-REQUESTED-WITH"), Some("XMLHttpRequest"));
        assert_eq!(h.get_or("Accept", "*/*"), "*/*");

        h.set("x-requested-with", "fetch");
        assert_eq!(h.len(), 1);
        // original spelling kept
        assert_eq!(h.iter().next(), Some(("X-Requested-With", "fetch")));
    }

    #[test]
    fn test_charset_keeps_media_type() {
        let mut h = HttpHeaders::new();
        h.set_content_type("application/json");
        h.set_charset("UTF-8");
        assert_eq!(h.get("Content-Type"), Some("application/json; charset=UTF-8"));

        h.set_content_type("text/html");
        assert_eq!(h.get("Content-Type"), Some("text/html; charset=UTF-8"));
        assert_eq!(h.get_content_type().as_deref(), Some("text/html"));
        assert_eq!(h.get_charset().as_deref(), Some("UTF-8"));
    }

    #[test]
    fn test_charset_before_media_type() {
        let mut h = HttpHeaders::new();
        h.set_charset("ISO-8859-1");
        assert_eq!(h.get_content_type(), None);
        h.set_content_type("Application/XML");
        assert_eq!(h.get_content_type().as_deref(), Some("application/xml"));
        assert_eq!(h.get_charset().as_deref(), Some("ISO-8859-1"));
    }

    #[test]
    fn test_cookies() {
        let mut h = HttpHeaders::from_pairs([("Cookie", "session=abc; theme=dark")]);
        assert_eq!(h.get_cookie("theme").as_deref(), Some("dark"));
        assert_eq!(h.get_cookie("missing"), None);

        let params = CookieParams {
            path: Some("/".into()),
            http_only: true,
            ..Default::default()
        };
        h.set_cookie("lang", "fr", Some(&params));
        h.set_cookie("tz", "UTC", None);
        assert_eq!(h.get_all("set-cookie"), ["lang=fr; Path=/; HttpOnly", "tz=UTC"]);
        assert_eq!(h.get_cookie("lang").as_deref(), Some("fr"));
    }

    #[test]
    fn test_to_map_joins_values() {
        let h = HttpHeaders::from_pairs([("Accept", "text/html"), ("accept", "application/json")]);
        assert_eq!(h.to_map().get("Accept").map(String::as_str), Some("text/html, application/json"));
    }
}
