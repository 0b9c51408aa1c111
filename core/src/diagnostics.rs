//! Capture of the most recent round-trip, for troubleshooting.
//!
//! `Client` overwrites its `Diagnostics` on every call. `dump` renders it for
//! humans: JSON bodies are pretty-printed with long arrays shortened, binary
//! bodies keep their printable prefix only. Verbose mode shows everything,
//! including the bearer token.

use std::fmt::Write;

use serde_json::Value;

use crate::error::Problem;
use crate::http::{HttpRequest, HttpResponse};

const SHOWN: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub request: Option<HttpRequest>,
    pub response: Option<HttpResponse>,
    /// Transport failure text when no response was obtained.
    pub error: Option<String>,
    pub problem: Option<Problem>,
}

impl Diagnostics {
    pub fn dump(&self, verbose: bool) -> String {
        let mut out = String::new();
        if let Some(request) = &self.request {
            let _ = writeln!(out, "Request: {} {}", request.method.as_str(), request.url);
            write_headers(&mut out, &request.headers, verbose);
            if let Some(body) = &request.body {
                let _ = writeln!(out, "Request body:\n{}", render_body(body, verbose));
            }
        }
        if let Some(response) = &self.response {
            let _ = writeln!(out, "Response: {}", response.status);
            write_headers(&mut out, &response.headers, verbose);
            let _ = writeln!(out, "Response body:\n{}", render_body(&response.body, verbose));
        }
        if let Some(error) = &self.error {
            let _ = writeln!(out, "Error: {error}");
        }
        if let Some(problem) = &self.problem {
            write_problem(&mut out, problem, verbose);
        }
        out
    }
}

fn write_headers(out: &mut String, headers: &[(String, String)], verbose: bool) {
    for (name, value) in headers {
        let value = if !verbose && name.eq_ignore_ascii_case("authorization") {
            "Bearer ***"
        } else {
            value.as_str()
        };
        let _ = writeln!(out, "  {name}: {value}");
    }
}

fn write_problem(out: &mut String, problem: &Problem, verbose: bool) {
    let _ = writeln!(out, "Problem:");
    let fields = [
        ("status", if problem.status == 0 { String::new() } else { problem.status.to_string() }),
        ("title", problem.title.clone()),
        ("detail", problem.detail.clone()),
        ("description", problem.description.clone()),
        ("type", problem.kind.clone()),
        ("instance", problem.instance.clone()),
    ];
    for (name, value) in fields.iter().filter(|(_, v)| !v.is_empty()) {
        let _ = writeln!(out, "  {name}: {value}");
    }
    let limit = if verbose { usize::MAX } else { SHOWN };
    for violation in problem.violations.iter().take(limit) {
        let _ = writeln!(out, "  violation {}: {}", violation.property_path, violation.message);
    }
    if problem.violations.len() > limit {
        let _ = writeln!(out, "  plus {} more", problem.violations.len() - limit);
    }
}

/// Render a body: pretty JSON when it parses, printable text otherwise.
pub fn render_body(body: &[u8], verbose: bool) -> String {
    if body.is_empty() {
        return "(empty)".to_string();
    }
    if let Ok(mut value) = serde_json::from_slice::<Value>(body) {
        if !verbose {
            truncate_arrays(&mut value);
        }
        if let Ok(pretty) = serde_json::to_string_pretty(&value) {
            return pretty;
        }
    }
    printable(body)
}

/// Keep the printable ASCII prefix and summarize the remainder.
pub fn printable(body: &[u8]) -> String {
    match body.iter().position(|b| !(32..=126).contains(b)) {
        None => String::from_utf8_lossy(body).into_owned(),
        Some(at) => format!(
            "{}<{} bytes of binary data>",
            String::from_utf8_lossy(&body[..at]),
            body.len() - at
        ),
    }
}

fn truncate_arrays(value: &mut Value) {
    match value {
        Value::Array(items) => {
            let extra = items.len().saturating_sub(SHOWN);
            items.truncate(SHOWN);
            items.iter_mut().for_each(truncate_arrays);
            if extra > 0 {
                items.push(Value::String(format!("plus {extra} more")));
            }
        }
        Value::Object(map) => map.values_mut().for_each(truncate_arrays),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Violation;
    use crate::http::HttpMethod;

    #[test]
    fn binary_bodies_keep_printable_prefix() {
        assert_eq!(printable(b"GIF89a\x00\x01\x02"), "GIF89a<3 bytes of binary data>");
        assert_eq!(printable(b"\xff\xd8"), "<2 bytes of binary data>");
        assert_eq!(printable(b"plain text"), "plain text");
    }

    #[test]
    fn json_arrays_are_truncated_unless_verbose() {
        let body = br#"{"member":[1,2,3,4,5]}"#;
        let short = render_body(body, false);
        assert!(short.contains("plus 2 more"));
        assert!(!short.contains('5'));
        let full = render_body(body, true);
        assert!(full.contains('5'));
        assert!(!full.contains("plus"));
    }

    #[test]
    fn dump_masks_token_and_limits_violations() {
        let diagnostics = Diagnostics {
            request: Some(HttpRequest {
                method: HttpMethod::Post,
                url: "http://koi/api/items".into(),
                headers: vec![("authorization".into(), "Bearer secret-token".into())],
                body: Some(br#"{"name":""}"#.to_vec()),
            }),
            response: Some(HttpResponse {
                status: 422,
                headers: Vec::new(),
                body: br#"{"title":"An error occurred"}"#.to_vec(),
            }),
            error: None,
            problem: Some(Problem {
                status: 422,
                title: "An error occurred".into(),
                violations: (0..5)
                    .map(|i| Violation { property_path: format!("f{i}"), message: "blank".into() })
                    .collect(),
                ..Problem::default()
            }),
        };
        let dump = diagnostics.dump(false);
        assert!(dump.contains("Request: POST http://koi/api/items"));
        assert!(dump.contains("authorization: Bearer ***"));
        assert!(!dump.contains("secret-token"));
        assert!(dump.contains("violation f2: blank"));
        assert!(!dump.contains("violation f3"));
        assert!(dump.contains("plus 2 more"));

        let verbose = diagnostics.dump(true);
        assert!(verbose.contains("secret-token"));
        assert!(verbose.contains("violation f4: blank"));
    }
}
