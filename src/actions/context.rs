//! Per-request execution context.
//!
//! Owns the outgoing response and the sink it is written to.

use std::io::Write;

use serde_json::Value;
use uuid::Uuid;

use crate::actions::announce::ResponseSpec;
use crate::config::HttpConfig;
use crate::error::EqualError;
use crate::http::{HttpHeaders, HttpResponse};

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Debug)]
pub struct Context<W: Write> {
    request_id: Uuid,
    response: HttpResponse,
    sink: W,
    sent: bool,
}

impl<W: Write> Context<W> {
    pub fn new(sink: W, response: &ResponseSpec) -> Self {
        Self::with_config(sink, response, &HttpConfig::default())
    }

    pub fn with_config(sink: W, spec: &ResponseSpec, config: &HttpConfig) -> Self {
        let request_id = Uuid::new_v4();
        let mut response = HttpResponse::with_config("", HttpHeaders::new(), "", config);
        response
            .set_content_type(spec.content_type)
            .set_charset(spec.charset)
            .set_header("Access-Control-Allow-Origin", spec.accept_origin)
            .set_header(REQUEST_ID_HEADER, &request_id.to_string());
        Self {
            request_id,
            response,
            sink,
            sent: false,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn http_response(&mut self) -> &mut HttpResponse {
        &mut self.response
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Write the response to the sink.
    pub fn send(&mut self) -> Result<(), EqualError> {
        let wire = self.response.to_wire();
        self.sink.write_all(wire.as_bytes())?;
        self.sink.flush()?;
        self.sent = true;
        tracing::info!(
            request_id = %self.request_id,
            status = self.response.status_code(),
            bytes = wire.len(),
            "Response sent"
        );
        Ok(())
    }

    /// Render `err` as the response and send it.
    pub fn send_error(&mut self, err: &EqualError) -> Result<(), EqualError> {
        tracing::warn!(request_id = %self.request_id, error = %err, "Action failed");
        self.response
            .set_status_code(err.http_status())
            .set_body(err.to_body());
        self.send()
    }

    /// Respond `status` with a JSON body.
    pub fn respond(&mut self, status: u16, body: Value) -> Result<(), EqualError> {
        self.response.set_status_code(status).set_body(body);
        self.send()
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}
