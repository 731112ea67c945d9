#![allow(dead_code)]

use portlens::domain::error::PortlensError;
use portlens::domain::session::AnalyzeRequest;
use portlens::ports::analytics_port::AnalyticsPort;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// Canned analytics service that records every request it receives.
pub struct MockAnalyticsPort {
    pub response: Option<Value>,
    pub error: Option<(u16, String)>,
    pub requests: RefCell<Vec<AnalyzeRequest>>,
}

impl MockAnalyticsPort {
    pub fn new() -> Self {
        Self {
            response: None,
            error: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: Value) -> Self {
        self.response = Some(response);
        self
    }

    /// Fail every call with a service error carrying `detail`.
    pub fn with_error(mut self, status: u16, detail: &str) -> Self {
        self.error = Some((status, detail.to_string()));
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl AnalyticsPort for MockAnalyticsPort {
    fn analyze(&self, request: &AnalyzeRequest) -> Result<Value, PortlensError> {
        self.requests.borrow_mut().push(request.clone());
        if let Some((status, detail)) = &self.error {
            return Err(PortlensError::Service {
                status: *status,
                detail: detail.clone(),
            });
        }
        match &self.response {
            Some(v) => Ok(v.clone()),
            None => Err(PortlensError::Transport {
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// A well-formed response with a small spectrum and a few chart records.
pub fn valid_payload() -> Value {
    json!({
        "returns": { "cagr": 12.5, "annualReturn": 11.0, "bestYear": 35.2, "worstYear": -18.4 },
        "risk": {
            "standardDev": 16.1, "maxDrawdown": -24.3, "sharpeRatio": 0.87,
            "varFivePercent": -2.1, "cvarFivePercent": -3.4
        },
        "market": {
            "alpha": 1.2, "beta": 1.05, "correlation": 0.91,
            "upCapture": 104.0, "downCapture": 97.0
        },
        "distribution": { "skewness": -0.3, "kurtosis": 4.2 },
        "spectral": {
            "significantPeriods": [30.0, 10.0, 20.0],
            "powerSpectrum": [5.0, 9.0, 1.0]
        },
        "historical": {
            "candlestick": [
                { "date": "2024-01-02T00:00:00", "open": 100.0, "high": 102.0, "low": 99.0, "close": 101.0 },
                { "date": "2024-01-03T00:00:00", "open": 101.0, "high": 101.5, "low": 97.0, "close": "n/a" },
                { "date": "2024-01-04T00:00:00", "open": 98.0, "high": 100.0, "low": 97.5, "close": 99.5 }
            ],
            "returns": [
                { "date": "2024-01-02", "return": null },
                { "date": "2024-01-03", "return": -0.0396 },
                { "date": "2024-01-04", "return": 0.0152 }
            ],
            "riskMetrics": {
                "diversificationEffect": 0.12,
                "treynorRatio": 0.08,
                "informationRatio": 0.4,
                "modifiedVaR": -0.031,
                "omegaRatio": 1.3
            }
        }
    })
}

/// Remove the field at a dotted path such as `historical.riskMetrics.omegaRatio`.
pub fn without(mut payload: Value, path: &str) -> Value {
    let mut parts: Vec<&str> = path.split('.').collect();
    let last = parts.pop().unwrap();
    let mut node = &mut payload;
    for part in parts {
        node = node.get_mut(part).unwrap();
    }
    node.as_object_mut().unwrap().remove(last);
    payload
}

/// What the one-shot server saw.
pub struct CapturedRequest {
    pub request_line: String,
    pub body: String,
}

/// Serve exactly one HTTP response on a loopback port.
///
/// Returns the base URL to point the client at and a handle yielding the
/// request that was received.
pub fn one_shot_server(status: &str, body: &str) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().unwrap();
            }
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).unwrap();

        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        CapturedRequest {
            request_line: request_line.trim_end().to_string(),
            body: String::from_utf8(body).unwrap(),
        }
    });

    (base_url, handle)
}
