//! Scripted in-memory transport for unit tests.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportError};

enum Scripted {
    Response { status: u16, body: Vec<u8>, fail_midway: bool },
    Failure(String),
}

/// Replays queued outcomes in order and records every request it sees.
///
/// Bodies handed out are tracked so tests can assert nothing was left unread.
#[derive(Default)]
pub(crate) struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
    unread: Arc<AtomicUsize>,
    opened: AtomicUsize,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.push(Scripted::Response {
            status,
            body: body.as_bytes().to_vec(),
            fail_midway: false,
        });
    }

    /// Queue a response whose body errors halfway through the first read pass.
    pub(crate) fn respond_truncated(&self, status: u16, body: &str) {
        self.push(Scripted::Response {
            status,
            body: body.as_bytes().to_vec(),
            fail_midway: true,
        });
    }

    pub(crate) fn fail(&self, reason: &str) {
        self.push(Scripted::Failure(reason.to_string()));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The single recorded request, decoded as JSON.
    pub(crate) fn last_body(&self) -> Option<serde_json::Value> {
        let requests = self.requests.lock().unwrap();
        let body = requests.last()?.body.as_deref()?;
        Some(serde_json::from_slice(body).unwrap())
    }

    pub(crate) fn unread_bytes(&self) -> usize {
        self.unread.load(Ordering::SeqCst)
    }

    pub(crate) fn opened_bodies(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn push(&self, outcome: Scripted) {
        self.script.lock().unwrap().push_back(outcome);
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Response { status, body, fail_midway }) => {
                self.opened.fetch_add(1, Ordering::SeqCst);
                self.unread.fetch_add(body.len(), Ordering::SeqCst);
                let fail_at = fail_midway.then_some(body.len() / 2);
                Ok(HttpResponse::new(
                    status,
                    TrackedBody {
                        data: body,
                        pos: 0,
                        fail_at,
                        unread: Arc::clone(&self.unread),
                    },
                ))
            }
            Some(Scripted::Failure(reason)) => Err(io::Error::new(io::ErrorKind::ConnectionRefused, reason).into()),
            None => Err("no scripted response left".into()),
        }
    }
}

struct TrackedBody {
    data: Vec<u8>,
    pos: usize,
    fail_at: Option<usize>,
    unread: Arc<AtomicUsize>,
}

impl Read for TrackedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail_at == Some(self.pos) {
            self.fail_at = None;
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset mid-body"));
        }
        let end = match self.fail_at {
            Some(limit) if limit > self.pos => limit,
            _ => self.data.len(),
        };
        let n = buf.len().min(end - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        self.unread.fetch_sub(n, Ordering::SeqCst);
        Ok(n)
    }
}
