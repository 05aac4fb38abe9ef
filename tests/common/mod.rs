#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use redis_status::connection::{Connector, StatusConnection};
use redis_status::error::StatusError;
use redis_status::info::InfoMap;

/// Canned behaviour of one fake server.
#[derive(Clone, Default)]
pub struct MockServer {
    pub info: Option<InfoMap>,
    pub info_error: Option<String>,
    pub counts: HashMap<u32, u64>,
    pub count_error: Option<String>,
    pub reject_auth: bool,
}

impl MockServer {
    pub fn with_info<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            info: Some(pairs.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn count(mut self, slot: u32, keys: u64) -> Self {
        self.counts.insert(slot, keys);
        self
    }

    pub fn failing_info(message: &str) -> Self {
        Self {
            info_error: Some(message.to_string()),
            ..Default::default()
        }
    }
}

/// Hands out [`MockConnection`]s for registered `host:port` labels and
/// refuses everything else.
#[derive(Clone, Default)]
pub struct MockConnector {
    servers: HashMap<String, MockServer>,
    connects: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(mut self, label: &str, server: MockServer) -> Self {
        self.servers.insert(label.to_string(), server);
        self
    }

    /// Every `host:port` passed to `connect`, in call order.
    pub fn connect_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.connects.clone()
    }
}

impl Connector for MockConnector {
    type Conn = MockConnection;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Conn, StatusError> {
        let label = format!("{host}:{port}");
        let mut log = self.connects.lock().unwrap();
        let id = log.len();
        log.push(label.clone());

        let server = self
            .servers
            .get(&label)
            .cloned()
            .ok_or_else(|| StatusError::Other(format!("Connection refused: {label}")))?;
        Ok(MockConnection {
            id,
            server,
            auth_attempts: Vec::new(),
            count_calls: Vec::new(),
        })
    }
}

pub struct MockConnection {
    /// Position of the `connect` call that produced this connection.
    pub id: usize,
    pub server: MockServer,
    pub auth_attempts: Vec<String>,
    pub count_calls: Vec<u32>,
}

impl StatusConnection for MockConnection {
    async fn authenticate(&mut self, password: &str) -> Result<(), StatusError> {
        self.auth_attempts.push(password.to_string());
        if self.server.reject_auth {
            return Err(StatusError::Other("ERR invalid password".to_string()));
        }
        Ok(())
    }

    async fn info(&mut self) -> Result<InfoMap, StatusError> {
        if let Some(message) = &self.server.info_error {
            return Err(StatusError::Other(message.clone()));
        }
        Ok(self.server.info.clone().unwrap_or_default())
    }

    async fn count_keys_in_slot(&mut self, slot: u32) -> Result<u64, StatusError> {
        self.count_calls.push(slot);
        if let Some(message) = &self.server.count_error {
            return Err(StatusError::Other(message.clone()));
        }
        Ok(self.server.counts.get(&slot).copied().unwrap_or(0))
    }
}
