//! Per-server status collection: INFO, populated databases, key counts.

use crate::connection::{Connector, StatusConnection};
use crate::error::StatusError;
use crate::info::{list_populated_slots, InfoMap};
use crate::registry::{ConnectionRegistry, ServerConnection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCount {
    pub slot_index: u32,
    pub key_count: u64,
}

/// What to do when counting keys in one database fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlotErrorPolicy {
    /// Abort the whole render.
    #[default]
    Fatal,
    /// Report the error in that server's panel, like an INFO failure.
    Isolate,
}

/// Everything one panel shows.
#[derive(Debug, Clone)]
pub struct ServerStatus {
    /// `host:port`
    pub label: String,
    /// INFO, or the message of the error that replaced it.
    pub info: Result<InfoMap, String>,
    pub slots: Vec<SlotCount>,
}

impl ServerStatus {
    fn failed(label: &str, error: &StatusError) -> Self {
        Self {
            label: label.to_string(),
            info: Err(error.to_string()),
            slots: Vec::new(),
        }
    }
}

pub async fn fetch_info<C: StatusConnection>(conn: &mut C) -> Result<InfoMap, StatusError> {
    conn.info().await
}

pub async fn count_keys_in_slot<C: StatusConnection>(
    conn: &mut C,
    slot: u32,
) -> Result<u64, StatusError> {
    conn.count_keys_in_slot(slot).await
}

/// Key counts for every populated database, in INFO order.
pub async fn count_populated_slots<C: StatusConnection>(
    conn: &mut C,
    info: &InfoMap,
) -> Result<Vec<SlotCount>, StatusError> {
    let mut slots = Vec::new();
    for slot_index in list_populated_slots(info) {
        let key_count = count_keys_in_slot(conn, slot_index).await?;
        slots.push(SlotCount {
            slot_index,
            key_count,
        });
    }
    Ok(slots)
}

/// Status of one server.
///
/// An INFO failure never escapes: it becomes the panel's content. A slot
/// failure escapes unless `policy` is [`SlotErrorPolicy::Isolate`].
pub async fn collect_server<C: StatusConnection>(
    server: &mut ServerConnection<C>,
    policy: SlotErrorPolicy,
) -> Result<ServerStatus, StatusError> {
    let info = match fetch_info(&mut server.conn).await {
        Ok(info) => info,
        Err(e) => {
            tracing::warn!(server = %server.label, error = %e, "INFO failed");
            return Ok(ServerStatus::failed(&server.label, &e));
        }
    };

    let slots = match count_populated_slots(&mut server.conn, &info).await {
        Ok(slots) => slots,
        Err(e) if policy == SlotErrorPolicy::Isolate => {
            tracing::warn!(server = %server.label, error = %e, "Key count failed");
            return Ok(ServerStatus::failed(&server.label, &e));
        }
        Err(e) => return Err(e),
    };

    tracing::debug!(
        server = %server.label,
        databases = slots.len(),
        "Collected server status"
    );

    Ok(ServerStatus {
        label: server.label.clone(),
        info: Ok(info),
        slots,
    })
}

/// One sequential pass over every configured server.
pub async fn collect_all<K: Connector>(
    registry: &mut ConnectionRegistry<K>,
    policy: SlotErrorPolicy,
) -> Result<Vec<ServerStatus>, StatusError> {
    let servers = registry.connections().await?;
    let mut statuses = Vec::with_capacity(servers.len());
    for server in servers.iter_mut() {
        statuses.push(collect_server(server, policy).await?);
    }
    Ok(statuses)
}
