//! The three status commands the dashboard needs, behind a trait so the
//! registry and collector can run against something other than a live server.

use redis::aio::MultiplexedConnection;

use crate::error::StatusError;
use crate::info::InfoMap;

/// Opens sessions to a `host:port`.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Conn: StatusConnection;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Conn, StatusError>;
}

/// Read-only status queries on one open session.
#[allow(async_fn_in_trait)]
pub trait StatusConnection {
    async fn authenticate(&mut self, password: &str) -> Result<(), StatusError>;

    async fn info(&mut self) -> Result<InfoMap, StatusError>;

    /// Number of keys in database `slot`. Selecting the database and counting
    /// are one operation; callers never see a "current database".
    async fn count_keys_in_slot(&mut self, slot: u32) -> Result<u64, StatusError>;
}

/// Connects with the `redis` crate's async client.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

impl Connector for RedisConnector {
    type Conn = RedisStatusConnection;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Conn, StatusError> {
        let info = redis::ConnectionInfo {
            addr: redis::ConnectionAddr::Tcp(host.to_string(), port),
            redis: redis::RedisConnectionInfo::default(),
        };
        let client = redis::Client::open(info)?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::debug!(host, port, "Opened Redis connection");
        Ok(RedisStatusConnection { conn })
    }
}

pub struct RedisStatusConnection {
    conn: MultiplexedConnection,
}

impl RedisStatusConnection {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

impl StatusConnection for RedisStatusConnection {
    async fn authenticate(&mut self, password: &str) -> Result<(), StatusError> {
        let _: () = redis::cmd("AUTH")
            .arg(password)
            .query_async(&mut self.conn)
            .await?;
        Ok(())
    }

    async fn info(&mut self) -> Result<InfoMap, StatusError> {
        let raw: String = redis::cmd("INFO").query_async(&mut self.conn).await?;
        Ok(InfoMap::parse(&raw))
    }

    async fn count_keys_in_slot(&mut self, slot: u32) -> Result<u64, StatusError> {
        // Pipelined so nothing else can run between SELECT and DBSIZE.
        let (size,): (u64,) = redis::pipe()
            .cmd("SELECT")
            .arg(slot)
            .ignore()
            .cmd("DBSIZE")
            .query_async(&mut self.conn)
            .await?;
        Ok(size)
    }
}
