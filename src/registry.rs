use crate::config::ServerDescriptor;
use crate::connection::{Connector, StatusConnection};
use crate::error::StatusError;

/// Result of the optional AUTH handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    NotAttempted,
    Accepted,
    /// The handshake failed. The connection is kept anyway, unauthenticated.
    Rejected(String),
}

pub struct ServerConnection<C> {
    /// `host:port`
    pub label: String,
    pub auth: AuthStatus,
    pub conn: C,
}

/// Opens one connection per distinct `host:port` on first use and hands out
/// the same set afterwards.
pub struct ConnectionRegistry<K: Connector> {
    connector: K,
    descriptors: Vec<ServerDescriptor>,
    servers: Option<Vec<ServerConnection<K::Conn>>>,
}

impl<K: Connector> ConnectionRegistry<K> {
    pub fn new(connector: K, descriptors: Vec<ServerDescriptor>) -> Self {
        Self {
            connector,
            descriptors,
            servers: None,
        }
    }

    /// Connected servers in config order.
    ///
    /// The first call connects; later calls return the cached set. A failed
    /// connect aborts the whole call and nothing is cached. Descriptors that
    /// share a `host:port` collapse into one entry holding the later
    /// connection.
    pub async fn connections(
        &mut self,
    ) -> Result<&mut [ServerConnection<K::Conn>], StatusError> {
        if self.servers.is_none() {
            let servers = self.connect_all().await?;
            self.servers = Some(servers);
        }
        Ok(self.servers.as_deref_mut().unwrap_or_default())
    }

    async fn connect_all(&self) -> Result<Vec<ServerConnection<K::Conn>>, StatusError> {
        let mut servers: Vec<ServerConnection<K::Conn>> = Vec::new();

        for descriptor in &self.descriptors {
            let label = descriptor.label();
            let mut conn = self
                .connector
                .connect(&descriptor.host, descriptor.port)
                .await?;

            let auth = match descriptor.auth_password() {
                None => AuthStatus::NotAttempted,
                Some(password) => match conn.authenticate(password).await {
                    Ok(()) => AuthStatus::Accepted,
                    Err(e) => {
                        tracing::debug!(
                            server = %label,
                            error = %e,
                            "AUTH failed, continuing unauthenticated"
                        );
                        AuthStatus::Rejected(e.to_string())
                    }
                },
            };

            tracing::info!(server = %label, "Connected to Redis");

            let entry = ServerConnection { label, auth, conn };
            match servers.iter_mut().find(|s| s.label == entry.label) {
                Some(existing) => {
                    tracing::debug!(
                        server = %entry.label,
                        "Duplicate server in config, keeping the later one"
                    );
                    *existing = entry;
                }
                None => servers.push(entry),
            }
        }

        Ok(servers)
    }
}
