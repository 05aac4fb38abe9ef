use redis_status::collector::{collect_all, count_keys_in_slot, fetch_info, SlotErrorPolicy};
use redis_status::config::ServerDescriptor;
use redis_status::connection::{Connector, RedisConnector, RedisStatusConnection, StatusConnection};
use redis_status::info::list_populated_slots;
use redis_status::registry::{AuthStatus, ConnectionRegistry};
use redis_status::render::{render_page, RenderOptions};

/// Host and port of the test server, from `REDIS_TEST_URL`.
fn test_descriptor() -> Option<ServerDescriptor> {
    let url =
        std::env::var("REDIS_TEST_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/15".to_string());
    ServerDescriptor::from_url(&url).ok()
}

/// Try to connect to Redis with a short timeout. Skip tests if not available.
async fn try_connect(db: u32) -> Option<(ServerDescriptor, redis::aio::MultiplexedConnection)> {
    let descriptor = test_descriptor()?;
    let host = if descriptor.host.contains(':') {
        format!("[{}]", descriptor.host)
    } else {
        descriptor.host.clone()
    };
    let url = format!("redis://{}:{}/{}", host, descriptor.port, db);
    let client = redis::Client::open(url.as_str()).ok()?;

    // Use a timeout so tests skip quickly when Redis is not running
    let mut conn = match tokio::time::timeout(
        std::time::Duration::from_secs(2),
        client.get_multiplexed_async_connection(),
    )
    .await
    {
        Ok(Ok(c)) => c,
        _ => return None,
    };

    let pong: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
    if pong.is_err() {
        return None;
    }

    // Each test owns one database so parallel tests don't flush each other
    let _: Result<(), _> = redis::cmd("FLUSHDB").query_async(&mut conn).await;

    Some((descriptor, conn))
}

async fn set_key(conn: &mut redis::aio::MultiplexedConnection, key: &str) {
    let _: () = redis::cmd("SET")
        .arg(key)
        .arg("1")
        .query_async(conn)
        .await
        .expect("SET failed");
}

/// Connect or skip the test gracefully.
macro_rules! require_redis {
    ($db:expr) => {
        match try_connect($db).await {
            Some(c) => c,
            None => {
                eprintln!("Skipping: Redis not available");
                return;
            }
        }
    };
}

#[tokio::test]
async fn test_info_has_display_fields() {
    let (_, conn) = require_redis!(15);
    let mut status_conn = RedisStatusConnection::new(conn);
    let info = fetch_info(&mut status_conn).await.expect("INFO failed");
    assert!(info.get("redis_version").is_some());
    assert!(info.get("uptime_in_seconds").is_some());
    assert!(info.get("used_memory_human").is_some());
}

#[tokio::test]
async fn test_populated_slot_counted() {
    let (_, mut conn) = require_redis!(14);
    for key in ["status:a", "status:b", "status:c"] {
        set_key(&mut conn, key).await;
    }

    let mut status_conn = RedisStatusConnection::new(conn);
    let info = fetch_info(&mut status_conn).await.expect("INFO failed");
    assert!(list_populated_slots(&info).contains(&14));

    let count = count_keys_in_slot(&mut status_conn, 14).await.expect("count failed");
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_connector_and_count() {
    let (descriptor, mut seed) = require_redis!(13);
    set_key(&mut seed, "status:x").await;

    let mut conn = RedisConnector
        .connect(&descriptor.host, descriptor.port)
        .await
        .expect("connect failed");
    assert_eq!(conn.count_keys_in_slot(13).await.expect("count failed"), 1);
}

#[tokio::test]
async fn test_auth_rejection_keeps_connection() {
    let (descriptor, _) = require_redis!(11);
    let descriptor = descriptor.with_password("definitely-not-the-password");
    let mut registry = ConnectionRegistry::new(RedisConnector, vec![descriptor]);

    let servers = registry.connections().await.expect("auth failure must not propagate");
    assert!(matches!(servers[0].auth, AuthStatus::Rejected(_)));
}

#[tokio::test]
async fn test_collect_and_render_live() {
    let (descriptor, mut seed) = require_redis!(12);
    set_key(&mut seed, "status:page").await;
    let label = descriptor.label();

    let mut registry = ConnectionRegistry::new(RedisConnector, vec![descriptor]);
    let statuses = collect_all(&mut registry, SlotErrorPolicy::Fatal)
        .await
        .expect("collect failed");

    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].info.is_ok());
    assert!(statuses[0].slots.iter().any(|s| s.slot_index == 12 && s.key_count == 1));

    let html = render_page(&statuses, &RenderOptions::default());
    assert!(html.contains(&format!("<h2>{label}</h2>")));
    assert!(html.contains("Database 12"));
}
