//! The `INFO` reply as an ordered map, and what the dashboard derives from it.

use std::sync::OnceLock;

use regex::Regex;

/// Metric names shown in a server panel.
pub mod keys {
    pub const VERSION: &str = "redis_version";
    pub const CONFIG_FILE: &str = "config_file";
    pub const UPTIME_SECONDS: &str = "uptime_in_seconds";
    pub const CONNECTED_CLIENTS: &str = "connected_clients";
    pub const CONNECTED_SLAVES: &str = "connected_slaves";
    pub const USED_MEMORY_HUMAN: &str = "used_memory_human";
    pub const USED_MEMORY_PEAK_HUMAN: &str = "used_memory_peak_human";
    pub const EXPIRED_KEYS: &str = "expired_keys";
    pub const EVICTED_KEYS: &str = "evicted_keys";
    pub const KEYSPACE_HITS: &str = "keyspace_hits";
    pub const KEYSPACE_MISSES: &str = "keyspace_misses";
}

/// Metric name to value, in the order the server reported them.
///
/// Slot enumeration and chart colors follow this order, so a hash map is not
/// an option here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoMap {
    entries: Vec<(String, String)>,
}

impl InfoMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw `INFO` reply. Section headers (`# Server`) and blank lines
    /// are skipped; each remaining line is split at its first `:`.
    pub fn parse(raw: &str) -> Self {
        let mut map = Self::new();
        for line in raw.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                map.insert(name, value);
            }
        }
        map
    }

    /// Insert or replace. A replaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InfoMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

fn slot_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^db[0-9]+$").expect("static regex is valid"))
}

/// Databases that currently hold keys, in `INFO` order.
///
/// Filters by key name, never by value. A suffix too large for `u32` cannot be
/// a database index and is dropped.
pub fn list_populated_slots(info: &InfoMap) -> Vec<u32> {
    let pattern = slot_key_pattern();
    info.keys()
        .filter(|name| pattern.is_match(name))
        .filter_map(|name| name[2..].parse::<u32>().ok())
        .collect()
}

/// `"{days} day(s) HH:MM:SS"`. Returns `None` if `seconds` is not an integer.
pub fn format_uptime(seconds: &str) -> Option<String> {
    let total: u64 = seconds.trim().parse().ok()?;
    Some(format!(
        "{} day(s) {:02}:{:02}:{:02}",
        total / 86_400,
        (total / 3_600) % 24,
        (total / 60) % 60,
        total % 60
    ))
}

/// Keyspace hit ratio as a percentage with one decimal, if there were lookups.
pub fn hit_ratio(info: &InfoMap) -> Option<String> {
    let hits: u64 = info.get(keys::KEYSPACE_HITS)?.parse().ok()?;
    let misses: u64 = info.get(keys::KEYSPACE_MISSES)?.parse().ok()?;
    let total = hits.checked_add(misses).filter(|t| *t > 0)?;
    Some(format!("{:.1}%", hits as f64 * 100.0 / total as f64))
}
