use std::collections::VecDeque;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use tracing::info;

use three_card_core::EventLog;

/// 事件日志中的一条记录
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub text: String,
}

/// 内存中最多保留的事件条数
pub const LOG_CAPACITY: usize = 10_000;

/// 进程级共享状态：事件日志和在线连接数
///
/// 服务器启动时创建，停止时随 `AppState` 一起释放。
/// 日志只追加，由互斥锁保护，超出容量时丢弃最早的记录（完整记录见 tracing 输出）；
/// 连接数用原子计数。两者都不会反过来影响牌局逻辑。
#[derive(Debug)]
pub struct GameManager {
    log: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    connections: AtomicUsize,
}

impl GameManager {
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        GameManager {
            log: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            connections: AtomicUsize::new(0),
        }
    }

    /// 追加一条带时间戳的事件
    pub fn record(&self, text: impl Into<String>) {
        let entry = LogEntry { at: Local::now(), text: text.into() };
        info!("{}", entry.text);
        let mut log = self.log.lock();
        if log.len() == self.capacity {
            log.pop_front();
        }
        log.push_back(entry);
    }

    pub fn connection_opened(&self, peer: SocketAddr) -> usize {
        let count = self.connections.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(format!("新客户端连接: {}", peer));
        self.update_connection_count(count);
        count
    }

    /// 连接数不会减到 0 以下
    pub fn connection_closed(&self, peer: SocketAddr) -> usize {
        let count = self
            .connections
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .map_or(0, |prev| prev.saturating_sub(1));
        self.record(format!("客户端断开: {}", peer));
        self.update_connection_count(count);
        count
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// 最近的 `limit` 条事件，按时间先后排列
    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        let log = self.log.lock();
        log.iter().skip(log.len().saturating_sub(limit)).cloned().collect()
    }

    fn update_connection_count(&self, count: usize) {
        info!(connections = count, "当前在线连接数: {}", count);
    }
}

impl Default for GameManager {
    fn default() -> Self {
        GameManager::new()
    }
}

impl EventLog for GameManager {
    fn log_event(&self, text: String) {
        self.record(text);
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%Y-%m-%d %H:%M:%S"), self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn peer(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[test]
    fn test_connection_counting() {
        let manager = GameManager::new();
        assert_eq!(manager.connection_opened(peer(1)), 1);
        assert_eq!(manager.connection_opened(peer(2)), 2);
        assert_eq!(manager.connection_closed(peer(1)), 1);
        assert_eq!(manager.connection_closed(peer(2)), 0);
        // 多关一次也不会变成负数
        assert_eq!(manager.connection_closed(peer(2)), 0);
        assert_eq!(manager.connection_count(), 0);
    }

    #[test]
    fn test_recent_entries() {
        let manager = GameManager::new();
        for i in 0..10 {
            manager.record(format!("event {}", i));
        }
        let recent = manager.recent(3);
        let texts: Vec<_> = recent.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["event 7", "event 8", "event 9"]);
        assert_eq!(manager.recent(100).len(), 10);
        assert!(recent[0].to_string().ends_with("] event 7"));
    }

    #[test]
    fn test_log_drops_oldest_beyond_capacity() {
        let manager = GameManager::with_capacity(5);
        for i in 0..12 {
            manager.record(format!("event {}", i));
        }
        let texts: Vec<_> = manager.recent(usize::MAX).into_iter().map(|e| e.text).collect();
        assert_eq!(texts, ["event 7", "event 8", "event 9", "event 10", "event 11"]);
        assert_eq!(manager.recent(2).len(), 2);
    }

    #[test]
    fn test_concurrent_updates() {
        let manager = Arc::new(GameManager::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let manager = manager.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        manager.connection_opened(peer(i));
                        manager.log_event("round".to_string());
                        manager.connection_closed(peer(i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(manager.connection_count(), 0);
        // 每轮 3 条：连接、牌局、断开
        assert_eq!(manager.recent(usize::MAX).len(), 8 * 100 * 3);
    }
}
