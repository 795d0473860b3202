use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use three_card_core::BetLimits;

/// 服务器启动参数
#[derive(Parser, Debug, Clone)]
#[command(name = "three_card_server", version, about = "三张牌扑克服务器")]
pub struct ServerConfig {
    /// 监听地址
    #[arg(long, env = "THREE_CARD_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// 监听端口
    #[arg(short, long, env = "THREE_CARD_PORT", default_value_t = 25917)]
    pub port: u16,

    /// 单注下限
    #[arg(long, default_value_t = 5)]
    pub min_bet: u32,

    /// 单注上限
    #[arg(long, default_value_t = 25)]
    pub max_bet: u32,

    /// 发牌后等待玩家决定的秒数，超时自动弃牌。不设置则一直等待
    #[arg(long, value_name = "SECS")]
    pub decision_timeout: Option<u64>,

    /// 输出调试日志
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("下注下限必须大于 0")]
    ZeroMinBet,

    #[error("下注下限 {min} 大于上限 {max}")]
    InvertedLimits { min: u32, max: u32 },

    #[error("决定超时必须大于 0 秒")]
    ZeroTimeout,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_bet == 0 {
            return Err(ConfigError::ZeroMinBet);
        }
        if self.min_bet > self.max_bet {
            return Err(ConfigError::InvertedLimits { min: self.min_bet, max: self.max_bet });
        }
        if self.decision_timeout == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn limits(&self) -> BetLimits {
        BetLimits { min: self.min_bet, max: self.max_bet }
    }

    pub fn decision_timeout(&self) -> Option<Duration> {
        self.decision_timeout.map(Duration::from_secs)
    }
}
