//! # 三张牌扑克核心逻辑库
//!
//! 这个 `core` crate 包含了牌局的状态机、牌型评估与派彩、
//! 以及客户端-服务器通信消息的定义。
//! 它与具体实现（如网络服务器、客户端UI）解耦，
//! 服务器和客户端都依赖它。

mod card;
mod deck;
mod error;
mod eval;
mod message;
mod session;
mod state;
mod table;

pub use card::*;

pub use deck::*;

pub use error::*;

pub use eval::*;

pub use message::*;

pub use session::*;

pub use state::*;

pub use table::*;
