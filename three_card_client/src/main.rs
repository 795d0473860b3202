use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use url::Url;

use three_card_core::{
    category, decode, encode, BetLimits, ClientMessage, ClientTable, Hand, Outcome, Phase, RoundObserver,
    RoundResult, ServerMessage,
};

#[derive(Debug, Parser)]
#[command(name = "three_card_client", about = "三张牌扑克命令行客户端")]
struct Args {
    /// 服务器地址
    #[arg(long, env = "THREE_CARD_URL", default_value = "ws://127.0.0.1:25917/ws")]
    url: Url,
}

/// 把牌局事件打印到终端
struct ConsolePrinter;

impl RoundObserver for ConsolePrinter {
    fn on_welcome(&mut self, limits: BetLimits, total_winnings: i64) {
        println!("\n欢迎！下注范围 ${} - ${}（0 表示不下），当前累计 ${}", limits.min, limits.max, total_winnings);
        prompt();
    }

    fn on_dealt(&mut self, hand: &Hand) {
        println!("\n你的手牌: {}  [{}]", hand, category(hand));
        println!("输入 play 跟注（跟注额等于底注）或 fold 弃牌");
        prompt();
    }

    fn on_showdown(&mut self, result: &RoundResult) {
        println!("\n庄家手牌: {}  [{}]", result.dealer_hand, category(&result.dealer_hand));
        if result.folded {
            return;
        }
        if !result.dealer_qualifies {
            println!("庄家不合格（需要 Q 高或更好），底注与跟注退回");
        }
        if result.pair_plus_payout > 0 {
            println!("对子加注赢得 ${}", result.pair_plus_payout);
        }
    }

    fn on_result(&mut self, outcome: Outcome, round_delta: i64, total_winnings: i64) {
        println!("结果: {}，本局 {:+}，累计 {:+}", outcome, round_delta, total_winnings);
        println!("输入 bet <底注> [对子加注] 开始下一局");
        prompt();
    }

    fn on_error(&mut self, message: &str) {
        eprintln!("\n❌ {}", message);
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_help() {
    println!("--- 三张牌扑克客户端 ---");
    println!("可用命令:");
    println!("  bet <底注> [对子加注]     - 下注并开始一局");
    println!("  play                      - 跟注");
    println!("  fold                      - 弃牌");
    println!("  reset                     - 重新开始，累计输赢清零");
    println!("  help                      - 显示帮助");
    println!("  exit                      - 退出");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("正在连接到: {}", args.url);
    let (ws_stream, _) = connect_async(args.url.as_str()).await?;
    println!("连接成功!");

    let (mut write, mut read) = ws_stream.split();
    let table = Arc::new(Mutex::new(ClientTable::new()));

    // 启动一个任务来处理从服务器接收的消息
    let reader_table = table.clone();
    let reader = tokio::spawn(async move {
        let mut printer = ConsolePrinter;
        let reason = loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => match decode::<ServerMessage>(text.as_str()) {
                    Ok(msg) => reader_table.lock().await.dispatch(msg, &mut printer),
                    Err(e) => break format!("解析服务器消息失败: {}", e),
                },
                Some(Ok(Message::Close(_))) | None => break "服务器已关闭连接".to_string(),
                Some(Ok(_)) => {}
                Some(Err(e)) => break format!("接收消息时出错: {}", e),
            }
        };
        reader_table.lock().await.connection_lost(&reason, &mut printer);
    });

    // 主任务处理用户输入
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    print_help();

    loop {
        let Some(line) = stdin.next_line().await? else {
            // 输入结束，按退出处理
            write.send(Message::Text(encode(&ClientMessage::Disconnect)?.into())).await?;
            break;
        };
        let parts: Vec<&str> = line.split_whitespace().collect();

        let mut table_state = table.lock().await;
        if table_state.phase() == Phase::Closed {
            println!("连接已关闭");
            break;
        }

        let client_msg = match parts.first().copied() {
            Some("bet") => {
                if table_state.waiting_for_server() {
                    println!("正在等待服务器回应");
                    prompt();
                    continue;
                }
                if !table_state.can_bet() {
                    println!("请先决定 play 或 fold");
                    prompt();
                    continue;
                }
                let Some(ante) = parts.get(1) else {
                    println!("用法: bet <底注> [对子加注]");
                    prompt();
                    continue;
                };
                let pair_plus = parts.get(2).copied().unwrap_or("0");
                match table_state.submit_bets(ante, pair_plus) {
                    Ok(msg) => msg,
                    Err(e) => {
                        println!("{}", e);
                        prompt();
                        continue;
                    }
                }
            }
            Some(cmd @ ("play" | "fold")) => {
                if table_state.waiting_for_server() {
                    println!("正在等待服务器回应");
                    prompt();
                    continue;
                }
                if !table_state.awaiting_decision() {
                    println!("现在还没有发牌，请先下注");
                    prompt();
                    continue;
                }
                if cmd == "play" { ClientMessage::Play } else { ClientMessage::Fold }
            }
            Some("reset") => {
                table_state.fresh_start();
                println!("累计输赢已清零");
                prompt();
                continue;
            }
            Some("help") => {
                print_help();
                prompt();
                continue;
            }
            Some("exit") => {
                println!("正在断开连接...");
                drop(table_state);
                write.send(Message::Text(encode(&ClientMessage::Disconnect)?.into())).await?;
                break;
            }
            None => {
                prompt();
                continue;
            }
            Some(_) => {
                println!("未知命令: {}", line);
                prompt();
                continue;
            }
        };

        // 先记下再发送，回应不会早于记录到达
        table_state.sent(&client_msg);
        drop(table_state);

        write.send(Message::Text(encode(&client_msg)?.into())).await?;
    }

    let _ = write.close().await;
    reader.abort();
    Ok(())
}
