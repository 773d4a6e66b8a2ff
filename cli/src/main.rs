use clap::{Parser, Subcommand};
use anyhow::{anyhow, Result};
use resper::command::wrappers::SetOptions;
use resper::convert::DecodedValue;
use resper::{InlineClient, MonitorClient, OnlineClient, PubSubClient};

#[derive(Parser)]
#[command(name = "resper")]
#[command(about = "An example interactive client for resper", long_about = None)]
struct Cli {
    /// redis://host:port (rediss:// is parsed but not yet connectable)
    #[arg(long, global = true, default_value = "redis://127.0.0.1:6379")]
    uri: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a PING
    Ping,
    /// GET a key
    Get { key: String },
    /// SET a key, optionally with an expiry
    Set {
        key: String,
        value: String,
        #[arg(long)]
        ex: Option<i64>,
        #[arg(long)]
        nx: bool,
    },
    /// DEL one or more keys
    Del { keys: Vec<String> },
    /// HGETALL a hash
    Hgetall { key: String },
    /// SCAN the keyspace, one page at a time, starting at cursor "0"
    Scan {
        #[arg(default_value = "0")]
        cursor: String,
    },
    /// Subscribe to channels and print events until interrupted
    Subscribe { channels: Vec<String> },
    /// Stream MONITOR output until interrupted
    Monitor,
    /// Send one already RESP-formatted line, including its CRLF
    Raw { line: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ping => {
            let client = OnlineClient::connect(&cli.uri).await?;
            print_reply(client.ping()?.await).await
        }
        Commands::Get { key } => {
            let client = OnlineClient::connect(&cli.uri).await?;
            print_reply(client.get(&key)?.await).await
        }
        Commands::Set { key, value, ex, nx } => {
            let client = OnlineClient::connect(&cli.uri).await?;
            let opts = SetOptions { ex_seconds: ex, nx, ..SetOptions::default() };
            print_reply(client.set(&key, &value, opts)?.await).await
        }
        Commands::Del { keys } => {
            let client = OnlineClient::connect(&cli.uri).await?;
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            print_reply(client.del(&keys)?.await).await
        }
        Commands::Hgetall { key } => {
            let client = OnlineClient::connect(&cli.uri).await?;
            print_reply(client.hgetall(&key)?.await).await
        }
        Commands::Scan { cursor } => {
            let client = OnlineClient::connect(&cli.uri).await?;
            let page = client.scan(&cursor).await?;
            println!("cursor: {}", page.cursor);
            for item in page.items {
                println!("  {item}");
            }
            Ok(())
        }
        Commands::Subscribe { channels } => {
            let client = PubSubClient::connect(&cli.uri).await?;
            let refs: Vec<&str> = channels.iter().map(String::as_str).collect();
            client.subscribe(&refs)?;
            let mut events = client.events();
            loop {
                match events.recv().await {
                    Ok(event) => println!("{event:?}"),
                    Err(_) => break,
                }
            }
            Ok(())
        }
        Commands::Monitor => {
            let client = MonitorClient::connect(&cli.uri).await?;
            let mut lines = client.lines();
            loop {
                match lines.recv().await {
                    Ok(line) => print!("{}", String::from_utf8_lossy(&line)),
                    Err(_) => break,
                }
            }
            Ok(())
        }
        Commands::Raw { line } => {
            let client = InlineClient::connect(&cli.uri).await?;
            let mut lines = client.lines();
            client.send_raw(format!("{line}\r\n").into_bytes().into())?;
            if let Ok(reply) = lines.recv().await {
                print!("{}", String::from_utf8_lossy(&reply));
            }
            Ok(())
        }
    }
}

async fn print_reply(
    reply: Result<resper::Result<DecodedValue>, tokio::sync::oneshot::error::RecvError>,
) -> Result<()> {
    let decoded = reply.map_err(|_| anyhow!("connection closed before a reply arrived"))??;
    println!("{}", format_decoded(&decoded));
    Ok(())
}

fn format_decoded(value: &DecodedValue) -> String {
    match value {
        DecodedValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        DecodedValue::String(s) => s.clone(),
        DecodedValue::Int(n) => n.to_string(),
        DecodedValue::Float(n) => n.to_string(),
        DecodedValue::Array(items) => items
            .iter()
            .map(format_decoded)
            .collect::<Vec<_>>()
            .join(", "),
        DecodedValue::Unit => "OK".to_string(),
        DecodedValue::Raw(v) => format!("{v:?}"),
        DecodedValue::None => "(nil)".to_string(),
    }
}
