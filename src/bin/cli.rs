//! tsquery CLI
//!
//! Command-line interface for poking a ServerQuery endpoint: run a single
//! command and print its reply, or listen for server notifications.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use tsquery::dispatch::signals;
use tsquery::{Config, EventDispatcher, Notification, QueryAdapter, Reply, ReplyList};

/// tsquery CLI
#[derive(Parser, Debug)]
#[command(name = "tsquery-cli")]
#[command(about = "CLI for the TeamSpeak 3 ServerQuery protocol")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// ServerQuery port
    #[arg(short, long, default_value = "10011")]
    port: u16,

    /// Connect/read timeout in seconds
    #[arg(short, long, default_value = "10")]
    timeout: u64,

    /// ServerQuery login name (sends a login command when set)
    #[arg(long)]
    login: Option<String>,

    /// ServerQuery password (used with --login)
    #[arg(long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one raw command and print the reply rows
    Exec {
        /// The command line, e.g. `serverlist` or `use sid=1`
        command: Vec<String>,
    },

    /// Register for server notifications and print events as they arrive
    Listen {
        /// Notification categories to register, e.g. `server` or `textserver`
        #[arg(short, long, default_values_t = vec!["server".to_string()])]
        events: Vec<String>,

        /// Virtual server id to select before registering
        #[arg(short, long, default_value = "1")]
        sid: u64,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tsquery=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> tsquery::Result<()> {
    let blocking = matches!(args.command, Commands::Exec { .. });

    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .timeout(Duration::from_secs(args.timeout))
        .blocking(blocking)
        .build()?;

    let dispatcher = Arc::new(EventDispatcher::new());
    let mut adapter = QueryAdapter::connect(config, Arc::clone(&dispatcher))?;

    if let Some(login) = &args.login {
        let password = args.password.as_deref().unwrap_or_default();
        adapter.request(&format!(
            "login client_login_name={} client_login_password={}",
            tsquery::protocol::escape::escape(login),
            tsquery::protocol::escape::escape(password)
        ))?;
    }

    match args.command {
        Commands::Exec { command } => {
            let line = command.join(" ");
            let reply = adapter.request(&line)?;
            print_reply(&reply);
        }
        Commands::Listen { events, sid } => {
            adapter.request(&format!("use sid={}", sid))?;

            for category in &events {
                adapter.request(&format!("servernotifyregister event={}", category))?;
            }

            dispatcher.subscribe(signals::EVENT, |notification| {
                if let Notification::Event { event } = notification {
                    println!("[{}] {}", event.event_type(), event.message());
                }
            });

            tracing::info!("listening for notifications (Ctrl+C to stop)");
            loop {
                adapter.wait()?;
            }
        }
    }

    Ok(())
}

/// Print a reply's rows as `field=value` lines, one block per row
fn print_reply(reply: &Reply) {
    match reply.to_list() {
        ReplyList::Single(row) => {
            for (key, value) in row.iter() {
                println!("{}={}", key, value);
            }
        }
        ReplyList::Many(rows) => {
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                for (key, value) in row.iter() {
                    println!("{}={}", key, value);
                }
            }
        }
    }
}
