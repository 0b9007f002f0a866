//! `LinkGate` CLI — command-line companion for the `LinkGate` server.
//!
//! Token encode/decode and redirect-plan preview run entirely locally
//! through `linkgate-core`; only `status` talks to a running server.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use linkgate_core::codec;
use linkgate_core::config::ConfigRecord;
use linkgate_core::redirect::{self, NavigationPlan};

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";

// ── CLI structure ────────────────────────────────────────────────────

/// LinkGate — subscribe-gated share links.
#[derive(Parser)]
#[command(
    name = "linkgate",
    version,
    about = "LinkGate CLI — encode share tokens, inspect them, preview redirect plans",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         LINKGATE_ADDR          Server address (default: http://127.0.0.1:8080)\n  \
         LINKGATE_PUBLIC_URL    Public base URL used when printing share links\n\n\
         {DIM}Examples:{RESET}\n  \
         linkgate encode --channel-id UC123 --channel-name 'My Channel' \\\n      \
         --subscribe-url 'https://www.youtube.com/channel/UC123?sub_confirmation=1' \\\n      \
         --download-url 'https://example.com/guide.pdf'\n  \
         linkgate decode v1.aB3xYz.eyJjIjoi...\n  \
         linkgate plan --user-agent 'Mozilla/5.0 (Linux; Android 13; wv) ...'\n  \
         linkgate status"
    ),
)]
struct Cli {
    /// LinkGate server address.
    #[arg(long, env = "LINKGATE_ADDR", default_value = "http://127.0.0.1:8080")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a configuration into a share token.
    Encode {
        /// Channel identifier.
        #[arg(long)]
        channel_id: String,
        /// Channel display name.
        #[arg(long)]
        channel_name: String,
        /// Subscribe URL (must point at the platform).
        #[arg(long)]
        subscribe_url: String,
        /// Destination URL unlocked after subscribing.
        #[arg(long)]
        download_url: String,
        /// Public base URL for the printed share link.
        #[arg(long, env = "LINKGATE_PUBLIC_URL", default_value = "http://127.0.0.1:8080")]
        public_url: String,
    },
    /// Decode a share token and print the embedded configuration.
    Decode {
        /// The token to decode.
        token: String,
    },
    /// Preview the redirect plan for a user agent.
    Plan {
        /// The User-Agent string to classify.
        #[arg(long)]
        user_agent: String,
        /// Treat the request as arriving inside a frame.
        #[arg(long, default_value = "false")]
        framed: bool,
        /// Destination the plan should open.
        #[arg(long, default_value = "https://example.com/download")]
        destination: String,
    },
    /// Show server health.
    Status,
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli.addr, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(addr: &str, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Encode {
            channel_id,
            channel_name,
            subscribe_url,
            download_url,
            public_url,
        } => cmd_encode(
            ConfigRecord {
                channel_id,
                channel_name,
                subscribe_url,
                download_url,
            },
            &public_url,
        ),
        Commands::Decode { token } => cmd_decode(&token),
        Commands::Plan {
            user_agent,
            framed,
            destination,
        } => {
            cmd_plan(&user_agent, framed, &destination);
            Ok(())
        }
        Commands::Status => cmd_status(addr).await,
    }
}

// ── Commands ─────────────────────────────────────────────────────────

fn cmd_encode(record: ConfigRecord, public_url: &str) -> Result<()> {
    let token = codec::encode(&record).context("failed to encode configuration")?;
    let share_url = format!("{}/c/{token}", public_url.trim_end_matches('/'));

    println!();
    println!("  {GREEN}{BOLD}✓{RESET} Token issued for {BOLD}{}{RESET}", record.channel_name);
    println!();
    println!("  {DIM}token:{RESET}      {token}");
    println!("  {DIM}share url:{RESET}  {CYAN}{share_url}{RESET}");
    println!();
    Ok(())
}

fn cmd_decode(token: &str) -> Result<()> {
    let record = codec::decode(token).context("failed to decode token")?;
    let json = serde_json::to_string_pretty(&record).context("failed to render configuration")?;
    println!("{json}");
    Ok(())
}

fn cmd_plan(user_agent: &str, framed: bool, destination: &str) {
    let env = redirect::classify_environment(user_agent, framed);
    let plan = redirect::plan_navigation(destination, &env);

    println!();
    println!(
        "  {DIM}platform:{RESET}  {:?}    {DIM}embedded:{RESET}  {}",
        env.platform, env.embedded
    );
    match plan {
        NavigationPlan::DirectOpen { url } => {
            println!("  {DIM}plan:{RESET}      {GREEN}direct open{RESET}");
            println!("  {DIM}url:{RESET}       {url}");
        }
        NavigationPlan::AndroidIntent { url, intent_url } => {
            println!("  {DIM}plan:{RESET}      {YELLOW}android intent{RESET}");
            println!("  {DIM}url:{RESET}       {url}");
            println!("  {DIM}intent:{RESET}    {intent_url}");
        }
        NavigationPlan::ManualPrompt { url } => {
            println!("  {DIM}plan:{RESET}      {YELLOW}manual prompt{RESET}");
            println!("  {DIM}url:{RESET}       {url}");
        }
    }
    println!();
}

async fn cmd_status(addr: &str) -> Result<()> {
    println!();
    println!("  {DIM}checking {addr}...{RESET}");

    let resp = reqwest::Client::new()
        .get(format!("{addr}/healthz"))
        .send()
        .await
        .context("request failed — is the server running?")?;
    let status = resp.status();
    let body: Value = resp.json().await.context("invalid health response")?;

    if status.is_success() {
        let version = body.get("version").and_then(Value::as_str).unwrap_or("?");
        println!();
        println!("  {GREEN}{BOLD}✓{RESET} server healthy {DIM}(v{version}){RESET}");
        println!();
        Ok(())
    } else {
        anyhow::bail!("server returned {status}: {body}")
    }
}
