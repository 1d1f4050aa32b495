//! Standalone client binary.
//!
//! Usage:
//!   cargo run -p doorwave_client -- [--addr 127.0.0.1:40000] [--name Player] [--room AB2C]
//!
//! The client connects to the server, joins a room, predicts local
//! movement toward the current target, and redraws the scene every tick.
//!
//! Console commands:
//!   join <code>   - Join a room by code
//!   create        - Create a room with a fresh code
//!   start         - Begin the round (host only)
//!   goto <x> <y>  - Set the movement target
//!   open          - Try to open a nearby door
//!   say <message> - Send chat message
//!   buy <item>    - Buy from an open shop
//!   invite        - Show the invite line for the current room
//!   status        - Show session status and HUD
//!   quit          - Exit client

use std::env;
use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::Context;
use doorwave_client::client::{GameClient, SessionState};
use doorwave_client::render::{NullSurface, RenderEngine};
use doorwave_shared::config::ClientConfig;
use doorwave_shared::shop::{epoch_ms, ShopWindow};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

fn parse_args() -> ClientConfig {
    let mut cfg = ClientConfig::default();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" if i + 1 < args.len() => {
                cfg.server_addr = args[i + 1].clone();
                i += 2;
            }
            "--name" if i + 1 < args.len() => {
                cfg.player_name = args[i + 1].clone();
                i += 2;
            }
            "--room" if i + 1 < args.len() => {
                cfg.room_code = Some(args[i + 1].clone());
                i += 2;
            }
            "--tick-hz" if i + 1 < args.len() => {
                cfg.tick_hz = args[i + 1].parse().unwrap_or(60);
                i += 2;
            }
            _ => i += 1,
        }
    }
    cfg
}

/// Countdown task for one shop window: its own cancellable interval,
/// polled at 100ms against the server-supplied close time. Prints when
/// the whole-second reading changes, stops itself at zero.
fn spawn_shop_countdown(shop: ShopWindow) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(100));
        let mut last_secs = u64::MAX;
        loop {
            interval.tick().await;
            let now = epoch_ms();
            if !shop.is_open(now) {
                println!("Shop closed.");
                break;
            }
            let secs = shop.remaining(now).as_secs();
            if secs != last_secs {
                println!("{}", shop.label(now));
                last_secs = secs;
            }
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = parse_args();
    info!(server = %cfg.server_addr, name = %cfg.player_name, "Starting client");

    let mut client = GameClient::connect(&cfg).await.context("connect")?;

    if let Some(room) = &cfg.room_code {
        for line in client.exec_console(&format!("join {room}")).await? {
            println!("{line}");
        }
    }

    // Set up console input channel.
    let (console_tx, mut console_rx) = mpsc::channel::<String>(32);

    // Spawn stdin reader thread.
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("] ");
            let _ = stdout.flush();
            let mut line = String::new();
            if stdin.lock().read_line(&mut line).is_err() {
                break;
            }
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    println!("Client connected. Type 'status' for info, 'quit' to exit.");
    println!();

    let tick_interval = Duration::from_secs_f32(1.0 / cfg.tick_hz as f32);
    let mut engine = RenderEngine::new();
    let mut surface = NullSurface::default();
    let mut chat_seen: u64 = 0;
    let mut last_hud = None;
    let mut shop_task: Option<(u64, JoinHandle<()>)> = None;

    loop {
        // Process console commands.
        while let Ok(line) = console_rx.try_recv() {
            match client.exec_console(&line).await {
                Ok(output) => {
                    for line in output {
                        println!("{line}");
                    }
                }
                Err(e) => {
                    println!("Error: {e}");
                }
            }
        }

        // Drain inbound events into the store.
        client.poll_events().await?;

        if client.state == SessionState::Closed {
            println!("Disconnected from server.");
            break;
        }

        // Predict, then send the delta if the avatar moved.
        if let Err(e) = client.tick().await {
            println!("Tick error: {e}");
        }

        // Print transcript lines that arrived since the last loop.
        let total = client.chat.total();
        if total > chat_seen {
            let fresh = (total - chat_seen) as usize;
            for line in client.chat.recent(fresh) {
                println!("{line}");
            }
            chat_seen = total;
        }

        // HUD line on meaningful state changes.
        if client.store.take_redraw() {
            let hud = client.store.hud();
            if last_hud.map(|h: doorwave_client::store::HudSummary| (h.phase, h.wave))
                != Some((hud.phase, hud.wave))
            {
                println!("{hud}");
            }
            last_hud = Some(hud);
        }

        // A new shop window replaces the previous countdown task.
        if let Some(shop) = client.shop {
            let stale = shop_task
                .as_ref()
                .map_or(true, |(ends, _)| *ends != shop.ends_at_ms);
            if stale {
                if let Some((_, task)) = shop_task.take() {
                    task.abort();
                }
                shop_task = Some((shop.ends_at_ms, spawn_shop_countdown(shop)));
            }
        }

        // Redraw the whole scene from state.
        let local = client.store.local_player().cloned();
        engine.render(client.store.state(), local.as_ref(), &mut surface);

        tokio::time::sleep(tick_interval).await;
    }

    Ok(())
}
