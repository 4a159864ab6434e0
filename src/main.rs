// MIT License - Copyright (c) 2026 The lora-sentinel authors
// Receiver-node daemon

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

use lora_sentinel::clock::{format_uptime, MonotonicClock};
use lora_sentinel::config::NodeConfig;
use lora_sentinel::error::SentinelError;
use lora_sentinel::node::{Node, Peripherals, RestartKind, TickOutcome};
use lora_sentinel::peripherals::{
    AccessPoint, ApConfig, ApDetails, BeepPattern, Buzzer, MotionAlert, Notifier,
    SharedLinkStatus,
};
use lora_sentinel::storage::{Credentials, FsConfigStore};
use lora_sentinel::transport::udp::UdpRadio;

/// Coordinator loop cadence.
const TICK_MS: u64 = 20;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "lora2mqtt")]
#[command(about = "Receiver node of a two-node LoRa security link")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(default)]
    node: NodeToml,
    radio: RadioToml,
    mqtt: MqttToml,
    #[serde(default)]
    setup: SetupToml,
}

#[derive(Debug, Default, Deserialize)]
struct NodeToml {
    /// Fixed receiver identity. Derived from the host when omitted.
    #[serde(default)]
    receiver_id: Option<String>,
    #[serde(default = "default_status_interval")]
    status_interval_ms: u64,
}

fn default_status_interval() -> u64 {
    30_000
}

#[derive(Debug, Deserialize)]
struct RadioToml {
    /// Local address of the LoRa datagram bridge.
    #[serde(default = "default_radio_bind")]
    bind: String,
    /// Address the peer transmitter's bridge listens on.
    peer: String,
}

fn default_radio_bind() -> String {
    "0.0.0.0:1700".to_string()
}

#[derive(Debug, Deserialize)]
struct MqttToml {
    url: String,
    #[serde(default = "default_client_id")]
    client_id: String,
    #[serde(default = "default_alert_topic")]
    alert_topic: String,
}

fn default_client_id() -> String {
    "lora-sentinel".to_string()
}
fn default_alert_topic() -> String {
    "lora/motion".to_string()
}

#[derive(Debug, Deserialize)]
struct SetupToml {
    #[serde(default = "default_storage_dir")]
    storage_dir: PathBuf,
    /// Command run to bring up the configuration access point. Receives the
    /// network parameters in AP_SSID, AP_PASSPHRASE, AP_CHANNEL and
    /// AP_MAX_CLIENTS, and prints the portal address on stdout.
    #[serde(default)]
    ap_command: Option<String>,
    /// sysfs value file driving the buzzer output. Log-only when omitted.
    #[serde(default)]
    buzzer_gpio: Option<PathBuf>,
}

impl Default for SetupToml {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            ap_command: None,
            buzzer_gpio: None,
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("/var/lib/lora-sentinel")
}

// ---------------------------------------------------------------------------
// MQTT JSON types
// ---------------------------------------------------------------------------

// Published alert — flat {now, op, ...} structure
#[derive(Serialize)]
struct MqttMotionAlert {
    now: u64,
    op: String,
    id: String,
    count: u64,
    rssi: i16,
    uptime: String,
    payload: String,
}

fn now_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

// ---------------------------------------------------------------------------
// Peripheral implementations
// ---------------------------------------------------------------------------

/// Publishes motion alerts to the broker without blocking the loop.
struct MqttNotifier {
    client: AsyncClient,
    topic: String,
    receiver_id: String,
}

impl Notifier for MqttNotifier {
    fn notify_motion(&mut self, alert: &MotionAlert) -> lora_sentinel::error::Result<()> {
        let msg = MqttMotionAlert {
            now: now_epoch_ms(),
            op: "MOTION_ALERT".to_string(),
            id: self.receiver_id.clone(),
            count: alert.count,
            rssi: alert.rssi,
            uptime: format_uptime(alert.uptime_ms / 1000),
            payload: alert.payload.clone(),
        };
        let json = serde_json::to_string(&msg)?;
        self.client
            .try_publish(&self.topic, QoS::AtLeastOnce, false, json)
            .map_err(|e| SentinelError::Notify {
                reason: e.to_string(),
            })
    }
}

/// Brings up the configuration network by running an operator-supplied
/// command (hostapd wrapper or similar).
struct CommandAccessPoint {
    command: Option<String>,
}

impl AccessPoint for CommandAccessPoint {
    fn start(&mut self, config: &ApConfig) -> lora_sentinel::error::Result<ApDetails> {
        let Some(command) = &self.command else {
            return Err(SentinelError::AccessPoint {
                reason: "no ap_command configured".to_string(),
            });
        };
        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .env("AP_SSID", config.ssid)
            .env("AP_PASSPHRASE", config.passphrase)
            .env("AP_CHANNEL", config.channel.to_string())
            .env("AP_MAX_CLIENTS", config.max_clients.to_string())
            .output()
            .map_err(|e| SentinelError::AccessPoint {
                reason: format!("failed to run ap_command: {e}"),
            })?;
        if !output.status.success() {
            return Err(SentinelError::AccessPoint {
                reason: format!("ap_command exited with {}", output.status),
            });
        }
        Ok(ApDetails {
            ip: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        })
    }
}

/// Drives a sysfs GPIO value file; falls back to log lines when none is
/// configured (bench setups without the buzzer wired up).
struct GpioBuzzer {
    path: Option<PathBuf>,
}

impl GpioBuzzer {
    fn write_level(&self, active: bool) {
        if let Some(path) = &self.path {
            if let Err(e) = std::fs::write(path, if active { "1" } else { "0" }) {
                warn!(path = %path.display(), error = %e, "failed to drive buzzer gpio");
            }
        }
    }
}

impl Buzzer for GpioBuzzer {
    fn set_active(&mut self, active: bool) {
        self.write_level(active);
    }

    fn chirp(&mut self, pattern: &BeepPattern) {
        info!(
            count = pattern.count,
            on_ms = pattern.on_ms,
            "buzzer chirp"
        );
        for _ in 0..pattern.count {
            self.write_level(true);
            std::thread::sleep(std::time::Duration::from_millis(pattern.on_ms));
            self.write_level(false);
            std::thread::sleep(std::time::Duration::from_millis(pattern.off_ms));
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=lora_sentinel=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt().without_time().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();

    let config_text =
        std::fs::read_to_string(&cli.config).context("Failed to read config file")?;
    let config: Config = toml::from_str(&config_text).context("Failed to parse config file")?;

    let store = FsConfigStore::new(&config.setup.storage_dir)
        .context("Failed to open credential store")?;
    let credentials = Credentials::load(&store).context("Failed to load stored credentials")?;

    // Radio bridge. The peer may come up after us, so keep retrying with
    // feedback rather than giving up.
    let clock = MonotonicClock::new();
    let radio = loop {
        match UdpRadio::bind(&config.radio.bind, &config.radio.peer) {
            Ok(radio) => break radio,
            Err(e) => {
                warn!(error = %e, bind = %config.radio.bind, "radio bridge unavailable, retrying");
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };
    let irq = radio.irq_handle().context("Failed to clone radio socket")?;

    // MQTT uplink: the broker connection doubles as the connectivity signal.
    let (mqtt_host, mqtt_port) = parse_mqtt_url(&config.mqtt.url)?;
    let mut mqtt_opts = MqttOptions::new(&config.mqtt.client_id, &mqtt_host, mqtt_port);
    mqtt_opts.set_keep_alive(Duration::from_secs(30));
    let (client, mut eventloop) = AsyncClient::new(mqtt_opts, 64);

    let link = SharedLinkStatus::new();
    let link_feed = link.clone();
    tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("MQTT: connected");
                    link_feed.set_connected(true);
                }
                Ok(_) => {}
                Err(e) => {
                    error!("MQTT event loop error: {e}");
                    link_feed.set_connected(false);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    });

    let receiver_id = config
        .node
        .receiver_id
        .clone()
        .unwrap_or_else(lora_sentinel::state::derive_receiver_id);
    let node_config = NodeConfig::builder()
        .receiver_id(&receiver_id)
        .status_interval_ms(config.node.status_interval_ms)
        .build();

    let mut node = Node::new(
        &node_config,
        Peripherals {
            radio: Box::new(radio),
            link: Box::new(link),
            access_point: Box::new(CommandAccessPoint {
                command: config.setup.ap_command.clone(),
            }),
            buzzer: Box::new(GpioBuzzer {
                path: config.setup.buzzer_gpio.clone(),
            }),
            notifier: Box::new(MqttNotifier {
                client,
                topic: config.mqtt.alert_topic.clone(),
                receiver_id: receiver_id.clone(),
            }),
            store: Box::new(store),
        },
    );
    info!(%receiver_id, "receiver node up");

    if !credentials.is_complete() {
        warn!("stored credentials incomplete, starting in setup mode");
        node.enter_setup_mode();
    }

    // Frame-arrival watcher: polls the companion socket handle and sets
    // the ingest latch, the way a radio DIO line would.
    let ingest = node.ingest();
    std::thread::spawn(move || loop {
        if irq.wait() {
            ingest.on_packet_ready();
        }
    });

    // SIGUSR1/SIGUSR2 emulate the physical button for installations without
    // one wired up: short press and long press respectively.
    let mut sigusr1 = signal(SignalKind::user_defined1())?;
    let mut sigusr2 = signal(SignalKind::user_defined2())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let button = node.button();
    let mut ticker = interval(Duration::from_millis(TICK_MS));

    info!("Receiver running. SIGUSR1 = restart button, SIGUSR2 = factory reset, SIGINT/SIGTERM to stop.");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match node.tick(clock.now_ms()) {
                    TickOutcome::Continue => {}
                    TickOutcome::Restart(kind) => {
                        match kind {
                            RestartKind::Plain => info!("restarting"),
                            RestartKind::FactoryReset => {
                                info!("restarting after factory reset")
                            }
                        }
                        // The process supervisor brings us back up.
                        break;
                    }
                }
            }
            _ = sigusr1.recv() => {
                info!("SIGUSR1: emulating short button press");
                press_button(&button, &clock, 150);
            }
            _ = sigusr2.recv() => {
                info!("SIGUSR2: emulating long button press");
                press_button(&button, &clock, 2_200);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Emulate a press edge now and the release edge `hold_ms` later.
fn press_button(
    button: &Arc<lora_sentinel::button::ButtonDebouncer>,
    clock: &MonotonicClock,
    hold_ms: u64,
) {
    button.on_edge(true, clock.now_ms());
    let button = Arc::clone(button);
    let clock = clock.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(hold_ms)).await;
        button.on_edge(false, clock.now_ms());
    });
}

/// Parse an MQTT URL like "mqtt://host:port" into (host, port).
fn parse_mqtt_url(url: &str) -> Result<(String, u16)> {
    let stripped = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port_str) = stripped
        .rsplit_once(':')
        .context("MQTT URL must be in format mqtt://host:port")?;

    let port: u16 = port_str.parse().context("Invalid MQTT port number")?;

    Ok((host.to_string(), port))
}
