//! MQTT remote control
//!
//! Subscribes to a topic and turns each message into a `ConfigPatch` for the
//! main loop. Payloads are either a JSON patch object or a bare preset name
//! such as `thinking`.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use rumqttc::{Client, Connection, Event, MqttOptions, Packet, QoS};

use crate::config::ConfigPatch;
use crate::error::{OrbError, Result};
use crate::preset::Preset;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_TOPIC: &str = "agent-orb/state";
const CLIENT_ID: &str = "agent-orb";

/// Decode one message payload. Returns `None` for blank or unreadable input.
pub fn parse_payload(payload: &[u8]) -> Option<ConfigPatch> {
    let text = std::str::from_utf8(payload).ok()?.trim();
    if text.is_empty() {
        return None;
    }

    if text.starts_with('{') {
        return match serde_json::from_str::<ConfigPatch>(text) {
            Ok(patch) => Some(patch),
            Err(e) => {
                log::warn!("ignoring malformed remote patch: {}", e);
                None
            },
        };
    }

    match text.trim_matches('"').parse::<Preset>() {
        Ok(preset) => Some(ConfigPatch::preset(preset)),
        Err(e) => {
            log::warn!("ignoring remote message: {}", e);
            None
        },
    }
}

/// MQTT client that receives patches in a background thread
pub struct RemoteControl {
    receiver: Receiver<ConfigPatch>,
    _thread: thread::JoinHandle<()>,
}

impl RemoteControl {
    /// Connect and subscribe. Fails immediately if the broker is unreachable.
    pub fn connect(host: &str, port: u16, topic: &str) -> Result<Self> {
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        let topic = if topic.is_empty() { DEFAULT_TOPIC } else { topic };

        let mut options = MqttOptions::new(CLIENT_ID, host, port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, 10);

        client
            .subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| OrbError::Remote(format!("subscribe to '{}' failed: {}", topic, e)))?;

        // Poll once so an unreachable broker fails here rather than later
        match connection.iter().next() {
            Some(Ok(_)) => {},
            Some(Err(e)) => {
                return Err(OrbError::Remote(format!(
                    "cannot reach broker at {}:{}: {}",
                    host, port, e
                )));
            },
            None => {
                return Err(OrbError::Remote(format!(
                    "cannot reach broker at {}:{}: connection closed",
                    host, port
                )));
            },
        }

        let (sender, receiver) = mpsc::channel();
        let topic_owned = topic.to_string();

        let handle = thread::Builder::new()
            .name("orb-remote".to_string())
            .spawn(move || {
                // The client must outlive the event loop or the connection drops
                let _client = client;
                Self::message_loop(connection, sender, &topic_owned);
            })
            .map_err(spawn_error)?;

        log::info!("remote control on {}:{}, topic '{}'", host, port, topic);

        Ok(Self {
            receiver,
            _thread: handle,
        })
    }

    fn message_loop(mut connection: Connection, sender: Sender<ConfigPatch>, topic: &str) {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == topic => {
                    let Some(patch) = parse_payload(&publish.payload) else {
                        continue;
                    };
                    log::debug!("remote patch: {:?}", patch);
                    if sender.send(patch).is_err() {
                        // Receiver gone, exit
                        break;
                    }
                },
                Ok(_) => {},
                Err(e) => {
                    // rumqttc reconnects on the next iteration
                    log::warn!("mqtt error: {}", e);
                    thread::sleep(Duration::from_secs(1));
                },
            }
        }
    }

    /// Drain pending messages (non-blocking), folding them into one patch so
    /// later fields win. Returns `None` when nothing arrived.
    pub fn poll(&self) -> Option<ConfigPatch> {
        coalesce(self.receiver.try_iter())
    }
}

fn spawn_error(e: std::io::Error) -> OrbError {
    OrbError::Remote(format!("cannot start listener thread: {}", e))
}

/// Fold patches oldest-first into one; later values win field by field
fn coalesce(patches: impl IntoIterator<Item = ConfigPatch>) -> Option<ConfigPatch> {
    patches.into_iter().reduce(|mut acc, next| {
        acc.preset = next.preset.or(acc.preset);
        acc.color = next.color.or(acc.color);
        acc.preset_colors.extend(next.preset_colors);
        acc.color_scheme = next.color_scheme.or(acc.color_scheme);
        acc.animation = match (acc.animation, next.animation) {
            (Some(mut a), Some(b)) => {
                a.merge(&b);
                Some(a)
            },
            (a, b) => b.or(a),
        };
        acc.transition_speed = next.transition_speed.or(acc.transition_speed);
        acc.reflections = next.reflections.or(acc.reflections);
        acc
    })
}
