//! C4: Device Actor.
//!
//! One actor per port. Owns its [`DeviceState`] exclusively and answers
//! [`SnmpRequest`]s sent over a private mailbox, generalized from
//! `SnmpPoller`'s "struct owning config plus state, driven by its own
//! `run()`" into a struct driven by an `mpsc` mailbox instead of an
//! external poll interval.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::behavior::{BehaviorDescriptor, DeviceType, ProfileDatum};
use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::pdu::{SnmpRequest, SnmpResponse};
use crate::simulator::simulate_value;
use crate::state::DeviceState;

/// Per-OID simulation inputs an actor is constructed with.
pub type DeviceProfile = Arc<HashMap<String, (ProfileDatum, BehaviorDescriptor)>>;

/// Snapshot returned by [`DeviceHandle::get_info`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub device_id: String,
    pub port: u16,
    pub device_type: DeviceType,
    pub uptime_seconds: u64,
}

enum Command {
    HandleRequest(SnmpRequest, oneshot::Sender<SnmpResponse>),
    GetInfo(oneshot::Sender<DeviceInfo>),
    LastActivity(oneshot::Sender<u64>),
    Shutdown,
}

/// The send-end of a device actor's mailbox. Cloneable, cheap, and all
/// the pool keeps in its registry; the actor itself is reachable only
/// through it (design note: "state is reachable only via the channel").
#[derive(Clone, Debug)]
pub struct DeviceHandle {
    port: u16,
    tx: mpsc::Sender<Command>,
}

impl DeviceHandle {
    /// Send a query to the device and await its reply.
    pub async fn handle_request(&self, request: SnmpRequest) -> Result<SnmpResponse> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::HandleRequest(request, reply_tx))
            .await
            .map_err(|_| CoreError::ActorCrashed(self.port))?;
        reply_rx.await.map_err(|_| CoreError::ActorCrashed(self.port))
    }

    /// Fetch the device's current identity/uptime snapshot.
    pub async fn get_info(&self) -> Result<DeviceInfo> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::GetInfo(reply_tx))
            .await
            .map_err(|_| CoreError::ActorCrashed(self.port))?;
        reply_rx.await.map_err(|_| CoreError::ActorCrashed(self.port))
    }

    /// Monotonic timestamp of the device's last externally-observable
    /// operation, consulted by the pool's reaper.
    pub async fn last_activity_monotonic_ns(&self) -> Result<u64> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::LastActivity(reply_tx))
            .await
            .map_err(|_| CoreError::ActorCrashed(self.port))?;
        reply_rx.await.map_err(|_| CoreError::ActorCrashed(self.port))
    }

    /// Ask the actor to stop. Best-effort: a crashed actor has already
    /// dropped its receiver, so a failed send here is not an error.
    pub fn shutdown(&self) {
        let _ = self.tx.try_send(Command::Shutdown);
    }
}

/// Spawn a new device actor and return its handle plus the `JoinHandle`
/// for its worker task (the pool wraps the latter in a crash-recovery
/// supervisor).
pub fn spawn_device(
    device_id: impl Into<String>,
    port: u16,
    device_type: DeviceType,
    profile: DeviceProfile,
    clock: Arc<dyn Clock>,
    seed: u64,
) -> (DeviceHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(64);
    let state = DeviceState::new(device_id, port, device_type);
    let worker = DeviceWorker {
        state,
        profile,
        clock,
        rng: StdRng::seed_from_u64(seed),
        created_at_ns: None,
    };
    let handle = tokio::spawn(worker.run(rx));
    (DeviceHandle { port, tx }, handle)
}

/// The receive-end plus owned state; never shared, only moved into its
/// own task.
struct DeviceWorker {
    state: DeviceState,
    profile: DeviceProfile,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    created_at_ns: Option<u64>,
}

impl DeviceWorker {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        self.created_at_ns = Some(self.clock.now_monotonic_ns());
        self.touch();

        // Advances uptime_seconds on a fixed cadence independent of
        // request traffic, so idle devices still age.
        let mut ticker = interval(Duration::from_secs(1));
        ticker.tick().await;

        loop {
            tokio::select! {
                cmd = rx.recv() => {
                    match cmd {
                        Some(Command::HandleRequest(request, reply)) => {
                            self.tick();
                            self.touch();
                            let response = self.answer(request);
                            let _ = reply.send(response);
                        }
                        Some(Command::GetInfo(reply)) => {
                            self.tick();
                            self.touch();
                            let _ = reply.send(self.info());
                        }
                        Some(Command::LastActivity(reply)) => {
                            let _ = reply.send(self.state.last_activity_monotonic_ns);
                        }
                        Some(Command::Shutdown) | None => break,
                    }
                }
                _ = ticker.tick() => {
                    self.tick();
                }
            }
        }

        tracing::debug!(
            device_id = %self.state.device_id,
            port = self.state.port,
            "device actor stopped"
        );
    }

    fn tick(&mut self) {
        if let Some(created_at) = self.created_at_ns {
            let elapsed_ns = self.clock.now_monotonic_ns().saturating_sub(created_at);
            self.state.uptime_seconds = elapsed_ns / 1_000_000_000;
        }
    }

    fn touch(&mut self) {
        self.state.last_activity_monotonic_ns = self.clock.now_monotonic_ns();
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            device_id: self.state.device_id.clone(),
            port: self.state.port,
            device_type: self.state.device_type,
            uptime_seconds: self.state.uptime_seconds,
        }
    }

    fn answer(&mut self, request: SnmpRequest) -> SnmpResponse {
        let mut bindings = Vec::with_capacity(request.oids.len());
        for oid in &request.oids {
            let value = self.profile.get(oid).map(|(profile, behavior)| {
                simulate_value(oid, profile, behavior, &mut self.state, &mut self.rng)
            });
            bindings.push((oid.clone(), value));
        }
        SnmpResponse { bindings }
    }
}
