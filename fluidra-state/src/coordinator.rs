//! Poll coordinator
//!
//! Orchestrates refresh cycles: fetch the device tree through the gateway,
//! resolve each device's capability profile, scan its components, decode
//! semantics and schedules, and publish the merged result as an immutable
//! snapshot. Concurrent refresh calls share one in-flight cycle; cycle
//! results publish in start order.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use fluidra_client::{DeviceNode, FluidraApi};
use fluidra_registry::{DeviceRegistry, RawDevice, ValueCodec};

use crate::config::PollConfig;
use crate::error::{PollError, Result};
use crate::model::{DeviceId, DeviceState, Snapshot};
use crate::semantics::build_device_state;
use crate::store::SnapshotStore;

type CycleOutcome = Result<Arc<Snapshot>>;

struct Inflight {
    cycle: u64,
    rx: watch::Receiver<Option<CycleOutcome>>,
}

/// Coordinates periodic and on-demand refresh cycles
///
/// Wrap in an `Arc` to share with the periodic driver and command issuers.
pub struct PollCoordinator {
    api: FluidraApi,
    registry: DeviceRegistry,
    store: SnapshotStore,
    config: PollConfig,
    cycle_counter: AtomicU64,
    inflight: Mutex<Option<Inflight>>,
    /// Devices with optimistic command state awaiting reconciliation
    holds: parking_lot::Mutex<HashMap<DeviceId, Instant>>,
    stopped: AtomicBool,
}

impl PollCoordinator {
    pub fn new(api: FluidraApi) -> Self {
        Self::with_config(api, DeviceRegistry::builtin(), PollConfig::default())
    }

    pub fn with_config(api: FluidraApi, registry: DeviceRegistry, config: PollConfig) -> Self {
        Self {
            api,
            registry,
            store: SnapshotStore::new(),
            config,
            cycle_counter: AtomicU64::new(0),
            inflight: Mutex::new(None),
            holds: parking_lot::Mutex::new(HashMap::new()),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Current snapshot without any network work
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }

    /// Run or join a refresh cycle
    ///
    /// Single-flight: while a cycle is in progress, non-forced callers join
    /// it and receive the same snapshot (or the same failure). A forced
    /// call starts a fresh cycle immediately; a superseded older cycle's
    /// result is discarded at the publication gate.
    pub async fn refresh(&self, force: bool) -> Result<Arc<Snapshot>> {
        if !force && self.has_active_holds() {
            debug!("optimistic hold active, skipping scheduled cycle");
            return Ok(self.store.snapshot());
        }

        let (cycle, tx_or_rx) = {
            let mut slot = self.inflight.lock().await;
            match &*slot {
                Some(inflight) if !force => (inflight.cycle, Err(inflight.rx.clone())),
                _ => {
                    let cycle = self.cycle_counter.fetch_add(1, Ordering::SeqCst) + 1;
                    let (tx, rx) = watch::channel(None);
                    *slot = Some(Inflight { cycle, rx });
                    (cycle, Ok(tx))
                }
            }
        };

        match tx_or_rx {
            // This caller runs the cycle; everyone else observes through
            // the watch channel.
            Ok(tx) => {
                let outcome = self.run_cycle(cycle, force).await;
                self.clear_inflight(cycle).await;
                let _ = tx.send(Some(outcome.clone()));
                outcome
            }
            Err(mut rx) => {
                loop {
                    if let Some(outcome) = rx.borrow().clone() {
                        return outcome;
                    }
                    if rx.changed().await.is_err() {
                        // The running caller went away mid-cycle
                        self.clear_inflight(cycle).await;
                        return Err(PollError::Shutdown);
                    }
                }
            }
        }
    }

    async fn clear_inflight(&self, cycle: u64) {
        let mut slot = self.inflight.lock().await;
        if slot.as_ref().map(|i| i.cycle) == Some(cycle) {
            *slot = None;
        }
    }

    async fn run_cycle(&self, cycle: u64, force: bool) -> CycleOutcome {
        debug!(cycle, force, "starting refresh cycle");

        let outcome = self.fetch_cycle(cycle).await;
        // Reconciliation happened (or was attempted); optimistic state no
        // longer needs protection from scheduled cycles.
        self.holds.lock().clear();

        match outcome {
            Ok(snapshot) => {
                if self.store.publish(snapshot) {
                    info!(cycle, "snapshot published");
                } else {
                    debug!(cycle, "cycle superseded before publication");
                }
                Ok(self.store.snapshot())
            }
            Err(error) => {
                warn!(cycle, %error, "refresh cycle failed, retaining stale snapshot");
                self.store.mark_stale();
                Err(PollError::Unavailable(error))
            }
        }
    }

    /// The network portion of one cycle; tree-level failures abort it
    async fn fetch_cycle(&self, cycle: u64) -> fluidra_client::Result<Snapshot> {
        let pools = self.api.get_pools().await?;

        let mut devices = BTreeMap::new();
        let mut water_quality = None;

        for pool in &pools {
            let tree = self.api.get_device_tree(&pool.id).await?;

            if self.config.fetch_water_quality {
                // Telemetry is enrichment, never worth failing a cycle over
                match self.api.get_water_quality(&pool.id).await {
                    Ok(value) if !value.is_null() => water_quality = Some(value),
                    Ok(_) => {}
                    Err(error) => debug!(pool = %pool.id, %error, "water quality fetch failed"),
                }
            }

            for node in tree {
                let state = self.poll_device(&node).await;
                devices.insert(state.id.clone(), state);
            }
        }

        Ok(Snapshot {
            cycle,
            taken_at: SystemTime::now(),
            stale: false,
            devices,
            water_quality,
        })
    }

    /// Fetch and decode one device; failures degrade to an unavailable
    /// entry so the rest of the cycle proceeds
    async fn poll_device(&self, node: &DeviceNode) -> DeviceState {
        let mut raw = RawDevice::new(&node.id)
            .with_name(&node.info.name)
            .with_family(&node.info.family)
            .with_model(&node.info.model);

        // Provisional resolution decides what to scan; the final one sees
        // component values and can apply signature rules.
        let scan = self.registry.resolve(&raw).scan_components.clone();

        let mut components = BTreeMap::new();
        for component_id in scan {
            match self.api.get_component(&node.id, component_id).await {
                Ok(state) => {
                    raw = raw.with_component(component_id, state.reported_value.clone());
                    components.insert(component_id, state);
                }
                Err(error) => {
                    warn!(
                        device = %node.id,
                        component = component_id,
                        %error,
                        "device status fetch failed, marking unavailable"
                    );
                    let profile = self.registry.resolve(&raw);
                    return DeviceState::unavailable(
                        DeviceId::new(&node.id),
                        &node.info.name,
                        &node.info.family,
                        profile.name.clone(),
                        profile.category,
                    );
                }
            }
        }

        let profile = self.registry.resolve(&raw);
        build_device_state(node, profile, components)
    }

    /// Write a desired value to a device component
    ///
    /// The new state is applied optimistically to the published snapshot
    /// and protected from scheduled cycles until the next forced
    /// [`Self::reconcile`] (or the hold expires).
    pub async fn issue_command(
        &self,
        device_id: &DeviceId,
        component_id: u32,
        value: serde_json::Value,
    ) -> fluidra_client::Result<()> {
        self.api
            .set_component(device_id.as_str(), component_id, value.clone())
            .await?;

        self.apply_optimistic(device_id, component_id, &value);
        self.holds
            .lock()
            .insert(device_id.clone(), Instant::now());
        info!(device = %device_id, component = component_id, "command accepted");
        Ok(())
    }

    /// Forced refresh to fold optimistic command state into real data
    pub async fn reconcile(&self) -> Result<Arc<Snapshot>> {
        self.refresh(true).await
    }

    fn apply_optimistic(&self, device_id: &DeviceId, component_id: u32, value: &serde_json::Value) {
        self.store.amend(|snapshot| {
            let Some(device) = snapshot.devices.get_mut(device_id) else {
                return;
            };
            device.components.insert(component_id, value.clone());
            if let Some(role) = device.roles.get(&component_id).copied() {
                if let Some(decoded) = ValueCodec::Identity.decode(value) {
                    device.capabilities.insert(role, decoded);
                }
            }
        });
    }

    fn has_active_holds(&self) -> bool {
        let mut holds = self.holds.lock();
        let ttl = self.config.optimistic_hold;
        holds.retain(|_, placed| placed.elapsed() < ttl);
        !holds.is_empty()
    }

    /// Spawn the periodic refresh driver
    ///
    /// The first tick fires immediately, giving consumers an initial
    /// snapshot without waiting a full interval.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        let coordinator = self;
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(coordinator.config.update_interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                if coordinator.stopped.load(Ordering::SeqCst) {
                    info!("poll driver stopped");
                    break;
                }
                if let Err(error) = coordinator.refresh(false).await {
                    warn!(%error, "scheduled refresh failed");
                }
            }
        })
    }

    /// Ask the periodic driver to stop at its next tick
    pub fn shutdown(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}
