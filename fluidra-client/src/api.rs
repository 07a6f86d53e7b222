//! Typed endpoint surface over the resilience gateway
//!
//! One method per vendor REST operation. All calls flow through
//! [`ResilientClient::execute`]; reads are idempotent, and the mutating
//! calls here write absolute desired values, so replaying them is safe and
//! they are marked idempotent as well.

use std::sync::Arc;

use crate::error::Result;
use crate::gateway::{GatewayConfig, ResilientClient};
use crate::transport::{ApiRequest, HttpTransport};
use crate::wire::{extract_list, ComponentState, DeviceNode, PoolSummary};
use crate::TokenProvider;

/// Component id carrying the schedule table on schedule-capable devices
pub const SCHEDULE_COMPONENT: u32 = 20;

/// Typed client for the Fluidra pool cloud
pub struct FluidraApi {
    gateway: ResilientClient,
}

impl FluidraApi {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            gateway: ResilientClient::new(transport, tokens),
        }
    }

    pub fn with_config(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenProvider>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            gateway: ResilientClient::with_config(transport, tokens, config),
        }
    }

    /// Pools attached to the authenticated account
    pub async fn get_pools(&self) -> Result<Vec<PoolSummary>> {
        let request = ApiRequest::get("/generic/users/me/pools");
        let response = self.gateway.execute(&request, true).await?;
        extract_list(response.body, "pools")
    }

    /// General pool details and status block
    pub async fn get_pool_status(&self, pool_id: &str) -> Result<serde_json::Value> {
        let request = ApiRequest::get(format!("/generic/pools/{}/status", pool_id));
        let response = self.gateway.execute(&request, true).await?;
        Ok(response.body)
    }

    /// Latest water-quality telemetry job for a pool
    pub async fn get_water_quality(&self, pool_id: &str) -> Result<serde_json::Value> {
        let request = ApiRequest::get(format!(
            "/generic/pools/{}/assistant/algorithms/telemetryWaterQuality/jobs?pageSize=1",
            pool_id
        ));
        let response = self.gateway.execute(&request, true).await?;
        Ok(response.body)
    }

    /// Full device tree for a pool
    pub async fn get_device_tree(&self, pool_id: &str) -> Result<Vec<DeviceNode>> {
        let request = ApiRequest::get(format!(
            "/generic/devices?poolId={}&format=tree",
            pool_id
        ));
        let response = self.gateway.execute(&request, true).await?;
        extract_list(response.body, "devices")
    }

    /// Reported/desired state of one numbered component
    pub async fn get_component(
        &self,
        device_id: &str,
        component_id: u32,
    ) -> Result<ComponentState> {
        let request = ApiRequest::get(component_path(device_id, component_id));
        let response = self.gateway.execute(&request, true).await?;
        response.json()
    }

    /// Write a desired value to a component
    ///
    /// The endpoint echoes the component state back on success.
    pub async fn set_component(
        &self,
        device_id: &str,
        component_id: u32,
        value: serde_json::Value,
    ) -> Result<ComponentState> {
        let request = ApiRequest::put(
            component_path(device_id, component_id),
            serde_json::json!({ "desiredValue": value }),
        );
        let response = self.gateway.execute(&request, true).await?;
        response.json()
    }

    /// Replace the full schedule table on a schedule-capable device
    pub async fn set_schedules(
        &self,
        device_id: &str,
        schedules: serde_json::Value,
    ) -> Result<()> {
        let request = ApiRequest::put(
            component_path(device_id, SCHEDULE_COMPONENT),
            serde_json::json!({ "desiredValue": schedules }),
        );
        self.gateway.execute(&request, true).await?;
        Ok(())
    }
}

fn component_path(device_id: &str, component_id: u32) -> String {
    format!(
        "/generic/devices/{}/components/{}?deviceType=connected",
        device_id, component_id
    )
}
