use serde::Serialize;

use crate::evaluation::RiskStatus;

/// Messages broadcast to all connected WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "risk_update")]
    RiskUpdate(RiskStatus),
}
