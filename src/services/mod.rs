pub mod risk_monitor;
