pub mod commands;
pub mod config;
pub mod kubeconfig;
pub mod kubectl;
pub mod provider;
pub mod resource;
pub mod telemetry;
#[cfg(test)]
pub mod test_utils;
