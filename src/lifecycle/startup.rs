//! Startup registration of config-declared servlets.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use crate::config::ServletConfig;
use crate::registry::RegistryError;
use crate::service::{HttpService, StaticServlet};

/// Register every configured servlet through `service`, in declaration order.
///
/// Stops at the first failure; servlets registered before it stay registered
/// and are released with the producer.
pub fn register_configured_servlets(
    service: &HttpService,
    servlets: &[ServletConfig],
) -> Result<usize, RegistryError> {
    for config in servlets {
        let servlet = StaticServlet::from_config(config).map_err(|e| {
            RegistryError::InvalidArgument(format!("servlet {}: {}", config.alias, e))
        })?;

        service.register_servlet(
            &config.alias,
            Arc::new(servlet),
            config.name.as_deref(),
            BTreeMap::new(),
        )?;
    }

    tracing::info!(count = servlets.len(), "Configured servlets registered");
    Ok(servlets.len())
}

/// Register `servlets`, run `serve`, then release every registration made
/// through `service`.
///
/// The release runs on every exit path: a registration failure part way
/// through the list, an error from `serve`, or a clean return.
pub async fn run_with_registrations<F, Fut, E>(
    service: &HttpService,
    servlets: &[ServletConfig],
    serve: F,
) -> Result<(), E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: From<RegistryError>,
{
    let result = match register_configured_servlets(service, servlets) {
        Ok(_) => serve().await,
        Err(e) => Err(E::from(e)),
    };

    service.unregister_all();
    result
}
