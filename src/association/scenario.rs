use crate::association::uri::{AssociationUri, LocalAssociationUri, RemoteAssociationUri};

/// Builds a concrete transport/session binding for a classified
/// association. The core only classifies URIs; starting WebSocket
/// servers, relays, or anything else is the factory's business.
pub trait ScenarioFactory {
    type Scenario;

    fn local_scenario(&self, uri: &LocalAssociationUri) -> Self::Scenario;

    fn remote_scenario(&self, uri: &RemoteAssociationUri) -> Self::Scenario;
}

impl AssociationUri {
    /// Construct a scenario for this association via the injected factory.
    pub fn create_scenario<F: ScenarioFactory>(&self, factory: &F) -> F::Scenario {
        match self {
            AssociationUri::Local(local) => factory.local_scenario(local),
            AssociationUri::Remote(remote) => factory.remote_scenario(remote),
        }
    }
}

/// Lifecycle hooks a scenario reports to the wallet application. All
/// hooks default to no-ops so implementations subscribe only to what
/// they care about.
///
/// `on_low_power_and_no_connection` fires when a local scenario has been
/// serving with no client connection while the device is in a low-power
/// state; it belongs to the scenario layer, not the wire protocol.
pub trait ScenarioCallbacks: Send + Sync {
    fn on_scenario_ready(&self) {}
    fn on_scenario_serving_clients(&self) {}
    fn on_scenario_serving_complete(&self) {}
    fn on_scenario_complete(&self) {}
    fn on_scenario_error(&self) {}
    fn on_scenario_teardown_complete(&self) {}
    fn on_low_power_and_no_connection(&self) {}
}
