//! Association handoff: URI classification and the scenario seam.

mod scenario;
mod uri;

pub use scenario::{ScenarioCallbacks, ScenarioFactory};
pub use uri::{
    AssociationUri, LocalAssociationUri, RemoteAssociationUri, ASSOCIATION_SCHEME,
    LOCAL_ASSOCIATION_PATH, LOCAL_PORT_MIN, PARAMETER_ASSOCIATION_TOKEN, PARAMETER_LOCAL_PORT,
    PARAMETER_REFLECTOR, REMOTE_ASSOCIATION_PATH,
};
