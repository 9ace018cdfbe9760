use url::Url;

/// URI scheme used for wallet association handoffs.
pub const ASSOCIATION_SCHEME: &str = "solana-wallet";
/// Query parameter carrying the opaque association token.
pub const PARAMETER_ASSOCIATION_TOKEN: &str = "association";

pub const LOCAL_ASSOCIATION_PATH: &str = "/v1/associate/local";
pub const PARAMETER_LOCAL_PORT: &str = "port";
/// Lowest port accepted for a local association WebSocket server. Ports
/// below the dynamic range are reserved for registered services.
pub const LOCAL_PORT_MIN: u16 = 49152;

pub const REMOTE_ASSOCIATION_PATH: &str = "/v1/associate/remote";
pub const PARAMETER_REFLECTOR: &str = "reflector";

/// A loopback association: the dapp connects to a WebSocket server the
/// wallet runs on the same device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAssociationUri {
    pub uri: Url,
    pub association_token: String,
    pub port: u16,
}

/// A relayed association: both parties connect to a reflector host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAssociationUri {
    pub uri: Url,
    pub association_token: String,
    pub reflector: String,
}

/// A classified association handoff URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationUri {
    Local(LocalAssociationUri),
    Remote(RemoteAssociationUri),
}

impl AssociationUri {
    /// Classify a handoff URI in one pass.
    ///
    /// Returns `None` unless the URI is hierarchical, carries the
    /// association scheme, a non-empty `association` token, and the
    /// variant-specific parameters (`port` in the dynamic range for
    /// local, a non-empty `reflector` for remote).
    pub fn parse(uri: &Url) -> Option<Self> {
        if uri.cannot_be_a_base() || uri.scheme() != ASSOCIATION_SCHEME {
            return None;
        }
        let association_token =
            query_param(uri, PARAMETER_ASSOCIATION_TOKEN).filter(|token| !token.is_empty())?;

        match uri.path() {
            LOCAL_ASSOCIATION_PATH => {
                let port = query_param(uri, PARAMETER_LOCAL_PORT)?
                    .parse::<u16>()
                    .ok()
                    .filter(|port| *port >= LOCAL_PORT_MIN)?;
                Some(AssociationUri::Local(LocalAssociationUri {
                    uri: uri.clone(),
                    association_token,
                    port,
                }))
            }
            REMOTE_ASSOCIATION_PATH => {
                let reflector =
                    query_param(uri, PARAMETER_REFLECTOR).filter(|host| !host.is_empty())?;
                Some(AssociationUri::Remote(RemoteAssociationUri {
                    uri: uri.clone(),
                    association_token,
                    reflector,
                }))
            }
            _ => None,
        }
    }

    /// The opaque handoff secret bound to this association.
    pub fn association_token(&self) -> &str {
        match self {
            AssociationUri::Local(local) => &local.association_token,
            AssociationUri::Remote(remote) => &remote.association_token,
        }
    }
}

fn query_param(uri: &Url, name: &str) -> Option<String> {
    uri.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
