use crate::address::Address;
use thiserror::Error;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The hop of the fixed resolution chain that failed.
///
/// The chain is 4+ hops deep and partial setup is an expected condition,
/// so every resolution failure names the hop it died on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveHop {
    /// Fetching the well-known root address.
    RootContext,
    /// Locating the owner actor among the root's children.
    OwnerChild,
    /// Locating the elevated (initialization-tagged) channel on the owner.
    ElevatedChannel,
    /// Querying the owner capability for the nested workspace address.
    WorkspaceQuery,
    /// Locating the domain-tagged channel on the workspace actor.
    DomainChannel,
}

impl std::fmt::Display for ResolveHop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResolveHop::RootContext => "root-context",
            ResolveHop::OwnerChild => "owner-child",
            ResolveHop::ElevatedChannel => "elevated-channel",
            ResolveHop::WorkspaceQuery => "workspace-query",
            ResolveHop::DomainChannel => "domain-channel",
        };
        write!(f, "{}", name)
    }
}

/// Error type for the marionette client library.
#[derive(Error, Debug)]
pub enum Error {
    /// The engine could not be reached at all.
    #[error("network error calling {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The engine answered with a non-2xx status.
    #[error("upstream returned HTTP {status} for {url}")]
    UpstreamHttp {
        url: String,
        status: u16,
        body: Option<serde_json::Value>,
    },

    /// A hop of the fixed hierarchy chain could not be completed.
    #[error("hierarchy resolution failed at {hop}: {detail}")]
    Resolution { hop: ResolveHop, detail: String },

    #[error("no channel tagged {tag:?} on actor {address}")]
    ChannelNotFound { address: Address, tag: String },

    #[error("no child named {name:?} under {parent}")]
    ChildNotFound { parent: Address, name: String },

    /// A bounded polling loop exhausted its attempt budget. `stage` names
    /// the last stage reached, not a generic timeout.
    #[error("{stage} did not complete within {attempts} attempts")]
    Timeout { stage: String, attempts: u32 },

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid engine base url {url:?}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The engine answered 2xx but the payload did not have the expected shape.
    #[error("unexpected payload from {url}: {detail}")]
    UnexpectedPayload { url: String, detail: String },
}

impl Error {
    /// Wrap a lower-level failure as a resolution failure at `hop`.
    pub(crate) fn resolution(hop: ResolveHop, source: impl std::fmt::Display) -> Self {
        Error::Resolution {
            hop,
            detail: source.to_string(),
        }
    }
}
