use super::address::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("network `{network}`: {source}")]
    Parse {
        network: String,
        #[source]
        source: ParseError,
    },
    #[error("network `{network}` has an undecodable allocation bitmap: {source}")]
    Bitmap {
        network: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("failed to update allocations of network `{network}`: {source}")]
    Update {
        network: String,
        #[source]
        source: crate::kube::Error,
    },
    #[error("gave up releasing address in network `{network}` after {attempts} conflicting updates")]
    TooManyConflicts { network: String, attempts: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
