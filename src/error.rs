use std::fmt::Display;

/// Logs the error of a `Result` instead of propagating it.
///
/// Used wherever one failed record must not stop the cleanup of the others.
pub trait ResultOkLogExt<T, E> {
    fn ok_log(self) -> Option<T>;

    /// Like [`ok_log`](ResultOkLogExt::ok_log), but prefixes the message with `context`
    /// so the affected record can be identified from the log line alone.
    fn ok_log_with(self, context: impl Display) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }

    fn ok_log_with(self, context: impl Display) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{context}: {err}");
                None
            }
        }
    }
}

/// Fatal setup errors that terminate the process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Host(#[from] crate::host::Error),
    #[error(transparent)]
    Kube(#[from] crate::kube::Error),
    #[error("container runtime is not reachable: {0}")]
    Runtime(#[from] crate::runtime::Error),
    #[error(transparent)]
    Watch(#[from] crate::cleaner::WatchError),
}
