//! Release of addresses back into a network's allocation bitmap.
mod address;
mod bitarray;
mod error;

pub use address::{Ipv4Net, ParseError, parse_interface_address};
pub use bitarray::BitArray;
pub use error::{Error, Result};

use crate::kube::{KubeClient, PutOutcome};
use crate::registry::{Network, network_path};

/// Attempts at writing a network back before giving up on concurrent modifications.
const MAX_UPDATE_ATTEMPTS: u32 = 5;

pub trait AddressAllocator {
    /// Returns `address` to the pool of `network`.
    fn release(
        &self,
        network: &Network,
        address: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Computes the network with `address` cleared from its allocation bitmap.
///
/// Returns `None` when there is nothing to write: the address is empty, IPv6, outside the
/// network's `cidr` or bitmap, the network has no `cidr`, or the address is not allocated.
pub fn released(network: &Network, address: &str) -> Result<Option<Network>> {
    let name = || qualified_name(network);
    let options = &network.spec.options;
    if options.cidr.is_empty() {
        return Ok(None);
    }
    let Some(ip) = parse_interface_address(address).map_err(|source| Error::Parse {
        network: name(),
        source,
    })?
    else {
        return Ok(None);
    };
    let net = Ipv4Net::parse(&options.cidr).map_err(|source| Error::Parse {
        network: name(),
        source,
    })?;
    let Some(offset) = net.offset_of(ip) else {
        log::debug!("{ip} is not part of {} of `{}`", options.cidr, name());
        return Ok(None);
    };

    let mut bits = BitArray::from_base64(&options.alloc).map_err(|source| Error::Bitmap {
        network: name(),
        source,
    })?;
    if !bits.reset(offset) {
        log::debug!("{ip} was not allocated in `{}`", name());
        return Ok(None);
    }

    let mut updated = network.clone();
    updated.spec.options.alloc = bits.to_base64();
    Ok(Some(updated))
}

fn qualified_name(network: &Network) -> String {
    format!("{}/{}", network.metadata.namespace, network.metadata.name)
}

/// Allocator backed by the `alloc` bitmap stored in each `DanmNet`.
#[derive(Debug, Clone)]
pub struct DanmAllocator {
    client: KubeClient,
}

impl DanmAllocator {
    pub fn new(client: KubeClient) -> Self {
        Self { client }
    }
}

impl AddressAllocator for DanmAllocator {
    async fn release(&self, network: &Network, address: &str) -> Result<()> {
        let path = network_path(&network.metadata.namespace, &network.metadata.name);
        let update_err = |source| Error::Update {
            network: qualified_name(network),
            source,
        };

        let mut current = network.clone();
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let Some(updated) = released(&current, address)? else {
                return Ok(());
            };
            match self.client.put(&path, &updated).await.map_err(update_err)? {
                PutOutcome::Updated => {
                    log::info!("Released {} in `{}`", address, qualified_name(network));
                    return Ok(());
                }
                PutOutcome::Conflict => {
                    log::debug!(
                        "Conflict releasing {} in `{}` (attempt {}), re-reading network",
                        address,
                        qualified_name(network),
                        attempt
                    );
                    match self.client.get::<Network>(&path).await.map_err(update_err)? {
                        Some(fresh) => current = fresh,
                        None => return Ok(()),
                    }
                }
            }
        }

        Err(Error::TooManyConflicts {
            network: qualified_name(network),
            attempts: MAX_UPDATE_ATTEMPTS,
        })
    }
}
