use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Network type whose addresses are not taken from a managed pool.
pub const POOL_EXEMPT_NETWORK_TYPE: &str = "ipvlan";

/// The subset of Kubernetes object metadata the cleaner relies on. Every other field is
/// kept in `extra` so objects written back are not truncated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(
        default,
        rename = "resourceVersion",
        skip_serializing_if = "String::is_empty"
    )]
    pub resource_version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A network attachment of one container (`DanmEp`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: EndpointSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    #[serde(default, rename = "NetworkID")]
    pub network_id: String,
    #[serde(default, rename = "NetworkType")]
    pub network_type: String,
    #[serde(default, rename = "EndpointID")]
    pub endpoint_id: String,
    #[serde(default, rename = "Interface")]
    pub interface: Interface,
    #[serde(default, rename = "Host")]
    pub host: String,
    #[serde(default, rename = "Pod")]
    pub pod: String,
    #[serde(default, rename = "CID")]
    pub cid: String,
    #[serde(default, rename = "netns")]
    pub netns: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(default, rename = "Name")]
    pub name: String,
    #[serde(default, rename = "Address")]
    pub address: String,
    #[serde(default, rename = "AddressIPv6")]
    pub address_ipv6: String,
    #[serde(default, rename = "MacAddress")]
    pub mac_address: String,
}

impl Endpoint {
    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// A network definition (`DanmNet`) including its address pool.
///
/// Unknown fields at every level are preserved, because the allocator writes the whole
/// object back after updating the allocation bitmap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: NetworkSpec,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    #[serde(default, rename = "NetworkID")]
    pub network_id: String,
    #[serde(
        default,
        rename = "NetworkType",
        skip_serializing_if = "String::is_empty"
    )]
    pub network_type: String,
    #[serde(default, rename = "Options")]
    pub options: NetworkOptions,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkOptions {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cidr: String,
    #[serde(
        default,
        rename = "allocation_pool",
        skip_serializing_if = "Option::is_none"
    )]
    pub allocation_pool: Option<AllocationPool>,
    /// Base64 encoded bitmap of allocated addresses, indexed by offset from the network
    /// address of `cidr`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alloc: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationPool {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

impl Network {
    /// Whether addresses of this network come from the managed pool and must be
    /// released explicitly.
    pub fn releases_addresses(&self) -> bool {
        self.spec.network_type != POOL_EXEMPT_NETWORK_TYPE
    }
}
