// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::Error;
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::{JsonSchema, JsonSchema_repr};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::hash::Hash;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Build an IP address from its raw network-order octets. Only 4 (IPv4) and
/// 16 (IPv6) byte addresses exist.
pub fn address_from_octets(octets: &[u8]) -> Result<IpAddr, Error> {
    match octets.len() {
        4 => {
            let v4: [u8; 4] = octets
                .try_into()
                .map_err(|_| Error::InvalidAddressLength(octets.len()))?;
            Ok(IpAddr::V4(Ipv4Addr::from(v4)))
        }
        16 => {
            let v6: [u8; 16] = octets
                .try_into()
                .map_err(|_| Error::InvalidAddressLength(octets.len()))?;
            Ok(IpAddr::V6(Ipv6Addr::from(v6)))
        }
        n => Err(Error::InvalidAddressLength(n)),
    }
}

/// An address as carried in next-hop and adjacency records, optionally
/// scoped to a local interface.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct BinaryAddress {
    pub addr: IpAddr,
    #[serde(default)]
    pub if_name: Option<String>,
}

impl BinaryAddress {
    pub fn new(addr: IpAddr, if_name: Option<&str>) -> Self {
        Self {
            addr,
            if_name: if_name.map(str::to_string),
        }
    }
}

impl Display for BinaryAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.if_name {
            Some(ifname) => write!(f, "{}@{}", self.addr, ifname),
            None => write!(f, "{}", self.addr),
        }
    }
}

impl FromStr for BinaryAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, if_name) = match s.split_once('@') {
            Some((addr, ifname)) => (addr, Some(ifname.to_string())),
            None => (s, None),
        };
        Ok(Self {
            addr: addr.parse().map_err(|_| "malformed ip addr".to_string())?,
            if_name,
        })
    }
}

fn mask4(length: u8) -> u32 {
    match length {
        0 => 0,
        l if l >= Prefix4::HOST_MASK => !0u32,
        l => (!0u32) << (32 - l),
    }
}

fn mask6(length: u8) -> u128 {
    match length {
        0 => 0,
        l if l >= Prefix6::HOST_MASK => !0u128,
        l => (!0u128) << (128 - l),
    }
}

#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct Prefix4 {
    pub value: Ipv4Addr,
    pub length: u8,
}

impl PartialOrd for Prefix4 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Prefix4 {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.value != other.value {
            return self.value.cmp(&other.value);
        }
        self.length.cmp(&other.length)
    }
}

impl Prefix4 {
    pub const HOST_MASK: u8 = 32;

    /// Create a new `Prefix4` from an IP address and net mask.
    /// The newly created `Prefix4` will have its host bits zeroed upon creation
    /// e.g.
    /// ```
    /// use rdb::types::Prefix4;
    /// use std::net::Ipv4Addr;
    /// use std::str::FromStr;
    /// let p4 = Prefix4::new(Ipv4Addr::from_str("10.0.0.10").unwrap(), 24);
    /// assert_eq!(p4.value, Ipv4Addr::from_str("10.0.0.0").unwrap());
    /// ```
    pub fn new(ip: Ipv4Addr, length: u8) -> Self {
        let mut new = Self { value: ip, length };
        new.unset_host_bits();
        new
    }

    pub fn host_bits_are_unset(&self) -> bool {
        let mask = mask4(self.length);
        self.value.to_bits() & mask == self.value.to_bits()
    }

    pub fn unset_host_bits(&mut self) {
        let mask = mask4(self.length);
        self.value = Ipv4Addr::from_bits(self.value.to_bits() & mask)
    }
}

impl fmt::Display for Prefix4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.length)
    }
}

impl FromStr for Prefix4 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, length) =
            s.split_once('/').ok_or("malformed prefix".to_string())?;

        Ok(Self {
            value: value
                .parse()
                .map_err(|_| "malformed ip addr".to_string())?,
            length: length
                .parse()
                .map_err(|_| "malformed length".to_string())?,
        })
    }
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct Prefix6 {
    pub value: Ipv6Addr,
    pub length: u8,
}

impl PartialOrd for Prefix6 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Prefix6 {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.value != other.value {
            return self.value.cmp(&other.value);
        }
        self.length.cmp(&other.length)
    }
}

impl fmt::Display for Prefix6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.length)
    }
}

impl Prefix6 {
    pub const HOST_MASK: u8 = 128;

    /// Create a new `Prefix6` from an IP address and net mask.
    /// The newly created `Prefix6` will have its host bits zeroed upon creation
    /// e.g.
    /// ```
    /// use rdb::types::Prefix6;
    /// use std::net::Ipv6Addr;
    /// use std::str::FromStr;
    /// let p6 = Prefix6::new(Ipv6Addr::from_str("2001:db8::1").unwrap(), 64);
    /// assert_eq!(p6.value, Ipv6Addr::from_str("2001:db8::").unwrap());
    /// ```
    pub fn new(ip: Ipv6Addr, length: u8) -> Self {
        let mut new = Self { value: ip, length };
        new.unset_host_bits();
        new
    }

    pub fn host_bits_are_unset(&self) -> bool {
        let mask = mask6(self.length);
        self.value.to_bits() & mask == self.value.to_bits()
    }

    pub fn unset_host_bits(&mut self) {
        let mask = mask6(self.length);
        self.value = Ipv6Addr::from_bits(self.value.to_bits() & mask)
    }
}

impl FromStr for Prefix6 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, length) =
            s.split_once('/').ok_or("malformed prefix".to_string())?;

        Ok(Self {
            value: value
                .parse()
                .map_err(|_| "malformed ip addr".to_string())?,
            length: length
                .parse()
                .map_err(|_| "malformed length".to_string())?,
        })
    }
}

/// An IPv4 or IPv6 network prefix. Serializes as its CIDR string.
///
/// Prefixes are totally ordered. Each address family sorts as its own
/// block, IPv6 ahead of IPv4 (so `::/0` < `0.0.0.0/0`), and within a family
/// prefixes are ordered by address and then by length.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, Hash, PartialEq)]
#[serde(try_from = "String", into = "String")]
pub enum Prefix {
    V4(Prefix4),
    V6(Prefix6),
}

impl PartialOrd for Prefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Prefix {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .family()
            .cmp(&self.family())
            .then(self.bits().cmp(&other.bits()))
            .then(self.length().cmp(&other.length()))
    }
}

impl std::fmt::Display for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Prefix::V4(p) => p.fmt(f),
            Prefix::V6(p) => p.fmt(f),
        }
    }
}

impl From<Prefix4> for Prefix {
    fn from(value: Prefix4) -> Self {
        Self::V4(value)
    }
}

impl From<Prefix6> for Prefix {
    fn from(value: Prefix6) -> Self {
        Self::V6(value)
    }
}

impl FromStr for Prefix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(prefix4) = s.parse::<Prefix4>() {
            Ok(Self::V4(prefix4))
        } else if let Ok(prefix6) = s.parse::<Prefix6>() {
            Ok(Self::V6(prefix6))
        } else {
            Err(format!("malformed prefix {s}"))
        }
    }
}

impl TryFrom<String> for Prefix {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Prefix> for String {
    fn from(value: Prefix) -> Self {
        value.to_string()
    }
}

impl JsonSchema for Prefix {
    fn schema_name() -> String {
        "Prefix".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

impl Prefix {
    pub fn new(ip: IpAddr, length: u8) -> Self {
        match ip {
            IpAddr::V4(ip4) => Self::V4(Prefix4::new(ip4, length)),
            IpAddr::V6(ip6) => Self::V6(Prefix6::new(ip6, length)),
        }
    }

    /// Build a prefix from raw address octets. The length is not checked
    /// here, see [`Prefix::validate`].
    pub fn from_octets(octets: &[u8], length: u8) -> Result<Self, Error> {
        Ok(match address_from_octets(octets)? {
            IpAddr::V4(value) => Self::V4(Prefix4 { value, length }),
            IpAddr::V6(value) => Self::V6(Prefix6 { value, length }),
        })
    }

    pub fn octets(&self) -> Vec<u8> {
        match self {
            Self::V4(p4) => p4.value.octets().into(),
            Self::V6(p6) => p6.value.octets().into(),
        }
    }

    pub fn address(&self) -> IpAddr {
        match self {
            Self::V4(p4) => IpAddr::V4(p4.value),
            Self::V6(p6) => IpAddr::V6(p6.value),
        }
    }

    pub fn length(&self) -> u8 {
        match self {
            Self::V4(p4) => p4.length,
            Self::V6(p6) => p6.length,
        }
    }

    pub fn family(&self) -> AddressFamily {
        match self {
            Self::V4(_) => AddressFamily::Ipv4,
            Self::V6(_) => AddressFamily::Ipv6,
        }
    }

    /// Width of the address family in bits.
    pub fn max_length(&self) -> u8 {
        match self {
            Self::V4(_) => Prefix4::HOST_MASK,
            Self::V6(_) => Prefix6::HOST_MASK,
        }
    }

    /// Check that the prefix length fits the address family.
    pub fn validate(&self) -> Result<(), Error> {
        if self.length() > self.max_length() {
            return Err(Error::InvalidPrefix(format!(
                "{self}: length exceeds {} bits",
                self.max_length()
            )));
        }
        Ok(())
    }

    fn bits(&self) -> u128 {
        match self {
            Self::V4(p4) => u128::from(p4.value.to_bits()),
            Self::V6(p6) => p6.value.to_bits(),
        }
    }
}

/// Represents the address family (protocol version) for network routes.
#[derive(
    Clone,
    Copy,
    Eq,
    Debug,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum AddressFamily {
    /// Internet Protocol Version 4 (IPv4)
    Ipv4,
    /// Internet Protocol Version 6 (IPv6)
    Ipv6,
}

/// Declares a closed enumeration carried on the wire as its numeric code,
/// together with the display name table used by the CLI.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $code:literal => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Copy,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize_repr,
            Deserialize_repr,
            JsonSchema_repr,
        )]
        #[repr(i32)]
        pub enum $name {
            $($variant = $code),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let upper = s.to_ascii_uppercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == upper)
                    .ok_or_else(|| {
                        format!("unknown {} {s:?}", stringify!($name))
                    })
            }
        }
    };
}

named_enum! {
    /// The origin of an advertised prefix.
    PrefixType {
        Loopback = 1 => "LOOPBACK",
        Default = 2 => "DEFAULT",
        Bgp = 3 => "BGP",
        PrefixAllocator = 4 => "PREFIX_ALLOCATOR",
        Breeze = 5 => "BREEZE",
        Rib = 6 => "RIB",
        SloPrefixAllocator = 7 => "SLO_PREFIX_ALLOCATOR",
        Config = 8 => "CONFIG",
        Vip = 9 => "VIP",
        Cpe = 10 => "CPE",
    }
}

named_enum! {
    /// How packets toward a prefix are forwarded.
    ForwardingType {
        Ip = 0 => "IP",
        SrMpls = 1 => "SR_MPLS",
    }
}

named_enum! {
    /// Path computation used to reach a prefix.
    ForwardingAlgorithm {
        SpEcmp = 0 => "SP_ECMP",
        Ksp2EdEcmp = 1 => "KSP2_ED_ECMP",
        SpUcmpAdjWeightPropagation = 2 => "SP_UCMP_ADJ_WEIGHT_PROPAGATION",
        SpUcmpPrefixWeightPropagation = 3 =>
            "SP_UCMP_PREFIX_WEIGHT_PROPAGATION",
    }
}

/// Preference and distance attributes of an advertised prefix. Larger
/// `path_preference` and `source_preference` values are preferred.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub struct PrefixMetrics {
    #[serde(default)]
    pub version: i32,
    pub path_preference: i32,
    pub source_preference: i32,
    pub distance: i32,
    /// Non-zero when the advertising path is drained.
    #[serde(default)]
    pub drain_metric: i32,
}

/// Wire form of an entry payload. Payloads that are valid UTF-8 are carried
/// as a string, anything else as an array of byte values so no data is lost.
#[derive(Deserialize, JsonSchema)]
#[serde(untagged)]
enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

mod payload {
    use super::Payload;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        data: &[u8],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(data) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => data.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<u8>, D::Error> {
        Ok(match Payload::deserialize(deserializer)? {
            Payload::Text(text) => text.into_bytes(),
            Payload::Bytes(bytes) => bytes,
        })
    }
}

/// A single origin's advertisement of a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PrefixEntry {
    pub prefix: Prefix,
    #[serde(rename = "type")]
    pub prefix_type: PrefixType,
    /// Protocol specific payload, opaque to everything here.
    #[serde(default, with = "payload")]
    #[schemars(with = "Payload")]
    pub data: Vec<u8>,
    #[serde(rename = "forwardingType")]
    pub forwarding_type: ForwardingType,
    #[serde(rename = "forwardingAlgorithm")]
    pub forwarding_algorithm: ForwardingAlgorithm,
    #[serde(rename = "minNexthop", default)]
    pub min_nexthop: u64,
    #[serde(rename = "prependLabel")]
    pub prepend_label: Option<i32>,
    pub metrics: PrefixMetrics,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Areas the advertisement has crossed, kept in received order.
    #[serde(default)]
    pub area_stack: Vec<String>,
    pub weight: Option<i64>,
}

/// Identifies one entry of an [`AdvertisedRouteDetail`]. Keys are assigned
/// by the route store and carry no meaning beyond identity.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(transparent)]
pub struct RouteKey(pub i64);

impl Display for RouteKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RouteKey {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisedRoute {
    pub key: RouteKey,
    pub route: PrefixEntry,
    /// Name of the origination policy that accepted this route, if any.
    #[serde(default)]
    pub hit_policy: Option<String>,
    #[serde(default)]
    pub igp_cost: Option<i64>,
}

/// All competing advertisements of one prefix along with the outcome of
/// route selection. `best_key` is the entry used for forwarding and
/// `best_keys` the entries eligible for re-advertisement across areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisedRouteDetail {
    pub prefix: Prefix,
    pub best_key: RouteKey,
    pub best_keys: BTreeSet<RouteKey>,
    pub routes: Vec<AdvertisedRoute>,
}

impl AdvertisedRouteDetail {
    /// Check the prefixes and the selection keys for consistency:
    /// `best_key` must be one of `best_keys`, route keys must be unique, and
    /// every key in `best_keys` must name an entry in `routes`.
    pub fn validate(&self) -> Result<(), Error> {
        self.prefix.validate()?;
        for r in &self.routes {
            r.route.prefix.validate()?;
        }

        if !self.best_keys.contains(&self.best_key) {
            return Err(Error::InvalidAggregate(format!(
                "{}: best key {} is not among the best keys",
                self.prefix, self.best_key
            )));
        }

        let mut keys = BTreeSet::new();
        for r in &self.routes {
            if !keys.insert(r.key) {
                return Err(Error::InvalidAggregate(format!(
                    "{}: duplicate route key {}",
                    self.prefix, r.key
                )));
            }
        }
        if let Some(missing) = self.best_keys.iter().find(|k| !keys.contains(k))
        {
            return Err(Error::InvalidAggregate(format!(
                "{}: best key {} has no route entry",
                self.prefix, missing
            )));
        }

        Ok(())
    }

    pub fn is_best(&self, key: RouteKey) -> bool {
        key == self.best_key
    }

    pub fn is_advertised(&self, key: RouteKey) -> bool {
        self.best_keys.contains(&key)
    }

    /// The entry selected for forwarding.
    pub fn best_route(&self) -> Option<&AdvertisedRoute> {
        self.routes.iter().find(|r| r.key == self.best_key)
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct NextHop {
    pub address: BinaryAddress,
    #[serde(default)]
    pub weight: u32,
}

/// A forwarding table entry: destination and its weighted next hops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnicastRoute {
    pub dest: Prefix,
    #[serde(default)]
    pub next_hops: Vec<NextHop>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Adjacency {
    pub other_node_name: String,
    #[serde(default)]
    pub next_hop_v4: Option<BinaryAddress>,
    #[serde(default)]
    pub next_hop_v6: Option<BinaryAddress>,
}

impl Adjacency {
    /// Whether `addr` is one of this adjacency's next-hop addresses.
    pub fn reaches(&self, addr: IpAddr) -> bool {
        [&self.next_hop_v4, &self.next_hop_v6]
            .into_iter()
            .flatten()
            .any(|nh| nh.addr == addr)
    }
}

#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
pub struct AdjacencyDatabase {
    #[serde(default)]
    pub adjacencies: Vec<Adjacency>,
}

impl AdjacencyDatabase {
    /// Name of the neighbor reached through `addr`, if any.
    pub fn neighbor_for(&self, addr: IpAddr) -> Option<&str> {
        self.adjacencies
            .iter()
            .find(|adj| adj.reaches(addr))
            .map(|adj| adj.other_node_name.as_str())
    }
}
