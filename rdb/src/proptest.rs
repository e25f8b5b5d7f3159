// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property-based tests for Prefix types using proptest
//!
//! These tests verify the ordering, validation and string form of prefixes,
//! which the advertised route views depend on for deterministic output.

#[cfg(test)]
mod proptest {
    use crate::error::Error;
    use crate::types::{Prefix, Prefix4, Prefix6};
    use proptest::prelude::*;
    use std::cmp::Ordering;
    use std::net::{Ipv4Addr, Ipv6Addr};

    // Strategy for generating valid IPv4 prefixes
    fn ipv4_prefix_strategy() -> impl Strategy<Value = Prefix4> {
        (any::<u32>(), 0u8..=32u8).prop_map(|(addr_bits, length)| {
            Prefix4::new(Ipv4Addr::from(addr_bits), length)
        })
    }

    // Strategy for generating valid IPv6 prefixes
    fn ipv6_prefix_strategy() -> impl Strategy<Value = Prefix6> {
        (any::<u128>(), 0u8..=128u8).prop_map(|(addr_bits, length)| {
            Prefix6::new(Ipv6Addr::from(addr_bits), length)
        })
    }

    // Mixed family prefixes, biased toward small addresses so that IPv4 and
    // IPv6 prefixes share address bits and only the family tells them apart.
    fn prefix_strategy() -> impl Strategy<Value = Prefix> {
        prop_oneof![
            ipv4_prefix_strategy().prop_map(Prefix::V4),
            ipv6_prefix_strategy().prop_map(Prefix::V6),
            (0u32..4, 0u8..=32u8).prop_map(|(bits, length)| {
                Prefix::V4(Prefix4 {
                    value: Ipv4Addr::from(bits),
                    length,
                })
            }),
            (0u128..4, 0u8..=128u8).prop_map(|(bits, length)| {
                Prefix::V6(Prefix6 {
                    value: Ipv6Addr::from(bits),
                    length,
                })
            }),
        ]
    }

    proptest! {
        /// Property: IPv4 host bits are always unset after construction
        #[test]
        fn prop_ipv4_host_bits_always_unset(prefix in ipv4_prefix_strategy()) {
            prop_assert!(
                prefix.host_bits_are_unset(),
                "IPv4 prefix {prefix} should have host bits unset"
            );
        }

        /// Property: IPv6 host bits are always unset after construction
        #[test]
        fn prop_ipv6_host_bits_always_unset(prefix in ipv6_prefix_strategy()) {
            prop_assert!(
                prefix.host_bits_are_unset(),
                "IPv6 prefix {prefix} should have host bits unset"
            );
        }

        /// Property: comparison is antisymmetric and agrees with equality
        #[test]
        fn prop_order_antisymmetric(a in prefix_strategy(), b in prefix_strategy()) {
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
            prop_assert_eq!(a.cmp(&b) == Ordering::Equal, a == b);
        }

        /// Property: comparison is transitive
        #[test]
        fn prop_order_transitive(
            a in prefix_strategy(),
            b in prefix_strategy(),
            c in prefix_strategy()
        ) {
            let mut v = [a, b, c];
            v.sort();
            prop_assert!(v[0] <= v[1] && v[1] <= v[2] && v[0] <= v[2]);
        }

        /// Property: all IPv6 prefixes sort ahead of all IPv4 prefixes
        #[test]
        fn prop_families_sort_as_blocks(
            input in prop::collection::vec(prefix_strategy(), 0..32)
        ) {
            let mut prefixes = input;
            prefixes.sort();
            let split = prefixes.iter().take_while(|p| matches!(p, Prefix::V6(_))).count();
            prop_assert!(prefixes[split..].iter().all(|p| matches!(p, Prefix::V4(_))));
        }

        /// Property: sorting is idempotent
        #[test]
        fn prop_sort_idempotent(input in prop::collection::vec(prefix_strategy(), 0..32)) {
            let mut prefixes = input;
            prefixes.sort();
            let once = prefixes.clone();
            prefixes.sort();
            prop_assert_eq!(once, prefixes);
        }

        /// Property: the CIDR string parses back to the same prefix
        #[test]
        fn prop_cidr_string_round_trip(prefix in prefix_strategy()) {
            let parsed: Prefix = prefix.to_string().parse().unwrap();
            prop_assert_eq!(parsed, prefix);
        }

        /// Property: raw octets rebuild the same prefix
        #[test]
        fn prop_octets_round_trip(prefix in prefix_strategy()) {
            let rebuilt = Prefix::from_octets(&prefix.octets(), prefix.length()).unwrap();
            prop_assert_eq!(rebuilt, prefix);
        }

        /// Property: lengths within the family width validate, longer ones do not
        #[test]
        fn prop_validate_length(bits in any::<u32>(), length in any::<u8>()) {
            let p = Prefix::V4(Prefix4 { value: Ipv4Addr::from(bits), length });
            if length <= 32 {
                prop_assert!(p.validate().is_ok());
            } else {
                prop_assert!(matches!(p.validate(), Err(Error::InvalidPrefix(_))));
            }
        }

        /// Property: same for IPv6 with a 128 bit width
        #[test]
        fn prop_validate_length_v6(bits in any::<u128>(), length in any::<u8>()) {
            let p = Prefix::V6(Prefix6 { value: Ipv6Addr::from(bits), length });
            prop_assert_eq!(p.validate().is_ok(), length <= 128);
        }
    }
}
