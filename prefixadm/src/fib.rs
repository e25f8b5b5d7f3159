// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Table view of the unicast forwarding table.

use crate::advertised::Renderer;
use crate::error::Error;
use crate::log::render_log;
use colored::Colorize;
use rdb::types::{AdjacencyDatabase, Prefix, UnicastRoute};
use std::io::Write;
use tabwriter::TabWriter;

const NONE: &str = "-";

impl Renderer {
    /// One row per next hop, sorted by destination. When an adjacency
    /// database is given, next hops are labeled with the neighbor they lead
    /// to.
    pub fn render_unicast_routes(
        &self,
        routes: &[UnicastRoute],
        adjacencies: Option<&AdjacencyDatabase>,
    ) -> Result<String, Error> {
        for r in routes {
            r.dest.validate()?;
        }
        let mut sorted: Vec<&UnicastRoute> = routes.iter().collect();
        sorted.sort_by_key(|r| network(r.dest));
        let adjacency_count =
            adjacencies.map(|a| a.adjacencies.len()).unwrap_or(0);
        render_log!(self, debug, "rendering unicast routes";
            "routes" => sorted.len(),
            "adjacencies" => adjacency_count
        );

        let mut tw = TabWriter::new(Vec::<u8>::new());
        writeln!(
            &mut tw,
            "{}\t{}\t{}\t{}\t{}",
            "Prefix".dimmed(),
            "Nexthop".dimmed(),
            "Interface".dimmed(),
            "Weight".dimmed(),
            "Neighbor".dimmed(),
        )?;

        for r in sorted {
            let dest = network(r.dest).to_string();
            if r.next_hops.is_empty() {
                writeln!(&mut tw, "{dest}\t{NONE}\t{NONE}\t{NONE}\t{NONE}")?;
                continue;
            }
            for (i, nh) in r.next_hops.iter().enumerate() {
                let neighbor = adjacencies
                    .and_then(|db| db.neighbor_for(nh.address.addr))
                    .unwrap_or(NONE);
                writeln!(
                    &mut tw,
                    "{}\t{}\t{}\t{}\t{}",
                    if i == 0 { dest.as_str() } else { "" },
                    nh.address.addr,
                    nh.address.if_name.as_deref().unwrap_or(NONE),
                    nh.weight,
                    neighbor,
                )?;
            }
        }

        tw.flush()?;
        let out = tw.into_inner().map_err(|e| {
            std::io::Error::new(e.error().kind(), e.error().to_string())
        })?;
        Ok(String::from_utf8(out)?)
    }
}

/// Destinations may arrive with host bits set, they are shown and ordered
/// as the network they cover.
fn network(dest: Prefix) -> Prefix {
    Prefix::new(dest.address(), dest.length())
}

#[cfg(test)]
mod test {
    use crate::error::Error;
    use crate::test::{
        adjacency_db, test_renderer, unicast_routes, unicast_routes_multiple,
        UNICAST_ROUTES_MULTIPLE_OUTPUT, UNICAST_ROUTES_OUTPUT,
    };
    use mg_common::cidr;
    use pretty_assertions::assert_eq;
    use rdb::types::UnicastRoute;

    fn no_color() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_unicast_routes() {
        no_color();
        let r = test_renderer();
        let out = r
            .render_unicast_routes(&unicast_routes(), Some(&adjacency_db()))
            .unwrap();
        assert_eq!(out, UNICAST_ROUTES_OUTPUT);
    }

    #[test]
    fn test_unicast_routes_sorted() {
        no_color();
        let r = test_renderer();
        let out = r
            .render_unicast_routes(
                &unicast_routes_multiple(),
                Some(&adjacency_db()),
            )
            .unwrap();
        assert_eq!(out, UNICAST_ROUTES_MULTIPLE_OUTPUT);
    }

    #[test]
    fn test_unicast_routes_without_adjacencies() {
        no_color();
        let r = test_renderer();
        let out = r.render_unicast_routes(&unicast_routes(), None).unwrap();
        let neighbors: Vec<&str> = out
            .lines()
            .skip(1)
            .map(|l| l.split_whitespace().last().unwrap())
            .collect();
        assert_eq!(neighbors, vec!["-", "-"]);
    }

    #[test]
    fn test_unicast_route_without_next_hops() {
        no_color();
        let r = test_renderer();
        let routes = vec![UnicastRoute {
            dest: cidr!("2001:db8::/32"),
            next_hops: Vec::new(),
        }];
        let out = r.render_unicast_routes(&routes, None).unwrap();
        let row = out.lines().nth(1).unwrap();
        let cols: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(cols, vec!["2001:db8::/32", "-", "-", "-", "-"]);
    }

    #[test]
    fn test_unicast_route_invalid_dest() {
        let r = test_renderer();
        let routes = vec![UnicastRoute {
            dest: cidr!("10.0.0.0/33"),
            next_hops: Vec::new(),
        }];
        assert!(matches!(
            r.render_unicast_routes(&routes, None),
            Err(Error::Rdb(rdb::error::Error::InvalidPrefix(_)))
        ));
    }
}
