// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Views of advertised routes.
//!
//! Each prefix may be advertised by several origins. The route store hands
//! us every candidate along with the outcome of selection, and we render
//! them in one of three forms: a compact table, a detailed per-entry
//! listing, or a structured document. Entries are marked with `*` when they
//! are the entry used for forwarding (`best_key`) and `@` when they are used
//! to advertise across areas (`best_keys`).
//!
//! All three views validate the whole input before producing anything and
//! sort prefixes the same way, so for equal input the output is identical
//! from call to call.

use crate::error::Error;
use crate::log::render_log;
use crate::tags::{TagNameStore, TagNames};
use itertools::Itertools;
use rdb::types::{
    AdvertisedRoute, AdvertisedRouteDetail, Prefix, PrefixType, RouteKey,
};
use slog::Logger;
use std::sync::Arc;

pub const MARKERS: &str = "Markers: * - Best entries (used for forwarding), \
                           @ - Entry used to advertise across area";

const ACRONYMS: [&str; 2] = [
    "Acronyms: SP - Source Preference, PP - Path Preference, D - Distance",
    "          MN - Min-Nexthops, PL - Prepend Label",
];

const DETAIL_INDENT: &str = "     ";

/// Renders advertised routes. Holds no per-call state, so one renderer can
/// serve any number of concurrent callers.
pub struct Renderer {
    tags: Arc<TagNameStore>,
    pub log: Logger,
}

impl Renderer {
    pub fn new(tags: Arc<TagNameStore>, log: Logger) -> Self {
        Self { tags, log }
    }

    /// Compact one-line-per-entry table.
    pub fn render_table(
        &self,
        routes: &[AdvertisedRouteDetail],
    ) -> Result<String, Error> {
        let routes = prepare(routes)?;
        render_log!(self, debug, "rendering advertised route table";
            "prefixes" => routes.len()
        );

        let mut rows: Vec<String> = vec![MARKERS.into()];
        rows.extend(ACRONYMS.iter().map(|s| s.to_string()));
        rows.push(String::new());
        rows.push(table_row(
            "",
            ["Source", "FwdAlgo", "FwdType", "SP", "PP", "D", "MN", "PL"],
        ));
        rows.push(String::new());

        for detail in routes {
            rows.push(section_header(detail));
            for r in &detail.routes {
                let e = &r.route;
                let sp = e.metrics.source_preference.to_string();
                let pp = e.metrics.path_preference.to_string();
                let d = e.metrics.distance.to_string();
                let mn = e.min_nexthop.to_string();
                let pl = e
                    .prepend_label
                    .map(|l| l.to_string())
                    .unwrap_or_default();
                rows.push(table_row(
                    markers(detail, r.key),
                    [
                        e.prefix_type.as_str(),
                        e.forwarding_algorithm.as_str(),
                        e.forwarding_type.as_str(),
                        &sp,
                        &pp,
                        &d,
                        &mn,
                        &pl,
                    ],
                ));
            }
            rows.push(String::new());
        }

        Ok(finish(rows))
    }

    /// Multi-line block per entry, including metrics, tags and area stack.
    pub fn render_detailed(
        &self,
        routes: &[AdvertisedRouteDetail],
    ) -> Result<String, Error> {
        let routes = prepare(routes)?;
        // One snapshot for the whole call, a concurrent table swap must not
        // change names halfway through the output.
        let names = self.tags.snapshot();
        render_log!(self, debug, "rendering advertised route detail";
            "prefixes" => routes.len(),
            "tag_names" => names.len()
        );

        let mut rows: Vec<String> = vec![MARKERS.into(), String::new()];
        for detail in routes {
            rows.push(section_header(detail));
            for r in &detail.routes {
                rows.extend(detail_block(detail, r, &names));
            }
            rows.push(String::new());
        }

        Ok(finish(rows))
    }

    /// Structured form of the routes. Object keys are ordered by name at
    /// every level, `best_keys` and `tags` are emitted as sorted arrays and
    /// absent optional fields are emitted as explicit nulls.
    pub fn render_structured(
        &self,
        routes: &[AdvertisedRouteDetail],
    ) -> Result<serde_json::Value, Error> {
        let routes = prepare(routes)?;
        render_log!(self, debug, "rendering advertised route document";
            "prefixes" => routes.len()
        );
        let value =
            serde_json::to_value(routes).map_err(rdb::error::Error::from)?;
        Ok(value)
    }
}

/// Inverse of [`Renderer::render_structured`]. The parsed routes are
/// validated the same way the renderers validate their input.
pub fn parse_structured(
    value: serde_json::Value,
) -> Result<Vec<AdvertisedRouteDetail>, Error> {
    let routes: Vec<AdvertisedRouteDetail> =
        serde_json::from_value(value).map_err(rdb::error::Error::from)?;
    for r in &routes {
        r.validate()?;
    }
    Ok(routes)
}

/// Pretty printed structured document, newline terminated.
pub fn to_pretty_json(value: &serde_json::Value) -> Result<String, Error> {
    let mut s =
        serde_json::to_string_pretty(value).map_err(rdb::error::Error::from)?;
    s.push('\n');
    Ok(s)
}

/// Narrow a route listing. An empty `prefixes` slice matches every prefix.
/// With `prefix_type` set, only prefixes whose forwarding entry has that
/// origin are kept.
pub fn filter_routes(
    routes: &[AdvertisedRouteDetail],
    prefixes: &[Prefix],
    prefix_type: Option<PrefixType>,
) -> Vec<AdvertisedRouteDetail> {
    routes
        .iter()
        .filter(|d| prefixes.is_empty() || prefixes.contains(&d.prefix))
        .filter(|d| match prefix_type {
            None => true,
            Some(t) => d.best_route().is_some_and(|r| r.route.prefix_type == t),
        })
        .cloned()
        .collect()
}

/// Validate everything up front, then order by prefix. The sort is stable
/// so duplicate prefixes keep their input order.
fn prepare(
    routes: &[AdvertisedRouteDetail],
) -> Result<Vec<&AdvertisedRouteDetail>, Error> {
    for r in routes {
        r.validate()?;
    }
    let mut sorted: Vec<&AdvertisedRouteDetail> = routes.iter().collect();
    sorted.sort_by_key(|d| d.prefix);
    Ok(sorted)
}

fn markers(detail: &AdvertisedRouteDetail, key: RouteKey) -> &'static str {
    match (detail.is_best(key), detail.is_advertised(key)) {
        (true, true) => "*@",
        (true, false) => "*",
        (false, true) => "@",
        (false, false) => "",
    }
}

fn section_header(detail: &AdvertisedRouteDetail) -> String {
    let marked = detail
        .routes
        .iter()
        .filter(|r| !markers(detail, r.key).is_empty())
        .count();
    format!("> {}, {}/{}", detail.prefix, marked, detail.routes.len())
}

fn table_row(marker: &str, cols: [&str; 8]) -> String {
    let [source, algo, fwd_type, sp, pp, d, mn, pl] = cols;
    format!(
        "{marker:<2} {source:<36} {algo:<12} {fwd_type:<8} \
         {sp:<6} {pp:<6} {d:<6} {mn:<5} {pl:<5} "
    )
}

fn detail_block(
    detail: &AdvertisedRouteDetail,
    r: &AdvertisedRoute,
    names: &TagNames,
) -> Vec<String> {
    let e = &r.route;
    let m = &e.metrics;

    // Sorted on the rendered `name/tag` pair, which keeps unnamed tags
    // grouped and in raw tag order.
    let tags = e.tags.iter().map(|t| names.display(t)).sorted().join(", ");

    vec![
        format!("{:<2} from {}", markers(detail, r.key), e.prefix_type),
        format!(
            "{DETAIL_INDENT}Forwarding - algorithm: {}, type: {}",
            e.forwarding_algorithm, e.forwarding_type,
        ),
        format!(
            "{DETAIL_INDENT}Metrics - path-preference: {}, \
             source-preference: {}, distance: {}, drained-path: {}",
            m.path_preference, m.source_preference, m.distance, m.drain_metric,
        ),
        format!("{DETAIL_INDENT}Performance - min-nexthops: {}", e.min_nexthop),
        format!(
            "{DETAIL_INDENT}Misc - prepend-label: {}, weight: {}",
            or_none(e.prepend_label),
            or_none(e.weight),
        ),
        format!("{DETAIL_INDENT}Tags - {tags}"),
        format!(
            "{DETAIL_INDENT}Area Stack - {}",
            e.area_stack.iter().join(", ")
        ),
    ]
}

fn or_none<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "None".into())
}

fn finish(rows: Vec<String>) -> String {
    let mut out = rows.join("\n");
    out.push('\n');
    out
}
