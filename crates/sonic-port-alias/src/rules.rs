//! Per-platform alias generators.
//!
//! Each generator is a pure function producing the front-panel alias table
//! of one hardware family. Generators are registered against SKU names in
//! [`crate::sku`].

use std::collections::BTreeSet;

use crate::maps::{ethernet, PortAliasMap};

/// Adds `alias(i) -> Ethernet<lane(i)>` for every `i` in `ports`.
fn extend<I, A, L>(map: &mut PortAliasMap, ports: I, alias: A, lane: L)
where
    I: IntoIterator<Item = u32>,
    A: Fn(u32) -> String,
    L: Fn(u32) -> u32,
{
    for i in ports {
        map.insert(alias(i), ethernet(lane(i)));
    }
}

fn build<I, A, L>(ports: I, alias: A, lane: L) -> PortAliasMap
where
    I: IntoIterator<Item = u32>,
    A: Fn(u32) -> String,
    L: Fn(u32) -> u32,
{
    let mut map = PortAliasMap::new();
    extend(&mut map, ports, alias, lane);
    map
}

/// Lowercase letter `n` positions after `a`.
fn lane_letter(n: u32) -> char {
    char::from(b'a' + (n % 26) as u8)
}

/// First lane of 1-based front-panel port `i` on a 4-lane breakout.
/// `None` for port 0 and for ports whose lane does not fit in `u32`.
fn breakout_lane(i: u32) -> Option<u32> {
    i.checked_sub(1)?.checked_mul(4)
}

/// `Ethernet<i>/1 -> Ethernet<(i-1)*4>` for every `i` in `ports`.
///
/// Ports without a valid lane are skipped.
pub fn uniform_breakout<I: IntoIterator<Item = u32>>(ports: I) -> PortAliasMap {
    let mut map = PortAliasMap::new();
    for i in ports {
        if let Some(lane) = breakout_lane(i) {
            map.insert(format!("Ethernet{}/1", i), ethernet(lane));
        }
    }
    map
}

/// `Ethernet<i> -> Ethernet<i>` for every `i` in `ports`.
pub fn identity<I: IntoIterator<Item = u32>>(ports: I) -> PortAliasMap {
    build(ports, |i| format!("Ethernet{}", i), |i| i)
}

/// Mixed 50G/100G breakout.
///
/// Ports of `all` that are not in `s100g` run at 50G and expose two
/// aliases, `/1` and `/3`. 100G ports expose `/1` only. Ports without a
/// valid lane are skipped.
pub fn split_50g(all: &[u32], s100g: &[u32]) -> PortAliasMap {
    let hundred: BTreeSet<u32> = s100g.iter().copied().collect();
    let fifty = all.iter().copied().filter(|i| !hundred.contains(i));

    let mut map = PortAliasMap::new();
    for i in fifty {
        let Some(lane) = breakout_lane(i) else { continue };
        let Some(third) = lane.checked_add(2) else { continue };
        map.insert(format!("Ethernet{}/1", i), ethernet(lane));
        map.insert(format!("Ethernet{}/3", i), ethernet(third));
    }
    map.extend(uniform_breakout(hundred));
    map
}

/// Map used for any SKU without a registered rule.
pub fn default_map() -> PortAliasMap {
    identity((0..128).step_by(4))
}

pub(crate) fn force10_s6000() -> PortAliasMap {
    build((0..128).step_by(4), |i| format!("fortyGigE0/{}", i), |i| i)
}

pub(crate) fn force10_s6100() -> PortAliasMap {
    let mut map = PortAliasMap::new();
    for i in 0..4 {
        extend(
            &mut map,
            0..16,
            |j| format!("fortyGigE1/{}/{}", i + 1, j + 1),
            |j| i * 16 + j,
        );
    }
    map
}

pub(crate) fn force10_z9100() -> PortAliasMap {
    build((0..128).step_by(4), |i| format!("hundredGigE1/{}", i / 4 + 1), |i| i)
}

fn z9332f_10g(map: &mut PortAliasMap) {
    extend(
        map,
        256..258,
        |i| format!("etp{}", if i == 256 { 33 } else { 34 }),
        |i| i,
    );
}

pub(crate) fn dellemc_z9332f_m_o16c64() -> PortAliasMap {
    let mut map = PortAliasMap::new();
    let s100g = (0..96).step_by(2).chain((128..160).step_by(2));
    extend(
        &mut map,
        s100g,
        |i| format!("etp{}{}", (i + 8) / 8, lane_letter((i / 2) % 4)),
        |i| i,
    );
    let s400g = (96..128).step_by(8).chain((160..256).step_by(8));
    extend(&mut map, s400g, |i| format!("etp{}", i / 8 + 1), |i| i);
    z9332f_10g(&mut map);
    map
}

pub(crate) fn dellemc_z9332f_o32() -> PortAliasMap {
    let mut map = build((0..256).step_by(8), |i| format!("etp{}", i / 8 + 1), |i| i);
    z9332f_10g(&mut map);
    map
}

pub(crate) fn arista_7050_qx32() -> PortAliasMap {
    let mut map = uniform_breakout(1..25);
    extend(&mut map, 25..33, |i| format!("Ethernet{}", i), |i| (i - 1) * 4);
    map
}

pub(crate) fn arista_7050_qx_32s() -> PortAliasMap {
    let mut map = build(0..4, |i| format!("Ethernet1/{}", i + 1), |i| i);
    extend(&mut map, 6..29, |i| format!("Ethernet{}/1", i), |i| (i - 5) * 4);
    extend(&mut map, 29..37, |i| format!("Ethernet{}", i), |i| (i - 5) * 4);
    map
}

pub(crate) fn arista_7280cr3_c40() -> PortAliasMap {
    let mut map = uniform_breakout(1..33);
    for i in (33..41).step_by(2) {
        map.insert(format!("Ethernet{}/1", i), ethernet((i - 1) * 4));
        map.insert(format!("Ethernet{}/5", i), ethernet(i * 4));
    }
    map
}

pub(crate) fn uniform_64() -> PortAliasMap {
    uniform_breakout(1..65)
}

pub(crate) fn uniform_32() -> PortAliasMap {
    uniform_breakout(1..33)
}

const SN2700_100G: [std::ops::Range<u32>; 2] = [24..40, 88..104];

fn sn2700_etp(i: u32) -> String {
    format!("etp{}", i / 4 + 1)
}

fn sn2700_split(map: &mut PortAliasMap, s50g: impl IntoIterator<Item = u32>) {
    extend(
        map,
        s50g,
        |i| format!("{}{}", sn2700_etp(i), if i % 4 == 0 { 'a' } else { 'b' }),
        |i| i,
    );
    for range in SN2700_100G {
        extend(map, range.step_by(4), sn2700_etp, |i| i);
    }
}

pub(crate) fn mellanox_sn2700_d40c8s8() -> PortAliasMap {
    let mut map = build(
        (0..4).chain(8..12),
        |i| format!("{}{}", sn2700_etp(i), lane_letter(i % 4)),
        |i| i,
    );
    let s50g = (16..24)
        .step_by(2)
        .chain((40..88).step_by(2))
        .chain((104..128).step_by(2));
    sn2700_split(&mut map, s50g);
    map
}

pub(crate) fn mellanox_sn2700_d48c8() -> PortAliasMap {
    let mut map = PortAliasMap::new();
    let s50g = (0..24)
        .step_by(2)
        .chain((40..88).step_by(2))
        .chain((104..128).step_by(2));
    sn2700_split(&mut map, s50g);
    map
}

/// `etp<i> -> Ethernet<(i-1)*4>`, i in 1..33.
pub(crate) fn etp_32() -> PortAliasMap {
    build(1..33, |i| format!("etp{}", i), |i| (i - 1) * 4)
}

pub(crate) fn arista_7060cx_32s_d48c8() -> PortAliasMap {
    let all: Vec<u32> = (1..33).collect();
    let s100g: Vec<u32> = (7..11).chain(23..27).collect();
    split_50g(&all, &s100g)
}

pub(crate) fn arista_7260cx3_d108c8() -> PortAliasMap {
    let all: Vec<u32> = (1..65).collect();
    let s100g: Vec<u32> = (13..21).collect();
    split_50g(&all, &s100g)
}

/// Only 47 of the 48 linecard ports are published for these SKUs.
pub(crate) fn arista_7800r3_48cq_lc() -> PortAliasMap {
    uniform_breakout(1..48)
}

fn ingrasys_s8900(last: u32) -> PortAliasMap {
    let mut map = build(1..49, |i| format!("Ethernet{}", i), |i| i - 1);
    extend(&mut map, 49..last, |i| format!("Ethernet{}/1", i), |i| (i - 49) * 4 + 48);
    map
}

pub(crate) fn ingrasys_s8900_54xc() -> PortAliasMap {
    ingrasys_s8900(55)
}

pub(crate) fn ingrasys_s8900_64xc() -> PortAliasMap {
    ingrasys_s8900(65)
}

pub(crate) fn accton_as7712_32x() -> PortAliasMap {
    build(1..33, |i| format!("hundredGigE{}", i), |i| (i - 1) * 4)
}

pub(crate) fn seastone_dx010() -> PortAliasMap {
    build(1..33, |i| format!("Eth{}", i), |i| (i - 1) * 4)
}

pub(crate) fn etp_52_serial() -> PortAliasMap {
    build(1..53, |i| format!("etp{}", i), |i| i - 1)
}

pub(crate) fn et6448m() -> PortAliasMap {
    identity(0..52)
}

pub(crate) fn identity_36() -> PortAliasMap {
    identity(0..36)
}

/// Supervisor cards have no front-panel ports.
pub(crate) fn supervisor() -> PortAliasMap {
    PortAliasMap::new()
}

pub(crate) fn newport() -> PortAliasMap {
    identity((0..256).step_by(8))
}

pub(crate) fn identity_32() -> PortAliasMap {
    identity(0..32)
}

pub(crate) fn identity_64() -> PortAliasMap {
    identity(0..64)
}

pub(crate) fn identity_48() -> PortAliasMap {
    identity(0..48)
}

fn multi_asic_vs(last: u32) -> PortAliasMap {
    build(1..last, |i| format!("Ethernet1/{}", i), |i| (i - 1) * 4)
}

pub(crate) fn msft_multi_asic_vs() -> PortAliasMap {
    multi_asic_vs(65)
}

pub(crate) fn msft_four_asic_vs() -> PortAliasMap {
    multi_asic_vs(9)
}

pub(crate) fn b6510_48vs8cq() -> PortAliasMap {
    let mut map = build(1..49, |i| format!("twentyfiveGigE0/{}", i), |i| i);
    extend(&mut map, 49..57, |i| format!("hundredGigE0/{}", i - 48), |i| i);
    map
}

pub(crate) fn ra_b6910_64c() -> PortAliasMap {
    build(1..65, |i| format!("hundredGigE{}", i), |i| i)
}
