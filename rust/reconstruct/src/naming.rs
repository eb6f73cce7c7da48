// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity naming conventions
//!
//! Drafting exports name their curve groups `<category>_curve_`; entities
//! created from the same base get `.001`, `.002` … suffixes. Numbers embedded
//! in exported names render the way the legacy tooling printed them.

/// Numeric `.NNN` suffix of a name, if any
pub fn numeric_suffix(name: &str) -> Option<u32> {
    let (_, digits) = name.rsplit_once('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Name without its `.NNN` suffix
pub fn base_name(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, _)) if numeric_suffix(name).is_some() => base,
        _ => name,
    }
}

/// `base` for `number == first`, `base.NNN` otherwise
pub fn numbered_name(base: &str, number: usize, first: usize) -> String {
    if number == first {
        base.to_string()
    } else {
        format!("{}.{:03}", base, number)
    }
}

/// First name derived from `name` for which `taken` is false
///
/// A taken name is retried as `<base>.001`, `<base>.002` … where `<base>`
/// has any existing numeric suffix removed.
pub fn unique_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    let base = base_name(name);
    (1..)
        .map(|n| format!("{}.{:03}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Short name of a furniture curve exported as `<Name>_<code>_curve_`
///
/// Returns `None` for names that do not follow the pattern or that are
/// reference groups.
pub fn furniture_base_name<'a>(
    name: &'a str,
    curve_suffix: &str,
    reference_prefix: &str,
) -> Option<&'a str> {
    if name.starts_with(reference_prefix) {
        return None;
    }
    let stem = name.strip_suffix(curve_suffix)?;
    stem.split('_').next()
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Render a number the way the legacy exporter printed floats
///
/// Integral values keep one decimal (`90.0`), everything else uses the
/// shortest representation that round-trips.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
