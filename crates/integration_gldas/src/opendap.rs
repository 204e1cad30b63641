//! OPeNDAP ASCII responses and grid lookups
//!
//! Parses the DAP2 `.ascii` rendering into named value vectors. The parser is
//! lenient about layout: a line starting with a letter opens a variable block,
//! index tokens like `[0][12]` are skipped and every numeric token is collected
//! into the current block.

use std::collections::BTreeMap;

use crate::client::GldasError;

/// `_FillValue` of the GLDAS land-surface fields
pub const FILL_VALUE: f64 = -9999.0;

/// Whether a decoded value is the archive fill value
pub fn is_fill(value: f64) -> bool {
    (value - FILL_VALUE).abs() < 1e-3
}

/// Variable name from a block header such as `Tair_f_inst.Tair_f_inst[0][1]`
fn block_name(header: &str) -> &str {
    let head = header.split(['[', ',']).next().unwrap_or(header).trim();
    head.rsplit('.').next().unwrap_or(head)
}

fn collect_numbers(text: &str, into: &mut Vec<f64>) {
    into.extend(
        text.split([',', ' ', '\t'])
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.starts_with('['))
            .filter_map(|t| t.parse::<f64>().ok()),
    );
}

/// Parse a DAP2 ASCII response into `name -> values`
pub fn parse_ascii(body: &str) -> BTreeMap<String, Vec<f64>> {
    let mut blocks: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("Dataset:") || line.starts_with("---") {
            continue;
        }

        if line.starts_with(|c: char| c.is_ascii_alphabetic()) {
            let name = block_name(line).to_string();
            let mut values = Vec::new();
            if let Some((_, rest)) = line.split_once(',') {
                collect_numbers(rest, &mut values);
            }
            blocks.insert(name.clone(), values);
            current = Some(name);
        } else if let Some(values) = current.as_ref().and_then(|name| blocks.get_mut(name)) {
            collect_numbers(line, values);
        }
    }

    blocks
}

/// Index of the coordinate closest to `target`; ties resolve to the lower index
pub fn nearest_index(axis: &[f64], target: f64) -> Option<usize> {
    axis.iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .fold(None, |best: Option<(usize, f64)>, (i, v)| {
            let distance = (v - target).abs();
            match best {
                Some((_, d)) if d <= distance => best,
                _ => Some((i, distance)),
            }
        })
        .map(|(i, _)| i)
}

/// Values of a named block
pub fn block<'a>(
    blocks: &'a BTreeMap<String, Vec<f64>>,
    name: &str,
) -> Result<&'a [f64], GldasError> {
    blocks
        .get(name)
        .map(Vec::as_slice)
        .filter(|values| !values.is_empty())
        .ok_or_else(|| GldasError::ParseError(format!("missing `{name}` in OPeNDAP response")))
}

/// Constraint expression selecting one cell of each variable at time index 0
pub fn point_constraint(variables: &[&str], lat_index: usize, lon_index: usize) -> String {
    variables
        .iter()
        .map(|v| format!("{v}[0][{lat_index}][{lon_index}]"))
        .collect::<Vec<_>>()
        .join(",")
}
