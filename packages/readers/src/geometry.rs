//! Minimal little-endian WKB (well-known binary) writer.
//!
//! TIGER/Line EDGES geometry is always a line (`LineString` or, when a
//! shapefile record carries multiple parts, `MultiLineString`). Settling on
//! one portable binary encoding at the reader boundary means the rest of the
//! pipeline (the ETL, the target schema's `edge.geometry` column) never has
//! to know about `shapefile`'s `Shape` type or convert geometry a second
//! time before insert.

use geo_types::{Geometry, LineString, MultiLineString};

const WKB_POINT: u32 = 1;
const WKB_LINESTRING: u32 = 2;
const WKB_MULTILINESTRING: u32 = 5;

/// Encodes `geometry` as little-endian WKB.
///
/// Point geometry (rare for EDGES, but not disallowed by the shapefile
/// format) is encoded as a WKB Point. Anything else that isn't a line or
/// multi-line is logged and encoded as an empty `LineString` rather than
/// panicking or dropping the edge.
#[must_use]
pub fn encode(geometry: &Geometry<f64>) -> Vec<u8> {
    let mut buf = Vec::new();
    match geometry {
        Geometry::Point(p) => {
            write_header(&mut buf, WKB_POINT);
            write_coord(&mut buf, p.x(), p.y());
        }
        Geometry::LineString(ls) => write_linestring(&mut buf, ls),
        Geometry::MultiLineString(mls) => write_multilinestring(&mut buf, mls),
        other => {
            log::warn!("geometry: unexpected shape kind for an edge record ({other:?}), encoding as empty line");
            write_linestring(&mut buf, &LineString::new(Vec::new()));
        }
    }
    buf
}

fn write_header(buf: &mut Vec<u8>, geom_type: u32) {
    buf.push(1); // byte order: little-endian
    buf.extend_from_slice(&geom_type.to_le_bytes());
}

fn write_coord(buf: &mut Vec<u8>, x: f64, y: f64) {
    buf.extend_from_slice(&x.to_le_bytes());
    buf.extend_from_slice(&y.to_le_bytes());
}

fn write_linestring(buf: &mut Vec<u8>, ls: &LineString<f64>) {
    write_header(buf, WKB_LINESTRING);
    #[allow(clippy::cast_possible_truncation)]
    let n = ls.0.len() as u32;
    buf.extend_from_slice(&n.to_le_bytes());
    for c in &ls.0 {
        write_coord(buf, c.x, c.y);
    }
}

fn write_multilinestring(buf: &mut Vec<u8>, mls: &MultiLineString<f64>) {
    write_header(buf, WKB_MULTILINESTRING);
    #[allow(clippy::cast_possible_truncation)]
    let n = mls.0.len() as u32;
    buf.extend_from_slice(&n.to_le_bytes());
    for ls in &mls.0 {
        write_linestring(buf, ls);
    }
}

/// Decodes the axis-aligned bounding box `(min_x, max_x, min_y, max_y)` of
/// a buffer produced by [`encode`], for spatial-index backfill.
///
/// Returns `None` for a buffer too short to hold a header, or for a
/// geometry with no coordinates (an empty `LineString`/`MultiLineString`).
#[must_use]
pub fn decode_bbox(wkb: &[u8]) -> Option<(f64, f64, f64, f64)> {
    if wkb.len() < 5 {
        return None;
    }
    let geom_type = u32::from_le_bytes(wkb[1..5].try_into().ok()?);
    match geom_type {
        WKB_POINT => {
            let (x, y) = read_coord(wkb, 5)?;
            Some((x, x, y, y))
        }
        WKB_LINESTRING => bbox_of_linestring(wkb, 5),
        WKB_MULTILINESTRING => {
            let n = u32::from_le_bytes(wkb.get(5..9)?.try_into().ok()?);
            let mut offset = 9;
            let mut bbox: Option<(f64, f64, f64, f64)> = None;
            for _ in 0..n {
                offset += 5; // each part carries its own WKB LineString header
                let (part_bbox, next) = bbox_of_linestring_at(wkb, offset)?;
                offset = next;
                bbox = Some(merge_bbox(bbox, part_bbox));
            }
            bbox
        }
        _ => None,
    }
}

fn read_coord(wkb: &[u8], offset: usize) -> Option<(f64, f64)> {
    let x = f64::from_le_bytes(wkb.get(offset..offset + 8)?.try_into().ok()?);
    let y = f64::from_le_bytes(wkb.get(offset + 8..offset + 16)?.try_into().ok()?);
    Some((x, y))
}

fn bbox_of_linestring(wkb: &[u8], header_offset: usize) -> Option<(f64, f64, f64, f64)> {
    bbox_of_linestring_at(wkb, header_offset).map(|(bbox, _)| bbox)
}

/// Reads one linestring's point count and coordinates starting at `offset`
/// (pointing at the point-count field, past any geometry header), returning
/// its bounding box plus the offset just past its last coordinate.
fn bbox_of_linestring_at(wkb: &[u8], offset: usize) -> Option<((f64, f64, f64, f64), usize)> {
    let n = u32::from_le_bytes(wkb.get(offset..offset + 4)?.try_into().ok()?);
    let mut cursor = offset + 4;
    let mut bbox: Option<(f64, f64, f64, f64)> = None;
    for _ in 0..n {
        let (x, y) = read_coord(wkb, cursor)?;
        cursor += 16;
        bbox = Some(match bbox {
            None => (x, x, y, y),
            Some((min_x, max_x, min_y, max_y)) => {
                (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y))
            }
        });
    }
    let bbox = bbox?;
    Some((bbox, cursor))
}

fn merge_bbox(a: Option<(f64, f64, f64, f64)>, b: (f64, f64, f64, f64)) -> (f64, f64, f64, f64) {
    match a {
        None => b,
        Some((min_x, max_x, min_y, max_y)) => (
            min_x.min(b.0),
            max_x.max(b.1),
            min_y.min(b.2),
            max_y.max(b.3),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, Coord};

    #[test]
    fn encodes_linestring_header_and_point_count() {
        let coords: Vec<Coord<f64>> = vec![coord! { x: -122.4, y: 37.7 }, coord! { x: -122.5, y: 37.8 }];
        let geometry = Geometry::LineString(LineString::new(coords));
        let wkb = encode(&geometry);

        assert_eq!(wkb[0], 1);
        assert_eq!(u32::from_le_bytes(wkb[1..5].try_into().unwrap()), WKB_LINESTRING);
        assert_eq!(u32::from_le_bytes(wkb[5..9].try_into().unwrap()), 2);
        assert_eq!(wkb.len(), 9 + 2 * 16);
    }

    #[test]
    fn encodes_empty_linestring_for_unsupported_shapes() {
        let geometry = Geometry::Point(geo_types::Point::new(1.0, 2.0));
        let wkb = encode(&geometry);
        assert_eq!(u32::from_le_bytes(wkb[1..5].try_into().unwrap()), WKB_POINT);
    }
}
