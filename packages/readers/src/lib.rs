#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Typed, single-pass record readers for the three county-level TIGER/Line
//! inputs the ETL consumes: the EDGES shapefile (geometry + attributes) and
//! the FEATNAMES/ADDR attribute-only dBase tables.
//!
//! Readers never hand raw attribute maps to callers: every field is read,
//! case-normalized, and typed at this boundary (per the "dynamic records
//! from shapefiles/dBase" design guidance), so the ETL only ever sees
//! [`EdgeRecord`], [`FeatureNameRecord`], and [`AddressRecord`].

mod geometry;
mod text;

pub use geometry::decode_bbox;

use std::path::Path;

use shapefile::dbase::{FieldValue, Record};

/// Errors that can occur while reading a shapefile or dBase table.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// The combined `.shp`/`.dbf` reader failed to open or iterate.
    #[error("shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    /// The standalone `.dbf` reader failed to open or iterate.
    #[error("dbase error: {0}")]
    Dbase(#[from] shapefile::dbase::Error),
}

/// A single EDGES record: the line geometry plus the attributes the ETL's
/// `linezip` step needs (`mtfcc`, `zipl`, `zipr`).
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub tlid: i64,
    pub mtfcc: String,
    pub zipl: String,
    pub zipr: String,
    /// Little-endian WKB encoding of the edge's line geometry.
    pub geometry: Vec<u8>,
}

/// A single FEATNAMES record (one of possibly several aliases per TLID).
#[derive(Debug, Clone)]
pub struct FeatureNameRecord {
    pub tlid: i64,
    pub fullname: String,
    pub paflag: bool,
}

/// A single ADDR record (one side of one TLID's address range).
#[derive(Debug, Clone)]
pub struct AddressRecord {
    pub tlid: i64,
    pub fromhn: String,
    pub tohn: String,
    /// `'L'`, `'R'`, or empty.
    pub side: String,
    pub zip: String,
}

/// Opens `shp_path` (and its sibling `.dbf`) and returns a single-pass,
/// finite iterator over [`EdgeRecord`].
///
/// # Errors
///
/// Returns [`ReaderError`] if the shapefile set cannot be opened.
pub fn edge_reader(
    shp_path: &Path,
) -> Result<impl Iterator<Item = Result<EdgeRecord, ReaderError>>, ReaderError> {
    let reader = shapefile::Reader::from_path(shp_path)?;
    Ok(reader.iter_shapes_and_records().map(|result| {
        let (shape, record) = result?;
        let tlid = field_i64(&record, "TLID");
        let mtfcc = field_string(&record, "MTFCC").to_uppercase();
        let zipl = field_string(&record, "ZIPL").to_uppercase();
        let zipr = field_string(&record, "ZIPR").to_uppercase();

        let geom: geo_types::Geometry<f64> = shape.try_into().map_err(|e| {
            log::warn!("edge_reader: TLID {tlid} has unconvertible geometry: {e}");
            shapefile::Error::InvalidShapeRecordCount
        })?;
        let geometry = geometry::encode(&geom);

        Ok(EdgeRecord { tlid, mtfcc, zipl, zipr, geometry })
    }))
}

/// Opens the standalone FEATNAMES `.dbf` at `dbf_path` and returns a
/// single-pass, finite iterator over [`FeatureNameRecord`].
///
/// # Errors
///
/// Returns [`ReaderError`] if the table cannot be opened.
pub fn featname_reader(
    dbf_path: &Path,
) -> Result<impl Iterator<Item = Result<FeatureNameRecord, ReaderError>>, ReaderError> {
    let reader = shapefile::dbase::Reader::from_path(dbf_path)?;
    Ok(reader.into_iter().map(|result| {
        let record = result?;
        Ok(FeatureNameRecord {
            tlid: field_i64(&record, "TLID"),
            fullname: field_string(&record, "FULLNAME"),
            paflag: field_bool_yn(&record, "PAFLAG"),
        })
    }))
}

/// Opens the standalone ADDR `.dbf` at `dbf_path` and returns a
/// single-pass, finite iterator over [`AddressRecord`].
///
/// # Errors
///
/// Returns [`ReaderError`] if the table cannot be opened.
pub fn addr_reader(
    dbf_path: &Path,
) -> Result<impl Iterator<Item = Result<AddressRecord, ReaderError>>, ReaderError> {
    let reader = shapefile::dbase::Reader::from_path(dbf_path)?;
    Ok(reader.into_iter().map(|result| {
        let record = result?;
        Ok(AddressRecord {
            tlid: field_i64(&record, "TLID"),
            fromhn: field_string(&record, "FROMHN"),
            tohn: field_string(&record, "TOHN"),
            side: field_string(&record, "SIDE").to_uppercase(),
            zip: field_string(&record, "ZIP"),
        })
    }))
}

fn get_field<'a>(record: &'a Record, name: &str) -> Option<&'a FieldValue> {
    record.get(name).or_else(|| record.get(&name.to_lowercase()))
}

fn field_i64(record: &Record, name: &str) -> i64 {
    match get_field(record, name) {
        Some(FieldValue::Numeric(Some(v))) => {
            #[allow(clippy::cast_possible_truncation)]
            let v = *v as i64;
            v
        }
        Some(FieldValue::Integer(v)) => i64::from(*v),
        Some(FieldValue::Character(Some(s))) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn field_string(record: &Record, name: &str) -> String {
    match get_field(record, name) {
        Some(FieldValue::Character(Some(s))) => text::normalize(s),
        _ => String::new(),
    }
}

fn field_bool_yn(record: &Record, name: &str) -> bool {
    match get_field(record, name) {
        Some(FieldValue::Character(Some(s))) => s.trim().eq_ignore_ascii_case("Y"),
        Some(FieldValue::Logical(Some(b))) => *b,
        _ => false,
    }
}
