//! Pure, in-memory transforms from raw county records to the rows the
//! schema manager's five tables want, per the County ETL (C9) algorithm.

use std::collections::{BTreeSet, HashMap, HashSet};

use tiger_readers::{AddressRecord, EdgeRecord, FeatureNameRecord};

use crate::records::{leading_nondigits, trailing_digits};

/// `tlid -> {zip}` multimap built from ADDR zips and, for street-class
/// edges, `zipl`/`zipr`.
pub type LineZip = HashMap<i64, BTreeSet<String>>;

/// A de-duplicated `(street, street_phone, paflag, zip)` row, ready for
/// insert-or-ignore into `feature`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureRow {
    pub street: String,
    pub street_phone: String,
    pub paflag: bool,
    pub zip: String,
}

/// A `(street, street_phone, paflag, zip, tlid)` candidate: joins back to
/// `feature` on the first four fields to resolve `fid` before insert.
#[derive(Debug, Clone)]
pub struct FeatureEdgeCandidate {
    pub street: String,
    pub street_phone: String,
    pub paflag: bool,
    pub zip: String,
    pub tlid: i64,
}

/// A `(tlid, fromhn, tohn, prenum, zip, side)` row, ready for plain insert
/// into `range`.
#[derive(Debug, Clone)]
pub struct RangeRow {
    pub tlid: i64,
    pub fromhn: i64,
    pub tohn: i64,
    pub prenum: String,
    pub zip: String,
    pub side: String,
}

/// Builds the `tlid -> {zip}` multimap: every non-empty `addr.zip`
/// contributes `{addr.tlid -> addr.zip}`; for edges whose `mtfcc` starts
/// with `S` (street class), each non-empty `zipl`/`zipr` also contributes.
#[must_use]
pub fn build_linezip(edges: &[EdgeRecord], addr: &[AddressRecord]) -> LineZip {
    let mut linezip: LineZip = HashMap::new();

    for a in addr {
        if !a.zip.is_empty() {
            linezip.entry(a.tlid).or_default().insert(a.zip.clone());
        }
    }

    for e in edges {
        if !e.mtfcc.starts_with('S') {
            continue;
        }
        if !e.zipl.is_empty() {
            linezip.entry(e.tlid).or_default().insert(e.zipl.clone());
        }
        if !e.zipr.is_empty() {
            linezip.entry(e.tlid).or_default().insert(e.zipr.clone());
        }
    }

    linezip
}

fn zips_for(linezip: &LineZip, tlid: i64) -> Vec<String> {
    linezip
        .get(&tlid)
        .filter(|zips| !zips.is_empty())
        .map(|zips| zips.iter().cloned().collect())
        .unwrap_or_else(|| vec![String::new()])
}

/// For each featname with a non-empty `fullname`, and for each zip the
/// TLID maps to (or the single empty string if it maps to none), emits a
/// `(fullname, phonetic(fullname,5), paflag, zip)` row, de-duplicated on
/// the full 4-tuple.
#[must_use]
pub fn build_features(linezip: &LineZip, featnames: &[FeatureNameRecord]) -> Vec<FeatureRow> {
    let mut seen = HashSet::new();
    let mut features = Vec::new();

    for f in featnames {
        if f.fullname.is_empty() {
            continue;
        }
        let street_phone = tiger_phonetic::phonetic(&f.fullname, 5);

        for zip in zips_for(linezip, f.tlid) {
            let row = FeatureRow {
                street: f.fullname.clone(),
                street_phone: street_phone.clone(),
                paflag: f.paflag,
                zip,
            };
            if seen.insert(row.clone()) {
                features.push(row);
            }
        }
    }

    features
}

/// For each featname and each zip the TLID maps to, emits a
/// `(fullname, street_phone, paflag, zip, tlid)` candidate joining back to
/// `feature`.
#[must_use]
pub fn build_feature_edges(
    linezip: &LineZip,
    featnames: &[FeatureNameRecord],
) -> Vec<FeatureEdgeCandidate> {
    let mut edges = Vec::new();

    for f in featnames {
        if f.fullname.is_empty() {
            continue;
        }
        let street_phone = tiger_phonetic::phonetic(&f.fullname, 5);

        for zip in zips_for(linezip, f.tlid) {
            edges.push(FeatureEdgeCandidate {
                street: f.fullname.clone(),
                street_phone: street_phone.clone(),
                paflag: f.paflag,
                zip,
                tlid: f.tlid,
            });
        }
    }

    edges
}

/// For each ADDR row with non-empty `fromhn`, `tohn`, and `zip`, extracts
/// the trailing-digit house numbers and the leading non-digit prefix and
/// emits a `range` row.
#[must_use]
pub fn build_ranges(addr: &[AddressRecord]) -> Vec<RangeRow> {
    addr.iter()
        .filter(|a| !a.fromhn.is_empty() && !a.tohn.is_empty() && !a.zip.is_empty())
        .map(|a| RangeRow {
            tlid: a.tlid,
            fromhn: trailing_digits(&a.fromhn),
            tohn: trailing_digits(&a.tohn),
            prenum: leading_nondigits(&a.fromhn),
            zip: a.zip.clone(),
            side: a.side.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(tlid: i64, mtfcc: &str, zipl: &str, zipr: &str) -> EdgeRecord {
        EdgeRecord {
            tlid,
            mtfcc: mtfcc.to_string(),
            zipl: zipl.to_string(),
            zipr: zipr.to_string(),
            geometry: Vec::new(),
        }
    }

    fn addr(tlid: i64, fromhn: &str, tohn: &str, side: &str, zip: &str) -> AddressRecord {
        AddressRecord {
            tlid,
            fromhn: fromhn.to_string(),
            tohn: tohn.to_string(),
            side: side.to_string(),
            zip: zip.to_string(),
        }
    }

    #[test]
    fn linezip_collects_addr_and_street_class_edge_zips() {
        let edges = vec![edge(1, "S1400", "90210", "90211"), edge(2, "C3061", "11111", "")];
        let addr = vec![addr(1, "100", "200", "L", "90212")];

        let linezip = build_linezip(&edges, &addr);
        let zips = linezip.get(&1).unwrap();
        assert_eq!(zips.len(), 3);
        assert!(zips.contains("90210"));
        assert!(zips.contains("90211"));
        assert!(zips.contains("90212"));
        assert!(!linezip.contains_key(&2));
    }

    #[test]
    fn features_dedup_on_full_tuple_and_fan_out_over_zips() {
        let linezip: LineZip = [(1i64, BTreeSet::from(["90210".to_string(), "90211".to_string()]))]
            .into_iter()
            .collect();
        let featnames = vec![
            FeatureNameRecord { tlid: 1, fullname: "Main St".to_string(), paflag: true },
            FeatureNameRecord { tlid: 1, fullname: "Main St".to_string(), paflag: true },
            FeatureNameRecord { tlid: 2, fullname: String::new(), paflag: false },
        ];

        let features = build_features(&linezip, &featnames);
        assert_eq!(features.len(), 2);
        assert!(features.iter().all(|f| f.street == "Main St"));
    }

    #[test]
    fn features_use_single_empty_zip_when_tlid_has_none() {
        let linezip: LineZip = HashMap::new();
        let featnames = vec![FeatureNameRecord { tlid: 9, fullname: "Oak Ave".to_string(), paflag: false }];

        let features = build_features(&linezip, &featnames);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].zip, "");
    }

    #[test]
    fn ranges_skip_incomplete_rows() {
        let addr = vec![
            addr(1, "100", "200", "L", "90210"),
            addr(2, "", "200", "L", "90210"),
            addr(3, "N100", "N200", "R", "90210"),
        ];

        let ranges = build_ranges(&addr);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].fromhn, 100);
        assert_eq!(ranges[0].tohn, 200);
        assert_eq!(ranges[0].prenum, "");
        assert_eq!(ranges[1].prenum, "N");
    }
}
