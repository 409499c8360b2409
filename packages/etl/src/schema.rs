//! C10 Schema Manager: idempotent table creation, pragma tuning, gazetteer
//! seeding, and deferred index creation for the target geocoding database.

use rusqlite::Connection;

use crate::EtlError;

const PLACE_GAZETTEER_SQL: &str = include_str!("../assets/place_gazetteer.sql");

/// Creates the five target tables (`IF NOT EXISTS`) and tunes pragmas for
/// bulk write: in-memory temp store, write-ahead logging, relaxed-but-
/// durable sync, and a large page cache.
///
/// # Errors
///
/// Returns [`EtlError`] if any DDL or pragma statement fails.
pub fn create_schema(conn: &Connection) -> Result<(), EtlError> {
    conn.execute_batch(
        "PRAGMA temp_store = MEMORY;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = -500000;

         CREATE TABLE IF NOT EXISTS place (
             zip CHAR(5),
             city VARCHAR(100),
             state CHAR(2),
             city_phone VARCHAR(5),
             lat NUMERIC(9,6),
             lon NUMERIC(9,6),
             status CHAR(1),
             fips_class CHAR(2),
             fips_place CHAR(7),
             fips_county CHAR(5),
             priority CHAR(1)
         );

         CREATE TABLE IF NOT EXISTS edge (
             tlid INTEGER PRIMARY KEY,
             geometry BLOB
         );

         CREATE TABLE IF NOT EXISTS feature (
             fid INTEGER PRIMARY KEY AUTOINCREMENT,
             street VARCHAR(100),
             street_phone VARCHAR(5),
             paflag BOOLEAN,
             zip CHAR(5)
         );

         CREATE UNIQUE INDEX IF NOT EXISTS feature_unique_idx
             ON feature(street, street_phone, paflag, zip);

         CREATE TABLE IF NOT EXISTS feature_edge (
             fid INTEGER,
             tlid INTEGER
         );

         CREATE TABLE IF NOT EXISTS range (
             tlid INTEGER,
             fromhn INTEGER,
             tohn INTEGER,
             prenum VARCHAR(12),
             zip CHAR(5),
             side CHAR(1)
         );",
    )?;

    Ok(())
}

/// Loads the bundled place gazetteer if `place` is currently empty;
/// otherwise skips (idempotent). Logs the row count on success.
///
/// # Errors
///
/// Returns [`EtlError`] if the existence check or the insert fails.
pub fn load_place_gazetteer(conn: &Connection) -> Result<(), EtlError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM place", [], |row| row.get(0))?;
    if count > 0 {
        log::info!("load_place_gazetteer: place already has {count} rows, skipping");
        return Ok(());
    }

    conn.execute_batch(PLACE_GAZETTEER_SQL)?;

    let inserted: i64 = conn.query_row("SELECT COUNT(*) FROM place", [], |row| row.get(0))?;
    log::info!("load_place_gazetteer: loaded {inserted} rows");
    Ok(())
}

/// Reports whether `table`'s current columns (via `PRAGMA table_info`)
/// exactly match `expected`, in order.
///
/// Used by the county ETL to guard against appending into a database that
/// was created outside this tool with a stale or differently-shaped
/// table: per the spec's error handling design, a mismatch means that
/// table's insert is skipped with a warning rather than risking a
/// corrupted row shape.
///
/// # Errors
///
/// Returns [`EtlError`] if the `PRAGMA` query fails.
pub fn columns_match(conn: &Connection, table: &str, expected: &[&str]) -> Result<bool, EtlError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let actual: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<_, _>>()?;

    Ok(actual.len() == expected.len() && actual.iter().zip(expected).all(|(a, e)| a == e))
}

/// Creates the index set below idempotently. Each index is attempted
/// independently: a failure (e.g. the `rtree` module unavailable in a
/// given `SQLite` build) is logged and the remaining indexes still run.
///
/// | Index | Table | Columns |
/// |---|---|---|
/// | `place_city_phone_state_idx` | `place` | `(city_phone, state)` |
/// | `place_zip_priority_idx` | `place` | `(zip, priority)` |
/// | `feature_street_phone_zip_idx` | `feature` | `(street_phone, zip)` |
/// | `feature_edge_fid_idx` | `feature_edge` | `(fid)` |
/// | `range_tlid_idx` | `range` | `(tlid)` |
/// | `edge_geom_rtree` | `edge` | `(geometry)`, via an `rtree` virtual table |
///
/// `edge_geom_rtree` is also backfilled here: every `edge.geometry` WKB
/// blob not yet represented in the rtree is decoded to its bounding box
/// and inserted, so the spatial index is actually queryable once a
/// pipeline run finishes rather than sitting empty.
pub fn create_indexes(conn: &Connection) {
    let statements = [
        ("place_city_phone_state_idx", "CREATE INDEX IF NOT EXISTS place_city_phone_state_idx ON place(city_phone, state)"),
        ("place_zip_priority_idx", "CREATE INDEX IF NOT EXISTS place_zip_priority_idx ON place(zip, priority)"),
        ("feature_street_phone_zip_idx", "CREATE INDEX IF NOT EXISTS feature_street_phone_zip_idx ON feature(street_phone, zip)"),
        ("feature_edge_fid_idx", "CREATE INDEX IF NOT EXISTS feature_edge_fid_idx ON feature_edge(fid)"),
        ("range_tlid_idx", "CREATE INDEX IF NOT EXISTS range_tlid_idx ON range(tlid)"),
    ];

    for (name, sql) in statements {
        if let Err(e) = conn.execute_batch(sql) {
            log::warn!("create_indexes: {name} failed, continuing: {e}");
        }
    }

    create_edge_rtree(conn);
}

fn create_edge_rtree(conn: &Connection) {
    if let Err(e) = conn.execute_batch(
        "CREATE VIRTUAL TABLE IF NOT EXISTS edge_geom_rtree USING rtree(tlid, min_x, max_x, min_y, max_y)",
    ) {
        log::warn!("create_indexes: edge_geom_rtree failed, continuing: {e}");
        return;
    }

    if let Err(e) = backfill_edge_rtree(conn) {
        log::warn!("create_indexes: edge_geom_rtree backfill failed, continuing: {e}");
    }
}

/// Decodes every `edge.geometry` WKB blob to its bounding box and inserts
/// `(tlid, min_x, max_x, min_y, max_y)` into `edge_geom_rtree`, skipping
/// any `tlid` the rtree already has (so re-running a pipeline against an
/// already-indexed database stays idempotent) and any edge whose geometry
/// is empty (no coordinates to bound).
fn backfill_edge_rtree(conn: &Connection) -> Result<(), EtlError> {
    let mut select = conn.prepare(
        "SELECT tlid, geometry FROM edge
         WHERE tlid NOT IN (SELECT tlid FROM edge_geom_rtree)",
    )?;
    let mut insert = conn.prepare(
        "INSERT INTO edge_geom_rtree (tlid, min_x, max_x, min_y, max_y) VALUES (?, ?, ?, ?, ?)",
    )?;

    let rows: Vec<(i64, Vec<u8>)> = select
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<_, _>>()?;

    let mut inserted = 0u64;
    for (tlid, geometry) in rows {
        let Some((min_x, max_x, min_y, max_y)) = tiger_readers::decode_bbox(&geometry) else {
            continue;
        };
        insert.execute(rusqlite::params![tlid, min_x, max_x, min_y, max_y])?;
        inserted += 1;
    }
    log::info!("backfill_edge_rtree: inserted {inserted} rows");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_conn() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn create_schema_is_idempotent() {
        let conn = memory_conn();
        create_schema(&conn).unwrap();
        create_schema(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'edge'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn gazetteer_city_phone_matches_coder() {
        let conn = memory_conn();
        create_schema(&conn).unwrap();
        load_place_gazetteer(&conn).unwrap();

        let mut stmt = conn.prepare("SELECT city, city_phone FROM place").unwrap();
        let rows: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(!rows.is_empty());

        for (city, city_phone) in rows {
            assert_eq!(
                tiger_phonetic::phonetic(&city, 5),
                city_phone,
                "seeded city_phone for '{city}' has drifted from the coder"
            );
        }
    }

    #[test]
    fn load_place_gazetteer_skips_when_already_populated() {
        let conn = memory_conn();
        create_schema(&conn).unwrap();
        load_place_gazetteer(&conn).unwrap();

        let first_count: i64 = conn.query_row("SELECT COUNT(*) FROM place", [], |row| row.get(0)).unwrap();
        assert!(first_count > 0);

        load_place_gazetteer(&conn).unwrap();
        let second_count: i64 = conn.query_row("SELECT COUNT(*) FROM place", [], |row| row.get(0)).unwrap();
        assert_eq!(first_count, second_count);
    }

    #[test]
    fn columns_match_detects_stale_table_shape() {
        let conn = memory_conn();
        create_schema(&conn).unwrap();
        assert!(columns_match(&conn, "edge", &["tlid", "geometry"]).unwrap());

        conn.execute_batch("DROP TABLE edge; CREATE TABLE edge (tlid INTEGER PRIMARY KEY)")
            .unwrap();
        assert!(!columns_match(&conn, "edge", &["tlid", "geometry"]).unwrap());
    }

    #[test]
    fn create_indexes_tolerates_being_called_before_rtree_data_exists() {
        let conn = memory_conn();
        create_schema(&conn).unwrap();
        create_indexes(&conn);

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'feature_street_phone_zip_idx'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    /// Builds a minimal little-endian WKB LineString buffer, mirroring
    /// `tiger_readers`' encoder, for a test edge geometry.
    fn wkb_linestring(points: &[(f64, f64)]) -> Vec<u8> {
        let mut buf = vec![1u8];
        buf.extend_from_slice(&2u32.to_le_bytes()); // WKB LineString
        #[allow(clippy::cast_possible_truncation)]
        let n = points.len() as u32;
        buf.extend_from_slice(&n.to_le_bytes());
        for (x, y) in points {
            buf.extend_from_slice(&x.to_le_bytes());
            buf.extend_from_slice(&y.to_le_bytes());
        }
        buf
    }

    #[test]
    fn create_indexes_backfills_edge_geom_rtree_from_existing_edges() {
        let conn = memory_conn();
        create_schema(&conn).unwrap();

        let wkb = wkb_linestring(&[(-122.4, 37.7), (-122.5, 37.8)]);
        conn.execute("INSERT INTO edge (tlid, geometry) VALUES (?, ?)", rusqlite::params![1i64, wkb])
            .unwrap();

        create_indexes(&conn);

        let (min_x, max_x, min_y, max_y): (f64, f64, f64, f64) = conn
            .query_row(
                "SELECT min_x, max_x, min_y, max_y FROM edge_geom_rtree WHERE tlid = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert!((min_x - (-122.5)).abs() < 1e-9);
        assert!((max_x - (-122.4)).abs() < 1e-9);
        assert!((min_y - 37.7).abs() < 1e-9);
        assert!((max_y - 37.8).abs() < 1e-9);

        // Re-running is idempotent: no duplicate row, no error.
        create_indexes(&conn);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM edge_geom_rtree WHERE tlid = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
