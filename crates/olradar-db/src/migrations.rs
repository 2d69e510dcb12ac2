use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (venues, beers, prices)");
        conn.execute_batch(
            "
            CREATE TABLE venues (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                address     TEXT NOT NULL DEFAULT '',
                city        TEXT NOT NULL DEFAULT '',
                country     TEXT NOT NULL DEFAULT 'SE',
                lat         REAL NOT NULL,
                lng         REAL NOT NULL,
                open_now    INTEGER,
                hours       TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_venues_city ON venues(city);
            CREATE INDEX idx_venues_name ON venues(name);

            CREATE TABLE beers (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                style       TEXT,
                abv         REAL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_beers_name ON beers(name);

            CREATE TABLE prices (
                id          TEXT PRIMARY KEY,
                venue_id    TEXT NOT NULL REFERENCES venues(id),
                beer_id     TEXT NOT NULL REFERENCES beers(id),
                price       REAL NOT NULL CHECK (price > 0),
                currency    TEXT NOT NULL DEFAULT 'SEK',
                rating      REAL CHECK (rating IS NULL OR (rating >= 0 AND rating <= 5)),
                user_id     TEXT,
                photo_url   TEXT,
                verified    INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_prices_venue ON prices(venue_id, created_at);
            CREATE INDEX idx_prices_user ON prices(user_id, created_at);
            CREATE INDEX idx_prices_created ON prices(created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (venue happy hours)");
        conn.execute_batch(
            "
            ALTER TABLE venues ADD COLUMN happy_hours TEXT;

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 2);
    }
}
