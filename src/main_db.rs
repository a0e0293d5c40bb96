use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::cmp::Ordering;
use std::path::Path;

use crate::route_store::{RouteStore, ROUTE_STORAGE_KEY};
use crate::utils;

/* The main database. It is a small durable key-value store: `kv_store` maps a
text key to a text value and each write replaces the whole value. The route is
one JSON array under `ROUTE_STORAGE_KEY`.

`db_metadata` records the schema version so migrations only run once.
*/

#[allow(clippy::type_complexity)]
fn open_db_and_run_migration(
    support_dir: &str,
    file_name: &str,
    migrations: &[&dyn Fn(&Transaction) -> Result<()>],
) -> Result<Connection> {
    debug!("open and run migration for {}", file_name);
    let mut conn = Connection::open(Path::new(support_dir).join(file_name))?;
    let tx = conn.transaction()?;

    let version = utils::db::init_metadata_and_get_version(&tx)?;
    let target_version = migrations.len() as i32;
    debug!(
        "current version = {}, target_version = {}",
        version, target_version
    );
    match version.cmp(&target_version) {
        Ordering::Equal => (),
        Ordering::Less => {
            for (i, migration) in migrations.iter().enumerate().skip(version.max(0) as usize) {
                info!("running migration for version: {}", i + 1);
                migration(&tx)?;
            }
            utils::db::set_version_in_metadata(&tx, target_version)?;
        }
        Ordering::Greater => {
            bail!(
                "version too high: current version = {}, target_version = {}",
                version,
                target_version
            );
        }
    }
    tx.commit()?;
    Ok(conn)
}

pub struct MainDb {
    conn: Connection,
}

impl MainDb {
    pub fn open(support_dir: &str) -> Result<MainDb> {
        let conn = open_db_and_run_migration(
            support_dir,
            "main.db",
            &[&|tx| {
                let sql = "
                CREATE TABLE kv_store (
                    key               TEXT    PRIMARY KEY
                                              NOT NULL
                                              UNIQUE,
                    value             TEXT    NOT NULL
                );
                ";
                for s in sql_split::split(sql) {
                    tx.execute(&s, ())?;
                }
                Ok(())
            }],
        )?;
        Ok(MainDb { conn })
    }

    fn with_txn<F, O>(&mut self, f: F) -> Result<O>
    where
        F: FnOnce(&Transaction) -> Result<O>,
    {
        let txn = self.conn.transaction()?;
        let output = f(&txn)?;
        txn.commit()?;
        Ok(output)
    }

    /// Writes cached pages out; hosts call it before being suspended.
    pub fn flush(&self) -> Result<()> {
        self.conn.cache_flush()?;
        Ok(())
    }

    pub fn get_value(&mut self, key: &str) -> Result<Option<String>> {
        self.with_txn(|tx| {
            let mut query = tx.prepare_cached("SELECT value FROM kv_store WHERE key = ?1;")?;
            let value: Option<String> = query.query_row([key], |row| row.get(0)).optional()?;
            Ok(value)
        })
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        self.with_txn(|tx| {
            let sql = "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?1, ?2);";
            tx.prepare_cached(sql)?.execute((key, value))?;
            Ok(())
        })
    }

    /// Removes a key entirely, so the next `load` sees "never saved" rather
    /// than an empty route. Returns whether the key existed.
    pub fn delete_value(&mut self, key: &str) -> Result<bool> {
        self.with_txn(|tx| {
            let changes = tx.execute("DELETE FROM kv_store WHERE key = ?1;", (key,))?;
            Ok(changes > 0)
        })
    }
}

impl RouteStore for MainDb {
    fn read_record(&mut self) -> Result<Option<String>> {
        self.get_value(ROUTE_STORAGE_KEY)
    }

    fn write_record(&mut self, value: &str) -> Result<()> {
        self.set_value(ROUTE_STORAGE_KEY, value)
    }
}
