use rusqlite::Connection;

/// Run `f` so that either all of its writes land or none do.
///
/// Opens a transaction when the connection is in autocommit mode; otherwise
/// joins the caller's transaction, which then owns commit and rollback.
pub(crate) fn atomically<T, E>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<rusqlite::Error>,
{
    if !conn.is_autocommit() {
        return f(conn);
    }
    let tx = conn.unchecked_transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}
