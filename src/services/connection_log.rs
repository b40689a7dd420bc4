use anyhow::{bail, Context, Result};
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::models::connection_log::{
    ConnectionLog, ConnectionLogPage, ConnectionLogQuery, CreateConnectionLogRequest,
};
use crate::models::server::Server;

pub async fn get_connection_logs(
    pool: &MySqlPool,
    query: &ConnectionLogQuery,
) -> Result<ConnectionLogPage> {
    let mut count_query: QueryBuilder<MySql> =
        QueryBuilder::new("SELECT COUNT(*) FROM connection_logs WHERE 1=1");
    push_filters(&mut count_query, query);
    let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    let mut list_query: QueryBuilder<MySql> =
        QueryBuilder::new("SELECT * FROM connection_logs WHERE 1=1");
    push_filters(&mut list_query, query);
    list_query.push(" ORDER BY connected_at DESC LIMIT ");
    list_query.push_bind(query.page_size as i64);
    list_query.push(" OFFSET ");
    list_query.push_bind(offset(query.page, query.page_size));

    let data = list_query
        .build_query_as::<ConnectionLog>()
        .fetch_all(pool)
        .await?;

    Ok(ConnectionLogPage::new(data, total, query.page, query.page_size))
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, MySql>, query: &'a ConnectionLogQuery) {
    if let Some(ip) = &query.ip {
        builder.push(" AND player_ip = ").push_bind(ip.as_str());
    }
    if let Some(username) = &query.username {
        builder
            .push(" AND player_name LIKE ")
            .push_bind(format!("%{}%", username));
    }
    if let Some(from_time) = query.from_time {
        builder.push(" AND connected_at >= ").push_bind(from_time);
    }
    if let Some(to_time) = query.to_time {
        builder.push(" AND connected_at <= ").push_bind(to_time);
    }
    if let Some(server) = query.server {
        builder.push(" AND server_id = ").push_bind(server);
    }
}

fn offset(page: u32, page_size: u32) -> i64 {
    (page as i64 - 1) * page_size as i64
}

pub async fn get_connection_log_by_id(pool: &MySqlPool, id: i64) -> Result<Option<ConnectionLog>> {
    let log = sqlx::query_as::<_, ConnectionLog>("SELECT * FROM connection_logs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(log)
}

pub async fn get_connection_logs_by_server_id(
    pool: &MySqlPool,
    server_id: i64,
) -> Result<Vec<ConnectionLog>> {
    let logs = sqlx::query_as::<_, ConnectionLog>(
        "SELECT * FROM connection_logs WHERE server_id = ? ORDER BY connected_at DESC",
    )
    .bind(server_id)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

/// The caller supplies only the domain it connected through; the owning
/// server is resolved here.
pub async fn create_connection_log(
    pool: &MySqlPool,
    request: &CreateConnectionLogRequest,
) -> Result<ConnectionLog> {
    let server = sqlx::query_as::<_, Server>("SELECT * FROM servers WHERE full_domain = ?")
        .bind(&request.full_domain)
        .fetch_optional(pool)
        .await?;

    let server = match server {
        Some(s) => s,
        None => bail!("no server registered for domain {}", request.full_domain),
    };

    let result = sqlx::query(
        "INSERT INTO connection_logs (server_id, player_name, player_ip, player_uuid, full_domain) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(server.id)
    .bind(&request.player_name)
    .bind(&request.player_ip)
    .bind(&request.player_uuid)
    .bind(&request.full_domain)
    .execute(pool)
    .await?;

    let log = sqlx::query_as::<_, ConnectionLog>("SELECT * FROM connection_logs WHERE id = ?")
        .bind(result.last_insert_id() as i64)
        .fetch_one(pool)
        .await
        .context("connection log inserted but could not be read back")?;

    Ok(log)
}

pub async fn delete_connection_log(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM connection_logs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
