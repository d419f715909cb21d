use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use crate::{
    db::DbPool,
    error::{AppError, Result},
    models::request::{
        RequestAction, RequestDetails, RequestDetailsResponse, RequestFilter, RequestStatus,
        RequestWithProduct, append_remark,
    },
};

const SELECT_WITH_PRODUCT: &str = r#"
    SELECT r.*, p.productnamezh, p.productnameen
    FROM request_details r
    LEFT JOIN product_details p ON p.productid = r.requestproductid
"#;

fn not_found(requestid: &str) -> AppError {
    AppError::NotFound(format!("Request with ID {requestid} not found"))
}

/// Product request store
#[derive(Clone)]
pub struct RequestStore {
    pool: DbPool,
}

impl RequestStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// List requests with their product names, newest first
    pub async fn get_requests(&self, filter: &RequestFilter) -> Result<Vec<RequestDetailsResponse>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_WITH_PRODUCT);
        query.push(" WHERE 1 = 1");

        if let Some(status) = filter.status {
            query.push(" AND r.status = ").push_bind(status);
        }
        if let Some(requestorname) = &filter.requestorname {
            query.push(" AND r.requestorname = ").push_bind(requestorname);
        }
        query.push(" ORDER BY r.requestdate DESC");

        let rows = query
            .build_query_as::<RequestWithProduct>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Raw row, used for ownership and status checks
    pub async fn get_request(&self, requestid: &str) -> Result<RequestDetails> {
        sqlx::query_as::<_, RequestDetails>("SELECT * FROM request_details WHERE requestid = ?")
            .bind(requestid)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| not_found(requestid))
    }

    pub async fn get_request_with_product(&self, requestid: &str) -> Result<RequestDetailsResponse> {
        let row = sqlx::query_as::<_, RequestWithProduct>(&format!(
            "{SELECT_WITH_PRODUCT} WHERE r.requestid = ?"
        ))
        .bind(requestid)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| not_found(requestid))?;

        Ok(row.into())
    }

    pub async fn create_request(&self, request: &RequestDetails) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO request_details (
                requestid, requestorname, requestdate, requestproductid, requestunit,
                is_urgent, remarks, status, fullfillername, fullfilldate
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.requestid)
        .bind(&request.requestorname)
        .bind(request.requestdate)
        .bind(&request.requestproductid)
        .bind(request.requestunit)
        .bind(request.is_urgent)
        .bind(&request.remarks)
        .bind(request.status)
        .bind(&request.fullfillername)
        .bind(request.fullfilldate)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    /// Write back the editable fields, provided the status is still `expected`
    pub async fn update_request(
        &self,
        request: &RequestDetails,
        expected: RequestStatus,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE request_details
            SET requestproductid = ?, requestunit = ?, is_urgent = ?, remarks = ?
            WHERE requestid = ? AND status = ?
            "#,
        )
        .bind(&request.requestproductid)
        .bind(request.requestunit)
        .bind(request.is_urgent)
        .bind(&request.remarks)
        .bind(&request.requestid)
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Request was modified concurrently, please retry".into(),
            ));
        }

        Ok(())
    }

    /// Run `action` against the stored status and persist the outcome.
    ///
    /// The write only lands if the status is unchanged since it was read;
    /// otherwise the caller gets 409.
    pub async fn transition(
        &self,
        requestid: &str,
        action: RequestAction,
        username: &str,
    ) -> Result<RequestDetailsResponse> {
        let current = self.get_request(requestid).await?;

        let next = current.status.apply(action).map_err(|err| {
            tracing::warn!(%requestid, from = current.status.as_str(), ?action, "rejected transition");
            AppError::BadRequest(err.to_string())
        })?;

        let now = Utc::now();
        let remarks = append_remark(&current.remarks, action, username, now);
        let (fullfillername, fullfilldate) = match action {
            RequestAction::Fulfill => (Some(username.to_string()), Some(now)),
            _ => (current.fullfillername, current.fullfilldate),
        };

        let result = sqlx::query(
            r#"
            UPDATE request_details
            SET status = ?, remarks = ?, fullfillername = ?, fullfilldate = ?
            WHERE requestid = ? AND status = ?
            "#,
        )
        .bind(next)
        .bind(&remarks)
        .bind(&fullfillername)
        .bind(fullfilldate)
        .bind(requestid)
        .bind(current.status)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Request status changed concurrently, please retry".into(),
            ));
        }

        tracing::info!(
            %requestid,
            from = current.status.as_str(),
            to = next.as_str(),
            by = %username,
            "request transitioned"
        );

        self.get_request_with_product(requestid).await
    }

    pub async fn delete_request(&self, requestid: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM request_details WHERE requestid = ?")
            .bind(requestid)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(not_found(requestid));
        }

        Ok(())
    }
}
