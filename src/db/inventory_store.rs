use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite};

use crate::{
    db::DbPool,
    error::{AppError, Result},
    models::{
        inventory::{InventoryFilter, InventoryWithDetails, ProductInventory},
        product::ProductDetails,
    },
};

/// Inventory batch store
#[derive(Clone)]
pub struct InventoryStore {
    pool: DbPool,
}

impl InventoryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// List batches, newest first
    pub async fn get_batches(&self, filter: &InventoryFilter) -> Result<Vec<ProductInventory>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM product_inventory WHERE 1 = 1");

        if let Some(productid) = &filter.productid {
            query.push(" AND productid = ").push_bind(productid);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        query.push(" ORDER BY lastupdated DESC");

        let batches = query
            .build_query_as::<ProductInventory>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(batches)
    }

    /// Every batch with its catalog entry attached
    pub async fn get_batches_with_details(&self) -> Result<Vec<InventoryWithDetails>> {
        let batches = self.get_batches(&InventoryFilter::default()).await?;

        let products: HashMap<String, ProductDetails> =
            sqlx::query_as::<_, ProductDetails>("SELECT * FROM product_details")
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database)?
                .into_iter()
                .map(|p| (p.productid.clone(), p))
                .collect();

        Ok(batches
            .into_iter()
            .map(|batch| InventoryWithDetails {
                product: products.get(&batch.productid).cloned(),
                batch,
            })
            .collect())
    }

    pub async fn get_batch(&self, batchid: &str) -> Result<ProductInventory> {
        let batch = sqlx::query_as::<_, ProductInventory>(
            "SELECT * FROM product_inventory WHERE batchid_internal = ?",
        )
        .bind(batchid)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| {
            AppError::NotFound(format!("Product inventory with batch ID {batchid} not found"))
        })?;

        Ok(batch)
    }

    pub async fn create_batch(&self, batch: &ProductInventory) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO product_inventory (
                batchid_internal, batchid_external, productid, basicmediumid, addictiveid,
                quantityinstock, productiondate, imageurl, status, productiondatetime, producedby,
                coa_appearance, coa_clarity, coa_osmoticpressure, coa_ph, coa_mycoplasma,
                coa_sterility, coa_fillingvolumedifference, to_show, lastupdated, lastupdatedby
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&batch.batchid_internal)
        .bind(&batch.batchid_external)
        .bind(&batch.productid)
        .bind(&batch.basicmediumid)
        .bind(&batch.addictiveid)
        .bind(batch.quantityinstock)
        .bind(batch.productiondate)
        .bind(&batch.imageurl)
        .bind(batch.status)
        .bind(batch.productiondatetime)
        .bind(&batch.producedby)
        .bind(&batch.coa_appearance)
        .bind(batch.coa_clarity)
        .bind(batch.coa_osmoticpressure)
        .bind(batch.coa_ph)
        .bind(batch.coa_mycoplasma)
        .bind(batch.coa_sterility)
        .bind(batch.coa_fillingvolumedifference)
        .bind(batch.to_show)
        .bind(batch.lastupdated)
        .bind(&batch.lastupdatedby)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    /// Write back an existing batch. Batch ids are never rewritten.
    pub async fn update_batch(&self, batch: &ProductInventory) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE product_inventory
            SET productid = ?, basicmediumid = ?, addictiveid = ?, quantityinstock = ?,
                productiondate = ?, imageurl = ?, status = ?, productiondatetime = ?,
                producedby = ?, coa_appearance = ?, coa_clarity = ?, coa_osmoticpressure = ?,
                coa_ph = ?, coa_mycoplasma = ?, coa_sterility = ?,
                coa_fillingvolumedifference = ?, to_show = ?, lastupdated = ?, lastupdatedby = ?
            WHERE batchid_internal = ?
            "#,
        )
        .bind(&batch.productid)
        .bind(&batch.basicmediumid)
        .bind(&batch.addictiveid)
        .bind(batch.quantityinstock)
        .bind(batch.productiondate)
        .bind(&batch.imageurl)
        .bind(batch.status)
        .bind(batch.productiondatetime)
        .bind(&batch.producedby)
        .bind(&batch.coa_appearance)
        .bind(batch.coa_clarity)
        .bind(batch.coa_osmoticpressure)
        .bind(batch.coa_ph)
        .bind(batch.coa_mycoplasma)
        .bind(batch.coa_sterility)
        .bind(batch.coa_fillingvolumedifference)
        .bind(batch.to_show)
        .bind(batch.lastupdated)
        .bind(&batch.lastupdatedby)
        .bind(&batch.batchid_internal)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Product inventory with batch ID {} not found",
                batch.batchid_internal
            )));
        }

        Ok(())
    }

    pub async fn delete_batch(&self, batchid: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM product_inventory WHERE batchid_internal = ?")
            .bind(batchid)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Product inventory with batch ID {batchid} not found"
            )));
        }

        Ok(())
    }
}
