use sqlx::types::Json;

use crate::{
    db::DbPool,
    error::{AppError, Result},
    models::product::ProductDetails,
};

/// Catalog store
#[derive(Clone)]
pub struct ProductStore {
    pool: DbPool,
}

impl ProductStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get_all_products(&self) -> Result<Vec<ProductDetails>> {
        let products =
            sqlx::query_as::<_, ProductDetails>("SELECT * FROM product_details ORDER BY productid")
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database)?;

        Ok(products)
    }

    pub async fn find_product(&self, productid: &str) -> Result<Option<ProductDetails>> {
        let product =
            sqlx::query_as::<_, ProductDetails>("SELECT * FROM product_details WHERE productid = ?")
                .bind(productid)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)?;

        Ok(product)
    }

    pub async fn get_product(&self, productid: &str) -> Result<ProductDetails> {
        self.find_product(productid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product with ID {productid} not found")))
    }

    pub async fn product_exists(&self, productid: &str) -> Result<bool> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM product_details WHERE productid = ?")
                .bind(productid)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

        Ok(count.0 > 0)
    }

    /// Fail with 400 unless `productid` names a catalog entry
    pub async fn ensure_product_exists(&self, productid: &str) -> Result<()> {
        if !self.product_exists(productid).await? {
            return Err(AppError::BadRequest(format!(
                "Product with ID {productid} not found in ProductDetails"
            )));
        }
        Ok(())
    }

    pub async fn create_product(&self, product: &ProductDetails) -> Result<()> {
        if self.product_exists(&product.productid).await? {
            return Err(AppError::BadRequest(format!(
                "Product with ID {} already exists",
                product.productid
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO product_details (
                productid, category, setsubcategory, source, productnameen, productnamezh,
                specification, unit, components, is_sold_independently, remarks_temperature,
                storage_temperature_duration, reorderlevel, targetstocklevel, leadtime
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.productid)
        .bind(product.category)
        .bind(product.setsubcategory)
        .bind(product.source)
        .bind(&product.productnameen)
        .bind(&product.productnamezh)
        .bind(&product.specification)
        .bind(product.unit)
        .bind(Json(&product.components))
        .bind(product.is_sold_independently)
        .bind(&product.remarks_temperature)
        .bind(&product.storage_temperature_duration)
        .bind(product.reorderlevel)
        .bind(product.targetstocklevel)
        .bind(product.leadtime)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    /// Write every column of an existing entry back
    pub async fn update_product(&self, product: &ProductDetails) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE product_details
            SET category = ?, setsubcategory = ?, source = ?, productnameen = ?, productnamezh = ?,
                specification = ?, unit = ?, components = ?, is_sold_independently = ?,
                remarks_temperature = ?, storage_temperature_duration = ?, reorderlevel = ?,
                targetstocklevel = ?, leadtime = ?
            WHERE productid = ?
            "#,
        )
        .bind(product.category)
        .bind(product.setsubcategory)
        .bind(product.source)
        .bind(&product.productnameen)
        .bind(&product.productnamezh)
        .bind(&product.specification)
        .bind(product.unit)
        .bind(Json(&product.components))
        .bind(product.is_sold_independently)
        .bind(&product.remarks_temperature)
        .bind(&product.storage_temperature_duration)
        .bind(product.reorderlevel)
        .bind(product.targetstocklevel)
        .bind(product.leadtime)
        .bind(&product.productid)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Product with ID {} not found",
                product.productid
            )));
        }

        Ok(())
    }

    /// Number of inventory batches and requests that still point at `productid`
    pub async fn count_references(&self, productid: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT (SELECT COUNT(*) FROM product_inventory WHERE productid = ?)
                 + (SELECT COUNT(*) FROM request_details WHERE requestproductid = ?)
            "#,
        )
        .bind(productid)
        .bind(productid)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(count.0)
    }

    pub async fn delete_product(&self, productid: &str) -> Result<()> {
        // Existence first so a missing id is 404 rather than 400
        self.get_product(productid).await?;

        if self.count_references(productid).await? > 0 {
            return Err(AppError::BadRequest(format!(
                "Product with ID {productid} is still referenced by inventory or requests"
            )));
        }

        sqlx::query("DELETE FROM product_details WHERE productid = ?")
            .bind(productid)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }
}
