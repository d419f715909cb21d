use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{product::ProductDetails, random_suffix};

/// Stock status of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum InventoryStatus {
    #[serde(rename = "AVAILABLE(可用)")]
    #[sqlx(rename = "AVAILABLE(可用)")]
    Available,
    #[serde(rename = "RESERVED(预留)")]
    #[sqlx(rename = "RESERVED(预留)")]
    Reserved,
    #[serde(rename = "IN_USE(使用中)")]
    #[sqlx(rename = "IN_USE(使用中)")]
    InUse,
    #[serde(rename = "EXPIRED(过期)")]
    #[sqlx(rename = "EXPIRED(过期)")]
    Expired,
    #[serde(rename = "DAMAGED(损坏)")]
    #[sqlx(rename = "DAMAGED(损坏)")]
    Damaged,
    #[serde(rename = "QUARANTINE(隔离)")]
    #[sqlx(rename = "QUARANTINE(隔离)")]
    Quarantine,
    #[serde(rename = "OUT_OF_STOCK(缺货)")]
    #[sqlx(rename = "OUT_OF_STOCK(缺货)")]
    OutOfStock,
}

/// One produced batch of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProductInventory {
    pub batchid_internal: String,
    pub batchid_external: String,
    pub productid: String,
    pub basicmediumid: String,
    pub addictiveid: String,
    pub quantityinstock: i64,
    pub productiondate: NaiveDate,
    pub imageurl: Option<String>,
    pub status: InventoryStatus,
    pub productiondatetime: NaiveDateTime,
    pub producedby: String,
    pub coa_appearance: Option<String>,
    pub coa_clarity: Option<bool>,
    pub coa_osmoticpressure: Option<f64>,
    pub coa_ph: Option<f64>,
    pub coa_mycoplasma: Option<bool>,
    pub coa_sterility: Option<bool>,
    pub coa_fillingvolumedifference: Option<bool>,
    pub to_show: bool,
    pub lastupdated: DateTime<Utc>,
    pub lastupdatedby: String,
}

/// Creation payload; batch ids and audit fields are filled in by the server
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductInventoryCreate {
    #[validate(length(min = 1, max = 20))]
    pub productid: String,
    #[validate(length(min = 1, max = 7))]
    pub basicmediumid: String,
    #[validate(length(min = 1, max = 7))]
    pub addictiveid: String,
    #[validate(range(min = 0))]
    pub quantityinstock: i64,
    pub productiondate: NaiveDate,
    pub imageurl: Option<String>,
    pub status: InventoryStatus,
    pub productiondatetime: NaiveDateTime,
    #[validate(length(min = 1, max = 50))]
    pub producedby: String,
    #[validate(length(max = 100))]
    pub coa_appearance: Option<String>,
    pub coa_clarity: Option<bool>,
    pub coa_osmoticpressure: Option<f64>,
    pub coa_ph: Option<f64>,
    pub coa_mycoplasma: Option<bool>,
    pub coa_sterility: Option<bool>,
    pub coa_fillingvolumedifference: Option<bool>,
    #[serde(default = "default_to_show")]
    pub to_show: bool,
}

fn default_to_show() -> bool {
    true
}

impl ProductInventoryCreate {
    /// Turn the payload into a new batch with freshly generated ids.
    pub fn into_batch(self, updated_by: &str) -> ProductInventory {
        let batchid_external = external_batch_id(&self.basicmediumid, &self.addictiveid);
        let batchid_internal = internal_batch_id(&batchid_external);

        ProductInventory {
            batchid_internal,
            batchid_external,
            productid: self.productid,
            basicmediumid: self.basicmediumid,
            addictiveid: self.addictiveid,
            quantityinstock: self.quantityinstock,
            productiondate: self.productiondate,
            imageurl: self.imageurl,
            status: self.status,
            productiondatetime: self.productiondatetime,
            producedby: self.producedby,
            coa_appearance: self.coa_appearance,
            coa_clarity: self.coa_clarity,
            coa_osmoticpressure: self.coa_osmoticpressure,
            coa_ph: self.coa_ph,
            coa_mycoplasma: self.coa_mycoplasma,
            coa_sterility: self.coa_sterility,
            coa_fillingvolumedifference: self.coa_fillingvolumedifference,
            to_show: self.to_show,
            lastupdated: Utc::now(),
            lastupdatedby: updated_by.to_string(),
        }
    }
}

/// Partial update of a batch. Batch ids are never regenerated.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductInventoryUpdate {
    #[validate(length(min = 1, max = 20))]
    pub productid: Option<String>,
    #[validate(length(min = 1, max = 7))]
    pub basicmediumid: Option<String>,
    #[validate(length(min = 1, max = 7))]
    pub addictiveid: Option<String>,
    #[validate(range(min = 0))]
    pub quantityinstock: Option<i64>,
    pub productiondate: Option<NaiveDate>,
    pub imageurl: Option<String>,
    pub status: Option<InventoryStatus>,
    pub productiondatetime: Option<NaiveDateTime>,
    #[validate(length(min = 1, max = 50))]
    pub producedby: Option<String>,
    #[validate(length(max = 100))]
    pub coa_appearance: Option<String>,
    pub coa_clarity: Option<bool>,
    pub coa_osmoticpressure: Option<f64>,
    pub coa_ph: Option<f64>,
    pub coa_mycoplasma: Option<bool>,
    pub coa_sterility: Option<bool>,
    pub coa_fillingvolumedifference: Option<bool>,
    pub to_show: Option<bool>,
}

impl ProductInventoryUpdate {
    pub fn apply(self, batch: &mut ProductInventory, updated_by: &str) {
        if let Some(v) = self.productid {
            batch.productid = v;
        }
        if let Some(v) = self.basicmediumid {
            batch.basicmediumid = v;
        }
        if let Some(v) = self.addictiveid {
            batch.addictiveid = v;
        }
        if let Some(v) = self.quantityinstock {
            batch.quantityinstock = v;
        }
        if let Some(v) = self.productiondate {
            batch.productiondate = v;
        }
        if self.imageurl.is_some() {
            batch.imageurl = self.imageurl;
        }
        if let Some(v) = self.status {
            batch.status = v;
        }
        if let Some(v) = self.productiondatetime {
            batch.productiondatetime = v;
        }
        if let Some(v) = self.producedby {
            batch.producedby = v;
        }
        if self.coa_appearance.is_some() {
            batch.coa_appearance = self.coa_appearance;
        }
        if self.coa_clarity.is_some() {
            batch.coa_clarity = self.coa_clarity;
        }
        if self.coa_osmoticpressure.is_some() {
            batch.coa_osmoticpressure = self.coa_osmoticpressure;
        }
        if self.coa_ph.is_some() {
            batch.coa_ph = self.coa_ph;
        }
        if self.coa_mycoplasma.is_some() {
            batch.coa_mycoplasma = self.coa_mycoplasma;
        }
        if self.coa_sterility.is_some() {
            batch.coa_sterility = self.coa_sterility;
        }
        if self.coa_fillingvolumedifference.is_some() {
            batch.coa_fillingvolumedifference = self.coa_fillingvolumedifference;
        }
        if let Some(v) = self.to_show {
            batch.to_show = v;
        }
        batch.lastupdated = Utc::now();
        batch.lastupdatedby = updated_by.to_string();
    }
}

/// Query filters for listing batches
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryFilter {
    pub productid: Option<String>,
    pub status: Option<InventoryStatus>,
}

/// A batch together with its catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryWithDetails {
    #[serde(flatten)]
    pub batch: ProductInventory,
    pub product: Option<ProductDetails>,
}

/// `{basicmediumid}-{addictiveid}`
pub fn external_batch_id(basicmediumid: &str, addictiveid: &str) -> String {
    format!("{basicmediumid}-{addictiveid}")
}

/// `{external}-{6 random A-Z0-9}`
pub fn internal_batch_id(external: &str) -> String {
    format!("{external}-{}", random_suffix(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ProductInventoryCreate {
        ProductInventoryCreate {
            productid: "P001".to_string(),
            basicmediumid: "BM001".to_string(),
            addictiveid: "AD001".to_string(),
            quantityinstock: 50,
            productiondate: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            imageurl: Some("http://example.com/image.jpg".to_string()),
            status: InventoryStatus::Available,
            productiondatetime: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            producedby: "John Doe".to_string(),
            coa_appearance: None,
            coa_clarity: None,
            coa_osmoticpressure: None,
            coa_ph: Some(7.4),
            coa_mycoplasma: None,
            coa_sterility: None,
            coa_fillingvolumedifference: None,
            to_show: true,
        }
    }

    #[test]
    fn test_batch_ids_are_derived_from_component_ids() {
        let batch = payload().into_batch("jane");

        assert_eq!(batch.batchid_external, "BM001-AD001");
        let suffix = batch
            .batchid_internal
            .strip_prefix("BM001-AD001-")
            .expect("internal id starts with the external id");
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_eq!(batch.lastupdatedby, "jane");
    }

    #[test]
    fn test_component_ids_are_limited_to_seven_chars() {
        let mut create = payload();
        create.basicmediumid = "BM000001".to_string();
        let errors = create.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("basicmediumid"));
    }

    #[test]
    fn test_negative_stock_is_rejected() {
        let mut create = payload();
        create.quantityinstock = -1;
        assert!(create.validate().is_err());
    }

    #[test]
    fn test_update_keeps_batch_ids() {
        let mut batch = payload().into_batch("jane");
        let internal = batch.batchid_internal.clone();

        ProductInventoryUpdate {
            basicmediumid: Some("BM002".to_string()),
            quantityinstock: Some(75),
            ..Default::default()
        }
        .apply(&mut batch, "joe");

        assert_eq!(batch.batchid_internal, internal);
        assert_eq!(batch.batchid_external, "BM001-AD001");
        assert_eq!(batch.basicmediumid, "BM002");
        assert_eq!(batch.quantityinstock, 75);
        assert_eq!(batch.lastupdatedby, "joe");
        assert_eq!(batch.coa_ph, Some(7.4));
    }

    #[test]
    fn test_status_labels() {
        let status: InventoryStatus = serde_json::from_str(r#""OUT_OF_STOCK(缺货)""#).unwrap();
        assert_eq!(status, InventoryStatus::OutOfStock);
    }
}
