use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Product category, stored and serialized with its bilingual label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Category {
    #[serde(rename = "Organoid(类器官)")]
    #[sqlx(rename = "Organoid(类器官)")]
    Organoid,
    #[serde(rename = "Consumable(耗材)")]
    #[sqlx(rename = "Consumable(耗材)")]
    Consumable,
    #[serde(rename = "Equipment(设备)")]
    #[sqlx(rename = "Equipment(设备)")]
    Equipment,
    #[serde(rename = "Reagent(试剂)")]
    #[sqlx(rename = "Reagent(试剂)")]
    Reagent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum SubCategory {
    #[serde(rename = "Human Organoid(人源类器官)")]
    #[sqlx(rename = "Human Organoid(人源类器官)")]
    HumanOrganoid,
    #[serde(rename = "Mouse Organoid(小鼠类器官)")]
    #[sqlx(rename = "Mouse Organoid(小鼠类器官)")]
    MouseOrganoid,
    #[serde(rename = "Other Auxiliary Reagents(其他辅助试剂)")]
    #[sqlx(rename = "Other Auxiliary Reagents(其他辅助试剂)")]
    OtherAuxiliaryReagents,
    #[serde(rename = "Cryotubes(冷冻管)")]
    #[sqlx(rename = "Cryotubes(冷冻管)")]
    Cryotubes,
    #[serde(rename = "Matrigel(基质胶)")]
    #[sqlx(rename = "Matrigel(基质胶)")]
    Matrigel,
    #[serde(rename = "Large Equipment(大型设备)")]
    #[sqlx(rename = "Large Equipment(大型设备)")]
    LargeEquipment,
    #[serde(rename = "Primers(引物)")]
    #[sqlx(rename = "Primers(引物)")]
    Primers,
    #[serde(rename = "Centrifuge Tube(离心管)")]
    #[sqlx(rename = "Centrifuge Tube(离心管)")]
    CentrifugeTube,
    #[serde(rename = "Pipette Tips(移液枪吸头)")]
    #[sqlx(rename = "Pipette Tips(移液枪吸头)")]
    PipetteTips,
    #[serde(rename = "Pipette(移液枪)")]
    #[sqlx(rename = "Pipette(移液枪)")]
    Pipette,
    #[serde(rename = "Organoid Differentiation Medium(类器官分化培养基)")]
    #[sqlx(rename = "Organoid Differentiation Medium(类器官分化培养基)")]
    OrganoidDifferentiationMedium,
    #[serde(rename = "Organoid Culture Kit(类器官培养套件)")]
    #[sqlx(rename = "Organoid Culture Kit(类器官培养套件)")]
    OrganoidCultureKit,
    #[serde(rename = "Organoid Basal Medium(类器官基础培养基)")]
    #[sqlx(rename = "Organoid Basal Medium(类器官基础培养基)")]
    OrganoidBasalMedium,
    #[serde(rename = "Complete Organoid Culture Medium(类器官完全培养基)")]
    #[sqlx(rename = "Complete Organoid Culture Medium(类器官完全培养基)")]
    CompleteOrganoidCultureMedium,
    #[serde(rename = "Organoid Conditioned Medium(类器官条件培养基)")]
    #[sqlx(rename = "Organoid Conditioned Medium(类器官条件培养基)")]
    OrganoidConditionedMedium,
    #[serde(rename = "Cell Culture Plate(细胞培养板)")]
    #[sqlx(rename = "Cell Culture Plate(细胞培养板)")]
    CellCulturePlate,
    #[serde(rename = "Cell Culture Flask(细胞培养瓶)")]
    #[sqlx(rename = "Cell Culture Flask(细胞培养瓶)")]
    CellCultureFlask,
    #[serde(rename = "Cell Culture Dish(细胞培养皿)")]
    #[sqlx(rename = "Cell Culture Dish(细胞培养皿)")]
    CellCultureDish,
    #[serde(rename = "Cell Culture Reagents(细胞培养试剂)")]
    #[sqlx(rename = "Cell Culture Reagents(细胞培养试剂)")]
    CellCultureReagents,
    #[serde(rename = "Cell Shake Flask(细胞摇瓶)")]
    #[sqlx(rename = "Cell Shake Flask(细胞摇瓶)")]
    CellShakeFlask,
    #[serde(rename = "Cell Counting Plate(细胞计数板)")]
    #[sqlx(rename = "Cell Counting Plate(细胞计数板)")]
    CellCountingPlate,
    #[serde(rename = "Chip(芯片)")]
    #[sqlx(rename = "Chip(芯片)")]
    Chip,
    #[serde(rename = "Serum(血清)")]
    #[sqlx(rename = "Serum(血清)")]
    Serum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Source {
    #[serde(rename = "Human(人源)")]
    #[sqlx(rename = "Human(人源)")]
    Human,
    #[serde(rename = "Mouse(鼠源)")]
    #[sqlx(rename = "Mouse(鼠源)")]
    Mouse,
    #[serde(rename = "hESC(人胚胎干细胞)")]
    #[sqlx(rename = "hESC(人胚胎干细胞)")]
    Hesc,
    #[serde(rename = "hPSC(人诱导多能干细胞)")]
    #[sqlx(rename = "hPSC(人诱导多能干细胞)")]
    Hpsc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Unit {
    #[serde(rename = "Box(盒)")]
    #[sqlx(rename = "Box(盒)")]
    Box,
    #[serde(rename = "Packet(包)")]
    #[sqlx(rename = "Packet(包)")]
    Packet,
    #[serde(rename = "Bottle(瓶)")]
    #[sqlx(rename = "Bottle(瓶)")]
    Bottle,
    #[serde(rename = "Unit(台)")]
    #[sqlx(rename = "Unit(台)")]
    Unit,
    #[serde(rename = "Tube(支)")]
    #[sqlx(rename = "Tube(支)")]
    Tube,
    #[serde(rename = "Big Box(箱)")]
    #[sqlx(rename = "Big Box(箱)")]
    BigBox,
}

/// Catalog entry for a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct ProductDetails {
    #[validate(length(min = 1, max = 20))]
    pub productid: String,
    pub category: Category,
    pub setsubcategory: SubCategory,
    pub source: Source,
    #[validate(length(max = 100))]
    pub productnameen: String,
    #[validate(length(max = 100))]
    pub productnamezh: String,
    #[validate(length(max = 20))]
    pub specification: String,
    pub unit: Unit,
    #[serde(default)]
    #[sqlx(json)]
    pub components: Vec<String>,
    #[serde(default = "default_true")]
    pub is_sold_independently: bool,
    #[validate(length(max = 100))]
    pub remarks_temperature: Option<String>,
    #[validate(length(max = 100))]
    pub storage_temperature_duration: Option<String>,
    pub reorderlevel: i64,
    pub targetstocklevel: i64,
    pub leadtime: i64,
}

fn default_true() -> bool {
    true
}

/// Partial update of a catalog entry; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductDetailsUpdate {
    pub category: Option<Category>,
    pub setsubcategory: Option<SubCategory>,
    pub source: Option<Source>,
    #[validate(length(max = 100))]
    pub productnameen: Option<String>,
    #[validate(length(max = 100))]
    pub productnamezh: Option<String>,
    #[validate(length(max = 20))]
    pub specification: Option<String>,
    pub unit: Option<Unit>,
    pub components: Option<Vec<String>>,
    pub is_sold_independently: Option<bool>,
    #[validate(length(max = 100))]
    pub remarks_temperature: Option<String>,
    #[validate(length(max = 100))]
    pub storage_temperature_duration: Option<String>,
    pub reorderlevel: Option<i64>,
    pub targetstocklevel: Option<i64>,
    pub leadtime: Option<i64>,
}

impl ProductDetailsUpdate {
    pub fn apply(self, product: &mut ProductDetails) {
        if let Some(v) = self.category {
            product.category = v;
        }
        if let Some(v) = self.setsubcategory {
            product.setsubcategory = v;
        }
        if let Some(v) = self.source {
            product.source = v;
        }
        if let Some(v) = self.productnameen {
            product.productnameen = v;
        }
        if let Some(v) = self.productnamezh {
            product.productnamezh = v;
        }
        if let Some(v) = self.specification {
            product.specification = v;
        }
        if let Some(v) = self.unit {
            product.unit = v;
        }
        if let Some(v) = self.components {
            product.components = v;
        }
        if let Some(v) = self.is_sold_independently {
            product.is_sold_independently = v;
        }
        if self.remarks_temperature.is_some() {
            product.remarks_temperature = self.remarks_temperature;
        }
        if self.storage_temperature_duration.is_some() {
            product.storage_temperature_duration = self.storage_temperature_duration;
        }
        if let Some(v) = self.reorderlevel {
            product.reorderlevel = v;
        }
        if let Some(v) = self.targetstocklevel {
            product.targetstocklevel = v;
        }
        if let Some(v) = self.leadtime {
            product.leadtime = v;
        }
    }
}

/// Short product reference embedded in request responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetailsInfo {
    pub productid: String,
    pub productnamezh: String,
    pub productnameen: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> ProductDetails {
        ProductDetails {
            productid: "P001".to_string(),
            category: Category::Organoid,
            setsubcategory: SubCategory::HumanOrganoid,
            source: Source::Human,
            productnameen: "Test Product".to_string(),
            productnamezh: "测试产品".to_string(),
            specification: "Test Spec".to_string(),
            unit: Unit::Box,
            components: vec![],
            is_sold_independently: true,
            remarks_temperature: Some("Store at -20°C".to_string()),
            storage_temperature_duration: Some("6 months".to_string()),
            reorderlevel: 10,
            targetstocklevel: 100,
            leadtime: 5,
        }
    }

    #[test]
    fn test_labels_round_trip_through_json() {
        let json = serde_json::to_value(sample_product()).unwrap();
        assert_eq!(json["category"], "Organoid(类器官)");
        assert_eq!(json["setsubcategory"], "Human Organoid(人源类器官)");
        assert_eq!(json["unit"], "Box(盒)");

        let unit: Unit = serde_json::from_str(r#""Big Box(箱)""#).unwrap();
        assert_eq!(unit, Unit::BigBox);
        assert!(serde_json::from_str::<Category>(r#""Organoid""#).is_err());
    }

    #[test]
    fn test_product_id_length_is_validated() {
        let mut product = sample_product();
        product.productid = String::new();
        assert!(product.validate().is_err());
        product.productid = "P".repeat(21);
        assert!(product.validate().is_err());
        product.productid = "P12345".to_string();
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_partial_update_only_touches_supplied_fields() {
        let mut product = sample_product();
        let update = ProductDetailsUpdate {
            productnameen: Some("Partially Updated Product".to_string()),
            leadtime: Some(7),
            ..Default::default()
        };
        update.apply(&mut product);

        assert_eq!(product.productnameen, "Partially Updated Product");
        assert_eq!(product.leadtime, 7);
        assert_eq!(product.productnamezh, "测试产品");
        assert_eq!(product.remarks_temperature.as_deref(), Some("Store at -20°C"));
    }
}
