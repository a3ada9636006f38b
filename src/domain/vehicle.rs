use crate::shared::dates::deserialize_optional_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";
pub const DEFAULT_BODY_TYPE: &str = "SUV";
pub const DEFAULT_ENGINE_TYPE: &str = "Gasoline";
pub const DEFAULT_TRANSMISSION: &str = "Automatic";
pub const DEFAULT_FUEL_TYPE: &str = "Petrol";
pub const DEFAULT_DRIVETRAIN: &str = "FWD";
pub const DEFAULT_CONDITION: &str = "Used";
pub const DEFAULT_STATUS: &str = "Available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i64,
    pub vehicle_id: String,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub trim: String,
    pub body_type: String,
    pub color: String,
    pub mileage: Option<f64>,
    pub engine_type: String,
    pub transmission: String,
    pub fuel_type: String,
    pub drivetrain: String,
    pub condition: String,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub status: String,
    pub location: String,
    pub features: Vec<String>,
    pub warranty: String,
    pub inspection_date: Option<NaiveDate>,
    pub date_sold: Option<NaiveDate>,
    pub date_added_to_inventory: Option<NaiveDate>,
    pub notes: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Vehicle fields as submitted by a form or a spreadsheet row. Every field is
/// optional; [`VehicleInput::into_new_vehicle`] fills inventory defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drivetrain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub inspection_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_sold: Option<NaiveDate>,
    #[serde(
        default,
        alias = "dateAdded",
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_added_to_inventory: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A vehicle ready to be inserted, before its `vehicleId` is minted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicle {
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub trim: String,
    pub body_type: String,
    pub color: String,
    pub mileage: Option<f64>,
    pub engine_type: String,
    pub transmission: String,
    pub fuel_type: String,
    pub drivetrain: String,
    pub condition: String,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub status: String,
    pub location: String,
    pub features: Vec<String>,
    pub warranty: String,
    pub inspection_date: Option<NaiveDate>,
    pub date_sold: Option<NaiveDate>,
    pub date_added_to_inventory: Option<NaiveDate>,
    pub notes: String,
}

impl VehicleInput {
    pub fn into_new_vehicle(self) -> NewVehicle {
        NewVehicle {
            make: or_default(self.make, UNKNOWN),
            model: or_default(self.model, UNKNOWN),
            year: self.year,
            vin: self
                .vin
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            trim: or_default(self.trim, ""),
            body_type: or_default(self.body_type, DEFAULT_BODY_TYPE),
            color: or_default(self.color, ""),
            mileage: self.mileage,
            engine_type: or_default(self.engine_type, DEFAULT_ENGINE_TYPE),
            transmission: or_default(self.transmission, DEFAULT_TRANSMISSION),
            fuel_type: or_default(self.fuel_type, DEFAULT_FUEL_TYPE),
            drivetrain: or_default(self.drivetrain, DEFAULT_DRIVETRAIN),
            condition: or_default(self.condition, DEFAULT_CONDITION),
            price: self.price,
            cost: self.cost,
            status: or_default(self.status, DEFAULT_STATUS),
            location: or_default(self.location, UNKNOWN),
            features: self
                .features
                .unwrap_or_default()
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            warranty: or_default(self.warranty, ""),
            inspection_date: self.inspection_date,
            date_sold: self.date_sold,
            date_added_to_inventory: self.date_added_to_inventory,
            notes: or_default(self.notes, ""),
        }
    }
}

impl Vehicle {
    /// Overwrites every field present in `patch`. Blank strings clear
    /// optional text fields back to their empty value.
    pub fn apply_patch(&mut self, patch: VehicleInput) {
        fn set(target: &mut String, value: Option<String>) {
            if let Some(value) = value {
                *target = value.trim().to_string();
            }
        }

        set(&mut self.make, patch.make);
        set(&mut self.model, patch.model);
        if patch.year.is_some() {
            self.year = patch.year;
        }
        if let Some(vin) = patch.vin {
            let vin = vin.trim().to_string();
            self.vin = if vin.is_empty() { None } else { Some(vin) };
        }
        set(&mut self.trim, patch.trim);
        set(&mut self.body_type, patch.body_type);
        set(&mut self.color, patch.color);
        if patch.mileage.is_some() {
            self.mileage = patch.mileage;
        }
        set(&mut self.engine_type, patch.engine_type);
        set(&mut self.transmission, patch.transmission);
        set(&mut self.fuel_type, patch.fuel_type);
        set(&mut self.drivetrain, patch.drivetrain);
        set(&mut self.condition, patch.condition);
        if patch.price.is_some() {
            self.price = patch.price;
        }
        if patch.cost.is_some() {
            self.cost = patch.cost;
        }
        set(&mut self.status, patch.status);
        set(&mut self.location, patch.location);
        if let Some(features) = patch.features {
            self.features = features
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
        }
        set(&mut self.warranty, patch.warranty);
        if patch.inspection_date.is_some() {
            self.inspection_date = patch.inspection_date;
        }
        if patch.date_sold.is_some() {
            self.date_sold = patch.date_sold;
        }
        if patch.date_added_to_inventory.is_some() {
            self.date_added_to_inventory = patch.date_added_to_inventory;
        }
        set(&mut self.notes, patch.notes);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniqueModel {
    pub model: String,
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let vehicle = VehicleInput {
            model: Some("Civic".to_string()),
            vin: Some("  ".to_string()),
            ..VehicleInput::default()
        }
        .into_new_vehicle();

        assert_eq!(vehicle.make, UNKNOWN);
        assert_eq!(vehicle.model, "Civic");
        assert_eq!(vehicle.vin, None);
        assert_eq!(vehicle.body_type, DEFAULT_BODY_TYPE);
        assert_eq!(vehicle.status, DEFAULT_STATUS);
        assert_eq!(vehicle.location, UNKNOWN);
        assert!(vehicle.features.is_empty());
    }

    #[test]
    fn test_form_date_alias() {
        let input: VehicleInput =
            serde_json::from_str(r#"{"make":"Honda","dateAdded":"2024-01-15"}"#).unwrap();
        assert_eq!(
            input.date_added_to_inventory,
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }
}
