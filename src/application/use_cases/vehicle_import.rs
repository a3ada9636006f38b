use super::bulk_import::RowImporter;
use crate::domain::error::Result;
use crate::domain::import::{RawRow, RowView};
use crate::domain::sequence::SequenceKind;
use crate::domain::vehicle::VehicleInput;
use crate::infrastructure::db::counters::SequenceCounter;
use crate::infrastructure::db::vehicles::VehicleRepository;
use crate::shared::dates::parse_loose_date;
use async_trait::async_trait;

pub fn map_vehicle_row(row: &RawRow) -> VehicleInput {
    let view = RowView::new(row);
    let date = |aliases: &[&str]| view.get(aliases).and_then(parse_loose_date);

    VehicleInput {
        make: view.text(&["make"]),
        model: view.text(&["model"]),
        year: view
            .number(&["year"])
            .filter(|year| (1886.0..=9999.0).contains(year))
            .map(|year| year as i32),
        vin: view.text(&["vin"]),
        trim: view.text(&["trim"]),
        body_type: view.text(&["bodyType"]),
        color: view.text(&["color", "colour"]),
        mileage: view.number(&["mileage"]),
        engine_type: view.text(&["engineType"]),
        transmission: view.text(&["transmission"]),
        fuel_type: view.text(&["fuelType"]),
        drivetrain: view.text(&["drivetrain"]),
        condition: view.text(&["condition"]),
        price: view.number(&["price"]),
        cost: view.number(&["cost"]),
        status: view.text(&["status"]),
        location: view.text(&["location"]),
        features: Some(view.list(&["features"])),
        warranty: view.text(&["warranty"]),
        inspection_date: date(&["inspectionDate"]),
        date_sold: date(&["dateSold"]),
        date_added_to_inventory: date(&["dateAddedToInventory", "dateAdded"]),
        notes: view.text(&["notes"]),
    }
}

pub struct VehicleImporter<'a> {
    pub vehicles: &'a VehicleRepository,
    pub counter: &'a dyn SequenceCounter,
}

#[async_trait]
impl<'a> RowImporter for VehicleImporter<'a> {
    fn entity(&self) -> &'static str {
        "vehicle"
    }

    async fn import_row(&self, row: &RawRow) -> Result<(String, String)> {
        let vehicle = map_vehicle_row(row).into_new_vehicle();
        let vehicle_id = self.counter.next_id(SequenceKind::Vehicle).await?;
        let now = chrono::Utc::now().timestamp_millis();
        let stored = self.vehicles.insert_vehicle(&vehicle_id, &vehicle, now).await?;
        let name = format!("{} {}", stored.make, stored.model);
        Ok((stored.vehicle_id, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::{DEFAULT_BODY_TYPE, UNKNOWN};
    use chrono::NaiveDate;

    #[test]
    fn test_map_vehicle_row() {
        let row: RawRow = [
            ("Make", "Honda"),
            ("body Type", "Sedan"),
            ("Year", "2021"),
            ("Mileage", "42,000 km"),
            ("price", "call us"),
            ("Date Sold", "15/01/2024"),
            ("features", "Sunroof,Heated Seats"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let vehicle = map_vehicle_row(&row).into_new_vehicle();
        assert_eq!(vehicle.make, "Honda");
        assert_eq!(vehicle.model, UNKNOWN);
        assert_eq!(vehicle.body_type, "Sedan");
        assert_eq!(vehicle.year, Some(2021));
        assert_eq!(vehicle.mileage, Some(42000.0));
        assert_eq!(vehicle.price, None);
        assert_eq!(vehicle.date_sold, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(vehicle.features, vec!["Sunroof", "Heated Seats"]);
    }

    #[test]
    fn test_empty_row_gets_defaults() {
        let vehicle = map_vehicle_row(&RawRow::new()).into_new_vehicle();
        assert_eq!(vehicle.make, UNKNOWN);
        assert_eq!(vehicle.body_type, DEFAULT_BODY_TYPE);
        assert_eq!(vehicle.year, None);
    }
}
