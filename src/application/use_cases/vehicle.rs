use super::bulk_import::import_rows;
use super::vehicle_import::VehicleImporter;
use crate::domain::error::Result;
use crate::domain::import::{ImportReport, RawRow};
use crate::domain::sequence::SequenceKind;
use crate::domain::vehicle::{UniqueModel, Vehicle, VehicleInput};
use crate::infrastructure::db::counters::SequenceCounter;
use crate::infrastructure::db::vehicles::VehicleRepository;
use std::sync::Arc;
use tracing::info;

pub struct VehicleUseCase {
    vehicles: Arc<VehicleRepository>,
    counter: Arc<dyn SequenceCounter>,
}

impl VehicleUseCase {
    pub fn new(vehicles: Arc<VehicleRepository>, counter: Arc<dyn SequenceCounter>) -> Self {
        Self { vehicles, counter }
    }

    pub async fn create_vehicle(&self, input: VehicleInput) -> Result<Vehicle> {
        let vehicle = input.into_new_vehicle();
        let vehicle_id = self.counter.next_id(SequenceKind::Vehicle).await?;
        let now = chrono::Utc::now().timestamp_millis();
        let stored = self.vehicles.insert_vehicle(&vehicle_id, &vehicle, now).await?;
        info!(vehicle_id = %stored.vehicle_id, "Vehicle added to inventory");
        Ok(stored)
    }

    pub async fn update_vehicle(&self, id: i64, patch: VehicleInput) -> Result<Vehicle> {
        let mut vehicle = self.vehicles.get_vehicle(id).await?;
        vehicle.apply_patch(patch);
        vehicle.updated_at = chrono::Utc::now().timestamp_millis();
        self.vehicles.save_vehicle(&vehicle).await
    }

    pub async fn delete_vehicle(&self, id: i64) -> Result<()> {
        self.vehicles.delete_vehicle(id).await?;
        info!(id, "Vehicle deleted");
        Ok(())
    }

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.vehicles.list_vehicles().await
    }

    pub async fn get_vehicle(&self, id: i64) -> Result<Vehicle> {
        self.vehicles.get_vehicle(id).await
    }

    pub async fn unique_models(&self) -> Result<Vec<UniqueModel>> {
        self.vehicles.unique_models().await
    }

    pub async fn import_vehicles(&self, rows: Vec<RawRow>) -> Result<ImportReport> {
        let importer = VehicleImporter {
            vehicles: &self.vehicles,
            counter: self.counter.as_ref(),
        };
        Ok(import_rows(&importer, rows).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use crate::infrastructure::db::counters::CounterRepository;
    use crate::infrastructure::db::test_support::TestDb;

    fn use_case(db: &TestDb) -> VehicleUseCase {
        VehicleUseCase::new(
            Arc::new(VehicleRepository::new(db.pool.clone())),
            Arc::new(CounterRepository::new(db.pool.clone())),
        )
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let db = TestDb::new().await;
        let vehicles = use_case(&db);
        let created = vehicles
            .create_vehicle(VehicleInput {
                make: Some("Toyota".to_string()),
                model: Some("RAV4".to_string()),
                price: Some(31000.0),
                ..VehicleInput::default()
            })
            .await
            .unwrap();
        assert_eq!(created.vehicle_id, "VH0001");

        let updated = vehicles
            .update_vehicle(
                created.id,
                VehicleInput {
                    status: Some("Sold".to_string()),
                    ..VehicleInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, "Sold");
        assert_eq!(updated.model, "RAV4");
        assert_eq!(updated.price, Some(31000.0));
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_import_skips_duplicate_vin() {
        let db = TestDb::new().await;
        let vehicles = use_case(&db);
        let rows: Vec<RawRow> = ["VIN-A", "VIN-A", "VIN-B"]
            .iter()
            .map(|vin| {
                RawRow::from([
                    ("make".to_string(), "Ford".to_string()),
                    ("vin".to_string(), vin.to_string()),
                ])
            })
            .collect();

        let report = vehicles.import_vehicles(rows).await.unwrap();
        assert_eq!(report.successful.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert_eq!(report.successful[0].name, "Ford Unknown");
        assert_eq!(vehicles.list_vehicles().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let db = TestDb::new().await;
        let vehicles = use_case(&db);
        let created = vehicles.create_vehicle(VehicleInput::default()).await.unwrap();
        vehicles.delete_vehicle(created.id).await.unwrap();
        assert!(matches!(
            vehicles.get_vehicle(created.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
