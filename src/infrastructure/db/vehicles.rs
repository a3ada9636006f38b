use super::{decode_date, decode_list, encode_date, encode_list, map_write_error};
use crate::domain::error::{AppError, Result};
use crate::domain::vehicle::{NewVehicle, UniqueModel, Vehicle};
use sqlx::SqlitePool;

const VEHICLE_COLUMNS: &str = "id, vehicle_id, make, model, year, vin, trim, body_type, color, \
    mileage, engine_type, transmission, fuel_type, drivetrain, condition, price, cost, status, \
    location, features, warranty, inspection_date, date_sold, date_added_to_inventory, notes, \
    created_at, updated_at";

pub struct VehicleRepository {
    pool: SqlitePool,
}

impl VehicleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_vehicle(
        &self,
        vehicle_id: &str,
        vehicle: &NewVehicle,
        now: i64,
    ) -> Result<Vehicle> {
        let result = sqlx::query(
            "INSERT INTO vehicles (vehicle_id, make, model, year, vin, trim, body_type, color,
                mileage, engine_type, transmission, fuel_type, drivetrain, condition, price, cost,
                status, location, features, warranty, inspection_date, date_sold,
                date_added_to_inventory, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(vehicle_id)
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(&vehicle.vin)
        .bind(&vehicle.trim)
        .bind(&vehicle.body_type)
        .bind(&vehicle.color)
        .bind(vehicle.mileage)
        .bind(&vehicle.engine_type)
        .bind(&vehicle.transmission)
        .bind(&vehicle.fuel_type)
        .bind(&vehicle.drivetrain)
        .bind(&vehicle.condition)
        .bind(vehicle.price)
        .bind(vehicle.cost)
        .bind(&vehicle.status)
        .bind(&vehicle.location)
        .bind(encode_list(&vehicle.features))
        .bind(&vehicle.warranty)
        .bind(encode_date(vehicle.inspection_date))
        .bind(encode_date(vehicle.date_sold))
        .bind(encode_date(vehicle.date_added_to_inventory))
        .bind(&vehicle.notes)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to insert vehicle", e))?;

        self.get_vehicle(result.last_insert_rowid()).await
    }

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleEntity>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list vehicles: {e}")))?;
        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    pub async fn get_vehicle(&self, id: i64) -> Result<Vehicle> {
        sqlx::query_as::<_, VehicleEntity>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch vehicle: {e}")))?
        .map(Vehicle::from)
        .ok_or_else(|| AppError::NotFound(format!("Vehicle not found: {}", id)))
    }

    pub async fn save_vehicle(&self, vehicle: &Vehicle) -> Result<Vehicle> {
        let result = sqlx::query(
            "UPDATE vehicles SET make = ?, model = ?, year = ?, vin = ?, trim = ?, body_type = ?,
                color = ?, mileage = ?, engine_type = ?, transmission = ?, fuel_type = ?,
                drivetrain = ?, condition = ?, price = ?, cost = ?, status = ?, location = ?,
                features = ?, warranty = ?, inspection_date = ?, date_sold = ?,
                date_added_to_inventory = ?, notes = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(&vehicle.vin)
        .bind(&vehicle.trim)
        .bind(&vehicle.body_type)
        .bind(&vehicle.color)
        .bind(vehicle.mileage)
        .bind(&vehicle.engine_type)
        .bind(&vehicle.transmission)
        .bind(&vehicle.fuel_type)
        .bind(&vehicle.drivetrain)
        .bind(&vehicle.condition)
        .bind(vehicle.price)
        .bind(vehicle.cost)
        .bind(&vehicle.status)
        .bind(&vehicle.location)
        .bind(encode_list(&vehicle.features))
        .bind(&vehicle.warranty)
        .bind(encode_date(vehicle.inspection_date))
        .bind(encode_date(vehicle.date_sold))
        .bind(encode_date(vehicle.date_added_to_inventory))
        .bind(&vehicle.notes)
        .bind(vehicle.updated_at)
        .bind(vehicle.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to update vehicle", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Vehicle not found: {}", vehicle.id)));
        }
        self.get_vehicle(vehicle.id).await
    }

    pub async fn delete_vehicle(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete vehicle: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Vehicle not found: {}", id)));
        }
        Ok(())
    }

    /// Distinct non-empty model names, alphabetically.
    pub async fn unique_models(&self) -> Result<Vec<UniqueModel>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT model FROM vehicles WHERE TRIM(model) <> '' ORDER BY model",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list models: {e}")))?;
        Ok(rows.into_iter().map(|(model,)| UniqueModel { model }).collect())
    }
}

#[derive(sqlx::FromRow)]
struct VehicleEntity {
    id: i64,
    vehicle_id: String,
    make: String,
    model: String,
    year: Option<i32>,
    vin: Option<String>,
    trim: String,
    body_type: String,
    color: String,
    mileage: Option<f64>,
    engine_type: String,
    transmission: String,
    fuel_type: String,
    drivetrain: String,
    condition: String,
    price: Option<f64>,
    cost: Option<f64>,
    status: String,
    location: String,
    features: String,
    warranty: String,
    inspection_date: Option<String>,
    date_sold: Option<String>,
    date_added_to_inventory: Option<String>,
    notes: String,
    created_at: i64,
    updated_at: i64,
}

impl From<VehicleEntity> for Vehicle {
    fn from(entity: VehicleEntity) -> Self {
        Vehicle {
            id: entity.id,
            vehicle_id: entity.vehicle_id,
            make: entity.make,
            model: entity.model,
            year: entity.year,
            vin: entity.vin,
            trim: entity.trim,
            body_type: entity.body_type,
            color: entity.color,
            mileage: entity.mileage,
            engine_type: entity.engine_type,
            transmission: entity.transmission,
            fuel_type: entity.fuel_type,
            drivetrain: entity.drivetrain,
            condition: entity.condition,
            price: entity.price,
            cost: entity.cost,
            status: entity.status,
            location: entity.location,
            features: decode_list(&entity.features),
            warranty: entity.warranty,
            inspection_date: decode_date(entity.inspection_date.as_deref()),
            date_sold: decode_date(entity.date_sold.as_deref()),
            date_added_to_inventory: decode_date(entity.date_added_to_inventory.as_deref()),
            notes: entity.notes,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::VehicleInput;
    use crate::infrastructure::db::test_support::TestDb;

    fn vehicle(model: &str, vin: Option<&str>) -> NewVehicle {
        VehicleInput {
            make: Some("Honda".to_string()),
            model: Some(model.to_string()),
            vin: vin.map(str::to_string),
            features: Some(vec!["Sunroof".to_string()]),
            ..VehicleInput::default()
        }
        .into_new_vehicle()
    }

    #[tokio::test]
    async fn test_vehicle_roundtrip_and_models() {
        let db = TestDb::new().await;
        let repo = VehicleRepository::new(db.pool.clone());

        let civic = repo
            .insert_vehicle("VH0001", &vehicle("Civic", Some("1HGCM82633A004352")), 5)
            .await
            .unwrap();
        assert_eq!(civic.features, vec!["Sunroof".to_string()]);
        repo.insert_vehicle("VH0002", &vehicle("Accord", None), 5)
            .await
            .unwrap();
        repo.insert_vehicle("VH0003", &vehicle("Civic", None), 5)
            .await
            .unwrap();

        let models: Vec<String> = repo
            .unique_models()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.model)
            .collect();
        assert_eq!(models, vec!["Accord", "Civic"]);
    }

    #[tokio::test]
    async fn test_duplicate_vin_rejected() {
        let db = TestDb::new().await;
        let repo = VehicleRepository::new(db.pool.clone());
        repo.insert_vehicle("VH0001", &vehicle("Civic", Some("VIN1")), 1)
            .await
            .unwrap();

        let err = repo
            .insert_vehicle("VH0002", &vehicle("Civic", Some("VIN1")), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_vehicle() {
        let db = TestDb::new().await;
        let repo = VehicleRepository::new(db.pool.clone());
        assert!(matches!(
            repo.delete_vehicle(99).await,
            Err(AppError::NotFound(_))
        ));
    }
}
