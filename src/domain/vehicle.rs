//! Vehicle collaborator

use async_trait::async_trait;

use super::spot::LookupError;
use super::{UserId, VehicleId};

#[async_trait]
pub trait VehicleLookup: Send + Sync {
    /// Owner of the vehicle, `None` when the vehicle does not exist
    async fn get_vehicle_owner(&self, vehicle_id: VehicleId) -> Result<Option<UserId>, LookupError>;
}
