//! Equipment service

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Department, Equipment, EquipmentCategory, EquipmentQuery, UpdateEquipment},
        pagination::{PageRequest, Paginated},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<Paginated<Equipment>> {
        let page = PageRequest::new(query.page, query.limit);
        let (items, total) = self.repository.equipment.list(query, page).await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        self.ensure_code_free(data.equipment_code.trim(), None).await?;

        let equipment = self.repository.equipment.create(data).await?;
        tracing::info!(equipment_id = equipment.id, code = %equipment.equipment_code, "Equipment created");
        Ok(equipment)
    }

    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await?;
        if let Some(code) = data.equipment_code.as_deref() {
            self.ensure_code_free(code.trim(), Some(id)).await?;
        }

        let equipment = self.repository.equipment.update(id, data).await?;
        tracing::info!(equipment_id = id, "Equipment updated");
        Ok(equipment)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.equipment.delete(id).await?;
        tracing::info!(equipment_id = id, "Equipment deleted");
        Ok(())
    }

    pub async fn categories(&self) -> AppResult<Vec<EquipmentCategory>> {
        self.repository.equipment.categories().await
    }

    pub async fn departments(&self) -> AppResult<Vec<Department>> {
        self.repository.equipment.departments().await
    }

    async fn ensure_code_free(&self, code: &str, exclude_id: Option<i32>) -> AppResult<()> {
        if self.repository.equipment.code_exists(code, exclude_id).await? {
            return Err(AppError::Conflict(format!("Equipment code '{}' already exists", code)));
        }
        Ok(())
    }
}
