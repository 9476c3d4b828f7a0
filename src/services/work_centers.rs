//! Work centers service

use crate::{
    error::{AppError, AppResult},
    models::{
        pagination::{PageRequest, Paginated},
        work_center::{CreateWorkCenter, UpdateWorkCenter, WorkCenter, WorkCenterQuery},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct WorkCentersService {
    repository: Repository,
}

impl WorkCentersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &WorkCenterQuery) -> AppResult<Paginated<WorkCenter>> {
        let page = PageRequest::new(query.page, query.limit);
        let (items, total) = self.repository.work_centers.list(query, page).await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<WorkCenter> {
        self.repository.work_centers.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateWorkCenter) -> AppResult<WorkCenter> {
        self.ensure_code_free(data.code.trim(), None).await?;

        let work_center = self.repository.work_centers.create(data).await?;
        tracing::info!(work_center_id = work_center.id, code = %work_center.code, "Work center created");
        Ok(work_center)
    }

    pub async fn update(&self, id: i32, data: &UpdateWorkCenter) -> AppResult<WorkCenter> {
        self.repository.work_centers.get_by_id(id).await?;
        if let Some(code) = data.code.as_deref() {
            self.ensure_code_free(code.trim(), Some(id)).await?;
        }

        let work_center = self.repository.work_centers.update(id, data).await?;
        tracing::info!(work_center_id = id, "Work center updated");
        Ok(work_center)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.work_centers.delete(id).await?;
        tracing::info!(work_center_id = id, "Work center deleted");
        Ok(())
    }

    async fn ensure_code_free(&self, code: &str, exclude_id: Option<i32>) -> AppResult<()> {
        if self.repository.work_centers.code_exists(code, exclude_id).await? {
            return Err(AppError::Conflict(format!("Work center code '{}' already exists", code)));
        }
        Ok(())
    }
}
