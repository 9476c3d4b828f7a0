//! Data models for GearGuard

pub mod enums;
pub mod equipment;
pub mod pagination;
pub mod request;
pub mod team;
pub mod user;
pub mod work_center;

// Re-export commonly used types
pub use enums::{
    EquipmentStatus, RequestPriority, RequestStage, RequestType, TeamLifecycle, UserRole,
    UserStatus, WorkCenterStatus,
};
pub use equipment::Equipment;
pub use pagination::{PageRequest, Paginated, Pagination};
pub use request::MaintenanceRequest;
pub use team::{Team, TeamMember};
pub use user::{User, UserShort};
pub use work_center::WorkCenter;
