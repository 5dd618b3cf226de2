//! Authenticated identity, permissions and roles.

mod model;

pub use model::{Identity, Permission, Role};

/// Permission tokens issued by the backend.
pub mod permissions {
    pub const VIEW_USERS: &str = "Ver usuarios";
    pub const CREATE_USERS: &str = "Crear usuarios";
    pub const EDIT_USERS: &str = "Editar usuarios";
    pub const DELETE_USERS: &str = "Eliminar usuarios";
    pub const VIEW_PERSONS: &str = "Ver personas";
    pub const CREATE_PERSONS: &str = "Crear personas";
    pub const EDIT_PERSONS: &str = "Editar personas";
    pub const DELETE_PERSONS: &str = "Eliminar personas";
    pub const VIEW_ROLES: &str = "Ver roles";
    pub const ASSIGN_ROLES: &str = "Asignar roles";
    pub const VIEW_PERMISSIONS: &str = "Ver permisos";
    pub const ASSIGN_PERMISSIONS: &str = "Asignar permisos";
    pub const VIEW_ATTENDANCE: &str = "VER_ASISTENCIAS";
    pub const TAKE_ATTENDANCE: &str = "TOMAR_ASISTENCIA";
    pub const MANAGE_SYSTEM: &str = "ADMINISTRAR_SISTEMA";
}
