pub mod panel_dto;
pub mod public_dto;
