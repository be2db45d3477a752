pub mod match_repository;
pub mod settings_repository;
pub mod team_repository;
pub mod venue_repository;
