pub mod fairness;
pub mod fixture;
pub mod settings;
pub mod team;
pub mod venue;
