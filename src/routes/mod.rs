pub mod home;
pub mod owners;
pub mod vets;
pub mod visits;
