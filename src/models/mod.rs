pub mod owner;
pub mod pet;
pub mod vet;
pub mod visit;

pub use owner::Owner;
pub use pet::Pet;
pub use vet::Vet;
pub use visit::Visit;
