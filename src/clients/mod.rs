pub mod profile_client;

pub use profile_client::{ProfileClient, ProfileSource};
