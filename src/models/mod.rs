pub mod loaders;
pub mod member;

pub use loaders::{load_roster, parse_roster};
pub use member::{EnrichedMember, Position, ProfileFields, RawMember};
