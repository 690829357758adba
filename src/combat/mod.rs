pub mod body_zone;
pub mod damage;
pub mod weapons;

pub use body_zone::{BodyLocation, LocationTable};
pub use damage::{Absorption, CriticalEffect, CriticalHit, DamageReport, LocationState};
pub use weapons::WeaponKind;
