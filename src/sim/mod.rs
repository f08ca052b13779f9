//! Deterministic coupling mechanisms
//!
//! Everything here is pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by particle / actor / collider id)
//! - No rendering or platform dependencies

pub mod actuator;
pub mod boundary;
pub mod collision;
pub mod field;
pub mod mapper;
pub mod physics;
pub mod rate;
pub mod ring;
pub mod rng;
pub mod router;
pub mod shape;
pub mod stage;
pub mod state;

pub use actuator::ThresholdActuator;
pub use boundary::{Axis, AxisSpawn, Face, RecycleBoundary, SpawnRule};
pub use collision::{CollisionResult, bounce_velocity};
pub use field::{Particle, ParticleField, ParticleId, ParticleKind, scatter};
pub use mapper::{Base, MapperEvent, Pairing, PositionToIndexMapper, Strand, Traveler};
pub use physics::{Collider, ColliderId, Contact, PhysicsWorld, PlanarWorld, Response};
pub use rate::{CounterModel, RateGatedProducer, WindowedCounter};
pub use ring::RingBuffer;
pub use rng::SimRng;
pub use router::{ActorId, ActorKind, CollisionEventRouter, DomainEvent, FixedActor, Millis};
pub use shape::{Aabb, Shape};
pub use stage::{StageController, StageScope};
pub use state::{Readout, SimClock, SimCore, Simulation};
